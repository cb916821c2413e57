use serde::{Deserialize, Serialize};

/// CO2 attributed to one origin/destination pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCo2 {
    pub dep: String,
    pub arr: String,
    pub co2_kg: f64,
}

/// CO2 attributed to departures from one airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportCo2 {
    pub dep: String,
    pub co2_kg: f64,
}

/// Summary result for a day or an aggregated range: the numbers the
/// dashboard's KPI tiles and tables are rendered from. For a range the
/// `date` field carries a `start..end` label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub date: String,
    pub flights_computed: u64,
    pub total_co2_kg: f64,
    pub total_co2_tons: f64,
    #[serde(default)]
    pub top_routes: Vec<RouteCo2>,
    #[serde(default)]
    pub top_departure_airports: Vec<AirportCo2>,
}

/// Airport bubble for the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapAirport {
    pub icao: String,
    #[serde(default)]
    pub airport_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub co2_kg: f64,
}

/// Route polyline for the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRoute {
    pub dep: String,
    pub arr: String,
    pub dep_lat: f64,
    pub dep_lon: f64,
    pub arr_lat: f64,
    pub arr_lon: f64,
    pub co2_kg: f64,
}

/// Map-ready detail, loaded after the summary and optional to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPayload {
    pub date: String,
    #[serde(default)]
    pub airports: Vec<MapAirport>,
    #[serde(default)]
    pub routes: Vec<MapRoute>,
}
