use emissions_core::{JobKey, MapPayload, ResultCache, SummaryPayload};
use pretty_assertions::assert_eq;

fn summary(date: &str) -> SummaryPayload {
    SummaryPayload {
        date: date.to_string(),
        flights_computed: 1200,
        total_co2_kg: 345_000.0,
        total_co2_tons: 345.0,
        top_routes: Vec::new(),
        top_departure_airports: Vec::new(),
    }
}

fn map_detail(date: &str) -> MapPayload {
    MapPayload {
        date: date.to_string(),
        airports: Vec::new(),
        routes: Vec::new(),
    }
}

#[test]
fn insert_then_get_round_trips() {
    let cache = ResultCache::new();
    let key = JobKey::day("2025-12-25").unwrap();
    assert!(cache.get(&key).is_none());

    let stored = cache.insert_summary(&key, summary("2025-12-25"));
    assert!(stored.map_detail.is_none());
    assert_eq!(cache.get(&key).unwrap(), stored);
    assert_eq!(cache.len(), 1);
}

#[test]
fn merge_map_updates_entry_in_place() {
    let cache = ResultCache::new();
    let key = JobKey::day("2025-12-25").unwrap();
    cache.insert_summary(&key, summary("2025-12-25"));

    let merged = cache.merge_map(&key, map_detail("2025-12-25")).unwrap();
    assert_eq!(merged.summary, summary("2025-12-25"));
    assert!(merged.map_detail.is_some());

    // The stored entry reflects the merge without a second insert.
    assert_eq!(cache.get(&key).unwrap(), merged);
    assert_eq!(cache.len(), 1);
}

#[test]
fn merge_map_without_summary_is_dropped() {
    let cache = ResultCache::new();
    let key = JobKey::day("2025-12-25").unwrap();
    assert!(cache.merge_map(&key, map_detail("2025-12-25")).is_none());
    assert!(cache.is_empty());
}

#[test]
fn clones_share_the_same_store() {
    let cache = ResultCache::new();
    let handle = cache.clone();
    let key = JobKey::range("2025-12-20", "2025-12-25").unwrap();

    handle.insert_summary(&key, summary("2025-12-20..2025-12-25"));
    assert!(cache.contains(&key));
}

#[test]
fn day_and_range_entries_coexist() {
    let cache = ResultCache::new();
    let day = JobKey::day("2025-12-25").unwrap();
    let range = JobKey::range("2025-12-20", "2025-12-25").unwrap();

    cache.insert_summary(&day, summary("2025-12-25"));
    cache.insert_summary(&range, summary("2025-12-20..2025-12-25"));

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&day).unwrap().summary.date, "2025-12-25");
    assert_eq!(
        cache.get(&range).unwrap().summary.date,
        "2025-12-20..2025-12-25"
    );
}
