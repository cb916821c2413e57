//! Headless driver for the dashboard core: loads a day or a date range
//! against a running backend and prints state transitions and KPIs.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use url::Url;

use emissions_core::{CacheEntry, OrchestratorState};
use emissions_engine::{
    DashboardHandle, DaySettings, HttpJobService, HttpSettings, RangeSettings, StateEvent,
};

#[derive(Parser)]
#[command(
    name = "emissions",
    about = "Aviation CO2 dashboard client: drive backend jobs and fetch results"
)]
struct Cli {
    /// Base URL of the emissions backend.
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Log state transitions and poll observations.
    #[arg(long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the CO2 summary for a single date (YYYY-MM-DD).
    Day { date: String },
    /// Load the aggregated CO2 summary for an inclusive date range.
    Range { start: String, end: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    emissions_logging::initialize_terminal(cli.verbose);

    let base = Url::parse(&cli.base_url)
        .with_context(|| format!("invalid base url {:?}", cli.base_url))?;
    let service = HttpJobService::new(base, HttpSettings::default())?;
    let handle = DashboardHandle::new(
        Arc::new(service),
        DaySettings::default(),
        RangeSettings::default(),
    );

    let request_key = match &cli.command {
        Command::Day { date } => {
            handle.load_day(date.clone());
            date.clone()
        }
        Command::Range { start, end } => {
            handle.load_range(start.clone(), end.clone());
            format!("{start}..{end}")
        }
    };

    drive(&handle, &request_key)
}

/// Drains state events until the request reaches a terminal state.
fn drive(handle: &DashboardHandle, request_key: &str) -> Result<()> {
    loop {
        let Some(event) = handle.recv() else {
            bail!("engine stopped before the request finished");
        };
        if event.key != request_key {
            continue;
        }
        report(&event);
        match event.state {
            OrchestratorState::Ready(entry) => {
                print_summary(&entry);
                return Ok(());
            }
            OrchestratorState::Failed(failure) => {
                bail!("load failed ({}): {}", failure.kind, failure.message);
            }
            OrchestratorState::Cancelled => {
                bail!("load was cancelled");
            }
            _ => {}
        }
    }
}

fn report(event: &StateEvent) {
    match &event.state {
        OrchestratorState::Fetching(progress) => {
            if let Some(message) = &progress.message {
                println!("[{}] {}: {}", event.state.label(), event.key, message);
            } else {
                println!("[{}] {}", event.state.label(), event.key);
            }
            if let Some(stats) = &progress.stats {
                println!(
                    "    {}/{} days processed ({:.0}%), phase {}",
                    stats.dates_processed,
                    stats.total_days,
                    stats.clamped_percent(),
                    stats.phase
                );
            }
        }
        state => println!("[{}] {}", state.label(), event.key),
    }
}

fn print_summary(entry: &CacheEntry) {
    let summary = &entry.summary;
    println!();
    println!("{}", summary.date);
    println!("  flights:   {}", summary.flights_computed);
    println!("  total CO2: {:.1} t", summary.total_co2_tons);
    for route in summary.top_routes.iter().take(10) {
        println!(
            "  {} -> {}  {:.1} t",
            route.dep,
            route.arr,
            route.co2_kg / 1000.0
        );
    }
    if entry.map_detail.is_none() {
        log::debug!("map detail not loaded yet; summary shown without it");
    }
}
