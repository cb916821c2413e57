//! Emissions core: job keys, payloads, the result cache and per-key state.
mod cache;
mod classify;
mod key;
mod payload;
mod state;
mod status;

pub use cache::{CacheEntry, ResultCache};
pub use classify::{ErrorClass, ErrorClassifier};
pub use key::{JobKey, KeyError};
pub use payload::{AirportCo2, MapAirport, MapPayload, MapRoute, RouteCo2, SummaryPayload};
pub use state::{FailureKind, FetchProgress, LoadFailure, OrchestratorState};
pub use status::{JobStatus, ProgressStats, StatusReport};
