use std::fmt;

use crate::{CacheEntry, KeyError, ProgressStats};

/// Why a load ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed or out-of-order key, rejected before any I/O.
    Validation,
    /// Service unreachable; the user should check the backend, not the date.
    Connectivity,
    /// Service-confirmed absence of data for a valid key. Not a fault.
    NotFoundExpected,
    /// The service reported a failure of its own computation.
    JobError,
    /// Staleness guard or poll attempt cap exhausted.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "validation"),
            FailureKind::Connectivity => write!(f, "connectivity"),
            FailureKind::NotFoundExpected => write!(f, "no data available"),
            FailureKind::JobError => write!(f, "job error"),
            FailureKind::Timeout => write!(f, "timeout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl LoadFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(err: KeyError) -> Self {
        Self::new(FailureKind::Validation, err.to_string())
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Progress snapshot while a backend job is in flight.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchProgress {
    pub message: Option<String>,
    pub stats: Option<ProgressStats>,
}

/// Per-key lifecycle of a load, consumed by the presentation layer.
///
/// A load terminates in `Ready`, `Failed` or `Cancelled`. A fresh
/// request for a key already `Ready` short-circuits to the cache and
/// never re-enters the intermediate states.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorState {
    Idle,
    Checking,
    Fetching(FetchProgress),
    Loading,
    Ready(CacheEntry),
    Failed(LoadFailure),
    Cancelled,
}

impl OrchestratorState {
    /// Short name for logs and plain-text UIs.
    pub fn label(&self) -> &'static str {
        match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::Checking => "checking",
            OrchestratorState::Fetching(_) => "fetching",
            OrchestratorState::Loading => "loading",
            OrchestratorState::Ready(_) => "ready",
            OrchestratorState::Failed(_) => "failed",
            OrchestratorState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestratorState::Ready(_)
                | OrchestratorState::Failed(_)
                | OrchestratorState::Cancelled
        )
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            OrchestratorState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
