use serde::{Deserialize, Serialize};

/// Lifecycle of a backend ingestion job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    NotStarted,
    Started,
    Processing,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Error | JobStatus::Cancelled
        )
    }
}

/// Structured counters for a range aggregation, beyond the free-text
/// progress message. The service guarantees
/// `dates_completed + dates_failed <= dates_processed <= dates_to_fetch <= total_days`;
/// `counters_consistent` lets callers notice when it does not hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_days: u32,
    pub dates_with_data: u32,
    pub dates_processed: u32,
    pub dates_to_fetch: u32,
    pub dates_completed: u32,
    pub dates_failed: u32,
    pub progress_percent: f32,
    pub phase: String,
    #[serde(default)]
    pub current_date: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
}

impl ProgressStats {
    pub fn counters_consistent(&self) -> bool {
        self.dates_completed + self.dates_failed <= self.dates_processed
            && self.dates_processed <= self.dates_to_fetch
            && self.dates_to_fetch <= self.total_days
    }

    pub fn clamped_percent(&self) -> f32 {
        self.progress_percent.clamp(0.0, 100.0)
    }
}

/// One observation of a job's status endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusReport {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub stats: Option<ProgressStats>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusReport {
    /// Best available human-readable description of an `error` status.
    pub fn error_text(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.progress.clone())
            .unwrap_or_else(|| "job failed without a message".to_string())
    }
}
