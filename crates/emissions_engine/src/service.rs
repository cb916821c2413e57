use emissions_core::{JobKey, MapPayload, StatusReport, SummaryPayload};
use serde::Deserialize;

use crate::error::ServiceError;

/// Reply to an existence probe. `summary` is only populated when the
/// probe asked for inline data and the service had it at hand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExistsReply {
    pub exists: bool,
    #[serde(default)]
    pub summary: Option<SummaryPayload>,
}

/// The service's answer to a job-start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartDisposition {
    /// Data was produced between the existence check and the start call.
    Exists,
    Started,
    /// A job for the key was already running.
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StartReply {
    pub status: StartDisposition,
}

/// Boundary to the remote job service.
///
/// One keyed surface covers both flows; a [`JobKey`] addresses either a
/// single day or a date range. Payload loads report service-confirmed
/// absence as `Ok(None)` rather than an error.
#[async_trait::async_trait]
pub trait JobService: Send + Sync {
    async fn exists(
        &self,
        key: &JobKey,
        include_summary: bool,
    ) -> Result<ExistsReply, ServiceError>;

    async fn start(&self, key: &JobKey) -> Result<StartReply, ServiceError>;

    async fn status(&self, key: &JobKey) -> Result<StatusReport, ServiceError>;

    /// Best-effort: the backend may finish the piece it is working on
    /// before it actually stops.
    async fn cancel(&self, key: &JobKey) -> Result<(), ServiceError>;

    async fn load_summary(&self, key: &JobKey) -> Result<Option<SummaryPayload>, ServiceError>;

    /// Map detail exists for day keys only; range keys yield `Ok(None)`.
    async fn load_map(&self, key: &JobKey) -> Result<Option<MapPayload>, ServiceError>;
}
