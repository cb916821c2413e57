use emissions_core::{FailureKind, LoadFailure};
use thiserror::Error;

/// Transport-level failures talking to the remote job service.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service unreachable: {0}")]
    Connectivity(String),
    #[error("request timed out: {0}")]
    RequestTimeout(String),
    #[error("service returned http {status}")]
    Http { status: u16 },
    #[error("could not decode service response: {0}")]
    Decode(String),
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

impl ServiceError {
    /// Errors that may resolve on their own while a job keeps running.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Connectivity(_) | ServiceError::RequestTimeout(_) => true,
            ServiceError::Http { status } => *status >= 500,
            ServiceError::Decode(_) | ServiceError::InvalidUrl(_) => false,
        }
    }

    /// Collapses the transport error into the user-facing taxonomy.
    pub fn failure(&self) -> LoadFailure {
        let kind = match self {
            ServiceError::Connectivity(_)
            | ServiceError::RequestTimeout(_)
            | ServiceError::InvalidUrl(_) => FailureKind::Connectivity,
            ServiceError::Http { .. } | ServiceError::Decode(_) => FailureKind::JobError,
        };
        LoadFailure::new(kind, self.to_string())
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::RequestTimeout(err.to_string());
    }
    if err.is_decode() {
        return ServiceError::Decode(err.to_string());
    }
    ServiceError::Connectivity(err.to_string())
}
