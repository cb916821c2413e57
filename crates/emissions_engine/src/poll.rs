use std::time::Duration;

use tokio_util::sync::CancellationToken;

use emissions_core::{ErrorClass, ErrorClassifier, JobKey, JobStatus, StatusReport};

use crate::error::ServiceError;
use crate::service::JobService;
use crate::time::Sleeper;

/// Poll cadence and bound for one flow.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

/// Terminal verdict of a polling run.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed,
    /// The service confirmed there is simply no data for the key.
    EmptyResult { message: String },
    JobFailed { message: String },
    Cancelled,
    /// Attempt cap exhausted and the final check did not report an
    /// actively working job.
    TimedOut { last: JobStatus },
}

/// Repeatedly checks a job's status until it terminates, the caller
/// cancels, or the attempt cap runs out.
///
/// Every observed report is handed to `observe` before it is acted on.
/// A transient network failure is swallowed while the last observed
/// status was `processing`; a job believed to be mid-flight is not
/// abandoned over a single hiccup. When the attempt cap is reached, one
/// out-of-band check decides: a backend still reporting `processing`
/// lifts the cap entirely, anything else is a timeout.
pub async fn poll_job(
    service: &dyn JobService,
    key: &JobKey,
    settings: &PollSettings,
    classifier: &ErrorClassifier,
    cancel: &CancellationToken,
    sleeper: &dyn Sleeper,
    mut observe: impl FnMut(&StatusReport),
) -> Result<PollOutcome, ServiceError> {
    let mut attempts: u32 = 0;
    let mut capped = true;
    let mut last_seen = JobStatus::NotStarted;

    loop {
        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }

        match service.status(key).await {
            Ok(report) => {
                observe(&report);
                last_seen = report.status;
                match report.status {
                    JobStatus::Completed => return Ok(PollOutcome::Completed),
                    JobStatus::Cancelled => return Ok(PollOutcome::Cancelled),
                    JobStatus::Error => {
                        let message = report.error_text();
                        return Ok(match classifier.classify(&message) {
                            ErrorClass::ExpectedEmpty => PollOutcome::EmptyResult { message },
                            ErrorClass::Job => PollOutcome::JobFailed { message },
                        });
                    }
                    JobStatus::NotStarted | JobStatus::Started | JobStatus::Processing => {}
                }
            }
            Err(err) if err.is_transient() && last_seen == JobStatus::Processing => {
                log::warn!("status check for {key} failed mid-flight: {err}; polling continues");
            }
            Err(err) => return Err(err),
        }

        attempts += 1;
        if capped && attempts >= settings.max_attempts {
            match service.status(key).await {
                Ok(report) if report.status == JobStatus::Processing => {
                    observe(&report);
                    last_seen = JobStatus::Processing;
                    capped = false;
                    log::info!("attempt cap reached for {key} while the backend is still working; polling continues uncapped");
                }
                _ => return Ok(PollOutcome::TimedOut { last: last_seen }),
            }
        }

        tokio::select! {
            _ = sleeper.sleep(settings.interval) => {}
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
        }
    }
}
