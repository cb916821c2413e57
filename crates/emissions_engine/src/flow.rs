//! Steps shared by the day and range orchestrators.
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use emissions_core::{
    ErrorClassifier, FailureKind, FetchProgress, JobKey, LoadFailure, OrchestratorState,
    SummaryPayload,
};

use crate::error::ServiceError;
use crate::poll::{poll_job, PollOutcome, PollSettings};
use crate::service::{JobService, StartDisposition};
use crate::time::Sleeper;

/// What the start+poll step decided.
pub(crate) enum JobVerdict {
    /// The job finished, or the data already existed; go load it.
    Proceed,
    Terminal(OrchestratorState),
}

/// Starts the backend job for `key` and polls it to a verdict,
/// reporting progress through `on_progress`.
pub(crate) async fn start_and_poll(
    service: &dyn JobService,
    key: &JobKey,
    settings: &PollSettings,
    classifier: &ErrorClassifier,
    cancel: &CancellationToken,
    sleeper: &dyn Sleeper,
    mut on_progress: impl FnMut(FetchProgress),
) -> JobVerdict {
    on_progress(FetchProgress::default());

    let started = match service.start(key).await {
        Ok(reply) => reply,
        Err(err) => return JobVerdict::Terminal(OrchestratorState::Failed(err.failure())),
    };
    if started.status == StartDisposition::Exists {
        // Lost the race: the data appeared between the probe and the
        // start call. Nothing to poll.
        return JobVerdict::Proceed;
    }

    let outcome = poll_job(service, key, settings, classifier, cancel, sleeper, |report| {
        if let Some(stats) = &report.stats {
            if !stats.counters_consistent() {
                log::warn!("inconsistent progress counters for {key}: {stats:?}");
            }
        }
        // Terminal reports become terminal states, not progress.
        if !report.status.is_terminal() {
            on_progress(FetchProgress {
                message: report.progress.clone(),
                stats: report.stats.clone(),
            });
        }
    })
    .await;

    match outcome {
        Ok(PollOutcome::Completed) => JobVerdict::Proceed,
        Ok(PollOutcome::EmptyResult { message }) => JobVerdict::Terminal(
            OrchestratorState::Failed(LoadFailure::new(FailureKind::NotFoundExpected, message)),
        ),
        Ok(PollOutcome::JobFailed { message }) => JobVerdict::Terminal(OrchestratorState::Failed(
            LoadFailure::new(FailureKind::JobError, message),
        )),
        Ok(PollOutcome::Cancelled) => JobVerdict::Terminal(OrchestratorState::Cancelled),
        Ok(PollOutcome::TimedOut { last }) => {
            JobVerdict::Terminal(OrchestratorState::Failed(LoadFailure::new(
                FailureKind::Timeout,
                format!("job for {key} did not finish; last status {last:?}"),
            )))
        }
        Err(err) => JobVerdict::Terminal(OrchestratorState::Failed(err.failure())),
    }
}

/// Bounded wait for a payload the service claims to have.
///
/// Not-found and transient-error reads are retried until the attempt
/// ceiling; `Ok(None)` after that means the read went stale, or that
/// the caller cancelled (it checks its own token to tell the two
/// apart). Non-transient errors propagate immediately.
pub(crate) async fn read_summary_guarded(
    service: &dyn JobService,
    key: &JobKey,
    attempts: u32,
    interval: Duration,
    cancel: &CancellationToken,
    sleeper: &dyn Sleeper,
) -> Result<Option<SummaryPayload>, ServiceError> {
    for attempt in 0..attempts {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        match service.load_summary(key).await {
            Ok(Some(summary)) => return Ok(Some(summary)),
            Ok(None) => {}
            Err(err) if err.is_transient() => {
                log::warn!("summary read for {key} failed: {err}; retrying");
            }
            Err(err) => return Err(err),
        }
        if attempt + 1 < attempts {
            tokio::select! {
                _ = sleeper.sleep(interval) => {}
                _ = cancel.cancelled() => return Ok(None),
            }
        }
    }
    Ok(None)
}
