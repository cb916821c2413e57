use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use emissions_core::{
    ErrorClassifier, FailureKind, JobKey, LoadFailure, OrchestratorState, ResultCache,
};

use crate::flow::{read_summary_guarded, start_and_poll, JobVerdict};
use crate::poll::PollSettings;
use crate::service::JobService;
use crate::sink::{StateEvent, StateSink};
use crate::time::{Sleeper, TokioSleeper};

/// Settings for the date-range aggregation flow. The poll interval is
/// longer than the day flow's, matching multi-day aggregation latency.
#[derive(Debug, Clone)]
pub struct RangeSettings {
    pub poll: PollSettings,
    pub read_attempts: u32,
    pub read_interval: Duration,
}

impl Default for RangeSettings {
    fn default() -> Self {
        Self {
            poll: PollSettings {
                interval: Duration::from_secs(5),
                max_attempts: 240,
            },
            read_attempts: 5,
            read_interval: Duration::from_secs(1),
        }
    }
}

/// Drives range aggregation: validate, check, start, poll with
/// progress statistics, load the aggregated result.
#[derive(Clone)]
pub struct RangeOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    service: Arc<dyn JobService>,
    cache: ResultCache,
    sink: Arc<dyn StateSink>,
    sleeper: Arc<dyn Sleeper>,
    classifier: ErrorClassifier,
    settings: RangeSettings,
    states: Mutex<HashMap<JobKey, OrchestratorState>>,
    cancels: Mutex<HashMap<JobKey, CancellationToken>>,
}

impl RangeOrchestrator {
    pub fn new(
        service: Arc<dyn JobService>,
        cache: ResultCache,
        sink: Arc<dyn StateSink>,
        settings: RangeSettings,
    ) -> Self {
        Self::with_parts(
            service,
            cache,
            sink,
            settings,
            Arc::new(TokioSleeper),
            ErrorClassifier::default(),
        )
    }

    pub fn with_parts(
        service: Arc<dyn JobService>,
        cache: ResultCache,
        sink: Arc<dyn StateSink>,
        settings: RangeSettings,
        sleeper: Arc<dyn Sleeper>,
        classifier: ErrorClassifier,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                cache,
                sink,
                sleeper,
                classifier,
                settings,
                states: Mutex::new(HashMap::new()),
                cancels: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn state(&self, start: &str, end: &str) -> Option<OrchestratorState> {
        let key = JobKey::range(start, end).ok()?;
        self.inner
            .states
            .lock()
            .expect("state map lock")
            .get(&key)
            .cloned()
    }

    /// Stops polling locally and asks the backend to cancel the range
    /// job. The backend cancel is best-effort; the local state reflects
    /// `cancelled` regardless of how far the backend gets.
    pub async fn cancel(&self, start: &str, end: &str) {
        let Ok(key) = JobKey::range(start, end) else {
            return;
        };
        let token = self
            .inner
            .cancels
            .lock()
            .expect("cancel map lock")
            .get(&key)
            .cloned();
        if let Some(token) = token {
            token.cancel();
        }
        if let Err(err) = self.inner.service.cancel(&key).await {
            log::warn!("backend cancel for {key} failed: {err}");
        }
    }

    /// Loads the aggregated summary for an inclusive date range,
    /// driving the state machine to a terminal state and returning it.
    pub async fn load(&self, start: &str, end: &str) -> OrchestratorState {
        let key = match JobKey::range(start, end) {
            Ok(key) => key,
            Err(err) => {
                log::warn!("rejected range request {start:?}..{end:?}: {err}");
                let state = OrchestratorState::Failed(LoadFailure::validation(err));
                self.inner.sink.emit(StateEvent {
                    key: format!("{start}..{end}"),
                    state: state.clone(),
                });
                return state;
            }
        };

        if let Some(entry) = self.inner.cache.get(&key) {
            log::debug!("cache hit for {key}");
            return self.publish(&key, OrchestratorState::Ready(entry));
        }

        let cancel = self.begin(&key);
        let terminal = self.run(&key, &cancel).await;
        self.publish(&key, terminal)
    }

    async fn run(&self, key: &JobKey, cancel: &CancellationToken) -> OrchestratorState {
        let inner = &self.inner;
        self.publish(key, OrchestratorState::Checking);

        let probe = match inner.service.exists(key, false).await {
            Ok(reply) => reply,
            Err(err) => return OrchestratorState::Failed(err.failure()),
        };
        if cancel.is_cancelled() {
            return OrchestratorState::Cancelled;
        }

        if !probe.exists {
            let verdict = start_and_poll(
                inner.service.as_ref(),
                key,
                &inner.settings.poll,
                &inner.classifier,
                cancel,
                inner.sleeper.as_ref(),
                |progress| {
                    self.publish(key, OrchestratorState::Fetching(progress));
                },
            )
            .await;
            if let JobVerdict::Terminal(state) = verdict {
                return state;
            }
        }

        self.publish(key, OrchestratorState::Loading);
        let read = read_summary_guarded(
            inner.service.as_ref(),
            key,
            inner.settings.read_attempts,
            inner.settings.read_interval,
            cancel,
            inner.sleeper.as_ref(),
        )
        .await;
        match read {
            Ok(Some(summary)) => {
                if cancel.is_cancelled() {
                    return OrchestratorState::Cancelled;
                }
                let entry = inner.cache.insert_summary(key, summary);
                OrchestratorState::Ready(entry)
            }
            Ok(None) if cancel.is_cancelled() => OrchestratorState::Cancelled,
            Ok(None) => OrchestratorState::Failed(LoadFailure::new(
                FailureKind::Timeout,
                format!("aggregated result for {key} was not readable after completion"),
            )),
            Err(err) => OrchestratorState::Failed(err.failure()),
        }
    }

    fn begin(&self, key: &JobKey) -> CancellationToken {
        let token = CancellationToken::new();
        self.inner
            .cancels
            .lock()
            .expect("cancel map lock")
            .insert(key.clone(), token.clone());
        token
    }

    fn publish(&self, key: &JobKey, state: OrchestratorState) -> OrchestratorState {
        log::debug!("{key} -> {}", state.label());
        self.inner
            .states
            .lock()
            .expect("state map lock")
            .insert(key.clone(), state.clone());
        self.inner.sink.emit(StateEvent {
            key: key.to_string(),
            state: state.clone(),
        });
        state
    }
}
