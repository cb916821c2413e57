use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use emissions_core::{
    ErrorClassifier, FailureKind, JobKey, LoadFailure, OrchestratorState, ResultCache,
    SummaryPayload,
};

use crate::flow::{read_summary_guarded, start_and_poll, JobVerdict};
use crate::poll::PollSettings;
use crate::service::JobService;
use crate::sink::{StateEvent, StateSink};
use crate::time::{Sleeper, TokioSleeper};

/// Settings for the single-date flow.
#[derive(Debug, Clone)]
pub struct DaySettings {
    pub poll: PollSettings,
    /// Ceiling on waiting for a summary the service claims to have; a
    /// read still empty after this many attempts is treated as stale.
    pub stale_read_attempts: u32,
    pub stale_read_interval: Duration,
}

impl Default for DaySettings {
    fn default() -> Self {
        Self {
            poll: PollSettings::default(),
            stale_read_attempts: 20,
            stale_read_interval: Duration::from_secs(1),
        }
    }
}

/// Drives the existence -> start -> poll -> load sequence for single
/// dates and writes the results into the shared cache.
#[derive(Clone)]
pub struct DayOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    service: Arc<dyn JobService>,
    cache: ResultCache,
    sink: Arc<dyn StateSink>,
    sleeper: Arc<dyn Sleeper>,
    classifier: ErrorClassifier,
    settings: DaySettings,
    states: Mutex<HashMap<JobKey, OrchestratorState>>,
    cancels: Mutex<HashMap<JobKey, CancellationToken>>,
}

impl DayOrchestrator {
    pub fn new(
        service: Arc<dyn JobService>,
        cache: ResultCache,
        sink: Arc<dyn StateSink>,
        settings: DaySettings,
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

    /// Full-control constructor; tests inject an instant sleeper and a
    /// custom error classifier here.
    pub fn with_parts(
        service: Arc<dyn JobService>,
        cache: ResultCache,
        sink: Arc<dyn StateSink>,
        settings: DaySettings,
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

    /// Snapshot of the current state for a date, if it was ever requested.
    pub fn state(&self, date: &str) -> Option<OrchestratorState> {
        let key = JobKey::day(date).ok()?;
        self.inner
            .states
            .lock()
            .expect("state map lock")
            .get(&key)
            .cloned()
    }

    /// Cooperative cancel of an in-flight load; repeated calls and
    /// calls without a matching load are no-ops.
    pub fn cancel(&self, date: &str) {
        let Ok(key) = JobKey::day(date) else { return };
        if let Some(token) = self
            .inner
            .cancels
            .lock()
            .expect("cancel map lock")
            .get(&key)
        {
            token.cancel();
        }
    }

    /// Loads the summary for one date, driving the state machine to a
    /// terminal state and returning it. The map detail is fetched in
    /// the background after `Ready` and merged into the cache when it
    /// arrives; its failure never demotes `Ready`.
    pub async fn load(&self, date: &str) -> OrchestratorState {
        let key = match JobKey::day(date) {
            Ok(key) => key,
            Err(err) => {
                log::warn!("rejected day request {date:?}: {err}");
                let state = OrchestratorState::Failed(LoadFailure::validation(err));
                self.inner.sink.emit(StateEvent {
                    key: date.to_string(),
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
        let state = self.publish(&key, terminal);
        if matches!(state, OrchestratorState::Ready(_)) {
            self.spawn_map_load(key);
        }
        state
    }

    async fn run(&self, key: &JobKey, cancel: &CancellationToken) -> OrchestratorState {
        let inner = &self.inner;
        self.publish(key, OrchestratorState::Checking);

        let probe = match inner.service.exists(key, true).await {
            Ok(reply) => reply,
            Err(err) => return OrchestratorState::Failed(err.failure()),
        };
        if cancel.is_cancelled() {
            return OrchestratorState::Cancelled;
        }
        if let Some(summary) = probe.summary {
            // Inline fast path: the probe already carried the payload,
            // no second round trip needed.
            return self.store(key, cancel, summary);
        }

        let mut needs_job = !probe.exists;
        let mut restarted = false;
        loop {
            if needs_job {
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
                inner.settings.stale_read_attempts,
                inner.settings.stale_read_interval,
                cancel,
                inner.sleeper.as_ref(),
            )
            .await;
            match read {
                Ok(Some(summary)) => return self.store(key, cancel, summary),
                Ok(None) if cancel.is_cancelled() => return OrchestratorState::Cancelled,
                Ok(None) if !restarted => {
                    // Stale read: the service says the data exists but
                    // never served it. Restart the job once before
                    // surfacing anything to the user.
                    log::warn!("summary for {key} did not arrive in time; forcing a fresh job");
                    restarted = true;
                    needs_job = true;
                }
                Ok(None) => {
                    return OrchestratorState::Failed(LoadFailure::new(
                        FailureKind::Timeout,
                        format!("summary for {key} was not readable after a fresh job"),
                    ))
                }
                Err(err) => return OrchestratorState::Failed(err.failure()),
            }
        }
    }

    fn store(
        &self,
        key: &JobKey,
        cancel: &CancellationToken,
        summary: SummaryPayload,
    ) -> OrchestratorState {
        if cancel.is_cancelled() {
            // The result arrived after a cancel; discard it rather than
            // apply it to state.
            return OrchestratorState::Cancelled;
        }
        let entry = self.inner.cache.insert_summary(key, summary);
        OrchestratorState::Ready(entry)
    }

    fn spawn_map_load(&self, key: JobKey) {
        let this = self.clone();
        tokio::spawn(async move {
            match this.inner.service.load_map(&key).await {
                Ok(Some(map)) => {
                    if let Some(entry) = this.inner.cache.merge_map(&key, map) {
                        this.publish(&key, OrchestratorState::Ready(entry));
                    }
                }
                Ok(None) => log::debug!("no map detail available for {key}"),
                Err(err) => {
                    log::warn!("map detail load for {key} failed: {err}; summary stays usable")
                }
            }
        });
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
