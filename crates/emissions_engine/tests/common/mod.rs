#![allow(dead_code)]
//! Scripted doubles shared by the flow tests: a service that replays
//! queued replies, a sink that records transitions, and a sleeper that
//! returns instantly so no test waits on the wall clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use emissions_core::{
    ErrorClassifier, JobKey, JobStatus, MapPayload, OrchestratorState, ResultCache, StatusReport,
    SummaryPayload,
};
use emissions_engine::{
    DayOrchestrator, DaySettings, ExistsReply, JobService, RangeOrchestrator, RangeSettings,
    ServiceError, Sleeper, StartReply, StateEvent, StateSink,
};

#[derive(Default)]
pub struct CallCounts {
    pub exists: AtomicUsize,
    pub start: AtomicUsize,
    pub status: AtomicUsize,
    pub cancel: AtomicUsize,
    pub summary: AtomicUsize,
    pub map: AtomicUsize,
}

impl CallCounts {
    pub fn snapshot(&self) -> (usize, usize, usize, usize, usize, usize) {
        (
            self.exists.load(Ordering::SeqCst),
            self.start.load(Ordering::SeqCst),
            self.status.load(Ordering::SeqCst),
            self.cancel.load(Ordering::SeqCst),
            self.summary.load(Ordering::SeqCst),
            self.map.load(Ordering::SeqCst),
        )
    }

    pub fn total(&self) -> usize {
        let (a, b, c, d, e, f) = self.snapshot();
        a + b + c + d + e + f
    }
}

type Hook = Box<dyn Fn(usize) + Send + Sync>;

/// Service double that replays queued replies per operation. An empty
/// queue answers with a connectivity error so a misscripted test fails
/// loudly instead of hanging.
#[derive(Default)]
pub struct ScriptedService {
    exists_replies: Mutex<VecDeque<Result<ExistsReply, ServiceError>>>,
    start_replies: Mutex<VecDeque<Result<StartReply, ServiceError>>>,
    status_replies: Mutex<VecDeque<Result<StatusReport, ServiceError>>>,
    summary_replies: Mutex<VecDeque<Result<Option<SummaryPayload>, ServiceError>>>,
    map_replies: Mutex<VecDeque<Result<Option<MapPayload>, ServiceError>>>,
    status_hook: Mutex<Option<Hook>>,
    pub calls: CallCounts,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_exists(&self, reply: Result<ExistsReply, ServiceError>) {
        self.exists_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_start(&self, reply: Result<StartReply, ServiceError>) {
        self.start_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_status(&self, reply: Result<StatusReport, ServiceError>) {
        self.status_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_summary(&self, reply: Result<Option<SummaryPayload>, ServiceError>) {
        self.summary_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_map(&self, reply: Result<Option<MapPayload>, ServiceError>) {
        self.map_replies.lock().unwrap().push_back(reply);
    }

    /// Runs `hook` with the 1-based call number on every status check.
    pub fn on_status<F: Fn(usize) + Send + Sync + 'static>(&self, hook: F) {
        *self.status_hook.lock().unwrap() = Some(Box::new(hook));
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T, ServiceError>>>) -> Result<T, ServiceError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Connectivity("script exhausted".to_string())))
    }
}

#[async_trait::async_trait]
impl JobService for ScriptedService {
    async fn exists(
        &self,
        _key: &JobKey,
        _include_summary: bool,
    ) -> Result<ExistsReply, ServiceError> {
        self.calls.exists.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.exists_replies)
    }

    async fn start(&self, _key: &JobKey) -> Result<StartReply, ServiceError> {
        self.calls.start.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.start_replies)
    }

    async fn status(&self, _key: &JobKey) -> Result<StatusReport, ServiceError> {
        let call = self.calls.status.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = self.status_hook.lock().unwrap().as_ref() {
            hook(call);
        }
        Self::pop(&self.status_replies)
    }

    async fn cancel(&self, _key: &JobKey) -> Result<(), ServiceError> {
        self.calls.cancel.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_summary(&self, _key: &JobKey) -> Result<Option<SummaryPayload>, ServiceError> {
        self.calls.summary.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.summary_replies)
    }

    async fn load_map(&self, _key: &JobKey) -> Result<Option<MapPayload>, ServiceError> {
        self.calls.map.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.map_replies)
    }
}

/// Sink that records every emitted transition.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<StateEvent>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<StateEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.state.label())
            .collect()
    }
}

impl StateSink for CollectingSink {
    fn emit(&self, event: StateEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Sleeper that returns immediately but records the requested waits.
#[derive(Default)]
pub struct InstantSleeper {
    pub slept: Mutex<Vec<Duration>>,
}

#[async_trait::async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

pub fn processing(message: &str) -> StatusReport {
    StatusReport {
        status: JobStatus::Processing,
        progress: Some(message.to_string()),
        stats: None,
        error: None,
    }
}

pub fn completed() -> StatusReport {
    StatusReport {
        status: JobStatus::Completed,
        progress: None,
        stats: None,
        error: None,
    }
}

pub fn errored(message: &str) -> StatusReport {
    StatusReport {
        status: JobStatus::Error,
        progress: None,
        stats: None,
        error: Some(message.to_string()),
    }
}

pub fn summary_payload(date: &str) -> SummaryPayload {
    SummaryPayload {
        date: date.to_string(),
        flights_computed: 1200,
        total_co2_kg: 345_000.0,
        total_co2_tons: 345.0,
        top_routes: Vec::new(),
        top_departure_airports: Vec::new(),
    }
}

pub fn map_payload(date: &str) -> MapPayload {
    MapPayload {
        date: date.to_string(),
        airports: Vec::new(),
        routes: Vec::new(),
    }
}

/// Day orchestrator wired to the doubles, with a tight staleness guard
/// so stale-read tests stay small.
pub fn day_orchestrator(
    service: Arc<ScriptedService>,
    sink: Arc<CollectingSink>,
    cache: ResultCache,
) -> DayOrchestrator {
    let settings = DaySettings {
        stale_read_attempts: 2,
        ..DaySettings::default()
    };
    DayOrchestrator::with_parts(
        service,
        cache,
        sink,
        settings,
        Arc::new(InstantSleeper::default()),
        ErrorClassifier::default(),
    )
}

pub fn range_orchestrator(
    service: Arc<ScriptedService>,
    sink: Arc<CollectingSink>,
    cache: ResultCache,
) -> RangeOrchestrator {
    let settings = RangeSettings {
        read_attempts: 2,
        ..RangeSettings::default()
    };
    RangeOrchestrator::with_parts(
        service,
        cache,
        sink,
        settings,
        Arc::new(InstantSleeper::default()),
        ErrorClassifier::default(),
    )
}

/// Yields to the runtime so fire-and-forget tasks (the background map
/// load) get a chance to finish.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn assert_failed_kind(state: &OrchestratorState, kind: emissions_core::FailureKind) {
    match state {
        OrchestratorState::Failed(failure) => assert_eq!(failure.kind, kind),
        other => panic!("expected Failed({kind:?}), got {}", other.label()),
    }
}
