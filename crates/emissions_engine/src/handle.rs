use std::sync::{mpsc, Arc};
use std::thread;

use emissions_core::ResultCache;

use crate::day::{DayOrchestrator, DaySettings};
use crate::range::{RangeOrchestrator, RangeSettings};
use crate::service::JobService;
use crate::sink::{ChannelStateSink, StateEvent};

enum DashboardCommand {
    LoadDay { date: String },
    CancelDay { date: String },
    LoadRange { start: String, end: String },
    CancelRange { start: String, end: String },
}

/// Bridge between a synchronous presentation loop and the async
/// orchestrators: commands go in, state events come out.
///
/// Owns a tokio runtime on a dedicated thread; the day and range
/// orchestrators share one result cache but cancel independently.
pub struct DashboardHandle {
    cmd_tx: mpsc::Sender<DashboardCommand>,
    event_rx: mpsc::Receiver<StateEvent>,
}

impl DashboardHandle {
    pub fn new(
        service: Arc<dyn JobService>,
        day_settings: DaySettings,
        range_settings: RangeSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink = Arc::new(ChannelStateSink::new(event_tx));
        let cache = ResultCache::new();
        let day = DayOrchestrator::new(service.clone(), cache.clone(), sink.clone(), day_settings);
        let range = RangeOrchestrator::new(service, cache, sink, range_settings);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                dispatch(&runtime, &day, &range, command);
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn load_day(&self, date: impl Into<String>) {
        let _ = self.cmd_tx.send(DashboardCommand::LoadDay { date: date.into() });
    }

    pub fn cancel_day(&self, date: impl Into<String>) {
        let _ = self
            .cmd_tx
            .send(DashboardCommand::CancelDay { date: date.into() });
    }

    pub fn load_range(&self, start: impl Into<String>, end: impl Into<String>) {
        let _ = self.cmd_tx.send(DashboardCommand::LoadRange {
            start: start.into(),
            end: end.into(),
        });
    }

    pub fn cancel_range(&self, start: impl Into<String>, end: impl Into<String>) {
        let _ = self.cmd_tx.send(DashboardCommand::CancelRange {
            start: start.into(),
            end: end.into(),
        });
    }

    pub fn try_recv(&self) -> Option<StateEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocking receive for driver loops with nothing else to do.
    /// Returns `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<StateEvent> {
        self.event_rx.recv().ok()
    }
}

fn dispatch(
    runtime: &tokio::runtime::Runtime,
    day: &DayOrchestrator,
    range: &RangeOrchestrator,
    command: DashboardCommand,
) {
    match command {
        DashboardCommand::LoadDay { date } => {
            let day = day.clone();
            runtime.spawn(async move {
                day.load(&date).await;
            });
        }
        DashboardCommand::CancelDay { date } => day.cancel(&date),
        DashboardCommand::LoadRange { start, end } => {
            let range = range.clone();
            runtime.spawn(async move {
                range.load(&start, &end).await;
            });
        }
        DashboardCommand::CancelRange { start, end } => {
            let range = range.clone();
            runtime.spawn(async move {
                range.cancel(&start, &end).await;
            });
        }
    }
}
