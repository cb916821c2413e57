use emissions_core::OrchestratorState;

/// One observed state transition, pushed to the presentation layer.
///
/// `key` is the display form of the job key ("2025-12-25" or
/// "2025-12-20..2025-12-25"); for a request rejected by validation it
/// carries the raw input, since no valid key exists.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEvent {
    pub key: String,
    pub state: OrchestratorState,
}

pub trait StateSink: Send + Sync {
    fn emit(&self, event: StateEvent);
}

/// Sink that forwards transitions over an mpsc channel, for UIs that
/// drain events from their own loop.
pub struct ChannelStateSink {
    tx: std::sync::mpsc::Sender<StateEvent>,
}

impl ChannelStateSink {
    pub fn new(tx: std::sync::mpsc::Sender<StateEvent>) -> Self {
        Self { tx }
    }
}

impl StateSink for ChannelStateSink {
    fn emit(&self, event: StateEvent) {
        let _ = self.tx.send(event);
    }
}

/// Sink for callers that only read snapshots through `state(..)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StateSink for NullSink {
    fn emit(&self, _event: StateEvent) {}
}
