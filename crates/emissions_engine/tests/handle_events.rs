mod common;

use std::time::{Duration, Instant};

use emissions_core::OrchestratorState;
use emissions_engine::{DashboardHandle, DaySettings, ExistsReply, RangeSettings, StateEvent};

use common::{summary_payload, ScriptedService};

/// Drains events until one matches, like a UI loop would.
fn wait_for<F: Fn(&StateEvent) -> bool>(handle: &DashboardHandle, pred: F) -> Vec<StateEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        while let Some(event) = handle.try_recv() {
            let done = pred(&event);
            seen.push(event);
            if done {
                return seen;
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("no matching event within the deadline; saw {seen:?}");
}

#[test]
fn day_load_pushes_transitions_to_the_event_channel() {
    let service = ScriptedService::new();
    service.push_exists(Ok(ExistsReply {
        exists: true,
        summary: Some(summary_payload("2025-12-25")),
    }));
    service.push_map(Ok(None));

    let handle = DashboardHandle::new(service, DaySettings::default(), RangeSettings::default());
    handle.load_day("2025-12-25");

    let seen = wait_for(&handle, |event| {
        event.key == "2025-12-25" && matches!(event.state, OrchestratorState::Ready(_))
    });
    assert_eq!(seen[0].state.label(), "checking");
}

#[test]
fn validation_failures_reach_subscribers_with_the_raw_input() {
    let service = ScriptedService::new();
    let handle = DashboardHandle::new(service, DaySettings::default(), RangeSettings::default());
    handle.load_range("2025-12-25", "2025-12-20");

    let seen = wait_for(&handle, |event| {
        matches!(event.state, OrchestratorState::Failed(_))
    });
    assert_eq!(seen.last().unwrap().key, "2025-12-25..2025-12-20");
}
