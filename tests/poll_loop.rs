mod common;

use common::{infected_entry, job, ManualClock, ScriptedService};
use scanwatch::config::Polling;
use scanwatch::error::ApiError;
use scanwatch::poll::{PollState, ScanPollLoop, ScanSupervisor, Tick};
use scanwatch::service::types::{ScanStatus, ThreatLevel};
use scanwatch::store::ResultStore;
use std::time::Duration;

#[test]
fn completed_scan_fans_out_once_in_order() {
    let service = ScriptedService::new(vec![
        Ok(job("scan-1", ScanStatus::InProgress)),
        Ok(job("scan-1", ScanStatus::InProgress)),
        Ok(job("scan-1", ScanStatus::Completed)),
    ])
    .with_results(vec![infected_entry(
        "/srv/files/evil.exe",
        ThreatLevel::High,
    )]);

    let mut store = ResultStore::new();
    let mut poll = ScanPollLoop::new(&service, &Polling::default(), "scan-1");
    let clock = ManualClock::new();

    let outcome = poll.run(&mut store, &clock);

    assert!(matches!(outcome, Tick::Finished(ref t) if t.completed()));
    // The results fetch happens only after the terminal status, followed by
    // exactly one refresh per dependent section.
    assert_eq!(
        service.calls(),
        vec!["status", "status", "status", "results", "stats", "history", "quarantine"]
    );
    assert_eq!(
        clock.sleeps.borrow().as_slice(),
        &[Duration::from_secs(3), Duration::from_secs(3)]
    );
    assert_eq!(poll.polls_issued(), 3);
    assert_eq!(poll.state(), PollState::Completed);
    assert_eq!(store.results().len(), 1);
    assert_eq!(store.results_scan_id(), Some("scan-1"));
    assert!(store.stats().is_some());
}

#[test]
fn failed_scan_gets_no_results_or_refreshes() {
    let service = ScriptedService::new(vec![
        Ok(job("scan-2", ScanStatus::InProgress)),
        Ok(job("scan-2", ScanStatus::Failed)),
    ]);

    let mut store = ResultStore::new();
    let mut poll = ScanPollLoop::new(&service, &Polling::default(), "scan-2");
    let outcome = poll.run(&mut store, &ManualClock::new());

    match outcome {
        Tick::Finished(terminal) => assert!(!terminal.completed()),
        other => panic!("expected Finished, got {other:?}"),
    }
    assert_eq!(service.calls(), vec!["status", "status"]);
    assert_eq!(poll.state(), PollState::Failed);
    assert!(store.results().is_empty());
    assert!(store.stats().is_none());
}

#[test]
fn queued_status_is_not_terminal() {
    let service = ScriptedService::new(vec![
        Ok(job("scan-3", ScanStatus::Queued)),
        Ok(job("scan-3", ScanStatus::Completed)),
    ]);

    let mut store = ResultStore::new();
    let mut poll = ScanPollLoop::new(&service, &Polling::default(), "scan-3");
    let outcome = poll.run(&mut store, &ManualClock::new());

    assert!(matches!(outcome, Tick::Finished(_)));
    assert_eq!(poll.polls_issued(), 2);
}

#[test]
fn cancel_stops_all_further_calls() {
    let service = ScriptedService::new(vec![
        Ok(job("scan-4", ScanStatus::InProgress)),
        Ok(job("scan-4", ScanStatus::InProgress)),
        Ok(job("scan-4", ScanStatus::Completed)),
    ]);

    let mut store = ResultStore::new();
    let mut poll = ScanPollLoop::new(&service, &Polling::default(), "scan-4");

    assert!(matches!(poll.tick(&mut store), Tick::Pending(_)));
    poll.cancel_handle().cancel();

    assert!(matches!(poll.tick(&mut store), Tick::Cancelled));
    assert!(matches!(poll.tick(&mut store), Tick::Cancelled));
    assert_eq!(poll.state(), PollState::Cancelled);

    // Only the tick before cancellation reached the backend.
    assert_eq!(service.calls(), vec!["status"]);
}

#[test]
fn cancellation_discards_in_flight_response() {
    // The cancel fires while the terminal status response is in flight; the
    // loop must drop it without any fan-out.
    let service = ScriptedService::new(vec![Ok(job("scan-5", ScanStatus::Completed))]);
    let mut store = ResultStore::new();
    let mut poll = ScanPollLoop::new(&service, &Polling::default(), "scan-5");
    service.cancel_during_next_status(poll.cancel_handle());

    assert!(matches!(poll.tick(&mut store), Tick::Cancelled));
    assert_eq!(service.calls(), vec!["status"]);
    assert!(store.results().is_empty());
    assert_eq!(poll.state(), PollState::Cancelled);
}

#[test]
fn transport_error_retries_on_next_tick_by_default() {
    let service = ScriptedService::new(vec![
        Err(ApiError::Network("connection refused".into())),
        Ok(job("scan-6", ScanStatus::Completed)),
    ]);

    let mut store = ResultStore::new();
    let mut poll = ScanPollLoop::new(&service, &Polling::default(), "scan-6");
    let clock = ManualClock::new();
    let outcome = poll.run(&mut store, &clock);

    assert!(matches!(outcome, Tick::Finished(_)));
    assert_eq!(
        service.calls(),
        vec!["status", "status", "results", "stats", "history", "quarantine"]
    );
    assert_eq!(clock.sleeps.borrow().len(), 1);
}

#[test]
fn transport_error_aborts_when_configured() {
    let cfg = Polling {
        interval_seconds: 3,
        on_transport_error: "abort".into(),
    };
    let service = ScriptedService::new(vec![Err(ApiError::Network(
        "connection refused".into(),
    ))]);

    let mut store = ResultStore::new();
    let mut poll = ScanPollLoop::new(&service, &cfg, "scan-7");
    let outcome = poll.run(&mut store, &ManualClock::new());

    assert!(matches!(outcome, Tick::Aborted(ApiError::Network(_))));
    assert_eq!(service.calls(), vec!["status"]);
    assert_eq!(poll.state(), PollState::Failed);

    // A settled loop never issues anything again.
    assert!(matches!(poll.tick(&mut store), Tick::Settled));
    assert_eq!(service.calls(), vec!["status"]);
}

#[test]
fn supervisor_cancels_previous_loop_before_activating_next() {
    let service = ScriptedService::new(vec![
        Ok(job("scan-a", ScanStatus::InProgress)),
        Ok(job("scan-b", ScanStatus::InProgress)),
    ]);
    let cfg = Polling::default();
    let mut store = ResultStore::new();
    let mut supervisor = ScanSupervisor::new();

    let mut loop_a = supervisor.activate(&service, &cfg, "scan-a");
    assert!(matches!(loop_a.tick(&mut store), Tick::Pending(_)));
    assert_eq!(supervisor.active_scan(), Some("scan-a"));

    let mut loop_b = supervisor.activate(&service, &cfg, "scan-b");
    assert_eq!(supervisor.active_scan(), Some("scan-b"));

    // The stale loop is dead: no further backend calls from it.
    assert!(matches!(loop_a.tick(&mut store), Tick::Cancelled));
    assert_eq!(service.calls(), vec!["status"]);

    // The fresh loop polls normally.
    assert!(matches!(loop_b.tick(&mut store), Tick::Pending(_)));
    assert_eq!(service.calls(), vec!["status", "status"]);
}
