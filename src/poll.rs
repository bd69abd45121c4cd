//! Scan-lifecycle polling: repeatedly query a job's status until a terminal
//! state is observed, then fan out to the dependent fetches exactly once.
//!
//! The machine itself is timing-free: `tick()` performs one status query and
//! whatever follows from it, while the delay between ticks lives in `run()`
//! behind the `Clock` trait, so tests drive the loop without real waits.

use crate::{
    config::Polling,
    error::ApiError,
    refresh::{self, Section},
    service::types::{ScanJob, ScanStatus},
    service::ScanService,
    store::ResultStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Timer used between polls. Production code sleeps; tests inject a
/// recording clock.
pub trait Clock {
    fn sleep(&self, d: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Shared cancellation switch. Cloning hands out another handle to the same
/// underlying flag, so the loop owner and the supervisor can both fire it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to do when a status query itself fails mid-poll. The backend contract
/// leaves this open, so it is configuration rather than inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorPolicy {
    /// Treat the failure as informational and query again on the next tick.
    RetryNextTick,
    /// Give up on the loop immediately.
    Abort,
}

impl TransportErrorPolicy {
    /// Config spelling ("retry" / "abort"). Unknown values fall back to retry
    /// with a warning rather than killing the loop over a typo.
    pub fn from_config(raw: &str) -> Self {
        match raw {
            "abort" => TransportErrorPolicy::Abort,
            "retry" => TransportErrorPolicy::RetryNextTick,
            other => {
                warn!("unknown polling.on_transport_error: {other:?}; using retry");
                TransportErrorPolicy::RetryNextTick
            }
        }
    }
}

/// Loop lifecycle. `Completed`, `Failed` and `Cancelled` are terminal for
/// this instance; a new scan gets a fresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Completed,
    Failed,
    Cancelled,
}

impl PollState {
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            PollState::Completed | PollState::Failed | PollState::Cancelled
        )
    }
}

/// Outcome of a single `tick()`.
#[derive(Debug)]
pub enum Tick {
    /// Non-terminal status observed; poll again after the interval.
    Pending(ScanJob),
    /// Terminal status observed; the dependent fetches were issued.
    Finished(TerminalReport),
    /// Status query failed and policy keeps the loop alive for the next tick.
    Deferred(ApiError),
    /// Status query failed and policy gave up.
    Aborted(ApiError),
    /// The cancel handle fired; nothing was issued.
    Cancelled,
    /// The loop had already reached a terminal state; nothing was issued.
    Settled,
}

/// What happened at the terminal transition.
#[derive(Debug)]
pub struct TerminalReport {
    pub job: ScanJob,
    /// Error from the single results fetch, if it failed. Only a completed
    /// job gets a results fetch at all.
    pub results_error: Option<ApiError>,
    /// Sections whose refresh failed; the rest of the fan-out still ran.
    pub refresh_errors: Vec<(Section, ApiError)>,
}

impl TerminalReport {
    pub fn completed(&self) -> bool {
        self.job.status == ScanStatus::Completed
    }
}

pub struct ScanPollLoop<'a, S: ScanService> {
    service: &'a S,
    scan_id: String,
    interval: Duration,
    on_transport_error: TransportErrorPolicy,
    cancel: CancelFlag,
    state: PollState,
    polls_issued: u32,
}

impl<'a, S: ScanService> ScanPollLoop<'a, S> {
    pub fn new(service: &'a S, cfg: &Polling, scan_id: impl Into<String>) -> Self {
        Self {
            service,
            scan_id: scan_id.into(),
            interval: Duration::from_secs(cfg.interval_seconds),
            on_transport_error: TransportErrorPolicy::from_config(&cfg.on_transport_error),
            cancel: CancelFlag::new(),
            state: PollState::Idle,
            polls_issued: 0,
        }
    }

    pub fn scan_id(&self) -> &str {
        &self.scan_id
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Status queries issued so far.
    pub fn polls_issued(&self) -> u32 {
        self.polls_issued
    }

    /// Handle for external cancellation (user leaves the scan view, or a new
    /// scan replaces this one).
    pub fn cancel_handle(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// One status query, plus the dependent fan-out when a terminal status is
    /// first observed. Timing-free; the caller owns the delay between ticks.
    pub fn tick(&mut self, store: &mut ResultStore) -> Tick {
        if self.cancel.is_cancelled() {
            self.state = PollState::Cancelled;
            return Tick::Cancelled;
        }
        if self.state.is_settled() {
            return Tick::Settled;
        }

        self.state = PollState::Polling;
        self.polls_issued += 1;
        info!("poll #{} scan_id={}", self.polls_issued, self.scan_id);

        let job = match self.service.scan_status(&self.scan_id) {
            Ok(job) => job,
            Err(err) => {
                return match self.on_transport_error {
                    TransportErrorPolicy::RetryNextTick => {
                        warn!("status query failed, retrying next tick: {err}");
                        Tick::Deferred(err)
                    }
                    TransportErrorPolicy::Abort => {
                        self.state = PollState::Failed;
                        Tick::Aborted(err)
                    }
                };
            }
        };

        // A cancellation that raced the request discards the in-flight
        // response: no state change, no fan-out.
        if self.cancel.is_cancelled() {
            self.state = PollState::Cancelled;
            return Tick::Cancelled;
        }

        if !job.status.is_terminal() {
            return Tick::Pending(job);
        }

        Tick::Finished(self.finish(job, store))
    }

    /// Drive the loop to a settled state: tick, then sleep the fixed interval
    /// while the job is still running.
    pub fn run(&mut self, store: &mut ResultStore, clock: &dyn Clock) -> Tick {
        loop {
            match self.tick(store) {
                Tick::Pending(_) | Tick::Deferred(_) => clock.sleep(self.interval),
                settled => return settled,
            }
        }
    }

    /// The terminal fan-out: one results fetch plus one refresh each of
    /// stats, history and quarantine. Issued strictly after the terminal
    /// status was observed, and only for a completed job; each call is
    /// independent and a failure never suppresses the rest.
    fn finish(&mut self, job: ScanJob, store: &mut ResultStore) -> TerminalReport {
        let mut results_error = None;
        let mut refresh_errors = Vec::new();

        if job.status == ScanStatus::Completed {
            self.state = PollState::Completed;
            match self.service.scan_results(&job.scan_id) {
                Ok(entries) => {
                    info!(
                        "scan {} completed with {} result entries",
                        job.scan_id,
                        entries.len()
                    );
                    store.put_results(&job.scan_id, entries);
                }
                Err(err) => {
                    warn!("results fetch failed: {err}");
                    results_error = Some(err);
                }
            }
            refresh_errors = refresh::refresh_sections(
                self.service,
                store,
                &[Section::Stats, Section::History, Section::Quarantine],
            );
        } else {
            self.state = PollState::Failed;
            warn!("scan {} reported as failed by the server", job.scan_id);
        }

        TerminalReport {
            job,
            results_error,
            refresh_errors,
        }
    }
}

/// Enforces the one-active-scan rule: activating a loop for a new scan
/// cancels any live loop first, so two refresh cascades can never race.
#[derive(Debug, Default)]
pub struct ScanSupervisor {
    active: Option<(String, CancelFlag)>,
}

impl ScanSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_scan(&self) -> Option<&str> {
        self.active.as_ref().map(|(id, _)| id.as_str())
    }

    /// Cancel whatever is live and hand out a fresh loop for `scan_id`.
    pub fn activate<'a, S: ScanService>(
        &mut self,
        service: &'a S,
        cfg: &Polling,
        scan_id: &str,
    ) -> ScanPollLoop<'a, S> {
        self.cancel_active();
        let poll = ScanPollLoop::new(service, cfg, scan_id);
        self.active = Some((scan_id.to_string(), poll.cancel_handle()));
        poll
    }

    pub fn cancel_active(&mut self) {
        if let Some((old_id, flag)) = self.active.take() {
            info!("cancelling poll loop for scan {old_id}");
            flag.cancel();
        }
    }
}
