#![allow(dead_code)]

use scanwatch::error::ApiError;
use scanwatch::poll::{CancelFlag, Clock};
use scanwatch::service::types::*;
use scanwatch::service::ScanService;
use std::cell::RefCell;
use std::time::Duration;

/// Scripted stand-in for the backend: a queue of status replies plus a log of
/// every call issued, in order. Quarantine behaves like the real server:
/// restore conflicts on an already-restored entry, delete removes it.
pub struct ScriptedService {
    statuses: RefCell<Vec<Result<ScanJob, ApiError>>>,
    results: RefCell<Vec<ScanResultEntry>>,
    quarantine: RefCell<Vec<QuarantineEntry>>,
    /// Fired while a status request is "in flight", to simulate a
    /// cancellation racing the response.
    cancel_during_status: RefCell<Option<CancelFlag>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedService {
    pub fn new(statuses: Vec<Result<ScanJob, ApiError>>) -> Self {
        Self {
            statuses: RefCell::new(statuses),
            results: RefCell::new(Vec::new()),
            quarantine: RefCell::new(Vec::new()),
            cancel_during_status: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_results(self, results: Vec<ScanResultEntry>) -> Self {
        *self.results.borrow_mut() = results;
        self
    }

    pub fn with_quarantine(self, items: Vec<QuarantineEntry>) -> Self {
        *self.quarantine.borrow_mut() = items;
        self
    }

    pub fn cancel_during_next_status(&self, flag: CancelFlag) {
        *self.cancel_during_status.borrow_mut() = Some(flag);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl ScanService for ScriptedService {
    fn start_scan(
        &self,
        _directory_path: &str,
        _scan_type: ScanType,
    ) -> Result<ScanStarted, ApiError> {
        self.record("start");
        Ok(ScanStarted {
            scan_id: "scan-1".into(),
            status: "started".into(),
            message: "Scan started successfully".into(),
        })
    }

    fn scan_status(&self, _scan_id: &str) -> Result<ScanJob, ApiError> {
        self.record("status");
        if let Some(flag) = self.cancel_during_status.borrow_mut().take() {
            flag.cancel();
        }
        let mut queue = self.statuses.borrow_mut();
        if queue.is_empty() {
            return Err(ApiError::Network("status script exhausted".into()));
        }
        queue.remove(0)
    }

    fn scan_results(&self, _scan_id: &str) -> Result<Vec<ScanResultEntry>, ApiError> {
        self.record("results");
        Ok(self.results.borrow().clone())
    }

    fn scan_history(&self) -> Result<Vec<ScanSummary>, ApiError> {
        self.record("history");
        Ok(Vec::new())
    }

    fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.record("stats");
        let live = self
            .quarantine
            .borrow()
            .iter()
            .filter(|e| !e.restored)
            .count() as u64;
        Ok(DashboardStats {
            total_scans: 4,
            total_files_scanned: 120,
            total_threats_found: 3,
            quarantine_count: live,
            recent_scans: Vec::new(),
            last_updated: None,
        })
    }

    fn quarantine_list(&self) -> Result<Vec<QuarantineEntry>, ApiError> {
        self.record("quarantine");
        Ok(self.quarantine.borrow().clone())
    }

    fn restore_quarantine(&self, quarantine_id: &str) -> Result<(), ApiError> {
        self.record(format!("restore:{quarantine_id}"));
        let mut items = self.quarantine.borrow_mut();
        match items.iter_mut().find(|e| e.quarantine_id == quarantine_id) {
            None => Err(ApiError::NotFound("Quarantine item not found".into())),
            Some(entry) if entry.restored => {
                Err(ApiError::Conflict("File already restored".into()))
            }
            Some(entry) => {
                entry.restored = true;
                Ok(())
            }
        }
    }

    fn delete_quarantine(&self, quarantine_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete:{quarantine_id}"));
        let mut items = self.quarantine.borrow_mut();
        let before = items.len();
        items.retain(|e| e.quarantine_id != quarantine_id);
        if items.len() == before {
            return Err(ApiError::NotFound("Quarantine item not found".into()));
        }
        Ok(())
    }

    fn health(&self) -> Result<Health, ApiError> {
        self.record("health");
        Ok(Health {
            status: "healthy".into(),
            service: Some("antivirus-scanner".into()),
        })
    }
}

/// Clock that records requested sleeps instead of waiting.
pub struct ManualClock {
    pub sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            sleeps: RefCell::new(Vec::new()),
        }
    }
}

impl Clock for ManualClock {
    fn sleep(&self, d: Duration) {
        self.sleeps.borrow_mut().push(d);
    }
}

pub fn job(scan_id: &str, status: ScanStatus) -> ScanJob {
    ScanJob {
        scan_id: scan_id.into(),
        status,
        directory_path: Some("/srv/files".into()),
        started_date: Some("2025-06-01T10:00:00Z".into()),
        completed_date: None,
        total_files: 3,
        infected_files: 1,
        clean_files: 2,
    }
}

pub fn quarantined(quarantine_id: &str, restored: bool) -> QuarantineEntry {
    QuarantineEntry {
        quarantine_id: quarantine_id.into(),
        original_path: "/srv/files/evil.exe".into(),
        file_name: "evil.exe".into(),
        threat_level: ThreatLevel::High,
        virus_names: vec!["Trojan.Generic".into()],
        quarantined_date: Some("2025-06-01T10:05:00Z".into()),
        restored,
    }
}

pub fn infected_entry(file_path: &str, threat_level: ThreatLevel) -> ScanResultEntry {
    ScanResultEntry {
        file_name: file_path.rsplit('/').next().unwrap_or(file_path).into(),
        file_path: file_path.into(),
        scan_status: FileVerdict::Infected,
        threat_level,
        virus_names: vec!["Trojan.Generic".into()],
        detection_count: 7,
        total_engines: 70,
        file_size: Some(4096),
        file_hash: None,
        scan_date: None,
    }
}
