pub mod http;
pub mod types;

use crate::error::ApiError;

pub use http::HttpScanService;
pub use types::{
    DashboardStats, Health, QuarantineEntry, ScanJob, ScanResultEntry, ScanStarted, ScanStatus,
    ScanSummary, ScanType, ThreatLevel,
};

/// The scan backend as this client sees it.
///
/// Implementations map transport and HTTP failures into [`ApiError`]. All
/// reads are idempotent and safe to repeat; the two quarantine actions are
/// the only mutating calls.
pub trait ScanService {
    fn start_scan(
        &self,
        directory_path: &str,
        scan_type: ScanType,
    ) -> Result<ScanStarted, ApiError>;

    fn scan_status(&self, scan_id: &str) -> Result<ScanJob, ApiError>;

    /// Result entries for one scan. Meaningful only after the job reported
    /// [`ScanStatus::Completed`]; what the server returns for earlier calls is
    /// unspecified, and callers own that contract.
    fn scan_results(&self, scan_id: &str) -> Result<Vec<ScanResultEntry>, ApiError>;

    fn scan_history(&self) -> Result<Vec<ScanSummary>, ApiError>;

    fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    fn quarantine_list(&self) -> Result<Vec<QuarantineEntry>, ApiError>;

    fn restore_quarantine(&self, quarantine_id: &str) -> Result<(), ApiError>;

    fn delete_quarantine(&self, quarantine_id: &str) -> Result<(), ApiError>;

    fn health(&self) -> Result<Health, ApiError>;
}
