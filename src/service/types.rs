use serde::{Deserialize, Serialize};

/// Lifecycle state the scan service reports for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl ScanStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

/// Ordinal severity. The backend emits "unknown" when an engine errored out,
/// which ranks below a confirmed clean verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    Clean = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    Critical = 5,
    #[serde(other)]
    Unknown = 0,
}

/// Per-file verdict inside a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileVerdict {
    Scanning,
    Clean,
    Infected,
    Error,
    #[serde(other)]
    Unknown,
}

/// Scan type accepted by the start endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Quick,
    Full,
    Custom,
}

impl ScanType {
    pub fn parse(raw: &str) -> Option<ScanType> {
        match raw {
            "quick" => Some(ScanType::Quick),
            "full" => Some(ScanType::Full),
            "custom" => Some(ScanType::Custom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanType::Quick => "quick",
            ScanType::Full => "full",
            ScanType::Custom => "custom",
        }
    }
}

impl Default for ScanType {
    fn default() -> Self {
        ScanType::Quick
    }
}

/// One server-tracked scan execution, as returned by the status endpoint.
/// Replaced wholesale by every status response, never mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub scan_id: String,
    pub status: ScanStatus,
    #[serde(default)]
    pub directory_path: Option<String>,
    #[serde(default)]
    pub started_date: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub infected_files: u64,
    #[serde(default)]
    pub clean_files: u64,
}

/// Acknowledgement of a scan start request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStarted {
    pub scan_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// One file's outcome inside a completed scan. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResultEntry {
    pub file_name: String,
    pub file_path: String,
    pub scan_status: FileVerdict,
    pub threat_level: ThreatLevel,
    #[serde(default)]
    pub virus_names: Vec<String>,
    #[serde(default)]
    pub detection_count: u32,
    #[serde(default)]
    pub total_engines: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub file_hash: Option<String>,
    #[serde(default)]
    pub scan_date: Option<String>,
}

/// A file the server isolated due to a detected threat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineEntry {
    pub quarantine_id: String,
    pub original_path: String,
    pub file_name: String,
    pub threat_level: ThreatLevel,
    #[serde(default)]
    pub virus_names: Vec<String>,
    #[serde(default)]
    pub quarantined_date: Option<String>,
    #[serde(default)]
    pub restored: bool,
}

impl QuarantineEntry {
    /// Restore and delete are offered only while the entry is still live;
    /// a restored entry is terminal from the client's perspective.
    pub fn actions_available(&self) -> bool {
        !self.restored
    }
}

/// Aggregate counters plus a bounded recent-scan list. Fully re-fetched,
/// never mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_scans: u64,
    #[serde(default)]
    pub total_files_scanned: u64,
    #[serde(default)]
    pub total_threats_found: u64,
    #[serde(default)]
    pub quarantine_count: u64,
    #[serde(default)]
    pub recent_scans: Vec<RecentScan>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentScan {
    pub scan_id: String,
    #[serde(default)]
    pub directory_path: Option<String>,
    #[serde(default)]
    pub started_date: Option<String>,
    #[serde(default)]
    pub scan_completed: bool,
}

/// One row of the scan history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: String,
    #[serde(default)]
    pub directory_path: Option<String>,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub started_date: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub scan_completed: bool,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub infected_files: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

// Collection endpoints wrap their payloads in envelopes; the client unwraps
// them before anything else sees the data.

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsEnvelope {
    #[serde(default)]
    pub results: Vec<ScanResultEntry>,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEnvelope {
    #[serde(default)]
    pub scans: Vec<ScanSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuarantineEnvelope {
    #[serde(default)]
    pub quarantine_items: Vec<QuarantineEntry>,
}
