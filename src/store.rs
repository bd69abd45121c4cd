use crate::service::types::{DashboardStats, QuarantineEntry, ScanResultEntry, ScanSummary};

/// Last-fetched snapshot of everything the dashboard renders: stats, scan
/// history, quarantine items, and the current scan's result set.
///
/// All writes go through the named entry points below; nothing else mutates
/// the snapshot. In a threaded embedding the store needs a single writer,
/// which the poll loop and quarantine actions already are.
#[derive(Debug, Default)]
pub struct ResultStore {
    stats: Option<DashboardStats>,
    history: Vec<ScanSummary>,
    quarantine: Vec<QuarantineEntry>,
    results: Vec<ScanResultEntry>,
    results_scan_id: Option<String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    pub fn history(&self) -> &[ScanSummary] {
        &self.history
    }

    pub fn quarantine(&self) -> &[QuarantineEntry] {
        &self.quarantine
    }

    pub fn quarantine_entry(&self, quarantine_id: &str) -> Option<&QuarantineEntry> {
        self.quarantine
            .iter()
            .find(|e| e.quarantine_id == quarantine_id)
    }

    pub fn results(&self) -> &[ScanResultEntry] {
        &self.results
    }

    /// Id of the scan the current result snapshot belongs to.
    pub fn results_scan_id(&self) -> Option<&str> {
        self.results_scan_id.as_deref()
    }

    pub fn put_stats(&mut self, stats: DashboardStats) {
        self.stats = Some(stats);
    }

    pub fn put_history(&mut self, scans: Vec<ScanSummary>) {
        self.history = scans;
    }

    pub fn put_quarantine(&mut self, items: Vec<QuarantineEntry>) {
        self.quarantine = items;
    }

    /// Results are a frozen snapshot tied to one completed scan; storing a new
    /// snapshot replaces the previous one wholesale.
    pub fn put_results(&mut self, scan_id: &str, entries: Vec<ScanResultEntry>) {
        self.results = entries;
        self.results_scan_id = Some(scan_id.to_string());
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
        self.results_scan_id = None;
    }
}
