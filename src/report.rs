use crate::{
    poll::TerminalReport,
    service::types::{FileVerdict, ScanResultEntry, ScanStatus, ThreatLevel},
    util::now_rfc3339,
};
use serde::Serialize;

/// Final summary printed (and optionally written) after a watched scan.
#[derive(Debug, Serialize)]
pub struct ScanRunReport {
    pub scan_id: String,
    pub status: ScanStatus,
    pub directory_path: Option<String>,
    pub total_files: u64,
    pub infected_files: u64,
    pub clean_files: u64,
    pub polls_issued: u32,
    pub finished: String,
    pub infected: Vec<InfectedFile>,
    pub results_error: Option<String>,
    pub refresh_failures: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InfectedFile {
    pub file_path: String,
    pub threat_level: ThreatLevel,
    pub detection_count: u32,
    pub total_engines: u32,
    pub virus_names: Vec<String>,
}

impl ScanRunReport {
    pub fn from_terminal(
        terminal: &TerminalReport,
        results: &[ScanResultEntry],
        polls_issued: u32,
    ) -> Self {
        let mut infected: Vec<InfectedFile> = results
            .iter()
            .filter(|r| r.scan_status == FileVerdict::Infected)
            .map(|r| InfectedFile {
                file_path: r.file_path.clone(),
                threat_level: r.threat_level,
                detection_count: r.detection_count,
                total_engines: r.total_engines,
                virus_names: r.virus_names.clone(),
            })
            .collect();
        // Worst findings first.
        infected.sort_by(|a, b| b.threat_level.cmp(&a.threat_level));

        Self {
            scan_id: terminal.job.scan_id.clone(),
            status: terminal.job.status,
            directory_path: terminal.job.directory_path.clone(),
            total_files: terminal.job.total_files,
            infected_files: terminal.job.infected_files,
            clean_files: terminal.job.clean_files,
            polls_issued,
            finished: now_rfc3339(),
            infected,
            results_error: terminal.results_error.as_ref().map(|e| e.to_string()),
            refresh_failures: terminal
                .refresh_errors
                .iter()
                .map(|(section, err)| format!("{}: {err}", section.name()))
                .collect(),
        }
    }
}
