use crate::{error::ApiError, service::ScanService, store::ResultStore};
use tracing::warn;

/// Store sections that can be re-fetched from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Stats,
    History,
    Quarantine,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Stats => "stats",
            Section::History => "history",
            Section::Quarantine => "quarantine",
        }
    }
}

/// Re-fetch one section into the store.
pub fn refresh_section<S: ScanService>(
    service: &S,
    store: &mut ResultStore,
    section: Section,
) -> Result<(), ApiError> {
    match section {
        Section::Stats => store.put_stats(service.dashboard_stats()?),
        Section::History => store.put_history(service.scan_history()?),
        Section::Quarantine => store.put_quarantine(service.quarantine_list()?),
    }
    Ok(())
}

/// Refresh several sections in order. A failing section is logged and
/// reported back; it never blocks the remaining sections.
pub fn refresh_sections<S: ScanService>(
    service: &S,
    store: &mut ResultStore,
    sections: &[Section],
) -> Vec<(Section, ApiError)> {
    let mut failures = Vec::new();
    for &section in sections {
        if let Err(err) = refresh_section(service, store, section) {
            warn!("refresh {} failed: {err}", section.name());
            failures.push((section, err));
        }
    }
    failures
}
