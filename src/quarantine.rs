use crate::{
    error::ApiError,
    refresh::{self, Section},
    service::ScanService,
    store::ResultStore,
};
use tracing::info;

/// Outcome of a successful quarantine action: the id acted on plus any
/// dependent-refresh failures (reported, never escalated).
#[derive(Debug)]
pub struct ActionReport {
    pub quarantine_id: String,
    pub refresh_errors: Vec<(Section, ApiError)>,
}

/// Restore a quarantined file to its original path.
///
/// Single request, no retry, no optimistic update: the store is only touched
/// after the server confirms, via a refresh of quarantine items and dashboard
/// stats (history is unaffected by quarantine actions).
pub fn restore<S: ScanService>(
    service: &S,
    store: &mut ResultStore,
    quarantine_id: &str,
) -> Result<ActionReport, ApiError> {
    service.restore_quarantine(quarantine_id)?;
    info!("restored quarantine entry {quarantine_id}");
    Ok(ActionReport {
        quarantine_id: quarantine_id.to_string(),
        refresh_errors: refresh::refresh_sections(
            service,
            store,
            &[Section::Quarantine, Section::Stats],
        ),
    })
}

/// Permanently delete a quarantined file. Same contract as [`restore`].
pub fn delete<S: ScanService>(
    service: &S,
    store: &mut ResultStore,
    quarantine_id: &str,
) -> Result<ActionReport, ApiError> {
    service.delete_quarantine(quarantine_id)?;
    info!("deleted quarantine entry {quarantine_id}");
    Ok(ActionReport {
        quarantine_id: quarantine_id.to_string(),
        refresh_errors: refresh::refresh_sections(
            service,
            store,
            &[Section::Quarantine, Section::Stats],
        ),
    })
}
