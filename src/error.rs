use thiserror::Error;

/// Failures surfaced by the scan service client.
///
/// `Validation`, `NotFound` and `Conflict` carry the server-provided detail
/// message so callers can show it verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or connection failure, including per-call timeouts.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the request input (HTTP 400).
    #[error("rejected by server: {0}")]
    Validation(String),

    /// The server does not know the requested id (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The action does not apply to the entry's current state, e.g. restoring
    /// an already-restored quarantine item.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A success response whose body does not match the documented shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Any other non-success status.
    #[error("unexpected response (HTTP {status}): {detail}")]
    Unexpected { status: u16, detail: String },
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}
