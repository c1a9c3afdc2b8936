//! Location source error types and handling

use thiserror::Error;

/// Errors a location source can report instead of a fix
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Source is disconnected or has no fix available
    #[error("location source '{source_name}' unavailable")]
    Unavailable { source_name: String },
    /// The platform refused access to location data
    #[error("location permission denied")]
    PermissionDenied,
    /// No fix arrived within the allowed time
    #[error("timed out waiting for a location fix after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// A fix arrived but could not be used
    #[error("invalid location fix: {reason}")]
    InvalidFix { reason: String },
}

/// Result type for location source operations
pub type SourceResult<T> = Result<T, SourceError>;

impl SourceError {
    /// Whether polling the source again may succeed
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SourceError::PermissionDenied)
    }
}
