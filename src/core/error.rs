//! Error types shared by the distance, index and tracker components

use thiserror::Error;

/// Result type for proximity operations
pub type GeoResult<T> = Result<T, GeoError>;

/// Proximity engine error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Argument outside its accepted domain (negative radius, NaN coordinate, ...)
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidArgument {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Lookup that was asked to fail on absence
    #[error("entity {id} not found")]
    NotFound { id: String },
}

impl GeoError {
    pub(crate) fn invalid(parameter: &str, value: impl ToString, reason: &str) -> Self {
        GeoError::InvalidArgument {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error was caused by the caller's input
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, GeoError::InvalidArgument { .. })
    }
}
