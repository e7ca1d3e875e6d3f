//! Core error types.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors from the pure protocol layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Canonical serialization failed while computing a content hash.
    ///
    /// The replicated row types serialize infallibly, so this only fires
    /// for foreign `Serialize` impls passed through the generic hasher.
    #[error("Canonical serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Input validation errors, raised at the wire boundary before any
/// business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A field does not match its expected format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A numeric field is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error for the given field.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
