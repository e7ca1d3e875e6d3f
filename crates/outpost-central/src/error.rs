//! Central-side error types.
//!
//! The taxonomy the HTTP layer maps onto status codes:
//! `DeviceNotFound` and `Validation` become client errors, `Processing`
//! and `Database` become server errors. Failures are recorded as audit
//! rows and never retried centrally.

use thiserror::Error;

use outpost_core::{CoreError, ValidationError};

/// Result type alias for central operations.
pub type CentralResult<T> = Result<T, CentralError>;

/// Central sync errors.
#[derive(Debug, Error)]
pub enum CentralError {
    /// The requested MAC has no matching device. No manifest is generated.
    #[error("Device not found for MAC {mac}")]
    DeviceNotFound { mac: String },

    /// Malformed request or acknowledgment body. Rejected before any
    /// business logic runs; never logged as a sync failure.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unexpected failure while resolving scope or building a manifest.
    /// Recorded in the audit trail with this message as the reason.
    #[error("Sync processing failed: {0}")]
    Processing(String),

    /// Database query failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Database migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for CentralError {
    fn from(err: sqlx::Error) -> Self {
        CentralError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for CentralError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        CentralError::Migration(err.to_string())
    }
}

impl From<CoreError> for CentralError {
    fn from(err: CoreError) -> Self {
        CentralError::Processing(err.to_string())
    }
}

impl From<serde_json::Error> for CentralError {
    fn from(err: serde_json::Error) -> Self {
        CentralError::Processing(err.to_string())
    }
}
