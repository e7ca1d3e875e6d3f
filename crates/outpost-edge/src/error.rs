//! Edge-side error types.

use thiserror::Error;

use outpost_core::CoreError;

/// Result type alias for edge operations.
pub type EdgeResult<T> = Result<T, EdgeError>;

/// Edge sync errors.
///
/// ## Design Principles
/// - The worker treats every processing error as a Failed attempt to
///   acknowledge, never as a reason to stop the loop
/// - Transport errors are retried only by the loop's natural cadence
#[derive(Debug, Error)]
pub enum EdgeError {
    // =========================================================================
    // Refusals (before any table is touched)
    // =========================================================================
    /// The bundle's manifest expired before it could be applied.
    #[error("Manifest {manifest_id} expired at {expires_at}")]
    ManifestExpired {
        manifest_id: String,
        expires_at: String,
    },

    /// The manifest's schema version is not one this edge understands.
    #[error("Unsupported schema version {actual} (expected {expected})")]
    UnsupportedSchemaVersion { expected: i32, actual: i32 },

    /// The manifest's table list does not match the canonical table set.
    #[error("Manifest table set mismatch: {0}")]
    TableSetMismatch(String),

    // =========================================================================
    // Verification
    // =========================================================================
    /// Loaded row counts or hashes disagree with the manifest. The whole
    /// load was rolled back; the message concatenates one entry per
    /// mismatching table.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    // =========================================================================
    // Transport
    // =========================================================================
    /// Network error or non-success response from the central API.
    #[error("Transport error: {0}")]
    Transport(String),

    // =========================================================================
    // Storage
    // =========================================================================
    /// Replica database query failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Replica database migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    // =========================================================================
    // Configuration
    // =========================================================================
    /// Invalid edge agent configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the configuration file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Canonical serialization failed while re-hashing loaded rows.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl EdgeError {
    /// True if the next loop iteration may reasonably succeed without
    /// operator intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EdgeError::Transport(_)
                | EdgeError::ManifestExpired { .. }
                | EdgeError::VerificationFailed(_)
                | EdgeError::Database(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<sqlx::Error> for EdgeError {
    fn from(err: sqlx::Error) -> Self {
        EdgeError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for EdgeError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        EdgeError::Migration(err.to_string())
    }
}

impl From<reqwest::Error> for EdgeError {
    fn from(err: reqwest::Error) -> Self {
        EdgeError::Transport(err.to_string())
    }
}

impl From<CoreError> for EdgeError {
    fn from(err: CoreError) -> Self {
        EdgeError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EdgeError {
    fn from(err: std::io::Error) -> Self {
        EdgeError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EdgeError {
    fn from(err: toml::de::Error) -> Self {
        EdgeError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(EdgeError::Transport("connection refused".into()).is_retryable());
        assert!(EdgeError::VerificationFailed("hash mismatch".into()).is_retryable());

        assert!(!EdgeError::UnsupportedSchemaVersion { expected: 1, actual: 9 }.is_retryable());
        assert!(!EdgeError::InvalidConfig("bad url".into()).is_retryable());
    }
}
