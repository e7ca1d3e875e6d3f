//! Central API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.

use std::env;
use std::path::PathBuf;

/// Central API configuration.
#[derive(Debug, Clone)]
pub struct CentralConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the central SQLite database
    pub database_path: PathBuf,
}

impl CentralConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = CentralConfig {
            http_port: env::var("OUTPOST_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("OUTPOST_HTTP_PORT".to_string()))?,

            database_path: env::var("OUTPOST_CENTRAL_DB")
                .unwrap_or_else(|_| "./outpost_central.db".to_string())
                .into(),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only assert defaults when the environment doesn't override them.
        if env::var("OUTPOST_HTTP_PORT").is_err() && env::var("OUTPOST_CENTRAL_DB").is_err() {
            let config = CentralConfig::load().unwrap();
            assert_eq!(config.http_port, 8080);
            assert_eq!(config.database_path, PathBuf::from("./outpost_central.db"));
        }
    }
}
