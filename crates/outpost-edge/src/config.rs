//! # Edge Agent Configuration
//!
//! Configuration for the edge sync agent.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     OUTPOST_DEVICE_MAC=48:b0:2d:e9:c3:b7                               │
//! │     OUTPOST_CENTRAL_URL=http://central.example:8080                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/outpost/agent.toml (Linux)                               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # agent.toml
//! [device]
//! mac = "48:b0:2d:e9:c3:b7"
//!
//! [central]
//! base_url = "http://central.example:8080"
//! request_timeout_secs = 120
//!
//! [sync]
//! interval_secs = 300
//! retry_delay_secs = 60
//!
//! [store]
//! database_path = "./outpost_edge.db"
//! ```
//!
//! A missing MAC is deliberately NOT a validation error: the worker skips
//! iterations and keeps logging until one is provisioned.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{EdgeError, EdgeResult};

// =============================================================================
// Sections
// =============================================================================

/// Identity of this edge device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Device MAC address. Empty until the device is provisioned.
    #[serde(default)]
    pub mac: Option<String>,
}

/// How to reach the central API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralSettings {
    /// Base URL of the central API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds). Generous: a full snapshot transfer must
    /// fit inside it.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Sync loop cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Interval between sync cycles (seconds).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Shorter delay after a failed or skipped cycle (seconds).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

/// Local replica store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path to the edge SQLite database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_request_timeout() -> u64 {
    120
}
fn default_interval() -> u64 {
    300
}
fn default_retry_delay() -> u64 {
    60
}
fn default_database_path() -> PathBuf {
    PathBuf::from("./outpost_edge.db")
}

impl Default for CentralSettings {
    fn default() -> Self {
        CentralSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            interval_secs: default_interval(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            database_path: default_database_path(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete edge agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeConfig {
    #[serde(default)]
    pub device: DeviceSettings,

    #[serde(default)]
    pub central: CentralSettings,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl EdgeConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (agent.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EdgeResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading edge config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EdgeResult<()> {
        if !self.central.base_url.starts_with("http://")
            && !self.central.base_url.starts_with("https://")
        {
            return Err(EdgeError::InvalidConfig(format!(
                "central base_url must start with http:// or https://, got: {}",
                self.central.base_url
            )));
        }

        if self.sync.interval_secs == 0 {
            return Err(EdgeError::InvalidConfig(
                "sync interval_secs must be greater than 0".into(),
            ));
        }

        if self.sync.retry_delay_secs == 0 {
            return Err(EdgeError::InvalidConfig(
                "sync retry_delay_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(mac) = std::env::var("OUTPOST_DEVICE_MAC") {
            debug!(mac = %mac, "Overriding device MAC from environment");
            self.device.mac = Some(mac);
        }

        if let Ok(url) = std::env::var("OUTPOST_CENTRAL_URL") {
            debug!(url = %url, "Overriding central URL from environment");
            self.central.base_url = url;
        }

        if let Ok(secs) = std::env::var("OUTPOST_SYNC_INTERVAL_SECS") {
            if let Ok(v) = secs.parse::<u64>() {
                self.sync.interval_secs = v;
            }
        }

        if let Ok(secs) = std::env::var("OUTPOST_SYNC_RETRY_DELAY_SECS") {
            if let Ok(v) = secs.parse::<u64>() {
                self.sync.retry_delay_secs = v;
            }
        }

        if let Ok(path) = std::env::var("OUTPOST_EDGE_DB") {
            self.store.database_path = PathBuf::from(path);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "outpost", "agent")
            .map(|dirs| dirs.config_dir().join("agent.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The configured MAC, if the device has been provisioned. Empty or
    /// whitespace-only values count as unconfigured.
    pub fn device_mac(&self) -> Option<&str> {
        self.device
            .mac
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Interval between sync cycles.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_secs)
    }

    /// Delay after a failed or skipped cycle.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.sync.retry_delay_secs)
    }

    /// Request timeout for calls to the central API.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.central.request_timeout_secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EdgeConfig::default();
        assert_eq!(config.sync.interval_secs, 300);
        assert_eq!(config.sync.retry_delay_secs, 60);
        assert_eq!(config.central.base_url, "http://localhost:8080");
        assert_eq!(config.device_mac(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [device]
            mac = "48:b0:2d:e9:c3:b7"

            [central]
            base_url = "http://central.example:9000"

            [sync]
            interval_secs = 120
        "#;

        let config: EdgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.device_mac(), Some("48:b0:2d:e9:c3:b7"));
        assert_eq!(config.central.base_url, "http://central.example:9000");
        assert_eq!(config.sync.interval_secs, 120);
        // Unspecified sections fall back to defaults
        assert_eq!(config.sync.retry_delay_secs, 60);
        assert_eq!(config.central.request_timeout_secs, 120);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = EdgeConfig::default();
        config.central.base_url = "ftp://nope".into();
        assert!(config.validate().is_err());

        let mut config = EdgeConfig::default();
        config.sync.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_mac_counts_as_unconfigured() {
        let mut config = EdgeConfig::default();
        config.device.mac = Some("   ".into());
        assert_eq!(config.device_mac(), None);
    }
}
