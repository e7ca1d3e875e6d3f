//! # Central API Client
//!
//! Thin HTTP client for the two central endpoints. All failures - I/O,
//! timeouts, non-success statuses, body decoding - surface as
//! `EdgeError::Transport`; the worker logs them and retries on its own
//! cadence. The request timeout is generous: a full snapshot transfer
//! must fit inside it, and a timed-out request is a failed iteration,
//! not a protocol error.

use std::time::Duration;
use tracing::{debug, info};

use crate::error::{EdgeError, EdgeResult};
use outpost_core::{SyncAcknowledgment, SyncBundle, SyncRequest};

/// HTTP client for the central sync API.
#[derive(Debug, Clone)]
pub struct CentralClient {
    http: reqwest::Client,
    base_url: String,
}

impl CentralClient {
    /// Creates a client against the given base URL (no trailing slash
    /// needed) with the given request timeout.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> EdgeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| EdgeError::Transport(e.to_string()))?;

        Ok(CentralClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Requests a manifest+data bundle for the given device MAC.
    pub async fn request_sync(&self, mac: &str) -> EdgeResult<SyncBundle> {
        let url = format!("{}/device-sync/request", self.base_url);
        debug!(url = %url, mac = %mac, "Requesting sync bundle");

        let response = self
            .http
            .post(&url)
            .json(&SyncRequest {
                mac: mac.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EdgeError::Transport(format!(
                "sync request returned {status}: {body}"
            )));
        }

        let bundle: SyncBundle = response.json().await?;

        info!(
            mac = %mac,
            manifest_id = %bundle.manifest.id,
            total_rows = bundle.data.total_rows(),
            "Received sync bundle"
        );
        Ok(bundle)
    }

    /// Reports the outcome of applying a manifest.
    pub async fn send_ack(&self, ack: &SyncAcknowledgment) -> EdgeResult<()> {
        let url = format!("{}/device-sync/ack", self.base_url);
        debug!(url = %url, manifest_id = %ack.manifest_id, "Sending acknowledgment");

        let response = self.http.post(&url).json(ack).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EdgeError::Transport(format!(
                "acknowledgment returned {status}: {body}"
            )));
        }

        info!(
            manifest_id = %ack.manifest_id,
            status = %ack.status,
            "Acknowledgment delivered"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client =
            CentralClient::new("http://central:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://central:8080");
    }
}
