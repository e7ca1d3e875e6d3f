//! # Edge Sync Worker
//!
//! The single-threaded periodic loop driving the whole edge side:
//! request a bundle, hand it to the processor, acknowledge the outcome,
//! sleep until the next interval.
//!
//! ## Loop Behavior
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SyncWorker loop                                 │
//! │                                                                         │
//! │  no MAC configured ──► log, wait retry delay, try again                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  request bundle ──► process ──► acknowledge                            │
//! │       │                                                                 │
//! │       ├── cycle completed ──► sleep full interval                      │
//! │       ├── any error ───────► log, sleep short retry delay             │
//! │       │                                                                 │
//! │       └── shutdown signal ──► exit loop (in-flight work finishes       │
//! │                               or rolls back first)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A single failed cycle never terminates the loop; the worker is designed
//! to run indefinitely across transient errors. Verification failures are
//! not worker errors - they are completed cycles whose acknowledgment
//! reports Failed.

use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::client::CentralClient;
use crate::config::EdgeConfig;
use crate::error::EdgeResult;
use crate::pool::EdgeDb;
use crate::processor::SyncProcessor;
use outpost_core::{SyncAcknowledgment, SyncOutcome};

/// Outcome of one loop iteration, deciding the next sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cycle {
    /// Request → process → acknowledge all ran (whatever the processor
    /// verdict was). Sleep the full interval.
    Completed,

    /// No device identity configured; nothing was attempted.
    Skipped,
}

/// Periodic sync worker.
pub struct SyncWorker {
    config: EdgeConfig,
    client: CentralClient,
    processor: SyncProcessor,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping a running worker from outside.
#[derive(Debug, Clone)]
pub struct SyncWorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncWorkerHandle {
    /// Signals the worker to shut down after its current iteration.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl SyncWorker {
    /// Creates a worker and its control handle.
    pub fn new(config: EdgeConfig, db: EdgeDb) -> EdgeResult<(SyncWorker, SyncWorkerHandle)> {
        let client = CentralClient::new(&config.central.base_url, config.request_timeout())?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = SyncWorker {
            config,
            client,
            processor: SyncProcessor::new(db),
            shutdown_rx,
        };

        Ok((worker, SyncWorkerHandle { shutdown_tx }))
    }

    /// Runs the loop until a shutdown signal arrives. Cancellation is
    /// cooperative: the signal is checked between sleeps, and an in-flight
    /// iteration finishes (or rolls back) rather than being interrupted
    /// mid-transaction.
    pub async fn run(mut self) {
        info!(
            interval_secs = self.config.sync.interval_secs,
            central = %self.config.central.base_url,
            "Sync worker started"
        );

        loop {
            let delay = match self.run_once().await {
                Ok(Cycle::Completed) => self.config.sync_interval(),
                Ok(Cycle::Skipped) => self.config.retry_delay(),
                Err(err) => {
                    error!(%err, retryable = err.is_retryable(), "Sync cycle failed");
                    self.config.retry_delay()
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown_rx.recv() => {
                    info!("Sync worker received shutdown");
                    break;
                }
            }
        }

        info!("Sync worker stopped");
    }

    /// One iteration: request, process, acknowledge.
    async fn run_once(&self) -> EdgeResult<Cycle> {
        let Some(mac) = self.config.device_mac() else {
            warn!("MAC address not configured, skipping sync");
            return Ok(Cycle::Skipped);
        };

        let started = Instant::now();
        info!(mac = %mac, "Starting sync cycle");

        let bundle = self.client.request_sync(mac).await?;
        let manifest = &bundle.manifest;

        // The processor's verdict becomes the acknowledgment, not a worker
        // failure: the replica rolled back and the loop carries on.
        let (status, error) = match self.processor.process(&bundle).await {
            Ok(()) => (SyncOutcome::Success, None),
            Err(err) => {
                warn!(manifest_id = %manifest.id, %err, "Processor rejected bundle");
                (SyncOutcome::Failed, Some(err.to_string()))
            }
        };

        let ack = SyncAcknowledgment {
            manifest_id: manifest.id.clone(),
            mac: mac.to_string(),
            status,
            local_counts: manifest.declared_counts(),
            local_checksums: manifest.declared_checksums(),
            duration_ms: started.elapsed().as_millis() as i64,
            error,
        };

        self.client.send_ack(&ack).await?;

        info!(
            mac = %mac,
            manifest_id = %manifest.id,
            status = %status,
            duration_ms = ack.duration_ms,
            "Completed sync cycle"
        );
        Ok(Cycle::Completed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{EdgeDb, EdgeDbConfig};
    use std::time::Duration;

    #[tokio::test]
    async fn test_unconfigured_mac_skips_without_network() {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();
        let (worker, _handle) = SyncWorker::new(EdgeConfig::default(), db).unwrap();

        // No MAC configured: the cycle must short-circuit before any
        // request is attempted (there is no server to talk to here).
        let cycle = worker.run_once().await.unwrap();
        assert_eq!(cycle, Cycle::Skipped);
    }

    #[tokio::test]
    async fn test_unreachable_central_is_a_retryable_cycle_error() {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();

        let mut config = EdgeConfig::default();
        config.device.mac = Some("48:b0:2d:e9:c3:b7".into());
        config.central.base_url = "http://127.0.0.1:1".into(); // nothing listens here
        config.central.request_timeout_secs = 2;

        let (worker, _handle) = SyncWorker::new(config, db).unwrap();

        let err = worker.run_once().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();

        // Unconfigured MAC: the loop only ever skips and sleeps.
        let (worker, handle) = SyncWorker::new(EdgeConfig::default(), db).unwrap();

        let task = tokio::spawn(worker.run());
        handle.shutdown().await;

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("worker should stop after shutdown")
            .unwrap();
    }
}
