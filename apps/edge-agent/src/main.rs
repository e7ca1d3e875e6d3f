//! # Outpost Edge Agent
//!
//! The edge-side daemon: a single periodic sync worker pulling scoped
//! snapshots from the central API and applying them atomically to the
//! local replica store.
//!
//! ## Usage
//! ```bash
//! # Default config (~/.config/outpost/agent.toml + env overrides)
//! cargo run -p outpost-edge-agent --bin edge-agent
//!
//! # Explicit config file
//! cargo run -p outpost-edge-agent --bin edge-agent -- --config ./agent.toml
//! ```

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use outpost_edge::{EdgeConfig, EdgeDb, EdgeDbConfig, SyncWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Outpost edge agent...");

    // Optional --config <path> argument
    let config_path = parse_config_arg();
    let config = EdgeConfig::load(config_path)?;
    info!(
        central = %config.central.base_url,
        interval_secs = config.sync.interval_secs,
        mac = config.device_mac().unwrap_or("<unconfigured>"),
        "Configuration loaded"
    );

    // Open the replica store (runs migrations)
    let db = EdgeDb::new(EdgeDbConfig::new(&config.store.database_path)).await?;
    info!("Edge database ready");

    if let Some(last) = db.sync_log().last_manifest_id().await? {
        info!(last_manifest_id = %last, "Resuming from previously applied manifest");
    }

    // Start the worker and wait for a shutdown signal
    let (worker, handle) = SyncWorker::new(config, db)?;
    let worker_task = tokio::spawn(worker.run());

    shutdown_signal().await;
    handle.shutdown().await;
    worker_task.await?;

    info!("Edge agent shutdown complete");
    Ok(())
}

/// Extracts `--config <path>` from the command line, if present.
fn parse_config_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config" || a == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping sync worker...");
}
