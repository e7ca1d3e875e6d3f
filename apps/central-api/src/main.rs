//! # Outpost Central API
//!
//! HTTP server exposing the device sync protocol to edge agents.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Central API Server                               │
//! │                                                                         │
//! │  edge agent ───► HTTP (8080) ───► SyncOrchestrator ───► SQLite         │
//! │                                                                         │
//! │  POST /device-sync/request   →  { manifest, data }                     │
//! │  POST /device-sync/ack       →  200 (recorded)                         │
//! │  GET  /healthz               →  200 / 503                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use outpost_central::{CentralDb, CentralDbConfig, SyncOrchestrator};

use crate::config::CentralConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Outpost central API server...");

    // Load configuration
    let config = CentralConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path.display(),
        "Configuration loaded"
    );

    // Connect to the central store (runs migrations)
    let db = CentralDb::new(CentralDbConfig::new(&config.database_path)).await?;
    info!("Connected to central database");

    // Create shared state
    let state = Arc::new(AppState {
        orchestrator: SyncOrchestrator::new(db.clone()),
        db,
    });

    // Build router and serve
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Shared application state.
pub struct AppState {
    pub db: CentralDb,
    pub orchestrator: SyncOrchestrator,
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
