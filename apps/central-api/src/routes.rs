//! HTTP routes for the device sync protocol.
//!
//! The handlers are thin: extract, delegate to the orchestrator, map the
//! error taxonomy onto status codes. Malformed JSON bodies are rejected by
//! the `Json` extractor before any handler runs.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use outpost_core::{SyncAcknowledgment, SyncBundle, SyncRequest};

use crate::error::ApiError;
use crate::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/device-sync/request", post(request_sync))
        .route("/device-sync/ack", post(acknowledge_sync))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// `POST /device-sync/request` - build and return a scoped snapshot
/// bundle for the requesting device.
async fn request_sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncBundle>, ApiError> {
    info!(mac = %request.mac, "Received sync request");

    let bundle = state.orchestrator.request_sync(&request.mac).await?;
    Ok(Json(bundle))
}

/// `POST /device-sync/ack` - record an edge's outcome report. Always 200
/// once structurally valid, regardless of the reported status.
async fn acknowledge_sync(
    State(state): State<Arc<AppState>>,
    Json(ack): Json<SyncAcknowledgment>,
) -> Result<StatusCode, ApiError> {
    info!(mac = %ack.mac, manifest_id = %ack.manifest_id, "Received acknowledgment");

    state.orchestrator.acknowledge_sync(&ack).await?;
    Ok(StatusCode::OK)
}

/// `GET /healthz` - store liveness.
async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}
