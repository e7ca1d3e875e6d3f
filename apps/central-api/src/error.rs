//! Error types for the central API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use outpost_central::CentralError;

/// HTTP-facing error wrapper around the central error taxonomy.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CentralError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            // Unknown or malformed device identity is a client problem.
            CentralError::DeviceNotFound { .. } => (StatusCode::BAD_REQUEST, self.0.to_string()),
            CentralError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),

            // Everything else is on us. The audit trail has the detail;
            // the wire gets a generic message.
            CentralError::Processing(_) | CentralError::Database(_) | CentralError::Migration(_) => {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError(CentralError::DeviceNotFound {
            mac: "00:00:00:00:00:00".into(),
        });
        assert_eq!(
            not_found.into_response().status(),
            StatusCode::BAD_REQUEST
        );

        let invalid = ApiError(CentralError::Validation(ValidationError::required("mac")));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let processing = ApiError(CentralError::Processing("boom".into()));
        assert_eq!(
            processing.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
