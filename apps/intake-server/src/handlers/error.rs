//! HTTP mapping of [`LifecycleError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::LifecycleError;

/// Shown for both unknown and expired tokens so a probe learns nothing.
pub const INVALID_LINK_MESSAGE: &str = "Invitation link is invalid or has expired";

impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            LifecycleError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": INVALID_LINK_MESSAGE })),
            LifecycleError::Expired => (StatusCode::GONE, json!({ "error": INVALID_LINK_MESSAGE })),
            LifecycleError::ValidationFailed(v) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": v.message, "field": v.field, "reason": v.reason }),
            ),
            LifecycleError::AlreadyCompleted => {
                (StatusCode::CONFLICT, json!({ "error": self.to_string() }))
            }
            LifecycleError::UnsupportedDocumentField(_)
            | LifecycleError::InvalidRecipient(_)
            | LifecycleError::InvalidEdit(_)
            | LifecycleError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            LifecycleError::UploadFailed(_) | LifecycleError::DispatchFailed(_) => {
                (StatusCode::BAD_GATEWAY, json!({ "error": self.to_string() }))
            }
            LifecycleError::Store(e) => {
                error!("Storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
