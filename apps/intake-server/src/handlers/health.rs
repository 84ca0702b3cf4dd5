use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::server::IntakeServer;

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn metrics(State(server): State<IntakeServer>) -> Response {
    match &server.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
