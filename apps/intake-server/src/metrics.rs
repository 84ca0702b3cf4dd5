//! Prometheus metrics for intake-server.
//!
//! Exposes server metrics in Prometheus format at the `/metrics` endpoint.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        "intake_http_requests_total",
        "Total number of HTTP requests by route and status"
    );
    describe_histogram!(
        "intake_http_request_duration_seconds",
        "Duration of HTTP requests in seconds"
    );
    describe_counter!(
        "intake_invitations_sent_total",
        "Invitation and resend emails accepted by the provider"
    );
    describe_counter!(
        "intake_dispatch_failures_total",
        "Invitation emails the provider rejected"
    );
    describe_counter!(
        "intake_submissions_total",
        "Forms submitted successfully"
    );

    Ok(handle)
}

pub fn record_http_request(route: String, status: u16, duration: std::time::Duration) {
    counter!("intake_http_requests_total", "route" => route.clone(), "status" => status.to_string())
        .increment(1);
    histogram!("intake_http_request_duration_seconds", "route" => route)
        .record(duration.as_secs_f64());
}

pub fn record_invitation_sent(kind: &'static str) {
    counter!("intake_invitations_sent_total", "kind" => kind).increment(1);
}

pub fn record_dispatch_failure(kind: &'static str) {
    counter!("intake_dispatch_failures_total", "kind" => kind).increment(1);
}

pub fn record_submission() {
    counter!("intake_submissions_total").increment(1);
}

/// Middleware counting every request under its route template.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(req).await;
    record_http_request(route, response.status().as_u16(), start.elapsed());
    response
}
