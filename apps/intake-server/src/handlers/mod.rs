//! HTTP surface.

pub mod admin;
pub mod client;
pub mod error;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::metrics::track_requests;
use crate::server::IntakeServer;

/// Base64 inflates by 4/3; leave room for the JSON envelope.
fn upload_body_limit(max_file_bytes: usize) -> usize {
    max_file_bytes / 3 * 4 + 64 * 1024
}

pub fn router(server: IntakeServer) -> Router {
    let public = Router::new()
        .route("/token/{token}", get(client::get_invitation))
        .route("/token/{token}/save-draft", post(client::save_draft))
        .route("/token/{token}/submit", post(client::submit))
        .route(
            "/token/{token}/upload",
            post(client::upload).layer(DefaultBodyLimit::max(upload_body_limit(
                server.config.uploads.max_bytes,
            ))),
        );

    let admin = Router::new()
        .route("/send", post(admin::send))
        .route("/send-bulk", post(admin::send_bulk))
        .route("/resend", post(admin::resend))
        .route("/admin/invitations", get(admin::list))
        .route(
            "/admin/invitations/{id}",
            get(admin::get).patch(admin::patch),
        )
        .route(
            "/admin/reminders",
            get(admin::get_reminders).put(admin::put_reminders),
        )
        .route_layer(middleware::from_fn_with_state(
            server.clone(),
            admin::require_admin,
        ));

    let ops = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/metrics", get(health::metrics));

    Router::new()
        .merge(public)
        .merge(admin)
        .merge(ops)
        .nest_service("/uploads", ServeDir::new(&server.config.uploads.dir))
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}
