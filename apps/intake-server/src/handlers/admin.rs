//! Admin routes, behind a bearer token.

use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use intake_reminders::ReminderConfig;
use intake_storage::{InvitationFilter, InvitationId, InvitationStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::admin_edit::AdminEdit;
use crate::error::LifecycleError;
use crate::invitations::{self, AdminInvitationView, BulkRecipient, BulkSendResult, ResendTarget};
use crate::server::IntakeServer;

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Reject requests without the configured bearer token.
///
/// Digests are compared so the comparison length never depends on the input.
pub async fn require_admin(State(server): State<IntakeServer>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match (server.config.admin_token.as_deref(), presented) {
        (Some(expected), Some(given)) if digest(expected) == digest(given) => next.run(req).await,
        (None, _) => {
            warn!("Admin request rejected: INTAKE_ADMIN_TOKEN is not configured");
            unauthorized()
        }
        _ => unauthorized(),
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "admin authentication required" })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn send(
    State(server): State<IntakeServer>,
    Json(req): Json<SendRequest>,
) -> Result<(StatusCode, Json<AdminInvitationView>), LifecycleError> {
    let record = invitations::send(&server, &req.email, req.name.as_deref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(AdminInvitationView::new(&server, record)),
    ))
}

#[derive(Debug, Deserialize)]
pub struct BulkSendRequest {
    pub recipients: Vec<BulkRecipient>,
}

#[derive(Debug, Serialize)]
pub struct BulkSendResponse {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<BulkSendResult>,
}

pub async fn send_bulk(
    State(server): State<IntakeServer>,
    Json(req): Json<BulkSendRequest>,
) -> Result<Json<BulkSendResponse>, LifecycleError> {
    if req.recipients.is_empty() {
        return Err(LifecycleError::InvalidRequest(
            "recipients must not be empty".to_string(),
        ));
    }
    let results = invitations::send_bulk(&server, req.recipients).await;
    let sent = results.iter().filter(|r| r.success).count();
    Ok(Json(BulkSendResponse {
        sent,
        failed: results.len() - sent,
        results,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    #[serde(default)]
    pub invitation_id: Option<InvitationId>,
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn resend(
    State(server): State<IntakeServer>,
    Json(req): Json<ResendRequest>,
) -> Result<Json<AdminInvitationView>, LifecycleError> {
    let target = match (req.invitation_id, req.token) {
        (Some(id), _) => ResendTarget::Id(id),
        (None, Some(token)) => ResendTarget::Token(token),
        (None, None) => {
            return Err(LifecycleError::InvalidRequest(
                "invitationId or token is required".to_string(),
            ))
        }
    };
    let record = invitations::resend(&server, target).await?;
    Ok(Json(AdminInvitationView::new(&server, record)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub email: Option<String>,
    pub limit: Option<u32>,
}

pub async fn list(
    State(server): State<IntakeServer>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AdminInvitationView>>, LifecycleError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<InvitationStatus>)
        .transpose()
        .map_err(LifecycleError::InvalidRequest)?;
    let filter = InvitationFilter {
        status,
        email: query.email,
        limit: query.limit,
    };

    let records = invitations::list(&server, &filter).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| AdminInvitationView::new(&server, r))
            .collect(),
    ))
}

pub async fn get(
    State(server): State<IntakeServer>,
    Path(id): Path<InvitationId>,
) -> Result<Json<AdminInvitationView>, LifecycleError> {
    let record = invitations::get(&server, &id).await?;
    Ok(Json(AdminInvitationView::new(&server, record)))
}

#[derive(Debug, Deserialize)]
pub struct PatchRequest {
    pub edits: Vec<AdminEdit>,
}

pub async fn patch(
    State(server): State<IntakeServer>,
    Path(id): Path<InvitationId>,
    Json(req): Json<PatchRequest>,
) -> Result<Json<AdminInvitationView>, LifecycleError> {
    let record = invitations::apply_patch(&server, &id, &req.edits).await?;
    Ok(Json(AdminInvitationView::new(&server, record)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatus {
    pub config: ReminderConfig,
    pub next_fire_time: Option<DateTime<Utc>>,
    pub running: bool,
}

fn reminder_status(server: &IntakeServer) -> ReminderStatus {
    ReminderStatus {
        config: server.reminders.current_config(),
        next_fire_time: server.reminders.next_fire_time(),
        running: server.reminders.is_running(),
    }
}

pub async fn get_reminders(State(server): State<IntakeServer>) -> Json<ReminderStatus> {
    Json(reminder_status(&server))
}

pub async fn put_reminders(
    State(server): State<IntakeServer>,
    Json(config): Json<ReminderConfig>,
) -> Json<ReminderStatus> {
    server.reminders.reconfigure(config);
    Json(reminder_status(&server))
}
