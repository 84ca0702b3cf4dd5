//! Public routes under `/token/{token}`.

use axum::extract::{Path, State};
use axum::Json;
use intake_storage::{DocumentDescriptor, FormPayload};
use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;
use crate::lifecycle::{self, ClientView};
use crate::server::IntakeServer;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub message: &'static str,
    pub invitation: ClientView,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub field_name: String,
    /// Base64 or a `data:` URL.
    pub file: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub field_name: &'static str,
    pub document: DocumentDescriptor,
    pub invitation: ClientView,
}

pub async fn get_invitation(
    State(server): State<IntakeServer>,
    Path(token): Path<String>,
) -> Result<Json<ClientView>, LifecycleError> {
    Ok(Json(lifecycle::get_by_token(&server, &token).await?))
}

pub async fn save_draft(
    State(server): State<IntakeServer>,
    Path(token): Path<String>,
    Json(payload): Json<FormPayload>,
) -> Result<Json<ClientResponse>, LifecycleError> {
    let record = lifecycle::save_draft(&server, &token, payload).await?;
    Ok(Json(ClientResponse {
        message: "Draft saved",
        invitation: ClientView::from(&record),
    }))
}

pub async fn submit(
    State(server): State<IntakeServer>,
    Path(token): Path<String>,
    Json(payload): Json<FormPayload>,
) -> Result<Json<ClientResponse>, LifecycleError> {
    let record = lifecycle::submit(&server, &token, payload).await?;
    Ok(Json(ClientResponse {
        message: "Form submitted",
        invitation: ClientView::from(&record),
    }))
}

pub async fn upload(
    State(server): State<IntakeServer>,
    Path(token): Path<String>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, LifecycleError> {
    let outcome = lifecycle::upload_document(
        &server,
        &token,
        &req.field_name,
        &req.file,
        req.filename.as_deref(),
    )
    .await?;
    Ok(Json(UploadResponse {
        message: "Document uploaded",
        field_name: outcome.field.as_str(),
        document: outcome.document,
        invitation: ClientView::from(&outcome.record),
    }))
}
