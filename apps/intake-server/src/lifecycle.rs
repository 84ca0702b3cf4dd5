//! Client-facing operations, authorized by the invitation token alone.
//!
//! Each operation loads the record by token, rejects expired links, applies a
//! pure transition from [`crate::transitions`] and persists it through
//! [`IntakeServer::mutate`].

use chrono::{DateTime, Utc};
use intake_storage::{
    ApplicantInfo, CompanyInfo, DocumentDescriptor, DocumentField, FormPayload, InvitationRecord,
    InvitationStatus, Inventor, LockedField,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::documents::{decode_upload, folder_for};
use crate::error::LifecycleError;
use crate::metrics;
use crate::server::IntakeServer;
use crate::token::redact;
use crate::transitions;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPrefillView {
    pub enabled: bool,
    pub locked_fields: Vec<LockedField>,
}

/// What the invited client may see. Internal ids and history stay server side.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub email: String,
    pub display_name: Option<String>,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub company_info: CompanyInfo,
    pub applicant_info: ApplicantInfo,
    pub inventors: Vec<Inventor>,
    pub comments: Option<String>,
    pub auto_prefill: AutoPrefillView,
}

impl From<&InvitationRecord> for ClientView {
    fn from(record: &InvitationRecord) -> Self {
        Self {
            email: record.email.clone(),
            display_name: record.display_name.clone(),
            status: record.status,
            expires_at: record.expires_at,
            submitted_at: record.submitted_at,
            company_info: record.company_info.clone(),
            applicant_info: record.applicant_info.clone(),
            inventors: record.inventors.clone(),
            comments: record.comments.clone(),
            auto_prefill: AutoPrefillView {
                enabled: record.auto_prefill.enabled,
                locked_fields: record.auto_prefill.locked_fields.clone(),
            },
        }
    }
}

async fn load(server: &IntakeServer, token: &str) -> Result<InvitationRecord, LifecycleError> {
    let record = server
        .store
        .find_by_token(token)
        .await?
        .ok_or(LifecycleError::NotFound)?;
    transitions::ensure_usable(&record, Utc::now())?;
    Ok(record)
}

/// Preconditions re-checked against a record reloaded after a conflict.
fn still_addressable(record: &InvitationRecord, token: &str) -> Result<(), LifecycleError> {
    if record.token != token {
        // Rotated by a concurrent resend.
        return Err(LifecycleError::NotFound);
    }
    transitions::ensure_usable(record, Utc::now())
}

pub async fn get_by_token(server: &IntakeServer, token: &str) -> Result<ClientView, LifecycleError> {
    let record = load(server, token).await?;
    Ok(ClientView::from(&record))
}

pub async fn save_draft(
    server: &IntakeServer,
    token: &str,
    payload: FormPayload,
) -> Result<InvitationRecord, LifecycleError> {
    let record = load(server, token).await?;
    let saved = server
        .mutate(record, |current| {
            still_addressable(current, token)?;
            transitions::save_draft(current, payload.clone(), Utc::now())
        })
        .await?;

    info!(invitation_id = %saved.id, token = %redact(token), "Draft saved");
    Ok(saved)
}

pub async fn submit(
    server: &IntakeServer,
    token: &str,
    payload: FormPayload,
) -> Result<InvitationRecord, LifecycleError> {
    let record = load(server, token).await?;
    let saved = server
        .mutate(record, |current| {
            still_addressable(current, token)?;
            transitions::submit(current, payload.clone(), Utc::now())
        })
        .await?;

    metrics::record_submission();
    info!(invitation_id = %saved.id, inventors = saved.inventors.len(), "Form submitted");
    Ok(saved)
}

/// Result of a successful upload.
#[derive(Debug)]
pub struct UploadOutcome {
    pub field: DocumentField,
    pub document: DocumentDescriptor,
    pub record: InvitationRecord,
}

pub async fn upload_document(
    server: &IntakeServer,
    token: &str,
    field_name: &str,
    file: &str,
    original_filename: Option<&str>,
) -> Result<UploadOutcome, LifecycleError> {
    let record = load(server, token).await?;
    let field = DocumentField::parse(field_name)
        .ok_or_else(|| LifecycleError::UnsupportedDocumentField(field_name.to_string()))?;

    let decoded = decode_upload(file, server.config.uploads.max_bytes)?;
    let document = server
        .documents
        .upload(decoded, &folder_for(&record.email), original_filename)
        .await?;

    let saved = match server
        .mutate(record, |current| {
            still_addressable(current, token)?;
            transitions::attach_document(current, field, document.clone(), Utc::now())
        })
        .await
    {
        Ok(saved) => saved,
        Err(e) => {
            // Nothing references the stored object yet.
            if let Err(cleanup) = server.documents.delete(&document).await {
                warn!(
                    public_id = %document.public_id,
                    "Failed to remove orphaned upload: {}", cleanup
                );
            }
            return Err(e);
        }
    };

    info!(
        invitation_id = %saved.id,
        field = field.as_str(),
        public_id = %document.public_id,
        bytes = document.bytes,
        "Document uploaded"
    );
    Ok(UploadOutcome {
        field,
        document,
        record: saved,
    })
}
