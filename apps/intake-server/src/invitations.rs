//! Admin invitation service: send, bulk send, resend, listing and edits.

use std::collections::HashSet;

use chrono::Utc;
use intake_storage::{
    normalize_email, HistoryEntry, HistoryEvent, InvitationFilter, InvitationId, InvitationRecord,
    InvitationStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::admin_edit::AdminEdit;
use crate::error::LifecycleError;
use crate::metrics;
use crate::prefill;
use crate::server::IntakeServer;
use crate::token;
use crate::transitions;

/// Admin view of a record, with the client link spelled out.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInvitationView {
    #[serde(flatten)]
    pub record: InvitationRecord,
    pub link: String,
}

impl AdminInvitationView {
    pub fn new(server: &IntakeServer, record: InvitationRecord) -> Self {
        let link = server.config.invitation_link(&record.token);
        Self { record, link }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRecipient {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendResult {
    pub email: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_id: Option<InvitationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Which record a resend targets.
#[derive(Clone, Debug)]
pub enum ResendTarget {
    Id(InvitationId),
    Token(String),
}

fn validate_recipient(email: &str) -> Result<String, LifecycleError> {
    let email = normalize_email(email);
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(LifecycleError::InvalidRecipient(email));
    }
    Ok(email)
}

/// Create and email a new invitation.
///
/// The record is written first and deleted again if the email provider
/// rejects the message, so a stored invitation always had its email sent.
pub async fn send(
    server: &IntakeServer,
    email: &str,
    display_name: Option<&str>,
) -> Result<InvitationRecord, LifecycleError> {
    let email = validate_recipient(email)?;
    let display_name = display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let prefill = prefill::resolve(server.store.as_ref(), &email).await?;

    let now = Utc::now();
    let token = token::issue(&email);
    let record = InvitationRecord {
        id: InvitationId::new(),
        token,
        email: email.clone(),
        display_name,
        status: InvitationStatus::Pending,
        expires_at: token::expiry_from(now, server.config.invitation_ttl),
        invited_at: now,
        submitted_at: None,
        last_invitation_sent: now,
        company_info: prefill.company_info,
        applicant_info: prefill.applicant_info,
        inventors: prefill.inventors,
        comments: prefill.comments,
        history: vec![HistoryEntry::new(
            HistoryEvent::InvitationSent,
            json!({
                "prefilled": prefill.metadata.enabled,
                "previousInvitationId": prefill.metadata.previous_invitation_id,
            }),
            now,
        )],
        auto_prefill: prefill.metadata,
        version: 0,
        created_at: now,
        updated_at: now,
    };

    let created = server.store.create_invitation(&record).await?;
    let link = server.config.invitation_link(&created.token);

    if let Err(e) = server
        .dispatcher
        .send_invitation(
            &created.email,
            created.display_name.as_deref(),
            &link,
            created.expires_at,
        )
        .await
    {
        metrics::record_dispatch_failure("send");
        if let Err(rollback) = server.store.delete_invitation(&created.id).await {
            error!(
                invitation_id = %created.id,
                "Failed to roll back invitation after dispatch failure: {}", rollback
            );
        }
        return Err(LifecycleError::DispatchFailed(e.to_string()));
    }

    metrics::record_invitation_sent("send");
    info!(
        invitation_id = %created.id,
        prefilled = created.auto_prefill.enabled,
        "Invitation sent"
    );
    Ok(created)
}

/// Send to many recipients in order. Repeated addresses are sent once.
pub async fn send_bulk(server: &IntakeServer, recipients: Vec<BulkRecipient>) -> Vec<BulkSendResult> {
    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        let email = normalize_email(&recipient.email);
        if !seen.insert(email.clone()) {
            continue;
        }
        let result = match send(server, &email, recipient.name.as_deref()).await {
            Ok(record) => BulkSendResult {
                email,
                success: true,
                invitation_id: Some(record.id),
                error: None,
            },
            Err(e) => {
                warn!("Bulk send to one recipient failed: {}", e);
                BulkSendResult {
                    email,
                    success: false,
                    invitation_id: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    results
}

/// Rotate the token and email the new link.
///
/// The email goes out before the rotation is stored: if the provider fails,
/// the record and its current token are left exactly as they were.
pub async fn resend(
    server: &IntakeServer,
    target: ResendTarget,
) -> Result<InvitationRecord, LifecycleError> {
    let record = match target {
        ResendTarget::Id(id) => server.store.get_invitation(&id).await?,
        ResendTarget::Token(token) => server
            .store
            .find_by_token(&token)
            .await?
            .ok_or(LifecycleError::NotFound)?,
    };

    let now = Utc::now();
    let new_token = token::issue(&record.email);
    let expires_at = token::expiry_from(now, server.config.invitation_ttl);
    let link = server.config.invitation_link(&new_token);

    if let Err(e) = server
        .dispatcher
        .send_invitation(&record.email, record.display_name.as_deref(), &link, expires_at)
        .await
    {
        metrics::record_dispatch_failure("resend");
        return Err(LifecycleError::DispatchFailed(e.to_string()));
    }
    metrics::record_invitation_sent("resend");

    let id = record.id;
    let saved = server
        .mutate(record, |current| {
            Ok(transitions::rotate_for_resend(
                current,
                new_token.clone(),
                expires_at,
                Utc::now(),
            ))
        })
        .await
        .inspect_err(|e| {
            error!(invitation_id = %id, "Resent email delivered but rotation not stored: {}", e)
        })?;

    info!(invitation_id = %saved.id, "Invitation resent");
    Ok(saved)
}

pub async fn list(
    server: &IntakeServer,
    filter: &InvitationFilter,
) -> Result<Vec<InvitationRecord>, LifecycleError> {
    let mut filter = filter.clone();
    filter.email = filter.email.as_deref().map(normalize_email);
    Ok(server.store.list_invitations(&filter).await?)
}

pub async fn get(server: &IntakeServer, id: &InvitationId) -> Result<InvitationRecord, LifecycleError> {
    Ok(server.store.get_invitation(id).await?)
}

/// Apply typed admin edits atomically and record them in history.
pub async fn apply_patch(
    server: &IntakeServer,
    id: &InvitationId,
    edits: &[AdminEdit],
) -> Result<InvitationRecord, LifecycleError> {
    if edits.is_empty() {
        return Err(LifecycleError::InvalidEdit("no edits supplied".to_string()));
    }
    let paths: Vec<String> = edits.iter().map(AdminEdit::path).collect();

    let record = server.store.get_invitation(id).await?;
    let saved = server
        .mutate(record, |current| {
            let mut next = current.clone();
            for edit in edits {
                edit.apply(&mut next)?;
            }
            transitions::append_history(
                &mut next,
                HistoryEvent::AdminUpdated,
                json!({ "paths": paths }),
                Utc::now(),
            );
            Ok(next)
        })
        .await?;

    info!(invitation_id = %saved.id, edits = edits.len(), "Invitation updated by admin");
    Ok(saved)
}
