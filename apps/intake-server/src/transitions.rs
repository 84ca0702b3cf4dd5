//! Pure state transitions over [`InvitationRecord`].
//!
//! Every function takes the current record by reference and returns the next
//! one. Persistence happens in the lifecycle controller.

use chrono::{DateTime, Utc};
use intake_storage::{
    DocumentDescriptor, DocumentField, FormPayload, HistoryEntry, HistoryEvent, InvitationRecord,
    InvitationStatus, LockedField,
};
use serde_json::json;

use crate::error::LifecycleError;
use crate::validation;

/// Reject client access to a record whose link is no longer usable.
pub fn ensure_usable(record: &InvitationRecord, now: DateTime<Utc>) -> Result<(), LifecycleError> {
    if record.is_expired(now) {
        return Err(LifecycleError::Expired);
    }
    Ok(())
}

fn ensure_open(record: &InvitationRecord) -> Result<(), LifecycleError> {
    if record.is_completed() {
        return Err(LifecycleError::AlreadyCompleted);
    }
    Ok(())
}

/// Drop every section of `payload` that the record has locked.
pub fn sanitize(record: &InvitationRecord, mut payload: FormPayload) -> FormPayload {
    if record.auto_prefill.is_locked(LockedField::CompanyInfo) {
        payload.company_info = None;
    }
    payload
}

/// Overlay an already sanitized payload onto the record.
///
/// Sections merge field by field so uploaded documents survive a draft that
/// omits them. The inventor list is replaced only by a non-empty array.
pub fn merge(record: &InvitationRecord, payload: &FormPayload) -> InvitationRecord {
    let mut next = record.clone();
    if let Some(company) = &payload.company_info {
        next.company_info = record.company_info.merged_with(company);
    }
    if let Some(applicant) = &payload.applicant_info {
        next.applicant_info = record.applicant_info.merged_with(applicant);
    }
    if let Some(inventors) = payload.inventors.as_ref().filter(|i| !i.is_empty()) {
        next.inventors = inventors.clone();
    }
    if let Some(comments) = &payload.comments {
        next.comments = Some(comments.clone());
    }
    next
}

pub fn append_history(
    record: &mut InvitationRecord,
    event: HistoryEvent,
    context: serde_json::Value,
    now: DateTime<Utc>,
) {
    record.history.push(HistoryEntry::new(event, context, now));
    record.updated_at = now;
}

pub fn save_draft(
    record: &InvitationRecord,
    payload: FormPayload,
    now: DateTime<Utc>,
) -> Result<InvitationRecord, LifecycleError> {
    ensure_open(record)?;
    let payload = sanitize(record, payload);

    let mut next = merge(record, &payload);
    next.status = InvitationStatus::Draft;
    append_history(
        &mut next,
        HistoryEvent::DraftSaved,
        json!({ "previousStatus": record.status }),
        now,
    );
    Ok(next)
}

pub fn submit(
    record: &InvitationRecord,
    payload: FormPayload,
    now: DateTime<Utc>,
) -> Result<InvitationRecord, LifecycleError> {
    ensure_open(record)?;
    let payload = sanitize(record, payload);

    // Locked company data is already on the record, so the merge is the effective data.
    let mut next = merge(record, &payload);
    validation::validate(&next.company_info, &next.inventors)?;

    next.status = InvitationStatus::Completed;
    next.submitted_at = Some(now);
    let context = json!({ "inventors": next.inventors.len() });
    append_history(&mut next, HistoryEvent::FormSubmitted, context, now);
    Ok(next)
}

/// Store an uploaded document descriptor on the record.
///
/// Promotes `pending` to `draft`; `draft` and `completed` are left alone.
/// Only the named document slot is written, so a locked company section
/// keeps every other field.
pub fn attach_document(
    record: &InvitationRecord,
    field: DocumentField,
    descriptor: DocumentDescriptor,
    now: DateTime<Utc>,
) -> Result<InvitationRecord, LifecycleError> {
    let mut next = record.clone();
    let context = json!({
        "field": field.as_str(),
        "publicId": descriptor.public_id,
        "bytes": descriptor.bytes,
    });
    next.company_info.set_document(field, descriptor);
    if next.status == InvitationStatus::Pending {
        next.status = InvitationStatus::Draft;
    }
    append_history(&mut next, HistoryEvent::DocumentUploaded, context, now);
    Ok(next)
}

/// Start a new episode: fresh token and expiry, status back to `pending`.
///
/// History, form data and prefill locks carry over.
pub fn rotate_for_resend(
    record: &InvitationRecord,
    token: String,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> InvitationRecord {
    let mut next = record.clone();
    next.token = token;
    next.status = InvitationStatus::Pending;
    next.expires_at = expires_at;
    next.last_invitation_sent = now;
    append_history(
        &mut next,
        HistoryEvent::InvitationResent,
        json!({
            "previousStatus": record.status,
            "expiresAt": expires_at,
        }),
        now,
    );
    next
}
