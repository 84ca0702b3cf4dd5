//! Invitation record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApplicantInfo, CompanyInfo, HistoryEntry, InvitationId, Inventor};

/// Lifecycle status within one invitation episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Draft,
    Completed,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Draft => "draft",
            InvitationStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "draft" => Ok(InvitationStatus::Draft),
            "completed" => Ok(InvitationStatus::Completed),
            other => Err(format!("unknown invitation status: {other}")),
        }
    }
}

/// Record sections that client-facing writes may be barred from touching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LockedField {
    CompanyInfo,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPrefillMetadata {
    pub enabled: bool,
    pub previous_invitation_id: Option<InvitationId>,
    pub locked_fields: Vec<LockedField>,
}

impl AutoPrefillMetadata {
    pub fn is_locked(&self, field: LockedField) -> bool {
        self.locked_fields.contains(&field)
    }
}

/// One invitation, across all of its episodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRecord {
    pub id: InvitationId,
    pub token: String,
    /// Lowercased recipient address.
    pub email: String,
    pub display_name: Option<String>,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub invited_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub last_invitation_sent: DateTime<Utc>,
    pub company_info: CompanyInfo,
    pub applicant_info: ApplicantInfo,
    pub inventors: Vec<Inventor>,
    pub comments: Option<String>,
    pub auto_prefill: AutoPrefillMetadata,
    pub history: Vec<HistoryEntry>,
    /// Optimistic concurrency counter, bumped by every `update_in_place`.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvitationRecord {
    /// Expired once `now` is strictly past `expires_at`, whatever the status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == InvitationStatus::Completed
    }
}

/// Admin listing filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvitationFilter {
    pub status: Option<InvitationStatus>,
    pub email: Option<String>,
    pub limit: Option<u32>,
}
