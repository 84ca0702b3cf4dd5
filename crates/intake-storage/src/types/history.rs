//! Append-only invitation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle events recorded on an invitation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEvent {
    InvitationSent,
    InvitationResent,
    DraftSaved,
    FormSubmitted,
    DocumentUploaded,
    AdminUpdated,
}

impl HistoryEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryEvent::InvitationSent => "invitation_sent",
            HistoryEvent::InvitationResent => "invitation_resent",
            HistoryEvent::DraftSaved => "draft_saved",
            HistoryEvent::FormSubmitted => "form_submitted",
            HistoryEvent::DocumentUploaded => "document_uploaded",
            HistoryEvent::AdminUpdated => "admin_updated",
        }
    }
}

impl std::fmt::Display for HistoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub event: HistoryEvent,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub context: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(event: HistoryEvent, context: serde_json::Value, created_at: DateTime<Utc>) -> Self {
        Self {
            event,
            context,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_names_match_as_str() {
        for event in [
            HistoryEvent::InvitationSent,
            HistoryEvent::InvitationResent,
            HistoryEvent::DraftSaved,
            HistoryEvent::FormSubmitted,
            HistoryEvent::DocumentUploaded,
            HistoryEvent::AdminUpdated,
        ] {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.as_str()));
        }
    }

    #[test]
    fn test_entry_without_context_omits_it() {
        let entry = HistoryEntry::new(HistoryEvent::DraftSaved, serde_json::Value::Null, Utc::now());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("context").is_none());
        assert_eq!(json["event"], "draft_saved");

        let back: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.event, HistoryEvent::DraftSaved);
        assert!(back.context.is_null());
    }
}
