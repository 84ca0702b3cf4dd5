//! Auto-prefill from a recipient's most recent invitation.

use intake_storage::{
    normalize_email, ApplicantInfo, AutoPrefillMetadata, CompanyInfo, InvitationRecord, Inventor,
    LockedField, Store, StoreError,
};

/// Seed data for a new invitation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prefill {
    pub company_info: CompanyInfo,
    pub applicant_info: ApplicantInfo,
    pub inventors: Vec<Inventor>,
    pub comments: Option<String>,
    pub metadata: AutoPrefillMetadata,
}

/// Derive prefill data from the latest prior record, if it names a company.
///
/// Records with an empty company name are treated as abandoned and ignored.
pub fn prefill_from(previous: Option<&InvitationRecord>) -> Prefill {
    match previous {
        Some(prev) if prev.company_info.has_name() => Prefill {
            company_info: prev.company_info.clone(),
            applicant_info: prev.applicant_info.clone(),
            inventors: prev.inventors.clone(),
            comments: prev.comments.clone(),
            metadata: AutoPrefillMetadata {
                enabled: true,
                previous_invitation_id: Some(prev.id),
                locked_fields: vec![LockedField::CompanyInfo],
            },
        },
        _ => Prefill::default(),
    }
}

pub async fn resolve(store: &dyn Store, email: &str) -> Result<Prefill, StoreError> {
    let previous = store.find_latest_by_email(&normalize_email(email)).await?;
    Ok(prefill_from(previous.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use intake_storage::{InvitationId, InvitationStatus};

    fn previous(name: Option<&str>) -> InvitationRecord {
        let now = Utc::now();
        InvitationRecord {
            id: InvitationId::new(),
            token: "old".into(),
            email: "client@example.com".into(),
            display_name: None,
            status: InvitationStatus::Completed,
            expires_at: now - Duration::days(1),
            invited_at: now - Duration::days(8),
            submitted_at: Some(now - Duration::days(2)),
            last_invitation_sent: now - Duration::days(8),
            company_info: CompanyInfo {
                name: name.map(str::to_string),
                gst_number: Some("29ABC".into()),
                ..Default::default()
            },
            applicant_info: ApplicantInfo {
                name: Some("Priya".into()),
                ..Default::default()
            },
            inventors: vec![Inventor {
                name: Some("Ada".into()),
                ..Default::default()
            }],
            comments: Some("earlier matter".into()),
            auto_prefill: AutoPrefillMetadata::default(),
            history: vec![],
            version: 3,
            created_at: now - Duration::days(8),
            updated_at: now - Duration::days(2),
        }
    }

    #[test]
    fn test_no_history_means_disabled() {
        let prefill = prefill_from(None);
        assert!(!prefill.metadata.enabled);
        assert!(prefill.metadata.locked_fields.is_empty());
        assert_eq!(prefill.company_info, CompanyInfo::default());
    }

    #[test]
    fn test_nameless_company_is_ignored() {
        for name in [None, Some(""), Some("  ")] {
            let prefill = prefill_from(Some(&previous(name)));
            assert!(!prefill.metadata.enabled);
            assert!(prefill.inventors.is_empty());
        }
    }

    #[test]
    fn test_named_company_is_copied_and_locked() {
        let prev = previous(Some("Acme Ltd"));
        let prefill = prefill_from(Some(&prev));

        assert!(prefill.metadata.enabled);
        assert_eq!(prefill.metadata.previous_invitation_id, Some(prev.id));
        assert_eq!(prefill.metadata.locked_fields, vec![LockedField::CompanyInfo]);
        assert_eq!(prefill.company_info, prev.company_info);
        assert_eq!(prefill.applicant_info.name.as_deref(), Some("Priya"));
        assert_eq!(prefill.inventors.len(), 1);
        assert_eq!(prefill.comments.as_deref(), Some("earlier matter"));
    }
}
