//! The Store trait that backends implement.

use chrono::{DateTime, Utc};

use crate::types::*;
use crate::StoreError;

/// Persistence contract for invitation records.
///
/// Backends must enforce uniqueness of `token` and should index `email`.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Invitations ────────────────────────────────────

    /// Insert a new record. `AlreadyExists` if the token is taken.
    async fn create_invitation(
        &self,
        record: &InvitationRecord,
    ) -> Result<InvitationRecord, StoreError>;

    /// Look up by token. Expired records are still returned.
    async fn find_by_token(&self, token: &str) -> Result<Option<InvitationRecord>, StoreError>;

    /// Most recently updated record for an email, any status.
    async fn find_latest_by_email(
        &self,
        email: &str,
    ) -> Result<Option<InvitationRecord>, StoreError>;

    /// Get by ID.
    async fn get_invitation(&self, id: &InvitationId) -> Result<InvitationRecord, StoreError>;

    /// Replace the stored record if its version still equals `record.version`.
    ///
    /// Returns the stored record with the bumped version, or `Conflict` if another
    /// writer got there first.
    async fn update_in_place(
        &self,
        record: &InvitationRecord,
    ) -> Result<InvitationRecord, StoreError>;

    /// Hard delete. Only used to roll back a record whose email never went out.
    async fn delete_invitation(&self, id: &InvitationId) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_invitations(
        &self,
        filter: &InvitationFilter,
    ) -> Result<Vec<InvitationRecord>, StoreError>;

    /// Delete never-completed records that expired before `cutoff`. Returns the count.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
