use std::sync::Arc;

use intake_reminders::ReminderScheduler;
use intake_storage::{InvitationRecord, Store, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::debug;

use crate::config::ServerConfig;
use crate::documents::DocumentStorage;
use crate::email::NotificationDispatcher;
use crate::error::LifecycleError;

/// Reload-and-reapply attempts after an optimistic concurrency conflict.
const MAX_CONFLICT_RETRIES: usize = 3;

/// Shared state behind every handler and CLI command.
#[derive(Clone)]
pub struct IntakeServer {
    pub store: Arc<dyn Store>,
    pub dispatcher: NotificationDispatcher,
    pub documents: Arc<dyn DocumentStorage>,
    pub config: Arc<ServerConfig>,
    pub reminders: Arc<ReminderScheduler>,
    pub metrics: Option<PrometheusHandle>,
}

impl IntakeServer {
    pub fn new(
        store: Arc<dyn Store>,
        dispatcher: NotificationDispatcher,
        documents: Arc<dyn DocumentStorage>,
        config: ServerConfig,
        reminders: Arc<ReminderScheduler>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            documents,
            config: Arc::new(config),
            reminders,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Apply a transition and persist it atomically.
    ///
    /// On a version conflict the record is reloaded and `apply` runs again on
    /// the fresh copy, so `apply` must re-check any precondition it relies on.
    pub async fn mutate<F>(
        &self,
        mut record: InvitationRecord,
        mut apply: F,
    ) -> Result<InvitationRecord, LifecycleError>
    where
        F: FnMut(&InvitationRecord) -> Result<InvitationRecord, LifecycleError> + Send,
    {
        let mut attempt = 0;
        loop {
            let next = apply(&record)?;
            match self.store.update_in_place(&next).await {
                Ok(saved) => return Ok(saved),
                Err(StoreError::Conflict) if attempt < MAX_CONFLICT_RETRIES => {
                    attempt += 1;
                    debug!(invitation_id = %record.id, attempt, "Version conflict, reloading");
                    record = self.store.get_invitation(&record.id).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
