//! Reminder scheduler owning a single timer task.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::schedule::{compute_next_fire_time, ReminderConfig};
use crate::ReminderError;

/// Whatever actually delivers reminders (email, chat, ...).
#[async_trait]
pub trait ReminderSink: Send + Sync {
    /// Send one round of reminders. Returns how many were delivered.
    async fn send_reminders(&self) -> Result<usize, ReminderError>;
}

struct SchedulerState {
    config: ReminderConfig,
    handle: Option<JoinHandle<()>>,
}

/// Fires [`ReminderSink::send_reminders`] on the configured schedule.
///
/// Exactly one timer task is alive at a time; `reconfigure` aborts it and arms a
/// fresh one from the new configuration.
pub struct ReminderScheduler {
    sink: Arc<dyn ReminderSink>,
    state: Mutex<SchedulerState>,
}

impl ReminderScheduler {
    pub fn new(config: ReminderConfig, sink: Arc<dyn ReminderSink>) -> Self {
        Self {
            sink,
            state: Mutex::new(SchedulerState {
                config,
                handle: None,
            }),
        }
    }

    /// Arm the timer for the current configuration. Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut state = self.lock();
        let config = state.config.clone();
        self.arm(&mut state, config);
    }

    /// Swap the configuration and re-arm.
    pub fn reconfigure(&self, config: ReminderConfig) {
        let mut state = self.lock();
        info!(
            enabled = config.enabled,
            days = ?config.days,
            time = %config.time,
            "Reminder schedule updated"
        );
        self.arm(&mut state, config);
    }

    /// Stop the timer. The configuration is kept.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        if let Some(handle) = state.handle.take() {
            handle.abort();
        }
    }

    pub fn current_config(&self) -> ReminderConfig {
        self.lock().config.clone()
    }

    pub fn next_fire_time(&self) -> Option<DateTime<Utc>> {
        compute_next_fire_time(&self.lock().config, Utc::now())
    }

    pub fn is_running(&self) -> bool {
        self.lock()
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        // A poisoned lock only means a panic elsewhere; the state itself stays valid.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn arm(&self, state: &mut SchedulerState, config: ReminderConfig) {
        if let Some(handle) = state.handle.take() {
            debug!("Cancelling previous reminder timer");
            handle.abort();
        }
        state.config = config.clone();

        if compute_next_fire_time(&config, Utc::now()).is_none() {
            info!("Reminder schedule disabled, no timer armed");
            return;
        }

        let sink = self.sink.clone();
        state.handle = Some(tokio::spawn(run_timer(config, sink)));
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_timer(config: ReminderConfig, sink: Arc<dyn ReminderSink>) {
    let mut after = Utc::now();
    while let Some(next) = compute_next_fire_time(&config, after) {
        debug!(next = %next, "Next reminder scheduled");
        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        match sink.send_reminders().await {
            Ok(sent) => info!(sent, "Reminders sent"),
            Err(e) => error!("Reminder round failed: {}", e),
        }
        after = next;
    }
}
