//! Email delivery for the work-hours reminder schedule.

use async_trait::async_trait;
use intake_reminders::{ReminderError, ReminderSink};
use tracing::warn;

use crate::email::NotificationDispatcher;

/// Emails every configured recipient on each scheduled fire.
pub struct EmailReminderSink {
    dispatcher: NotificationDispatcher,
    recipients: Vec<String>,
}

impl EmailReminderSink {
    pub fn new(dispatcher: NotificationDispatcher, recipients: Vec<String>) -> Self {
        Self {
            dispatcher,
            recipients,
        }
    }
}

#[async_trait]
impl ReminderSink for EmailReminderSink {
    async fn send_reminders(&self) -> Result<usize, ReminderError> {
        let mut sent = 0;
        let mut last_error = None;
        for recipient in &self.recipients {
            match self.dispatcher.send_reminder(recipient).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    warn!(recipient = %recipient, "Reminder email failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if sent == 0 => Err(ReminderError::Delivery(e.to_string())),
            _ => Ok(sent),
        }
    }
}
