//! Development provider that writes messages to the log.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::{EmailContent, EmailError, EmailProvider, SendReceipt};

pub struct LogProvider;

#[async_trait]
impl EmailProvider for LogProvider {
    async fn deliver(
        &self,
        to: &str,
        content: &EmailContent,
        from_address: &str,
        _from_name: Option<&str>,
    ) -> Result<SendReceipt, EmailError> {
        info!(
            to,
            from = from_address,
            subject = %content.subject,
            "Email not sent (log provider):\n{}",
            content.text
        );
        Ok(SendReceipt {
            message_id: Some(format!("log-{}", Uuid::new_v4())),
        })
    }
}
