//! Outbound email for invitations and reminders.

mod log;
#[cfg(feature = "email-resend")]
mod resend;
#[cfg(feature = "email-smtp")]
mod smtp;
mod templates;

pub use log::LogProvider;
pub use templates::EmailContent;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{EmailConfig, EmailProviderConfig};

/// Email sending error
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Provider acknowledgement of an accepted message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

/// Trait for email providers
///
/// Providers only implement [`EmailProvider::deliver`]; the message kinds are
/// rendered from templates by the provided methods.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn deliver(
        &self,
        to: &str,
        content: &EmailContent,
        from_address: &str,
        from_name: Option<&str>,
    ) -> Result<SendReceipt, EmailError>;

    /// Send the invitation link to a client.
    async fn send_invitation(
        &self,
        to: &str,
        display_name: Option<&str>,
        link: &str,
        expires_at: DateTime<Utc>,
        from_address: &str,
        from_name: Option<&str>,
    ) -> Result<SendReceipt, EmailError> {
        let content = EmailContent::invitation(display_name, link, expires_at);
        self.deliver(to, &content, from_address, from_name).await
    }

    /// Send the daily work-hours reminder.
    async fn send_reminder(
        &self,
        to: &str,
        from_address: &str,
        from_name: Option<&str>,
    ) -> Result<SendReceipt, EmailError> {
        let content = EmailContent::reminder();
        self.deliver(to, &content, from_address, from_name).await
    }
}

/// Create an email provider from configuration
pub fn create_provider(config: &EmailConfig) -> Result<Arc<dyn EmailProvider>, EmailError> {
    match &config.provider {
        EmailProviderConfig::Log => Ok(Arc::new(LogProvider)),
        #[cfg(feature = "email-resend")]
        EmailProviderConfig::Resend { api_key } => {
            Ok(Arc::new(resend::ResendProvider::new(api_key.clone())))
        }
        #[cfg(not(feature = "email-resend"))]
        EmailProviderConfig::Resend { .. } => Err(EmailError::ProviderNotAvailable(
            "Resend support not compiled in. Enable the 'email-resend' feature.".to_string(),
        )),
        #[cfg(feature = "email-smtp")]
        EmailProviderConfig::Smtp {
            host,
            port,
            username,
            password,
            use_tls,
        } => {
            let provider = smtp::SmtpProvider::new(
                host.clone(),
                *port,
                username.clone(),
                password.clone(),
                *use_tls,
            )?;
            Ok(Arc::new(provider))
        }
        #[cfg(not(feature = "email-smtp"))]
        EmailProviderConfig::Smtp { .. } => Err(EmailError::ProviderNotAvailable(
            "SMTP support not compiled in. Enable the 'email-smtp' feature.".to_string(),
        )),
    }
}

/// Binds a provider to the configured sender identity.
#[derive(Clone)]
pub struct NotificationDispatcher {
    provider: Arc<dyn EmailProvider>,
    from_address: String,
    from_name: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        from_address: impl Into<String>,
        from_name: Option<String>,
    ) -> Self {
        Self {
            provider,
            from_address: from_address.into(),
            from_name,
        }
    }

    pub fn from_config(config: &EmailConfig) -> Result<Self, EmailError> {
        Ok(Self::new(
            create_provider(config)?,
            config.from_address.clone(),
            config.from_name.clone(),
        ))
    }

    pub async fn send_invitation(
        &self,
        to: &str,
        display_name: Option<&str>,
        link: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SendReceipt, EmailError> {
        let result = self
            .provider
            .send_invitation(
                to,
                display_name,
                link,
                expires_at,
                &self.from_address,
                self.from_name.as_deref(),
            )
            .await;
        match &result {
            Ok(receipt) => info!(message_id = ?receipt.message_id, "Invitation email accepted"),
            Err(e) => warn!("Invitation email failed: {}", e),
        }
        result
    }

    pub async fn send_reminder(&self, to: &str) -> Result<SendReceipt, EmailError> {
        self.provider
            .send_reminder(to, &self.from_address, self.from_name.as_deref())
            .await
    }
}
