//! Resend email provider implementation.

use super::{EmailContent, EmailError, EmailProvider, SendReceipt};
use async_trait::async_trait;
use resend_rs::{types::CreateEmailBaseOptions, Resend};

pub struct ResendProvider {
    client: Resend,
}

impl ResendProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Resend::new(&api_key),
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn deliver(
        &self,
        to: &str,
        content: &EmailContent,
        from_address: &str,
        from_name: Option<&str>,
    ) -> Result<SendReceipt, EmailError> {
        let from = match from_name {
            Some(name) => format!("{} <{}>", name, from_address),
            None => from_address.to_string(),
        };

        let email = CreateEmailBaseOptions::new(from, vec![to.to_string()], &content.subject)
            .with_text(&content.text)
            .with_html(&content.html);

        let response = self
            .client
            .emails
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(SendReceipt {
            message_id: Some(response.id.to_string()),
        })
    }
}
