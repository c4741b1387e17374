// Log-only EmailSender for development and dry runs

use async_trait::async_trait;
use nichenest_core::port::{DeliveryError, EmailSender};
use tracing::info;

/// Logs each message at info level instead of delivering it
#[derive(Debug, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        if to.trim().is_empty() {
            return Err(DeliveryError::InvalidRecipient("empty address".into()));
        }
        info!(to = %to, subject = %subject, body_len = body.len(), "Email (log sender, not delivered)");
        Ok(())
    }
}
