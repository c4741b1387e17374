// SMTP EmailSender (lettre)

use crate::config::{SmtpConfig, TlsMode};
use crate::MailError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use nichenest_core::port::{DeliveryError, EmailSender};
use tracing::{debug, info};

/// Sends plain-text mail through an SMTP relay
///
/// One `send` is one SMTP transaction; failures are reported, never retried.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {}", config.from, e)))?;

        let mut builder = match config.tls {
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        }
        .port(config.port);

        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        info!(
            host = %config.host,
            port = config.port,
            tls = ?config.tls,
            "SMTP sender configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    pub fn from_env() -> Result<Self, MailError> {
        Self::new(&SmtpConfig::from_env()?)
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, DeliveryError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| DeliveryError::InvalidRecipient(format!("{}: {}", to, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = self.build_message(to, subject, body)?;

        match self.transport.send(message).await {
            Ok(response) => {
                debug!(to = %to, code = %response.code(), "SMTP accepted message");
                Ok(())
            }
            Err(e) if e.is_permanent() => Err(DeliveryError::Rejected(e.to_string())),
            Err(e) => Err(DeliveryError::Transport(e.to_string())),
        }
    }
}
