//! NicheNest Infrastructure - Email Delivery Adapters
//!
//! Implements the `EmailSender` port:
//! - [`SmtpEmailSender`]: lettre async SMTP transport
//! - [`LogEmailSender`]: logs the message instead of sending it (development)
//!
//! # Environment Variables
//!
//! [`SmtpConfig::from_env`] reads:
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `SMTP_HOST` | Yes | SMTP server hostname |
//! | `SMTP_PORT` | No | Port (default: 587) |
//! | `SMTP_USER` | No | Username for authentication |
//! | `SMTP_PASSWORD` | No | Password for authentication |
//! | `SMTP_FROM` | Yes | Sender address, e.g. `NicheNest <news@nichenest.io>` |
//! | `SMTP_TLS` | No | `starttls` (default), `tls`, or `none` |

mod config;
mod log_sender;
mod smtp;

pub use config::{SmtpConfig, TlsMode};
pub use log_sender::LogEmailSender;
pub use smtp::SmtpEmailSender;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}
