// Email Delivery Port
// Synchronous completion signal only; no delivery-status callbacks

use async_trait::async_trait;
use thiserror::Error;

/// Delivery errors for a single recipient
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),
}

/// Email Sender trait
///
/// Implementations:
/// - SmtpEmailSender: lettre SMTP transport
/// - LogEmailSender: writes the message to the log (development)
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one plain-text email
    ///
    /// Called exactly once per recipient per dispatch pass; implementations
    /// must not retry internally.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Email captured by the recording sender
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentEmail {
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    /// Records every send; fails for configured recipients
    #[derive(Default)]
    pub struct RecordingEmailSender {
        sent: Mutex<Vec<SentEmail>>,
        failing: Mutex<HashSet<String>>,
        fail_all: Mutex<bool>,
    }

    impl RecordingEmailSender {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn failing_for(recipients: &[&str]) -> Self {
            let sender = Self::default();
            for r in recipients {
                sender.failing.lock().unwrap().insert(r.to_string());
            }
            sender
        }
        pub fn set_fail_all(&self, fail: bool) {
            *self.fail_all.lock().unwrap() = fail;
        }
        /// Every call, including failed ones, in call order
        pub fn calls(&self) -> Vec<SentEmail> {
            self.sent.lock().unwrap().clone()
        }
        pub fn call_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
        pub fn calls_to(&self, to: &str) -> usize {
            self.sent.lock().unwrap().iter().filter(|e| e.to == to).count()
        }
    }

    #[async_trait]
    impl EmailSender for RecordingEmailSender {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            if *self.fail_all.lock().unwrap() || self.failing.lock().unwrap().contains(to) {
                return Err(DeliveryError::Transport(format!("mock failure for {}", to)));
            }
            Ok(())
        }
    }
}
