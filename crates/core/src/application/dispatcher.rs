//! Notification Dispatcher - one email per matched subscriber
//!
//! Every recipient gets exactly one send attempt per call. A failed send is
//! recorded in the returned attempt log and never stops the remaining sends.
//! Retrying is not this component's job: the scheduler's per-job commit is
//! the unit of idempotence.

use crate::application::template;
use crate::domain::{DeliveryOutcome, Job, NotificationAttempt, Subscriber};
use crate::error::{AppError, Result};
use crate::port::EmailSender;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct NotificationDispatcher {
    email_sender: Arc<dyn EmailSender>,
}

impl NotificationDispatcher {
    pub fn new(email_sender: Arc<dyn EmailSender>) -> Self {
        Self { email_sender }
    }

    /// Send the newsletter for `job` to every recipient
    ///
    /// # Errors
    /// `AppError::InvalidInput` for a blank job id or a recipient with a
    /// blank id or email. Validation runs before the first send, so an
    /// error means nothing was sent.
    pub async fn dispatch(
        &self,
        job: &Job,
        recipients: &[&Subscriber],
    ) -> Result<Vec<NotificationAttempt>> {
        validate(job, recipients)?;

        let mut attempts = Vec::with_capacity(recipients.len());
        for subscriber in recipients {
            let email = template::render(job, subscriber);
            let outcome = match self
                .email_sender
                .send(&subscriber.email, &email.subject, &email.body)
                .await
            {
                Ok(()) => {
                    debug!(job_id = %job.id, subscriber_id = %subscriber.id, "Newsletter sent");
                    DeliveryOutcome::Sent
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        subscriber_id = %subscriber.id,
                        error = %e,
                        "Newsletter delivery failed"
                    );
                    DeliveryOutcome::Failed(e.to_string())
                }
            };
            attempts.push(NotificationAttempt {
                job_id: job.id.clone(),
                subscriber_id: subscriber.id.clone(),
                outcome,
            });
        }

        let sent = attempts.iter().filter(|a| a.is_sent()).count();
        info!(
            job_id = %job.id,
            recipients = attempts.len(),
            sent = sent,
            failed = attempts.len() - sent,
            "Dispatch pass finished"
        );
        Ok(attempts)
    }
}

fn validate(job: &Job, recipients: &[&Subscriber]) -> Result<()> {
    if job.id.trim().is_empty() {
        return Err(AppError::InvalidInput("job id is blank".into()));
    }
    for subscriber in recipients {
        if subscriber.id.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "recipient with blank id for job {}",
                job.id
            )));
        }
        if subscriber.email.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "subscriber {} has a blank email",
                subscriber.id
            )));
        }
    }
    Ok(())
}
