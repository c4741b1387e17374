// Notification attempt log (ephemeral, never persisted)

use super::{JobId, SubscriberId};
use serde::{Deserialize, Serialize};

/// Outcome of a single email send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum DeliveryOutcome {
    Sent,
    Failed(String),
}

/// One (job, subscriber, outcome) triple produced by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAttempt {
    pub job_id: JobId,
    pub subscriber_id: SubscriberId,
    pub outcome: DeliveryOutcome,
}

impl NotificationAttempt {
    pub fn is_sent(&self) -> bool {
        self.outcome == DeliveryOutcome::Sent
    }
}
