// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod niche;
pub mod notification;
pub mod subscriber;

// Re-exports
pub use error::DomainError;
pub use job::{Job, JobId};
pub use niche::{Niche, KNOWN_NICHES};
pub use notification::{DeliveryOutcome, NotificationAttempt};
pub use subscriber::{Subscriber, SubscriberId};
