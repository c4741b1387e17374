// Port Layer - Interfaces for external collaborators

pub mod email_sender;
pub mod job_store;
pub mod subscriber_store;
pub mod time_provider;

// Re-exports
pub use email_sender::{DeliveryError, EmailSender};
pub use job_store::JobStore;
pub use subscriber_store::SubscriberStore;
pub use time_provider::TimeProvider;
