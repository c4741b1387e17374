// Application Layer - Use Cases and Business Logic

pub mod dispatcher;
pub mod matcher;
pub mod newsletter;
pub mod template;

// Re-exports
pub use dispatcher::NotificationDispatcher;
pub use matcher::match_subscribers;
pub use newsletter::{
    shutdown_channel, NewsletterScheduler, SchedulerConfig, SchedulerHandle, ShutdownSender,
    ShutdownToken, TickReport,
};
