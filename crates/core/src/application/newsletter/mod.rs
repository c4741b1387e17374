// Newsletter scheduler - periodic niche-matching notification pass

pub mod constants;
mod scheduler;
mod shutdown;

pub use scheduler::{NewsletterScheduler, SchedulerConfig, SchedulerHandle, TickReport};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
