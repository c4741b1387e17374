// NicheNest Infrastructure - SQLite Adapter
// Implements: JobStore, SubscriberStore

mod connection;
mod error;
mod job_store;
mod migration;
mod subscriber_store;

pub use connection::create_pool;
pub use job_store::SqliteJobStore;
pub use migration::run_migrations;
pub use subscriber_store::{SqliteSubscriberStore, ROLE_EMPLOYER, ROLE_JOB_SEEKER};

// Note: sqlx::Error conversion is handled by a helper function (error.rs)
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
