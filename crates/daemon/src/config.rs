// Daemon configuration (flags with environment fallbacks)

use clap::{Parser, ValueEnum};
use nichenest_core::application::SchedulerConfig;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "~/.nichenest/newsletter.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MailerKind {
    /// Deliver through SMTP (reads SMTP_* variables)
    Smtp,
    /// Only log the messages
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "nichenest-newsletter")]
#[command(about = "Emails job seekers about new jobs in their niches", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQLite database path (or sqlite: URL)
    #[arg(long, env = "NICHENEST_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Seconds between newsletter ticks
    #[arg(
        long,
        env = "NICHENEST_TICK_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Seconds to wait for the in-flight job on shutdown
    #[arg(long, env = "NICHENEST_SHUTDOWN_GRACE_SECS", default_value_t = 30)]
    pub shutdown_grace_secs: u64,

    /// Email delivery backend
    #[arg(long, env = "NICHENEST_MAILER", value_enum, default_value_t = MailerKind::Log)]
    pub mailer: MailerKind,

    /// Log output format
    #[arg(long, env = "NICHENEST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Run a single tick, print its report as JSON, and exit
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Database URL with `~` expanded
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            return self.db_path.clone();
        }
        let path = shellexpand::tilde(&self.db_path).into_owned();
        format!("sqlite://{}", path)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_secs(self.interval_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }
}
