//! NicheNest Newsletter - Main Entry Point
//! Composition root: wires the SQLite stores and a mailer into the scheduler

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use config::{Args, LogFormat, MailerKind};
use nichenest_core::application::NewsletterScheduler;
use nichenest_core::port::time_provider::SystemTimeProvider;
use nichenest_core::port::EmailSender;
use nichenest_infra_mail::{LogEmailSender, SmtpEmailSender};
use nichenest_infra_sqlite::{create_pool, run_migrations, SqliteJobStore, SqliteSubscriberStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("nichenest=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

fn build_mailer(kind: MailerKind) -> Result<Arc<dyn EmailSender>> {
    let mailer: Arc<dyn EmailSender> = match kind {
        MailerKind::Smtp => Arc::new(SmtpEmailSender::from_env().context("SMTP setup failed")?),
        MailerKind::Log => Arc::new(LogEmailSender),
    };
    Ok(mailer)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Initialize logging
    init_logging(args.log_format)?;
    info!("NicheNest newsletter v{} starting...", VERSION);

    // 2. Initialize database
    let database_url = args.database_url();
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        if let Some(dir) = Path::new(path).parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create database directory {}", dir.display()))?;
        }
    }
    info!(database_url = %database_url, "Initializing database...");

    let pool = create_pool(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let job_store = Arc::new(SqliteJobStore::new(pool.clone(), time_provider));
    let subscriber_store = Arc::new(SqliteSubscriberStore::new(pool.clone()));
    let mailer = build_mailer(args.mailer)?;
    info!(mailer = ?args.mailer, "Email delivery configured");

    let scheduler = Arc::new(NewsletterScheduler::new(
        job_store,
        subscriber_store,
        mailer,
        args.scheduler_config(),
    ));

    // 4. Single-shot mode
    if args.once {
        let report = scheduler
            .run_tick()
            .await
            .context("Newsletter tick failed")?
            .context("Another tick was already running")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        pool.close().await;
        return Ok(());
    }

    // 5. Start the tick loop
    let handle = scheduler.start();
    info!("System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Finishing the current job...");

    // 7. Graceful shutdown
    if let Err(e) = handle.stop().await {
        tracing::warn!(error = %e, "Scheduler did not stop cleanly");
    }
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}
