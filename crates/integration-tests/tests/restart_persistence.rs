//! The notified flag survives a process restart
//!
//! Uses a file-backed database: first "process" dispatches and commits,
//! second "process" opens the same file and must send nothing.

use std::sync::Arc;

use nichenest_core::application::{NewsletterScheduler, SchedulerConfig};
use nichenest_core::domain::{Job, Subscriber};
use nichenest_core::port::email_sender::mocks::RecordingEmailSender;
use nichenest_core::port::time_provider::SystemTimeProvider;
use nichenest_infra_sqlite::{create_pool, run_migrations, SqliteJobStore, SqliteSubscriberStore};

async fn open(url: &str) -> (Arc<SqliteJobStore>, Arc<SqliteSubscriberStore>, sqlx::SqlitePool) {
    let pool = create_pool(url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let jobs = Arc::new(SqliteJobStore::new(pool.clone(), Arc::new(SystemTimeProvider)));
    let subscribers = Arc::new(SqliteSubscriberStore::new(pool.clone()));
    (jobs, subscribers, pool)
}

#[tokio::test]
async fn test_no_resend_after_restart() {
    let path = std::env::temp_dir().join(format!("nichenest_restart_{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());

    // First process: seed and run one tick
    {
        let (jobs, subscribers, pool) = open(&url).await;
        jobs.insert(&Job::new_test("J1", "Machine Learning")).await.unwrap();
        subscribers
            .insert(&Subscriber::new("U1", "Ann", "ann@example.com", ["Machine Learning"]), 1)
            .await
            .unwrap();

        let sender = Arc::new(RecordingEmailSender::new());
        let scheduler =
            NewsletterScheduler::new(jobs, subscribers, sender.clone(), SchedulerConfig::default());
        scheduler.run_tick().await.unwrap();
        assert_eq!(sender.call_count(), 1);
        pool.close().await;
    }

    // Second process: same file, fresh scheduler
    {
        let (jobs, subscribers, pool) = open(&url).await;
        let sender = Arc::new(RecordingEmailSender::new());
        let scheduler = NewsletterScheduler::new(
            jobs.clone(),
            subscribers,
            sender.clone(),
            SchedulerConfig::default(),
        );

        let report = scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(report.jobs_found, 0);
        assert_eq!(sender.call_count(), 0);

        let job = jobs.find_by_id("J1").await.unwrap().unwrap();
        assert!(job.notified);
        assert!(job.notified_at.is_some());
        pool.close().await;
    }

    let _ = std::fs::remove_file(&path);
}
