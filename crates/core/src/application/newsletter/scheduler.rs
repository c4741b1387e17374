//! Newsletter Scheduler - periodic "match -> dispatch -> mark notified" pass
//!
//! Per tick: `Idle -> Fetching -> PerJobProcessing -> Committing -> Idle`.
//!
//! - Jobs are processed one at a time, oldest first.
//! - A job is marked notified after its dispatch pass returns, whatever the
//!   individual send outcomes were. Failed recipients are not retried.
//! - A job with a blank niche is skipped and stays unnotified, so it shows
//!   up again on every tick until it is fixed upstream.
//! - Ticks never overlap: the loop runs on a single task and a busy flag
//!   rejects any concurrent `run_tick` call.
//! - If the commit fails (or the process dies before it), the job is
//!   re-dispatched to every matched subscriber on the next tick.

use super::constants::{DEFAULT_SHUTDOWN_GRACE, DEFAULT_TICK_INTERVAL};
use super::shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
use crate::application::dispatcher::NotificationDispatcher;
use crate::application::matcher::match_subscribers;
use crate::domain::{Job, NotificationAttempt};
use crate::error::{AppError, Result};
use crate::port::{EmailSender, JobStore, SubscriberStore};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Fixed interval between tick starts
    pub tick_interval: Duration,
    /// How long `stop` waits for the in-flight job before giving up
    pub shutdown_grace: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub tick_id: String,
    /// Unnotified jobs returned by the store
    pub jobs_found: usize,
    /// Jobs whose flag was flipped this tick
    pub jobs_notified: usize,
    /// Jobs skipped for a missing niche (left unnotified)
    pub jobs_skipped: usize,
    /// Jobs left unnotified because of a lookup, input, or commit error
    pub jobs_failed: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    /// Full attempt log, in dispatch order
    pub attempts: Vec<NotificationAttempt>,
}

/// Resets the busy flag when a tick ends, including on early return
struct TickGuard<'a>(&'a AtomicBool);

impl<'a> TickGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct NewsletterScheduler {
    job_store: Arc<dyn JobStore>,
    subscriber_store: Arc<dyn SubscriberStore>,
    dispatcher: NotificationDispatcher,
    config: SchedulerConfig,
    busy: AtomicBool,
}

impl NewsletterScheduler {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        subscriber_store: Arc<dyn SubscriberStore>,
        email_sender: Arc<dyn EmailSender>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            job_store,
            subscriber_store,
            dispatcher: NotificationDispatcher::new(email_sender),
            config,
            busy: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run one tick now
    ///
    /// Returns `Ok(None)` without touching any store if another tick is
    /// still in flight.
    ///
    /// # Errors
    /// Only when the unnotified-job query fails; per-job errors are logged
    /// and counted in the report.
    pub async fn run_tick(&self) -> Result<Option<TickReport>> {
        self.run_tick_until(None).await
    }

    async fn run_tick_until(&self, shutdown: Option<&ShutdownToken>) -> Result<Option<TickReport>> {
        let Some(_guard) = TickGuard::acquire(&self.busy) else {
            debug!("Previous tick still running, skipping");
            return Ok(None);
        };

        let tick_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("newsletter_tick", tick_id = %tick_id);
        self.tick(tick_id, shutdown).instrument(span).await.map(Some)
    }

    async fn tick(&self, tick_id: String, shutdown: Option<&ShutdownToken>) -> Result<TickReport> {
        let jobs = self.job_store.find_unnotified().await.map_err(|e| {
            error!(error = %e, "Failed to fetch unnotified jobs, aborting tick");
            e
        })?;

        let mut report = TickReport {
            tick_id,
            jobs_found: jobs.len(),
            ..Default::default()
        };
        if jobs.is_empty() {
            debug!("No unnotified jobs");
            return Ok(report);
        }
        info!(jobs = jobs.len(), "Processing unnotified jobs");

        for job in &jobs {
            if shutdown.is_some_and(|s| s.is_shutdown()) {
                info!(
                    remaining = jobs.len() - report.jobs_notified - report.jobs_skipped - report.jobs_failed,
                    "Shutdown requested, leaving remaining jobs for the next run"
                );
                break;
            }
            self.process_job(job, &mut report).await;
        }

        info!(
            jobs_found = report.jobs_found,
            jobs_notified = report.jobs_notified,
            jobs_skipped = report.jobs_skipped,
            jobs_failed = report.jobs_failed,
            emails_sent = report.emails_sent,
            emails_failed = report.emails_failed,
            "Tick finished"
        );
        Ok(report)
    }

    /// Match, dispatch, then commit a single job
    async fn process_job(&self, job: &Job, report: &mut TickReport) {
        let niche = match job.require_niche() {
            Ok(niche) => niche,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Skipping job without a niche; it stays unnotified");
                report.jobs_skipped += 1;
                return;
            }
        };
        if !niche.is_known() {
            debug!(job_id = %job.id, niche = %niche, "Job niche is outside the catalogue");
        }

        let candidates = match self.subscriber_store.find_by_niche(niche).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Subscriber lookup failed; job stays unnotified");
                report.jobs_failed += 1;
                return;
            }
        };

        let matched = match match_subscribers(job, &candidates) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Skipping job without a niche; it stays unnotified");
                report.jobs_skipped += 1;
                return;
            }
        };
        debug!(job_id = %job.id, niche = %niche, matched = matched.len(), "Matched subscribers");

        let attempts = match self.dispatcher.dispatch(job, &matched).await {
            Ok(attempts) => attempts,
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Dispatch rejected its input; job stays unnotified");
                report.jobs_failed += 1;
                return;
            }
        };

        let sent = attempts.iter().filter(|a| a.is_sent()).count();
        report.emails_sent += sent;
        report.emails_failed += attempts.len() - sent;
        report.attempts.extend(attempts);

        match self.job_store.mark_notified(&job.id).await {
            Ok(()) => {
                info!(job_id = %job.id, recipients = matched.len(), "Job marked notified");
                report.jobs_notified += 1;
            }
            Err(AppError::Conflict(msg)) => {
                warn!(job_id = %job.id, reason = %msg, "Job was already marked notified");
                report.jobs_failed += 1;
            }
            Err(e) => {
                error!(
                    job_id = %job.id,
                    error = %e,
                    "Failed to mark job notified; it will be dispatched again next tick"
                );
                report.jobs_failed += 1;
            }
        }
    }

    /// Tick loop; returns once `shutdown` fires
    ///
    /// The first tick runs immediately. Triggers that fall due while a tick
    /// is still running are skipped, not queued.
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!(
            interval_secs = self.config.tick_interval.as_secs(),
            "Newsletter scheduler started"
        );

        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {},
                _ = shutdown.wait() => break,
            }
            if shutdown.is_shutdown() {
                break;
            }

            match self.run_tick_until(Some(&shutdown)).await {
                Ok(Some(_)) => {}
                Ok(None) => debug!("Tick skipped: previous tick still running"),
                Err(e) if e.is_transient() => {
                    warn!(error = %e, "Tick aborted, retrying on next tick")
                }
                Err(e) => error!(error = %e, "Tick aborted"),
            }
        }

        info!("Newsletter scheduler stopped");
    }

    /// Spawn the tick loop on the current runtime
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let grace = self.config.shutdown_grace;
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        SchedulerHandle {
            shutdown: shutdown_tx,
            join,
            grace,
        }
    }
}

/// Owner of a running scheduler loop
pub struct SchedulerHandle {
    shutdown: ShutdownSender,
    join: JoinHandle<()>,
    grace: Duration,
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// Stop future ticks and wait for the in-flight job to commit
    pub async fn stop(self) -> Result<()> {
        self.shutdown.shutdown();
        match tokio::time::timeout(self.grace, self.join).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::Internal(format!("Scheduler task failed: {}", e))),
            Err(_) => {
                warn!(grace_secs = self.grace.as_secs(), "Scheduler did not stop within grace period");
                Err(AppError::Internal(
                    "scheduler did not stop within grace period".into(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeliveryOutcome, Subscriber};
    use crate::port::email_sender::mocks::RecordingEmailSender;
    use crate::port::email_sender::DeliveryError;
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::subscriber_store::mocks::InMemorySubscriberStore;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct Fixture {
        jobs: Arc<InMemoryJobStore>,
        subscribers: Arc<InMemorySubscriberStore>,
        sender: Arc<RecordingEmailSender>,
        scheduler: Arc<NewsletterScheduler>,
    }

    fn fixture(jobs: Vec<Job>, subscribers: Vec<Subscriber>, sender: RecordingEmailSender) -> Fixture {
        let jobs = Arc::new(InMemoryJobStore::new(jobs));
        let subscribers = Arc::new(InMemorySubscriberStore::new(subscribers));
        let sender = Arc::new(sender);
        let scheduler = Arc::new(NewsletterScheduler::new(
            jobs.clone(),
            subscribers.clone(),
            sender.clone(),
            SchedulerConfig::default(),
        ));
        Fixture {
            jobs,
            subscribers,
            sender,
            scheduler,
        }
    }

    fn devops_trio() -> Vec<Subscriber> {
        vec![
            Subscriber::new("U1", "Ann", "ann@example.com", ["DevOps"]),
            Subscriber::new("U2", "Bob", "bob@example.com", ["x", "DevOps"]),
            Subscriber::new("U3", "Cy", "cy@example.com", ["x", "y", "DevOps"]),
        ]
    }

    #[tokio::test]
    async fn test_end_to_end_single_match() {
        let f = fixture(
            vec![Job::new_test("J1", "Data Science")],
            vec![
                Subscriber::new("U1", "Ann", "u1@example.com", ["Data Science", "DevOps", "x"]),
                Subscriber::new("U2", "Bob", "u2@example.com", ["Web Development", "x", "y"]),
            ],
            RecordingEmailSender::new(),
        );

        let report = f.scheduler.run_tick().await.unwrap().unwrap();

        assert_eq!(f.sender.call_count(), 1);
        assert_eq!(f.sender.calls_to("u1@example.com"), 1);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].subscriber_id, "U1");
        assert_eq!(report.jobs_notified, 1);
        assert!(f.jobs.get("J1").unwrap().notified);
    }

    #[tokio::test]
    async fn test_second_tick_sends_nothing() {
        let f = fixture(
            vec![Job::new_test("J1", "DevOps"), Job::new_test("J2", "DevOps")],
            devops_trio(),
            RecordingEmailSender::new(),
        );

        f.scheduler.run_tick().await.unwrap();
        assert_eq!(f.sender.call_count(), 6);

        let report = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(report.jobs_found, 0);
        assert_eq!(f.sender.call_count(), 6);
    }

    #[tokio::test]
    async fn test_partial_failure_still_commits() {
        let f = fixture(
            vec![Job::new_test("J1", "DevOps")],
            devops_trio(),
            RecordingEmailSender::failing_for(&["bob@example.com"]),
        );

        let report = f.scheduler.run_tick().await.unwrap().unwrap();

        let outcomes: Vec<_> = report.attempts.iter().map(|a| a.outcome.clone()).collect();
        assert_eq!(outcomes[0], DeliveryOutcome::Sent);
        assert!(matches!(outcomes[1], DeliveryOutcome::Failed(_)));
        assert_eq!(outcomes[2], DeliveryOutcome::Sent);
        assert_eq!(f.sender.calls_to("cy@example.com"), 1);
        assert_eq!((report.emails_sent, report.emails_failed), (2, 1));
        assert!(f.jobs.get("J1").unwrap().notified);
    }

    #[tokio::test]
    async fn test_commit_at_most_once_when_every_send_fails() {
        let sender = RecordingEmailSender::new();
        sender.set_fail_all(true);
        let f = fixture(vec![Job::new_test("J1", "DevOps")], devops_trio(), sender);

        for _ in 0..3 {
            f.scheduler.run_tick().await.unwrap();
        }

        assert_eq!(f.jobs.commit_count("J1"), 1);
        assert_eq!(f.sender.call_count(), 3);
        assert!(f.jobs.get("J1").unwrap().notified);
    }

    #[tokio::test]
    async fn test_blank_niche_is_skipped_and_retried() {
        let f = fixture(
            vec![Job::new_test("J1", ""), Job::new_test("J2", "DevOps")],
            devops_trio(),
            RecordingEmailSender::new(),
        );

        let first = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(first.jobs_skipped, 1);
        assert_eq!(first.jobs_notified, 1);
        assert!(!f.jobs.get("J1").unwrap().notified);

        let second = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(second.jobs_found, 1);
        assert_eq!(second.jobs_skipped, 1);

        // Fixed upstream: picked up on the following tick
        f.jobs.set_niche("J1", "DevOps");
        let third = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(third.jobs_notified, 1);
        assert!(f.jobs.get("J1").unwrap().notified);
    }

    #[tokio::test]
    async fn test_store_outage_aborts_tick_and_next_tick_recovers() {
        let f = fixture(
            vec![Job::new_test("J1", "DevOps")],
            devops_trio(),
            RecordingEmailSender::new(),
        );

        f.jobs.set_fail_fetch(true);
        let err = f.scheduler.run_tick().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(f.sender.call_count(), 0);

        f.jobs.set_fail_fetch(false);
        let report = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(report.jobs_notified, 1);
    }

    #[tokio::test]
    async fn test_commit_failure_redispatches_next_tick() {
        let f = fixture(
            vec![Job::new_test("J1", "DevOps")],
            devops_trio(),
            RecordingEmailSender::new(),
        );

        f.jobs.set_fail_commit("J1", true);
        let first = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(first.jobs_failed, 1);
        assert!(!f.jobs.get("J1").unwrap().notified);

        f.jobs.set_fail_commit("J1", false);
        f.scheduler.run_tick().await.unwrap();

        // Every matched subscriber was emailed twice: the accepted duplicate
        assert_eq!(f.sender.calls_to("ann@example.com"), 2);
        assert_eq!(f.jobs.commit_count("J1"), 1);
    }

    #[tokio::test]
    async fn test_subscriber_lookup_failure_leaves_job_unnotified() {
        let f = fixture(
            vec![Job::new_test("J1", "DevOps")],
            devops_trio(),
            RecordingEmailSender::new(),
        );

        f.subscribers.set_fail(true);
        let report = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(report.jobs_failed, 1);
        assert!(!f.jobs.get("J1").unwrap().notified);

        f.subscribers.set_fail(false);
        f.scheduler.run_tick().await.unwrap();
        assert!(f.jobs.get("J1").unwrap().notified);
    }

    #[tokio::test]
    async fn test_invalid_recipient_leaves_job_unnotified() {
        let f = fixture(
            vec![Job::new_test("J1", "DevOps")],
            vec![Subscriber::new("U1", "Ann", "", ["DevOps"])],
            RecordingEmailSender::new(),
        );

        let report = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(report.jobs_failed, 1);
        assert_eq!(f.sender.call_count(), 0);
        assert!(!f.jobs.get("J1").unwrap().notified);
    }

    #[tokio::test]
    async fn test_job_without_subscribers_is_still_notified() {
        let f = fixture(
            vec![Job::new_test("J1", "Blockchain")],
            devops_trio(),
            RecordingEmailSender::new(),
        );

        let report = f.scheduler.run_tick().await.unwrap().unwrap();
        assert_eq!(report.jobs_notified, 1);
        assert_eq!(f.sender.call_count(), 0);
    }

    /// Blocks inside `send` until released
    struct GatedSender {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl EmailSender for GatedSender {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> std::result::Result<(), DeliveryError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_rejected() {
        let jobs = Arc::new(InMemoryJobStore::new(vec![Job::new_test("J1", "DevOps")]));
        let subscribers = Arc::new(InMemorySubscriberStore::new(vec![Subscriber::new(
            "U1",
            "Ann",
            "ann@example.com",
            ["DevOps"],
        )]));
        let sender = Arc::new(GatedSender {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let scheduler = Arc::new(NewsletterScheduler::new(
            jobs.clone(),
            subscribers,
            sender.clone(),
            SchedulerConfig::default(),
        ));

        let in_flight = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run_tick().await })
        };
        sender.entered.notified().await;

        assert!(scheduler.run_tick().await.unwrap().is_none());
        assert_eq!(jobs.fetch_count(), 1);

        sender.release.notify_one();
        let report = in_flight.await.unwrap().unwrap().unwrap();
        assert_eq!(report.jobs_notified, 1);

        // Busy flag is released once the tick ends
        assert!(scheduler.run_tick().await.unwrap().is_some());
    }

    /// Requests shutdown from inside the first send
    struct ShutdownOnSend {
        shutdown: ShutdownSender,
    }

    #[async_trait]
    impl EmailSender for ShutdownOnSend {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> std::result::Result<(), DeliveryError> {
            self.shutdown.shutdown();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_shutdown_finishes_current_job_only() {
        let jobs = Arc::new(InMemoryJobStore::new(vec![
            Job::new_test("J1", "DevOps"),
            Job::new_test("J2", "DevOps"),
        ]));
        let subscribers = Arc::new(InMemorySubscriberStore::new(vec![Subscriber::new(
            "U1",
            "Ann",
            "ann@example.com",
            ["DevOps"],
        )]));
        let (tx, token) = shutdown_channel();
        let scheduler = NewsletterScheduler::new(
            jobs.clone(),
            subscribers,
            Arc::new(ShutdownOnSend { shutdown: tx }),
            SchedulerConfig::default(),
        );

        scheduler.run(token).await;

        assert!(jobs.get("J1").unwrap().notified);
        assert!(!jobs.get("J2").unwrap().notified);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ticks_on_interval_until_stopped() {
        let f = fixture(
            vec![Job::new_test("J1", "DevOps")],
            devops_trio(),
            RecordingEmailSender::new(),
        );

        let handle = f.scheduler.clone().start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(f.jobs.get("J1").unwrap().notified);

        f.jobs.insert(Job::new_test("J2", "DevOps"));
        tokio::time::sleep(DEFAULT_TICK_INTERVAL).await;
        assert!(f.jobs.get("J2").unwrap().notified);
        assert!(f.jobs.fetch_count() >= 2);

        assert!(handle.is_running());
        handle.stop().await.unwrap();
        assert_eq!(f.sender.call_count(), 6);
    }
}
