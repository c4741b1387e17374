// Job Store Port (Interface)

use crate::domain::{Job, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// Read side of the job board's job collection, plus the one flag the
/// newsletter engine is allowed to write
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All jobs whose `notified` flag is still false, oldest first
    async fn find_unnotified(&self) -> Result<Vec<Job>>;

    /// Flip `notified` to true
    ///
    /// # Errors
    /// - `AppError::NotFound` if the job does not exist
    /// - `AppError::Conflict` if the job was already notified
    async fn mark_notified(&self, id: &JobId) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory job store with failure injection
    #[derive(Default)]
    pub struct InMemoryJobStore {
        jobs: Mutex<Vec<Job>>,
        fail_fetch: Mutex<bool>,
        fail_commit: Mutex<HashSet<JobId>>,
        commit_calls: Mutex<HashMap<JobId, usize>>,
        fetch_count: Mutex<usize>,
    }

    impl InMemoryJobStore {
        pub fn new(jobs: Vec<Job>) -> Self {
            Self {
                jobs: Mutex::new(jobs),
                ..Default::default()
            }
        }
        pub fn insert(&self, job: Job) {
            self.jobs.lock().unwrap().push(job);
        }
        pub fn get(&self, id: &str) -> Option<Job> {
            self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned()
        }
        pub fn set_niche(&self, id: &str, niche: &str) {
            if let Some(job) = self.jobs.lock().unwrap().iter_mut().find(|j| j.id == id) {
                job.niche = niche.into();
            }
        }
        /// Make `find_unnotified` fail until reset
        pub fn set_fail_fetch(&self, fail: bool) {
            *self.fail_fetch.lock().unwrap() = fail;
        }
        /// Make `mark_notified` fail for this job until reset
        pub fn set_fail_commit(&self, id: &str, fail: bool) {
            let mut set = self.fail_commit.lock().unwrap();
            if fail {
                set.insert(id.to_string());
            } else {
                set.remove(id);
            }
        }
        /// Successful false -> true transitions recorded for a job
        pub fn commit_count(&self, id: &str) -> usize {
            self.commit_calls.lock().unwrap().get(id).copied().unwrap_or(0)
        }
        pub fn fetch_count(&self) -> usize {
            *self.fetch_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn find_unnotified(&self) -> Result<Vec<Job>> {
            *self.fetch_count.lock().unwrap() += 1;
            if *self.fail_fetch.lock().unwrap() {
                return Err(AppError::StoreUnavailable("mock fetch failure".into()));
            }
            let mut jobs: Vec<Job> = self
                .jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| !j.notified)
                .cloned()
                .collect();
            jobs.sort_by_key(|j| j.created_at);
            Ok(jobs)
        }

        async fn mark_notified(&self, id: &JobId) -> Result<()> {
            if self.fail_commit.lock().unwrap().contains(id) {
                return Err(AppError::Database("mock commit failure".into()));
            }
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .iter_mut()
                .find(|j| &j.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;
            if job.notified {
                return Err(AppError::Conflict(format!("Job {} already notified", id)));
            }
            job.notified = true;
            job.notified_at = Some(job.created_at);
            *self.commit_calls.lock().unwrap().entry(id.clone()).or_insert(0) += 1;
            Ok(())
        }
    }
}
