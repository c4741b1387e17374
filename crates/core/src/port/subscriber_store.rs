// Subscriber Store Port (Interface)

use crate::domain::{Niche, Subscriber};
use crate::error::Result;
use async_trait::async_trait;

/// Read-only view of job seekers and their niche preferences
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Every subscriber, unfiltered
    async fn find_all(&self) -> Result<Vec<Subscriber>>;

    /// Candidates for a niche
    ///
    /// Implementations may narrow the result with an index but must never
    /// drop a subscriber that holds an exact match. The caller still runs
    /// the matcher over whatever is returned.
    async fn find_by_niche(&self, _niche: &Niche) -> Result<Vec<Subscriber>> {
        self.find_all().await
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// In-memory subscriber store (uses the default `find_by_niche`)
    #[derive(Default)]
    pub struct InMemorySubscriberStore {
        subscribers: Mutex<Vec<Subscriber>>,
        fail: Mutex<bool>,
    }

    impl InMemorySubscriberStore {
        pub fn new(subscribers: Vec<Subscriber>) -> Self {
            Self {
                subscribers: Mutex::new(subscribers),
                fail: Mutex::new(false),
            }
        }
        pub fn insert(&self, subscriber: Subscriber) {
            self.subscribers.lock().unwrap().push(subscriber);
        }
        pub fn set_fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl SubscriberStore for InMemorySubscriberStore {
        async fn find_all(&self) -> Result<Vec<Subscriber>> {
            if *self.fail.lock().unwrap() {
                return Err(AppError::StoreUnavailable("mock subscriber failure".into()));
            }
            Ok(self.subscribers.lock().unwrap().clone())
        }
    }
}
