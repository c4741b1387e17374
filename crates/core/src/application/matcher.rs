//! Niche Matcher - selects the subscribers interested in a job
//!
//! Pure function over the full subscriber collection. Matching is exact,
//! case-sensitive string equality between the job's niche and any of the
//! subscriber's (up to three) preferences.

use crate::domain::{DomainError, Job, Subscriber};

/// Subscribers whose niche set contains `job.niche`
///
/// Input order is preserved; callers must not rely on it.
///
/// # Errors
/// `DomainError::MissingNiche` if the job's niche is blank. The scheduler
/// checks for this before calling and skips such jobs.
pub fn match_subscribers<'a>(
    job: &Job,
    subscribers: &'a [Subscriber],
) -> Result<Vec<&'a Subscriber>, DomainError> {
    let niche = job.require_niche()?;
    Ok(subscribers.iter().filter(|s| s.prefers(niche)).collect())
}
