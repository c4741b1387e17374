// Job Domain Model

use super::{DomainError, Niche};
use serde::{Deserialize, Serialize};

/// Job ID (opaque, assigned by the posting flow)
pub type JobId = String;

/// Job posting as seen by the newsletter engine
///
/// Only `niche` and `notified` carry meaning for matching and scheduling;
/// the descriptive fields are rendered into the email body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub salary: String,
    pub niche: Niche,

    /// Flips false -> true once per job, never reverts
    pub notified: bool,

    pub created_at: i64, // epoch ms
    pub notified_at: Option<i64>,
}

impl Job {
    pub fn new(
        id: impl Into<JobId>,
        title: impl Into<String>,
        company_name: impl Into<String>,
        location: impl Into<String>,
        salary: impl Into<String>,
        niche: impl Into<Niche>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company_name: company_name.into(),
            location: location.into(),
            salary: salary.into(),
            niche: niche.into(),
            notified: false,
            created_at,
            notified_at: None,
        }
    }

    /// Create a test job with placeholder descriptive fields (for tests only)
    pub fn new_test(id: impl Into<JobId>, niche: impl Into<Niche>) -> Self {
        Self::new(
            id,
            "Backend Engineer",
            "Acme Corp",
            "Remote",
            "100000",
            niche,
            1000,
        )
    }

    /// Niche usable for matching, or `MissingNiche` for blank data
    pub fn require_niche(&self) -> Result<&Niche, DomainError> {
        if self.niche.is_blank() {
            return Err(DomainError::MissingNiche {
                job_id: self.id.clone(),
            });
        }
        Ok(&self.niche)
    }
}
