// Subscriber Domain Model (job seekers with niche preferences)

use super::Niche;
use serde::{Deserialize, Serialize};

/// Subscriber ID (opaque, assigned by the profile flow)
pub type SubscriberId = String;

/// Maximum number of niche preferences per subscriber (first/second/third)
pub const MAX_NICHES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub name: String,
    pub email: String,
    /// Unordered; duplicates and blanks allowed
    pub niches: Vec<Niche>,
}

impl Subscriber {
    /// Build a subscriber, keeping at most the first three preferences
    pub fn new<I, N>(
        id: impl Into<SubscriberId>,
        name: impl Into<String>,
        email: impl Into<String>,
        niches: I,
    ) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Niche>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            niches: niches.into_iter().take(MAX_NICHES).map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership test; blank slots never match
    pub fn prefers(&self, niche: &Niche) -> bool {
        !niche.is_blank() && self.niches.iter().any(|n| n == niche)
    }
}
