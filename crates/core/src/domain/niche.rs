// Niche catalogue offered by the job board

use serde::{Deserialize, Serialize};

/// Niches a job can be posted under
pub const KNOWN_NICHES: [&str; 20] = [
    "Software Development",
    "Web Development",
    "Cybersecurity",
    "Data Science",
    "Artificial Intelligence",
    "Cloud Computing",
    "DevOps",
    "Mobile App Development",
    "Blockchain",
    "Database Administration",
    "Network Administration",
    "UI/UX Design",
    "Game Development",
    "IoT (Internet of Things)",
    "Big Data",
    "Machine Learning",
    "IT Project Management",
    "IT Support and Helpdesk",
    "Systems Administration",
    "IT Consulting",
];

/// Niche label (compared by exact, case-sensitive string equality)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Niche(String);

impl Niche {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank labels (empty or whitespace only) never match anything
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether the label belongs to the job board's catalogue
    pub fn is_known(&self) -> bool {
        KNOWN_NICHES.contains(&self.0.as_str())
    }
}

impl std::fmt::Display for Niche {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Niche {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Niche {
    fn from(s: String) -> Self {
        Self(s)
    }
}
