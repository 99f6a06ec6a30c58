//! Automation-account exclusion.
//!
//! Matching is a case-sensitive substring test against the author display
//! name. Bot accounts drift in exact naming but keep a recognisable
//! `[bot]` style fragment, so substrings catch renamed bots; the cost is
//! that a human whose name happens to contain a pattern is excluded too.

use tracing::debug;

use crate::models::Commit;

/// Automation accounts that commit to the ublue-os image repositories.
pub const DEFAULT_AUTOMATION_AUTHORS: &[&str] = &[
    "ubot-7274[bot]",
    "renovate[bot]",
    "github-actions[bot]",
    "dependabot[bot]",
    "blacksmith-sh[bot]",
];

/// Drops commits authored by automation accounts.
#[derive(Debug, Clone)]
pub struct AuthorFilter {
    patterns: Vec<String>,
}

impl AuthorFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `author` matches any automation pattern.
    pub fn is_automation(&self, author: &str) -> bool {
        self.patterns.iter().any(|p| author.contains(p.as_str()))
    }

    /// Split `commits` into the human ones (order preserved) and the number
    /// of automation commits removed.
    pub fn partition(&self, commits: Vec<Commit>) -> (Vec<Commit>, usize) {
        let total = commits.len();
        let kept: Vec<Commit> = commits
            .into_iter()
            .filter(|c| !self.is_automation(&c.author))
            .collect();
        let excluded = total - kept.len();
        debug!(total, excluded, "filtered automation commits");
        (kept, excluded)
    }
}

impl Default for AuthorFilter {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOMATION_AUTHORS.iter().copied())
    }
}
