//! Domain model types used throughout cherryscout.
//!
//! These types bridge the git-facing components, the advisor loop, and the
//! presentation sinks.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// One of the two image trees that exchange changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Project {
    Aurora,
    Bluefin,
}

impl Project {
    /// The project whose history we analyse when we are `self`.
    pub fn other(self) -> Self {
        match self {
            Self::Aurora => Self::Bluefin,
            Self::Bluefin => Self::Aurora,
        }
    }

    /// Lowercase identifier, also used as remote name and GitHub repo name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aurora => "aurora",
            Self::Bluefin => "bluefin",
        }
    }

    /// Canonical clone URL of the project.
    pub fn remote_url(self) -> String {
        format!("https://github.com/ublue-os/{}.git", self.as_str())
    }

    /// Parse a project identifier (case-insensitive).
    pub fn from_str_val(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aurora" => Some(Self::Aurora),
            "bluefin" => Some(Self::Bluefin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

/// A tracking remote registered in the local repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
    pub fetched: bool,
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A commit parsed out of a history query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commit {
    /// Full 40-character object id.
    pub hash: String,
    pub author: String,
    pub authored_at: DateTime<FixedOffset>,
    pub subject: String,
}

impl Commit {
    /// Abbreviated hash for display.
    pub fn short_hash(&self) -> &str {
        &self.hash[..8.min(self.hash.len())]
    }
}

// ---------------------------------------------------------------------------
// File changes
// ---------------------------------------------------------------------------

/// Kind of change a commit made to one path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Changed,
}

impl ChangeKind {
    /// Map the leading character of a name-status code to a kind.
    ///
    /// Total over `char`: anything not listed (type changes, unmerged,
    /// unknown) is [`ChangeKind::Changed`].
    pub fn from_status(code: char) -> Self {
        match code {
            'A' => Self::Added,
            'M' => Self::Modified,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            _ => Self::Changed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::Changed => "changed",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single path touched by a commit, relative to its first parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub change_kind: ChangeKind,
    /// Source path of a rename or copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Compatibility verdict
// ---------------------------------------------------------------------------

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerdictMethod {
    /// A tree merge was simulated and its transcript interpreted.
    Simulated,
    /// The simulation could not be carried out.
    Unknown,
}

impl std::fmt::Display for VerdictMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Predicted outcome of cherry-picking one commit onto the current tip.
///
/// Fields are private so the invariants hold: conflicting paths only appear
/// on a non-applicable verdict, and an unknown method is never applicable.
/// Only the constructors below build one, so it is serialize-only.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompatibilityVerdict {
    applicable: bool,
    conflicting_paths: BTreeSet<String>,
    method: VerdictMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<String>,
}

impl CompatibilityVerdict {
    /// The simulation found no conflicts.
    pub fn clean() -> Self {
        Self {
            applicable: true,
            conflicting_paths: BTreeSet::new(),
            method: VerdictMethod::Simulated,
            diagnostic: None,
        }
    }

    /// Verdict from a completed simulation; empty `paths` means clean.
    pub fn from_conflicts(paths: BTreeSet<String>) -> Self {
        if paths.is_empty() {
            return Self::clean();
        }
        Self {
            applicable: false,
            conflicting_paths: paths,
            method: VerdictMethod::Simulated,
            diagnostic: None,
        }
    }

    /// The simulation could not be run; assume the worst.
    pub fn unknown(diagnostic: impl Into<String>) -> Self {
        Self {
            applicable: false,
            conflicting_paths: BTreeSet::new(),
            method: VerdictMethod::Unknown,
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn applicable(&self) -> bool {
        self.applicable
    }

    pub fn conflicting_paths(&self) -> &BTreeSet<String> {
        &self.conflicting_paths
    }

    pub fn method(&self) -> VerdictMethod {
        self.method
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Full diff of a commit, or why it could not be produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DiffText {
    Patch(String),
    Unavailable(String),
}

/// Everything known about one candidate commit.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// 1-based position in the filtered window.
    pub index: usize,
    pub commit: Commit,
    pub changes: Vec<FileChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_diagnostic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    /// Absent when the compatibility check was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<CompatibilityVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffText>,
}

impl ReportEntry {
    /// The command a maintainer would run to port this commit.
    pub fn cherry_pick_command(&self) -> String {
        format!("git cherry-pick {}", self.commit.hash)
    }
}

/// Static facts about a run, handed to the sink before any entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub target: Project,
    pub remote: Remote,
    pub reference: String,
    pub lookback_days: u32,
    pub total_commits: usize,
    pub excluded_commits: usize,
}

/// Counters reported once the loop completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub total_commits: usize,
    pub excluded_commits: usize,
    pub reported: usize,
}
