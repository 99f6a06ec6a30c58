//! Conflict detection from merge-simulation transcripts.
//!
//! A [`ConflictScanner`] knows which git command simulates a three-way tree
//! merge and how to read conflicting paths out of its output. Callers only
//! see "transcript in, set of paths out", so the text heuristic of
//! [`MarkerScanner`] can be swapped for the structured [`WriteTreeScanner`]
//! without touching them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::git::CommandOutput;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which merge simulation to run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// `git merge-tree <base> <ours> <theirs>` and a conflict-marker scan.
    #[default]
    MarkerScan,
    /// `git merge-tree --write-tree` (git 2.40+) and its conflicted-file list.
    WriteTree,
}

impl MergeStrategy {
    pub fn scanner(self) -> Box<dyn ConflictScanner> {
        match self {
            Self::MarkerScan => Box::new(MarkerScanner),
            Self::WriteTree => Box::new(WriteTreeScanner),
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MarkerScan => write!(f, "marker-scan"),
            Self::WriteTree => write!(f, "write-tree"),
        }
    }
}

/// Runs and interprets an in-memory merge of `commit` onto `tip`.
pub trait ConflictScanner: Send + Sync {
    /// Git arguments merging `tip` and `commit` with `parent` as the base.
    /// The command must not write to the index, working tree, or any ref.
    fn simulation_args(&self, parent: &str, tip: &str, commit: &str) -> Vec<String>;

    /// Conflicting paths reported by the transcript, or a description of
    /// why the transcript is not a normal merge report.
    fn conflicts(&self, output: &CommandOutput) -> Result<BTreeSet<String>, String>;
}

// ---------------------------------------------------------------------------
// Marker scan
// ---------------------------------------------------------------------------

/// Scans trivial `git merge-tree` output for conflict markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerScanner;

impl ConflictScanner for MarkerScanner {
    fn simulation_args(&self, parent: &str, tip: &str, commit: &str) -> Vec<String> {
        vec![
            "merge-tree".to_string(),
            parent.to_string(),
            tip.to_string(),
            commit.to_string(),
        ]
    }

    fn conflicts(&self, output: &CommandOutput) -> Result<BTreeSet<String>, String> {
        if !output.success() {
            return Err(failure_message(output));
        }
        Ok(scan_conflict_markers(&output.stdout))
    }
}

/// Paths associated with conflict markers in a merge transcript.
///
/// Each marker is attributed to the most recent file header seen, either a
/// unified-diff `+++ b/<path>` line or a trivial merge-tree stage line
/// (`  our    100644 <oid> <path>`). A path counts only once a `<<<<<<<`
/// opener has appeared under its header; a new header starts over. Markers
/// before any header are ignored.
pub fn scan_conflict_markers(transcript: &str) -> BTreeSet<String> {
    let mut current: Option<&str> = None;
    let mut opened = false;
    let mut conflicts = BTreeSet::new();

    for line in transcript.lines() {
        if let Some(path) = file_header(line) {
            current = Some(path);
            opened = false;
            continue;
        }
        match marker_kind(line) {
            Some(Marker::Open) => opened = true,
            Some(Marker::Separator | Marker::Close) if opened => {}
            _ => continue,
        }
        if let Some(path) = current {
            if conflicts.insert(path.to_string()) {
                debug!(path, "conflict markers found");
            }
        }
    }
    conflicts
}

fn file_header(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("+++ ") {
        if rest == "/dev/null" {
            return None;
        }
        return Some(rest.strip_prefix("b/").unwrap_or(rest));
    }

    // Trivial merge-tree prints "  <stage> <mode> <oid> <path>".
    let rest = line.strip_prefix("  ")?;
    let (stage, rest) = rest.split_once(' ')?;
    if !matches!(stage, "base" | "our" | "their" | "result") {
        return None;
    }
    let (mode, rest) = rest.trim_start().split_once(' ')?;
    if mode.is_empty() || !mode.chars().all(|c| c.is_digit(8)) {
        return None;
    }
    let (oid, path) = rest.split_once(' ')?;
    if oid.is_empty() || !oid.bytes().all(|b| b.is_ascii_hexdigit()) || path.is_empty() {
        return None;
    }
    Some(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Open,
    Separator,
    Close,
}

fn marker_kind(line: &str) -> Option<Marker> {
    let body = match line.as_bytes().first() {
        Some(b'+' | b'-' | b' ') => &line[1..],
        _ => line,
    };
    let starts_with_marker = |marker: &str| {
        body.strip_prefix(marker)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
    };
    if starts_with_marker("<<<<<<<") {
        Some(Marker::Open)
    } else if starts_with_marker(">>>>>>>") {
        Some(Marker::Close)
    } else if body.trim_end() == "=======" {
        Some(Marker::Separator)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Write-tree
// ---------------------------------------------------------------------------

/// Reads the conflicted-file list of `git merge-tree --write-tree`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteTreeScanner;

impl ConflictScanner for WriteTreeScanner {
    fn simulation_args(&self, parent: &str, tip: &str, commit: &str) -> Vec<String> {
        vec![
            "merge-tree".to_string(),
            "--write-tree".to_string(),
            "--name-only".to_string(),
            "--no-messages".to_string(),
            format!("--merge-base={parent}"),
            tip.to_string(),
            commit.to_string(),
        ]
    }

    fn conflicts(&self, output: &CommandOutput) -> Result<BTreeSet<String>, String> {
        match output.exit_code {
            0 => Ok(BTreeSet::new()),
            // First line is the (partial) tree id, then one conflicted path
            // per line up to the first blank line.
            1 => Ok(output
                .stdout
                .lines()
                .skip(1)
                .take_while(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            _ => Err(failure_message(output)),
        }
    }
}

fn failure_message(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        format!("merge simulation exited with status {}", output.exit_code)
    } else {
        format!(
            "merge simulation exited with status {}: {}",
            output.exit_code, stderr
        )
    }
}
