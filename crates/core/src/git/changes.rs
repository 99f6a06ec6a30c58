//! Per-commit file change classification.

use tracing::{debug, instrument, warn};

use super::runner::CommandRunner;
use crate::models::{ChangeKind, DiffText, FileChange};

/// Files touched by a commit, or why they could not be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub files: Vec<FileChange>,
    pub diagnostic: Option<String>,
}

/// Lists the paths a commit changed relative to its first parent.
pub struct ChangeSetInspector<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> ChangeSetInspector<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Classify every path changed by `hash`.
    ///
    /// Never fails: a commit without a parent, an unknown object or a git
    /// failure yields an empty list with a diagnostic.
    #[instrument(skip(self))]
    pub async fn inspect(&self, hash: &str) -> ChangeSet {
        let parent = format!("{hash}^1");
        let args = ["diff-tree", "-r", "-M", "--name-status", parent.as_str(), hash];
        let result = self
            .runner
            .run(&args)
            .await
            .and_then(|output| output.into_success(&args));
        match result {
            Ok(stdout) => {
                let files = parse_name_status(&stdout);
                debug!(count = files.len(), "classified file changes");
                ChangeSet {
                    files,
                    diagnostic: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "could not list file changes");
                ChangeSet {
                    files: Vec::new(),
                    diagnostic: Some(e.to_string()),
                }
            }
        }
    }

    /// Full patch of `hash`, for display.
    #[instrument(skip(self))]
    pub async fn diff(&self, hash: &str) -> DiffText {
        let args = ["show", "--no-merges", "--format=", hash];
        let result = self
            .runner
            .run(&args)
            .await
            .and_then(|output| output.into_success(&args));
        match result {
            Ok(stdout) => DiffText::Patch(stdout.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "could not retrieve diff");
                DiffText::Unavailable(e.to_string())
            }
        }
    }
}

/// Parse `--name-status` output.
///
/// Lines look like `M\tpath` or, for renames and copies, `R087\told\tnew`.
/// Lines without a tab are ignored.
pub fn parse_name_status(stdout: &str) -> Vec<FileChange> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let (status, rest) = line.split_once('\t')?;
            let code = status.trim().chars().next()?;
            let change_kind = ChangeKind::from_status(code);
            let (path, previous_path) = match (change_kind, rest.split_once('\t')) {
                (ChangeKind::Renamed | ChangeKind::Copied, Some((from, to))) => {
                    (to.to_string(), Some(from.to_string()))
                }
                _ => (rest.to_string(), None),
            };
            Some(FileChange {
                path,
                change_kind,
                previous_path,
            })
        })
        .collect()
}
