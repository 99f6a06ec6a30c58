//! Time-windowed commit enumeration.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use super::runner::CommandRunner;
use crate::errors::GitError;
use crate::models::Commit;

/// Field separator in the `git log` record format. Hashes, author names and
/// ISO dates never contain it; subjects may, which is why parsing uses a
/// bounded split.
pub const FIELD_DELIMITER: char = '|';

/// `git log` pretty format: hash, author name, strict ISO author date, subject.
pub const LOG_FORMAT: &str = "--pretty=format:%H|%an|%aI|%s";

/// Lists the commits of a reference authored within a lookback window.
pub struct CommitWindowCollector<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> CommitWindowCollector<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Commits on `reference` dated at or after `cutoff`, in git's native
    /// traversal order. An empty window is not an error.
    #[instrument(skip(self))]
    pub async fn collect_since(
        &self,
        reference: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Commit>, GitError> {
        let since = format!("--since={}", cutoff.format("%Y-%m-%d %H:%M:%S %z"));
        let args = ["log", since.as_str(), LOG_FORMAT, reference];
        let stdout = self.runner.run(&args).await?.into_success(&args)?;
        let commits = parse_log_output(&stdout);
        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }
}

/// Parse `git log` output produced with [`LOG_FORMAT`].
///
/// Malformed records (missing fields, bad hash, unparseable date) are skipped
/// with a warning rather than failing the whole window.
pub fn parse_log_output(stdout: &str) -> Vec<Commit> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_log_record(line) {
            Ok(commit) => Some(commit),
            Err(e) => {
                warn!(record = line, error = %e, "skipping malformed log record");
                None
            }
        })
        .collect()
}

/// Parse one `hash|author|date|subject` record.
pub fn parse_log_record(line: &str) -> Result<Commit, GitError> {
    let fields: Vec<&str> = line.splitn(4, FIELD_DELIMITER).collect();
    let [hash, author, date, subject] = fields[..] else {
        return Err(GitError::Parse(format!(
            "expected 4 fields, found {}",
            fields.len()
        )));
    };

    let hash = hash.trim();
    if !is_object_id(hash) {
        return Err(GitError::Parse(format!("invalid commit hash '{hash}'")));
    }
    let authored_at = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|e| GitError::Parse(format!("invalid author date '{date}': {e}")))?;

    Ok(Commit {
        hash: hash.to_string(),
        author: author.to_string(),
        authored_at,
        subject: subject.to_string(),
    })
}

/// Whether `s` is a full 40-character hexadecimal object id.
pub fn is_object_id(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
