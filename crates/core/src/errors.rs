//! Error types for the cherryscout core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and
//! [`AdvisorError`] is what a run surfaces to the binary. Only fatal faults
//! ever travel this far; per-commit faults are folded into the report entry.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Fatal outcome of an advisory run.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Registering or fetching the tracking remote failed.
    #[error("failed to set up remote '{remote}': {source}")]
    Setup {
        remote: String,
        #[source]
        source: GitError,
    },

    /// The history query for the commit window failed.
    #[error("failed to collect commits from '{reference}': {source}")]
    Collection {
        reference: String,
        #[source]
        source: GitError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The presentation sink refused an entry.
    #[error("report output failed: {0}")]
    Report(String),

    /// The user asked us to stop (Ctrl+C / SIGTERM).
    #[error("operation cancelled by user")]
    Interrupted,
}

impl AdvisorError {
    /// Whether this error stems from a user interrupt rather than a fault.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from invoking the `git` CLI.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` binary was not found on `$PATH`.
    #[error("git binary not found: {0}")]
    BinaryNotFound(String),

    /// A `git` command exited with a non-zero status.
    #[error("`git {command}` failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Output of a git command could not be interpreted.
    #[error("could not parse git output: {0}")]
    Parse(String),

    /// Generic I/O wrapper.
    #[error("git I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = GitError::CommandFailed {
            command: "fetch bluefin".into(),
            exit_code: 128,
            stderr: "could not resolve host".into(),
        };
        assert_eq!(
            err.to_string(),
            "`git fetch bluefin` failed (exit 128): could not resolve host"
        );

        let err = ConfigError::InvalidValue {
            field: "analysis.lookback_days".into(),
            detail: "must be > 0".into(),
        };
        assert!(err.to_string().contains("analysis.lookback_days"));

        let err = AdvisorError::Setup {
            remote: "bluefin".into(),
            source: GitError::BinaryNotFound("git".into()),
        };
        assert!(err.to_string().starts_with("failed to set up remote 'bluefin'"));
    }

    #[test]
    fn test_interrupt_is_distinct() {
        assert!(AdvisorError::Interrupted.is_interrupt());
        let err: AdvisorError = ConfigError::ParseError("bad".into()).into();
        assert!(!err.is_interrupt());
        assert!(matches!(err, AdvisorError::Config(_)));
    }
}
