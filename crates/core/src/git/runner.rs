//! Process execution capability for git commands.
//!
//! Every git-facing component takes a [`CommandRunner`] instead of spawning
//! processes itself, so unit tests can substitute scripted transcripts.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::GitError;

/// Captured result of one process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Return stdout, or a [`GitError::CommandFailed`] for a non-zero exit.
    pub fn into_success(self, args: &[&str]) -> Result<String, GitError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(GitError::CommandFailed {
                command: args.join(" "),
                exit_code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs a git command given its argument list.
///
/// Implementations return `Ok` for every process that ran, whatever its exit
/// status; `Err` means the process could not be started at all.
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[&str]) -> impl Future<Output = Result<CommandOutput, GitError>> + Send;
}

/// Runs the real `git` binary against one repository.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_path: PathBuf,
}

impl GitCli {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

impl CommandRunner for GitCli {
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(cmd = ?format!("git {}", args.join(" ")), "running git command");
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::BinaryNotFound("git".into())
            } else {
                GitError::Io(e)
            }
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if exit_code != 0 {
            warn!(exit_code, stderr = %stderr.trim(), "git command exited non-zero");
        }
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr,
            exit_code,
        })
    }
}
