//! Scripted [`CommandRunner`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::runner::{CommandOutput, CommandRunner};
use crate::errors::GitError;

/// Replays canned output keyed by the space-joined argument list.
///
/// Unscripted commands behave like git rejecting them (exit 128).
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    script: Mutex<HashMap<String, Vec<CommandOutput>>>,
    calls: Mutex<Vec<String>>,
    binary_missing: bool,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every command fail to spawn, as if `git` were not installed.
    pub(crate) fn without_binary(mut self) -> Self {
        self.binary_missing = true;
        self
    }

    /// Queue a successful response for `command`.
    pub(crate) fn ok(self, command: &str, stdout: &str) -> Self {
        self.respond(command, stdout, "", 0)
    }

    /// Queue a failing response for `command`.
    pub(crate) fn fail(self, command: &str, exit_code: i32, stderr: &str) -> Self {
        self.respond(command, "", stderr, exit_code)
    }

    /// Queue an arbitrary response. Responses for one command are replayed
    /// in order; the last one repeats.
    pub(crate) fn respond(self, command: &str, stdout: &str, stderr: &str, exit_code: i32) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push(CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code,
            });
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let key = args.join(" ");
        self.calls.lock().unwrap().push(key.clone());
        if self.binary_missing {
            return Err(GitError::BinaryNotFound("git".into()));
        }
        let mut script = self.script.lock().unwrap();
        match script.get_mut(&key) {
            Some(queue) if queue.len() > 1 => Ok(queue.remove(0)),
            Some(queue) if !queue.is_empty() => Ok(queue[0].clone()),
            _ => Ok(CommandOutput {
                stdout: String::new(),
                stderr: format!("unscripted command: git {key}"),
                exit_code: 128,
            }),
        }
    }
}
