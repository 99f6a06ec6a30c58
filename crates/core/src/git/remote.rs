//! Tracking-remote registration and refresh.

use tracing::{debug, info, instrument};

use super::runner::CommandRunner;
use crate::errors::GitError;
use crate::models::Remote;

/// Keeps a named tracking remote configured and fetched.
///
/// Every operation is idempotent; it is safe (and expected) to call
/// [`RemoteRegistry::establish`] on every run.
pub struct RemoteRegistry<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> RemoteRegistry<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Whether a remote called `name` is configured.
    pub async fn has_remote(&self, name: &str) -> Result<bool, GitError> {
        let args = ["remote"];
        let stdout = self.runner.run(&args).await?.into_success(&args)?;
        Ok(stdout.lines().any(|line| line.trim() == name))
    }

    /// Add the remote unless one with that name already exists.
    ///
    /// Returns `true` when the remote was added by this call. An existing
    /// remote is left untouched, even if its URL differs.
    #[instrument(skip(self))]
    pub async fn ensure_remote(&self, name: &str, url: &str) -> Result<bool, GitError> {
        if self.has_remote(name).await? {
            debug!(remote = name, "remote already configured");
            return Ok(false);
        }
        let args = ["remote", "add", name, url];
        self.runner.run(&args).await?.into_success(&args)?;
        info!(remote = name, url, "added remote");
        Ok(true)
    }

    /// Fetch the remote's refs. Blocks until git finishes.
    #[instrument(skip(self))]
    pub async fn refresh(&self, name: &str) -> Result<(), GitError> {
        info!(remote = name, "fetching");
        let args = ["fetch", name];
        self.runner.run(&args).await?.into_success(&args)?;
        debug!(remote = name, "fetch completed");
        Ok(())
    }

    /// Ensure the remote exists and bring its refs up to date.
    pub async fn establish(&self, name: &str, url: &str) -> Result<Remote, GitError> {
        self.ensure_remote(name, url).await?;
        self.refresh(name).await?;
        Ok(Remote {
            name: name.to_string(),
            url: url.to_string(),
            fetched: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fake::ScriptedRunner;

    const URL: &str = "https://github.com/ublue-os/bluefin.git";

    #[tokio::test]
    async fn test_adds_missing_remote() {
        let runner = ScriptedRunner::new()
            .ok("remote", "origin\n")
            .ok(&format!("remote add bluefin {URL}"), "")
            .ok("fetch bluefin", "");
        let registry = RemoteRegistry::new(&runner);

        let remote = registry.establish("bluefin", URL).await.unwrap();
        assert!(remote.fetched);
        assert_eq!(remote.name, "bluefin");
        assert_eq!(
            runner.calls(),
            vec![
                "remote".to_string(),
                format!("remote add bluefin {URL}"),
                "fetch bluefin".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_existing_remote_is_noop() {
        let runner = ScriptedRunner::new().ok("remote", "origin\nbluefin\n");
        let registry = RemoteRegistry::new(&runner);

        assert!(!registry.ensure_remote("bluefin", URL).await.unwrap());
        assert!(!registry.ensure_remote("bluefin", URL).await.unwrap());
        assert_eq!(runner.count("remote add"), 0);
    }

    #[tokio::test]
    async fn test_name_match_is_exact() {
        let runner = ScriptedRunner::new()
            .ok("remote", "bluefin-lts\n")
            .ok(&format!("remote add bluefin {URL}"), "");
        let registry = RemoteRegistry::new(&runner);
        assert!(registry.ensure_remote("bluefin", URL).await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_error() {
        let runner = ScriptedRunner::new()
            .ok("remote", "bluefin\n")
            .fail("fetch bluefin", 128, "fatal: unable to access");
        let registry = RemoteRegistry::new(&runner);

        let err = registry.establish("bluefin", URL).await.unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { exit_code: 128, .. }));
    }
}
