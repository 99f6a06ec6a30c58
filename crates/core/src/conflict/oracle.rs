//! Cherry-pick compatibility prediction.
//!
//! Simulates the three-way merge a `git cherry-pick` would perform
//! (base = the commit's parent, ours = the current tip, theirs = the commit)
//! entirely in the object database and reports whether it would conflict.
//!
//! Whenever the simulation cannot be carried out the verdict is
//! "not applicable" with [`VerdictMethod::Unknown`](crate::models::VerdictMethod):
//! a human checks every candidate before picking it, and an unnecessary
//! manual check is cheaper than a surprise conflict.

use tracing::{debug, info, instrument, warn};

use super::scanner::{ConflictScanner, MergeStrategy};
use crate::git::history::is_object_id;
use crate::git::CommandRunner;
use crate::models::CompatibilityVerdict;

/// Predicts whether commits would cherry-pick cleanly onto a tip.
///
/// Holds no state between calls; identical inputs against an unchanged
/// repository always produce identical verdicts.
pub struct CompatibilityOracle<'a, R> {
    runner: &'a R,
    scanner: Box<dyn ConflictScanner>,
}

impl<'a, R: CommandRunner> CompatibilityOracle<'a, R> {
    pub fn new(runner: &'a R, strategy: MergeStrategy) -> Self {
        Self::with_scanner(runner, strategy.scanner())
    }

    pub fn with_scanner(runner: &'a R, scanner: Box<dyn ConflictScanner>) -> Self {
        Self { runner, scanner }
    }

    /// Predict the outcome of cherry-picking `hash` onto `tip`.
    ///
    /// Single attempt, no retry. Never fails; problems become an unknown
    /// verdict carrying the diagnostic.
    #[instrument(skip(self))]
    pub async fn evaluate(&self, hash: &str, tip: &str) -> CompatibilityVerdict {
        let parent = match self.resolve_parent(hash).await {
            Ok(parent) => parent,
            Err(diagnostic) => {
                warn!(%diagnostic, "could not resolve parent");
                return CompatibilityVerdict::unknown(diagnostic);
            }
        };
        debug!(%parent, "resolved parent");

        let args = self.scanner.simulation_args(&parent, tip, hash);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = match self.runner.run(&args).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "merge simulation did not run");
                return CompatibilityVerdict::unknown(e.to_string());
            }
        };

        match self.scanner.conflicts(&output) {
            Ok(paths) => {
                info!(conflicts = paths.len(), "merge simulated");
                CompatibilityVerdict::from_conflicts(paths)
            }
            Err(diagnostic) => {
                warn!(%diagnostic, "merge simulation failed");
                CompatibilityVerdict::unknown(diagnostic)
            }
        }
    }

    /// First parent of `hash`. A root commit has none and is an error.
    async fn resolve_parent(&self, hash: &str) -> Result<String, String> {
        let rev = format!("{hash}^");
        let args = ["rev-parse", "--verify", rev.as_str()];
        let stdout = self
            .runner
            .run(&args)
            .await
            .and_then(|output| output.into_success(&args))
            .map_err(|e| e.to_string())?;
        let parent = stdout.trim();
        if !is_object_id(parent) {
            return Err(format!("unexpected parent id '{parent}' for {hash}"));
        }
        Ok(parent.to_string())
    }
}
