//! The cherry-pick advisory run.
//!
//! The [`Advisor`] orchestrates one pass:
//!
//! 1. Make sure the other project is registered as a remote and fetched.
//! 2. Collect its commits inside the lookback window.
//! 3. Drop automation commits.
//! 4. For each remaining commit, in traversal order: classify its changes,
//!    resolve the PR link, optionally simulate the cherry-pick and capture
//!    the diff, then hand the entry to the [`ReportSink`].
//!
//! Only steps 1 and 2 can abort a run. Faults while building an entry are
//! recorded on that entry and the loop moves on.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::config::AdvisorConfig;
use crate::conflict::{CompatibilityOracle, MergeStrategy};
use crate::errors::{AdvisorError, ConfigError};
use crate::filter::AuthorFilter;
use crate::git::{ChangeSetInspector, CommandRunner, CommitWindowCollector, RemoteRegistry};
use crate::models::{Commit, Project, ReportEntry, RunContext, RunSummary};
use crate::pr::resolve_pr_url;
use crate::report::ReportSink;
use crate::signals::{is_shutdown_requested, new_shutdown_flag, ShutdownFlag};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Everything that parameterises a run, after config and flags are merged.
#[derive(Debug, Clone)]
pub struct AdvisorOptions {
    /// Project whose history is analysed. Also the remote name.
    pub target: Project,
    pub remote_url: String,
    pub branch: String,
    /// Reference candidates are merged onto.
    pub tip: String,
    pub lookback_days: u32,
    pub check_compatibility: bool,
    pub show_diffs: bool,
    pub strategy: MergeStrategy,
}

impl AdvisorOptions {
    /// Default options for maintainers of `ours`.
    pub fn for_project(ours: Project) -> Self {
        let target = ours.other();
        Self {
            target,
            remote_url: target.remote_url(),
            branch: "main".into(),
            tip: "HEAD".into(),
            lookback_days: 7,
            check_compatibility: true,
            show_diffs: false,
            strategy: MergeStrategy::default(),
        }
    }

    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self {
            target: config.target(),
            remote_url: config.remote_url(),
            branch: config.analysis.branch.clone(),
            tip: config.analysis.tip.clone(),
            lookback_days: config.analysis.lookback_days,
            check_compatibility: config.analysis.check_compatibility,
            show_diffs: config.analysis.show_diffs,
            strategy: config.merge.strategy,
        }
    }

    pub fn remote_name(&self) -> &'static str {
        self.target.as_str()
    }

    /// Remote-tracking reference to window, e.g. `bluefin/main`.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.remote_name(), self.branch)
    }
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

/// Runs advisory passes against one repository.
pub struct Advisor<R> {
    runner: R,
    options: AdvisorOptions,
    filter: AuthorFilter,
    shutdown: ShutdownFlag,
}

impl<R: CommandRunner> Advisor<R> {
    /// Create an advisor with the default automation filter and a shutdown
    /// flag nothing will ever raise.
    pub fn new(runner: R, options: AdvisorOptions) -> Self {
        Self {
            runner,
            options,
            filter: AuthorFilter::default(),
            shutdown: new_shutdown_flag(),
        }
    }

    pub fn with_filter(mut self, filter: AuthorFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Observe `flag` between commits.
    pub fn with_shutdown_flag(mut self, flag: ShutdownFlag) -> Self {
        self.shutdown = flag;
        self
    }

    pub fn options(&self) -> &AdvisorOptions {
        &self.options
    }

    /// Run one pass with the window ending now.
    pub async fn run<S: ReportSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<RunSummary, AdvisorError> {
        self.run_at(sink, Utc::now()).await
    }

    /// Run one pass with the window ending at `now`.
    ///
    /// Returns the summary also given to the sink. A fatal fault raised
    /// after a shutdown request is reported as [`AdvisorError::Interrupted`].
    #[instrument(skip(self, sink), fields(target = %self.options.target))]
    pub async fn run_at<S: ReportSink + ?Sized>(
        &self,
        sink: &mut S,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, AdvisorError> {
        match self.run_inner(sink, now).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                sink.abort();
                if !e.is_interrupt() && self.interrupted() {
                    debug!(error = %e, "fault after shutdown request");
                    return Err(AdvisorError::Interrupted);
                }
                Err(e)
            }
        }
    }

    async fn run_inner<S: ReportSink + ?Sized>(
        &self,
        sink: &mut S,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, AdvisorError> {
        let options = &self.options;
        let remote_name = options.remote_name();

        let remote = RemoteRegistry::new(&self.runner)
            .establish(remote_name, &options.remote_url)
            .await
            .map_err(|source| AdvisorError::Setup {
                remote: remote_name.to_string(),
                source,
            })?;

        let reference = options.reference();
        let cutoff = window_start(now, options.lookback_days)?;
        let commits = CommitWindowCollector::new(&self.runner)
            .collect_since(&reference, cutoff)
            .await
            .map_err(|source| AdvisorError::Collection {
                reference: reference.clone(),
                source,
            })?;

        let total_commits = commits.len();
        let (commits, excluded_commits) = self.filter.partition(commits);
        info!(
            total = total_commits,
            excluded = excluded_commits,
            candidates = commits.len(),
            "commit window collected"
        );

        sink.begin(&RunContext {
            target: options.target,
            remote,
            reference,
            lookback_days: options.lookback_days,
            total_commits,
            excluded_commits,
        })?;

        let inspector = ChangeSetInspector::new(&self.runner);
        let oracle = CompatibilityOracle::new(&self.runner, options.strategy);
        let mut reported = 0;

        for (i, commit) in commits.into_iter().enumerate() {
            if self.interrupted() {
                warn!(processed = reported, "shutdown requested, stopping");
                return Err(AdvisorError::Interrupted);
            }
            let entry = self.build_entry(i + 1, commit, &inspector, &oracle).await;
            sink.entry(&entry)?;
            reported += 1;
        }
        if self.interrupted() {
            warn!(processed = reported, "shutdown requested, skipping summary");
            return Err(AdvisorError::Interrupted);
        }

        let summary = RunSummary {
            total_commits,
            excluded_commits,
            reported,
        };
        sink.finish(&summary)?;
        Ok(summary)
    }

    #[instrument(skip_all, fields(commit = %commit.short_hash()))]
    async fn build_entry(
        &self,
        index: usize,
        commit: Commit,
        inspector: &ChangeSetInspector<'_, R>,
        oracle: &CompatibilityOracle<'_, R>,
    ) -> ReportEntry {
        let changes = inspector.inspect(&commit.hash).await;
        let pr_url = resolve_pr_url(&commit.subject, self.options.target);

        let verdict = if self.options.check_compatibility {
            Some(oracle.evaluate(&commit.hash, &self.options.tip).await)
        } else {
            None
        };
        let diff = if self.options.show_diffs {
            Some(inspector.diff(&commit.hash).await)
        } else {
            None
        };

        ReportEntry {
            index,
            commit,
            changes: changes.files,
            change_diagnostic: changes.diagnostic,
            pr_url,
            verdict,
            diff,
        }
    }

    fn interrupted(&self) -> bool {
        is_shutdown_requested(&self.shutdown)
    }
}

/// Start of the lookback window ending at `now`.
fn window_start(now: DateTime<Utc>, lookback_days: u32) -> Result<DateTime<Utc>, ConfigError> {
    now.checked_sub_signed(Duration::days(i64::from(lookback_days)))
        .ok_or_else(|| ConfigError::InvalidValue {
            field: "analysis.lookback_days".into(),
            detail: format!("a {lookback_days}-day window reaches before the earliest date"),
        })
}
