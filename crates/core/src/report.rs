//! Presentation seam between the advisor loop and its output.
//!
//! The advisor never formats anything itself. It hands a [`RunContext`]
//! once, each [`ReportEntry`] as soon as it is built, and a [`RunSummary`]
//! at the end. Sinks decide how (and whether) to render them.

use crate::errors::AdvisorError;
use crate::models::{ReportEntry, RunContext, RunSummary};

/// Receives the results of an advisory run in order.
pub trait ReportSink {
    /// Called once after the window is collected and filtered.
    fn begin(&mut self, context: &RunContext) -> Result<(), AdvisorError>;

    /// Called once per surviving commit, in traversal order.
    fn entry(&mut self, entry: &ReportEntry) -> Result<(), AdvisorError>;

    /// Called once after the last entry. Not called on interrupt.
    fn finish(&mut self, summary: &RunSummary) -> Result<(), AdvisorError>;

    /// Called instead of [`finish`](Self::finish) when the run is cut short,
    /// so progress output can be torn down.
    fn abort(&mut self) {}
}

/// Collects everything in memory. Handy for embedding and tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub context: Option<RunContext>,
    pub entries: Vec<ReportEntry>,
    pub summary: Option<RunSummary>,
    pub aborted: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for CollectingSink {
    fn begin(&mut self, context: &RunContext) -> Result<(), AdvisorError> {
        self.context = Some(context.clone());
        Ok(())
    }

    fn entry(&mut self, entry: &ReportEntry) -> Result<(), AdvisorError> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), AdvisorError> {
        self.summary = Some(summary.clone());
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}
