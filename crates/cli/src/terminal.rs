//! Human-readable report: one table per candidate commit.

use std::io::Write;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use cherryscout_core::errors::AdvisorError;
use cherryscout_core::models::{
    CompatibilityVerdict, DiffText, FileChange, ReportEntry, RunContext, RunSummary,
    VerdictMethod,
};
use cherryscout_core::report::ReportSink;

use crate::style::Painter;

/// Above this many candidates a progress bar is shown.
const PROGRESS_THRESHOLD: usize = 3;

/// Renders entries as tables, with an optional progress bar on stderr.
pub struct TerminalSink<W: Write> {
    out: W,
    painter: Painter,
    max_files: usize,
    show_progress: bool,
    progress: Option<ProgressBar>,
    candidates: usize,
    applicable: usize,
    conflicting: usize,
    unverified: usize,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, painter: Painter, max_files: usize) -> Self {
        Self {
            out,
            painter,
            max_files: max_files.max(1),
            show_progress: true,
            progress: None,
            candidates: 0,
            applicable: 0,
            conflicting: 0,
            unverified: 0,
        }
    }

    /// Never draw a progress bar, e.g. when stdout is captured.
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write `text`, hiding the progress bar while doing so.
    fn emit(&mut self, text: &str) -> Result<(), AdvisorError> {
        let out = &mut self.out;
        let result = match &self.progress {
            Some(pb) => pb.suspend(|| writeln!(out, "{text}")),
            None => writeln!(out, "{text}"),
        };
        result.map_err(|e| AdvisorError::Report(e.to_string()))
    }

    fn start_progress(&mut self, len: usize) {
        let pb = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} [{bar:30}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress = Some(pb);
    }

    fn render_entry(&self, entry: &ReportEntry) -> String {
        let p = &self.painter;
        let commit = &entry.commit;
        let mut text = String::new();

        text.push_str(&format!(
            "{} {} {}\n",
            p.dim(&format!("[{}/{}]", entry.index, self.candidates)),
            p.hash(commit.short_hash()),
            p.header(&commit.subject)
        ));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if !p.color() {
            table.force_no_tty();
        }
        table.add_row(vec![Cell::new("Commit"), Cell::new(&commit.hash)]);
        table.add_row(vec![Cell::new("Author"), Cell::new(&commit.author)]);
        table.add_row(vec![
            Cell::new("Date"),
            Cell::new(commit.authored_at.format("%Y-%m-%d %H:%M %z").to_string()),
        ]);
        if let Some(url) = &entry.pr_url {
            table.add_row(vec![Cell::new("PR"), Cell::new(url)]);
        }
        table.add_row(vec![
            Cell::new(format!("Files ({})", entry.changes.len())),
            Cell::new(self.file_list(entry)),
        ]);
        text.push_str(&table.to_string());
        text.push('\n');

        if let Some(verdict) = &entry.verdict {
            text.push_str(&self.verdict_line(verdict));
            text.push('\n');
        }
        text.push_str(&format!(
            "  {} {}\n",
            p.dim("cherry-pick:"),
            p.command(&entry.cherry_pick_command())
        ));

        match &entry.diff {
            Some(DiffText::Patch(patch)) if !patch.is_empty() => {
                text.push_str(&format!("\n{}\n", p.header("Diff")));
                for line in patch.lines() {
                    text.push_str(&p.diff_line(line));
                    text.push('\n');
                }
            }
            Some(DiffText::Patch(_)) => {
                text.push_str(&format!("  {}\n", p.dim("(empty diff)")));
            }
            Some(DiffText::Unavailable(why)) => {
                text.push_str(&format!("  {}\n", p.warn(&format!("diff unavailable: {why}"))));
            }
            None => {}
        }
        text
    }

    fn file_list(&self, entry: &ReportEntry) -> String {
        if entry.changes.is_empty() {
            return match &entry.change_diagnostic {
                Some(why) => format!("(could not list files: {why})"),
                None => "(no file changes)".to_string(),
            };
        }
        let mut lines: Vec<String> = entry
            .changes
            .iter()
            .take(self.max_files)
            .map(describe_change)
            .collect();
        let hidden = entry.changes.len().saturating_sub(self.max_files);
        if hidden > 0 {
            lines.push(format!("... and {hidden} more"));
        }
        lines.join("\n")
    }

    fn verdict_line(&self, verdict: &CompatibilityVerdict) -> String {
        let p = &self.painter;
        match verdict.method() {
            VerdictMethod::Unknown => format!(
                "  {}",
                p.warn(&format!(
                    "could not verify: {}",
                    verdict.diagnostic().unwrap_or("merge simulation failed")
                ))
            ),
            VerdictMethod::Simulated if verdict.applicable() => {
                format!("  {}", p.success("applies cleanly"))
            }
            VerdictMethod::Simulated => {
                let paths: Vec<&str> = verdict
                    .conflicting_paths()
                    .iter()
                    .map(String::as_str)
                    .collect();
                format!(
                    "  {}",
                    p.error(&format!("conflicts expected in: {}", paths.join(", ")))
                )
            }
        }
    }
}

fn describe_change(change: &FileChange) -> String {
    match &change.previous_path {
        Some(from) => format!("{:<9} {} -> {}", change.change_kind.as_str(), from, change.path),
        None => format!("{:<9} {}", change.change_kind.as_str(), change.path),
    }
}

impl<W: Write> ReportSink for TerminalSink<W> {
    fn begin(&mut self, context: &RunContext) -> Result<(), AdvisorError> {
        self.candidates = context.total_commits - context.excluded_commits;
        let p = self.painter;

        let mut text = format!(
            "\n{}\n",
            p.header(&format!(
                "Commits on {} from the last {} day(s)",
                context.reference, context.lookback_days
            ))
        );
        text.push_str(&p.dim(&format!(
            "{} found, {} from automation accounts skipped",
            context.total_commits, context.excluded_commits
        )));
        text.push('\n');
        if self.candidates == 0 {
            text.push('\n');
            text.push_str(&p.success("Nothing to review"));
        }
        self.emit(&text)?;

        if self.show_progress && self.candidates > PROGRESS_THRESHOLD {
            self.start_progress(self.candidates);
        }
        Ok(())
    }

    fn entry(&mut self, entry: &ReportEntry) -> Result<(), AdvisorError> {
        match &entry.verdict {
            Some(v) if v.applicable() => self.applicable += 1,
            Some(v) if v.method() == VerdictMethod::Unknown => self.unverified += 1,
            Some(_) => self.conflicting += 1,
            None => {}
        }
        let text = self.render_entry(entry);
        self.emit(&text)?;
        if let Some(pb) = &self.progress {
            pb.set_message(entry.commit.short_hash().to_string());
            pb.inc(1);
        }
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), AdvisorError> {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
        if summary.reported == 0 {
            return Ok(());
        }
        let p = self.painter;
        let mut text = format!(
            "{}\n",
            p.header(&format!(
                "{} commit(s) reported ({} automation skipped)",
                summary.reported, summary.excluded_commits
            ))
        );
        if self.applicable + self.conflicting + self.unverified > 0 {
            text.push_str(&format!(
                "  {}  {}  {}\n",
                p.success(&format!("{} clean", self.applicable)),
                p.error(&format!("{} conflicting", self.conflicting)),
                p.warn(&format!("{} unverified", self.unverified))
            ));
        }
        self.emit(&text)
    }

    fn abort(&mut self) {
        if let Some(pb) = self.progress.take() {
            pb.abandon();
        }
    }
}
