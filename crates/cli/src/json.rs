//! JSON-lines report for scripts: one object per line, tagged by `type`.

use std::io::Write;

use serde::Serialize;

use cherryscout_core::errors::AdvisorError;
use cherryscout_core::models::{ReportEntry, RunContext, RunSummary};
use cherryscout_core::report::ReportSink;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    Context(&'a RunContext),
    Entry(&'a ReportEntry),
    Summary(&'a RunSummary),
}

pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, record: Record<'_>) -> Result<(), AdvisorError> {
        serde_json::to_writer(&mut self.out, &record)
            .map_err(|e| AdvisorError::Report(e.to_string()))?;
        writeln!(self.out)
            .and_then(|()| self.out.flush())
            .map_err(|e| AdvisorError::Report(e.to_string()))
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn begin(&mut self, context: &RunContext) -> Result<(), AdvisorError> {
        self.write(Record::Context(context))
    }

    fn entry(&mut self, entry: &ReportEntry) -> Result<(), AdvisorError> {
        self.write(Record::Entry(entry))
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), AdvisorError> {
        self.write(Record::Summary(summary))
    }
}
