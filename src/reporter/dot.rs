//! Compact progress reporter: one character per assertion or problem.
//!
//! `.` passed assertion, `X` failed assertion, `E` error in any phase, `S` skipped. Details of the
//! problem specs are printed after the run, followed by the run summary.

use std::io::Write;

use phasespec_core::PhaseKind;

use super::{Reporter, RunSummary, Stage};
use crate::outcome::OutcomeDetail;
use crate::result::{PhaseStatus, SpecResult};

const RULE: &str = "----------------------------------------------------------------------";

pub struct DotReporter<W: Write> {
    out: W,
    color: bool,
    show_output: bool,
    problems: Vec<SpecResult>,
}

impl<W: Write> DotReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: false,
            show_output: false,
            problems: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Include the text written by phases in the problem details.
    pub fn with_output(mut self, show_output: bool) -> Self {
        self.show_output = show_output;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn mark(&mut self, symbol: &str, ansi: &str) {
        let written = if self.color {
            write!(self.out, "\x1b[{ansi}m{symbol}\x1b[0m")
        } else {
            write!(self.out, "{symbol}")
        };
        if let Err(err) = written.and_then(|()| self.out.flush()) {
            tracing::warn!(%err, "dot reporter could not write progress");
        }
    }

    fn write_problem(&mut self, result: &SpecResult) -> std::io::Result<()> {
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "{}", result.spec_name())?;
        for record in result.timeline() {
            let (label, detail) = match &record.status {
                PhaseStatus::Failed(detail) => ("FAIL", detail),
                PhaseStatus::Errored(detail) => ("ERROR", detail),
                PhaseStatus::Passed | PhaseStatus::Skipped => continue,
            };
            writeln!(self.out, "  {label}: {} {}", record.stage, record.description)?;
            writeln!(self.out, "    {detail}")?;
            for line in &detail.trace {
                writeln!(self.out, "    {line}")?;
            }
        }
        if self.show_output && !result.output().is_empty() {
            writeln!(self.out, "  output:")?;
            for line in result.output().lines() {
                writeln!(self.out, "    {line}")?;
            }
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> std::io::Result<()> {
        writeln!(self.out)?;
        let problems = std::mem::take(&mut self.problems);
        for result in &problems {
            self.write_problem(result)?;
        }
        if !problems.is_empty() {
            writeln!(self.out, "{RULE}")?;
        }
        writeln!(self.out, "{summary}")?;
        self.out.flush()
    }
}

impl<W: Write> Reporter for DotReporter<W> {
    fn success(&mut self, _spec: &str, kind: PhaseKind, _description: &str) {
        if kind.is_assertion() {
            self.mark(".", "32");
        }
    }

    fn assertion_failure(&mut self, _spec: &str, _description: &str, _detail: &OutcomeDetail) {
        self.mark("X", "31");
    }

    fn error(&mut self, _spec: &str, _stage: Stage, _description: &str, _detail: &OutcomeDetail) {
        self.mark("E", "31");
    }

    fn skipped(&mut self, _spec: &str, _stage: Stage, _description: &str) {
        self.mark("S", "33");
    }

    fn on_spec_complete(&mut self, result: &SpecResult) {
        if !result.passed() {
            self.problems.push(result.clone());
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if let Err(err) = self.write_summary(summary) {
            tracing::warn!(%err, "dot reporter could not write summary");
        }
    }
}
