//! Story reporter: renders each spec as an indented list of its phases.
//!
//! ```text
//!   | • gutter game
//!   |   • given a new game
//!   |   • when all gutter balls are rolled
//!   |   • then the score is zero
//! X | • perfect game
//!   |   • given a new game
//! X |   • then the score is 300 <----AssertionFailure: Expected 299 to equal 300.---->
//! . |       at demos/bowling_game.rs:88:9
//! ```
//!
//! The first column is the status: blank for success, `X` failure, `E` error, `S` skipped. Passing
//! stories print as soon as the spec completes; problem stories are held back and printed together
//! after the run, followed by the summary.

use std::io::Write;
use std::time::Duration;

use miette::Diagnostic;
use phasespec_core::PhaseKind;

use super::{Reporter, RunSummary, Stage};
use crate::outcome::OutcomeDetail;
use crate::result::{PhaseRecord, PhaseStatus, SpecResult, SpecStatus};

const PROBLEM_BANNER: &str = "******* Problem Scenarios *******";
const BULLET: &str = "•";
/// Durations below this are not worth printing.
const SLOW_THRESHOLD: Duration = Duration::from_millis(100);

pub struct StoryReporter<W: Write> {
    out: W,
    verbose: bool,
    show_output: bool,
    problems: Vec<String>,
}

impl<W: Write> StoryReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            verbose: false,
            show_output: false,
            problems: Vec::new(),
        }
    }

    /// Print every duration, not only the slow ones.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Print the text written by phases under each story.
    pub fn with_output(mut self, show_output: bool) -> Self {
        self.show_output = show_output;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render one spec as story text.
    pub fn render(&self, result: &SpecResult) -> String {
        let mut story = String::new();
        let errored = result.definition_error().is_some()
            || !result.errors().is_empty()
            || !result.assertion_errors().is_empty();
        let status = match result.status() {
            SpecStatus::Skipped => "S",
            _ if errored => "E",
            _ if !result.failures().is_empty() => "X",
            _ => "",
        };
        story.push_str(&self.line(status, 0, result.spec_name(), result.duration(), None));

        for record in result.timeline() {
            story.push_str(&self.record_line(record));
        }

        if let Some(error) = result.definition_error() {
            if let Some(help) = error.help() {
                story.push_str(&format!(". |{}help: {help}\n", indent(2)));
            }
        }

        if (self.show_output || self.verbose) && !result.output().is_empty() {
            for line in result.output().lines() {
                story.push_str(&format!("> |{}{line}\n", indent(2)));
            }
        }
        story
    }

    fn record_line(&self, record: &PhaseRecord) -> String {
        let name = match record.stage {
            Stage::Meta => record.description.clone(),
            Stage::Phase(kind) => format!("{kind} {}", record.description),
        };
        match &record.status {
            PhaseStatus::Passed => self.line("", 1, &name, record.duration, None),
            PhaseStatus::Failed(detail) => self.line("X", 1, &name, record.duration, Some(detail)),
            PhaseStatus::Errored(detail) => self.line("E", 1, &name, record.duration, Some(detail)),
            PhaseStatus::Skipped => self.line("S", 1, &format!("{name} (skipped)"), Duration::ZERO, None),
        }
    }

    fn line(&self, status: &str, level: usize, name: &str, duration: Duration, detail: Option<&OutcomeDetail>) -> String {
        let mut text = format!("{status:2}|{} {BULLET} {name}", indent(level));
        if let Some(detail) = detail {
            text.push_str(&format!(" <----{detail}---->"));
        }
        if duration >= SLOW_THRESHOLD || (self.verbose && level > 0 && !duration.is_zero()) {
            text.push_str(&format!(" (* {:.2} seconds *)", duration.as_secs_f64()));
        }
        text.push('\n');
        if let Some(detail) = detail {
            for trace in &detail.trace {
                text.push_str(&format!(". |{}{trace}\n", indent(level + 2)));
            }
        }
        text
    }

    fn write(&mut self, text: &str) {
        if let Err(err) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::warn!(%err, "story reporter could not write");
        }
    }
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

impl<W: Write> Reporter for StoryReporter<W> {
    fn success(&mut self, _spec: &str, _kind: PhaseKind, _description: &str) {}

    fn assertion_failure(&mut self, _spec: &str, _description: &str, _detail: &OutcomeDetail) {}

    fn error(&mut self, _spec: &str, _stage: Stage, _description: &str, _detail: &OutcomeDetail) {}

    fn on_spec_complete(&mut self, result: &SpecResult) {
        let story = self.render(result);
        if result.passed() {
            self.write(&story);
        } else {
            self.problems.push(story);
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        let mut text = String::new();
        if !self.problems.is_empty() {
            text.push_str(&format!("\n{PROBLEM_BANNER}\n\n"));
            for story in self.problems.drain(..) {
                text.push_str(&story);
                text.push('\n');
            }
        }
        text.push_str(&format!("\n{summary}\n"));
        self.write(&text);
    }
}
