//! Reporters: observers of phase events.
//!
//! The executor calls exactly one of [`Reporter::success`], [`Reporter::assertion_failure`],
//! [`Reporter::error`] or [`Reporter::skipped`] per phase it considers, in execution order. A spec
//! rejected at collection produces one `error` event with [`Stage::Meta`] and the description
//! `collect steps`. The lifecycle hooks (`on_*`) have empty default implementations.

mod dot;
mod json;
mod story;
mod summary;

use std::fmt;
use std::io::Write;

use phasespec_core::PhaseKind;

use crate::config::{ReporterKind, RunConfig};
use crate::outcome::OutcomeDetail;
use crate::result::SpecResult;

pub use dot::DotReporter;
pub use json::JsonReporter;
pub use story::StoryReporter;
pub use summary::RunSummary;

/// Description used for the synthetic event of a rejected definition.
pub const COLLECT_STEPS: &str = "collect steps";

/// Where an event originated: a declared phase, or the spec machinery itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Meta,
    Phase(PhaseKind),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Meta => f.write_str("spec"),
            Stage::Phase(kind) => f.write_str(kind.as_str()),
        }
    }
}

/// Receiver of phase events for a run.
pub trait Reporter {
    fn on_run_start(&mut self) {}

    fn on_spec_start(&mut self, _spec: &str) {}

    fn success(&mut self, spec: &str, kind: PhaseKind, description: &str);

    fn assertion_failure(&mut self, spec: &str, description: &str, detail: &OutcomeDetail);

    fn error(&mut self, spec: &str, stage: Stage, description: &str, detail: &OutcomeDetail);

    fn skipped(&mut self, _spec: &str, _stage: Stage, _description: &str) {}

    fn on_spec_complete(&mut self, _result: &SpecResult) {}

    fn on_run_complete(&mut self, _summary: &RunSummary) {}
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn on_run_start(&mut self) {
        (**self).on_run_start();
    }

    fn on_spec_start(&mut self, spec: &str) {
        (**self).on_spec_start(spec);
    }

    fn success(&mut self, spec: &str, kind: PhaseKind, description: &str) {
        (**self).success(spec, kind, description);
    }

    fn assertion_failure(&mut self, spec: &str, description: &str, detail: &OutcomeDetail) {
        (**self).assertion_failure(spec, description, detail);
    }

    fn error(&mut self, spec: &str, stage: Stage, description: &str, detail: &OutcomeDetail) {
        (**self).error(spec, stage, description, detail);
    }

    fn skipped(&mut self, spec: &str, stage: Stage, description: &str) {
        (**self).skipped(spec, stage, description);
    }

    fn on_spec_complete(&mut self, result: &SpecResult) {
        (**self).on_spec_complete(result);
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        (**self).on_run_complete(summary);
    }
}

/// A recorded phase event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEvent {
    Success {
        spec: String,
        kind: PhaseKind,
        description: String,
    },
    AssertionFailure {
        spec: String,
        description: String,
        detail: OutcomeDetail,
    },
    Error {
        spec: String,
        stage: Stage,
        description: String,
        detail: OutcomeDetail,
    },
    Skipped {
        spec: String,
        stage: Stage,
        description: String,
    },
}

impl PhaseEvent {
    pub fn spec(&self) -> &str {
        match self {
            PhaseEvent::Success { spec, .. }
            | PhaseEvent::AssertionFailure { spec, .. }
            | PhaseEvent::Error { spec, .. }
            | PhaseEvent::Skipped { spec, .. } => spec,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            PhaseEvent::Success { description, .. }
            | PhaseEvent::AssertionFailure { description, .. }
            | PhaseEvent::Error { description, .. }
            | PhaseEvent::Skipped { description, .. } => description,
        }
    }

    /// Compact one-line rendering, stable across runs (no timings, no traces).
    pub fn summary_line(&self) -> String {
        match self {
            PhaseEvent::Success { kind, description, .. } => format!("ok    {kind} {description}"),
            PhaseEvent::AssertionFailure {
                description, detail, ..
            } => format!("fail  then {description} :: {}", detail.message),
            PhaseEvent::Error {
                stage,
                description,
                detail,
                ..
            } => format!("error {stage} {description} :: {detail}"),
            PhaseEvent::Skipped { stage, description, .. } => format!("skip  {stage} {description}"),
        }
    }
}

/// Reporter that keeps every event, for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<PhaseEvent>,
    pub completed: Vec<SpecResult>,
    pub summary: Option<RunSummary>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events rendered with [`PhaseEvent::summary_line`], one per line.
    pub fn transcript(&self) -> String {
        self.events
            .iter()
            .map(PhaseEvent::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Reporter for RecordingReporter {
    fn success(&mut self, spec: &str, kind: PhaseKind, description: &str) {
        self.events.push(PhaseEvent::Success {
            spec: spec.to_string(),
            kind,
            description: description.to_string(),
        });
    }

    fn assertion_failure(&mut self, spec: &str, description: &str, detail: &OutcomeDetail) {
        self.events.push(PhaseEvent::AssertionFailure {
            spec: spec.to_string(),
            description: description.to_string(),
            detail: detail.clone(),
        });
    }

    fn error(&mut self, spec: &str, stage: Stage, description: &str, detail: &OutcomeDetail) {
        self.events.push(PhaseEvent::Error {
            spec: spec.to_string(),
            stage,
            description: description.to_string(),
            detail: detail.clone(),
        });
    }

    fn skipped(&mut self, spec: &str, stage: Stage, description: &str) {
        self.events.push(PhaseEvent::Skipped {
            spec: spec.to_string(),
            stage,
            description: description.to_string(),
        });
    }

    fn on_spec_complete(&mut self, result: &SpecResult) {
        self.completed.push(result.clone());
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}

/// Build the console reporter selected by `config`, writing to `out`.
pub fn for_config<W: Write + 'static>(config: &RunConfig, out: W) -> Box<dyn Reporter> {
    match config.reporter {
        ReporterKind::Dot => Box::new(
            DotReporter::new(out)
                .with_color(config.color)
                .with_output(config.show_output),
        ),
        ReporterKind::Story => Box::new(
            StoryReporter::new(out)
                .with_verbose(config.verbose)
                .with_output(config.show_output),
        ),
        ReporterKind::Json => Box::new(JsonReporter::new(out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Meta.to_string(), "spec");
        assert_eq!(Stage::Phase(PhaseKind::Cleanup).to_string(), "after");
    }

    #[test]
    fn test_recording_reporter_through_mut_ref() {
        fn feed(mut reporter: impl Reporter) {
            reporter.success("s", PhaseKind::Setup, "a thing");
            reporter.skipped("s", Stage::Phase(PhaseKind::Assert), "later");
        }
        let mut recorder = RecordingReporter::new();
        feed(&mut recorder);
        assert_eq!(recorder.transcript(), "ok    given a thing\nskip  then later");
        assert_eq!(recorder.events[0].spec(), "s");
        assert_eq!(recorder.events[1].description(), "later");
    }
}
