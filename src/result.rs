//! Per-spec results.
//!
//! A [`SpecResult`] is assembled by the executor through a crate-private [`ResultRecorder`] and is
//! immutable once handed out.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use phasespec_core::PhaseKind;

use crate::collector::SpecDefinitionError;
use crate::outcome::OutcomeDetail;
use crate::reporter::Stage;

/// Overall state of an executed spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecStatus {
    /// Every planned phase was attempted (some may have failed).
    Completed,
    /// A non-assertion phase faulted and the remaining phases were abandoned.
    Broken,
    /// The definition was rejected before any phase ran.
    Unimplemented,
    /// The whole spec was marked skipped.
    Skipped,
}

/// How one recorded phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseStatus {
    Passed,
    Failed(OutcomeDetail),
    Errored(OutcomeDetail),
    Skipped,
}

/// One entry of a spec's timeline, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRecord {
    pub stage: Stage,
    pub description: String,
    pub status: PhaseStatus,
    pub duration: Duration,
}

/// An assertion or phase that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseFailure {
    pub description: String,
    pub detail: OutcomeDetail,
}

/// Everything known about one spec execution.
#[derive(Debug, Clone)]
pub struct SpecResult {
    spec_name: String,
    status: SpecStatus,
    phase_names: BTreeMap<PhaseKind, String>,
    assertions: Vec<String>,
    failures: Vec<PhaseFailure>,
    assertion_errors: Vec<PhaseFailure>,
    errors: BTreeMap<PhaseKind, PhaseFailure>,
    definition_error: Option<SpecDefinitionError>,
    timeline: Vec<PhaseRecord>,
    output: String,
    started: Instant,
    finished: Instant,
}

impl SpecResult {
    pub fn spec_name(&self) -> &str {
        &self.spec_name
    }

    pub fn status(&self) -> SpecStatus {
        self.status
    }

    /// True when nothing failed or errored and the definition was accepted.
    ///
    /// A skipped spec counts as passed.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
            && self.assertion_errors.is_empty()
            && self.errors.is_empty()
            && self.definition_error.is_none()
    }

    /// Description of an executed non-assertion phase.
    pub fn phase_name(&self, kind: PhaseKind) -> Option<&str> {
        self.phase_names.get(&kind).map(String::as_str)
    }

    /// Descriptions of the assertions that succeeded, in execution order.
    pub fn assertions(&self) -> &[String] {
        &self.assertions
    }

    /// Assertions whose expectation was not met.
    pub fn failures(&self) -> &[PhaseFailure] {
        &self.failures
    }

    /// Assertions that faulted instead of passing or failing.
    pub fn assertion_errors(&self) -> &[PhaseFailure] {
        &self.assertion_errors
    }

    /// Faults of non-assertion phases, keyed by kind.
    pub fn errors(&self) -> &BTreeMap<PhaseKind, PhaseFailure> {
        &self.errors
    }

    pub fn error_for(&self, kind: PhaseKind) -> Option<&PhaseFailure> {
        self.errors.get(&kind)
    }

    pub fn definition_error(&self) -> Option<&SpecDefinitionError> {
        self.definition_error.as_ref()
    }

    pub fn timeline(&self) -> &[PhaseRecord] {
        &self.timeline
    }

    /// Text written by the phases to their [`Output`](crate::Output).
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn duration(&self) -> Duration {
        self.finished.saturating_duration_since(self.started)
    }

    /// Number of phases that actually ran, plus one for a rejected definition.
    pub fn steps(&self) -> usize {
        self.timeline
            .iter()
            .filter(|r| !matches!(r.status, PhaseStatus::Skipped))
            .count()
    }
}

/// Mutable side of a [`SpecResult`], owned by the executor while a spec runs.
pub(crate) struct ResultRecorder {
    result: SpecResult,
}

impl ResultRecorder {
    pub(crate) fn start(spec_name: &str) -> Self {
        let now = Instant::now();
        Self {
            result: SpecResult {
                spec_name: spec_name.to_string(),
                status: SpecStatus::Completed,
                phase_names: BTreeMap::new(),
                assertions: Vec::new(),
                failures: Vec::new(),
                assertion_errors: Vec::new(),
                errors: BTreeMap::new(),
                definition_error: None,
                timeline: Vec::new(),
                output: String::new(),
                started: now,
                finished: now,
            },
        }
    }

    pub(crate) fn passed(&mut self, kind: PhaseKind, description: &str, duration: Duration) {
        if kind.is_assertion() {
            self.result.assertions.push(description.to_string());
        } else {
            self.name_phase(kind, description);
        }
        self.push(Stage::Phase(kind), description, PhaseStatus::Passed, duration);
    }

    pub(crate) fn assertion_failed(&mut self, description: &str, detail: OutcomeDetail, duration: Duration) {
        self.result.failures.push(PhaseFailure {
            description: description.to_string(),
            detail: detail.clone(),
        });
        self.push(Stage::Phase(PhaseKind::Assert), description, PhaseStatus::Failed(detail), duration);
    }

    pub(crate) fn faulted(&mut self, kind: PhaseKind, description: &str, detail: OutcomeDetail, duration: Duration) {
        let failure = PhaseFailure {
            description: description.to_string(),
            detail: detail.clone(),
        };
        if kind.is_assertion() {
            self.result.assertion_errors.push(failure);
        } else {
            self.name_phase(kind, description);
            self.result.errors.insert(kind, failure);
            if !kind.is_cleanup() {
                self.result.status = SpecStatus::Broken;
            }
        }
        self.push(Stage::Phase(kind), description, PhaseStatus::Errored(detail), duration);
    }

    pub(crate) fn skipped(&mut self, stage: Stage, description: &str) {
        self.push(stage, description, PhaseStatus::Skipped, Duration::ZERO);
    }

    pub(crate) fn skip_spec(&mut self) {
        self.result.status = SpecStatus::Skipped;
    }

    pub(crate) fn rejected(&mut self, error: SpecDefinitionError, description: &str) {
        let detail = error.detail();
        self.result.status = SpecStatus::Unimplemented;
        self.result.definition_error = Some(error);
        self.push(Stage::Meta, description, PhaseStatus::Errored(detail), Duration::ZERO);
    }

    pub(crate) fn append_output(&mut self, text: &str) {
        self.result.output.push_str(text);
    }

    pub(crate) fn finish(mut self) -> SpecResult {
        self.result.finished = Instant::now();
        self.result
    }

    fn name_phase(&mut self, kind: PhaseKind, description: &str) {
        self.result.phase_names.insert(kind, description.to_string());
    }

    fn push(&mut self, stage: Stage, description: &str, status: PhaseStatus, duration: Duration) {
        self.result.timeline.push(PhaseRecord {
            stage,
            description: description.to_string(),
            status,
            duration,
        });
    }
}
