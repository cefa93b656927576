//! Spec executor: runs one collected spec and reports every phase.
//!
//! Execution is a small state machine over the plan produced by the collector:
//!
//! ```text
//! Running(i) --success / assert outcome--> Running(i + 1) or Done
//! Running(i) --fault in setup/action/collect--> Running(cleanup) or Done
//! Running(cleanup) --any outcome--> Done
//! ```
//!
//! Assertion phases never stop the run: every assertion executes even when earlier ones failed or
//! faulted. A fault anywhere else abandons the remaining work but still runs cleanup.

use std::time::Instant;

use crate::capture::Output;
use crate::collector::{Collection, PhasePlan, PlannedPhase, collect};
use crate::definition::{SpecDefinition, SpecInstance};
use crate::outcome::{Interrupted, Outcome, discard, invoke};
use crate::reporter::{COLLECT_STEPS, Reporter, Stage};
use crate::result::{ResultRecorder, SpecResult};
use crate::runner::InterruptFlag;

/// Description of the event emitted for a skipped spec.
pub const SKIPPED_SPEC: &str = "skipped spec";

/// Position of the executor within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Running(usize),
    Done,
}

/// Where to go after the step at `position` ended with `outcome`.
pub fn next_state(plan: &PhasePlan, position: usize, outcome: &Outcome) -> ExecState {
    let Some(step) = plan.get(position) else {
        return ExecState::Done;
    };
    if step.kind.is_cleanup() {
        return ExecState::Done;
    }
    if !outcome.is_success() && !step.kind.is_assertion() {
        return plan.cleanup_position().map_or(ExecState::Done, ExecState::Running);
    }
    if position + 1 < plan.len() {
        ExecState::Running(position + 1)
    } else {
        ExecState::Done
    }
}

/// Executes specs one at a time, reporting to a borrowed [`Reporter`].
pub struct SpecExecutor<'r> {
    reporter: &'r mut dyn Reporter,
    backtraces: bool,
    interrupt: Option<InterruptFlag>,
}

impl<'r> SpecExecutor<'r> {
    pub fn new(reporter: &'r mut dyn Reporter) -> Self {
        Self {
            reporter,
            backtraces: false,
            interrupt: None,
        }
    }

    /// Attach filtered backtraces to panic details.
    pub fn with_backtraces(mut self, backtraces: bool) -> Self {
        self.backtraces = backtraces;
        self
    }

    /// Check `flag` before every phase.
    pub fn with_interrupt(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Execute one spec from a fresh instance.
    ///
    /// Idempotent: executing the same definition twice produces the same event sequence and an
    /// equivalent result, apart from timings. Returns `Err(Interrupted)` only when the run was
    /// interrupted; the partial result is discarded.
    #[tracing::instrument(level = "debug", skip_all, fields(spec = %definition.name()))]
    pub fn execute(&mut self, definition: &SpecDefinition) -> Result<SpecResult, Interrupted> {
        let name = definition.name();
        let mut recorder = ResultRecorder::start(name);
        self.reporter.on_spec_start(name);

        if definition.is_skipped() {
            tracing::debug!("spec skipped");
            self.reporter.skipped(name, Stage::Meta, SKIPPED_SPEC);
            recorder.skip_spec();
            recorder.skipped(Stage::Meta, SKIPPED_SPEC);
        } else {
            self.check_interrupt()?;
            match collect(definition, self.backtraces)? {
                Collection::Rejected(err) => {
                    tracing::warn!(%err, "spec definition rejected");
                    self.reporter.error(name, Stage::Meta, COLLECT_STEPS, &err.detail());
                    recorder.rejected(err, COLLECT_STEPS);
                }
                Collection::Ready(collected) => {
                    let mut instance = collected.instance;
                    let ran = self.run_plan(name, &collected.plan, instance.as_mut(), &mut recorder);
                    discard(instance, self.backtraces)?;
                    ran?;
                }
            }
        }

        let result = recorder.finish();
        self.reporter.on_spec_complete(&result);
        Ok(result)
    }

    fn run_plan(
        &mut self,
        spec: &str,
        plan: &PhasePlan,
        instance: &mut dyn SpecInstance,
        recorder: &mut ResultRecorder,
    ) -> Result<(), Interrupted> {
        let mut state = if plan.is_empty() {
            ExecState::Done
        } else {
            ExecState::Running(0)
        };

        while let ExecState::Running(position) = state {
            self.check_interrupt()?;
            let Some(step) = plan.get(position) else {
                break;
            };

            let outcome = if step.skipped {
                self.reporter.skipped(spec, Stage::Phase(step.kind), &step.description);
                recorder.skipped(Stage::Phase(step.kind), &step.description);
                Outcome::Success
            } else {
                let mut out = Output::new();
                let started = Instant::now();
                let outcome = invoke(|| instance.run_operation(step.operation, &mut out), self.backtraces)?;
                recorder.append_output(out.as_str());
                self.record(spec, step, &outcome, started, recorder);
                outcome
            };

            state = next_state(plan, position, &outcome);
            tracing::debug!(phase = %step.kind, description = %step.description, success = outcome.is_success(), next = ?state, "phase finished");
        }
        Ok(())
    }

    fn record(&mut self, spec: &str, step: &PlannedPhase, outcome: &Outcome, started: Instant, recorder: &mut ResultRecorder) {
        let duration = started.elapsed();
        let kind = step.kind;
        let description = step.description.as_str();
        match outcome {
            Outcome::Success => {
                self.reporter.success(spec, kind, description);
                recorder.passed(kind, description, duration);
            }
            Outcome::AssertionFailure(detail) if kind.is_assertion() => {
                self.reporter.assertion_failure(spec, description, detail);
                recorder.assertion_failed(description, detail.clone(), duration);
            }
            // An unmet expectation outside an assertion phase is an error of that phase.
            Outcome::AssertionFailure(detail) | Outcome::Fault(detail) => {
                self.reporter.error(spec, Stage::Phase(kind), description, detail);
                recorder.faulted(kind, description, detail.clone(), duration);
            }
        }
    }

    fn check_interrupt(&self) -> Result<(), Interrupted> {
        match &self.interrupt {
            Some(flag) if flag.is_raised() => {
                tracing::info!("interrupt requested; abandoning spec");
                Err(Interrupted)
            }
            _ => Ok(()),
        }
    }
}
