//! Phase collection: turn a declared spec into an ordered, validated execution plan.
//!
//! Declaration order is irrelevant; the plan is always
//! `[setup?, action?, collect?, assert+, cleanup?]`, with assertions kept in declaration order.
//! Validation runs in a fixed order and the first failing check wins:
//!
//! 1. the subject must be constructible
//! 2. at least one assertion must be declared
//! 3. no single-occurrence kind may be declared twice

use std::fmt;

use miette::Diagnostic;
use phasespec_core::{Cardinality, PhaseKind, phases};
use thiserror::Error;

use crate::definition::{PhaseDecl, SpecDefinition, SpecInstance};
use crate::outcome::{Interrupted, OutcomeDetail, discard, guarded};

/// Kind name used when a definition error is reported as a synthetic error event.
pub const DEFINITION_ERROR_KIND: &str = "SpecDefinitionError";

/// Why a spec was rejected before any of its phases ran.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SpecDefinitionError {
    #[error("The spec ({spec}) could not be initialized (error in constructor).")]
    #[diagnostic(
        code(phasespec::definition::construction),
        help("the subject is constructed once per execution; fix the constructor first")
    )]
    Construction { spec: String, cause: OutcomeDetail },

    #[error("No assertions (\"then\" phases) found with the spec ({spec}).")]
    #[diagnostic(
        code(phasespec::definition::no_assertions),
        help("declare at least one `then` operation; without one the spec is unimplemented")
    )]
    NoAssertions { spec: String },

    #[error("The spec ({spec}) has extra steps ({}).", KindList(.kinds))]
    #[diagnostic(
        code(phasespec::definition::extra_steps),
        help("`given`, `when`, `collect` and `after` may each be declared at most once")
    )]
    ExtraSteps { spec: String, kinds: Vec<PhaseKind> },
}

impl SpecDefinitionError {
    pub fn spec(&self) -> &str {
        match self {
            SpecDefinitionError::Construction { spec, .. }
            | SpecDefinitionError::NoAssertions { spec }
            | SpecDefinitionError::ExtraSteps { spec, .. } => spec,
        }
    }

    /// Detail carried by the synthetic error event.
    pub fn detail(&self) -> OutcomeDetail {
        let trace = match self {
            SpecDefinitionError::Construction { cause, .. } => std::iter::once(cause.to_string())
                .chain(cause.trace.iter().cloned())
                .collect(),
            _ => Vec::new(),
        };
        OutcomeDetail::new(DEFINITION_ERROR_KIND, self.to_string()).with_trace(trace)
    }
}

struct KindList<'a>(&'a [PhaseKind]);

impl fmt::Display for KindList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|k| format!("'{}'", k.as_str())).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// One step of an execution plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPhase {
    /// Index into the definition's declarations.
    pub operation: usize,
    pub kind: PhaseKind,
    pub description: String,
    pub skipped: bool,
}

/// The ordered steps of one spec execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    steps: Vec<PlannedPhase>,
}

impl PhasePlan {
    pub fn steps(&self) -> &[PlannedPhase] {
        &self.steps
    }

    pub fn get(&self, position: usize) -> Option<&PlannedPhase> {
        self.steps.get(position)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of the cleanup step, if one was declared.
    pub fn cleanup_position(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.kind.is_cleanup())
    }

    pub fn kinds(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        self.steps.iter().map(|s| s.kind)
    }
}

/// Order and validate declarations without constructing anything.
///
/// Checks the declaration-only rules (assertions present, single-occurrence kinds not repeated).
pub fn plan(spec: &str, declarations: &[PhaseDecl]) -> Result<PhasePlan, SpecDefinitionError> {
    if !declarations.iter().any(|d| d.kind.is_assertion()) {
        return Err(SpecDefinitionError::NoAssertions { spec: spec.to_string() });
    }

    let extra: Vec<PhaseKind> = phases::ALL
        .iter()
        .copied()
        .filter(|kind| kind.cardinality() == Cardinality::ZeroOrOne)
        .filter(|kind| declarations.iter().filter(|d| d.kind == *kind).count() > 1)
        .collect();
    if !extra.is_empty() {
        return Err(SpecDefinitionError::ExtraSteps {
            spec: spec.to_string(),
            kinds: extra,
        });
    }

    let mut steps: Vec<PlannedPhase> = declarations
        .iter()
        .enumerate()
        .map(|(operation, decl)| PlannedPhase {
            operation,
            kind: decl.kind,
            description: decl.description.clone(),
            skipped: decl.skipped,
        })
        .collect();
    // Stable: assertions keep declaration order.
    steps.sort_by_key(|s| s.kind);
    Ok(PhasePlan { steps })
}

/// A spec ready to execute: its plan and a freshly constructed instance.
pub struct CollectedSpec {
    pub plan: PhasePlan,
    pub instance: Box<dyn SpecInstance>,
}

impl fmt::Debug for CollectedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectedSpec").field("plan", &self.plan).finish_non_exhaustive()
    }
}

/// Result of collecting a spec.
#[derive(Debug)]
pub enum Collection {
    Ready(CollectedSpec),
    Rejected(SpecDefinitionError),
}

/// Construct a fresh subject for `definition` and plan its phases.
///
/// Construction runs at the invocation boundary, so a panicking constructor is a definition error
/// rather than a crash. Only an interrupt escapes.
#[tracing::instrument(level = "debug", skip_all, fields(spec = %definition.name()))]
pub fn collect(definition: &SpecDefinition, backtraces: bool) -> Result<Collection, Interrupted> {
    let instance = match guarded(|| definition.instantiate(), backtraces)? {
        Ok(instance) => instance,
        Err(outcome) => {
            let cause = outcome
                .detail()
                .cloned()
                .unwrap_or_else(|| OutcomeDetail::new("unknown", "constructor failed"));
            tracing::debug!(%cause, "spec construction failed");
            return Ok(Collection::Rejected(SpecDefinitionError::Construction {
                spec: definition.name().to_string(),
                cause,
            }));
        }
    };

    match plan(definition.name(), definition.declarations()) {
        Ok(plan) => {
            tracing::debug!(steps = plan.len(), "spec collected");
            Ok(Collection::Ready(CollectedSpec { plan, instance }))
        }
        Err(err) => {
            discard(instance, backtraces)?;
            Ok(Collection::Rejected(err))
        }
    }
}
