#![forbid(unsafe_code)]
//! phasespec: phase-structured behaviour specs
//!
//! A spec is a scenario split into phases: `given` (setup), `when` (action), `collect`, any number of
//! `then` (assertions) and `after` (cleanup). The engine orders the declared phases, runs them against
//! a fresh subject, classifies every outcome and streams events to a reporter.
//!
//! ```rust
//! use phasespec::should::this;
//! use phasespec::{RecordingReporter, SpecBuilder, SpecExecutor};
//!
//! let spec = SpecBuilder::<Vec<i32>>::new("a stack")
//!     .then("it starts empty", |stack, _| this(&stack[..]).should().be_empty())
//!     .when("pushing two values", |stack, _| stack.extend([1, 2]))
//!     .then("it holds both", |stack, _| this(stack.len()).should().equal(2))
//!     .build();
//!
//! let mut reporter = RecordingReporter::new();
//! let result = SpecExecutor::new(&mut reporter).execute(&spec).unwrap();
//! // Assertions run after the action, so "starts empty" sees two values.
//! assert!(!result.passed());
//! assert_eq!(result.failures()[0].description, "it starts empty");
//! ```
//!
//! With the `#[spec]` attribute the same scenario is an ordinary impl block:
//!
//! ```rust
//! use phasespec::should::this;
//! use phasespec::{PhaseResult, spec};
//!
//! #[derive(Default)]
//! struct PushingOntoAStack {
//!     stack: Vec<i32>,
//! }
//!
//! #[spec]
//! impl PushingOntoAStack {
//!     #[when]
//!     fn two_values_are_pushed(&mut self) {
//!         self.stack.extend([1, 2]);
//!     }
//!
//!     #[then]
//!     fn it_holds_both(&mut self) -> PhaseResult {
//!         this(self.stack.len()).should().equal(2)?;
//!         Ok(())
//!     }
//! }
//!
//! let suite = phasespec::Suite::new().with::<PushingOntoAStack>();
//! assert_eq!(suite.names(), vec!["pushing onto a stack"]);
//! ```
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Phase bodies**: may panic freely. Panics are caught at the invocation boundary and classified like returned
//!   errors. A plain panic, `assert!` included, is a fault; use the `should` matchers for failures.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

extern crate self as phasespec;

pub mod capture;
pub mod cli;
pub mod collector;
pub mod config;
pub mod definition;
pub mod executor;
pub mod loader;
pub mod outcome;
pub mod reporter;
pub mod result;
pub mod runner;
pub mod should;

pub use phasespec_core::{Cardinality, PhaseKind};
pub use phasespec_derive::spec;

pub use capture::{Output, PanicCapture};
pub use collector::{Collection, PhasePlan, SpecDefinitionError, collect, plan};
pub use config::{ReporterKind, RunConfig};
pub use definition::{IntoPhaseResult, IntoSubject, PhaseDecl, PhaseOperation, Spec, SpecBuilder, SpecDefinition, Subject};
pub use executor::{ExecState, SpecExecutor, next_state};
pub use loader::{Loader, Suite};
pub use outcome::{
    AssertionFailure, Fault, Interrupt, Interrupted, Outcome, OutcomeDetail, PhaseError, PhaseResult, catch, invoke,
};
pub use reporter::{
    DotReporter, JsonReporter, PhaseEvent, RecordingReporter, Reporter, RunSummary, Stage, StoryReporter,
};
pub use result::{PhaseFailure, PhaseRecord, PhaseStatus, SpecResult, SpecStatus};
pub use runner::{InterruptFlag, SpecRunner};
