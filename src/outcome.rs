//! Assertion outcome model.
//!
//! Every phase body ends in exactly one [`Outcome`]:
//!
//! - [`Outcome::Success`] when the body returned `Ok(())`.
//! - [`Outcome::AssertionFailure`] when an expectation was not met: an [`AssertionFailure`] was returned or
//!   panicked with. The [`should`](crate::should) matchers produce these.
//! - [`Outcome::Fault`] for anything else: returned errors, `unwrap` on `None`, index out of bounds, ...
//!
//! Plain panics are faults, including those raised by `assert!` and `assert_eq!`. A custom message
//! replaces the `assertion failed` text of `assert!`, so the panic alone cannot tell an unmet expectation
//! from any other panic.
//!
//! An interrupt request is none of those. It surfaces as [`Interrupted`] and aborts the whole run.
//!
//! ## The invocation boundary
//!
//! Bodies are never called directly. [`invoke`] is the single place where a body runs: it holds a
//! [`PanicCapture`] for the duration of the call, catches unwinding panics, and converts whatever came out
//! into an [`Outcome`] immediately.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::capture::{PanicCapture, PanicSite};

/// Kind name recorded for unmet expectations.
pub const ASSERTION_FAILURE_KIND: &str = "AssertionFailure";

/// Kind name recorded for panics that are not assertions.
pub const PANIC_KIND: &str = "panic";

/// An expectation that was not met.
///
/// Produced by the [`should`](crate::should) helpers. Deliberately does not implement
/// [`std::error::Error`]: `?` must turn it into [`PhaseError::Assertion`], never into a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Any raised condition other than an unmet expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: String,
    message: String,
    causes: Vec<String>,
}

impl Fault {
    /// Create a fault with an explicit kind name, e.g. `Fault::new("KeyError", "'b' not found")`.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Capture an error value: its short type name becomes the kind, its `source()` chain the causes.
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            kind: short_type_name(std::any::type_name::<E>()).to_string(),
            message: err.to_string(),
            causes,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Panic payload that requests the whole run to stop.
///
/// `std::panic::panic_any(Interrupt)` from inside a phase body has the same effect as returning
/// `Err(PhaseError::Interrupted)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupt;

/// The run was interrupted; no result is salvaged for the spec that was executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("spec run interrupted")
    }
}

/// What a phase body reports when it does not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    Assertion(AssertionFailure),
    Fault(Fault),
    Interrupted,
}

impl PhaseError {
    /// Shorthand for a fault with an explicit kind name.
    pub fn fault(kind: impl Into<String>, message: impl Into<String>) -> Self {
        PhaseError::Fault(Fault::new(kind, message))
    }

    /// Shorthand for an unmet expectation.
    pub fn assertion(message: impl Into<String>) -> Self {
        PhaseError::Assertion(AssertionFailure::new(message))
    }
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseError::Assertion(failure) => write!(f, "{ASSERTION_FAILURE_KIND}: {failure}"),
            PhaseError::Fault(fault) => fault.fmt(f),
            PhaseError::Interrupted => Interrupted.fmt(f),
        }
    }
}

impl<E> From<E> for PhaseError
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        PhaseError::Fault(Fault::from_error(&err))
    }
}

impl From<AssertionFailure> for PhaseError {
    fn from(failure: AssertionFailure) -> Self {
        PhaseError::Assertion(failure)
    }
}

impl From<Fault> for PhaseError {
    fn from(fault: Fault) -> Self {
        PhaseError::Fault(fault)
    }
}

impl From<Interrupted> for PhaseError {
    fn from(_: Interrupted) -> Self {
        PhaseError::Interrupted
    }
}

/// Result type of a phase body.
pub type PhaseResult = Result<(), PhaseError>;

/// Diagnostic info attached to a failed or faulted phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeDetail {
    /// Kind name, e.g. `AssertionFailure`, `panic`, `KeyError`, `ParseIntError`.
    pub kind: String,
    pub message: String,
    /// Display-ready trace lines with framework frames elided.
    pub trace: Vec<String>,
}

impl OutcomeDetail {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            trace: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    fn from_fault(fault: Fault) -> Self {
        let trace = fault.causes.iter().map(|c| format!("caused by: {c}")).collect();
        Self {
            kind: fault.kind,
            message: fault.message,
            trace,
        }
    }
}

impl fmt::Display for OutcomeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// How one phase invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    AssertionFailure(OutcomeDetail),
    Fault(OutcomeDetail),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn detail(&self) -> Option<&OutcomeDetail> {
        match self {
            Outcome::Success => None,
            Outcome::AssertionFailure(detail) | Outcome::Fault(detail) => Some(detail),
        }
    }
}

/// Run `body` at the invocation boundary and classify how it ended.
///
/// Only an interrupt escapes as `Err`; every other condition becomes an [`Outcome`].
pub fn invoke<F>(body: F, backtraces: bool) -> Result<Outcome, Interrupted>
where
    F: FnOnce() -> PhaseResult,
{
    Ok(match guarded(body, backtraces)? {
        Ok(()) => Outcome::Success,
        Err(outcome) => outcome,
    })
}

/// Run `body`, returning `None` when it completes and the captured detail when it panics.
///
/// An interrupt is never caught: it keeps unwinding to the enclosing invocation boundary.
///
/// ## Examples
/// ```rust
/// let detail = phasespec::catch(|| {
///     let empty: Vec<u8> = Vec::new();
///     let _ = empty[3];
/// });
/// assert_eq!(detail.map(|d| d.kind), Some("panic".to_string()));
/// ```
pub fn catch<F: FnOnce()>(body: F) -> Option<OutcomeDetail> {
    let capture = PanicCapture::acquire(false);
    let caught = panic::catch_unwind(AssertUnwindSafe(body));
    let site = capture.take_site();
    drop(capture);
    match caught {
        Ok(()) => None,
        Err(payload) => Some(match classify_panic(payload, site) {
            Ok(Outcome::AssertionFailure(detail) | Outcome::Fault(detail)) => detail,
            Ok(Outcome::Success) => OutcomeDetail::new(PANIC_KIND, "unknown panic"),
            Err(Interrupted) => panic::resume_unwind(Box::new(Interrupt)),
        }),
    }
}

/// Run a value-producing `body` at the invocation boundary.
///
/// `Ok(Err(outcome))` always carries a non-success outcome.
pub(crate) fn guarded<T, F>(body: F, backtraces: bool) -> Result<Result<T, Outcome>, Interrupted>
where
    F: FnOnce() -> Result<T, PhaseError>,
{
    let capture = PanicCapture::acquire(backtraces);
    let caught = panic::catch_unwind(AssertUnwindSafe(body));
    let site = capture.take_site();
    drop(capture);

    match caught {
        Ok(Ok(value)) => Ok(Ok(value)),
        Ok(Err(err)) => classify(err).map(Err),
        Err(payload) => classify_panic(payload, site).map(Err),
    }
}

/// Drop `value` at the invocation boundary, so a panicking `Drop` impl cannot end the run.
pub(crate) fn discard<T>(value: T, backtraces: bool) -> Result<(), Interrupted> {
    let dropped = guarded(
        move || {
            drop(value);
            Ok(())
        },
        backtraces,
    )?;
    if let Err(outcome) = dropped {
        tracing::warn!(detail = ?outcome.detail(), "subject panicked while being dropped");
    }
    Ok(())
}

fn classify(err: PhaseError) -> Result<Outcome, Interrupted> {
    match err {
        PhaseError::Assertion(failure) => Ok(Outcome::AssertionFailure(OutcomeDetail::new(
            ASSERTION_FAILURE_KIND,
            failure.message,
        ))),
        PhaseError::Fault(fault) => Ok(Outcome::Fault(OutcomeDetail::from_fault(fault))),
        PhaseError::Interrupted => Err(Interrupted),
    }
}

fn classify_panic(payload: Box<dyn Any + Send>, site: Option<PanicSite>) -> Result<Outcome, Interrupted> {
    let trace = site.map(PanicSite::into_trace).unwrap_or_default();

    let payload = match payload.downcast::<Interrupt>() {
        Ok(_) => return Err(Interrupted),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<AssertionFailure>() {
        Ok(failure) => {
            return Ok(Outcome::AssertionFailure(
                OutcomeDetail::new(ASSERTION_FAILURE_KIND, failure.message).with_trace(trace),
            ));
        }
        Err(payload) => payload,
    };

    let message = panic_message(payload.as_ref());
    Ok(Outcome::Fault(OutcomeDetail::new(PANIC_KIND, message).with_trace(trace)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Reduce `core::num::error::ParseIntError` to `ParseIntError` (generic arguments dropped).
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("'{0}' not found")]
    struct KeyError(&'static str);

    #[derive(Debug, thiserror::Error)]
    #[error("configuration unreadable")]
    struct ConfigError(#[source] std::io::Error);

    #[test]
    fn test_success() {
        assert_eq!(invoke(|| Ok(()), false), Ok(Outcome::Success));
    }

    #[test]
    fn test_returned_assertion_failure() {
        let outcome = invoke(|| Err(AssertionFailure::new("expected 5 got 4").into()), false).unwrap();
        let Outcome::AssertionFailure(detail) = outcome else {
            panic!("expected assertion failure, got {outcome:?}");
        };
        assert_eq!(detail.kind, ASSERTION_FAILURE_KIND);
        assert_eq!(detail.message, "expected 5 got 4");
    }

    #[test]
    fn test_returned_error_becomes_fault_with_short_kind() {
        let outcome = invoke(|| Err(KeyError("b").into()), false).unwrap();
        assert_eq!(outcome, Outcome::Fault(OutcomeDetail::new("KeyError", "'b' not found")));
    }

    #[test]
    fn test_question_mark_conversion_records_causes() {
        fn read() -> PhaseResult {
            Err(ConfigError(std::io::Error::other("disk gone")))?;
            Ok(())
        }
        let outcome = invoke(read, false).unwrap();
        let detail = outcome.detail().unwrap();
        assert_eq!(detail.kind, "ConfigError");
        assert_eq!(detail.trace, vec!["caused by: disk gone".to_string()]);
    }

    #[test]
    fn test_plain_panic_is_fault() {
        let outcome = invoke(
            || {
                let values: Vec<i32> = Vec::new();
                let _ = values.first().copied().unwrap();
                Ok(())
            },
            false,
        )
        .unwrap();
        assert!(matches!(outcome, Outcome::Fault(ref d) if d.kind == PANIC_KIND));
        // The panic hook recorded where the panic happened.
        assert!(outcome.detail().unwrap().trace.iter().any(|line| line.contains("outcome.rs")));
    }

    #[test]
    fn test_assert_macros_are_faults_with_or_without_message() {
        let n = 0;
        let outcomes = [
            invoke(
                || {
                    assert!(n == 5);
                    Ok(())
                },
                false,
            ),
            invoke(
                || {
                    assert!(n == 5, "expected 5 got {n}");
                    Ok(())
                },
                false,
            ),
            invoke(
                || {
                    assert_eq!(n, 5, "expected 5 got {n}");
                    Ok(())
                },
                false,
            ),
        ];
        for outcome in outcomes {
            let outcome = outcome.unwrap();
            assert!(matches!(outcome, Outcome::Fault(ref d) if d.kind == PANIC_KIND), "got {outcome:?}");
        }
    }

    #[test]
    fn test_panic_any_assertion_failure() {
        let outcome = invoke(|| panic::panic_any(AssertionFailure::new("nope")), false).unwrap();
        assert_eq!(outcome.detail().unwrap().message, "nope");
        assert!(matches!(outcome, Outcome::AssertionFailure(_)));
    }

    #[test]
    fn test_interrupt_is_never_an_outcome() {
        assert_eq!(invoke(|| Err(PhaseError::Interrupted), false), Err(Interrupted));
        assert_eq!(invoke(|| panic::panic_any(Interrupt), false), Err(Interrupted));
    }

    #[test]
    fn test_catch_lets_interrupt_through() {
        let outcome = invoke(
            || {
                let caught = catch(|| panic::panic_any(Interrupt));
                assert!(caught.is_none(), "interrupt was swallowed: {caught:?}");
                Ok(())
            },
            false,
        );
        assert_eq!(outcome, Err(Interrupted));
    }

    #[test]
    fn test_discard_contains_panicking_drop() {
        struct Grenade;
        impl Drop for Grenade {
            fn drop(&mut self) {
                panic!("boom on drop");
            }
        }
        assert_eq!(discard(Grenade, false), Ok(()));
    }

    #[test]
    fn test_catch() {
        assert_eq!(catch(|| {}), None);
        let detail = catch(|| panic!("No can do!")).unwrap();
        assert_eq!(detail.kind, PANIC_KIND);
        assert_eq!(detail.message, "No can do!");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("core::num::error::ParseIntError"), "ParseIntError");
        assert_eq!(short_type_name("my::Wrapper<alloc::string::String>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
