//! Property-based tests for the executor.
//!
//! These tests use proptest to check execution invariants over randomly shaped specs.

use std::cell::RefCell;
use std::rc::Rc;

use phasespec::{
    AssertionFailure, PhaseError, PhaseKind, RecordingReporter, SpecBuilder, SpecDefinition, SpecExecutor, SpecResult,
};
use proptest::prelude::*;

type Journal = Rc<RefCell<Vec<PhaseKind>>>;

fn execute(definition: &SpecDefinition) -> (SpecResult, RecordingReporter) {
    let mut reporter = RecordingReporter::new();
    let result = SpecExecutor::new(&mut reporter).execute(definition).unwrap();
    (result, reporter)
}

/// A spec with a setup that may fault, the given assertion outcomes and an optional cleanup.
fn shaped_spec(journal: &Journal, setup_faults: bool, outcomes: &[bool], cleanup: bool) -> SpecDefinition {
    let j = journal.clone();
    let mut spec = SpecBuilder::<()>::new("shaped").given("setup", move |_, _| -> Result<(), PhaseError> {
        j.borrow_mut().push(PhaseKind::Setup);
        if setup_faults {
            Err(PhaseError::fault("SetupError", "boom"))
        } else {
            Ok(())
        }
    });
    for (index, &holds) in outcomes.iter().enumerate() {
        let j = journal.clone();
        spec = spec.then(format!("assertion {index}"), move |_, _| {
            j.borrow_mut().push(PhaseKind::Assert);
            if holds {
                Ok(())
            } else {
                Err(AssertionFailure::new("does not hold"))
            }
        });
    }
    if cleanup {
        let j = journal.clone();
        spec = spec.after("cleanup", move |_, _| j.borrow_mut().push(PhaseKind::Cleanup));
    }
    spec.build()
}

fn count(journal: &Journal, kind: PhaseKind) -> usize {
    journal.borrow().iter().filter(|k| **k == kind).count()
}

// =============================================================================
// Execution Properties
// =============================================================================

proptest! {
    /// Property: every assertion runs, whatever the others did.
    #[test]
    fn all_assertions_run(outcomes in prop::collection::vec(any::<bool>(), 1..8), cleanup in any::<bool>()) {
        let journal = Journal::default();
        let (result, _) = execute(&shaped_spec(&journal, false, &outcomes, cleanup));

        let failing = outcomes.iter().filter(|holds| !**holds).count();
        prop_assert_eq!(count(&journal, PhaseKind::Assert), outcomes.len());
        prop_assert_eq!(result.failures().len(), failing);
        prop_assert_eq!(result.assertions().len(), outcomes.len() - failing);
        prop_assert_eq!(result.passed(), failing == 0);
    }

    /// Property: cleanup runs exactly once when declared, and a setup fault skips every assertion.
    #[test]
    fn cleanup_runs_once(
        outcomes in prop::collection::vec(any::<bool>(), 1..8),
        setup_faults in any::<bool>(),
        cleanup in any::<bool>(),
    ) {
        let journal = Journal::default();
        let (result, _) = execute(&shaped_spec(&journal, setup_faults, &outcomes, cleanup));

        prop_assert_eq!(count(&journal, PhaseKind::Cleanup), usize::from(cleanup));
        if setup_faults {
            prop_assert_eq!(count(&journal, PhaseKind::Assert), 0);
            prop_assert!(!result.passed());
            prop_assert!(result.error_for(PhaseKind::Setup).is_some());
        }
    }

    /// Property: executing twice yields the same events.
    #[test]
    fn execution_is_idempotent(
        outcomes in prop::collection::vec(any::<bool>(), 1..8),
        setup_faults in any::<bool>(),
        cleanup in any::<bool>(),
    ) {
        let journal = Journal::default();
        let spec = shaped_spec(&journal, setup_faults, &outcomes, cleanup);
        let (first, first_events) = execute(&spec);
        let (second, second_events) = execute(&spec);

        prop_assert_eq!(first_events.events, second_events.events);
        prop_assert_eq!(first.passed(), second.passed());
        prop_assert_eq!(first.status(), second.status());
    }
}

// =============================================================================
// Ordering Properties
// =============================================================================

fn declaration_strategy() -> impl Strategy<Value = Vec<PhaseKind>> {
    let single = prop::sample::subsequence(
        vec![PhaseKind::Setup, PhaseKind::Action, PhaseKind::Collect, PhaseKind::Cleanup],
        0..=4,
    );
    (single, 1..4usize)
        .prop_map(|(mut kinds, asserts)| {
            kinds.extend(std::iter::repeat_n(PhaseKind::Assert, asserts));
            kinds
        })
        .prop_shuffle()
}

proptest! {
    /// Property: phases run in kind order, regardless of declaration order.
    #[test]
    fn phases_run_in_kind_order(kinds in declaration_strategy()) {
        let journal = Journal::default();
        let mut spec = SpecBuilder::<()>::new("shuffled");
        for (index, &kind) in kinds.iter().enumerate() {
            let j = journal.clone();
            spec = spec.phase(kind, format!("step {index}"), move |_, _| j.borrow_mut().push(kind));
        }
        let (result, _) = execute(&spec.build());

        let mut expected = kinds.clone();
        expected.sort();
        prop_assert!(result.passed());
        prop_assert_eq!(journal.borrow().clone(), expected);
    }
}
