//! Phase vocabulary registry.
//!
//! A spec is made of phases that always run in the same order:
//! `given` (setup) → `when` (action) → `collect` → `then` (assertions) → `after` (cleanup).
//!
//! This module centralizes the accepted spellings so the runner, the reporters and the `#[spec]` macro never
//! compare phase names as loose strings.

use crate::registry::{self, ItemInfo};

/// Stable identifier for a phase kind.
///
/// The derived `Ord` follows execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseKind {
    Setup,
    Action,
    Collect,
    Assert,
    Cleanup,
}

/// How many operations of one kind a spec may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ZeroOrOne,
    ZeroOrMore,
}

/// Metadata entry for a phase kind.
#[derive(Debug, Clone, Copy)]
pub struct PhaseInfo {
    pub item: ItemInfo<PhaseKind>,
    pub cardinality: Cardinality,
}

/// Every phase kind, in execution order.
pub const ALL: [PhaseKind; 5] = [
    PhaseKind::Setup,
    PhaseKind::Action,
    PhaseKind::Collect,
    PhaseKind::Assert,
    PhaseKind::Cleanup,
];

/// Registry of phase kinds.
pub const PHASES: &[PhaseInfo] = &[
    info(
        PhaseKind::Setup,
        "given",
        &["setup", "provided"],
        "Arrange the subject under test.",
        Cardinality::ZeroOrOne,
    ),
    info(
        PhaseKind::Action,
        "when",
        &["action", "because"],
        "Exercise the behavior being specified.",
        Cardinality::ZeroOrOne,
    ),
    info(
        PhaseKind::Collect,
        "collect",
        &["gather"],
        "Capture results of the action for the assertions to inspect.",
        Cardinality::ZeroOrOne,
    ),
    info(
        PhaseKind::Assert,
        "then",
        &["assert", "it", "should"],
        "Verify one expectation; every assertion runs independently.",
        Cardinality::ZeroOrMore,
    ),
    info(
        PhaseKind::Cleanup,
        "after",
        &["cleanup", "teardown", "finally"],
        "Release whatever the spec acquired. Runs even when an earlier phase faulted.",
        Cardinality::ZeroOrOne,
    ),
];

/// Resolve a phase spelling (canonical or alias) to its stable id.
pub fn from_str(name: &str) -> Option<PhaseKind> {
    registry::resolve(&items(), name)
}

/// Return the canonical spelling for a phase kind.
pub fn as_str(kind: PhaseKind) -> &'static str {
    info_for(kind).item.canonical
}

/// Return the metadata entry for a phase kind.
pub fn info_for(kind: PhaseKind) -> &'static PhaseInfo {
    // The table is indexed by declaration order; `ALL` and `PHASES` share it.
    &PHASES[kind.ordinal()]
}

fn items() -> [ItemInfo<PhaseKind>; 5] {
    [PHASES[0].item, PHASES[1].item, PHASES[2].item, PHASES[3].item, PHASES[4].item]
}

impl PhaseKind {
    /// Position of this kind in the fixed execution order (0-based).
    pub const fn ordinal(self) -> usize {
        match self {
            PhaseKind::Setup => 0,
            PhaseKind::Action => 1,
            PhaseKind::Collect => 2,
            PhaseKind::Assert => 3,
            PhaseKind::Cleanup => 4,
        }
    }

    pub fn cardinality(self) -> Cardinality {
        info_for(self).cardinality
    }

    /// `true` only for the assertion phase, whose failures are isolated per operation.
    pub fn is_assertion(self) -> bool {
        self == PhaseKind::Assert
    }

    pub fn is_cleanup(self) -> bool {
        self == PhaseKind::Cleanup
    }

    pub fn as_str(self) -> &'static str {
        as_str(self)
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn info(
    id: PhaseKind,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    cardinality: Cardinality,
) -> PhaseInfo {
    PhaseInfo {
        item: ItemInfo {
            id,
            canonical,
            aliases,
            description,
        },
        cardinality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_ordinals() {
        for (index, kind) in ALL.iter().enumerate() {
            assert_eq!(kind.ordinal(), index);
            assert_eq!(PHASES[index].item.id, *kind);
        }
    }

    #[test]
    fn test_only_assert_is_zero_or_more() {
        for kind in ALL {
            let expected = if kind == PhaseKind::Assert {
                Cardinality::ZeroOrMore
            } else {
                Cardinality::ZeroOrOne
            };
            assert_eq!(kind.cardinality(), expected, "{kind:?}");
        }
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(from_str("setup"), Some(PhaseKind::Setup));
        assert_eq!(from_str("teardown"), Some(PhaseKind::Cleanup));
        assert_eq!(from_str("then"), Some(PhaseKind::Assert));
        assert_eq!(from_str("meanwhile"), None);
    }

    #[test]
    fn test_display_uses_canonical_spelling() {
        assert_eq!(PhaseKind::Setup.to_string(), "given");
        assert_eq!(PhaseKind::Cleanup.to_string(), "after");
    }

    #[test]
    fn test_ord_is_execution_order() {
        let mut shuffled = vec![PhaseKind::Cleanup, PhaseKind::Assert, PhaseKind::Setup, PhaseKind::Collect];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![PhaseKind::Setup, PhaseKind::Collect, PhaseKind::Assert, PhaseKind::Cleanup]
        );
    }
}
