use std::collections::HashMap;

use phasespec_core::phases::{self, PhaseKind};

#[test]
fn phase_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, PhaseKind> = HashMap::new();

    for info in phases::PHASES {
        let item = &info.item;
        assert_eq!(
            phases::from_str(item.canonical),
            Some(item.id),
            "phase canonical spelling not resolvable: {}",
            item.canonical
        );
        assert_eq!(phases::as_str(item.id), item.canonical, "phase as_str mismatch for {:?}", item.id);

        if let Some(prev) = seen.insert(item.canonical, item.id) {
            panic!("duplicate phase spelling {:?}: {:?} and {:?}", item.canonical, prev, item.id);
        }

        for &alias in item.aliases {
            assert_eq!(phases::from_str(alias), Some(item.id), "phase alias not resolvable: {}", alias);
            if let Some(prev) = seen.insert(alias, item.id) {
                panic!("duplicate phase alias spelling {:?}: {:?} and {:?}", alias, prev, item.id);
            }
        }
    }
}

#[test]
fn phase_spellings_are_valid_attribute_names() {
    // Every spelling doubles as an attribute on `#[spec]` impl blocks.
    for info in phases::PHASES {
        for name in std::iter::once(&info.item.canonical).chain(info.item.aliases.iter()) {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "phase spelling {name:?} is not a plain lowercase identifier"
            );
        }
    }
}

#[test]
fn registry_covers_every_kind_once() {
    assert_eq!(phases::PHASES.len(), phases::ALL.len());
    for kind in phases::ALL {
        assert_eq!(phases::info_for(kind).item.id, kind);
    }
}

#[test]
fn every_phase_is_described() {
    for info in phases::PHASES {
        assert!(
            !info.item.description.trim().is_empty(),
            "phase {:?} has no description",
            info.item.id
        );
    }
}
