//! Shareable metadata for `phasespec_core` registries.
//!
//! Vocabularies in this crate are **registry-first**: each item has a stable id, one canonical spelling and any
//! number of aliases. This module holds the small metadata types reused by every registry.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Metadata is meant for tooling/docs/diagnostics; enforcement of execution rules lives in the runner.
//! - Every item is described; the guardrail tests reject an empty `description`.

/// Shared metadata shape for registry vocabulary items.
///
/// Registries that need extra per-item data (e.g. phase cardinality) wrap this struct in an
/// extension info type.
///
/// ## Notes
/// - `description` is mandatory to keep docs/tooling consistent.
#[derive(Debug, Clone, Copy)]
pub struct ItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

impl<Id: Copy + PartialEq> ItemInfo<Id> {
    /// Check whether `name` is the canonical spelling or one of the aliases.
    pub fn accepts(&self, name: &str) -> bool {
        self.canonical == name || self.aliases.contains(&name)
    }
}

/// Resolve a spelling against a registry table, preferring canonical spellings over aliases.
pub fn resolve<Id: Copy + PartialEq>(table: &[ItemInfo<Id>], name: &str) -> Option<Id> {
    if let Some(info) = table.iter().find(|item| item.canonical == name) {
        return Some(info.id);
    }
    table.iter().find(|item| item.aliases.contains(&name)).map(|item| item.id)
}
