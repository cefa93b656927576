//! Loaders supply spec definitions to the runner.

use crate::definition::{Spec, SpecDefinition};

/// Source of spec definitions for a run.
pub trait Loader {
    fn load_specs(&mut self) -> Box<dyn Iterator<Item = SpecDefinition> + '_>;
}

/// A statically registered, ordered collection of specs.
///
/// ```rust
/// use phasespec::{SpecBuilder, Suite};
///
/// let suite = Suite::new()
///     .with_definition(SpecBuilder::<u8>::new("zero").then("is zero", |n, _| assert_eq!(*n, 0)).build());
/// assert_eq!(suite.names(), vec!["zero"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Suite {
    definitions: Vec<SpecDefinition>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a [`Spec`] implementor.
    pub fn with<S: Spec>(mut self) -> Self {
        self.add(SpecDefinition::of::<S>());
        self
    }

    pub fn with_definition(mut self, definition: SpecDefinition) -> Self {
        self.add(definition);
        self
    }

    pub fn add(&mut self, definition: SpecDefinition) {
        self.definitions.push(definition);
    }

    pub fn definitions(&self) -> &[SpecDefinition] {
        &self.definitions
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(SpecDefinition::name).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Loader for Suite {
    fn load_specs(&mut self) -> Box<dyn Iterator<Item = SpecDefinition> + '_> {
        Box::new(self.definitions.iter().cloned())
    }
}

impl Loader for Vec<SpecDefinition> {
    fn load_specs(&mut self) -> Box<dyn Iterator<Item = SpecDefinition> + '_> {
        Box::new(self.iter().cloned())
    }
}

impl FromIterator<SpecDefinition> for Suite {
    fn from_iter<I: IntoIterator<Item = SpecDefinition>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::SpecBuilder;

    #[test]
    fn test_suite_preserves_registration_order() {
        let mut suite: Suite = ["b", "a", "c"]
            .into_iter()
            .map(|name| SpecBuilder::<u8>::new(name).then("holds", |_, _| ()).build())
            .collect();
        let loaded: Vec<String> = suite.load_specs().map(|d| d.name().to_string()).collect();
        assert_eq!(loaded, vec!["b", "a", "c"]);
        assert_eq!(suite.len(), 3);
    }
}
