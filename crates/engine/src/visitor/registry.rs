use std::{fmt, sync::Arc};

use fluentgen_types::TypeKey;
use indexmap::IndexMap;
use tracing::trace;

use super::{GenerationVisitor, VisitContext};
use crate::target::TargetRegistry;

/// Creates a fresh visitor session for one build.
pub type VisitorFactory = Arc<dyn Fn(&VisitContext) -> Box<dyn GenerationVisitor> + Send + Sync>;

/// Ordered mapping from target type to the visitor that builds it.
///
/// Selection walks registrations in insertion order and returns the first one
/// the resolved target is assignable to. Targets without a match fall back to
/// the structural visitor.
#[derive(Clone, Default)]
pub struct VisitorRegistry {
    factories: IndexMap<TypeKey, VisitorFactory>,
}

impl VisitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for `key`. Re-registering a key keeps its position.
    pub fn register(&mut self, key: TypeKey, factory: VisitorFactory) {
        self.factories.insert(key, factory);
    }

    pub fn select(&self, target: TypeKey, targets: &TargetRegistry) -> Option<&VisitorFactory> {
        let (registered, factory) = self
            .factories
            .iter()
            .find(|(registered, _)| targets.is_assignable(target, **registered))?;
        trace!(target = %target, registered = %registered, "selected registered visitor");
        Some(factory)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.factories.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for VisitorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitorRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
