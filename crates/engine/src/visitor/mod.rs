//! Generation visitors.
//!
//! A build opens one visitor session: the visitor receives the active
//! construction strategy once, then every property binding once, then
//! `finish()` turns the accumulated state into the built object.
//!
//! Modules:
//! - `structural`: Instantiates the target and applies mutators from its capability table
//! - `document`: Ignores the target and accumulates a JSON document
//! - `registry`: Type → visitor factory mapping used for visitor selection

mod document;
mod registry;
mod structural;

use std::{any::Any, fmt, sync::Arc};

use fluentgen_types::{GeneratorError, MutatorNaming, TypeKey, Value, ValueKind};

pub use document::DocumentVisitor;
pub use registry::{VisitorFactory, VisitorRegistry};
pub use structural::StructuralVisitor;

use crate::{construction::ConstructionStrategy, provider::ValueProvider, target::TargetRegistry};

/// Two-phase consumer driven by a generator build.
pub trait GenerationVisitor {
    fn accept_construction(&mut self, strategy: &ConstructionStrategy) -> Result<(), GeneratorError>;

    fn accept_property(&mut self, name: &str, declared: ValueKind, provider: &dyn ValueProvider) -> Result<(), GeneratorError>;

    fn finish(self: Box<Self>) -> Result<Built, GeneratorError>;
}

/// Everything a visitor session knows about the build it serves.
#[derive(Debug, Clone)]
pub struct VisitContext {
    contract: Arc<str>,
    target: TypeKey,
    targets: Arc<TargetRegistry>,
    naming: MutatorNaming,
}

impl VisitContext {
    pub fn new(contract: impl Into<Arc<str>>, target: TypeKey, targets: Arc<TargetRegistry>, naming: MutatorNaming) -> Self {
        Self {
            contract: contract.into(),
            target,
            targets,
            naming,
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Type the build was resolved to.
    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn naming(&self) -> MutatorNaming {
        self.naming
    }

    /// Invokes `provider` for property `name`, attributing failures to the contract.
    pub fn resolve(&self, name: &str, provider: &dyn ValueProvider) -> Result<Value, GeneratorError> {
        provider.provide().map_err(|source| GeneratorError::Provider {
            contract: self.contract.to_string(),
            property: name.to_string(),
            source,
        })
    }
}

/// Object produced by a build.
pub struct Built {
    target: TypeKey,
    value: Box<dyn Any + Send>,
}

impl Built {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            target: TypeKey::of::<T>(),
            value: Box::new(value),
        }
    }

    /// Wraps an instance produced by a construction strategy for `target`.
    pub fn from_instance(target: TypeKey, value: Box<dyn Any + Send>) -> Self {
        Self { target, value }
    }

    /// Type the build was resolved to.
    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Takes the built object out as `T`, handing `self` back on type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let target = self.target;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|value| Self { target, value })
    }
}

impl fmt::Debug for Built {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Built").field("target", &self.target).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_objects_downcast_to_their_type() {
        let built = Built::new(String::from("Ana"));
        assert!(built.is::<String>());
        assert_eq!(built.downcast_ref::<String>().map(String::as_str), Some("Ana"));

        let built = built.downcast::<i32>().expect_err("not an i32");
        assert_eq!(built.target(), TypeKey::of::<String>());
        assert_eq!(built.downcast::<String>().expect("string"), "Ana");
    }
}
