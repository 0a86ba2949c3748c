//! Generator factory: the only place generators are created.

use std::{any::Any, path::Path, sync::Arc};

use fluentgen_types::{ContractDefinition, GeneratorError, MutatorNaming, TypeKey};
use tracing::debug;

use crate::{
    contract::GeneratorContract,
    definition::{contract_from_definition, load_definition},
    dispatch::Generator,
    target::{TargetRegistry, TargetType},
    visitor::{DocumentVisitor, GenerationVisitor, VisitContext, VisitorFactory, VisitorRegistry},
};

/// Registered name of the JSON document target.
pub const DOCUMENT_TARGET: &str = "document";

/// Read-only state shared by every generator a factory creates.
#[derive(Debug)]
pub(crate) struct Catalog {
    pub(crate) targets: Arc<TargetRegistry>,
    pub(crate) visitors: VisitorRegistry,
    pub(crate) naming: MutatorNaming,
}

/// Creates generators for contracts against a fixed set of target types and
/// visitors.
///
/// Registries are frozen when the factory is built and shared by all of its
/// generators, so a factory is cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct GeneratorFactory {
    catalog: Arc<Catalog>,
}

impl Default for GeneratorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorFactory {
    /// Factory with only the built-in JSON document target.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> GeneratorFactoryBuilder {
        GeneratorFactoryBuilder::new()
    }

    /// Creates a generator for `contract` with an empty binding table.
    pub fn create_generator(&self, contract: impl Into<Arc<GeneratorContract>>) -> Generator {
        let contract = contract.into();
        debug!(
            contract = %contract.name(),
            target = ?contract.target().map(|key| key.name()),
            methods = contract.setters().count(),
            "creating generator"
        );
        Generator::new(contract, Arc::clone(&self.catalog))
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.catalog.targets
    }

    pub fn visitors(&self) -> &VisitorRegistry {
        &self.catalog.visitors
    }

    pub fn naming(&self) -> MutatorNaming {
        self.catalog.naming
    }

    /// Converts a declarative definition, resolving its target by registered name.
    pub fn contract_from_definition(&self, definition: &ContractDefinition) -> Result<GeneratorContract, GeneratorError> {
        contract_from_definition(definition, &self.catalog.targets)
    }

    /// Loads a YAML or JSON contract definition file and converts it.
    pub fn load_contract(&self, file_path: impl AsRef<Path>) -> anyhow::Result<GeneratorContract> {
        let definition = load_definition(file_path)?;
        Ok(self.contract_from_definition(&definition)?)
    }
}

/// Builder collecting target types and visitor registrations.
#[derive(Debug)]
pub struct GeneratorFactoryBuilder {
    targets: TargetRegistry,
    visitors: VisitorRegistry,
    naming: MutatorNaming,
}

impl Default for GeneratorFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorFactoryBuilder {
    /// Starts with the JSON document target mapped to the document visitor.
    pub fn new() -> Self {
        let mut targets = TargetRegistry::new();
        targets.register(TargetType::builder::<serde_json::Value>().named(DOCUMENT_TARGET).build());

        let mut visitors = VisitorRegistry::new();
        let document: VisitorFactory =
            Arc::new(|context: &VisitContext| Box::new(DocumentVisitor::new(context.clone())) as Box<dyn GenerationVisitor>);
        visitors.register(TypeKey::of::<serde_json::Value>(), document);

        Self {
            targets,
            visitors,
            naming: MutatorNaming::default(),
        }
    }

    pub fn target(mut self, target: TargetType) -> Self {
        self.targets.register(target);
        self
    }

    /// Routes builds of `T`, and of types assignable to `T`, to `factory`.
    pub fn visitor<T, F>(mut self, factory: F) -> Self
    where
        T: Any + ?Sized,
        F: Fn(&VisitContext) -> Box<dyn GenerationVisitor> + Send + Sync + 'static,
    {
        self.visitors.register(TypeKey::of::<T>(), Arc::new(factory));
        self
    }

    /// Naming convention for contracts that do not set their own.
    pub fn naming(mut self, naming: MutatorNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn build(self) -> GeneratorFactory {
        GeneratorFactory {
            catalog: Arc::new(Catalog {
                targets: Arc::new(self.targets),
                visitors: self.visitors,
                naming: self.naming,
            }),
        }
    }
}
