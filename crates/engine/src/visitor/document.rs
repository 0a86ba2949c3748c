use fluentgen_types::{GeneratorError, Value, ValueKind};
use indexmap::IndexMap;
use tracing::trace;

use super::{Built, GenerationVisitor, VisitContext};
use crate::{construction::ConstructionStrategy, provider::ValueProvider};

/// Visitor that turns bindings into a JSON document.
///
/// The target's capability table is never consulted: construction only resets
/// the accumulated entries and each binding becomes a `name: value` pair.
/// Nested generators bound through a `GeneratorProvider` contribute their own
/// documents as values.
#[derive(Debug)]
pub struct DocumentVisitor {
    context: VisitContext,
    entries: IndexMap<String, Value>,
}

impl DocumentVisitor {
    pub fn new(context: VisitContext) -> Self {
        Self {
            context,
            entries: IndexMap::new(),
        }
    }
}

impl GenerationVisitor for DocumentVisitor {
    fn accept_construction(&mut self, _strategy: &ConstructionStrategy) -> Result<(), GeneratorError> {
        self.entries.clear();
        Ok(())
    }

    fn accept_property(&mut self, name: &str, _declared: ValueKind, provider: &dyn ValueProvider) -> Result<(), GeneratorError> {
        let value = self.context.resolve(name, provider)?;
        trace!(contract = %self.context.contract(), property = %name, kind = %value.kind(), "adding document entry");
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Built, GeneratorError> {
        let Self { context, entries } = *self;
        let document = Value::Map(entries).to_json().map_err(|source| GeneratorError::Serialization {
            contract: context.contract().to_string(),
            source,
        })?;
        Ok(Built::new(document))
    }
}
