use fluentgen_types::{ProviderError, Value};

use super::ValueProvider;
use crate::dispatch::Generator;

/// Exposes a generator as a value provider yielding its document output.
///
/// Each call builds a fresh document from the wrapped generator's current
/// bindings, which is how nested documents are composed: bind a
/// `GeneratorProvider` to a property of an outer document generator.
#[derive(Debug)]
pub struct GeneratorProvider {
    generator: Generator,
}

impl GeneratorProvider {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn into_inner(self) -> Generator {
        self.generator
    }
}

impl ValueProvider for GeneratorProvider {
    fn provide(&self) -> Result<Value, ProviderError> {
        let document = self.generator.document()?;
        Ok(Value::from(document))
    }
}
