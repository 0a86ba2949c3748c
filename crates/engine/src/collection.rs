//! Collection generation from value providers.

use std::fmt;

use fluentgen_types::{ProviderError, Value};

use crate::provider::{self, SharedProvider, ValueProvider};

/// Produces a list by invoking each registered provider in order.
///
/// Providers run on every build, so a collection of dynamic providers yields
/// fresh elements each time. The collection is itself a provider, which lets it
/// back a list-valued property of a generator.
#[derive(Clone, Default)]
pub struct CollectionGenerator {
    providers: Vec<SharedProvider>,
}

impl CollectionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, provider: SharedProvider) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Adds a constant element.
    pub fn add_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.add(provider::constant(value))
    }

    /// Adds `provider` `times` times; it is invoked once per element.
    pub fn add_times(&mut self, provider: SharedProvider, times: usize) -> &mut Self {
        self.providers.extend(std::iter::repeat_n(provider, times));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Invokes every provider and collects the values.
    pub fn build(&self) -> Result<Vec<Value>, ProviderError> {
        self.providers.iter().map(|provider| provider.provide()).collect()
    }

    /// Appends freshly provided values to `collection`.
    ///
    /// Nothing is appended when any provider fails.
    pub fn fill<C: Extend<Value>>(&self, collection: &mut C) -> Result<(), ProviderError> {
        collection.extend(self.build()?);
        Ok(())
    }
}

impl ValueProvider for CollectionGenerator {
    fn provide(&self) -> Result<Value, ProviderError> {
        self.build().map(Value::List)
    }
}

impl fmt::Debug for CollectionGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionGenerator").field("len", &self.providers.len()).finish()
    }
}
