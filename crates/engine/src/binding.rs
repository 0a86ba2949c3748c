//! Property binding table.
//!
//! Each generator keeps one table mapping a property name to the provider
//! that supplies its value and the kind declared by the contract. The table
//! is keyed by name alone: binding a name again replaces the previous entry,
//! whatever kind or provider it carried.

use std::fmt;

use fluentgen_types::ValueKind;
use indexmap::IndexMap;

use crate::provider::{SharedProvider, ValueProvider};

/// A property name bound to its declared kind and value provider.
#[derive(Clone)]
pub struct PropertyBinding {
    name: String,
    declared: ValueKind,
    provider: SharedProvider,
}

impl PropertyBinding {
    pub fn new(name: impl Into<String>, declared: ValueKind, provider: SharedProvider) -> Self {
        Self {
            name: name.into(),
            declared,
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> ValueKind {
        self.declared
    }

    pub fn provider(&self) -> &dyn ValueProvider {
        self.provider.as_ref()
    }
}

impl fmt::Debug for PropertyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

/// Last-write-wins table of property bindings.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: IndexMap<String, PropertyBinding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `binding`, returning the binding it replaced, if any.
    pub fn bind(&mut self, binding: PropertyBinding) -> Option<PropertyBinding> {
        self.bindings.insert(binding.name.clone(), binding)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyBinding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyBinding> {
        self.bindings.values()
    }
}
