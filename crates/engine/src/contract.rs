//! Generator contracts.
//!
//! A contract is the runtime description of a fluent builder interface: the
//! property methods it declares, the type its terminal call returns, the
//! names reserved for terminal and constructor calls, and any default methods
//! implemented on top of the generator.
//!
//! ```rust
//! use fluentgen_engine::{GeneratorContract, ParamType, ReturnType, SetterSpec};
//! use fluentgen_types::ValueKind;
//!
//! # #[derive(Default)] struct Person;
//! let contract = GeneratorContract::builder("PersonGenerator")
//!     .builds::<Person>()
//!     .property("name", ValueKind::Str)
//!     .property("age", ValueKind::Int)
//!     .method(SetterSpec::new("nickname", ParamType::provider(ValueKind::Str)).returning(ReturnType::Unit))
//!     .build()?;
//! assert_eq!(contract.setters().count(), 3);
//! # Ok::<(), fluentgen_types::GeneratorError>(())
//! ```

use std::{any::Any, fmt, sync::Arc};

use fluentgen_types::{DispatchNames, GeneratorError, MutatorNaming, TypeKey, ValueKind};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dispatch::{Arg, Generator, Reply};

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex should compile"));

/// Declared parameter of a property method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamType {
    pub kind: ValueKind,
    /// True when the parameter is declared as a value provider rather than a literal.
    pub provider: bool,
}

impl ParamType {
    pub fn value(kind: ValueKind) -> Self {
        Self { kind, provider: false }
    }

    pub fn provider(kind: ValueKind) -> Self {
        Self { kind, provider: true }
    }
}

/// Declared return type of a property method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// The contract itself; the call hands back the same generator.
    Contract,
    /// An untyped return; treated like `Contract`.
    Untyped,
    Unit,
    /// Some unrelated type; the call returns no value.
    Type(TypeKey),
}

impl ReturnType {
    pub fn chains(&self) -> bool {
        matches!(self, ReturnType::Contract | ReturnType::Untyped)
    }
}

/// A single-parameter property method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetterSpec {
    name: String,
    parameter: ParamType,
    returns: ReturnType,
}

impl SetterSpec {
    pub fn new(name: impl Into<String>, parameter: ParamType) -> Self {
        Self {
            name: name.into(),
            parameter,
            returns: ReturnType::Contract,
        }
    }

    pub fn returning(mut self, returns: ReturnType) -> Self {
        self.returns = returns;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter(&self) -> ParamType {
        self.parameter
    }

    pub fn returns(&self) -> ReturnType {
        self.returns
    }
}

type DefaultBody = dyn for<'g> Fn(&'g mut Generator, Vec<Arg>) -> Result<Reply<'g>, GeneratorError> + Send + Sync;

/// A method implemented on top of the generator rather than dispatched by it.
///
/// The body receives the live generator, so it may bind properties, swap the
/// constructor, or build.
#[derive(Clone)]
pub struct DefaultMethod {
    name: String,
    body: Arc<DefaultBody>,
}

impl DefaultMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke<'g>(&self, generator: &'g mut Generator, args: Vec<Arg>) -> Result<Reply<'g>, GeneratorError> {
        (self.body)(generator, args)
    }
}

impl fmt::Debug for DefaultMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMethod").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Runtime description of a fluent builder interface.
#[derive(Debug, Clone)]
pub struct GeneratorContract {
    name: String,
    target: Option<TypeKey>,
    names: DispatchNames,
    naming: Option<MutatorNaming>,
    setters: IndexMap<String, SetterSpec>,
    defaults: IndexMap<String, DefaultMethod>,
}

impl GeneratorContract {
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder {
            name: name.into(),
            target: None,
            names: DispatchNames::default(),
            naming: None,
            setters: Vec::new(),
            defaults: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved terminal return type, or `None` when the terminal is generic.
    pub fn target(&self) -> Option<TypeKey> {
        self.target
    }

    pub fn names(&self) -> &DispatchNames {
        &self.names
    }

    /// Contract-level mutator naming override.
    pub fn naming(&self) -> Option<MutatorNaming> {
        self.naming
    }

    pub fn setter(&self, name: &str) -> Option<&SetterSpec> {
        self.setters.get(name)
    }

    pub fn setters(&self) -> impl Iterator<Item = &SetterSpec> {
        self.setters.values()
    }

    pub fn default_method(&self, name: &str) -> Option<&DefaultMethod> {
        self.defaults.get(name)
    }

    pub fn default_methods(&self) -> impl Iterator<Item = &DefaultMethod> {
        self.defaults.values()
    }
}

/// Builder validating a [`GeneratorContract`].
pub struct ContractBuilder {
    name: String,
    target: Option<TypeKey>,
    names: DispatchNames,
    naming: Option<MutatorNaming>,
    setters: Vec<SetterSpec>,
    defaults: Vec<DefaultMethod>,
}

impl ContractBuilder {
    /// Resolves the terminal return type to `T`.
    pub fn builds<T: Any + ?Sized>(self) -> Self {
        self.target(TypeKey::of::<T>())
    }

    pub fn target(mut self, target: TypeKey) -> Self {
        self.target = Some(target);
        self
    }

    pub fn names(mut self, names: DispatchNames) -> Self {
        self.names = names;
        self
    }

    pub fn naming(mut self, naming: MutatorNaming) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Declares a chaining property method taking a literal of `kind`.
    pub fn property(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.method(SetterSpec::new(name, ParamType::value(kind)))
    }

    /// Declares a chaining property method taking a provider of `kind`.
    pub fn provider_property(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.method(SetterSpec::new(name, ParamType::provider(kind)))
    }

    pub fn method(mut self, setter: SetterSpec) -> Self {
        self.setters.push(setter);
        self
    }

    /// Registers a default method body.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fluentgen_engine::{GeneratorContract, Reply};
    /// use fluentgen_types::ValueKind;
    ///
    /// let contract = GeneratorContract::builder("PersonGenerator")
    ///     .property("age", ValueKind::Int)
    ///     .default_method("adult", |generator, _args| {
    ///         generator.set("age", 18)?;
    ///         Ok(Reply::Receiver(generator))
    ///     })
    ///     .build()?;
    /// assert!(contract.default_method("adult").is_some());
    /// # Ok::<(), fluentgen_types::GeneratorError>(())
    /// ```
    pub fn default_method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: for<'g> Fn(&'g mut Generator, Vec<Arg>) -> Result<Reply<'g>, GeneratorError> + Send + Sync + 'static,
    {
        self.defaults.push(DefaultMethod {
            name: name.into(),
            body: Arc::new(body),
        });
        self
    }

    /// Validates the declarations and produces the contract.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Configuration`] when no terminal name is
    /// configured, the constructor name is also a terminal name, a method name
    /// is not an identifier or is reserved, or a name is declared twice.
    pub fn build(self) -> Result<GeneratorContract, GeneratorError> {
        let invalid = |message: String| GeneratorError::configuration(self.name.clone(), message);

        if self.names.terminal.is_empty() {
            return Err(invalid("at least one terminal method name is required".to_string()));
        }
        if self.names.is_terminal(&self.names.constructor) {
            return Err(invalid(format!(
                "constructor method name '{}' is also a terminal name",
                self.names.constructor
            )));
        }

        let declared = self
            .setters
            .iter()
            .map(SetterSpec::name)
            .chain(self.defaults.iter().map(DefaultMethod::name));
        let mut seen: Vec<&str> = Vec::new();
        for name in declared {
            if !IDENTIFIER_REGEX.is_match(name) {
                return Err(invalid(format!("method name '{name}' is not a valid identifier")));
            }
            if self.names.is_reserved(name) {
                return Err(invalid(format!("method name '{name}' is reserved for terminal or constructor calls")));
            }
            if seen.contains(&name) {
                return Err(invalid(format!("method '{name}' is declared more than once")));
            }
            seen.push(name);
        }

        Ok(GeneratorContract {
            setters: self
                .setters
                .into_iter()
                .map(|setter| (setter.name.clone(), setter))
                .collect(),
            defaults: self
                .defaults
                .into_iter()
                .map(|method| (method.name.clone(), method))
                .collect(),
            name: self.name,
            target: self.target,
            names: self.names,
            naming: self.naming,
        })
    }
}
