//! Dispatch engine.
//!
//! [`Generator::handle`] is the single entry point for calls against a
//! contract. Calls are classified in a fixed order:
//!
//! 1. terminal names build the target, inferred or given explicitly as a type;
//! 2. the constructor name swaps the construction strategy;
//! 3. default methods run their body with the live generator;
//! 4. everything else is a property setter that records a binding.
//!
//! The typed helpers (`set`, `constructor`, `build`, ...) are thin wrappers
//! over the same paths.

use std::{any::Any, fmt, sync::Arc};

use fluentgen_types::{GeneratorError, MutatorNaming, TypeKey, Value, ValueError};
use tracing::{debug, trace};

use crate::{
    binding::{BindingTable, PropertyBinding},
    construction::ConstructionStrategy,
    contract::GeneratorContract,
    factory::Catalog,
    provider::{self, GeneratorProvider, InstanceProvider, SharedInstanceProvider, SharedProvider, ValueProvider},
    visitor::{Built, GenerationVisitor, StructuralVisitor, VisitContext},
};

/// Argument of a generator call.
#[derive(Clone)]
pub enum Arg {
    /// A literal, wrapped in a constant provider when bound.
    Value(Value),
    /// A value provider, bound as-is.
    Provider(SharedProvider),
    /// An instance provider, accepted by the constructor call.
    Instances(SharedInstanceProvider),
    /// A type token, taken by terminal calls as the explicit target. Setters
    /// bind it like any other literal.
    Type(TypeKey),
}

impl Arg {
    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    pub fn provider(provider: impl ValueProvider + 'static) -> Self {
        Arg::Provider(Arc::new(provider))
    }

    pub fn instances(provider: impl InstanceProvider + 'static) -> Self {
        Arg::Instances(Arc::new(provider))
    }

    pub fn of_type<T: Any + ?Sized>() -> Self {
        Arg::Type(TypeKey::of::<T>())
    }

    fn describe(&self) -> String {
        match self {
            Arg::Value(value) => format!("a {} value", value.kind()),
            Arg::Provider(_) => "a value provider".to_string(),
            Arg::Instances(_) => "an instance provider".to_string(),
            Arg::Type(key) => format!("the type {key}"),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Arg::Provider(_) => f.write_str("Provider(..)"),
            Arg::Instances(_) => f.write_str("Instances(..)"),
            Arg::Type(key) => f.debug_tuple("Type").field(key).finish(),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<TypeKey> for Arg {
    fn from(key: TypeKey) -> Self {
        Arg::Type(key)
    }
}

impl From<SharedProvider> for Arg {
    fn from(provider: SharedProvider) -> Self {
        Arg::Provider(provider)
    }
}

/// Result of a generator call.
#[derive(Debug)]
pub enum Reply<'g> {
    /// The generator that received the call, for chaining.
    Receiver(&'g mut Generator),
    /// The call has no meaningful return value.
    Unit,
    /// A terminal call's product.
    Built(Built),
    /// A value returned by a default method.
    Value(Value),
}

impl<'g> Reply<'g> {
    pub fn is_receiver(&self) -> bool {
        matches!(self, Reply::Receiver(_))
    }

    pub fn into_receiver(self) -> Option<&'g mut Generator> {
        match self {
            Reply::Receiver(generator) => Some(generator),
            _ => None,
        }
    }

    pub fn into_built(self) -> Option<Built> {
        match self {
            Reply::Built(built) => Some(built),
            _ => None,
        }
    }
}

/// A live generator for one contract.
///
/// Bindings and the constructor override persist across builds; every build
/// replays them into a fresh visitor session and returns a new object.
/// Mutating calls take `&mut self`, so concurrent use must be serialized by
/// the caller, while builds only need `&self`.
pub struct Generator {
    contract: Arc<GeneratorContract>,
    catalog: Arc<Catalog>,
    bindings: BindingTable,
    constructor: Option<SharedInstanceProvider>,
}

impl Generator {
    pub(crate) fn new(contract: Arc<GeneratorContract>, catalog: Arc<Catalog>) -> Self {
        Self {
            contract,
            catalog,
            bindings: BindingTable::new(),
            constructor: None,
        }
    }

    pub fn contract(&self) -> &GeneratorContract {
        &self.contract
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn has_constructor_override(&self) -> bool {
        self.constructor.is_some()
    }

    /// Dispatches `call` with `args` against the contract.
    ///
    /// # Arguments
    ///
    /// * `call` - Method name as declared by the contract, or a terminal/constructor name
    /// * `args` - Call arguments
    ///
    /// # Returns
    ///
    /// The call's [`Reply`]: the built object for terminal calls, the same
    /// generator for chaining setters, nothing for the constructor and
    /// non-chaining setters, or whatever a default method returns.
    ///
    /// # Errors
    ///
    /// - `Configuration` for wrong arity, a non-instance-provider constructor argument or an undeclared method
    /// - `TargetTypeInference` for a terminal call on a contract with a generic terminal
    /// - `UnsupportedCall` for a terminal call whose argument is not a type
    /// - any build error for terminal calls
    pub fn handle(&mut self, call: &str, args: Vec<Arg>) -> Result<Reply<'_>, GeneratorError> {
        let is_terminal = self.contract.names().is_terminal(call);
        let is_constructor = self.contract.names().is_constructor(call);
        debug!(contract = %self.contract.name(), call = %call, args = args.len(), "dispatching generator call");

        if is_terminal {
            return self.handle_terminal(call, args).map(Reply::Built);
        }
        if is_constructor {
            self.handle_constructor(args)?;
            return Ok(Reply::Unit);
        }

        let contract = Arc::clone(&self.contract);
        if let Some(method) = contract.default_method(call) {
            trace!(contract = %contract.name(), method = %call, "forwarding to default method");
            return method.invoke(self, args);
        }
        self.handle_setter(call, args)
    }

    /// Binds a literal to `property`.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<&mut Self, GeneratorError> {
        self.handle(property, vec![Arg::Value(value.into())])?;
        Ok(self)
    }

    /// Binds a provider to `property`; it is invoked once per build.
    pub fn set_provider(&mut self, property: &str, provider: SharedProvider) -> Result<&mut Self, GeneratorError> {
        self.handle(property, vec![Arg::Provider(provider)])?;
        Ok(self)
    }

    /// Binds a closure to `property`; it is invoked once per build.
    pub fn set_with<F, V>(&mut self, property: &str, function: F) -> Result<&mut Self, GeneratorError>
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.set_provider(property, provider::from_fn(function))
    }

    /// Replaces the construction strategy with `provider`.
    pub fn constructor(&mut self, provider: SharedInstanceProvider) -> Result<&mut Self, GeneratorError> {
        let call = self.contract.names().constructor.clone();
        self.handle(&call, vec![Arg::Instances(provider)])?;
        Ok(self)
    }

    /// Builds the contract's declared target.
    pub fn build(&self) -> Result<Built, GeneratorError> {
        let call = self.contract.names().terminal.first().map(String::as_str).unwrap_or("build");
        self.handle_terminal(call, Vec::new())
    }

    /// Builds `target`, overriding the declared target for this call only.
    pub fn build_for(&self, target: TypeKey) -> Result<Built, GeneratorError> {
        let context = VisitContext::new(self.contract.name(), target, Arc::clone(&self.catalog.targets), self.naming());
        let mut visitor: Box<dyn GenerationVisitor> = match self.catalog.visitors.select(target, &self.catalog.targets) {
            Some(factory) => factory(&context),
            None => Box::new(StructuralVisitor::new(context)),
        };

        let strategy = match &self.constructor {
            Some(provider) => ConstructionStrategy::FromProvider(Arc::clone(provider)),
            None => ConstructionStrategy::Default(target),
        };
        debug!(
            contract = %self.contract.name(),
            target = %target,
            strategy = ?strategy,
            bindings = self.bindings.len(),
            "building target"
        );

        visitor.accept_construction(&strategy)?;
        for binding in self.bindings.iter() {
            visitor.accept_property(binding.name(), binding.declared(), binding.provider())?;
        }
        visitor.finish()
    }

    /// Builds `T` explicitly and takes the object out.
    pub fn build_as<T: Any>(&self) -> Result<T, GeneratorError> {
        let expected = TypeKey::of::<T>();
        self.build_for(expected)?.downcast::<T>().map_err(|built| GeneratorError::OutputType {
            contract: self.contract.name().to_string(),
            expected: expected.to_string(),
            found: built.target().to_string(),
        })
    }

    /// Builds the JSON document view of the current bindings.
    pub fn document(&self) -> Result<serde_json::Value, GeneratorError> {
        self.build_as::<serde_json::Value>()
    }

    /// Builds the JSON document view and encodes it as bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GeneratorError> {
        let document = self.document()?;
        serde_json::to_vec(&document).map_err(|error| GeneratorError::Serialization {
            contract: self.contract.name().to_string(),
            source: ValueError::Encoding(error.to_string()),
        })
    }

    /// Turns the generator into a provider of its JSON document.
    pub fn into_provider(self) -> GeneratorProvider {
        GeneratorProvider::new(self)
    }

    fn naming(&self) -> MutatorNaming {
        self.contract.naming().unwrap_or(self.catalog.naming)
    }

    fn configuration_error(&self, message: String) -> GeneratorError {
        GeneratorError::configuration(self.contract.name(), message)
    }

    fn handle_terminal(&self, call: &str, args: Vec<Arg>) -> Result<Built, GeneratorError> {
        match args.as_slice() {
            [] => {
                let target = self.contract.target().ok_or_else(|| GeneratorError::TargetTypeInference {
                    contract: self.contract.name().to_string(),
                    message: format!("'{call}' has a generic return type; pass the target type explicitly"),
                })?;
                self.build_for(target)
            }
            [Arg::Type(target)] => self.build_for(*target),
            other => Err(GeneratorError::UnsupportedCall {
                contract: self.contract.name().to_string(),
                call: call.to_string(),
                message: format!(
                    "expected no argument or a single type, got [{}]",
                    other.iter().map(Arg::describe).collect::<Vec<_>>().join(", ")
                ),
            }),
        }
    }

    fn handle_constructor(&mut self, args: Vec<Arg>) -> Result<(), GeneratorError> {
        let call = &self.contract.names().constructor;
        let provider = match <[Arg; 1]>::try_from(args) {
            Ok([Arg::Instances(provider)]) => provider,
            Ok([other]) => {
                return Err(self.configuration_error(format!(
                    "constructor method '{call}' takes an instance provider, got {}",
                    other.describe()
                )));
            }
            Err(args) => {
                return Err(self.configuration_error(format!(
                    "constructor method '{call}' should have exactly one parameter, got {}",
                    args.len()
                )));
            }
        };

        if self.constructor.replace(provider).is_some() {
            debug!(contract = %self.contract.name(), "replaced constructor override");
        }
        Ok(())
    }

    fn handle_setter(&mut self, call: &str, args: Vec<Arg>) -> Result<Reply<'_>, GeneratorError> {
        let Some(setter) = self.contract.setter(call) else {
            return Err(self.configuration_error(format!("contract declares no method '{call}'")));
        };
        let declared = setter.parameter().kind;
        let chains = setter.returns().chains();

        let provider = match <[Arg; 1]>::try_from(args) {
            Ok([Arg::Provider(provider)]) => provider,
            Ok([Arg::Value(value)]) => provider::constant(value),
            Ok([Arg::Type(key)]) => provider::constant(Value::object(key)),
            Ok([Arg::Instances(instances)]) => provider::constant(Value::object(instances)),
            Err(args) => {
                return Err(self.configuration_error(format!(
                    "setter method '{call}' should have exactly one parameter, got {}",
                    args.len()
                )));
            }
        };

        let replaced = self.bindings.bind(PropertyBinding::new(call, declared, provider));
        trace!(
            contract = %self.contract.name(),
            property = %call,
            declared = %declared,
            replaced = replaced.is_some(),
            "bound property"
        );

        Ok(if chains { Reply::Receiver(self) } else { Reply::Unit })
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("contract", &self.contract.name())
            .field("bindings", &self.bindings)
            .field("constructor_override", &self.constructor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use fluentgen_types::{GeneratorErrorKind, ValueKind};

    use super::*;
    use crate::{
        contract::{ParamType, ReturnType, SetterSpec},
        factory::GeneratorFactory,
    };

    fn generator() -> Generator {
        let contract = GeneratorContract::builder("DocumentGenerator")
            .builds::<serde_json::Value>()
            .property("name", ValueKind::Str)
            .method(SetterSpec::new("note", ParamType::value(ValueKind::Str)).returning(ReturnType::Unit))
            .build()
            .expect("contract");
        GeneratorFactory::new().create_generator(contract)
    }

    #[test]
    fn chaining_setters_return_the_receiver() {
        let mut generator = generator();
        let address: *const Generator = &generator;
        let reply = generator.handle("name", vec![Arg::value("Ana")]).expect("setter");
        let receiver = reply.into_receiver().expect("receiver");
        assert!(std::ptr::eq(receiver, address));
    }

    #[test]
    fn non_chaining_setters_return_unit() {
        let mut generator = generator();
        let reply = generator.handle("note", vec![Arg::value("hi")]).expect("setter");
        assert!(matches!(reply, Reply::Unit));
    }

    #[test]
    fn setter_arguments_are_validated() {
        let mut generator = generator();
        let missing = generator.handle("name", Vec::new()).expect_err("no argument");
        assert_eq!(missing.kind(), GeneratorErrorKind::Configuration);

        let extra = generator
            .handle("name", vec![Arg::value("a"), Arg::value("b")])
            .expect_err("two arguments");
        assert!(extra.to_string().contains("exactly one parameter, got 2"));

        let undeclared = generator.handle("nickname", vec![Arg::value("x")]).expect_err("undeclared");
        assert!(undeclared.to_string().contains("declares no method 'nickname'"));
    }

    #[test]
    fn single_non_provider_arguments_bind_as_constants() {
        let contract = GeneratorContract::builder("KindGenerator")
            .builds::<serde_json::Value>()
            .property("kind", ValueKind::Any)
            .build()
            .expect("contract");
        let mut generator = GeneratorFactory::new().create_generator(contract);

        let reply = generator.handle("kind", vec![Arg::of_type::<String>()]).expect("type token binds");
        assert!(reply.is_receiver());

        let binding = generator.bindings().get("kind").expect("kind binding");
        match binding.provider().provide().expect("provide") {
            Value::Object(object) => assert_eq!(object.downcast_ref::<TypeKey>(), Some(&TypeKey::of::<String>())),
            other => panic!("unexpected value: {other:?}"),
        }

        generator
            .handle("kind", vec![Arg::Instances(provider::instances(|| Some(String::new())))])
            .expect("instance provider binds");
        assert!(matches!(
            generator.bindings().get("kind").expect("kind binding").provider().provide().expect("provide"),
            Value::Object(_)
        ));
    }

    #[test]
    fn constructor_requires_a_single_instance_provider() {
        let mut generator = generator();
        let wrong = generator.handle("constructor", vec![Arg::value(1)]).expect_err("literal");
        assert_eq!(wrong.kind(), GeneratorErrorKind::Configuration);

        let empty = generator.handle("constructor", Vec::new()).expect_err("no argument");
        assert!(empty.to_string().contains("exactly one parameter, got 0"));

        let reply = generator
            .handle("constructor", vec![Arg::Instances(provider::instances(|| Some(String::new())))])
            .expect("constructor");
        assert!(matches!(reply, Reply::Unit));
        assert!(generator.has_constructor_override());
    }

    #[test]
    fn terminal_calls_reject_non_type_arguments() {
        let mut generator = generator();
        let error = generator.handle("build", vec![Arg::value("Person")]).expect_err("unsupported");
        assert_eq!(error.kind(), GeneratorErrorKind::UnsupportedCall);
        assert!(error.to_string().contains("a string value"));
    }
}
