//! Target type capability tables.
//!
//! Rust has no runtime reflection, so each type a generator can materialize is
//! registered with a [`TargetType`]: its blank constructor (if any), the
//! mutators the structural visitor may call, and the supertypes it can be
//! treated as when a visitor is selected.
//!
//! ```rust
//! use fluentgen_engine::TargetType;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! let person = TargetType::builder::<Person>()
//!     .default_constructible()
//!     .mutator("set_name", |person: &mut Person, name: String| person.name = name)
//!     .mutator("set_age", |person: &mut Person, age: i32| person.age = age)
//!     .build();
//! assert_eq!(person.name(), "Person");
//! ```

use std::{any::Any, fmt, marker::PhantomData, sync::Arc};

use fluentgen_types::{FromValue, TargetError, TypeKey, Value, ValueError, ValueKind};
use indexmap::IndexMap;

use crate::provider::Instance;

type BlankConstructor = Arc<dyn Fn() -> Result<Instance, TargetError> + Send + Sync>;
type MutatorFn = Arc<dyn Fn(&mut (dyn Any + Send), Value) -> Result<(), TargetError> + Send + Sync>;

/// A named mutator accepting one parameter of a given kind.
#[derive(Clone)]
pub struct Mutator {
    name: String,
    parameter: ValueKind,
    apply: MutatorFn,
}

impl Mutator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter(&self) -> ValueKind {
        self.parameter
    }

    /// Applies the mutator to `instance`.
    ///
    /// # Errors
    ///
    /// Fails when `instance` is not of the registered type, when `value`
    /// cannot be converted to the parameter type, or when the mutator itself
    /// rejects the value.
    pub fn invoke(&self, instance: &mut (dyn Any + Send), value: Value) -> Result<(), TargetError> {
        (self.apply)(instance, value)
    }
}

impl fmt::Debug for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("name", &self.name)
            .field("parameter", &self.parameter)
            .finish_non_exhaustive()
    }
}

/// Capability table of one target type.
#[derive(Clone)]
pub struct TargetType {
    key: TypeKey,
    name: String,
    blank: Option<BlankConstructor>,
    mutators: IndexMap<String, Vec<Mutator>>,
    supertypes: Vec<TypeKey>,
}

impl TargetType {
    pub fn builder<T: Any + Send>() -> TargetTypeBuilder<T> {
        TargetTypeBuilder {
            target: TargetType {
                key: TypeKey::of::<T>(),
                name: TypeKey::of::<T>().short_name().to_string(),
                blank: None,
                mutators: IndexMap::new(),
                supertypes: Vec::new(),
            },
            _target: PhantomData,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Registered name, used by declarative contract definitions.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_blank_constructor(&self) -> bool {
        self.blank.is_some()
    }

    /// Runs the blank constructor, or returns `None` when the type has none.
    pub fn construct(&self) -> Option<Result<Instance, TargetError>> {
        self.blank.as_ref().map(|blank| blank())
    }

    /// Finds the mutator `name` whose parameter kind is exactly `parameter`.
    pub fn find_mutator(&self, name: &str, parameter: ValueKind) -> Option<&Mutator> {
        self.mutators
            .get(name)?
            .iter()
            .find(|mutator| mutator.parameter == parameter)
    }

    /// All overloads registered under `name`.
    pub fn mutators_named(&self, name: &str) -> &[Mutator] {
        self.mutators.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_assignable_to(&self, other: TypeKey) -> bool {
        self.key == other || self.supertypes.contains(&other)
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetType")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("blank", &self.blank.is_some())
            .field("mutators", &self.mutators.values().flatten().collect::<Vec<_>>())
            .field("supertypes", &self.supertypes)
            .finish()
    }
}

/// Typed builder for a [`TargetType`] capability table.
pub struct TargetTypeBuilder<T> {
    target: TargetType,
    _target: PhantomData<fn() -> T>,
}

impl<T: Any + Send> TargetTypeBuilder<T> {
    /// Overrides the registered name (defaults to the short type name).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.target.name = name.into();
        self
    }

    /// Registers `T::default` as the blank constructor.
    pub fn default_constructible(self) -> Self
    where
        T: Default,
    {
        self.blank(T::default)
    }

    pub fn blank<F>(self, constructor: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.try_blank(move || Ok(constructor()))
    }

    /// Registers a blank constructor that may fail.
    pub fn try_blank<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Result<T, TargetError> + Send + Sync + 'static,
    {
        self.target.blank = Some(Arc::new(move || constructor().map(|instance| Box::new(instance) as Instance)));
        self
    }

    /// Registers an infallible mutator taking a [`FromValue`] parameter.
    pub fn mutator<V, F>(self, name: impl Into<String>, apply: F) -> Self
    where
        V: FromValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.try_mutator(name, move |target: &mut T, value: V| {
            apply(target, value);
            Ok(())
        })
    }

    /// Registers a mutator that can reject its argument.
    pub fn try_mutator<V, F>(self, name: impl Into<String>, apply: F) -> Self
    where
        V: FromValue + 'static,
        F: Fn(&mut T, V) -> Result<(), TargetError> + Send + Sync + 'static,
    {
        self.push_mutator(name.into(), V::value_kind(), V::from_value, apply)
    }

    /// Registers a mutator taking an opaque object of type `V`.
    ///
    /// The mutator is matched under [`ValueKind::Object`] and receives a clone
    /// of the object carried by the bound value.
    pub fn object_mutator<V, F>(self, name: impl Into<String>, apply: F) -> Self
    where
        V: Any + Clone + Send + Sync,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let parameter = ValueKind::Object(TypeKey::of::<V>());
        let convert = move |value: Value| {
            let found = value.kind();
            let object = match value {
                Value::Object(object) => object.downcast_ref::<V>().cloned(),
                _ => None,
            };
            object.ok_or(ValueError::Mismatch {
                expected: parameter.to_string(),
                found,
            })
        };
        self.push_mutator(name.into(), parameter, convert, move |target: &mut T, value: V| {
            apply(target, value);
            Ok(())
        })
    }

    /// Declares that `T` can stand in for `U` when visitors are selected.
    pub fn assignable_to<U: Any + ?Sized>(mut self) -> Self {
        self.target.supertypes.push(TypeKey::of::<U>());
        self
    }

    pub fn build(self) -> TargetType {
        self.target
    }

    fn push_mutator<V, C, F>(mut self, name: String, parameter: ValueKind, convert: C, apply: F) -> Self
    where
        C: Fn(Value) -> Result<V, ValueError> + Send + Sync + 'static,
        F: Fn(&mut T, V) -> Result<(), TargetError> + Send + Sync + 'static,
    {
        let expected = std::any::type_name::<T>();
        let invoke: MutatorFn = Arc::new(move |instance: &mut (dyn Any + Send), value: Value| {
            let receiver = instance.downcast_mut::<T>().ok_or(TargetError::Receiver { expected })?;
            let argument = convert(value)?;
            apply(receiver, argument)
        });

        let overloads = self.target.mutators.entry(name.clone()).or_default();
        overloads.retain(|existing| existing.parameter != parameter);
        overloads.push(Mutator {
            name,
            parameter,
            apply: invoke,
        });
        self
    }
}

/// Registry of target capability tables keyed by type.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    types: IndexMap<TypeKey, TargetType>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target`, replacing a previous table for the same type.
    pub fn register(&mut self, target: TargetType) -> Option<TargetType> {
        self.types.insert(target.key, target)
    }

    pub fn get(&self, key: TypeKey) -> Option<&TargetType> {
        self.types.get(&key)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TargetType> {
        self.types.values().find(|target| target.name == name)
    }

    /// True when `source` equals `target` or is registered as assignable to it.
    pub fn is_assignable(&self, source: TypeKey, target: TypeKey) -> bool {
        source == target || self.get(source).is_some_and(|registered| registered.is_assignable_to(target))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
