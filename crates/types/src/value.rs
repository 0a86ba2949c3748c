//! Dynamic values flowing through generators.
//!
//! A [`Value`] is what a value provider yields and what a property binding
//! hands to a mutator or to the document visitor. [`ValueKind`] is the value's
//! runtime type tag; contracts declare parameter kinds with it and the
//! structural visitor falls back to the runtime kind when the declared one has
//! no matching mutator.

use std::{any::Any, fmt, str::FromStr, sync::Arc};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::{error::ValueError, type_key::TypeKey};

/// Runtime type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Accepts any value. Used for untyped parameters.
    Any,
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    /// Opaque object of a concrete Rust type.
    Object(TypeKey),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Any => f.write_str("any"),
            ValueKind::Null => f.write_str("null"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Int => f.write_str("int"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Str => f.write_str("string"),
            ValueKind::List => f.write_str("list"),
            ValueKind::Map => f.write_str("map"),
            ValueKind::Object(key) => write!(f, "object<{key}>"),
        }
    }
}

/// Error returned when a kind name in a contract definition is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value kind '{0}'")]
pub struct ParseValueKindError(pub String);

impl FromStr for ValueKind {
    type Err = ParseValueKindError;

    /// Parses the kind names accepted in declarative contract definitions.
    ///
    /// Object kinds cannot be named textually; they are only available to
    /// contracts assembled in code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "object" => Ok(ValueKind::Any),
            "null" => Ok(ValueKind::Null),
            "bool" | "boolean" => Ok(ValueKind::Bool),
            "int" | "integer" | "long" => Ok(ValueKind::Int),
            "float" | "double" | "number" => Ok(ValueKind::Float),
            "str" | "string" => Ok(ValueKind::Str),
            "list" | "array" => Ok(ValueKind::List),
            "map" | "document" => Ok(ValueKind::Map),
            other => Err(ParseValueKindError(other.to_string())),
        }
    }
}

/// Shared handle to an arbitrary Rust object carried inside a [`Value`].
///
/// Objects are reference counted so a constant provider can hand out the same
/// object on every build. An optional JSON projection lets the document visitor
/// serialize objects that are not JSON themselves.
#[derive(Clone)]
pub struct Opaque {
    inner: Arc<dyn Any + Send + Sync>,
    type_key: TypeKey,
    projection: Option<serde_json::Value>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_key: TypeKey::of::<T>(),
            projection: None,
        }
    }

    /// Wraps `value` and records its JSON form for document output.
    pub fn serializable<T: Any + Send + Sync + Serialize>(value: T) -> Result<Self, serde_json::Error> {
        let projection = serde_json::to_value(&value)?;
        Ok(Self {
            projection: Some(projection),
            ..Self::new(value)
        })
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn projection(&self) -> Option<&serde_json::Value> {
        self.projection.as_ref()
    }

    fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        if let Some(document) = self.downcast_ref::<serde_json::Value>() {
            return Ok(document.clone());
        }
        self.projection.clone().ok_or(ValueError::Unserializable {
            type_name: self.type_key.name(),
        })
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type", &self.type_key.name())
            .field("projection", &self.projection)
            .finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A dynamically typed value produced by a value provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(Opaque),
}

impl Value {
    /// Wraps an arbitrary object.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(Opaque::new(value))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Object(opaque) => ValueKind::Object(opaque.type_key()),
        }
    }

    /// Serializes the value, recursing into lists, maps and object projections.
    ///
    /// # Errors
    ///
    /// Fails when the value contains a non-finite float or an object without a
    /// JSON projection.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(flag) => serde_json::Value::Bool(*flag),
            Value::Int(number) => serde_json::Value::from(*number),
            Value::Float(number) => serde_json::Number::from_f64(*number)
                .map(serde_json::Value::Number)
                .ok_or(ValueError::NonFiniteFloat(*number))?,
            Value::Str(text) => serde_json::Value::String(text.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect::<Result<_, _>>()?),
            Value::Map(entries) => {
                let mut object = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    object.insert(key.clone(), value.to_json()?);
                }
                serde_json::Value::Object(object)
            }
            Value::Object(opaque) => opaque.to_json()?,
        })
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(integer) => Value::Int(integer),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(text) => Value::Str(text),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(entries) => Value::Map(entries.into_iter().map(|(key, value)| (key, Value::from(value))).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Opaque> for Value {
    fn from(value: Opaque) -> Self {
        Value::Object(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a [`Value`] into a typed mutator parameter.
///
/// [`FromValue::value_kind`] is the kind a mutator taking `Self` is registered
/// under, which is what the structural visitor matches against.
pub trait FromValue: Sized {
    fn value_kind() -> ValueKind;

    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch(expected: ValueKind, found: &Value) -> ValueError {
    ValueError::Mismatch {
        expected: expected.to_string(),
        found: found.kind(),
    }
}

impl FromValue for Value {
    fn value_kind() -> ValueKind {
        ValueKind::Any
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn value_kind() -> ValueKind {
        ValueKind::Str
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(text) => Ok(text),
            other => Err(mismatch(ValueKind::Str, &other)),
        }
    }
}

impl FromValue for bool {
    fn value_kind() -> ValueKind {
        ValueKind::Bool
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(flag) => Ok(flag),
            other => Err(mismatch(ValueKind::Bool, &other)),
        }
    }
}

impl FromValue for i64 {
    fn value_kind() -> ValueKind {
        ValueKind::Int
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(number) => Ok(number),
            other => Err(mismatch(ValueKind::Int, &other)),
        }
    }
}

macro_rules! narrowing_int {
    ($($target:ty),*) => {
        $(
            impl FromValue for $target {
                fn value_kind() -> ValueKind {
                    ValueKind::Int
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let number = i64::from_value(value)?;
                    <$target>::try_from(number).map_err(|_| ValueError::OutOfRange {
                        value: number,
                        target: stringify!($target),
                    })
                }
            }
        )*
    };
}

narrowing_int!(i32, u32, u64, usize);

impl FromValue for f64 {
    fn value_kind() -> ValueKind {
        ValueKind::Float
    }

    /// Integers widen to floats, mirroring primitive widening on mutator calls.
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(number) => Ok(number),
            Value::Int(number) => Ok(number as f64),
            other => Err(mismatch(ValueKind::Float, &other)),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn value_kind() -> ValueKind {
        ValueKind::List
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(ValueKind::List, &other)),
        }
    }
}

impl FromValue for IndexMap<String, Value> {
    fn value_kind() -> ValueKind {
        ValueKind::Map
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Map(entries) => Ok(entries),
            other => Err(mismatch(ValueKind::Map, &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn value_kind() -> ValueKind {
        T::value_kind()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for serde_json::Value {
    fn value_kind() -> ValueKind {
        ValueKind::Any
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.to_json()
    }
}
