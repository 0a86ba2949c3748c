//! Value providers: zero-argument sources of property values.
//!
//! Modules:
//! - `instance`: Instance providers backing the constructor override
//! - `generator`: Adapter exposing a generator's document output as a provider
//!
//! Providers are re-invoked on every build, so a provider that returns a fresh
//! value each time yields distinct values across builds of the same generator.

mod generator;
mod instance;

use std::{fmt, sync::Arc};

use fluentgen_types::{ProviderError, Value};

pub use generator::GeneratorProvider;
pub use instance::{Instance, InstanceFn, InstanceProvider, SharedInstanceProvider, instances};

/// Trait defining a source of values for property bindings.
pub trait ValueProvider: Send + Sync {
    /// Produces the value bound to a property for one build.
    fn provide(&self) -> Result<Value, ProviderError>;
}

/// Reference-counted provider as stored in binding tables.
pub type SharedProvider = Arc<dyn ValueProvider>;

/// Provider returning a clone of the same value on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantProvider {
    value: Value,
}

impl ConstantProvider {
    pub fn new(value: impl Into<Value>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl ValueProvider for ConstantProvider {
    fn provide(&self) -> Result<Value, ProviderError> {
        Ok(self.value.clone())
    }
}

/// Provider backed by a closure.
pub struct FnProvider<F> {
    function: F,
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

impl<F> ValueProvider for FnProvider<F>
where
    F: Fn() -> Result<Value, ProviderError> + Send + Sync,
{
    fn provide(&self) -> Result<Value, ProviderError> {
        (self.function)()
    }
}

/// Wraps a literal into a shared constant provider.
pub fn constant(value: impl Into<Value>) -> SharedProvider {
    Arc::new(ConstantProvider::new(value))
}

/// Builds a shared provider from an infallible closure.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use fluentgen_engine::provider::{self, ValueProvider};
/// use fluentgen_types::Value;
///
/// let counter = AtomicI64::new(0);
/// let sequence = provider::from_fn(move || counter.fetch_add(1, Ordering::SeqCst) + 1);
/// assert_eq!(sequence.provide()?, Value::Int(1));
/// assert_eq!(sequence.provide()?, Value::Int(2));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn from_fn<F, V>(function: F) -> SharedProvider
where
    F: Fn() -> V + Send + Sync + 'static,
    V: Into<Value>,
{
    Arc::new(FnProvider {
        function: move || -> Result<Value, ProviderError> { Ok(function().into()) },
    })
}

/// Builds a shared provider from a fallible closure.
pub fn try_from_fn<F>(function: F) -> SharedProvider
where
    F: Fn() -> Result<Value, ProviderError> + Send + Sync + 'static,
{
    Arc::new(FnProvider { function })
}
