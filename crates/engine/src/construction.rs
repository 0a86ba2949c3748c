//! Construction strategies.

use std::fmt;

use fluentgen_types::{GeneratorError, TypeKey};
use tracing::trace;

use crate::{
    provider::{Instance, SharedInstanceProvider},
    visitor::VisitContext,
};

/// How the structural visitor obtains a fresh target instance.
///
/// A generator without a constructor override builds with `Default` for the
/// resolved target; the constructor call swaps in `FromProvider`.
#[derive(Clone)]
pub enum ConstructionStrategy {
    /// Use the blank constructor registered for the type.
    Default(TypeKey),
    /// Ask the caller-supplied provider for an instance.
    FromProvider(SharedInstanceProvider),
}

impl ConstructionStrategy {
    /// Produces a new instance.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Instantiation`] when the type is not
    /// registered, has no blank constructor, its constructor fails, or the
    /// instance provider returns nothing.
    pub fn construct(&self, context: &VisitContext) -> Result<Instance, GeneratorError> {
        let instantiation = |message: String| GeneratorError::Instantiation {
            contract: context.contract().to_string(),
            target: context.target().to_string(),
            message,
            source: None,
        };

        match self {
            ConstructionStrategy::Default(key) => {
                trace!(contract = %context.contract(), target = %key, "constructing target with blank constructor");
                let target = context
                    .targets()
                    .get(*key)
                    .ok_or_else(|| instantiation(format!("type {} is not registered as a target", key.name())))?;
                match target.construct() {
                    Some(Ok(instance)) => Ok(instance),
                    Some(Err(source)) => Err(GeneratorError::Instantiation {
                        contract: context.contract().to_string(),
                        target: context.target().to_string(),
                        message: "blank constructor failed".to_string(),
                        source: Some(source),
                    }),
                    None => Err(instantiation(format!("type {} has no accessible blank constructor", key.name()))),
                }
            }
            ConstructionStrategy::FromProvider(provider) => {
                trace!(contract = %context.contract(), target = %context.target(), "constructing target from instance provider");
                provider
                    .instantiate()
                    .ok_or_else(|| instantiation("provided instance provider returned no instance".to_string()))
            }
        }
    }
}

impl fmt::Debug for ConstructionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionStrategy::Default(key) => f.debug_tuple("Default").field(key).finish(),
            ConstructionStrategy::FromProvider(_) => f.write_str("FromProvider(..)"),
        }
    }
}
