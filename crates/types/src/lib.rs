//! # fluentgen types
//!
//! Shared vocabulary of the fluentgen workspace:
//!
//! - **`value`**: dynamic [`Value`]s produced by value providers and their [`ValueKind`] tags
//! - **`type_key`**: runtime type identity used to name generator targets
//! - **`error`**: [`GeneratorError`] and the failures it wraps
//! - **`config`**: dispatch names and mutator naming conventions
//! - **`definition`**: serde model of declarative contract documents

pub mod config;
pub mod definition;
pub mod error;
pub mod type_key;
pub mod value;

pub use config::{DispatchNames, MutatorNaming};
pub use definition::{ContractDefinition, MethodDefinition, ParameterDefinition, ReturnDefinition};
pub use error::{GeneratorError, GeneratorErrorKind, ProviderError, TargetError, ValueError};
pub use type_key::TypeKey;
pub use value::{FromValue, Opaque, ParseValueKindError, Value, ValueKind};
