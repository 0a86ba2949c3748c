//! Error types shared by the dispatch engine and its collaborators.
//!
//! [`GeneratorError`] is the single error surfaced by generator calls. Every
//! variant names the contract that raised it so callers juggling several
//! generators can tell failures apart. The smaller enums describe failures of
//! the pieces a generator delegates to (value conversion, target mutators and
//! value providers) and are attached as `source` where they apply.

use thiserror::Error;

use crate::value::ValueKind;

/// Failure converting a [`crate::Value`] into a typed Rust value or into JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("expected a {expected} value but found {found}")]
    Mismatch { expected: String, found: ValueKind },
    #[error("integer {value} does not fit into {target}")]
    OutOfRange { value: i64, target: &'static str },
    #[error("floating point value {0} has no JSON representation")]
    NonFiniteFloat(f64),
    #[error("object of type {type_name} has no serializable projection")]
    Unserializable { type_name: &'static str },
    #[error("failed to encode JSON: {0}")]
    Encoding(String),
}

/// Failure raised by a target type's blank constructor or one of its mutators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TargetError {
    /// The mutator was handed an instance of a different type than it was registered for.
    #[error("mutator expects a receiver of type {expected}")]
    Receiver { expected: &'static str },
    /// The bound value could not be converted into the mutator's parameter type.
    #[error("invalid argument: {0}")]
    Argument(#[from] ValueError),
    /// The mutator or constructor rejected the call on its own terms.
    #[error("{0}")]
    Failed(String),
}

impl TargetError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Failure raised while a value provider produces its value.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A nested generator used as a provider failed to build.
    #[error(transparent)]
    Generator(#[from] Box<GeneratorError>),
    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<GeneratorError> for ProviderError {
    fn from(error: GeneratorError) -> Self {
        Self::Generator(Box::new(error))
    }
}

/// Coarse classification of a [`GeneratorError`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorErrorKind {
    Configuration,
    TargetTypeInference,
    UnsupportedCall,
    Instantiation,
    Binding,
    Invocation,
    Serialization,
    OutputType,
    Provider,
}

/// Error produced by generator calls and builds.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The contract or a call against it is malformed (wrong arity, undeclared
    /// method, invalid declaration).
    #[error("error when working with generator {contract}: {message}")]
    Configuration { contract: String, message: String },

    /// A terminal call without an explicit type hit a contract whose terminal
    /// return type is unresolved.
    #[error("error when working with generator {contract}: can't infer model type. {message}")]
    TargetTypeInference { contract: String, message: String },

    /// A terminal call received an argument that is not a type.
    #[error("error when working with generator {contract}: can't handle call '{call}'. {message}")]
    UnsupportedCall { contract: String, call: String, message: String },

    /// The active construction strategy failed to produce an instance.
    #[error("error when working with generator {contract}: can't instantiate {target}. {message}")]
    Instantiation {
        contract: String,
        target: String,
        message: String,
        #[source]
        source: Option<TargetError>,
    },

    /// No mutator accepts a bound property.
    #[error("error when working with generator {contract}: can't bind property '{property}'. {message}")]
    Binding { contract: String, property: String, message: String },

    /// A mutator was found but failed when invoked.
    #[error("error when working with generator {contract}: invoking {mutator} on {target} failed")]
    Invocation {
        contract: String,
        target: String,
        mutator: String,
        #[source]
        source: TargetError,
    },

    /// The document visitor produced a value with no JSON form.
    #[error("error when working with generator {contract}: document can't be serialized")]
    Serialization {
        contract: String,
        #[source]
        source: ValueError,
    },

    /// A typed build helper received an object of another type than requested.
    #[error("error when working with generator {contract}: built {found} where {expected} was requested")]
    OutputType { contract: String, expected: String, found: String },

    /// A value provider bound to a property failed.
    #[error("error when working with generator {contract}: provider for property '{property}' failed")]
    Provider {
        contract: String,
        property: String,
        #[source]
        source: ProviderError,
    },
}

impl GeneratorError {
    pub fn configuration(contract: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            contract: contract.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> GeneratorErrorKind {
        match self {
            Self::Configuration { .. } => GeneratorErrorKind::Configuration,
            Self::TargetTypeInference { .. } => GeneratorErrorKind::TargetTypeInference,
            Self::UnsupportedCall { .. } => GeneratorErrorKind::UnsupportedCall,
            Self::Instantiation { .. } => GeneratorErrorKind::Instantiation,
            Self::Binding { .. } => GeneratorErrorKind::Binding,
            Self::Invocation { .. } => GeneratorErrorKind::Invocation,
            Self::Serialization { .. } => GeneratorErrorKind::Serialization,
            Self::OutputType { .. } => GeneratorErrorKind::OutputType,
            Self::Provider { .. } => GeneratorErrorKind::Provider,
        }
    }

    /// Name of the contract whose generator raised the error.
    pub fn contract(&self) -> &str {
        match self {
            Self::Configuration { contract, .. }
            | Self::TargetTypeInference { contract, .. }
            | Self::UnsupportedCall { contract, .. }
            | Self::Instantiation { contract, .. }
            | Self::Binding { contract, .. }
            | Self::Invocation { contract, .. }
            | Self::Serialization { contract, .. }
            | Self::OutputType { contract, .. }
            | Self::Provider { contract, .. } => contract,
        }
    }
}
