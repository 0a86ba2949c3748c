//! Declarative contract definitions.
//!
//! A contract can be assembled in code or described in a YAML/JSON document
//! such as:
//!
//! ```yaml
//! contract: PersonGenerator
//! target: person
//! naming: snake_case
//! methods:
//!   - name: name
//!     parameters: [{ type: string }]
//!   - name: age
//!     parameters: [{ type: int, provider: true }]
//!     returns: unit
//! ```
//!
//! These types only describe the document; the engine turns them into a
//! runnable contract and validates them against its registered target types.

use serde::{Deserialize, Serialize};

use crate::config::{DispatchNames, MutatorNaming};

/// Top-level contract document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDefinition {
    /// Contract name, reported in every error its generators raise.
    pub contract: String,
    /// Registered name of the terminal return type. Absent means the target
    /// must be supplied explicitly on each terminal call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub names: DispatchNames,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming: Option<MutatorNaming>,
    #[serde(default)]
    pub methods: Vec<MethodDefinition>,
}

/// A property method of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub returns: ReturnDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Value kind name (`string`, `int`, `float`, `bool`, `list`, `map`, `any`).
    #[serde(default = "default_parameter_type")]
    pub r#type: String,
    /// Whether the parameter is declared as a value provider.
    #[serde(default)]
    pub provider: bool,
}

fn default_parameter_type() -> String {
    "any".to_string()
}

/// Declared return of a property method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnDefinition {
    /// Returns the contract, so calls chain.
    #[default]
    Contract,
    /// Returns an untyped value; still chains.
    Untyped,
    /// Returns nothing.
    Unit,
}
