//! Dispatch configuration: which call names are special and how property names
//! map onto target mutators.

use heck::{ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// Names the dispatch engine treats specially instead of as property setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchNames {
    /// Calls that materialize the target. `build` and `get` by default.
    pub terminal: Vec<String>,
    /// Call that overrides the construction strategy with an instance provider.
    pub constructor: String,
}

impl Default for DispatchNames {
    fn default() -> Self {
        Self {
            terminal: vec!["build".to_string(), "get".to_string()],
            constructor: "constructor".to_string(),
        }
    }
}

impl DispatchNames {
    pub fn is_terminal(&self, call: &str) -> bool {
        self.terminal.iter().any(|name| name == call)
    }

    pub fn is_constructor(&self, call: &str) -> bool {
        self.constructor == call
    }

    /// True when `call` is reserved and cannot be declared as a property method.
    pub fn is_reserved(&self, call: &str) -> bool {
        self.is_terminal(call) || self.is_constructor(call)
    }
}

/// Convention used by the structural visitor to derive a mutator name from a
/// property name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutatorNaming {
    /// `firstName` → `set_first_name`
    #[default]
    SnakeCase,
    /// `firstName` → `setFirstName`
    Bean,
    /// `firstName` → `firstName`
    Verbatim,
}

impl MutatorNaming {
    pub fn mutator_name(&self, property: &str) -> String {
        match self {
            MutatorNaming::SnakeCase => format!("set_{}", property.to_snake_case()),
            MutatorNaming::Bean => format!("set{}", property.to_upper_camel_case()),
            MutatorNaming::Verbatim => property.to_string(),
        }
    }
}
