//! Declarative contract loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fluentgen_types::{ContractDefinition, GeneratorError, ReturnDefinition, ValueKind};
use tracing::debug;

use crate::{
    contract::{GeneratorContract, ParamType, ReturnType, SetterSpec},
    target::TargetRegistry,
};

/// Loads a contract definition file.
///
/// YAML is a superset of JSON, so both formats are parsed with the YAML reader
/// regardless of the file extension.
///
/// # Arguments
///
/// * `file_path` - Path to the definition file
///
/// # Errors
///
/// This function will return an error if:
/// - The file cannot be read from the filesystem
/// - The content is not a valid YAML or JSON contract definition
pub fn load_definition(file_path: impl AsRef<Path>) -> Result<ContractDefinition> {
    let file_path = file_path.as_ref();
    let file_content = fs::read_to_string(file_path).with_context(|| format!("Failed to read contract file: {}", file_path.display()))?;
    let definition: ContractDefinition = serde_yaml::from_str(&file_content)
        .with_context(|| format!("Failed to parse contract definition: {}", file_path.display()))?;
    debug!(contract = %definition.contract, path = %file_path.display(), "loaded contract definition");
    Ok(definition)
}

/// Converts a definition into a validated contract.
///
/// The optional `target` is looked up by registered name in `targets`; an
/// absent target leaves the terminal return unresolved, so terminal calls
/// must name the type explicitly.
///
/// # Errors
///
/// Returns [`GeneratorError::Configuration`] when the target name is unknown,
/// a method does not declare exactly one parameter, a parameter kind is not
/// recognized, or the contract fails builder validation.
pub fn contract_from_definition(definition: &ContractDefinition, targets: &TargetRegistry) -> Result<GeneratorContract, GeneratorError> {
    let invalid = |message: String| GeneratorError::configuration(definition.contract.clone(), message);

    let mut builder = GeneratorContract::builder(definition.contract.clone()).names(definition.names.clone());
    if let Some(naming) = definition.naming {
        builder = builder.naming(naming);
    }
    if let Some(target_name) = &definition.target {
        let target = targets
            .find_by_name(target_name)
            .ok_or_else(|| invalid(format!("target type '{target_name}' is not registered")))?;
        builder = builder.target(target.key());
    }

    for method in &definition.methods {
        let [parameter] = method.parameters.as_slice() else {
            return Err(invalid(format!(
                "setter method '{}' should have exactly one parameter, got {}",
                method.name,
                method.parameters.len()
            )));
        };
        let kind: ValueKind = parameter
            .r#type
            .parse()
            .map_err(|error| invalid(format!("method '{}': {error}", method.name)))?;
        let parameter = if parameter.provider {
            ParamType::provider(kind)
        } else {
            ParamType::value(kind)
        };
        let returns = match method.returns {
            ReturnDefinition::Contract => ReturnType::Contract,
            ReturnDefinition::Untyped => ReturnType::Untyped,
            ReturnDefinition::Unit => ReturnType::Unit,
        };
        builder = builder.method(SetterSpec::new(method.name.clone(), parameter).returning(returns));
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use fluentgen_types::{GeneratorErrorKind, MutatorNaming, TypeKey};

    use super::*;
    use crate::target::TargetType;

    struct Person;

    fn targets() -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        registry.register(TargetType::builder::<Person>().named("person").build());
        registry
    }

    #[test]
    fn test_load_definition_from_yaml_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("person.yaml");
        fs::write(
            &path,
            r#"
contract: PersonGenerator
target: person
naming: bean
methods:
  - name: name
    parameters: [{ type: string }]
  - name: age
    parameters: [{ type: int, provider: true }]
    returns: unit
"#,
        )
        .expect("write definition");

        let definition = load_definition(&path).expect("load definition");
        let contract = contract_from_definition(&definition, &targets()).expect("convert definition");

        assert_eq!(contract.name(), "PersonGenerator");
        assert_eq!(contract.target(), Some(TypeKey::of::<Person>()));
        assert_eq!(contract.naming(), Some(MutatorNaming::Bean));
        let age = contract.setter("age").expect("age");
        assert_eq!(age.parameter(), ParamType::provider(ValueKind::Int));
        assert_eq!(age.returns(), ReturnType::Unit);
    }

    #[test]
    fn test_load_definition_from_json_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("document.json");
        fs::write(&path, r#"{"contract": "Untargeted", "methods": [{"name": "title", "parameters": [{}]}]}"#).expect("write");

        let definition = load_definition(&path).expect("load definition");
        let contract = contract_from_definition(&definition, &targets()).expect("convert definition");
        assert_eq!(contract.target(), None);
        assert_eq!(contract.setter("title").expect("title").parameter().kind, ValueKind::Any);
    }

    #[test]
    fn test_load_definition_reports_missing_files() {
        let error = load_definition("/definitely/missing/contract.yaml").expect_err("missing file");
        assert!(error.to_string().contains("Failed to read contract file"));
    }

    #[test]
    fn test_definition_methods_must_take_one_parameter() {
        let definition: ContractDefinition = serde_yaml::from_str(
            r#"
contract: PersonGenerator
methods:
  - name: name
    parameters: [{ type: string }, { type: string }]
"#,
        )
        .expect("parse");

        let error = contract_from_definition(&definition, &targets()).expect_err("two parameters");
        assert_eq!(error.kind(), GeneratorErrorKind::Configuration);
        assert!(error.to_string().contains("exactly one parameter, got 2"));
    }

    #[test]
    fn test_definition_rejects_unknown_targets_and_kinds() {
        let unknown_target: ContractDefinition = serde_yaml::from_str("contract: X\ntarget: robot\n").expect("parse");
        let error = contract_from_definition(&unknown_target, &targets()).expect_err("unknown target");
        assert!(error.to_string().contains("'robot' is not registered"));

        let unknown_kind: ContractDefinition =
            serde_yaml::from_str("contract: X\nmethods:\n  - name: id\n    parameters: [{ type: uuid }]\n").expect("parse");
        let error = contract_from_definition(&unknown_kind, &targets()).expect_err("unknown kind");
        assert!(error.to_string().contains("unknown value kind 'uuid'"));
    }
}
