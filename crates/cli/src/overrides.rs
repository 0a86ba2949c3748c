//! Property overrides given on the command line.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, bail};
use fluentgen_engine::{Generator, SharedProvider, provider};
use fluentgen_types::Value;

/// Splits a `key=value` argument.
fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("expected KEY=VALUE, got '{raw}'"),
    }
}

/// Interprets `raw` as JSON when it parses, otherwise as a plain string.
///
/// `30` binds an integer and `[1,2]` a list, while `Ana` stays a string.
pub fn parse_literal(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

/// Provider yielding `prefix1`, `prefix2`, ... on successive builds.
pub fn sequence(prefix: &str) -> SharedProvider {
    let prefix = prefix.to_string();
    let counter = AtomicU64::new(0);
    provider::from_fn(move || format!("{prefix}{}", counter.fetch_add(1, Ordering::SeqCst) + 1))
}

/// Binds every `--set` and `--sequence` argument to `generator`.
///
/// # Errors
///
/// Fails on a malformed `KEY=VALUE` pair or when the contract rejects the call.
pub fn apply<'a>(
    generator: &mut Generator,
    literals: impl IntoIterator<Item = &'a String>,
    sequences: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    for raw in literals {
        let (key, value) = split_assignment(raw)?;
        generator.set(key, parse_literal(value))?;
    }
    for raw in sequences {
        let (key, prefix) = split_assignment(raw)?;
        generator.set_provider(key, sequence(prefix))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use fluentgen_engine::{GeneratorContract, GeneratorFactory};
    use fluentgen_types::ValueKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn literals_prefer_json() {
        assert_eq!(parse_literal("30"), Value::Int(30));
        assert_eq!(parse_literal("true"), Value::Bool(true));
        assert_eq!(parse_literal("Ana"), Value::from("Ana"));
        assert_eq!(parse_literal("\"30\""), Value::from("30"));
    }

    #[test]
    fn assignments_need_a_key() {
        assert_eq!(split_assignment("name=a=b").expect("split"), ("name", "a=b"));
        assert!(split_assignment("=value").is_err());
        assert!(split_assignment("name").is_err());
    }

    #[test]
    fn apply_binds_literals_and_sequences() {
        let contract = GeneratorContract::builder("UserGenerator")
            .builds::<serde_json::Value>()
            .property("id", ValueKind::Any)
            .property("age", ValueKind::Any)
            .build()
            .expect("contract");
        let mut generator = GeneratorFactory::new().create_generator(contract);
        let literals = vec!["age=41".to_string()];
        let sequences = vec!["id=user-".to_string()];

        apply(&mut generator, &literals, &sequences).expect("apply");

        assert_eq!(generator.document().expect("first"), json!({"age": 41, "id": "user-1"}));
        assert_eq!(generator.document().expect("second"), json!({"age": 41, "id": "user-2"}));
    }
}
