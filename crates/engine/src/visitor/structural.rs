use fluentgen_types::{GeneratorError, ValueKind};
use tracing::trace;

use super::{Built, GenerationVisitor, VisitContext};
use crate::{
    construction::ConstructionStrategy,
    provider::{Instance, ValueProvider},
};

/// Visitor that instantiates the target and applies one mutator per binding.
///
/// The mutator name comes from the context's naming convention. Lookup tries
/// the kind the contract declared first, then the runtime kind of the produced
/// value, so a property declared as `any` still reaches a typed mutator.
#[derive(Debug)]
pub struct StructuralVisitor {
    context: VisitContext,
    instance: Option<Instance>,
}

impl StructuralVisitor {
    pub fn new(context: VisitContext) -> Self {
        Self { context, instance: None }
    }

    fn binding_error(&self, property: &str, message: String) -> GeneratorError {
        GeneratorError::Binding {
            contract: self.context.contract().to_string(),
            property: property.to_string(),
            message,
        }
    }
}

impl GenerationVisitor for StructuralVisitor {
    fn accept_construction(&mut self, strategy: &ConstructionStrategy) -> Result<(), GeneratorError> {
        self.instance = Some(strategy.construct(&self.context)?);
        Ok(())
    }

    fn accept_property(&mut self, name: &str, declared: ValueKind, provider: &dyn ValueProvider) -> Result<(), GeneratorError> {
        let mutator_name = self.context.naming().mutator_name(name);
        let value = self.context.resolve(name, provider)?;
        let runtime = value.kind();

        let Some(target) = self.context.targets().get(self.context.target()) else {
            return Err(self.binding_error(
                name,
                format!("type {} is not registered as a target", self.context.target().name()),
            ));
        };
        let Some(mutator) = target
            .find_mutator(&mutator_name, declared)
            .or_else(|| target.find_mutator(&mutator_name, runtime))
        else {
            return Err(self.binding_error(
                name,
                format!("can't find mutator {mutator_name} which takes parameter {declared} or {runtime}"),
            ));
        };

        let Some(instance) = self.instance.as_mut() else {
            return Err(self.binding_error(name, "no instance was constructed before binding".to_string()));
        };

        trace!(
            contract = %self.context.contract(),
            property = %name,
            mutator = %mutator_name,
            parameter = %mutator.parameter(),
            "applying mutator"
        );
        mutator
            .invoke(instance.as_mut(), value)
            .map_err(|source| GeneratorError::Invocation {
                contract: self.context.contract().to_string(),
                target: self.context.target().to_string(),
                mutator: mutator_name.clone(),
                source,
            })
    }

    fn finish(self: Box<Self>) -> Result<Built, GeneratorError> {
        let target = self.context.target();
        match self.instance {
            Some(instance) => Ok(Built::from_instance(target, instance)),
            None => Err(GeneratorError::Instantiation {
                contract: self.context.contract().to_string(),
                target: target.to_string(),
                message: "visitor finished without a constructed instance".to_string(),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fluentgen_types::{GeneratorErrorKind, MutatorNaming, TypeKey};

    use super::*;
    use crate::{
        provider,
        target::{TargetRegistry, TargetType},
    };

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        name: String,
        age: i32,
    }

    fn visitor() -> StructuralVisitor {
        let mut registry = TargetRegistry::new();
        registry.register(
            TargetType::builder::<Person>()
                .default_constructible()
                .mutator("set_name", |person: &mut Person, name: String| person.name = name)
                .mutator("set_age", |person: &mut Person, age: i32| person.age = age)
                .build(),
        );
        let context = VisitContext::new("PersonGenerator", TypeKey::of::<Person>(), Arc::new(registry), MutatorNaming::SnakeCase);
        StructuralVisitor::new(context)
    }

    #[test]
    fn applies_mutators_found_by_declared_kind() {
        let mut visitor = visitor();
        visitor
            .accept_construction(&ConstructionStrategy::Default(TypeKey::of::<Person>()))
            .expect("construct");
        visitor
            .accept_property("name", ValueKind::Str, provider::constant("Ana").as_ref())
            .expect("name");
        visitor
            .accept_property("age", ValueKind::Int, provider::constant(30).as_ref())
            .expect("age");

        let person = Box::new(visitor).finish().expect("finish").downcast::<Person>().expect("person");
        assert_eq!(person, Person { name: "Ana".into(), age: 30 });
    }

    #[test]
    fn falls_back_to_the_runtime_kind_of_the_value() {
        let mut visitor = visitor();
        visitor
            .accept_construction(&ConstructionStrategy::Default(TypeKey::of::<Person>()))
            .expect("construct");
        visitor
            .accept_property("name", ValueKind::Any, provider::constant("Ana").as_ref())
            .expect("runtime kind lookup");

        let person = Box::new(visitor).finish().expect("finish").downcast::<Person>().expect("person");
        assert_eq!(person.name, "Ana");
    }

    #[test]
    fn missing_mutators_are_binding_errors() {
        let mut visitor = visitor();
        visitor
            .accept_construction(&ConstructionStrategy::Default(TypeKey::of::<Person>()))
            .expect("construct");
        let error = visitor
            .accept_property("nickname", ValueKind::Str, provider::constant("Annie").as_ref())
            .expect_err("no set_nickname");

        assert_eq!(error.kind(), GeneratorErrorKind::Binding);
        assert!(error.to_string().contains("set_nickname"));
    }

    #[test]
    fn failing_mutators_are_invocation_errors() {
        let mut visitor = visitor();
        visitor
            .accept_construction(&ConstructionStrategy::Default(TypeKey::of::<Person>()))
            .expect("construct");
        let error = visitor
            .accept_property("age", ValueKind::Int, provider::constant(i64::MAX).as_ref())
            .expect_err("overflow");

        assert_eq!(error.kind(), GeneratorErrorKind::Invocation);
    }
}
