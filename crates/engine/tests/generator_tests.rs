use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use fluentgen_engine::{
    Arg, GeneratorContract, GeneratorFactory, ParamType, Reply, ReturnType, SetterSpec, TargetType, provider,
};
use fluentgen_types::{GeneratorErrorKind, TargetError, TypeKey, Value, ValueKind};
use serde_json::json;

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: String,
    age: i32,
}

#[allow(dead_code)]
struct Immutable {
    name: String,
}

fn factory() -> GeneratorFactory {
    GeneratorFactory::builder()
        .target(
            TargetType::builder::<Person>()
                .default_constructible()
                .mutator("set_name", |person: &mut Person, name: String| person.name = name)
                .mutator("set_age", |person: &mut Person, age: i32| person.age = age)
                .try_mutator("set_age", |person: &mut Person, age: String| {
                    person.age = age.parse().map_err(|_| TargetError::failed(format!("'{age}' is not an age")))?;
                    Ok(())
                })
                .build(),
        )
        .target(TargetType::builder::<Immutable>().build())
        .build()
}

fn person_contract() -> GeneratorContract {
    GeneratorContract::builder("PersonGenerator")
        .builds::<Person>()
        .property("name", ValueKind::Str)
        .property("age", ValueKind::Int)
        .build()
        .expect("person contract")
}

fn generic_contract() -> GeneratorContract {
    GeneratorContract::builder("ModelGenerator")
        .property("name", ValueKind::Any)
        .property("age", ValueKind::Any)
        .build()
        .expect("generic contract")
}

#[test]
fn builds_a_person_from_bound_literals() {
    let mut generator = factory().create_generator(person_contract());
    generator.set("name", "Ana").expect("name").set("age", 30).expect("age");

    let built = generator.handle("build", Vec::new()).expect("build").into_built().expect("built");
    assert_eq!(built.target(), TypeKey::of::<Person>());
    assert_eq!(built.downcast::<Person>().expect("person"), Person { name: "Ana".into(), age: 30 });
}

#[test]
fn get_is_an_alias_for_build() {
    let mut generator = factory().create_generator(person_contract());
    generator.set("name", "Ana").expect("name");

    let built = generator.handle("get", Vec::new()).expect("get").into_built().expect("built");
    assert_eq!(built.downcast::<Person>().expect("person").name, "Ana");
}

#[test]
fn builds_are_idempotent_and_independent() {
    let mut generator = factory().create_generator(person_contract());
    generator.set("name", "Ana").expect("name").set("age", 30).expect("age");

    let first = generator.build_as::<Person>().expect("first build");
    let mut second = generator.build_as::<Person>().expect("second build");
    assert_eq!(first, second);

    second.name.push_str(" Maria");
    assert_eq!(first.name, "Ana");
    assert_eq!(generator.build_as::<Person>().expect("third build").name, "Ana");
}

#[test]
fn last_write_wins_for_repeated_properties() {
    let mut generator = factory().create_generator(person_contract());
    generator.set("name", "X").expect("first").set("name", "Y").expect("second");

    assert_eq!(generator.bindings().len(), 1);
    assert_eq!(generator.build_as::<Person>().expect("build").name, "Y");
}

#[test]
fn providers_are_invoked_once_per_build() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut generator = factory().create_generator(person_contract());
    generator
        .set_with("name", move || format!("person-{}", counter.fetch_add(1, Ordering::SeqCst)))
        .expect("name provider");

    let first = generator.build_as::<Person>().expect("first");
    let second = generator.build_as::<Person>().expect("second");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(first.name, "person-0");
    assert_eq!(second.name, "person-1");
}

#[test]
fn chaining_setters_hand_back_the_same_generator() {
    let mut generator = factory().create_generator(person_contract());
    let address: *const _ = &generator;

    let reply = generator.handle("name", vec![Arg::value("Ana")]).expect("setter");
    let receiver = reply.into_receiver().expect("chaining reply");
    assert!(std::ptr::eq(receiver, address));

    let reply = receiver.handle("age", vec![Arg::value(30)]).expect("chained setter");
    assert!(reply.is_receiver());
}

#[test]
fn non_chaining_setters_still_bind() {
    let contract = GeneratorContract::builder("PersonGenerator")
        .builds::<Person>()
        .method(SetterSpec::new("name", ParamType::value(ValueKind::Str)).returning(ReturnType::Unit))
        .method(SetterSpec::new("age", ParamType::value(ValueKind::Int)).returning(ReturnType::Type(TypeKey::of::<String>())))
        .build()
        .expect("contract");
    let mut generator = factory().create_generator(contract);

    assert!(matches!(generator.handle("name", vec![Arg::value("Ana")]).expect("name"), Reply::Unit));
    assert!(matches!(generator.handle("age", vec![Arg::value(30)]).expect("age"), Reply::Unit));
    assert_eq!(generator.build_as::<Person>().expect("build"), Person { name: "Ana".into(), age: 30 });
}

#[test]
fn explicit_target_overrides_the_declared_one_for_one_call() {
    let mut generator = factory().create_generator(person_contract());
    generator.set("name", "Ana").expect("name").set("age", 30).expect("age");

    let document = generator
        .handle("build", vec![Arg::of_type::<serde_json::Value>()])
        .expect("document build")
        .into_built()
        .expect("built")
        .downcast::<serde_json::Value>()
        .expect("json");
    assert_eq!(document, json!({"name": "Ana", "age": 30}));

    let person = generator.build().expect("declared build").downcast::<Person>().expect("person");
    assert_eq!(person.name, "Ana");
}

#[test]
fn document_builds_never_touch_the_declared_target() {
    let touches = Arc::new(AtomicUsize::new(0));
    let (on_blank, on_name, on_age) = (Arc::clone(&touches), Arc::clone(&touches), Arc::clone(&touches));
    let factory = GeneratorFactory::builder()
        .target(
            TargetType::builder::<Person>()
                .blank(move || {
                    on_blank.fetch_add(1, Ordering::SeqCst);
                    Person::default()
                })
                .mutator("set_name", move |person: &mut Person, name: String| {
                    on_name.fetch_add(1, Ordering::SeqCst);
                    person.name = name;
                })
                .mutator("set_age", move |person: &mut Person, age: i32| {
                    on_age.fetch_add(1, Ordering::SeqCst);
                    person.age = age;
                })
                .build(),
        )
        .build();
    let mut generator = factory.create_generator(person_contract());
    generator.set("name", "Ana").expect("name").set("age", 30).expect("age");

    let document = generator.build_for(TypeKey::of::<serde_json::Value>()).expect("document build");
    assert_eq!(document.downcast::<serde_json::Value>().expect("json"), json!({"name": "Ana", "age": 30}));
    assert_eq!(touches.load(Ordering::SeqCst), 0);

    generator.build_as::<Person>().expect("structural build");
    assert_eq!(touches.load(Ordering::SeqCst), 3);
}

#[test]
fn generic_contracts_require_an_explicit_target() {
    let mut generator = factory().create_generator(generic_contract());
    generator.set("name", "Ana").expect("name").set("age", 30).expect("age");

    let error = generator.handle("build", Vec::new()).expect_err("inference");
    assert_eq!(error.kind(), GeneratorErrorKind::TargetTypeInference);
    assert_eq!(error.contract(), "ModelGenerator");

    let person = generator
        .handle("build", vec![Arg::of_type::<Person>()])
        .expect("explicit build")
        .into_built()
        .expect("built")
        .downcast::<Person>()
        .expect("person");
    assert_eq!(person, Person { name: "Ana".into(), age: 30 });
}

#[test]
fn terminal_calls_reject_non_type_arguments() {
    let mut generator = factory().create_generator(person_contract());
    let error = generator.handle("build", vec![Arg::value("Person")]).expect_err("unsupported");
    assert_eq!(error.kind(), GeneratorErrorKind::UnsupportedCall);

    let error = generator
        .handle("build", vec![Arg::of_type::<Person>(), Arg::of_type::<Person>()])
        .expect_err("two types");
    assert_eq!(error.kind(), GeneratorErrorKind::UnsupportedCall);
}

#[test]
fn setters_with_two_arguments_are_configuration_errors() {
    let mut generator = factory().create_generator(person_contract());
    let error = generator
        .handle("name", vec![Arg::value("a"), Arg::value("b")])
        .expect_err("two arguments");

    assert_eq!(error.kind(), GeneratorErrorKind::Configuration);
    assert!(error.to_string().contains("exactly one parameter, got 2"));
    assert!(generator.bindings().is_empty());
}

#[test]
fn constructor_override_supplies_instances() {
    let mut generator = factory().create_generator(person_contract());
    generator
        .constructor(provider::instances(|| Some(Person { name: "Seed".into(), age: 1 })))
        .expect("constructor")
        .set("age", 40)
        .expect("age");

    assert_eq!(generator.build_as::<Person>().expect("build"), Person { name: "Seed".into(), age: 40 });
}

#[test]
fn repeated_constructor_calls_keep_the_last_provider() {
    let mut generator = factory().create_generator(person_contract());
    generator
        .constructor(provider::instances(|| Some(Person { name: "First".into(), age: 1 })))
        .expect("first")
        .constructor(provider::instances(|| Some(Person { name: "Second".into(), age: 2 })))
        .expect("second");

    assert_eq!(generator.build_as::<Person>().expect("build").name, "Second");
}

#[test]
fn absent_constructor_results_are_instantiation_errors() {
    let mut generator = factory().create_generator(person_contract());
    generator.constructor(provider::instances(|| None::<Person>)).expect("constructor");

    let error = generator.build().expect_err("no instance");
    assert_eq!(error.kind(), GeneratorErrorKind::Instantiation);
}

#[test]
fn types_without_blank_constructor_fail_to_instantiate() {
    let contract = GeneratorContract::builder("ImmutableGenerator")
        .builds::<Immutable>()
        .property("name", ValueKind::Str)
        .build()
        .expect("contract");
    let mut generator = factory().create_generator(contract);
    generator.set("name", "Ana").expect("name");

    let error = generator.build().expect_err("no blank constructor");
    assert_eq!(error.kind(), GeneratorErrorKind::Instantiation);

    generator
        .constructor(provider::instances(|| Some(Immutable { name: String::new() })))
        .expect("constructor");
    let error = generator.build().expect_err("no mutator");
    assert_eq!(error.kind(), GeneratorErrorKind::Binding);
}

#[test]
fn runtime_kind_fallback_and_invocation_failures() {
    let contract = GeneratorContract::builder("PersonGenerator")
        .builds::<Person>()
        .property("age", ValueKind::Float)
        .build()
        .expect("contract");
    let mut generator = factory().create_generator(contract);

    generator.set("age", "41").expect("age as text");
    assert_eq!(generator.build_as::<Person>().expect("build").age, 41);

    generator.set("age", "old").expect("rebind age");
    let error = generator.build().expect_err("mutator rejects");
    assert_eq!(error.kind(), GeneratorErrorKind::Invocation);

    generator.set("age", 1.5).expect("rebind age");
    let error = generator.build().expect_err("no float mutator");
    assert_eq!(error.kind(), GeneratorErrorKind::Binding);
}

#[test]
fn default_methods_run_against_the_live_generator() {
    let contract = GeneratorContract::builder("PersonGenerator")
        .builds::<Person>()
        .property("name", ValueKind::Str)
        .property("age", ValueKind::Int)
        .default_method("adult", |generator, _args| {
            generator.set("age", 18)?;
            Ok(Reply::Receiver(generator))
        })
        .default_method("describe", |generator, _args| {
            let person = generator.build_as::<Person>()?;
            Ok(Reply::Value(Value::from(format!("{} ({})", person.name, person.age))))
        })
        .build()
        .expect("contract");
    let mut generator = factory().create_generator(contract);
    generator.set("name", "Ana").expect("name");

    assert!(generator.handle("adult", Vec::new()).expect("adult").is_receiver());
    match generator.handle("describe", Vec::new()).expect("describe") {
        Reply::Value(value) => assert_eq!(value, Value::from("Ana (18)")),
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[test]
fn provider_failures_carry_the_property_name() {
    let mut generator = factory().create_generator(person_contract());
    generator
        .set_provider("name", provider::try_from_fn(|| Err(fluentgen_types::ProviderError::failed("exhausted"))))
        .expect("provider");

    let error = generator.build().expect_err("provider fails");
    assert_eq!(error.kind(), GeneratorErrorKind::Provider);
    assert!(error.to_string().contains("'name'"));
}

#[test]
fn generators_are_shareable_across_threads_for_builds() {
    let mut generator = factory().create_generator(person_contract());
    generator.set("name", "Ana").expect("name");
    let generator = Arc::new(generator);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || generator.build_as::<Person>().expect("build").name)
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread"), "Ana");
    }
}
