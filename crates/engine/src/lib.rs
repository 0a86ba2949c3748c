//! # fluentgen engine
//!
//! Runtime dispatch engine for fluent builder "generators". A caller describes
//! a builder contract (chained setter-style methods plus a terminal `build`)
//! and obtains a [`Generator`] whose calls are classified, recorded as property
//! bindings, and replayed into a generation visitor on every build.
//!
//! ## Usage
//!
//! ```rust
//! use fluentgen_engine::{GeneratorContract, GeneratorFactory, TargetType};
//! use fluentgen_types::ValueKind;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! let factory = GeneratorFactory::builder()
//!     .target(
//!         TargetType::builder::<Person>()
//!             .default_constructible()
//!             .mutator("set_name", |person: &mut Person, name: String| person.name = name)
//!             .mutator("set_age", |person: &mut Person, age: i32| person.age = age)
//!             .build(),
//!     )
//!     .build();
//!
//! let contract = GeneratorContract::builder("PersonGenerator")
//!     .builds::<Person>()
//!     .property("name", ValueKind::Str)
//!     .property("age", ValueKind::Int)
//!     .build()?;
//!
//! let mut generator = factory.create_generator(contract);
//! generator.set("name", "Ana")?.set("age", 30)?;
//!
//! let person: Person = generator.build_as()?;
//! assert_eq!(person, Person { name: "Ana".into(), age: 30 });
//!
//! let document = generator.document()?;
//! assert_eq!(document, serde_json::json!({"name": "Ana", "age": 30}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`dispatch`**: The generator and its call classification
//! - **`contract`**: Contract declarations and validation
//! - **`binding`**: Last-write-wins property binding table
//! - **`provider`**: Value and instance providers
//! - **`construction`**: Blank-constructor and provider-backed construction strategies
//! - **`visitor`**: Structural and document visitors plus visitor selection
//! - **`target`**: Capability tables describing target types
//! - **`factory`**: Generator factory owning the shared registries
//! - **`definition`**: YAML/JSON contract definitions
//! - **`collection`**: List generation from providers

pub mod binding;
pub mod collection;
pub mod construction;
pub mod contract;
pub mod definition;
pub mod dispatch;
pub mod factory;
pub mod provider;
pub mod target;
pub mod visitor;

// Re-export commonly used types for convenience
pub use binding::{BindingTable, PropertyBinding};
pub use collection::CollectionGenerator;
pub use construction::ConstructionStrategy;
pub use contract::{ContractBuilder, DefaultMethod, GeneratorContract, ParamType, ReturnType, SetterSpec};
pub use definition::{contract_from_definition, load_definition};
pub use dispatch::{Arg, Generator, Reply};
pub use factory::{DOCUMENT_TARGET, GeneratorFactory, GeneratorFactoryBuilder};
pub use provider::{GeneratorProvider, InstanceProvider, SharedInstanceProvider, SharedProvider, ValueProvider};
pub use target::{Mutator, TargetRegistry, TargetType, TargetTypeBuilder};
pub use visitor::{Built, DocumentVisitor, GenerationVisitor, StructuralVisitor, VisitContext, VisitorFactory, VisitorRegistry};
