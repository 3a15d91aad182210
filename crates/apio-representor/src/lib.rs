//! # Apio Representor
//!
//! Declarative description of how a resource is represented: its semantic
//! types, identifier, typed fields, links and relations.
//!
//! A [`RepresentorBuilder`] collects extractor functions and produces an
//! immutable [`Representor`] that renderers query through its getters.
//! Bidirectional relations cross resource boundaries through a
//! [`RelationRegistry`].
//!
//! ## Example
//!
//! ```
//! use apio_representor::{Language, RepresentorBuilder};
//!
//! struct Person { id: i64, name: String, greeting: String }
//!
//! let people = RepresentorBuilder::<Person, i64>::new()
//!     .types(["Person"])
//!     .identifier(|p: &Person| p.id)
//!     .add_string("name", |p: &Person| p.name.clone())
//!     .add_localized_string("greeting", |p: &Person, language: &Language| {
//!         format!("{} ({})", p.greeting, language.primary())
//!     })
//!     .build();
//!
//! let person = Person { id: 1, name: "Ada".into(), greeting: "Hello".into() };
//! let greeting = people.localized("greeting", &person, &Language::new("en-GB"));
//! assert_eq!(greeting.as_deref(), Some("Hello (en)"));
//! ```

#![doc(html_root_url = "https://docs.rs/apio-representor/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod field;
mod registry;
mod related;
mod representor;

pub use builder::{ExtrasSupplier, RepresentorBuilder};
pub use field::{
    format_date, FieldFunction, IdentifierFunction, Language, LocalizedFunction, Number,
};
pub use registry::{ignore_relations, RelationCallback, RelationRegistry, ReverseRelation};
pub use related::{
    CollectionIdentifierFunction, ModelFunction, RelatedCollection, RelatedModel, RelationKind,
    TargetIdentifierFunction,
};
pub use representor::{FieldMap, Representor};
