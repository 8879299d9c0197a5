//! # valobj-schema — Declarative Record Catalogs
//!
//! Record types described as data instead of code. A catalog document
//! lists records with their fields, type expressions, defaults and policy
//! flags; [`SchemaCatalog`] turns it into shared `RecordType`s from
//! `valobj-core`, resolving references between records by name.
//!
//! ```
//! use valobj_core::{mapping, Instance};
//! use valobj_schema::SchemaCatalog;
//!
//! let catalog = SchemaCatalog::from_yaml(
//!     "records:\n  - name: Person\n    fields:\n      - { name: name, type: str }\n      - { name: age, type: int }\n",
//! )
//! .unwrap();
//! let person = catalog.get("Person").unwrap();
//! let p = Instance::new(&person, mapping! { "name" => "John", "age" => 42 }).unwrap();
//! assert_eq!(p.to_string(), r#"Person(name="John", age=42)"#);
//! ```
//!
//! ## Modules
//!
//! - [`descriptor`] — serde shapes of catalog documents.
//! - [`typeexpr`] — the `list<Person>` style type expression parser.
//! - [`catalog`] — the by-name catalog and dependency-order loading.
//!
//! ## Crate Policy
//!
//! - Depends only on `valobj-core` internally.
//! - Documents are a trust boundary: unknown keys, malformed type
//!   expressions and unresolvable references are rejected with the record
//!   and field they occur in.

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod typeexpr;

pub use catalog::SchemaCatalog;
pub use descriptor::{CatalogDocument, FieldDescriptor, RecordDescriptor};
pub use error::CatalogError;
pub use typeexpr::{TypeExpr, TypeExprError};
