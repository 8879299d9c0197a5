//! # valobj-core — Schema-Driven Value Objects
//!
//! Declares record types (ordered, typed fields plus policy flags) and
//! builds runtime-validated instances of them that round-trip through text
//! formats without losing tuples, sets or nested instances.
//!
//! ## Components
//!
//! - [`schema`] — `RecordType`, `FieldType`, `TypePolicy`: the declaration
//!   surface. [`registry`] caches declarations per Rust type.
//! - [`construct`] — typed construction with explicit
//!   [`ConstructionMode`]: direct, or recovered from a decoded format.
//! - [`instance`] — the value object itself: guarded mutation, equality,
//!   ordering, canonical string form, membership and iteration.
//! - [`export`] — flattening to a plain [`Mapping`] and the text entry
//!   points that go through a [`Codec`].
//! - [`canonical`] / [`digest`] — deterministic encoding and SHA-256
//!   fingerprints used as the instance hash.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `valobj-*` crates; concrete codecs live in
//!   `valobj-codec`.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Errors are returned at the point of violation; construction is
//!   all-or-nothing.

pub mod canonical;
pub mod codec;
pub mod construct;
pub mod digest;
pub mod error;
pub mod export;
pub mod instance;
pub mod registry;
pub mod schema;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use codec::{Codec, CodecRegistry, EncodeStyle, Format};
pub use construct::{recover_value, ConstructionMode};
pub use digest::{sha256_fingerprint, Fingerprint};
pub use error::{CodecError, ObjectError, SchemaError};
pub use instance::Instance;
pub use registry::{schema_of, Declare};
pub use schema::{is_reserved, FieldSpec, FieldType, RecordType, RecordTypeBuilder, Schema, TypeKey, TypePolicy};
pub use value::{Mapping, Value, ValueKind};
