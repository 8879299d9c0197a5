//! # Per-Type Schema Cache
//!
//! Rust types can stand for record types by implementing [`Declare`]. The
//! declaration runs on first use and the resulting `Arc<RecordType>` is
//! cached for the life of the process, keyed by `TypeId`.
//!
//! ```
//! use std::sync::Arc;
//! use valobj_core::{mapping, Declare, FieldType, RecordType, SchemaError};
//!
//! struct Person;
//!
//! impl Declare for Person {
//!     fn declare() -> Result<Arc<RecordType>, SchemaError> {
//!         RecordType::builder("Person")
//!             .field("name", FieldType::Str)
//!             .field("age", FieldType::Int)
//!             .build()
//!     }
//! }
//!
//! let p = Person::construct(mapping! { "name" => "John", "age" => 42 }).unwrap();
//! assert_eq!(p.to_string(), r#"Person(name="John", age=42)"#);
//! ```
//!
//! ## Thread Safety
//!
//! The cache sits behind an `RwLock`. `declare()` runs without the lock
//! held, so declarations may themselves look up nested types. If two
//! threads race on first use, the first inserted record type wins and both
//! get the same `Arc`, keeping type identity stable.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::codec::{CodecRegistry, Format};
use crate::error::{ObjectError, SchemaError};
use crate::instance::Instance;
use crate::schema::RecordType;
use crate::value::Mapping;

type Cache = RwLock<HashMap<TypeId, Arc<RecordType>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// A Rust type that declares a record type.
pub trait Declare: Sized + 'static {
    /// Build the record type. Called at most once per successful first use.
    ///
    /// # Errors
    ///
    /// Any `SchemaError` from the builder.
    fn declare() -> Result<Arc<RecordType>, SchemaError>;

    /// The cached record type.
    ///
    /// # Errors
    ///
    /// The `SchemaError` from [`Declare::declare`] on first use.
    fn record_type() -> Result<Arc<RecordType>, SchemaError> {
        schema_of::<Self>()
    }

    /// Direct construction.
    ///
    /// # Errors
    ///
    /// Declaration or construction errors.
    fn construct(fields: Mapping) -> Result<Instance, ObjectError> {
        Instance::new(&Self::record_type()?, fields)
    }

    /// Construction from a decoded mapping, with recovery coercions.
    ///
    /// # Errors
    ///
    /// Declaration or construction errors.
    fn from_mapping(mapping: Mapping) -> Result<Instance, ObjectError> {
        Instance::from_mapping(&Self::record_type()?, mapping)
    }

    /// Decode text and construct with recovery coercions.
    ///
    /// # Errors
    ///
    /// Declaration, codec or construction errors.
    fn from_text(codecs: &CodecRegistry, format: Format, text: &str) -> Result<Instance, ObjectError> {
        Instance::from_text(&Self::record_type()?, codecs, format, text)
    }
}

/// The record type declared by `T`, computed on first use and cached.
///
/// # Errors
///
/// The `SchemaError` from `T::declare()`. Failures are not cached.
pub fn schema_of<T: Declare>() -> Result<Arc<RecordType>, SchemaError> {
    let id = TypeId::of::<T>();
    if let Some(record) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Ok(Arc::clone(record));
    }

    let declared = T::declare()?;
    let mut guard = cache().write().unwrap_or_else(PoisonError::into_inner);
    let record = guard.entry(id).or_insert_with(|| {
        tracing::debug!(rust_type = type_name::<T>(), record = %declared.name(), "cached record type");
        declared
    });
    Ok(Arc::clone(record))
}
