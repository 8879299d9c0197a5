//! # Record Types and Schemas
//!
//! A `RecordType` is the declaration of one kind of value object: its name,
//! the ordered list of fields with their declared types, and the policy
//! flags that govern construction and mutation.
//!
//! ## Invariants
//!
//! - A record type is immutable once built and shared as `Arc<RecordType>`.
//! - Field names are unique, non-empty, and never start with `_` (that
//!   prefix is reserved for engine bookkeeping slots on instances).
//! - Declared defaults satisfy their field type when types are enforced.
//! - Every built record type gets a process-unique [`TypeKey`]. Two record
//!   types are the same type iff their keys match, regardless of name.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::value::Value;

/// Returns true for names reserved for engine bookkeeping.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with('_')
}

static NEXT_TYPE_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u64);

impl TypeKey {
    fn next() -> Self {
        Self(NEXT_TYPE_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

// ─── Field Types ─────────────────────────────────────────────────────

/// Declared type of a field.
///
/// Container variants carry an element type; `Any` as the element type
/// means only the container kind is checked.
#[derive(Clone, Debug)]
pub enum FieldType {
    /// Untyped: accepts every value.
    Any,
    Bool,
    Int,
    Float,
    Str,
    List(Box<FieldType>),
    Tuple(Box<FieldType>),
    Set(Box<FieldType>),
    /// String-keyed mapping; the inner type applies to values.
    Map(Box<FieldType>),
    /// Nested value object of the given record type.
    Object(Arc<RecordType>),
}

impl FieldType {
    /// List of anything.
    pub fn list() -> Self {
        Self::List(Box::new(Self::Any))
    }

    /// Tuple of anything.
    pub fn tuple() -> Self {
        Self::Tuple(Box::new(Self::Any))
    }

    /// Set of anything.
    pub fn set() -> Self {
        Self::Set(Box::new(Self::Any))
    }

    /// Mapping of anything.
    pub fn map() -> Self {
        Self::Map(Box::new(Self::Any))
    }

    pub fn list_of(element: FieldType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn tuple_of(element: FieldType) -> Self {
        Self::Tuple(Box::new(element))
    }

    pub fn set_of(element: FieldType) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn map_of(element: FieldType) -> Self {
        Self::Map(Box::new(element))
    }

    pub fn object(record: &Arc<RecordType>) -> Self {
        Self::Object(Arc::clone(record))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true if `value` has this type, checking container elements
    /// against a non-`Any` element type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) => true,
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Str, Value::Str(_)) => true,
            (Self::List(inner), Value::List(items)) | (Self::Tuple(inner), Value::Tuple(items)) => {
                inner.is_any() || items.iter().all(|v| inner.accepts(v))
            }
            (Self::Set(inner), Value::Set(items)) => {
                inner.is_any() || items.iter().all(|v| inner.accepts(v))
            }
            (Self::Map(inner), Value::Map(map)) => {
                inner.is_any() || map.iter().all(|(_, v)| inner.accepts(v))
            }
            (Self::Object(record), Value::Object(instance)) => {
                instance.record_type().key() == record.key()
            }
            _ => false,
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any)
            | (Self::Bool, Self::Bool)
            | (Self::Int, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::Str, Self::Str) => true,
            (Self::List(a), Self::List(b))
            | (Self::Tuple(a), Self::Tuple(b))
            | (Self::Set(a), Self::Set(b))
            | (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.key() == b.key(),
            _ => false,
        }
    }
}

impl Eq for FieldType {}

fn write_container(f: &mut fmt::Formatter<'_>, name: &str, inner: &FieldType) -> fmt::Result {
    if inner.is_any() {
        f.write_str(name)
    } else {
        write!(f, "{name}<{inner}>")
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::List(inner) => write_container(f, "list", inner),
            Self::Tuple(inner) => write_container(f, "tuple", inner),
            Self::Set(inner) => write_container(f, "set", inner),
            Self::Map(inner) => write_container(f, "map", inner),
            Self::Object(record) => f.write_str(record.name()),
        }
    }
}

// ─── Fields, Schema, Policy ──────────────────────────────────────────

/// One declared field.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    name: String,
    ty: FieldType,
    default: Option<Value>,
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// A field is required unless it declares a default.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered field declarations of a record type.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Per-type policy flags, fixed at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypePolicy {
    /// Instances reject assignment once constructed.
    pub frozen: bool,
    /// Values are checked against declared field types at construction.
    pub enforce_types: bool,
    /// Construction may omit fields; omitted fields stay unset.
    pub partial: bool,
}

impl Default for TypePolicy {
    fn default() -> Self {
        Self {
            frozen: true,
            enforce_types: true,
            partial: false,
        }
    }
}

// ─── Record Type ─────────────────────────────────────────────────────

/// Declaration of a value-object type.
#[derive(Debug)]
pub struct RecordType {
    key: TypeKey,
    name: String,
    schema: Schema,
    policy: TypePolicy,
}

impl RecordType {
    /// Start declaring a record type.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            policy: TypePolicy::default(),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn policy(&self) -> TypePolicy {
        self.policy
    }

    /// Schema field names in declaration order.
    pub fn attributes(&self) -> Vec<&str> {
        self.schema.names().collect()
    }
}

/// Builder for [`RecordType`].
#[derive(Debug, Clone)]
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    policy: TypePolicy,
}

impl RecordTypeBuilder {
    /// Declare a required field.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// Declare a field that falls back to `default` when not supplied.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            ty,
            default: Some(default.into()),
        });
        self
    }

    pub fn policy(mut self, policy: TypePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.policy.frozen = frozen;
        self
    }

    pub fn enforce_types(mut self, enforce: bool) -> Self {
        self.policy.enforce_types = enforce;
        self
    }

    pub fn partial(mut self, partial: bool) -> Self {
        self.policy.partial = partial;
        self
    }

    /// Validate the declaration and produce the shared record type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` for an empty record or field name, a duplicated
    /// or reserved field name, or a default that fails its declared type
    /// while types are enforced.
    pub fn build(self) -> Result<Arc<RecordType>, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName { record: self.name });
        }

        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName { record: self.name });
            }
            if is_reserved(&field.name) {
                return Err(SchemaError::ReservedName {
                    record: self.name,
                    field: field.name.clone(),
                });
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    record: self.name,
                    field: field.name.clone(),
                });
            }
            if let Some(default) = &field.default {
                if self.policy.enforce_types && !field.ty.accepts(default) {
                    return Err(SchemaError::InvalidDefault {
                        record: self.name,
                        field: field.name.clone(),
                        expected: field.ty.to_string(),
                        actual: default.type_name(),
                    });
                }
            }
        }

        let record = RecordType {
            key: TypeKey::next(),
            name: self.name,
            schema: Schema {
                fields: self.fields,
            },
            policy: self.policy,
        };
        tracing::debug!(
            record = %record.name,
            fields = record.schema.len(),
            policy = ?record.policy,
            "declared record type"
        );
        Ok(Arc::new(record))
    }
}
