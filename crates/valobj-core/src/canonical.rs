//! # Canonical Bytes — Deterministic Encoding for Hashing
//!
//! `CanonicalBytes` is the only input accepted by [`crate::digest`]. It is
//! produced from the set fields of an instance sorted by name, so the
//! encoding does not depend on storage order.
//!
//! ## Encoding
//!
//! Each value is a one-byte tag followed by its payload:
//!
//! - `null` and booleans: tag only (booleans carry one byte);
//! - integers and floats: 8 big-endian bytes (floats by bit pattern, which
//!   matches the total-order equality used by `Value`);
//! - strings and names: a `u64` big-endian length, then UTF-8 bytes;
//! - tuples: element count, then each element;
//! - instances: record name, field count, then sorted `(name, value)` pairs.
//!
//! Lists, sets and mappings are mutable-container kinds and are rejected,
//! mirroring what the engine considers unhashable.

use crate::error::ObjectError;
use crate::instance::Instance;
use crate::value::Value;

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_STR: u8 = 4;
const TAG_TUPLE: u8 = 5;
const TAG_OBJECT: u8 = 6;

/// Bytes produced exclusively by canonical encoding of an instance.
///
/// The inner buffer is private; [`CanonicalBytes::of_instance`] is the only
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Encode the set fields of `instance`.
    ///
    /// # Errors
    ///
    /// Returns `ObjectError::Unhashable` naming the first field (in sorted
    /// order) whose value contains a list, set or mapping.
    pub fn of_instance(instance: &Instance) -> Result<Self, ObjectError> {
        let mut out = Vec::new();
        encode_instance(instance, &mut out)?;
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn encode_str(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(s.len() as u64).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn encode_instance(instance: &Instance, out: &mut Vec<u8>) -> Result<(), ObjectError> {
    out.push(TAG_OBJECT);
    encode_str(instance.type_name(), out);
    let entries = instance.fields().sorted_entries();
    out.extend_from_slice(&(entries.len() as u64).to_be_bytes());
    for (name, value) in entries {
        encode_str(name, out);
        encode_value(value, out).map_err(|kind| ObjectError::Unhashable {
            record: instance.type_name().to_string(),
            field: name.to_string(),
            kind,
        })?;
    }
    Ok(())
}

/// Encode one value; the error is the unhashable kind found.
fn encode_value(value: &Value, out: &mut Vec<u8>) -> Result<(), String> {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*b));
        }
        Value::Int(i) => {
            out.push(TAG_INT);
            out.extend_from_slice(&i.to_be_bytes());
        }
        Value::Float(x) => {
            out.push(TAG_FLOAT);
            out.extend_from_slice(&x.to_bits().to_be_bytes());
        }
        Value::Str(s) => {
            out.push(TAG_STR);
            encode_str(s, out);
        }
        Value::Tuple(items) => {
            out.push(TAG_TUPLE);
            out.extend_from_slice(&(items.len() as u64).to_be_bytes());
            for item in items {
                encode_value(item, out)?;
            }
        }
        Value::Object(nested) => {
            // A nested failure is reported against the outer field.
            encode_instance(nested, out).map_err(|e| match e {
                ObjectError::Unhashable { kind, .. } => kind,
                other => other.to_string(),
            })?;
        }
        Value::List(_) | Value::Set(_) | Value::Map(_) => {
            return Err(value.kind().as_str().to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping;
    use crate::schema::{FieldType, RecordType};

    #[test]
    fn test_storage_order_does_not_matter() {
        let record = RecordType::builder("P")
            .partial(true)
            .frozen(false)
            .field("a", FieldType::Int)
            .field("b", FieldType::Int)
            .build()
            .unwrap();
        let mut x = Instance::new(&record, mapping! { "b" => 2 }).unwrap();
        x.set("a", 1).unwrap();
        let y = Instance::new(&record, mapping! { "a" => 1, "b" => 2 }).unwrap();
        assert_eq!(
            CanonicalBytes::of_instance(&x).unwrap(),
            CanonicalBytes::of_instance(&y).unwrap()
        );
    }

    #[test]
    fn test_list_field_is_unhashable() {
        let record = RecordType::builder("L")
            .field("items", FieldType::list())
            .build()
            .unwrap();
        let l = Instance::new(&record, mapping! { "items" => Value::list([1]) }).unwrap();
        assert_eq!(
            CanonicalBytes::of_instance(&l).unwrap_err(),
            ObjectError::Unhashable {
                record: "L".into(),
                field: "items".into(),
                kind: "list".into(),
            }
        );
    }

    #[test]
    fn test_tuple_inside_nested_instance_is_hashable() {
        let inner = RecordType::builder("Inner")
            .field("t", FieldType::tuple())
            .build()
            .unwrap();
        let outer = RecordType::builder("Outer")
            .field("i", FieldType::object(&inner))
            .build()
            .unwrap();
        let i = Instance::new(&inner, mapping! { "t" => Value::tuple([1, 2]) }).unwrap();
        let o = Instance::new(&outer, mapping! { "i" => i }).unwrap();
        let bytes = CanonicalBytes::of_instance(&o).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_set_nested_in_tuple_is_unhashable() {
        let record = RecordType::builder("T")
            .field("t", FieldType::tuple())
            .build()
            .unwrap();
        let t = Instance::new(&record, mapping! { "t" => Value::tuple([Value::set([1])]) }).unwrap();
        assert!(matches!(
            CanonicalBytes::of_instance(&t),
            Err(ObjectError::Unhashable { ref kind, .. }) if kind == "set"
        ));
    }
}
