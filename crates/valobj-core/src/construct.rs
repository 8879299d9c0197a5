//! # Instance Construction
//!
//! Builds instances from a field map, validating names, required fields,
//! and types, and applying recovery coercions when the map came from a
//! text codec.
//!
//! ## Construction Modes
//!
//! Text formats lose information: tuples and sets come back as lists, and
//! nested instances come back as plain mappings. In
//! [`ConstructionMode::Recovered`] those shapes are converted back to what
//! the schema declares before the type check runs:
//!
//! - list -> tuple or set, when the field declares a tuple or set;
//! - mapping -> nested instance, by recursively constructing the declared
//!   record type (also in recovered mode);
//! - elements of typed containers are recovered the same way.
//!
//! In [`ConstructionMode::Direct`] no coercion happens, so a list supplied
//! for a tuple field is a type mismatch. The mode is an explicit argument
//! threaded through every nested call; nothing about it is stored on the
//! record type or the instance.
//!
//! Construction is all-or-nothing. Values are staged in a local mapping and
//! the instance only exists once every field has passed.

use std::sync::Arc;

use crate::error::ObjectError;
use crate::instance::Instance;
use crate::schema::{FieldType, RecordType};
use crate::value::{Mapping, Value};

/// Where the field map handed to the constructor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionMode {
    /// Supplied by application code; no coercion.
    Direct,
    /// Decoded from a text format; recovery coercions apply.
    Recovered,
}

/// Construct an instance of `record` from `fields`.
///
/// # Errors
///
/// - `InvalidAttribute` for a supplied name outside the schema.
/// - `MissingAttribute` for an absent required field on a non-partial type.
/// - `TypeMismatch` for a value that fails its declared type after any
///   recovery coercion.
/// - Any error raised while reconstructing a nested instance.
pub fn construct(
    record: &Arc<RecordType>,
    mut fields: Mapping,
    mode: ConstructionMode,
) -> Result<Instance, ObjectError> {
    tracing::trace!(record = %record.name(), ?mode, supplied = fields.len(), "constructing instance");

    if let Some(unknown) = fields.keys().find(|k| !record.schema().contains(k)) {
        return Err(ObjectError::InvalidAttribute {
            record: record.name().to_string(),
            field: unknown.to_string(),
        });
    }

    let policy = record.policy();
    let mut staged = Mapping::with_capacity(record.schema().len());

    for spec in record.schema().iter() {
        let value = match fields.remove(spec.name()) {
            Some(value) => value,
            None => match spec.default() {
                Some(default) => default.clone(),
                None if policy.partial => continue,
                None => {
                    return Err(ObjectError::MissingAttribute {
                        record: record.name().to_string(),
                        field: spec.name().to_string(),
                    })
                }
            },
        };

        let value = match mode {
            ConstructionMode::Recovered => recover_value(spec.field_type(), value)?,
            ConstructionMode::Direct => value,
        };
        if policy.enforce_types {
            check_type(record, spec.name(), spec.field_type(), &value)?;
        }
        staged.insert(spec.name(), value);
    }

    Ok(Instance::from_parts(
        Arc::clone(record),
        staged,
        policy.frozen,
    ))
}

/// Apply recovery coercions to one value against its declared type.
///
/// Values that are already of the declared shape pass through, with
/// elements of typed containers recovered in turn.
///
/// # Errors
///
/// Propagates errors from reconstructing nested instances.
pub fn recover_value(expected: &FieldType, value: Value) -> Result<Value, ObjectError> {
    match (expected, value) {
        (FieldType::Tuple(inner), Value::List(items) | Value::Tuple(items)) => {
            Ok(Value::Tuple(recover_all(inner, items)?))
        }
        (FieldType::Set(inner), Value::List(items)) => Ok(Value::Set(
            recover_all(inner, items)?.into_iter().collect(),
        )),
        (FieldType::Set(inner), Value::Set(items)) if !inner.is_any() => Ok(Value::Set(
            recover_all(inner, items.into_iter().collect())?
                .into_iter()
                .collect(),
        )),
        (FieldType::List(inner), Value::List(items)) if !inner.is_any() => {
            Ok(Value::List(recover_all(inner, items)?))
        }
        (FieldType::Map(inner), Value::Map(map)) if !inner.is_any() => {
            let mut recovered = Mapping::with_capacity(map.len());
            for (key, item) in map {
                recovered.insert(key, recover_value(inner, item)?);
            }
            Ok(Value::Map(recovered))
        }
        (FieldType::Object(record), Value::Map(map)) => Ok(Value::Object(construct(
            record,
            map,
            ConstructionMode::Recovered,
        )?)),
        (_, value) => Ok(value),
    }
}

fn recover_all(inner: &FieldType, items: Vec<Value>) -> Result<Vec<Value>, ObjectError> {
    if inner.is_any() {
        return Ok(items);
    }
    items.into_iter().map(|v| recover_value(inner, v)).collect()
}

/// Check `value` against the declared type of `field`.
pub(crate) fn check_type(
    record: &RecordType,
    field: &str,
    expected: &FieldType,
    value: &Value,
) -> Result<(), ObjectError> {
    if expected.accepts(value) {
        Ok(())
    } else {
        Err(ObjectError::TypeMismatch {
            record: record.name().to_string(),
            field: field.to_string(),
            expected: expected.to_string(),
            actual: value.type_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping;

    fn sub_a() -> Arc<RecordType> {
        RecordType::builder("SubA")
            .field("x", FieldType::Int)
            .build()
            .unwrap()
    }

    fn bag(sub: &Arc<RecordType>) -> Arc<RecordType> {
        RecordType::builder("Bag")
            .field("pair", FieldType::tuple())
            .field("tags", FieldType::set_of(FieldType::Str))
            .field("subs", FieldType::list_of(FieldType::object(sub)))
            .field("by_name", FieldType::map_of(FieldType::object(sub)))
            .build()
            .unwrap()
    }

    fn decoded() -> Mapping {
        mapping! {
            "pair" => Value::list([1, 2]),
            "tags" => Value::list(["b", "a", "b"]),
            "subs" => Value::list([Value::Map(mapping! { "x" => 1 })]),
            "by_name" => Value::Map(mapping! { "one" => Value::Map(mapping! { "x" => 1 }) }),
        }
    }

    #[test]
    fn test_recovered_mode_rebuilds_declared_shapes() {
        let sub = sub_a();
        let record = bag(&sub);
        let instance = construct(&record, decoded(), ConstructionMode::Recovered).unwrap();

        assert_eq!(instance.get("pair"), Some(&Value::tuple([1, 2])));
        assert_eq!(instance.get("tags"), Some(&Value::set(["a", "b"])));

        let expected_sub = construct(&sub, mapping! { "x" => 1 }, ConstructionMode::Direct).unwrap();
        assert_eq!(
            instance.get("subs"),
            Some(&Value::list([Value::Object(expected_sub.clone())]))
        );
        assert_eq!(
            instance.get("by_name"),
            Some(&Value::Map(mapping! { "one" => Value::Object(expected_sub) }))
        );
    }

    #[test]
    fn test_direct_mode_does_not_coerce() {
        let sub = sub_a();
        let record = bag(&sub);
        let err = construct(&record, decoded(), ConstructionMode::Direct).unwrap_err();
        assert_eq!(
            err,
            ObjectError::TypeMismatch {
                record: "Bag".into(),
                field: "pair".into(),
                expected: "tuple".into(),
                actual: "list".into(),
            }
        );
    }

    #[test]
    fn test_direct_mode_rejects_mapping_for_nested_record() {
        let sub = sub_a();
        let holder = RecordType::builder("Holder")
            .field("a", FieldType::object(&sub))
            .build()
            .unwrap();
        let err = construct(
            &holder,
            mapping! { "a" => Value::Map(mapping! { "x" => 1 }) },
            ConstructionMode::Direct,
        )
        .unwrap_err();
        assert!(matches!(err, ObjectError::TypeMismatch { ref actual, .. } if actual == "map"));
    }

    #[test]
    fn test_nested_failure_propagates() {
        let sub = sub_a();
        let holder = RecordType::builder("Holder")
            .field("a", FieldType::object(&sub))
            .build()
            .unwrap();
        let err = construct(
            &holder,
            mapping! { "a" => Value::Map(mapping! { "x" => "one" }) },
            ConstructionMode::Recovered,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ObjectError::TypeMismatch {
                record: "SubA".into(),
                field: "x".into(),
                expected: "int".into(),
                actual: "str".into(),
            }
        );
    }

    #[test]
    fn test_recovery_still_type_checks_result() {
        let record = RecordType::builder("Ints")
            .field("s", FieldType::set_of(FieldType::Int))
            .build()
            .unwrap();
        let err = construct(
            &record,
            mapping! { "s" => Value::list([Value::Int(1), Value::from("2")]) },
            ConstructionMode::Recovered,
        )
        .unwrap_err();
        assert!(matches!(err, ObjectError::TypeMismatch { ref expected, .. } if expected == "set<int>"));
    }

    #[test]
    fn test_unenforced_types_still_recover() {
        let record = RecordType::builder("Loose")
            .enforce_types(false)
            .field("s", FieldType::set())
            .field("n", FieldType::Int)
            .build()
            .unwrap();
        let instance = construct(
            &record,
            mapping! { "s" => Value::list([2, 1]), "n" => "not a number" },
            ConstructionMode::Recovered,
        )
        .unwrap();
        assert_eq!(instance.get("s"), Some(&Value::set([1, 2])));
        assert_eq!(instance.get("n"), Some(&Value::from("not a number")));
    }

    #[test]
    fn test_unknown_field_checked_before_missing() {
        let record = sub_a();
        let err = construct(&record, mapping! { "y" => 1 }, ConstructionMode::Direct).unwrap_err();
        assert_eq!(
            err,
            ObjectError::InvalidAttribute {
                record: "SubA".into(),
                field: "y".into()
            }
        );
    }
}
