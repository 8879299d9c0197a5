//! # Instances
//!
//! An `Instance` is one value object: a field store scoped to a record
//! type, plus its current frozen flag and a separate map of bookkeeping
//! slots.
//!
//! ## Invariants
//!
//! - Every stored field name is a member of the record's schema.
//! - For non-partial types the stored fields equal the schema fields once
//!   construction finishes. Partial types store a subset; unset fields are
//!   absent, never null-filled.
//! - Reserved names (leading `_`) live in the bookkeeping slots. They are
//!   assignable regardless of policy and never take part in equality,
//!   hashing, rendering, iteration, membership or flattening.
//!
//! ## Mutation
//!
//! [`Instance::set`] checks only the frozen flag and schema membership. It
//! does not re-validate the type or apply recovery coercions; that stays a
//! construction-time concern. [`Instance::set_checked`] additionally runs
//! the direct-mode type check for callers that want it.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::construct::{self, ConstructionMode};
use crate::error::ObjectError;
use crate::schema::{is_reserved, RecordType};
use crate::value::{Mapping, Value};

/// A constructed value object.
#[derive(Clone)]
pub struct Instance {
    record: Arc<RecordType>,
    values: Mapping,
    slots: Mapping,
    frozen: bool,
}

impl Instance {
    /// Construct from application-supplied fields.
    ///
    /// An empty field map is not special: a non-partial type with required
    /// fields fails with `MissingAttribute`. Use [`Instance::uninitialized`]
    /// for staged construction.
    ///
    /// # Errors
    ///
    /// See [`construct::construct`].
    pub fn new(record: &Arc<RecordType>, fields: Mapping) -> Result<Self, ObjectError> {
        construct::construct(record, fields, ConstructionMode::Direct)
    }

    /// Construct from a plain mapping decoded from a text format, applying
    /// recovery coercions.
    ///
    /// # Errors
    ///
    /// See [`construct::construct`].
    pub fn from_mapping(record: &Arc<RecordType>, mapping: Mapping) -> Result<Self, ObjectError> {
        construct::construct(record, mapping, ConstructionMode::Recovered)
    }

    /// Construct with an explicit mode.
    ///
    /// # Errors
    ///
    /// See [`construct::construct`].
    pub fn construct(
        record: &Arc<RecordType>,
        fields: Mapping,
        mode: ConstructionMode,
    ) -> Result<Self, ObjectError> {
        construct::construct(record, fields, mode)
    }

    /// An instance with no fields set and not frozen, for staged
    /// construction. Assign fields with [`Instance::set`] and finish with
    /// [`Instance::seal`].
    pub fn uninitialized(record: &Arc<RecordType>) -> Self {
        Self::from_parts(Arc::clone(record), Mapping::new(), false)
    }

    /// Run full direct-mode construction over the fields assigned so far and
    /// apply the record's frozen policy. Bookkeeping slots carry over.
    ///
    /// # Errors
    ///
    /// See [`construct::construct`].
    pub fn seal(self) -> Result<Self, ObjectError> {
        let mut sealed = construct::construct(&self.record, self.values, ConstructionMode::Direct)?;
        sealed.slots = self.slots;
        Ok(sealed)
    }

    pub(crate) fn from_parts(record: Arc<RecordType>, values: Mapping, frozen: bool) -> Self {
        Self {
            record,
            values,
            slots: Mapping::new(),
            frozen,
        }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record
    }

    pub fn type_name(&self) -> &str {
        self.record.name()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Currently set fields in storage order.
    pub fn fields(&self) -> &Mapping {
        &self.values
    }

    /// Read a field or, for a reserved name, a bookkeeping slot.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if is_reserved(name) {
            self.slots.get(name)
        } else {
            self.values.get(name)
        }
    }

    /// True iff `name` is a currently set field.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of currently set fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(name, value)` pairs of the set fields in storage order. Each call
    /// starts a fresh iteration.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.values.iter()
    }

    /// Assign a field after construction.
    ///
    /// Reserved names always succeed. Otherwise a frozen instance fails with
    /// `ImmutableViolation` and a name outside the schema fails with
    /// `InvalidAttribute`; the value is stored without a type check.
    ///
    /// # Errors
    ///
    /// `ImmutableViolation` or `InvalidAttribute` as described.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ObjectError> {
        let value = value.into();
        if is_reserved(name) {
            self.slots.insert(name, value);
            return Ok(());
        }
        self.guard(name)?;
        self.values.insert(name, value);
        Ok(())
    }

    /// Like [`Instance::set`], but also checks the value against the
    /// declared field type when the record enforces types.
    ///
    /// # Errors
    ///
    /// `ImmutableViolation`, `InvalidAttribute`, or `TypeMismatch`.
    pub fn set_checked(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ObjectError> {
        let value = value.into();
        if is_reserved(name) {
            self.slots.insert(name, value);
            return Ok(());
        }
        self.guard(name)?;
        if self.record.policy().enforce_types {
            if let Some(spec) = self.record.schema().get(name) {
                construct::check_type(&self.record, name, spec.field_type(), &value)?;
            }
        }
        self.values.insert(name, value);
        Ok(())
    }

    fn guard(&self, name: &str) -> Result<(), ObjectError> {
        if self.frozen {
            return Err(ObjectError::ImmutableViolation {
                record: self.record.name().to_string(),
                field: name.to_string(),
            });
        }
        if !self.record.schema().contains(name) {
            return Err(ObjectError::InvalidAttribute {
                record: self.record.name().to_string(),
                field: name.to_string(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Instance {}

impl PartialOrd for Instance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Same record type first, then field contents. Unset fields compare
/// equal only to unset fields.
impl Ord for Instance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.record
            .key()
            .cmp(&other.record.key())
            .then_with(|| self.values.cmp(&other.values))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.record.name())?;
        let set = self
            .record
            .schema()
            .names()
            .filter_map(|name| self.values.get(name).map(|v| (name, v)));
        for (i, (name, value)) in set.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("record", &self.record.name())
            .field("values", &self.values)
            .field("frozen", &self.frozen)
            .finish()
    }
}
