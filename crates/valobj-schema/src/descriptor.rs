//! # Catalog Documents
//!
//! Serde shapes of a catalog file:
//!
//! ```yaml
//! records:
//!   - name: Point
//!     fields:
//!       - { name: x, type: int }
//!       - { name: y, type: int, default: 0 }
//!   - name: Shape
//!     frozen: false
//!     fields:
//!       - { name: vertices, type: "list<Point>" }
//! ```
//!
//! Unknown keys are rejected at every level. Policy flags that are left out
//! take the `TypePolicy` defaults. A field without `type` is `any`. A
//! `default: null` is the same as no default.

use serde::{Deserialize, Serialize};
use valobj_core::{RecordType, TypePolicy, Value};

use crate::typeexpr::TypeExpr;

/// Root of a catalog document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDocument {
    #[serde(default)]
    pub records: Vec<RecordDescriptor>,
}

/// One record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_types: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// One field of a record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    pub name: String,
    /// Type expression, see [`TypeExpr`].
    #[serde(rename = "type", default = "any_type")]
    pub type_expr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

fn any_type() -> String {
    TypeExpr::Any.to_string()
}

impl RecordDescriptor {
    /// The declared flags laid over `TypePolicy::default()`.
    pub fn policy(&self) -> TypePolicy {
        let base = TypePolicy::default();
        TypePolicy {
            frozen: self.frozen.unwrap_or(base.frozen),
            enforce_types: self.enforce_types.unwrap_or(base.enforce_types),
            partial: self.partial.unwrap_or(base.partial),
        }
    }

    /// Describe an existing record type. Flags equal to the defaults are
    /// left out.
    pub fn describe(record: &RecordType) -> Self {
        let base = TypePolicy::default();
        let policy = record.policy();
        let differs = |declared: bool, default: bool| (declared != default).then_some(declared);
        Self {
            name: record.name().to_string(),
            frozen: differs(policy.frozen, base.frozen),
            enforce_types: differs(policy.enforce_types, base.enforce_types),
            partial: differs(policy.partial, base.partial),
            fields: record
                .schema()
                .iter()
                .map(|spec| FieldDescriptor {
                    name: spec.name().to_string(),
                    type_expr: TypeExpr::from(spec.field_type()).to_string(),
                    default: spec.default().cloned(),
                })
                .collect(),
        }
    }
}
