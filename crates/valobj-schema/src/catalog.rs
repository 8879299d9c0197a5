//! # Record Catalog
//!
//! A by-name collection of record types, populated from catalog documents
//! (see [`crate::descriptor`]) or by registering types declared in code.
//!
//! ## Resolution
//!
//! Records may refer to each other in any order within a document. Loading
//! builds records in dependency order: each pass declares every record whose
//! references are already known, until nothing is left or a pass makes no
//! progress. A reference that names nothing in the catalog or the document
//! is `UnknownType`; references that only name each other are
//! `CyclicReference`, since a record type cannot contain itself.
//!
//! Loading is all-or-nothing. A failing document leaves the catalog as it
//! was.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use valobj_core::{recover_value, RecordType};

use crate::descriptor::{CatalogDocument, RecordDescriptor};
use crate::error::CatalogError;
use crate::typeexpr::TypeExpr;

/// Record types by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    records: BTreeMap<String, Arc<RecordType>>,
}

/// A document record with its field types parsed.
struct Pending {
    descriptor: RecordDescriptor,
    types: Vec<TypeExpr>,
}

impl Pending {
    fn parse(descriptor: RecordDescriptor) -> Result<Self, CatalogError> {
        let types = descriptor
            .fields
            .iter()
            .map(|field| {
                TypeExpr::parse(&field.type_expr).map_err(|source| CatalogError::InvalidTypeExpr {
                    record: descriptor.name.clone(),
                    field: field.name.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { descriptor, types })
    }

    fn references(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.iter().flat_map(TypeExpr::references)
    }
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record type by name.
    pub fn get(&self, name: &str) -> Option<Arc<RecordType>> {
        self.records.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Record names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Add a record type declared elsewhere so documents can refer to it.
    ///
    /// # Errors
    ///
    /// `DuplicateRecord` if the name is taken.
    pub fn register(&mut self, record: Arc<RecordType>) -> Result<(), CatalogError> {
        if self.records.contains_key(record.name()) {
            return Err(CatalogError::DuplicateRecord {
                name: record.name().to_string(),
            });
        }
        tracing::debug!(record = %record.name(), "registered record type in catalog");
        self.records.insert(record.name().to_string(), record);
        Ok(())
    }

    /// Build a catalog from one YAML document.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaCatalog::load_yaml`].
    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.load_yaml(text)?;
        Ok(catalog)
    }

    /// Parse a YAML catalog document and load its records.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed YAML or unknown keys, otherwise the errors of
    /// [`SchemaCatalog::load_document`].
    pub fn load_yaml(&mut self, text: &str) -> Result<Vec<Arc<RecordType>>, CatalogError> {
        let document: CatalogDocument =
            serde_yaml::from_str(text).map_err(|e| CatalogError::Parse {
                origin: "yaml".into(),
                reason: e.to_string(),
            })?;
        self.load_document(document)
    }

    /// Parse a JSON catalog document and load its records.
    ///
    /// # Errors
    ///
    /// As [`SchemaCatalog::load_yaml`].
    pub fn load_json(&mut self, text: &str) -> Result<Vec<Arc<RecordType>>, CatalogError> {
        let document: CatalogDocument =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse {
                origin: "json".into(),
                reason: e.to_string(),
            })?;
        self.load_document(document)
    }

    /// Load a catalog file, choosing the parser by extension (`.yaml`,
    /// `.yml` or `.json`).
    ///
    /// # Errors
    ///
    /// `UnsupportedExtension`, `Io`, or the errors of the chosen loader.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<Vec<Arc<RecordType>>, CatalogError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let text = match extension.as_deref() {
            Some("yaml" | "yml" | "json") => std::fs::read_to_string(path)?,
            _ => {
                return Err(CatalogError::UnsupportedExtension {
                    path: path.display().to_string(),
                })
            }
        };
        let loaded = match extension.as_deref() {
            Some("json") => self.load_json(&text),
            _ => self.load_yaml(&text),
        };
        let loaded = loaded.map_err(|e| match e {
            CatalogError::Parse { reason, .. } => CatalogError::Parse {
                origin: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), records = loaded.len(), "loaded record catalog");
        Ok(loaded)
    }

    /// Declare every record of `document`, in dependency order.
    ///
    /// Returns the new record types in document order.
    ///
    /// # Errors
    ///
    /// `DuplicateRecord`, `InvalidTypeExpr`, `UnknownType`,
    /// `CyclicReference`, `InvalidDefault`, or `Schema` from the record
    /// builder. On error nothing is added.
    pub fn load_document(
        &mut self,
        document: CatalogDocument,
    ) -> Result<Vec<Arc<RecordType>>, CatalogError> {
        let order: Vec<String> = document.records.iter().map(|r| r.name.clone()).collect();
        let mut pending = Vec::with_capacity(document.records.len());
        for (i, descriptor) in document.records.into_iter().enumerate() {
            if self.records.contains_key(&descriptor.name) || order[..i].contains(&descriptor.name) {
                return Err(CatalogError::DuplicateRecord {
                    name: descriptor.name,
                });
            }
            pending.push(Pending::parse(descriptor)?);
        }

        let mut staged: BTreeMap<String, Arc<RecordType>> = BTreeMap::new();
        let mut passes = 0usize;
        while !pending.is_empty() {
            passes += 1;
            let (ready, waiting): (Vec<Pending>, Vec<Pending>) = pending.into_iter().partition(|p| {
                p.references()
                    .all(|name| staged.contains_key(name) || self.records.contains_key(name))
            });
            if ready.is_empty() {
                return Err(self.unresolved(&waiting, &staged));
            }
            for p in ready {
                let record = self.declare(p, &staged)?;
                staged.insert(record.name().to_string(), record);
            }
            pending = waiting;
        }
        tracing::debug!(records = staged.len(), passes, "resolved catalog document");

        let mut declared = Vec::with_capacity(order.len());
        for name in order {
            if let Some(record) = staged.remove(&name) {
                self.records.insert(name, Arc::clone(&record));
                declared.push(record);
            }
        }
        Ok(declared)
    }

    /// Describe every record in the catalog, sorted by name.
    pub fn describe(&self) -> CatalogDocument {
        CatalogDocument {
            records: self
                .records
                .values()
                .map(|record| RecordDescriptor::describe(record))
                .collect(),
        }
    }

    fn declare(
        &self,
        pending: Pending,
        staged: &BTreeMap<String, Arc<RecordType>>,
    ) -> Result<Arc<RecordType>, CatalogError> {
        let lookup = |name: &str| staged.get(name).or_else(|| self.records.get(name)).cloned();
        let Pending { descriptor, types } = pending;
        let mut builder = RecordType::builder(descriptor.name.as_str()).policy(descriptor.policy());
        for (field, expr) in descriptor.fields.into_iter().zip(types) {
            let ty = expr.resolve(&lookup).map_err(|name| CatalogError::UnknownType {
                record: descriptor.name.clone(),
                field: field.name.clone(),
                name,
            })?;
            builder = match field.default {
                Some(default) => {
                    let default = recover_value(&ty, default).map_err(|e| CatalogError::InvalidDefault {
                        record: descriptor.name.clone(),
                        field: field.name.clone(),
                        reason: e.to_string(),
                    })?;
                    builder.field_with_default(field.name, ty, default)
                }
                None => builder.field(field.name, ty),
            };
        }
        Ok(builder.build()?)
    }

    /// Error for records that could not be declared in any pass.
    fn unresolved(
        &self,
        waiting: &[Pending],
        staged: &BTreeMap<String, Arc<RecordType>>,
    ) -> CatalogError {
        let known = |name: &str| {
            self.records.contains_key(name)
                || staged.contains_key(name)
                || waiting.iter().any(|p| p.descriptor.name == name)
        };
        for p in waiting {
            for (field, expr) in p.descriptor.fields.iter().zip(&p.types) {
                if let Some(name) = expr
                    .references()
                    .into_iter()
                    .find(|name| !known(*name))
                {
                    return CatalogError::UnknownType {
                        record: p.descriptor.name.clone(),
                        field: field.name.clone(),
                        name: name.to_string(),
                    };
                }
            }
        }
        CatalogError::CyclicReference {
            records: waiting.iter().map(|p| p.descriptor.name.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valobj_core::{mapping, FieldType, Instance, ObjectError, SchemaError, Value};

    #[test]
    fn test_forward_references_resolve() {
        let catalog = SchemaCatalog::from_yaml(
            r#"
records:
  - name: Container
    fields:
      - { name: a, type: SubA }
      - { name: b, type: SubB }
  - name: SubA
    fields:
      - { name: x, type: int }
  - name: SubB
    fields:
      - { name: y, type: str }
"#,
        )
        .unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Container", "SubA", "SubB"]);

        let container = catalog.get("Container").unwrap();
        let c = Instance::from_mapping(
            &container,
            mapping! {
                "a" => Value::Map(mapping! { "x" => 1 }),
                "b" => Value::Map(mapping! { "y" => "z" }),
            },
        )
        .unwrap();
        assert_eq!(c.to_string(), r#"Container(a=SubA(x=1), b=SubB(y="z"))"#);
    }

    #[test]
    fn test_returns_records_in_document_order() {
        let mut catalog = SchemaCatalog::new();
        let loaded = catalog
            .load_json(
                r#"{"records": [
                    {"name": "Outer", "fields": [{"name": "inner", "type": "Inner"}]},
                    {"name": "Inner", "fields": []}
                ]}"#,
            )
            .unwrap();
        let names: Vec<_> = loaded.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
    }

    #[test]
    fn test_unknown_type() {
        let err = SchemaCatalog::from_yaml(
            "records:\n  - name: A\n    fields:\n      - { name: b, type: \"list<Missing>\" }\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownType { ref record, ref field, ref name }
                if record == "A" && field == "b" && name == "Missing"
        ));
    }

    #[test]
    fn test_cycle_is_reported() {
        let err = SchemaCatalog::from_yaml(
            r#"
records:
  - name: A
    fields: [{ name: b, type: B }]
  - name: B
    fields: [{ name: a, type: A }]
"#,
        )
        .unwrap_err();
        match err {
            CatalogError::CyclicReference { records } => assert_eq!(records, vec!["A", "B"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_load_leaves_catalog_unchanged() {
        let mut catalog = SchemaCatalog::from_yaml("records:\n  - name: Kept\n").unwrap();
        let err = catalog
            .load_yaml("records:\n  - name: New\n  - name: Bad\n    fields: [{ name: x, type: Nope }]\n")
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownType { .. }));
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Kept"]);
    }

    #[test]
    fn test_duplicates() {
        let err = SchemaCatalog::from_yaml("records:\n  - name: A\n  - name: A\n").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRecord { ref name } if name == "A"));

        let mut catalog = SchemaCatalog::new();
        catalog
            .register(RecordType::builder("A").build().unwrap())
            .unwrap();
        assert!(matches!(
            catalog.load_yaml("records:\n  - name: A\n"),
            Err(CatalogError::DuplicateRecord { .. })
        ));
    }

    #[test]
    fn test_documents_can_use_registered_records() {
        let mut catalog = SchemaCatalog::new();
        let point = RecordType::builder("Point")
            .field("x", FieldType::Int)
            .field("y", FieldType::Int)
            .build()
            .unwrap();
        catalog.register(Arc::clone(&point)).unwrap();
        catalog
            .load_yaml("records:\n  - name: Line\n    fields: [{ name: ends, type: \"tuple<Point>\" }]\n")
            .unwrap();
        let line = catalog.get("Line").unwrap();
        assert_eq!(
            line.schema().get("ends").map(|f| f.field_type().clone()),
            Some(FieldType::tuple_of(FieldType::object(&point)))
        );
    }

    #[test]
    fn test_defaults_are_recovered() {
        let catalog = SchemaCatalog::from_yaml(
            r#"
records:
  - name: Defaults
    fields:
      - { name: pair, type: "tuple<int>", default: [0, 0] }
      - { name: tags, type: "set<str>", default: [b, a] }
      - { name: note, type: str, default: "" }
"#,
        )
        .unwrap();
        let record = catalog.get("Defaults").unwrap();
        let d = Instance::new(&record, mapping! {}).unwrap();
        assert_eq!(d.get("pair"), Some(&Value::tuple([0, 0])));
        assert_eq!(d.get("tags"), Some(&Value::set(["a", "b"])));
        assert_eq!(d.to_string(), r#"Defaults(pair=(0, 0), tags={"a", "b"}, note="")"#);
    }

    #[test]
    fn test_bad_default_is_a_schema_error() {
        let err = SchemaCatalog::from_yaml(
            "records:\n  - name: D\n    fields: [{ name: n, type: int, default: \"zero\" }]\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Schema(SchemaError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn test_invalid_type_expression() {
        let err = SchemaCatalog::from_yaml(
            "records:\n  - name: D\n    fields: [{ name: n, type: \"list<int\" }]\n",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTypeExpr { ref field, .. } if field == "n"));
    }

    #[test]
    fn test_policy_flags_reach_instances() {
        let catalog = SchemaCatalog::from_yaml(
            "records:\n  - name: M\n    frozen: false\n    partial: true\n    fields: [{ name: a, type: int }, { name: b, type: int }]\n",
        )
        .unwrap();
        let mut m = Instance::new(&catalog.get("M").unwrap(), mapping! { "a" => 1 }).unwrap();
        m.set("b", 2).unwrap();
        assert_eq!(m.to_string(), "M(a=1, b=2)");
        assert!(matches!(
            m.set("c", 3),
            Err(ObjectError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_describe_loads_back() {
        let source = SchemaCatalog::from_yaml(
            r#"
records:
  - name: Shape
    frozen: false
    fields:
      - { name: vertices, type: "list<Point>" }
      - { name: labels, type: "map<set<str>>", default: {} }
  - name: Point
    fields:
      - { name: x, type: int }
      - { name: y, type: int, default: 0 }
"#,
        )
        .unwrap();
        let yaml = serde_yaml::to_string(&source.describe()).unwrap();
        let copy = SchemaCatalog::from_yaml(&yaml).unwrap();
        assert_eq!(copy.describe(), source.describe());
        assert_eq!(
            copy.get("Shape").unwrap().attributes(),
            vec!["vertices", "labels"]
        );
    }
}
