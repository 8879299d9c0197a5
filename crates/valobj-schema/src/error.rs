//! Errors raised while loading record catalogs.

use thiserror::Error;
use valobj_core::SchemaError;

use crate::typeexpr::TypeExprError;

/// Catalog loading error.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The document is not valid YAML/JSON or has unknown keys.
    #[error("failed to parse catalog '{origin}': {reason}")]
    Parse {
        /// File path, or the format name for in-memory text.
        origin: String,
        reason: String,
    },

    /// A record name is declared twice, or is already in the catalog.
    #[error("record type '{name}' is already declared")]
    DuplicateRecord { name: String },

    /// A field type names a record that is neither in the catalog nor in
    /// the document.
    #[error("{record}.{field} refers to unknown type '{name}'")]
    UnknownType {
        record: String,
        field: String,
        name: String,
    },

    /// Records that refer to each other and can never be declared.
    #[error("record types refer to each other in a cycle: {}", records.join(", "))]
    CyclicReference { records: Vec<String> },

    #[error("invalid type expression for {record}.{field}: {source}")]
    InvalidTypeExpr {
        record: String,
        field: String,
        #[source]
        source: TypeExprError,
    },

    /// A default value could not be coerced to its field type.
    #[error("default for {record}.{field} cannot be recovered: {reason}")]
    InvalidDefault {
        record: String,
        field: String,
        reason: String,
    },

    #[error("unsupported catalog file extension: '{path}'")]
    UnsupportedExtension { path: String },

    /// Declaration rejected by the record builder.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = CatalogError::UnknownType {
            record: "Line".into(),
            field: "ends".into(),
            name: "Pointt".into(),
        };
        assert_eq!(err.to_string(), "Line.ends refers to unknown type 'Pointt'");

        let err = CatalogError::CyclicReference {
            records: vec!["A".into(), "B".into()],
        };
        assert_eq!(err.to_string(), "record types refer to each other in a cycle: A, B");
    }

    #[test]
    fn test_schema_error_converts() {
        let err: CatalogError = SchemaError::EmptyName {
            record: String::new(),
        }
        .into();
        assert!(matches!(err, CatalogError::Schema(_)));
    }
}
