//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types raised by the value-object engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every runtime violation is raised synchronously at the point it is
//!   detected. Construction is all-or-nothing: no instance escapes when an
//!   error is returned.
//! - Variants carry the record name and field name wherever one exists, and
//!   type mismatches carry both the expected and the actual type.
//! - Declaration problems (`SchemaError`) and codec problems (`CodecError`)
//!   are separate enums folded into `ObjectError` with `#[from]`.

use thiserror::Error;

/// Top-level error type for constructing, mutating and exporting instances.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjectError {
    /// A field name that is not part of the record's schema was supplied
    /// to the constructor or the mutator.
    #[error("{field} is not a valid attribute of {record}")]
    InvalidAttribute {
        /// Record type name.
        record: String,
        /// The offending field name.
        field: String,
    },

    /// A required field was absent under non-partial construction.
    #[error("missing required attribute {field} for {record}")]
    MissingAttribute {
        /// Record type name.
        record: String,
        /// The absent field name.
        field: String,
    },

    /// A value's runtime type disagrees with the declared field type.
    #[error("{record}.{field} should be {expected}, not {actual}")]
    TypeMismatch {
        /// Record type name.
        record: String,
        /// Field being set.
        field: String,
        /// Declared field type.
        expected: String,
        /// Runtime type of the supplied value.
        actual: String,
    },

    /// Assignment attempted on a frozen instance.
    #[error("can't set {field}: {record} is immutable")]
    ImmutableViolation {
        /// Record type name.
        record: String,
        /// Field the caller tried to assign.
        field: String,
    },

    /// The requested format has no registered codec.
    #[error("no codec available for format '{format}'")]
    CodecUnavailable {
        /// Requested format name.
        format: String,
    },

    /// A field value cannot take part in hashing.
    #[error("{record}.{field} holds an unhashable {kind}")]
    Unhashable {
        /// Record type name.
        record: String,
        /// Field holding the value.
        field: String,
        /// Kind of the unhashable value.
        kind: String,
    },

    /// Encoding or decoding failed inside a codec.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A record type could not be declared.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Error raised while declaring a record type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Record or field names must be non-empty.
    #[error("empty name in declaration of '{record}'")]
    EmptyName {
        /// Record type name (possibly empty itself).
        record: String,
    },

    /// The same field was declared twice.
    #[error("field '{field}' declared twice in {record}")]
    DuplicateField {
        /// Record type name.
        record: String,
        /// Duplicated field name.
        field: String,
    },

    /// Names with a leading underscore are reserved for engine bookkeeping.
    #[error("field '{field}' in {record} uses a reserved name")]
    ReservedName {
        /// Record type name.
        record: String,
        /// Reserved field name.
        field: String,
    },

    /// A declared default does not satisfy its field type.
    #[error("default for {record}.{field} should be {expected}, not {actual}")]
    InvalidDefault {
        /// Record type name.
        record: String,
        /// Field carrying the default.
        field: String,
        /// Declared field type.
        expected: String,
        /// Runtime type of the default.
        actual: String,
    },
}

/// Error raised by a format codec.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The codec could not produce text.
    #[error("{format} encode failed: {reason}")]
    Encode {
        /// Format name.
        format: String,
        /// Underlying failure.
        reason: String,
    },

    /// The codec could not parse text.
    #[error("{format} decode failed: {reason}")]
    Decode {
        /// Format name.
        format: String,
        /// Underlying failure.
        reason: String,
    },

    /// Decoded text parsed, but its root is not a mapping.
    #[error("{format} document root must be a mapping, found {found}")]
    NotAMapping {
        /// Format name.
        format: String,
        /// Kind of the root value.
        found: String,
    },

    /// The value holds something the format cannot represent.
    #[error("{format} cannot represent {reason}")]
    Unsupported {
        /// Format name.
        format: String,
        /// What could not be represented.
        reason: String,
    },
}
