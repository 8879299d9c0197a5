//! # Serialization and Deserialization
//!
//! Export flattens an instance into a plain [`Mapping`] and hands it to the
//! codec for the requested format. Import decodes text into a mapping and
//! constructs in recovered mode so that lost shapes (tuples, sets, nested
//! instances) come back.
//!
//! ```text
//! instance ──flatten──▶ Mapping ──codec.encode──▶ text
//! text ──codec.decode──▶ Mapping ──construct(Recovered)──▶ instance
//! ```
//!
//! ## Round Trip
//!
//! For every instance whose fields are primitives, containers or nested
//! instances, `from_text(f, to_text(f, x)) == x` for each format `f`, as long
//! as the declared types describe the shapes that the format flattens.

use std::sync::Arc;

use crate::codec::{CodecRegistry, EncodeStyle, Format};
use crate::error::ObjectError;
use crate::instance::Instance;
use crate::schema::RecordType;
use crate::value::{Mapping, Value};

impl Instance {
    /// Recursively convert to a plain mapping.
    ///
    /// Nested instances become mappings at any depth. Container kinds are
    /// preserved; their elements are flattened. Unset fields are absent.
    pub fn flatten(&self) -> Mapping {
        self.iter()
            .map(|(name, value)| (name, flatten_value(value)))
            .collect()
    }

    /// Encode with the registered codec for `format`.
    ///
    /// JSON has no tuple or set, so those are normalized to lists first.
    ///
    /// # Errors
    ///
    /// `CodecUnavailable` if no codec is registered, `Codec` if encoding
    /// fails.
    pub fn to_text(&self, codecs: &CodecRegistry, format: Format) -> Result<String, ObjectError> {
        self.encode_with(codecs, format, EncodeStyle::Compact)
    }

    /// JSON with keys sorted at every level and four-space indentation.
    ///
    /// # Errors
    ///
    /// Same as [`Instance::to_text`].
    pub fn to_json_pretty(&self, codecs: &CodecRegistry) -> Result<String, ObjectError> {
        self.encode_with(codecs, Format::Json, EncodeStyle::Pretty)
    }

    /// Encode with an explicit style.
    ///
    /// # Errors
    ///
    /// Same as [`Instance::to_text`].
    pub fn encode_with(
        &self,
        codecs: &CodecRegistry,
        format: Format,
        style: EncodeStyle,
    ) -> Result<String, ObjectError> {
        let codec = codecs.get(format)?;
        let mut mapping = self.flatten();
        if format == Format::Json {
            mapping = normalize_sequences(mapping);
        }
        Ok(codec.encode(&mapping, style)?)
    }

    /// Decode `text` with the codec for `format` and construct in recovered
    /// mode.
    ///
    /// # Errors
    ///
    /// `CodecUnavailable`, `Codec` for malformed text, or any construction
    /// error.
    pub fn from_text(
        record: &Arc<RecordType>,
        codecs: &CodecRegistry,
        format: Format,
        text: &str,
    ) -> Result<Self, ObjectError> {
        let codec = codecs.get(format)?;
        let mapping = codec.decode(text)?;
        tracing::trace!(record = %record.name(), %format, fields = mapping.len(), "decoded text");
        Instance::from_mapping(record, mapping).map_err(|e| {
            tracing::debug!(record = %record.name(), %format, error = %e, "decoded mapping rejected");
            e
        })
    }
}

fn flatten_value(value: &Value) -> Value {
    match value {
        Value::Object(instance) => Value::Map(instance.flatten()),
        Value::List(items) => Value::List(items.iter().map(flatten_value).collect()),
        Value::Tuple(items) => Value::Tuple(items.iter().map(flatten_value).collect()),
        Value::Set(items) => Value::Set(items.iter().map(flatten_value).collect()),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(key, item)| (key, flatten_value(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replace tuples and sets with lists at every level.
fn normalize_sequences(mapping: Mapping) -> Mapping {
    mapping
        .into_iter()
        .map(|(key, value)| (key, normalize_value(value)))
        .collect()
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::List(items) | Value::Tuple(items) => {
            Value::List(items.into_iter().map(normalize_value).collect())
        }
        Value::Set(items) => Value::List(items.into_iter().map(normalize_value).collect()),
        Value::Map(map) => Value::Map(normalize_sequences(map)),
        other => other,
    }
}
