//! JSON codec backed by `serde_json`.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use valobj_core::{Codec, CodecError, EncodeStyle, Format, Mapping, Value};

use crate::root_mapping;

/// JSON encode/decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

fn encode_error(e: impl std::fmt::Display) -> CodecError {
    CodecError::Encode {
        format: Format::Json.to_string(),
        reason: e.to_string(),
    }
}

/// `serde_json` writes NaN and infinities as `null`, which would decode to
/// a different value, so they are refused up front.
fn reject_non_finite(value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Float(x) if !x.is_finite() => Err(CodecError::Unsupported {
            format: Format::Json.to_string(),
            reason: format!("non-finite float {x}"),
        }),
        Value::List(items) | Value::Tuple(items) => items.iter().try_for_each(reject_non_finite),
        Value::Set(items) => items.iter().try_for_each(reject_non_finite),
        Value::Map(map) => map.iter().try_for_each(|(_, v)| reject_non_finite(v)),
        Value::Object(instance) => instance.iter().try_for_each(|(_, v)| reject_non_finite(v)),
        _ => Ok(()),
    }
}

impl Codec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode(&self, mapping: &Mapping, style: EncodeStyle) -> Result<String, CodecError> {
        mapping.iter().try_for_each(|(_, v)| reject_non_finite(v))?;
        match style {
            EncodeStyle::Compact => serde_json::to_string(mapping).map_err(encode_error),
            EncodeStyle::Pretty => {
                let mut sorted = mapping.clone();
                sorted.sort_keys();
                let mut buf = Vec::new();
                let mut ser =
                    serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
                sorted.serialize(&mut ser).map_err(encode_error)?;
                String::from_utf8(buf).map_err(encode_error)
            }
        }
    }

    fn decode(&self, text: &str) -> Result<Mapping, CodecError> {
        let value: Value = serde_json::from_str(text).map_err(|e| CodecError::Decode {
            format: Format::Json.to_string(),
            reason: e.to_string(),
        })?;
        root_mapping(Format::Json, value)
    }
}
