//! YAML codec backed by `serde_yaml`.

use valobj_core::{Codec, CodecError, EncodeStyle, Format, Mapping, Value};

use crate::root_mapping;

/// YAML encode/decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn encode(&self, mapping: &Mapping, style: EncodeStyle) -> Result<String, CodecError> {
        let encoded = match style {
            EncodeStyle::Compact => serde_yaml::to_string(mapping),
            EncodeStyle::Pretty => {
                let mut sorted = mapping.clone();
                sorted.sort_keys();
                serde_yaml::to_string(&sorted)
            }
        };
        encoded.map_err(|e| CodecError::Encode {
            format: Format::Yaml.to_string(),
            reason: e.to_string(),
        })
    }

    fn decode(&self, text: &str) -> Result<Mapping, CodecError> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| CodecError::Decode {
            format: Format::Yaml.to_string(),
            reason: e.to_string(),
        })?;
        root_mapping(Format::Yaml, value)
    }
}
