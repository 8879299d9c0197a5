//! TOML codec backed by `toml`.
//!
//! TOML has no null, so encoding one is refused. Datetimes have no
//! counterpart in `Value` and decode to their string form. Compact output
//! keeps mapping order; pretty output sorts keys at every level.

use valobj_core::{Codec, CodecError, EncodeStyle, Format, Mapping, Value};

/// TOML encode/decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

fn to_toml(value: &Value) -> Result<toml::Value, CodecError> {
    Ok(match value {
        Value::Null => {
            return Err(CodecError::Unsupported {
                format: Format::Toml.to_string(),
                reason: "null values".into(),
            })
        }
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Int(i) => toml::Value::Integer(*i),
        Value::Float(x) => toml::Value::Float(*x),
        Value::Str(s) => toml::Value::String(s.clone()),
        Value::List(items) | Value::Tuple(items) => {
            toml::Value::Array(items.iter().map(to_toml).collect::<Result<_, _>>()?)
        }
        Value::Set(items) => toml::Value::Array(items.iter().map(to_toml).collect::<Result<_, _>>()?),
        Value::Map(map) => toml::Value::Table(to_table(map)?),
        Value::Object(instance) => toml::Value::Table(to_table(&instance.flatten())?),
    })
}

fn to_table(map: &Mapping) -> Result<toml::Table, CodecError> {
    let mut table = toml::Table::new();
    for (key, value) in map.iter() {
        table.insert(key.to_string(), to_toml(value)?);
    }
    Ok(table)
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::Str(s),
        toml::Value::Integer(i) => Value::Int(i),
        toml::Value::Float(x) => Value::Float(x),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Map(from_table(table)),
    }
}

fn from_table(table: toml::Table) -> Mapping {
    table
        .into_iter()
        .map(|(key, value)| (key, from_toml(value)))
        .collect()
}

impl Codec for TomlCodec {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn encode(&self, mapping: &Mapping, style: EncodeStyle) -> Result<String, CodecError> {
        let table = match style {
            EncodeStyle::Compact => to_table(mapping)?,
            EncodeStyle::Pretty => {
                let mut sorted = mapping.clone();
                sorted.sort_keys();
                to_table(&sorted)?
            }
        };
        let encoded = match style {
            EncodeStyle::Compact => toml::to_string(&table),
            EncodeStyle::Pretty => toml::to_string_pretty(&table),
        };
        encoded.map_err(|e| CodecError::Encode {
            format: Format::Toml.to_string(),
            reason: e.to_string(),
        })
    }

    fn decode(&self, text: &str) -> Result<Mapping, CodecError> {
        let table: toml::Table = toml::from_str(text).map_err(|e| CodecError::Decode {
            format: Format::Toml.to_string(),
            reason: e.to_string(),
        })?;
        Ok(from_table(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valobj_core::mapping;

    #[test]
    fn test_decode_person() {
        let m = TomlCodec
            .decode("name = \"John\"\nsurname = \"Doe\"\nage = 42")
            .unwrap();
        assert_eq!(m, mapping! { "name" => "John", "surname" => "Doe", "age" => 42 });
    }

    #[test]
    fn test_nested_tables_round_trip() {
        let m = mapping! {
            "a" => Value::Map(mapping! { "x" => 1 }),
            "b" => Value::Map(mapping! { "y" => "z" }),
            "n" => 3,
        };
        let text = TomlCodec.encode(&m, EncodeStyle::Compact).unwrap();
        assert_eq!(TomlCodec.decode(&text).unwrap(), m);
    }

    #[test]
    fn test_compact_keeps_mapping_order() {
        let m = mapping! { "name" => "John", "surname" => "Doe", "age" => 42 };
        assert_eq!(
            TomlCodec.encode(&m, EncodeStyle::Compact).unwrap(),
            "name = \"John\"\nsurname = \"Doe\"\nage = 42\n"
        );
        let keys: Vec<String> = TomlCodec
            .decode("b = 1\na = 2\n")
            .unwrap()
            .keys()
            .map(str::to_string)
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_pretty_sorts_keys() {
        let m = mapping! { "name" => "John", "surname" => "Doe", "age" => 42 };
        assert_eq!(
            TomlCodec.encode(&m, EncodeStyle::Pretty).unwrap(),
            "age = 42\nname = \"John\"\nsurname = \"Doe\"\n"
        );
    }

    #[test]
    fn test_null_rejected() {
        let m = mapping! { "n" => Value::Null };
        assert!(matches!(
            TomlCodec.encode(&m, EncodeStyle::Compact),
            Err(CodecError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_datetime_decodes_to_string() {
        let m = TomlCodec.decode("at = 1979-05-27T07:32:00Z").unwrap();
        assert_eq!(m.get("at"), Some(&Value::from("1979-05-27T07:32:00Z")));
    }

    #[test]
    fn test_malformed_text() {
        assert!(matches!(TomlCodec.decode("= 1"), Err(CodecError::Decode { .. })));
    }
}
