//! # valobj-codec — Text Format Codecs
//!
//! Concrete [`Codec`](valobj_core::Codec) implementations for the formats the engine knows:
//!
//! - [`JsonCodec`] (`json` feature) — `serde_json`; pretty output sorts keys
//!   and indents with four spaces.
//! - [`YamlCodec`] (`yaml` feature) — `serde_yaml`.
//! - [`TomlCodec`] (`toml` feature) — `toml`; rejects `null`, decodes
//!   datetimes to strings.
//!
//! All three decode to plain kinds only (lists and mappings). Rebuilding
//! tuples, sets and nested instances is done by the core constructor in
//! recovered mode.
//!
//! [`standard_registry`] registers every codec compiled in. A format whose
//! feature is disabled is simply absent and lookups report
//! `CodecUnavailable`.

#[cfg(feature = "json")]
mod json_codec;
#[cfg(feature = "toml")]
mod toml_codec;
#[cfg(feature = "yaml")]
mod yaml_codec;

#[cfg(feature = "json")]
pub use json_codec::JsonCodec;
#[cfg(feature = "toml")]
pub use toml_codec::TomlCodec;
#[cfg(feature = "yaml")]
pub use yaml_codec::YamlCodec;

use valobj_core::{CodecError, CodecRegistry, Format, Mapping, Value};

/// A registry holding every codec enabled at compile time.
pub fn standard_registry() -> CodecRegistry {
    #[allow(unused_mut)]
    let mut registry = CodecRegistry::new();
    #[cfg(feature = "json")]
    registry.register(Box::new(JsonCodec));
    #[cfg(feature = "yaml")]
    registry.register(Box::new(YamlCodec));
    #[cfg(feature = "toml")]
    registry.register(Box::new(TomlCodec));
    tracing::debug!(formats = ?registry.formats(), "standard codec registry ready");
    registry
}

/// Require a decoded document root to be a mapping.
#[allow(dead_code)]
pub(crate) fn root_mapping(format: Format, value: Value) -> Result<Mapping, CodecError> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(CodecError::NotAMapping {
            format: format.to_string(),
            found: other.kind().to_string(),
        }),
    }
}
