//! # Codec Capability
//!
//! The engine does not parse or print any text format itself. It depends on
//! a [`Codec`] per [`Format`]: `encode(mapping) -> text` and
//! `decode(text) -> mapping`. Concrete codecs live outside this crate and
//! are registered explicitly in a [`CodecRegistry`] at startup.
//!
//! A format with no registered codec is a configuration error reported as
//! `ObjectError::CodecUnavailable`; there is no fallback to another codec.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, ObjectError};
use crate::value::Mapping;

/// Supported text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Every format, in a fixed order.
    pub const ALL: [Format; 3] = [Format::Json, Format::Yaml, Format::Toml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ObjectError;

    /// Parses `json`, `yaml`/`yml` or `toml`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(ObjectError::CodecUnavailable {
                format: s.to_string(),
            }),
        }
    }
}

/// Output layout requested from a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeStyle {
    /// The codec's default layout; keys in mapping order.
    #[default]
    Compact,
    /// Keys sorted at every level, indented output where the format has a
    /// choice (four spaces for JSON).
    Pretty,
}

/// Encode/decode capability for one text format.
pub trait Codec: Send + Sync {
    /// The format this codec speaks.
    fn format(&self) -> Format;

    /// Render a plain mapping as text.
    ///
    /// # Errors
    ///
    /// `CodecError::Encode` or `CodecError::Unsupported` when the mapping
    /// holds something the format cannot carry.
    fn encode(&self, mapping: &Mapping, style: EncodeStyle) -> Result<String, CodecError>;

    /// Parse text into a plain mapping.
    ///
    /// # Errors
    ///
    /// `CodecError::Decode` for malformed text, `CodecError::NotAMapping`
    /// when the document root is not a mapping.
    fn decode(&self, text: &str) -> Result<Mapping, CodecError>;
}

/// Format -> codec lookup, populated once at startup.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<Format, Box<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec for its format, returning the one it replaces.
    pub fn register(&mut self, codec: Box<dyn Codec>) -> Option<Box<dyn Codec>> {
        let format = codec.format();
        tracing::debug!(%format, "registered codec");
        self.codecs.insert(format, codec)
    }

    /// Builder-style [`CodecRegistry::register`].
    pub fn with(mut self, codec: impl Codec + 'static) -> Self {
        self.register(Box::new(codec));
        self
    }

    /// Look up the codec for `format`.
    ///
    /// # Errors
    ///
    /// `ObjectError::CodecUnavailable` if none is registered.
    pub fn get(&self, format: Format) -> Result<&dyn Codec, ObjectError> {
        self.codecs.get(&format).map(|c| c.as_ref()).ok_or_else(|| {
            tracing::debug!(%format, "codec lookup failed");
            ObjectError::CodecUnavailable {
                format: format.to_string(),
            }
        })
    }

    pub fn contains(&self, format: Format) -> bool {
        self.codecs.contains_key(&format)
    }

    /// Registered formats, sorted.
    pub fn formats(&self) -> Vec<Format> {
        let mut formats: Vec<Format> = self.codecs.keys().copied().collect();
        formats.sort();
        formats
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
