//! Declarative codec and framing configuration.
//!
//! [`CodecConfig`] is deserialised from whatever configuration source the
//! host application uses and resolves to a registered codec plus the source
//! and sink shapes to put around an endpoint.
//!
//! ```
//! use wirecodec::{codec::CodecRegistry, config::CodecConfig};
//!
//! let config: CodecConfig = serde_json::from_str(
//!     r#"{ "content_type": "application/json", "framing": { "kind": "length_prefixed" } }"#,
//! )
//! .unwrap();
//! let registry = CodecRegistry::with_defaults();
//! let codec = config.resolve(&registry).unwrap();
//! assert_eq!(codec.name(), "json");
//! ```

use std::io::{Read, Write};

use serde::Deserialize;

use crate::{
    codec::{AnyCodec, CodecRegistry, ConfigError},
    frame::{
        Endianness,
        LengthFormat,
        LengthPrefixedCodec,
        LengthPrefixedSink,
        LengthPrefixedSource,
        MAX_FRAME_LENGTH,
    },
    sink::{Sink, plain_sink},
    source::{Source, buffered_source},
};

/// Codec selection and framing options.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Registered codec name, for example `"json"`.
    pub codec: Option<String>,
    /// Content type used when no codec name is given.
    pub content_type: Option<String>,
    /// How frames are delimited on the endpoint.
    pub framing: FramingConfig,
}

impl CodecConfig {
    /// Look the configured codec up in `registry`.
    ///
    /// A codec name takes precedence over a content type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSelection`] if neither is set, or
    /// [`ConfigError::UnknownCodec`] / [`ConfigError::UnknownContentType`]
    /// if nothing registered matches.
    pub fn resolve<'r>(&self, registry: &'r CodecRegistry) -> Result<&'r AnyCodec, ConfigError> {
        match (&self.codec, &self.content_type) {
            (Some(name), _) => registry
                .by_name(name)
                .ok_or_else(|| ConfigError::UnknownCodec(name.clone())),
            (None, Some(content_type)) => registry
                .by_content_type(content_type)
                .ok_or_else(|| ConfigError::UnknownContentType(content_type.clone())),
            (None, None) => Err(ConfigError::MissingSelection),
        }
    }
}

/// Frame delimiting strategy.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FramingKind {
    /// One frame per session holding the whole endpoint content.
    #[default]
    Buffered,
    /// Continuous stream of length-prefixed frames.
    LengthPrefixed,
}

/// Framing options.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FramingConfig {
    /// Framing strategy.
    pub kind: FramingKind,
    /// Width of the length prefix in bytes: 1, 2, 4 or 8.
    pub prefix_bytes: usize,
    /// Byte order of the length prefix.
    pub endianness: Endianness,
    /// Largest accepted frame; clamped to the supported range.
    pub max_frame_length: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            kind: FramingKind::Buffered,
            prefix_bytes: 4,
            endianness: Endianness::Big,
            max_frame_length: MAX_FRAME_LENGTH,
        }
    }
}

impl FramingConfig {
    /// Build the length-prefixed codec described by these options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefixWidth`] for unsupported widths.
    pub fn length_codec(&self) -> Result<LengthPrefixedCodec, ConfigError> {
        let format = LengthFormat::try_new(self.prefix_bytes, self.endianness)?;
        Ok(LengthPrefixedCodec::new(format, self.max_frame_length))
    }

    /// Build a source over `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefixWidth`] for unsupported widths.
    pub fn source<'a, R>(&self, endpoint: R) -> Result<Box<dyn Source + 'a>, ConfigError>
    where
        R: Read + 'a,
    {
        let source: Box<dyn Source + 'a> = match self.kind {
            FramingKind::Buffered => Box::new(buffered_source(endpoint)),
            FramingKind::LengthPrefixed => {
                Box::new(LengthPrefixedSource::new(endpoint, self.length_codec()?))
            }
        };
        Ok(source)
    }

    /// Build a sink over `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefixWidth`] for unsupported widths.
    pub fn sink<'a, W>(&self, endpoint: W) -> Result<Box<dyn Sink + 'a>, ConfigError>
    where
        W: Write + 'a,
    {
        let sink: Box<dyn Sink + 'a> = match self.kind {
            FramingKind::Buffered => Box::new(plain_sink(endpoint)),
            FramingKind::LengthPrefixed => {
                Box::new(LengthPrefixedSink::new(endpoint, self.length_codec()?))
            }
        };
        Ok(sink)
    }
}
