//! Runtime codec selection.
//!
//! [`Codec`] is generic over its representation, which suits code that
//! knows its wire format at compile time. When the format is chosen at run
//! time, from configuration or a request's content-type, [`AnyCodec`] holds
//! either kind and [`CodecRegistry`] looks one up by name or content type.
//! Messages used through [`AnyEncoder`] and [`AnyDecoder`] must support both
//! representations.

use super::{Codec, CodecError, ConfigError, Decoder, Encoder, BINARY, JSON};
use crate::{
    media_type::MediaType,
    message::{Binary, DecodeWith, EncodeWith, Text},
    sink::Sink,
    source::Source,
};

/// A codec of either representation.
#[derive(Clone, Debug)]
pub enum AnyCodec {
    /// Binary codec.
    Binary(Codec<Binary>),
    /// Textual codec.
    Text(Codec<Text>),
}

impl AnyCodec {
    /// Name of the wrapped codec.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Binary(c) => c.name(),
            Self::Text(c) => c.name(),
        }
    }

    /// Media type of the wrapped codec.
    #[must_use]
    pub fn media_type(&self) -> &MediaType {
        match self {
            Self::Binary(c) => c.media_type(),
            Self::Text(c) => c.media_type(),
        }
    }

    /// Bind a new encoder to `sink`.
    pub fn new_encoder<'s>(&self, sink: &'s mut dyn Sink) -> AnyEncoder<'s> {
        match self {
            Self::Binary(c) => AnyEncoder::Binary(c.new_encoder(sink)),
            Self::Text(c) => AnyEncoder::Text(c.new_encoder(sink)),
        }
    }

    /// Bind a new decoder to `source`.
    pub fn new_decoder<'s>(&self, source: &'s mut dyn Source) -> AnyDecoder<'s> {
        match self {
            Self::Binary(c) => AnyDecoder::Binary(c.new_decoder(source)),
            Self::Text(c) => AnyDecoder::Text(c.new_decoder(source)),
        }
    }
}

impl From<Codec<Binary>> for AnyCodec {
    fn from(codec: Codec<Binary>) -> Self { Self::Binary(codec) }
}

impl From<Codec<Text>> for AnyCodec {
    fn from(codec: Codec<Text>) -> Self { Self::Text(codec) }
}

/// Encoder of either representation.
pub enum AnyEncoder<'s> {
    /// Binary encoder.
    Binary(Box<dyn Encoder<Binary> + 's>),
    /// Textual encoder.
    Text(Box<dyn Encoder<Text> + 's>),
}

impl AnyEncoder<'_> {
    /// Encode `message` with whichever representation this encoder uses.
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode`].
    pub fn encode<M>(&mut self, message: &M) -> Result<(), CodecError>
    where
        M: EncodeWith<Binary> + EncodeWith<Text>,
    {
        match self {
            Self::Binary(e) => e.encode(message),
            Self::Text(e) => e.encode(message),
        }
    }
}

/// Decoder of either representation.
pub enum AnyDecoder<'s> {
    /// Binary decoder.
    Binary(Box<dyn Decoder<Binary> + 's>),
    /// Textual decoder.
    Text(Box<dyn Decoder<Text> + 's>),
}

impl AnyDecoder<'_> {
    /// Decode the next frame into `message`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode<M>(&mut self, message: &mut M) -> Result<(), CodecError>
    where
        M: DecodeWith<Binary> + DecodeWith<Text>,
    {
        match self {
            Self::Binary(d) => d.decode(message),
            Self::Text(d) => d.decode(message),
        }
    }
}

/// Ordered collection of codecs with unique names.
#[derive(Clone, Debug, Default)]
pub struct CodecRegistry {
    codecs: Vec<AnyCodec>,
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a registry holding the built-in `binary` and `json` codecs.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            codecs: vec![AnyCodec::Binary(BINARY), AnyCodec::Text(JSON)],
        }
    }

    /// Add `codec` to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateName`] if a codec with the same name
    /// is already registered.
    pub fn register(&mut self, codec: impl Into<AnyCodec>) -> Result<&mut Self, ConfigError> {
        let codec = codec.into();
        if self.by_name(codec.name()).is_some() {
            return Err(ConfigError::DuplicateName(codec.name().to_owned()));
        }
        tracing::debug!(
            codec = codec.name(),
            media_type = %codec.media_type(),
            "registered codec"
        );
        self.codecs.push(codec);
        Ok(self)
    }

    /// Look a codec up by exact name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&AnyCodec> {
        self.codecs.iter().find(|c| c.name() == name)
    }

    /// Return the first registered codec whose media type matches a
    /// content-type header.
    #[must_use]
    pub fn by_content_type(&self, header: &str) -> Option<&AnyCodec> {
        self.codecs
            .iter()
            .find(|c| c.media_type().matches_content_type(header))
    }

    /// Iterate over registered codecs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AnyCodec> { self.codecs.iter() }
}

#[cfg(test)]
mod tests {
    use bincode::{Decode, Encode};
    use rstest::{fixture, rstest};
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{
        codec::{framed_decoder, framed_encoder},
        sink::plain_sink,
        source::buffered_source,
    };

    #[derive(Encode, Decode, Serialize, Deserialize, Debug, Default, PartialEq)]
    struct Status {
        healthy: bool,
        tasks: u16,
    }

    #[allow(
        unused_braces,
        reason = "rustc false positive for single line rstest fixtures"
    )]
    #[fixture]
    fn registry() -> CodecRegistry { CodecRegistry::with_defaults() }

    #[rstest]
    fn defaults_are_registered_in_order(registry: CodecRegistry) {
        let names: Vec<_> = registry.iter().map(AnyCodec::name).collect();
        assert_eq!(names, ["binary", "json"]);
    }

    #[rstest]
    #[case("application/json", "json")]
    #[case("application/json; charset=utf-8", "json")]
    #[case("application/x-bincode", "binary")]
    fn lookup_by_content_type(
        registry: CodecRegistry,
        #[case] header: &str,
        #[case] expected: &str,
    ) {
        let codec = registry.by_content_type(header).expect("codec");
        assert_eq!(codec.name(), expected);
    }

    #[rstest]
    fn unknown_lookups_return_none(registry: CodecRegistry) {
        assert!(registry.by_name("msgpack").is_none());
        assert!(registry.by_content_type("text/plain").is_none());
    }

    #[rstest]
    fn duplicate_names_are_rejected(mut registry: CodecRegistry) {
        let err = registry.register(JSON).expect_err("duplicate");
        assert!(matches!(err, ConfigError::DuplicateName(name) if name == "json"));
        assert_eq!(registry.iter().count(), 2);
    }

    #[rstest]
    fn custom_codecs_can_be_registered(mut registry: CodecRegistry) {
        let pretty = Codec::<Text>::new(
            "json-alt",
            MediaType::new("application/vnd.alt+json"),
            framed_encoder::<Text>,
            framed_decoder::<Text>,
        )
        .expect("codec");
        registry.register(pretty).expect("unique name");
        assert_eq!(
            registry
                .by_content_type("application/vnd.alt+json")
                .map(AnyCodec::name),
            Some("json-alt")
        );
    }

    #[rstest]
    #[case("binary")]
    #[case("json")]
    fn any_codec_round_trips_by_name(registry: CodecRegistry, #[case] name: &str) {
        let codec = registry.by_name(name).expect("registered");
        let status = Status {
            healthy: true,
            tasks: 12,
        };

        let mut wire = Vec::new();
        {
            let mut sink = plain_sink(&mut wire);
            codec.new_encoder(&mut sink).encode(&status).expect("encode");
        }

        let mut source = buffered_source(wire.as_slice());
        let mut decoded = Status::default();
        codec
            .new_decoder(&mut source)
            .decode(&mut decoded)
            .expect("decode");
        assert_eq!(decoded, status);
    }
}
