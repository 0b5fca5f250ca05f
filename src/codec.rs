//! Codecs: named pairings of a wire representation with encoder and
//! decoder builders.
//!
//! A [`Codec`] is the unit of configuration choice. It owns no I/O state:
//! [`Codec::new_encoder`] binds an [`Encoder`] to a [`Sink`] and
//! [`Codec::new_decoder`] binds a [`Decoder`] to a [`Source`]. Each encoder
//! writes exactly one frame per message and each decoder reads exactly one
//! frame per message, whatever framing the sink or source applies.
//!
//! ```
//! use wirecodec::{codec, sink::plain_sink, source::buffered_source};
//!
//! #[derive(bincode::Encode, bincode::Decode, Default)]
//! struct Offer {
//!     cpus: u32,
//! }
//!
//! let mut wire = Vec::new();
//! let mut sink = plain_sink(&mut wire);
//! codec::BINARY.new_encoder(&mut sink).encode(&Offer { cpus: 42 }).unwrap();
//! drop(sink);
//!
//! let mut source = buffered_source(wire.as_slice());
//! let mut offer = Offer::default();
//! codec::BINARY.new_decoder(&mut source).decode(&mut offer).unwrap();
//! assert_eq!(offer.cpus, 42);
//! ```
//!
//! # Error Handling
//!
//! Every failure is reported as a [`CodecError`]. Callers distinguish a
//! clean end of stream ([`CodecError::is_end_of_stream`]) from a malformed
//! message ([`CodecError::Deserialize`]) and from transport failures. See the
//! [`error`] module for the full taxonomy.

use std::{borrow::Cow, fmt, marker::PhantomData};

use crate::{
    frame::{FrameReader, FrameWriter},
    media_type::MediaType,
    message::{Binary, DecodeWith, EncodeWith, Format, Text},
    sink::Sink,
    source::Source,
};

pub mod error;
pub mod registry;

pub use error::{
    BoxError,
    CodecError,
    ConfigError,
    EofError,
    FramingError,
    RecoveryPolicy,
};
pub use registry::{AnyCodec, AnyDecoder, AnyEncoder, CodecRegistry};

/// Built-in binary codec named `"binary"`.
pub const BINARY: Codec<Binary> = Codec::from_static(
    "binary",
    MediaType::BINARY,
    framed_encoder::<Binary>,
    framed_decoder::<Binary>,
);

/// Built-in JSON codec named `"json"`.
pub const JSON: Codec<Text> = Codec::from_static(
    "json",
    MediaType::JSON,
    framed_encoder::<Text>,
    framed_decoder::<Text>,
);

/// Encodes one message per call into representation `F`.
pub trait Encoder<F: Format> {
    /// Serialise `message` and write it as exactly one frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialize`] if the message cannot be serialised
    /// (nothing is written), otherwise any error from the frame writer.
    fn encode(&mut self, message: &dyn EncodeWith<F>) -> Result<(), CodecError>;
}

/// Decodes one message per call from representation `F`.
pub trait Decoder<F: Format> {
    /// Read exactly one frame and populate `message` from it.
    ///
    /// # Errors
    ///
    /// Returns an end-of-stream [`CodecError::Eof`] when no frame remains,
    /// [`CodecError::Deserialize`] if the frame is rejected by the message,
    /// otherwise any error from the frame reader.
    fn decode(&mut self, message: &mut dyn DecodeWith<F>) -> Result<(), CodecError>;
}

impl<F: Format, E: Encoder<F> + ?Sized> Encoder<F> for Box<E> {
    fn encode(&mut self, message: &dyn EncodeWith<F>) -> Result<(), CodecError> {
        (**self).encode(message)
    }
}

impl<F: Format, D: Decoder<F> + ?Sized> Decoder<F> for Box<D> {
    fn decode(&mut self, message: &mut dyn DecodeWith<F>) -> Result<(), CodecError> {
        (**self).decode(message)
    }
}

/// Functional adapter implementing [`Encoder`] for a closure.
///
/// Wrapping an existing encoder in a closure is how cross-cutting behaviour
/// is layered on without new types:
///
/// ```
/// use wirecodec::{
///     codec::{self, Encoder, EncoderFn},
///     message::EncodeWith,
///     sink::plain_sink,
/// };
///
/// let mut sent = 0;
/// let mut sink = plain_sink(Vec::new());
/// let mut inner = codec::JSON.new_encoder(&mut sink);
/// let mut counting = EncoderFn(|m: &dyn EncodeWith<_>| {
///     sent += 1;
///     inner.encode(m)
/// });
/// counting.encode(&"hello").unwrap();
/// drop(counting);
/// assert_eq!(sent, 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EncoderFn<F>(pub F);

impl<Fmt, F> Encoder<Fmt> for EncoderFn<F>
where
    Fmt: Format,
    F: FnMut(&dyn EncodeWith<Fmt>) -> Result<(), CodecError>,
{
    fn encode(&mut self, message: &dyn EncodeWith<Fmt>) -> Result<(), CodecError> {
        (self.0)(message)
    }
}

/// Functional adapter implementing [`Decoder`] for a closure.
#[derive(Clone, Copy, Debug)]
pub struct DecoderFn<F>(pub F);

impl<Fmt, F> Decoder<Fmt> for DecoderFn<F>
where
    Fmt: Format,
    F: FnMut(&mut dyn DecodeWith<Fmt>) -> Result<(), CodecError>,
{
    fn decode(&mut self, message: &mut dyn DecodeWith<Fmt>) -> Result<(), CodecError> {
        (self.0)(message)
    }
}

/// Builder turning a [`Sink`] into an [`Encoder`].
pub type EncoderBuilder<F> = for<'s> fn(&'s mut dyn Sink) -> Box<dyn Encoder<F> + 's>;

/// Builder turning a [`Source`] into a [`Decoder`].
pub type DecoderBuilder<F> = for<'s> fn(&'s mut dyn Source) -> Box<dyn Decoder<F> + 's>;

/// A named, immutable pairing of a media type with encoder and decoder
/// builders for representation `F`.
pub struct Codec<F: Format> {
    name: Cow<'static, str>,
    media_type: MediaType,
    new_encoder: EncoderBuilder<F>,
    new_decoder: DecoderBuilder<F>,
}

impl<F: Format> Codec<F> {
    /// Construct a codec.
    ///
    /// The media type is not checked against what the builders produce;
    /// pairing them correctly is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyName`] if `name` is empty or whitespace.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        media_type: MediaType,
        new_encoder: EncoderBuilder<F>,
        new_decoder: DecoderBuilder<F>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(Self {
            name,
            media_type,
            new_encoder,
            new_decoder,
        })
    }

    const fn from_static(
        name: &'static str,
        media_type: MediaType,
        new_encoder: EncoderBuilder<F>,
        new_decoder: DecoderBuilder<F>,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            media_type,
            new_encoder,
            new_decoder,
        }
    }

    /// Human-readable codec name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Media type naming this codec's wire representation.
    #[must_use]
    pub fn media_type(&self) -> &MediaType { &self.media_type }

    /// Bind a new encoder to `sink`.
    pub fn new_encoder<'s>(&self, sink: &'s mut dyn Sink) -> Box<dyn Encoder<F> + 's> {
        (self.new_encoder)(sink)
    }

    /// Bind a new decoder to `source`.
    pub fn new_decoder<'s>(&self, source: &'s mut dyn Source) -> Box<dyn Decoder<F> + 's> {
        (self.new_decoder)(source)
    }
}

impl<F: Format> Clone for Codec<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            media_type: self.media_type.clone(),
            new_encoder: self.new_encoder,
            new_decoder: self.new_decoder,
        }
    }
}

impl<F: Format> fmt::Debug for Codec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("format", &F::NAME)
            .finish_non_exhaustive()
    }
}

impl<F: Format> fmt::Display for Codec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.name) }
}

/// Progress of a frame session as seen by an encoder or decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum SessionState {
    #[default]
    Open,
    Ended,
    Failed,
}

/// Standard encoder writing one frame per message to a frame writer.
pub struct FramedEncoder<'s, F> {
    writer: Box<dyn FrameWriter + 's>,
    state: SessionState,
    _format: PhantomData<F>,
}

impl<'s, F: Format> FramedEncoder<'s, F> {
    /// Wrap an open frame writer session.
    pub fn new(writer: Box<dyn FrameWriter + 's>) -> Self {
        Self {
            writer,
            state: SessionState::Open,
            _format: PhantomData,
        }
    }
}

impl<F: Format> Encoder<F> for FramedEncoder<'_, F> {
    fn encode(&mut self, message: &dyn EncodeWith<F>) -> Result<(), CodecError> {
        if self.state != SessionState::Open {
            return Err(CodecError::Poisoned);
        }
        let frame = message.encode_with().map_err(CodecError::Serialize)?;
        if let Err(e) = self.writer.write_frame(&frame) {
            tracing::debug!(
                format = F::NAME,
                error = %e,
                "frame write failed; session closed"
            );
            self.state = SessionState::Failed;
            return Err(e);
        }
        tracing::trace!(format = F::NAME, bytes = frame.len(), "encoded frame");
        Ok(())
    }
}

/// Standard decoder reading one frame per message from a frame reader.
pub struct FramedDecoder<'s, F> {
    reader: Box<dyn FrameReader + 's>,
    state: SessionState,
    _format: PhantomData<F>,
}

impl<'s, F: Format> FramedDecoder<'s, F> {
    /// Wrap an open frame reader session.
    pub fn new(reader: Box<dyn FrameReader + 's>) -> Self {
        Self {
            reader,
            state: SessionState::Open,
            _format: PhantomData,
        }
    }
}

impl<F: Format> Decoder<F> for FramedDecoder<'_, F> {
    fn decode(&mut self, message: &mut dyn DecodeWith<F>) -> Result<(), CodecError> {
        match self.state {
            SessionState::Open => {}
            SessionState::Ended => return Err(EofError::EndOfStream.into()),
            SessionState::Failed => return Err(CodecError::Poisoned),
        }
        match self.reader.read_frame() {
            Ok(Some(frame)) => {
                tracing::trace!(format = F::NAME, bytes = frame.len(), "decoding frame");
                message.decode_with(&frame).map_err(CodecError::Deserialize)
            }
            Ok(None) => {
                tracing::debug!(format = F::NAME, "end of stream");
                self.state = SessionState::Ended;
                Err(EofError::EndOfStream.into())
            }
            Err(e) => {
                tracing::debug!(
                    format = F::NAME,
                    error = %e,
                    "frame read failed; session closed"
                );
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }
}

/// Encoder builder opening one session on `sink` and wrapping it in a
/// [`FramedEncoder`].
pub fn framed_encoder<F: Format>(sink: &mut dyn Sink) -> Box<dyn Encoder<F> + '_> {
    Box::new(FramedEncoder::<F>::new(sink.open()))
}

/// Decoder builder opening one session on `source` and wrapping it in a
/// [`FramedDecoder`].
pub fn framed_decoder<F: Format>(source: &mut dyn Source) -> Box<dyn Decoder<F> + '_> {
    Box::new(FramedDecoder::<F>::new(source.open()))
}
