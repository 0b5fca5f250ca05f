//! Length-prefixed framing for continuous endpoints.
//!
//! Each frame is written as a length prefix (see [`LengthFormat`]) followed
//! by the payload. [`LengthPrefixedCodec`] implements the `tokio_util` codec
//! traits over [`BytesMut`]; [`LengthPrefixedSource`] and
//! [`LengthPrefixedSink`] drive it against blocking [`Read`] and [`Write`]
//! endpoints, one frame per call.

use std::io::{self, Read, Write};

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{FrameReader, FrameWriter, LengthFormat, write_once};
use crate::{
    codec::{CodecError, EofError, FramingError},
    sink::Sink,
    source::Source,
};

/// Minimum frame length in bytes.
///
/// Maximum frame lengths passed to [`LengthPrefixedCodec::new`] are clamped
/// to at least this value.
pub const MIN_FRAME_LENGTH: usize = 64;

/// Maximum frame length in bytes (16 MiB).
///
/// Maximum frame lengths passed to [`LengthPrefixedCodec::new`] are clamped
/// to at most this value to prevent unbounded allocation.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// Length-prefixed frame codec.
#[derive(Clone, Copy, Debug)]
pub struct LengthPrefixedCodec {
    format: LengthFormat,
    max_frame_length: usize,
}

impl LengthPrefixedCodec {
    /// Construct a codec with the given prefix format and maximum frame
    /// length, clamped into [`MIN_FRAME_LENGTH`]..=[`MAX_FRAME_LENGTH`].
    #[must_use]
    pub fn new(format: LengthFormat, max_frame_length: usize) -> Self {
        Self {
            format,
            max_frame_length: max_frame_length.clamp(MIN_FRAME_LENGTH, MAX_FRAME_LENGTH),
        }
    }

    /// Prefix format used by this codec.
    #[must_use]
    pub fn format(&self) -> LengthFormat { self.format }

    /// Return the maximum frame length accepted by this codec.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.max_frame_length }

    fn check_len(&self, size: usize) -> Result<(), FramingError> {
        if size > self.max_frame_length {
            return Err(FramingError::OversizedFrame {
                size,
                max: self.max_frame_length,
            });
        }
        Ok(())
    }
}

impl Default for LengthPrefixedCodec {
    fn default() -> Self { Self::new(LengthFormat::default(), MAX_FRAME_LENGTH) }
}

impl Decoder for LengthPrefixedCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(len) = self.format.read_len(src) else {
            return Ok(None);
        };
        self.check_len(len)?;
        let header = self.format.bytes();
        if src.len() - header < len {
            src.reserve(header + len - src.len());
            return Ok(None);
        }
        src.advance(header);
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Clean close: no data remaining at frame boundary
        if src.is_empty() {
            return Ok(None);
        }
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        let err = build_eof_error(self.format, src);
        tracing::debug!(error = %err, "stream ended inside a frame");
        Err(err.into())
    }
}

/// Classify a truncated buffer at end of input.
///
/// - [`EofError::MidHeader`]: fewer bytes than the length prefix arrived.
/// - [`EofError::MidFrame`]: the prefix arrived but the payload is short.
fn build_eof_error(format: LengthFormat, src: &BytesMut) -> EofError {
    let header_size = format.bytes();
    match format.read_len(src) {
        Some(expected) => EofError::MidFrame {
            bytes_received: src.len() - header_size,
            expected,
        },
        None => EofError::MidHeader {
            bytes_received: src.len(),
            header_size,
        },
    }
}

impl Encoder<&[u8]> for LengthPrefixedCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.check_len(item.len())?;
        dst.reserve(self.format.bytes() + item.len());
        self.format.write_len(item.len(), dst)?;
        dst.extend_from_slice(item);
        Ok(())
    }
}

/// Source producing length-prefixed frames lazily from a byte endpoint.
///
/// Each [`open`](Source::open) starts a session with an empty read buffer;
/// bytes buffered by an earlier session are not carried over.
#[derive(Debug)]
pub struct LengthPrefixedSource<R> {
    endpoint: R,
    codec: LengthPrefixedCodec,
}

impl<R: Read> LengthPrefixedSource<R> {
    /// Wrap `endpoint` using `codec` for frame boundaries.
    pub fn new(endpoint: R, codec: LengthPrefixedCodec) -> Self { Self { endpoint, codec } }

    /// Release the endpoint.
    pub fn into_inner(self) -> R { self.endpoint }
}

impl<R: Read> Source for LengthPrefixedSource<R> {
    fn open(&mut self) -> Box<dyn FrameReader + '_> {
        Box::new(LengthPrefixedReader {
            endpoint: &mut self.endpoint,
            codec: self.codec,
            buffer: BytesMut::new(),
            state: ReadState::Open,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReadState {
    Open,
    Ended,
    Failed,
}

struct LengthPrefixedReader<'a, R> {
    endpoint: &'a mut R,
    codec: LengthPrefixedCodec,
    buffer: BytesMut,
    state: ReadState,
}

impl<R: Read> LengthPrefixedReader<'_, R> {
    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.endpoint.read(&mut chunk) {
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn next_frame(&mut self) -> Result<Option<Bytes>, CodecError> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }
            if self.fill()? == 0 {
                return self.codec.decode_eof(&mut self.buffer);
            }
        }
    }
}

impl<R: Read> FrameReader for LengthPrefixedReader<'_, R> {
    fn read_frame(&mut self) -> Result<Option<Bytes>, CodecError> {
        match self.state {
            ReadState::Open => {}
            ReadState::Ended => return Ok(None),
            ReadState::Failed => return Err(CodecError::Poisoned),
        }
        let result = self.next_frame();
        match &result {
            Ok(Some(_)) => {}
            Ok(None) => self.state = ReadState::Ended,
            Err(_) => self.state = ReadState::Failed,
        }
        result
    }
}

/// Sink writing each frame with a length prefix.
#[derive(Debug)]
pub struct LengthPrefixedSink<W> {
    endpoint: W,
    codec: LengthPrefixedCodec,
}

impl<W: Write> LengthPrefixedSink<W> {
    /// Wrap `endpoint` using `codec` for frame boundaries.
    pub fn new(endpoint: W, codec: LengthPrefixedCodec) -> Self { Self { endpoint, codec } }

    /// Release the endpoint.
    pub fn into_inner(self) -> W { self.endpoint }
}

impl<W: Write> Sink for LengthPrefixedSink<W> {
    fn open(&mut self) -> Box<dyn FrameWriter + '_> {
        Box::new(LengthPrefixedWriter {
            endpoint: &mut self.endpoint,
            codec: self.codec,
            buffer: BytesMut::new(),
        })
    }
}

struct LengthPrefixedWriter<'a, W> {
    endpoint: &'a mut W,
    codec: LengthPrefixedCodec,
    buffer: BytesMut,
}

impl<W: Write> FrameWriter for LengthPrefixedWriter<'_, W> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), CodecError> {
        self.buffer.clear();
        self.codec.encode(frame, &mut self.buffer)?;
        write_once(self.endpoint, &self.buffer)
    }
}
