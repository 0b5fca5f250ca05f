//! Frame channel contract.
//!
//! A frame is an opaque byte sequence. [`FrameReader`] yields one frame at a
//! time from a session and [`FrameWriter`] writes one frame at a time to a
//! session. Nothing above this module knows how frames are delimited on the
//! wire: that is entirely the business of the reader and writer
//! implementations.
//!
//! [`ReaderFn`] and [`WriterFn`] turn ordinary closures into readers and
//! writers, so a session can be decorated by composing functions.
//!
//! ```
//! use bytes::Bytes;
//! use wirecodec::{
//!     CodecError,
//!     frame::{FrameReader, ReaderFn},
//! };
//!
//! let mut frames = vec![Bytes::from_static(b"b"), Bytes::from_static(b"a")];
//! let mut reader = ReaderFn(move || Ok::<_, CodecError>(frames.pop()));
//! assert_eq!(reader.read_frame().unwrap(), Some(Bytes::from_static(b"a")));
//! assert_eq!(reader.read_frame().unwrap(), Some(Bytes::from_static(b"b")));
//! assert_eq!(reader.read_frame().unwrap(), None);
//! ```

use bytes::Bytes;

use crate::codec::CodecError;

pub mod format;
pub mod length_prefixed;

pub use format::{Endianness, LengthFormat};
pub use length_prefixed::{
    LengthPrefixedCodec,
    LengthPrefixedSink,
    LengthPrefixedSource,
    MAX_FRAME_LENGTH,
    MIN_FRAME_LENGTH,
};

/// Reads one frame at a time from a session.
pub trait FrameReader {
    /// Return the next frame, or `Ok(None)` at end-of-stream.
    ///
    /// Once `Ok(None)` has been returned, every later call on the same
    /// session must return `Ok(None)` as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint fails or the frame boundary cannot be
    /// determined.
    fn read_frame(&mut self) -> Result<Option<Bytes>, CodecError>;
}

/// Writes one frame at a time to a session.
pub trait FrameWriter {
    /// Write `frame` as a single frame.
    ///
    /// # Errors
    ///
    /// Returns the endpoint's own error if it reports one, otherwise
    /// [`CodecError::ShortWrite`] when it accepted fewer bytes than supplied.
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), CodecError>;
}

/// Functional adapter implementing [`FrameReader`] for a closure.
#[derive(Clone, Copy, Debug)]
pub struct ReaderFn<F>(pub F);

impl<F> FrameReader for ReaderFn<F>
where
    F: FnMut() -> Result<Option<Bytes>, CodecError>,
{
    fn read_frame(&mut self) -> Result<Option<Bytes>, CodecError> { (self.0)() }
}

/// Functional adapter implementing [`FrameWriter`] for a closure.
#[derive(Clone, Copy, Debug)]
pub struct WriterFn<F>(pub F);

impl<F> FrameWriter for WriterFn<F>
where
    F: FnMut(&[u8]) -> Result<(), CodecError>,
{
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), CodecError> { (self.0)(frame) }
}

impl<R: FrameReader + ?Sized> FrameReader for &mut R {
    fn read_frame(&mut self) -> Result<Option<Bytes>, CodecError> { (**self).read_frame() }
}

impl<R: FrameReader + ?Sized> FrameReader for Box<R> {
    fn read_frame(&mut self) -> Result<Option<Bytes>, CodecError> { (**self).read_frame() }
}

impl<W: FrameWriter + ?Sized> FrameWriter for &mut W {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), CodecError> {
        (**self).write_frame(frame)
    }
}

impl<W: FrameWriter + ?Sized> FrameWriter for Box<W> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), CodecError> {
        (**self).write_frame(frame)
    }
}

/// Write `frame` to `endpoint` with exactly one accepted `write` call.
///
/// `Interrupted` is retried because no bytes were accepted. Any other
/// endpoint error is returned unchanged, and a partial write that reported
/// no error becomes [`CodecError::ShortWrite`].
pub(crate) fn write_once<W>(endpoint: &mut W, frame: &[u8]) -> Result<(), CodecError>
where
    W: std::io::Write + ?Sized,
{
    let written = loop {
        match endpoint.write(frame) {
            Ok(n) => break n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(CodecError::Io(e)),
        }
    };
    if written != frame.len() {
        return Err(CodecError::ShortWrite {
            written,
            expected: frame.len(),
        });
    }
    Ok(())
}
