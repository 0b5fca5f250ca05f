//! Sources: producers of frame reading sessions.
//!
//! A [`Source`] is bound to one byte endpoint. Each call to
//! [`Source::open`] starts an independent reading session. Two shapes are
//! provided here:
//!
//! - [`BufferedSource`] drains the endpoint into memory when a session opens and yields the
//!   content as exactly one frame. Many wire formats exchange one self-contained document per
//!   request, so the decoder never sees transport-level chunking.
//! - [`NullSource`] yields no frames at all, for requests without a body.
//!
//! Continuous, frame-at-a-time sources live with their framing scheme, for
//! example [`LengthPrefixedSource`](crate::frame::LengthPrefixedSource).

use std::io::{self, Read};

use bytes::Bytes;

use crate::{codec::CodecError, frame::FrameReader};

/// Producer of fresh [`FrameReader`] sessions bound to one endpoint.
pub trait Source {
    /// Start a new reading session.
    fn open(&mut self) -> Box<dyn FrameReader + '_>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn open(&mut self) -> Box<dyn FrameReader + '_> { (**self).open() }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn open(&mut self) -> Box<dyn FrameReader + '_> { (**self).open() }
}

/// Functional adapter implementing [`Source`] for a closure returning an
/// owned reader.
#[derive(Clone, Copy, Debug)]
pub struct SourceFn<F>(pub F);

impl<F, R> Source for SourceFn<F>
where
    F: FnMut() -> R,
    R: FrameReader + 'static,
{
    fn open(&mut self) -> Box<dyn FrameReader + '_> { Box::new((self.0)()) }
}

/// Capability turning a byte endpoint into a [`Source`].
///
/// Implemented for every `Fn(R) -> S`, so [`buffered_source`] is itself a
/// factory and decorating a factory is plain function composition.
pub trait SourceFactory<R> {
    /// Source type produced by this factory.
    type Source: Source;

    /// Bind a new source to `endpoint`.
    fn new_source(&self, endpoint: R) -> Self::Source;
}

impl<R, S, F> SourceFactory<R> for F
where
    F: Fn(R) -> S,
    S: Source,
{
    type Source = S;

    fn new_source(&self, endpoint: R) -> S { self(endpoint) }
}

/// Source that buffers its whole endpoint and yields it as one frame.
#[derive(Debug)]
pub struct BufferedSource<R> {
    endpoint: R,
}

impl<R: Read> BufferedSource<R> {
    /// Bind a buffered source to `endpoint`.
    pub fn new(endpoint: R) -> Self { Self { endpoint } }

    /// Release the endpoint.
    pub fn into_inner(self) -> R { self.endpoint }
}

/// Return a [`BufferedSource`] reading from `endpoint`.
///
/// ```
/// use wirecodec::{frame::FrameReader, source::{Source, buffered_source}};
///
/// let mut source = buffered_source(&b"{\"id\":1}"[..]);
/// let mut session = source.open();
/// assert_eq!(session.read_frame().unwrap().as_deref(), Some(&b"{\"id\":1}"[..]));
/// assert!(session.read_frame().unwrap().is_none());
/// ```
pub fn buffered_source<R: Read>(endpoint: R) -> BufferedSource<R> { BufferedSource::new(endpoint) }

impl<R: Read> Source for BufferedSource<R> {
    fn open(&mut self) -> Box<dyn FrameReader + '_> {
        let mut buf = Vec::new();
        let state = match self.endpoint.read_to_end(&mut buf) {
            Ok(len) => {
                tracing::trace!(bytes = len, "buffered source drained endpoint");
                OnceReader::Ready(Bytes::from(buf))
            }
            Err(e) => {
                tracing::debug!(error = %e, bytes = buf.len(), "buffered source drain failed");
                OnceReader::DrainFailed(e)
            }
        };
        Box::new(state)
    }
}

/// Session state for [`BufferedSource`]: the drained content is handed out
/// once. A drain failure is reported once and the session then stays failed.
enum OnceReader {
    Ready(Bytes),
    DrainFailed(io::Error),
    Ended,
    Failed,
}

impl FrameReader for OnceReader {
    fn read_frame(&mut self) -> Result<Option<Bytes>, CodecError> {
        match std::mem::replace(self, Self::Ended) {
            Self::Ready(frame) => Ok(Some(frame)),
            Self::DrainFailed(e) => {
                *self = Self::Failed;
                Err(CodecError::Io(e))
            }
            Self::Ended => Ok(None),
            Self::Failed => {
                *self = Self::Failed;
                Err(CodecError::Poisoned)
            }
        }
    }
}

/// Source whose sessions are empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSource;

/// Return a [`NullSource`].
#[must_use]
pub fn null_source() -> NullSource { NullSource }

impl Source for NullSource {
    fn open(&mut self) -> Box<dyn FrameReader + '_> { Box::new(EmptyReader) }
}

struct EmptyReader;

impl FrameReader for EmptyReader {
    fn read_frame(&mut self) -> Result<Option<Bytes>, CodecError> { Ok(None) }
}

#[cfg(test)]
mod tests {
    use std::io;

    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    struct FailingAfter {
        data: Option<Vec<u8>>,
    }

    impl Read for FailingAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                None => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            }
        }
    }

    #[rstest]
    #[case(b"".to_vec())]
    #[case(b"abc".to_vec())]
    #[case(vec![7u8; 200_000])]
    fn buffered_source_yields_content_once(#[case] content: Vec<u8>) {
        let mut source = buffered_source(content.as_slice());
        let mut session = source.open();
        let frame = session.read_frame().expect("first read").expect("one frame");
        assert_eq!(frame.as_ref(), content.as_slice());
        for _ in 0..3 {
            assert!(session.read_frame().expect("later read").is_none());
        }
    }

    #[test]
    fn buffered_source_reopens_on_drained_endpoint() {
        let mut source = buffered_source(&b"payload"[..]);
        let first = source.open().read_frame().expect("first session");
        assert_eq!(first.as_deref(), Some(&b"payload"[..]));

        let mut again = source.open();
        let second = again.read_frame().expect("second session");
        assert_eq!(second.as_deref(), Some(&b""[..]));
        assert!(again.read_frame().expect("terminal").is_none());
    }

    #[test]
    fn buffered_source_surfaces_drain_error_then_stays_failed() {
        let mut source = buffered_source(FailingAfter {
            data: Some(b"part".to_vec()),
        });
        let mut session = source.open();
        let err = session.read_frame().expect_err("drain error");
        match err {
            CodecError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected transport error, got {other:?}"),
        }
        for _ in 0..2 {
            assert!(matches!(
                session.read_frame().expect_err("failed session"),
                CodecError::Poisoned
            ));
        }
    }

    #[test]
    fn null_source_never_yields_frames() {
        let mut source = null_source();
        let mut session = source.open();
        assert!(session.read_frame().expect("read").is_none());
        assert!(session.read_frame().expect("read").is_none());
    }

    #[test]
    fn source_fn_opens_independent_sessions() {
        let mut opened = 0u8;
        let mut source = SourceFn(move || {
            opened += 1;
            let mut frame = Some(Bytes::from(vec![opened]));
            crate::frame::ReaderFn(move || Ok::<_, CodecError>(frame.take()))
        });
        assert_eq!(source.open().read_frame().unwrap().as_deref(), Some(&[1u8][..]));
        assert_eq!(source.open().read_frame().unwrap().as_deref(), Some(&[2u8][..]));
    }

    #[test]
    fn factory_functions_are_source_factories() {
        let factory = buffered_source::<&[u8]>;
        let mut source = factory.new_source(&b"xyz"[..]);
        assert_eq!(source.open().read_frame().unwrap().as_deref(), Some(&b"xyz"[..]));
    }

    proptest! {
        #[test]
        fn buffered_source_returns_exact_bytes(content in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let mut source = buffered_source(content.as_slice());
            let mut session = source.open();
            let frame = session.read_frame().unwrap();
            prop_assert_eq!(frame.as_deref(), Some(content.as_slice()));
            prop_assert!(session.read_frame().unwrap().is_none());
        }
    }
}
