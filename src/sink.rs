//! Sinks: producers of frame writing sessions.

use std::io::Write;

use crate::{
    codec::CodecError,
    frame::{FrameWriter, write_once},
};

/// Producer of fresh [`FrameWriter`] sessions bound to one endpoint.
pub trait Sink {
    /// Start a new writing session.
    fn open(&mut self) -> Box<dyn FrameWriter + '_>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn open(&mut self) -> Box<dyn FrameWriter + '_> { (**self).open() }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn open(&mut self) -> Box<dyn FrameWriter + '_> { (**self).open() }
}

/// Functional adapter implementing [`Sink`] for a closure returning an owned
/// writer.
#[derive(Clone, Copy, Debug)]
pub struct SinkFn<F>(pub F);

impl<F, W> Sink for SinkFn<F>
where
    F: FnMut() -> W,
    W: FrameWriter + 'static,
{
    fn open(&mut self) -> Box<dyn FrameWriter + '_> { Box::new((self.0)()) }
}

/// Capability turning a byte endpoint into a [`Sink`].
pub trait SinkFactory<W> {
    /// Sink type produced by this factory.
    type Sink: Sink;

    /// Bind a new sink to `endpoint`.
    fn new_sink(&self, endpoint: W) -> Self::Sink;
}

impl<W, S, F> SinkFactory<W> for F
where
    F: Fn(W) -> S,
    S: Sink,
{
    type Sink = S;

    fn new_sink(&self, endpoint: W) -> S { self(endpoint) }
}

/// Sink writing each frame to its endpoint with no decoration.
#[derive(Debug)]
pub struct PlainSink<W> {
    endpoint: W,
}

impl<W: Write> PlainSink<W> {
    /// Bind a plain sink to `endpoint`.
    pub fn new(endpoint: W) -> Self { Self { endpoint } }

    /// Release the endpoint.
    pub fn into_inner(self) -> W { self.endpoint }
}

/// Return a [`PlainSink`] writing to `endpoint`.
///
/// ```
/// use wirecodec::sink::{Sink, plain_sink};
///
/// let mut out = Vec::new();
/// plain_sink(&mut out).open().write_frame(b"{}").unwrap();
/// assert_eq!(out, b"{}");
/// ```
pub fn plain_sink<W: Write>(endpoint: W) -> PlainSink<W> { PlainSink::new(endpoint) }

impl<W: Write> Sink for PlainSink<W> {
    fn open(&mut self) -> Box<dyn FrameWriter + '_> { Box::new(PlainWriter(&mut self.endpoint)) }
}

struct PlainWriter<'a, W>(&'a mut W);

impl<W: Write> FrameWriter for PlainWriter<'_, W> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), CodecError> { write_once(self.0, frame) }
}
