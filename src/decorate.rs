//! Decorators adding cross-cutting behaviour to sources, sinks, encoders and
//! decoders.
//!
//! Decoration wraps the source or sink (or the factory producing it) and
//! never touches codecs or the frame contract, so any codec can be used over
//! a decorated endpoint. Factory wrappers compose in any order:
//!
//! ```
//! use wirecodec::{
//!     decorate::{FrameStats, with_counter, with_tracing},
//!     frame::FrameReader,
//!     source::{Source, SourceFactory, buffered_source},
//! };
//!
//! let stats = FrameStats::new();
//! let factory = with_tracing(with_counter(buffered_source, stats.clone()), "inbound");
//! let mut source = factory.new_source(&b"{}"[..]);
//! source.open().read_frame().unwrap();
//! assert_eq!((stats.frames(), stats.bytes()), (1, 2));
//! ```

use std::{
    borrow::Cow,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use bytes::Bytes;

use crate::{
    codec::{CodecError, Decoder, DecoderFn, Encoder, EncoderFn},
    frame::{FrameReader, FrameWriter, ReaderFn, WriterFn},
    message::{DecodeWith, EncodeWith, Format},
    sink::Sink,
    source::Source,
};

/// Shared frame and byte counters.
///
/// Clones observe and update the same totals, so one instance can be handed
/// to several decorated endpoints used from different threads.
#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    inner: Arc<Totals>,
}

#[derive(Debug, Default)]
struct Totals {
    frames: AtomicU64,
    bytes: AtomicU64,
}

impl FrameStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of frames transferred.
    #[must_use]
    pub fn frames(&self) -> u64 { self.inner.frames.load(Ordering::Relaxed) }

    /// Number of payload bytes transferred.
    #[must_use]
    pub fn bytes(&self) -> u64 { self.inner.bytes.load(Ordering::Relaxed) }

    fn record(&self, len: usize) {
        self.inner.frames.fetch_add(1, Ordering::Relaxed);
        self.inner
            .bytes
            .fetch_add(u64::try_from(len).unwrap_or(u64::MAX), Ordering::Relaxed);
    }
}

/// Source or sink counting every frame that passes through it.
///
/// Only frames actually read or written are counted; end-of-stream and
/// failed operations leave the totals untouched.
#[derive(Debug)]
pub struct Counted<S> {
    inner: S,
    stats: FrameStats,
}

impl<S> Counted<S> {
    /// Wrap `inner`, recording into `stats`.
    pub fn new(inner: S, stats: FrameStats) -> Self { Self { inner, stats } }

    /// Release the wrapped source or sink.
    pub fn into_inner(self) -> S { self.inner }
}

impl<S: Source> Source for Counted<S> {
    fn open(&mut self) -> Box<dyn FrameReader + '_> {
        let mut session = self.inner.open();
        let stats = self.stats.clone();
        Box::new(ReaderFn(move || -> Result<Option<Bytes>, CodecError> {
            let frame = session.read_frame()?;
            if let Some(frame) = &frame {
                stats.record(frame.len());
            }
            Ok(frame)
        }))
    }
}

impl<S: Sink> Sink for Counted<S> {
    fn open(&mut self) -> Box<dyn FrameWriter + '_> {
        let mut session = self.inner.open();
        let stats = self.stats.clone();
        Box::new(WriterFn(move |frame: &[u8]| -> Result<(), CodecError> {
            session.write_frame(frame)?;
            stats.record(frame.len());
            Ok(())
        }))
    }
}

/// Source or sink emitting a `tracing` event for every frame.
#[derive(Debug)]
pub struct Traced<S> {
    inner: S,
    label: Cow<'static, str>,
}

impl<S> Traced<S> {
    /// Wrap `inner`; `label` is attached to every event.
    pub fn new(inner: S, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner,
            label: label.into(),
        }
    }

    /// Release the wrapped source or sink.
    pub fn into_inner(self) -> S { self.inner }
}

impl<S: Source> Source for Traced<S> {
    fn open(&mut self) -> Box<dyn FrameReader + '_> {
        let mut session = self.inner.open();
        let label = self.label.clone();
        Box::new(ReaderFn(move || -> Result<Option<Bytes>, CodecError> {
            match session.read_frame() {
                Ok(Some(frame)) => {
                    tracing::debug!(label = %label, bytes = frame.len(), "frame read");
                    Ok(Some(frame))
                }
                Ok(None) => {
                    tracing::debug!(label = %label, "end of stream");
                    Ok(None)
                }
                Err(e) => {
                    tracing::debug!(label = %label, error = %e, "frame read failed");
                    Err(e)
                }
            }
        }))
    }
}

impl<S: Sink> Sink for Traced<S> {
    fn open(&mut self) -> Box<dyn FrameWriter + '_> {
        let mut session = self.inner.open();
        let label = self.label.clone();
        Box::new(WriterFn(move |frame: &[u8]| -> Result<(), CodecError> {
            match session.write_frame(frame) {
                Ok(()) => {
                    tracing::debug!(label = %label, bytes = frame.len(), "frame written");
                    Ok(())
                }
                Err(e) => {
                    tracing::debug!(label = %label, error = %e, "frame write failed");
                    Err(e)
                }
            }
        }))
    }
}

/// Wrap a source or sink factory so every product is [`Counted`].
pub fn with_counter<E, F, S>(factory: F, stats: FrameStats) -> impl Fn(E) -> Counted<S>
where
    F: Fn(E) -> S,
{
    move |endpoint| Counted::new(factory(endpoint), stats.clone())
}

/// Wrap a source or sink factory so every product is [`Traced`].
pub fn with_tracing<E, F, S>(
    factory: F,
    label: impl Into<Cow<'static, str>>,
) -> impl Fn(E) -> Traced<S>
where
    F: Fn(E) -> S,
{
    let label = label.into();
    move |endpoint| Traced::new(factory(endpoint), label.clone())
}

/// Wrap an encoder so each message logs its outcome.
pub fn traced_encoder<F, E>(label: impl Into<Cow<'static, str>>, mut inner: E) -> impl Encoder<F>
where
    F: Format,
    E: Encoder<F>,
{
    let label = label.into();
    EncoderFn(move |message: &dyn EncodeWith<F>| -> Result<(), CodecError> {
        let result = inner.encode(message);
        match &result {
            Ok(()) => tracing::debug!(label = %label, format = F::NAME, "message encoded"),
            Err(e) => tracing::debug!(
                label = %label,
                format = F::NAME,
                error = %e,
                "message encode failed"
            ),
        }
        result
    })
}

/// Wrap a decoder so each message logs its outcome.
pub fn traced_decoder<F, D>(label: impl Into<Cow<'static, str>>, mut inner: D) -> impl Decoder<F>
where
    F: Format,
    D: Decoder<F>,
{
    let label = label.into();
    DecoderFn(move |message: &mut dyn DecodeWith<F>| -> Result<(), CodecError> {
        let result = inner.decode(message);
        match &result {
            Ok(()) => tracing::debug!(label = %label, format = F::NAME, "message decoded"),
            Err(e) if e.is_end_of_stream() => {
                tracing::debug!(label = %label, format = F::NAME, "end of stream");
            }
            Err(e) => tracing::debug!(
                label = %label,
                format = F::NAME,
                error = %e,
                "message decode failed"
            ),
        }
        result
    })
}
