//! Byte endpoints with controllable misbehaviour.

use std::io::{self, Read, Write};

/// Writer accepting at most `limit` bytes per `write` call.
#[derive(Debug, Default)]
pub struct ShortWriter {
    limit: usize,
    written: Vec<u8>,
}

impl ShortWriter {
    /// Create a writer that accepts at most `limit` bytes per call.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            written: Vec::new(),
        }
    }

    /// Bytes accepted so far.
    #[must_use]
    pub fn written(&self) -> &[u8] { &self.written }
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.limit);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Writer failing every call with a fixed error kind.
#[derive(Clone, Copy, Debug)]
pub struct FailingWriter(pub io::ErrorKind);

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> { Err(io::Error::from(self.0)) }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Reader yielding `data` and then failing with `kind` instead of reporting
/// end of input.
#[derive(Debug)]
pub struct FailingReader {
    data: io::Cursor<Vec<u8>>,
    kind: io::ErrorKind,
}

impl FailingReader {
    /// Create a reader that fails with `kind` once `data` is consumed.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>, kind: io::ErrorKind) -> Self {
        Self {
            data: io::Cursor::new(data.into()),
            kind,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 if !buf.is_empty() => Err(io::Error::from(self.kind)),
            n => Ok(n),
        }
    }
}

/// Reader returning at most `chunk` bytes per call, optionally reporting
/// `Interrupted` before every chunk.
#[derive(Debug)]
pub struct ChunkedReader {
    data: io::Cursor<Vec<u8>>,
    chunk: usize,
    interrupt: bool,
    interrupted: bool,
}

impl ChunkedReader {
    /// Create a reader serving `data` in chunks of at most `chunk` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is zero.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        assert!(chunk > 0, "chunk size must be non-zero");
        Self {
            data: io::Cursor::new(data.into()),
            chunk,
            interrupt: false,
            interrupted: false,
        }
    }

    /// Report `Interrupted` once before every chunk.
    #[must_use]
    pub fn with_interrupts(mut self) -> Self {
        self.interrupt = true;
        self
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupt && !self.interrupted {
            self.interrupted = true;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        self.interrupted = false;
        let len = buf.len().min(self.chunk);
        self.data.read(&mut buf[..len])
    }
}
