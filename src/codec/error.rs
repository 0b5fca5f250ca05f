//! Error types for the codec layer.
//!
//! This module provides a structured error taxonomy that lets callers tell
//! apart the ways an encode or decode call can end:
//!
//! - [`ConfigError`]: a codec, registry, or framing setting was rejected at construction time.
//! - [`FramingError`]: the frame layer could not delimit a frame (oversized or malformed length
//!   prefix).
//! - [`EofError`]: end-of-stream conditions, separating a clean end from a truncated frame.
//! - [`CodecError`]: top-level enum wrapping all categories plus transport, short-write,
//!   serialisation, and deserialisation failures.
//!
//! # Recovery Policies
//!
//! Each error has a recommended [`RecoveryPolicy`] available through
//! [`CodecError::default_recovery_policy`]. Only message-level failures can
//! be dropped; everything else leaves the session unusable.

use std::{error::Error, io};

use thiserror::Error;

/// Boxed error returned by message marshaling hooks.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Recommended reaction to a [`CodecError`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Discard the offending message and keep using the session.
    ///
    /// Used for serialisation and deserialisation failures, which never
    /// affect frame boundaries.
    #[default]
    Drop,

    /// Abandon the session.
    ///
    /// Required when the transport failed, framing state is corrupted, or
    /// the stream has ended.
    Disconnect,
}

impl RecoveryPolicy {
    /// Returns the policy name as a static string for logging.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirecodec::codec::RecoveryPolicy;
    ///
    /// assert_eq!(RecoveryPolicy::Drop.as_str(), "drop");
    /// assert_eq!(RecoveryPolicy::Disconnect.as_str(), "disconnect");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Disconnect => "disconnect",
        }
    }
}

/// Construction-time configuration errors.
///
/// These are fatal and never retried: they describe a programming or
/// deployment mistake rather than a transient condition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A codec was given an empty name.
    #[error("codec name must not be empty")]
    EmptyName,

    /// A registry already holds a codec with this name.
    #[error("codec {0:?} is already registered")]
    DuplicateName(String),

    /// Neither a codec name nor a content type was supplied.
    #[error("no codec selected: supply a codec name or a content type")]
    MissingSelection,

    /// No registered codec carries the requested name.
    #[error("unknown codec {0:?}")]
    UnknownCodec(String),

    /// No registered codec matches the requested content type.
    #[error("no codec for content type {0:?}")]
    UnknownContentType(String),

    /// A length prefix width outside `1`, `2`, `4`, or `8` bytes.
    #[error("unsupported length prefix width: {0} bytes")]
    InvalidPrefixWidth(usize),
}

/// Framing-level errors occurring during frame boundary detection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Frame length exceeds the configured maximum.
    #[error("frame exceeds max length: {size} > {max}")]
    OversizedFrame {
        /// Frame size declared by the prefix or supplied by the caller.
        size: usize,
        /// Maximum allowed frame size.
        max: usize,
    },

    /// Frame length cannot be represented by the configured prefix.
    #[error("frame length {len} does not fit in a {width}-byte prefix")]
    LengthOverflow {
        /// Length that was rejected.
        len: usize,
        /// Prefix width in bytes.
        width: usize,
    },
}

/// End-of-stream variants distinguishing a clean end from a truncated frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// The stream ended at a frame boundary; there are no more messages.
    #[error("end of stream")]
    EndOfStream,

    /// The stream ended part way through a frame payload.
    #[error("premature EOF: {bytes_received} bytes of {expected} byte frame received")]
    MidFrame {
        /// Payload bytes received before EOF.
        bytes_received: usize,
        /// Payload size declared by the prefix.
        expected: usize,
    },

    /// The stream ended part way through a length prefix.
    #[error("premature EOF during header: {bytes_received} of {header_size} header bytes")]
    MidHeader {
        /// Header bytes received before EOF.
        bytes_received: usize,
        /// Expected header size.
        header_size: usize,
    },
}

/// Top-level codec error taxonomy.
///
/// # Examples
///
/// ```
/// use wirecodec::codec::{CodecError, EofError, RecoveryPolicy};
///
/// let err = CodecError::Eof(EofError::EndOfStream);
/// assert!(err.is_end_of_stream());
/// assert_eq!(err.default_recovery_policy(), RecoveryPolicy::Disconnect);
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// Construction-time configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport layer I/O error, propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The endpoint accepted fewer bytes than the frame without reporting an
    /// error of its own.
    #[error("short write: endpoint accepted {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes accepted by the endpoint.
        written: usize,
        /// Bytes in the frame.
        expected: usize,
    },

    /// Frame boundary detection failed.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// End-of-stream handling.
    #[error("EOF: {0}")]
    Eof(#[from] EofError),

    /// The message could not be serialised; nothing was written.
    #[error("serialisation failed: {0}")]
    Serialize(#[source] BoxError),

    /// The frame could not be deserialised into the message.
    #[error("deserialisation failed: {0}")]
    Deserialize(#[source] BoxError),

    /// The session already failed with a terminal error.
    #[error("frame session already failed")]
    Poisoned,
}

impl CodecError {
    /// Returns the recommended recovery policy for this error.
    ///
    /// | Error Type | Policy |
    /// |------------|--------|
    /// | `Serialize`, `Deserialize` | `Drop` |
    /// | everything else | `Disconnect` |
    #[must_use]
    pub fn default_recovery_policy(&self) -> RecoveryPolicy {
        match self {
            Self::Serialize(_) | Self::Deserialize(_) => RecoveryPolicy::Drop,
            Self::Config(_)
            | Self::Io(_)
            | Self::ShortWrite { .. }
            | Self::Framing(_)
            | Self::Eof(_)
            | Self::Poisoned => RecoveryPolicy::Disconnect,
        }
    }

    /// Returns true if the stream ended cleanly at a frame boundary.
    ///
    /// Callers looping over [`Decoder::decode`](crate::codec::Decoder::decode)
    /// stop when this returns true.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirecodec::codec::{CodecError, EofError};
    ///
    /// assert!(CodecError::Eof(EofError::EndOfStream).is_end_of_stream());
    /// let truncated = CodecError::Eof(EofError::MidFrame {
    ///     bytes_received: 3,
    ///     expected: 9,
    /// });
    /// assert!(!truncated.is_end_of_stream());
    /// ```
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool { matches!(self, Self::Eof(EofError::EndOfStream)) }

    /// Returns true if the session should be abandoned.
    #[must_use]
    pub fn should_disconnect(&self) -> bool {
        self.default_recovery_policy() == RecoveryPolicy::Disconnect
    }

    /// Returns the error category as a string for logging.
    ///
    /// # Returns
    ///
    /// One of `"config"`, `"io"`, `"short_write"`, `"framing"`, `"eof"`,
    /// `"serialize"`, `"deserialize"`, or `"poisoned"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::ShortWrite { .. } => "short_write",
            Self::Framing(_) => "framing",
            Self::Eof(_) => "eof",
            Self::Serialize(_) => "serialize",
            Self::Deserialize(_) => "deserialize",
            Self::Poisoned => "poisoned",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::ShortWrite { .. } => io::Error::new(io::ErrorKind::WriteZero, err),
            CodecError::Eof(_) => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            CodecError::Config(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            CodecError::Poisoned => io::Error::other(err),
            CodecError::Framing(_) | CodecError::Serialize(_) | CodecError::Deserialize(_) => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
