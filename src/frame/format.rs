//! Length prefix formatting options.

use serde::Deserialize;

use crate::codec::{ConfigError, FramingError};

/// Byte order used for encoding and decoding length prefixes.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// Format of the length prefix preceding each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthFormat {
    bytes: usize,
    endianness: Endianness,
}

impl LengthFormat {
    /// Creates a new `LengthFormat` with the specified number of bytes and
    /// endianness for the length prefix.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is not one of `1`, `2`, `4`, or `8`.
    #[must_use]
    pub const fn new(bytes: usize, endianness: Endianness) -> Self {
        assert!(
            matches!(bytes, 1 | 2 | 4 | 8),
            "invalid length-prefix width"
        );
        Self { bytes, endianness }
    }

    /// Fallible constructor validating the prefix width.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefixWidth`] if `bytes` is not one of
    /// `1`, `2`, `4`, or `8`.
    pub fn try_new(bytes: usize, endianness: Endianness) -> Result<Self, ConfigError> {
        if !matches!(bytes, 1 | 2 | 4 | 8) {
            return Err(ConfigError::InvalidPrefixWidth(bytes));
        }
        Ok(Self { bytes, endianness })
    }

    /// Creates a `LengthFormat` for a 2-byte big-endian length prefix.
    #[must_use]
    pub const fn u16_be() -> Self { Self::new(2, Endianness::Big) }

    /// Creates a `LengthFormat` for a 4-byte big-endian length prefix.
    #[must_use]
    pub const fn u32_be() -> Self { Self::new(4, Endianness::Big) }

    /// Creates a `LengthFormat` for a 4-byte little-endian length prefix.
    #[must_use]
    pub const fn u32_le() -> Self { Self::new(4, Endianness::Little) }

    /// Prefix width in bytes.
    #[must_use]
    pub const fn bytes(&self) -> usize { self.bytes }

    /// Byte order of the prefix.
    #[must_use]
    pub const fn endianness(&self) -> Endianness { self.endianness }

    /// Read a length prefix from the first [`bytes`](Self::bytes) bytes of
    /// `src`, or `None` if `src` is shorter than the prefix.
    ///
    /// Lengths that do not fit in `usize` saturate, so they are always
    /// rejected by a maximum frame length check.
    #[must_use]
    pub fn read_len(&self, src: &[u8]) -> Option<usize> {
        let prefix = src.get(..self.bytes)?;
        let mut buf = [0u8; 8];
        let value = match self.endianness {
            Endianness::Big => {
                buf[8 - self.bytes..].copy_from_slice(prefix);
                u64::from_be_bytes(buf)
            }
            Endianness::Little => {
                buf[..self.bytes].copy_from_slice(prefix);
                u64::from_le_bytes(buf)
            }
        };
        Some(usize::try_from(value).unwrap_or(usize::MAX))
    }

    /// Append `len` to `dst` using this format's prefix encoding.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::LengthOverflow`] if `len` cannot be represented
    /// in the prefix width.
    pub fn write_len(&self, len: usize, dst: &mut bytes::BytesMut) -> Result<(), FramingError> {
        let overflow = || FramingError::LengthOverflow {
            len,
            width: self.bytes,
        };
        let value = u64::try_from(len).map_err(|_| overflow())?;
        if self.bytes < 8 && value >> (self.bytes * 8) != 0 {
            return Err(overflow());
        }
        match self.endianness {
            Endianness::Big => dst.extend_from_slice(&value.to_be_bytes()[8 - self.bytes..]),
            Endianness::Little => dst.extend_from_slice(&value.to_le_bytes()[..self.bytes]),
        }
        Ok(())
    }
}

impl Default for LengthFormat {
    fn default() -> Self { Self::u32_be() }
}
