//! Message capability contract.
//!
//! A message value exposes one or both of two independent capabilities,
//! keyed by a wire representation marker implementing [`Format`]:
//!
//! - [`Binary`]: length-oriented binary encoding via `bincode`'s standard configuration.
//! - [`Text`]: structured textual encoding as JSON via `serde_json`.
//!
//! Types deriving `bincode::Encode`/`bincode::Decode` get the binary half and
//! types deriving `serde::Serialize`/`serde::Deserialize` get the textual
//! half through blanket implementations. A codec only ever asks for the
//! half matching its own representation.
//!
//! ```
//! use wirecodec::message::{DecodeWith, EncodeWith, Text};
//!
//! #[derive(serde::Serialize, serde::Deserialize, Default, PartialEq, Debug)]
//! struct Offer {
//!     id: u32,
//! }
//!
//! let bytes = EncodeWith::<Text>::encode_with(&Offer { id: 7 }).unwrap();
//! assert_eq!(bytes, br#"{"id":7}"#);
//!
//! let mut offer = Offer::default();
//! DecodeWith::<Text>::decode_with(&mut offer, &bytes).unwrap();
//! assert_eq!(offer.id, 7);
//! ```

use bincode::config;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::codec::BoxError;

/// Marker for a wire representation.
pub trait Format: Send + Sync + 'static {
    /// Short representation name used in log fields.
    const NAME: &'static str;
}

/// Binary representation backed by `bincode`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Binary;

impl Format for Binary {
    const NAME: &'static str = "binary";
}

/// Textual representation backed by JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct Text;

impl Format for Text {
    const NAME: &'static str = "text";
}

/// Serialise a value into the representation `F`.
pub trait EncodeWith<F: Format> {
    /// Serialise `self` into a complete frame payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in `F`.
    fn encode_with(&self) -> Result<Vec<u8>, BoxError>;
}

/// Populate a value in place from the representation `F`.
pub trait DecodeWith<F: Format> {
    /// Replace `self` with the message held in `bytes`.
    ///
    /// On error `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a valid encoding of the message.
    fn decode_with(&mut self, bytes: &[u8]) -> Result<(), BoxError>;
}

/// A message supporting both representations, selectable at runtime.
pub trait Message:
    EncodeWith<Binary> + DecodeWith<Binary> + EncodeWith<Text> + DecodeWith<Text>
{
}

impl<T> Message for T where
    T: EncodeWith<Binary> + DecodeWith<Binary> + EncodeWith<Text> + DecodeWith<Text>
{
}

/// A binary frame held more bytes than its message consumed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{trailing} trailing bytes after a {consumed} byte message")]
pub struct TrailingBytes {
    /// Bytes consumed by the message.
    pub consumed: usize,
    /// Bytes left over.
    pub trailing: usize,
}

impl<T: bincode::Encode> EncodeWith<Binary> for T {
    fn encode_with(&self) -> Result<Vec<u8>, BoxError> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }
}

impl<T: bincode::Decode<()>> DecodeWith<Binary> for T {
    fn decode_with(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        let (value, consumed) = bincode::decode_from_slice(bytes, config::standard())?;
        if consumed != bytes.len() {
            return Err(Box::new(TrailingBytes {
                consumed,
                trailing: bytes.len() - consumed,
            }));
        }
        *self = value;
        Ok(())
    }
}

impl<T: Serialize> EncodeWith<Text> for T {
    fn encode_with(&self) -> Result<Vec<u8>, BoxError> { Ok(serde_json::to_vec(self)?) }
}

impl<T: DeserializeOwned> DecodeWith<Text> for T {
    fn decode_with(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        *self = serde_json::from_slice(bytes)?;
        Ok(())
    }
}
