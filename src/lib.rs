#![doc(html_root_url = "https://docs.rs/wirecodec/latest")]
//! Public API for the `wirecodec` library.
//!
//! This crate separates three concerns that are usually tangled together in
//! message-passing transports:
//!
//! - how a value becomes bytes ([`message`] capabilities and [`Codec`]s),
//! - how bytes are grouped into frames ([`frame`] readers and writers), and
//! - where the bytes come from or go to ([`source`] and [`sink`]).
//!
//! Any codec runs over any source or sink. Selection at run time goes
//! through [`CodecRegistry`] or a deserialised [`config::CodecConfig`], and
//! cross-cutting behaviour is layered on with [`decorate`].

pub mod codec;
pub mod config;
pub mod decorate;
pub mod frame;
pub mod media_type;
pub mod message;
pub mod sink;
pub mod source;

pub use codec::{
    AnyCodec,
    Codec,
    CodecError,
    CodecRegistry,
    ConfigError,
    Decoder,
    DecoderFn,
    Encoder,
    EncoderFn,
};
pub use frame::{FrameReader, FrameWriter};
pub use media_type::MediaType;
pub use message::{Binary, DecodeWith, EncodeWith, Message, Text};
pub use sink::{Sink, SinkFactory};
pub use source::{Source, SourceFactory};
