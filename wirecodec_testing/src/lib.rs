//! Test utilities for exercising `wirecodec` codecs over in-memory
//! endpoints.
//!
//! The helpers here fall into three groups:
//!
//! - [`endpoints`]: misbehaving readers and writers (short writes, chunked reads, injected
//!   failures) for driving error paths.
//! - [`loopback`]: encode a batch of messages into bytes and decode them back through any codec
//!   and framing.
//! - [`fixtures`]: `rstest` fixtures and a sample message type supporting both wire
//!   representations.
//!
//! ```rust
//! use wirecodec::codec;
//! use wirecodec_testing::{TaskStatus, round_trip_buffered};
//!
//! let status = TaskStatus::running("web-1");
//! let decoded: Vec<TaskStatus> = round_trip_buffered(&codec::JSON, &[status.clone()]).unwrap();
//! assert_eq!(decoded, vec![status]);
//! ```

pub mod endpoints;
pub mod fixtures;
pub mod loopback;

pub use endpoints::{ChunkedReader, FailingReader, FailingWriter, ShortWriter};
pub use fixtures::{TaskState, TaskStatus, length_codec, registry, task_statuses};
pub use loopback::{
    decode_all,
    encode_all,
    round_trip_buffered,
    round_trip_length_prefixed,
};
