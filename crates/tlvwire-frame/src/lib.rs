//! Typed type-length-value payload framing for byte streams.
//!
//! Every payload is framed with:
//! - A 1-byte type tag (`1` binary, `2` text)
//! - A 4-byte big-endian value length
//! - The value itself
//!
//! Frames are self-delimiting, so any number of payloads can share one
//! stream. Decoding enforces [`MAX_PAYLOAD_SIZE`] before allocating.

pub mod codec;
pub mod error;
pub mod header;
mod io;
pub mod payload;
pub mod reader;
#[cfg(feature = "async")]
pub mod tokio_codec;
pub mod writer;

pub use codec::{
    decode, decode_after_tag, decode_counted, decode_payload, encode, encode_payload, CodecConfig,
};
pub use error::{FrameError, Result};
pub use header::{
    Header, PayloadType, BINARY_TYPE, HEADER_SIZE, LENGTH_SIZE, MAX_PAYLOAD_SIZE, STRING_TYPE,
    TAG_SIZE,
};
pub use payload::{Binary, Payload, TextString, Variant};
pub use reader::PayloadReader;
#[cfg(feature = "async")]
pub use tokio_codec::TlvCodec;
pub use writer::PayloadWriter;
