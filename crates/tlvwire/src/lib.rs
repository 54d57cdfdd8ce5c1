//! Typed TLV payload framing over byte streams.
//!
//! tlvwire frames binary and text payloads with a 1-byte type tag and a
//! 4-byte big-endian length so that several values can share one TCP
//! connection, pipe or file without any other delimiter.
//!
//! # Crate Structure
//!
//! - [`frame`] — Payload variants, wire header, dispatch decoder, stream
//!   reader/writer, and the async codec (behind the `async` feature)
//!
//! The `tlvwire` binary (behind the `cli` feature) sends, receives, echoes
//! and inspects framed payloads.

/// Re-export frame types.
pub mod frame {
    pub use tlvwire_frame::*;
}

pub use tlvwire_frame::{decode, encode, Binary, FrameError, Payload, TextString};
