//! `tokio_util::codec` adapter for use with `Framed`, `FramedRead` and
//! `FramedWrite`.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_payload, encode_payload, CodecConfig};
use crate::error::{FrameError, Result};
use crate::header::{Header, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::payload::Payload;

/// Stateless TLV codec for async byte streams.
#[derive(Debug, Clone)]
pub struct TlvCodec {
    max_payload_size: usize,
}

impl TlvCodec {
    pub fn new() -> Self {
        Self::with_max_payload_size(MAX_PAYLOAD_SIZE)
    }

    pub fn with_max_payload_size(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Default for TlvCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&CodecConfig> for TlvCodec {
    fn from(config: &CodecConfig) -> Self {
        Self::with_max_payload_size(config.max_payload_size)
    }
}

impl Decoder for TlvCodec {
    type Item = Payload;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Payload>> {
        let decoded = decode_payload(src, self.max_payload_size)?;
        if decoded.is_none() {
            // Length is already bounded at this point; size the buffer for the
            // rest of the frame in one go.
            if let Some(header) = Header::decode(&src[..])? {
                let total = HEADER_SIZE + header.length as usize;
                src.reserve(total.saturating_sub(src.len()));
            }
        }
        Ok(decoded)
    }
}

impl Encoder<&Payload> for TlvCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Payload, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: item.len(),
                max: self.max_payload_size,
            });
        }
        encode_payload(item, dst)
    }
}

impl Encoder<Payload> for TlvCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Payload, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&Payload>::encode(self, &item, dst)
    }
}
