//! Wire header shared by every payload variant.
//!
//! ```text
//! ┌──────────┬─────────────┬──────────────────┐
//! │ Tag (1B) │ Length (4B) │ Value            │
//! │          │ u32 BE      │ (Length bytes)   │
//! └──────────┴─────────────┴──────────────────┘
//! ```

use bytes::BufMut;

use crate::error::{FrameError, Result};

/// Tag byte of a [`Binary`](crate::Binary) frame.
pub const BINARY_TYPE: u8 = 1;

/// Tag byte of a [`TextString`](crate::TextString) frame.
pub const STRING_TYPE: u8 = 2;

/// Largest value region accepted when decoding: 10 MiB.
pub const MAX_PAYLOAD_SIZE: usize = 10 << 20;

/// Size of the tag field.
pub const TAG_SIZE: usize = 1;

/// Size of the length field.
pub const LENGTH_SIZE: usize = 4;

/// Frame header: tag (1) + length (4) = 5 bytes.
pub const HEADER_SIZE: usize = TAG_SIZE + LENGTH_SIZE;

/// The closed set of payload types that can appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadType {
    Binary = BINARY_TYPE,
    Text = STRING_TYPE,
}

impl PayloadType {
    /// The tag byte written for this type.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Human-readable name, used in errors and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            PayloadType::Binary => "binary",
            PayloadType::Text => "text",
        }
    }
}

impl TryFrom<u8> for PayloadType {
    type Error = FrameError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            BINARY_TYPE => Ok(PayloadType::Binary),
            STRING_TYPE => Ok(PayloadType::Text),
            other => Err(FrameError::UnknownPayloadType(other)),
        }
    }
}

impl std::fmt::Display for PayloadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub payload_type: PayloadType,
    /// Length of the value region in bytes.
    pub length: u32,
}

impl Header {
    /// Build a header for a value of `len` bytes.
    ///
    /// Fails with `PayloadTooLarge` when `len` does not fit the 4-byte length
    /// field.
    pub fn for_value(payload_type: PayloadType, len: usize) -> Result<Self> {
        let length = u32::try_from(len).map_err(|_| FrameError::PayloadTooLarge {
            size: len,
            max: u32::MAX as usize,
        })?;
        Ok(Self {
            payload_type,
            length,
        })
    }

    /// Encode header to bytes (big-endian length).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = self.payload_type.tag();
        buf[TAG_SIZE..].copy_from_slice(&self.length.to_be_bytes());
        buf
    }

    /// Append the encoded header to `dst`.
    pub fn put<B: BufMut>(&self, dst: &mut B) {
        dst.put_u8(self.payload_type.tag());
        dst.put_u32(self.length);
    }

    /// Decode a header from the front of `buf`.
    ///
    /// Returns `Ok(None)` if fewer than `HEADER_SIZE` bytes are available. An
    /// unknown tag is reported as soon as the first byte is present.
    pub fn decode(buf: &[u8]) -> Result<Option<Self>> {
        let Some(&tag) = buf.first() else {
            return Ok(None);
        };
        let payload_type = PayloadType::try_from(tag)?;
        if buf.len() < HEADER_SIZE {
            return Ok(None);
        }
        let mut length = [0u8; LENGTH_SIZE];
        length.copy_from_slice(&buf[TAG_SIZE..HEADER_SIZE]);
        Ok(Some(Self {
            payload_type,
            length: u32::from_be_bytes(length),
        }))
    }

    /// Total wire size of the frame this header announces.
    pub fn frame_len(&self) -> u64 {
        HEADER_SIZE as u64 + u64::from(self.length)
    }
}

/// Reject a declared value length above `max`.
pub(crate) fn check_length(length: usize, max: usize) -> Result<()> {
    if length > max {
        return Err(FrameError::PayloadTooLarge { size: length, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn tags_map_to_types() {
        assert_eq!(PayloadType::try_from(1).unwrap(), PayloadType::Binary);
        assert_eq!(PayloadType::try_from(2).unwrap(), PayloadType::Text);
        assert!(matches!(
            PayloadType::try_from(0),
            Err(FrameError::UnknownPayloadType(0))
        ));
        assert!(matches!(
            PayloadType::try_from(99),
            Err(FrameError::UnknownPayloadType(99))
        ));
    }

    #[test]
    fn encode_is_big_endian() {
        let header = Header {
            payload_type: PayloadType::Binary,
            length: 0x0040_0000,
        };
        assert_eq!(header.encode(), [0x01, 0x00, 0x40, 0x00, 0x00]);

        let mut buf = BytesMut::new();
        header.put(&mut buf);
        assert_eq!(buf.as_ref(), header.encode().as_slice());
    }

    #[test]
    fn decode_waits_for_full_header() {
        assert!(Header::decode(&[]).unwrap().is_none());
        assert!(Header::decode(&[STRING_TYPE, 0, 0]).unwrap().is_none());

        let header = Header::decode(&[STRING_TYPE, 0, 0, 1, 0]).unwrap().unwrap();
        assert_eq!(header.payload_type, PayloadType::Text);
        assert_eq!(header.length, 256);
        assert_eq!(header.frame_len(), 261);
    }

    #[test]
    fn decode_rejects_unknown_tag_early() {
        assert!(matches!(
            Header::decode(&[0x7F]),
            Err(FrameError::UnknownPayloadType(0x7F))
        ));
    }

    #[test]
    fn max_payload_is_ten_mebibytes() {
        assert_eq!(MAX_PAYLOAD_SIZE, 10 * 1024 * 1024);
        assert!(check_length(MAX_PAYLOAD_SIZE, MAX_PAYLOAD_SIZE).is_ok());
        assert!(matches!(
            check_length(MAX_PAYLOAD_SIZE + 1, MAX_PAYLOAD_SIZE),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }
}
