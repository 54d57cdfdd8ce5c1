use std::io::{Read, Write};

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::header::{check_length, Header, PayloadType, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::io::read_tag;
use crate::payload::{Binary, Payload, TextString, Variant};

/// Encode a payload onto a sink, returning the number of bytes written.
///
/// Frames are self-delimiting, so several payloads may be written
/// back-to-back onto the same sink.
pub fn encode<W: Write + ?Sized>(payload: &Payload, sink: &mut W) -> Result<u64> {
    payload.write_to(sink)
}

/// Decode the next payload from a source using the default size bound.
pub fn decode<R: Read + ?Sized>(source: &mut R) -> Result<Payload> {
    decode_counted(source, MAX_PAYLOAD_SIZE).map(|(payload, _)| payload)
}

/// Decode the next payload, also returning the number of bytes consumed
/// (`HEADER_SIZE + length`).
pub fn decode_counted<R: Read + ?Sized>(
    source: &mut R,
    max_payload: usize,
) -> Result<(Payload, u64)> {
    let tag = read_tag(source)?;
    decode_after_tag(tag, source, max_payload)
}

/// Decode a payload whose tag byte has already been taken off `source`.
///
/// An unknown tag fails with `UnknownPayloadType` without reading anything
/// further. The returned count includes the tag byte.
pub fn decode_after_tag<R: Read + ?Sized>(
    tag: u8,
    source: &mut R,
    max_payload: usize,
) -> Result<(Payload, u64)> {
    match PayloadType::try_from(tag)? {
        PayloadType::Binary => {
            let (value, n) = decode_variant::<Binary, R>(tag, source, max_payload)?;
            Ok((Payload::Binary(value), n))
        }
        PayloadType::Text => {
            let (value, n) = decode_variant::<TextString, R>(tag, source, max_payload)?;
            Ok((Payload::Text(value), n))
        }
    }
}

fn decode_variant<V: Variant, R: Read + ?Sized>(
    tag: u8,
    source: &mut R,
    max_payload: usize,
) -> Result<(V, u64)> {
    let mut value = V::default();
    let n = value.read_tagged(tag, source, max_payload)?;
    Ok((value, n))
}

/// Encode a payload into a buffer.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────────────┬──────────────────┐
/// │ Tag (1B) │ Length (4B) │ Value            │
/// │ 1 or 2   │ u32 BE      │ (Length bytes)   │
/// └──────────┴─────────────┴──────────────────┘
/// ```
pub fn encode_payload(payload: &Payload, dst: &mut BytesMut) -> Result<()> {
    let value = payload.as_bytes();
    let header = Header::for_value(payload.payload_type(), value.len())?;
    dst.reserve(HEADER_SIZE + value.len());
    header.put(dst);
    dst.extend_from_slice(value);
    Ok(())
}

/// Decode a payload from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_payload(src: &mut BytesMut, max_payload: usize) -> Result<Option<Payload>> {
    let Some(header) = Header::decode(&src[..])? else {
        return Ok(None); // Need more data
    };

    let length = header.length as usize;
    check_length(length, max_payload)?;

    if src.len() < HEADER_SIZE + length {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let value = src.split_to(length).freeze();

    let payload = match header.payload_type {
        PayloadType::Binary => Payload::Binary(Binary::from(value)),
        PayloadType::Text => Payload::Text(TextString::from(bytes_to_string(value)?)),
    };
    Ok(Some(payload))
}

fn bytes_to_string(value: Bytes) -> Result<String> {
    match String::from_utf8(Vec::from(value)) {
        Ok(text) => Ok(text),
        Err(err) => Err(FrameError::InvalidText(err.utf8_error())),
    }
}

/// Configuration for payload readers and writers.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum value size in bytes. Default: 10 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BufMut;

    use super::*;
    use crate::header::{BINARY_TYPE, STRING_TYPE};
    use crate::io::testing::{ByteByByteReader, InterruptedThenData};

    fn proverbs() -> Vec<Payload> {
        vec![
            Payload::binary("Clear is better than clever."),
            Payload::binary("Errors are values."),
            Payload::binary("Don't panic."),
        ]
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let original = Payload::binary("Clear is better than clever.");
        let mut wire = Vec::new();
        let written = encode(&original, &mut wire).unwrap();

        let mut source = Cursor::new(wire);
        let (decoded, consumed) = decode_counted(&mut source, MAX_PAYLOAD_SIZE).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(consumed, written);
        assert_eq!(consumed, 5 + 28);
        assert_eq!(source.position(), consumed);
    }

    #[test]
    fn test_sequence_preserved() {
        let payloads = proverbs();
        let mut wire = Vec::new();
        for p in &payloads {
            encode(p, &mut wire).unwrap();
        }

        let mut source = Cursor::new(wire);
        for expected in &payloads {
            assert_eq!(&decode(&mut source).unwrap(), expected);
        }
        assert!(decode(&mut source).unwrap_err().is_unexpected_eof());
    }

    #[test]
    fn test_mixed_variants_over_partial_reads() {
        let payloads = vec![
            Payload::text("The bigger the interface, the weaker the abstraction."),
            Payload::binary(vec![0u8, 159, 146, 150]),
            Payload::text(""),
        ];
        let mut wire = Vec::new();
        for p in &payloads {
            encode(p, &mut wire).unwrap();
        }

        let mut source = ByteByByteReader::new(wire);
        for expected in &payloads {
            assert_eq!(&decode(&mut source).unwrap(), expected);
        }
    }

    #[test]
    fn test_unknown_tag_consumes_one_byte() {
        let mut source = Cursor::new(vec![99u8, 0, 0, 0, 1, b'x']);
        let err = decode(&mut source).unwrap_err();

        assert!(matches!(err, FrameError::UnknownPayloadType(99)));
        assert_eq!(source.position(), 1);
    }

    #[test]
    fn test_oversized_length_rejected_after_header() {
        let mut wire = vec![BINARY_TYPE];
        wire.extend_from_slice(&(1u32 << 30).to_be_bytes());

        let mut source = Cursor::new(wire);
        let err = decode(&mut source).unwrap_err();

        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert_eq!(source.position(), HEADER_SIZE as u64);
    }

    #[test]
    fn test_short_value_within_bound_is_io_error() {
        let mut source = Cursor::new(vec![0x01, 0x00, 0x40, 0x00, 0x00]);
        let err = decode(&mut source).unwrap_err();

        assert!(err.is_unexpected_eof());
        assert!(!err.is_protocol_violation());
    }

    #[test]
    fn test_custom_bound() {
        let mut wire = Vec::new();
        encode(&Payload::text("twelve bytes"), &mut wire).unwrap();

        let err = decode_counted(&mut Cursor::new(wire.clone()), 11).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 12, max: 11 }));

        assert!(decode_counted(&mut Cursor::new(wire), 12).is_ok());
    }

    #[test]
    fn test_decode_after_tag() {
        let mut wire = Vec::new();
        encode(&Payload::text("tagged"), &mut wire).unwrap();

        let mut rest = Cursor::new(wire[1..].to_vec());
        let (payload, n) = decode_after_tag(wire[0], &mut rest, MAX_PAYLOAD_SIZE).unwrap();
        assert_eq!(payload, Payload::text("tagged"));
        assert_eq!(n, wire.len() as u64);
    }

    #[test]
    fn test_interrupted_read_retries() {
        let mut wire = Vec::new();
        encode(&Payload::binary("ok"), &mut wire).unwrap();

        let mut source = InterruptedThenData::new(wire);
        assert_eq!(decode(&mut source).unwrap(), Payload::binary("ok"));
    }

    #[test]
    fn test_buffer_roundtrip() {
        let mut buf = BytesMut::new();
        for p in proverbs() {
            encode_payload(&p, &mut buf).unwrap();
        }
        encode_payload(&Payload::text("tail"), &mut buf).unwrap();

        for expected in proverbs() {
            let decoded = decode_payload(&mut buf, MAX_PAYLOAD_SIZE).unwrap().unwrap();
            assert_eq!(decoded, expected);
        }
        let tail = decode_payload(&mut buf, MAX_PAYLOAD_SIZE).unwrap().unwrap();
        assert_eq!(tail, Payload::text("tail"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_buffer_matches_stream_encoding() {
        let payload = Payload::text("same bytes");
        let mut buf = BytesMut::new();
        encode_payload(&payload, &mut buf).unwrap();

        let mut wire = Vec::new();
        encode(&payload, &mut wire).unwrap();
        assert_eq!(buf.as_ref(), wire.as_slice());
    }

    #[test]
    fn test_buffer_incomplete() {
        let mut buf = BytesMut::new();
        assert!(decode_payload(&mut buf, MAX_PAYLOAD_SIZE).unwrap().is_none());

        encode_payload(&Payload::binary("hello"), &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 2);
        assert!(decode_payload(&mut buf, MAX_PAYLOAD_SIZE).unwrap().is_none());
        assert_eq!(buf.len(), HEADER_SIZE + 2);
    }

    #[test]
    fn test_buffer_rejects_unknown_tag_and_oversize() {
        let mut buf = BytesMut::from(&[0xFFu8][..]);
        assert!(matches!(
            decode_payload(&mut buf, MAX_PAYLOAD_SIZE),
            Err(FrameError::UnknownPayloadType(0xFF))
        ));

        let mut buf = BytesMut::new();
        buf.put_u8(STRING_TYPE);
        buf.put_u32(32 * 1024 * 1024);
        assert!(matches!(
            decode_payload(&mut buf, MAX_PAYLOAD_SIZE),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_buffer_invalid_text() {
        let mut buf = BytesMut::from(&[STRING_TYPE, 0, 0, 0, 1, 0xFF][..]);
        assert!(matches!(
            decode_payload(&mut buf, MAX_PAYLOAD_SIZE),
            Err(FrameError::InvalidText(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let cfg = CodecConfig::default();
        assert_eq!(cfg.max_payload_size, MAX_PAYLOAD_SIZE);
        assert!(cfg.read_timeout.is_none());
        assert!(cfg.write_timeout.is_none());
    }
}
