//! Payload variants and their per-variant wire encoding.

use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::header::{check_length, Header, PayloadType, LENGTH_SIZE, MAX_PAYLOAD_SIZE};
use crate::io::{read_full, read_tag, write_full};

/// Capabilities shared by every payload variant.
///
/// Decoding initializes an existing (usually `Default`) instance in place.
/// The tag byte is handed in by the caller so a dispatcher that has already
/// consumed it never has to push it back onto the stream.
pub trait Variant: Default {
    /// The wire type this variant encodes as.
    const PAYLOAD_TYPE: PayloadType;

    /// Raw view of the content.
    fn as_bytes(&self) -> &[u8];

    /// Textual view of the content.
    fn to_display_string(&self) -> Cow<'_, str>;

    /// Encode as one frame onto `sink`, returning the number of bytes written.
    fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64> {
        write_frame(Self::PAYLOAD_TYPE, self.as_bytes(), sink)
    }

    /// Decode the remainder of a frame whose tag byte was already read.
    ///
    /// Fails with `InvalidVariant` if `tag` is not this variant's tag and with
    /// `PayloadTooLarge` if the declared length exceeds `max_payload`; neither
    /// check allocates. On success the content is replaced and the full frame
    /// size (tag included) is returned. On failure `self` is left untouched.
    fn read_tagged<R: Read + ?Sized>(
        &mut self,
        tag: u8,
        source: &mut R,
        max_payload: usize,
    ) -> Result<u64>;

    /// Decode a whole frame, tag included, from `source`.
    fn read_from<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<u64> {
        let tag = read_tag(source)?;
        self.read_tagged(tag, source, MAX_PAYLOAD_SIZE)
    }
}

/// Write header and value of one frame.
pub(crate) fn write_frame<W: Write + ?Sized>(
    payload_type: PayloadType,
    value: &[u8],
    sink: &mut W,
) -> Result<u64> {
    let header = Header::for_value(payload_type, value.len())?;
    write_full(sink, &header.encode())?;
    write_full(sink, value)?;
    Ok(header.frame_len())
}

/// Validate `tag`, read the length, enforce the bound, then read the value.
fn read_value<R: Read + ?Sized>(
    expected: PayloadType,
    tag: u8,
    source: &mut R,
    max_payload: usize,
) -> Result<Vec<u8>> {
    if tag != expected.tag() {
        return Err(FrameError::InvalidVariant {
            expected: expected.name(),
            actual: tag,
        });
    }

    let mut length = [0u8; LENGTH_SIZE];
    read_full(source, &mut length)?;
    let length = u32::from_be_bytes(length) as usize;

    // Bound first: the buffer below is sized by untrusted input.
    check_length(length, max_payload)?;

    let mut value = vec![0u8; length];
    read_full(source, &mut value)?;
    Ok(value)
}

fn frame_len(value_len: usize) -> u64 {
    (crate::header::HEADER_SIZE + value_len) as u64
}

/// An opaque byte payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binary(Bytes);

impl Binary {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self(content.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Variant for Binary {
    const PAYLOAD_TYPE: PayloadType = PayloadType::Binary;

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn to_display_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    fn read_tagged<R: Read + ?Sized>(
        &mut self,
        tag: u8,
        source: &mut R,
        max_payload: usize,
    ) -> Result<u64> {
        let value = read_value(Self::PAYLOAD_TYPE, tag, source, max_payload)?;
        let n = frame_len(value.len());
        self.0 = Bytes::from(value);
        Ok(n)
    }
}

impl From<Bytes> for Binary {
    fn from(content: Bytes) -> Self {
        Self(content)
    }
}

impl From<Vec<u8>> for Binary {
    fn from(content: Vec<u8>) -> Self {
        Self(Bytes::from(content))
    }
}

impl From<&[u8]> for Binary {
    fn from(content: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(content))
    }
}

impl From<&str> for Binary {
    fn from(content: &str) -> Self {
        Self(Bytes::copy_from_slice(content.as_bytes()))
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// A UTF-8 text payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextString(String);

impl TextString {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Variant for TextString {
    const PAYLOAD_TYPE: PayloadType = PayloadType::Text;

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn to_display_string(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }

    fn read_tagged<R: Read + ?Sized>(
        &mut self,
        tag: u8,
        source: &mut R,
        max_payload: usize,
    ) -> Result<u64> {
        let value = read_value(Self::PAYLOAD_TYPE, tag, source, max_payload)?;
        let n = frame_len(value.len());
        self.0 = String::from_utf8(value).map_err(|err| err.utf8_error())?;
        Ok(n)
    }
}

impl From<String> for TextString {
    fn from(content: String) -> Self {
        Self(content)
    }
}

impl From<&str> for TextString {
    fn from(content: &str) -> Self {
        Self(content.to_owned())
    }
}

impl fmt::Display for TextString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Any payload that can travel on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
    Binary(Binary),
    Text(TextString),
}

impl Payload {
    pub fn binary(content: impl Into<Binary>) -> Self {
        Payload::Binary(content.into())
    }

    pub fn text(content: impl Into<TextString>) -> Self {
        Payload::Text(content.into())
    }

    pub fn payload_type(&self) -> PayloadType {
        match self {
            Payload::Binary(_) => Binary::PAYLOAD_TYPE,
            Payload::Text(_) => TextString::PAYLOAD_TYPE,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Binary(v) => v.as_bytes(),
            Payload::Text(v) => v.as_bytes(),
        }
    }

    pub fn to_display_string(&self) -> Cow<'_, str> {
        match self {
            Payload::Binary(v) => v.to_display_string(),
            Payload::Text(v) => v.to_display_string(),
        }
    }

    /// Length of the value region.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Header plus value size on the wire.
    pub fn wire_size(&self) -> usize {
        crate::header::HEADER_SIZE + self.len()
    }

    /// Encode as one frame onto `sink`.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64> {
        match self {
            Payload::Binary(v) => v.write_to(sink),
            Payload::Text(v) => v.write_to(sink),
        }
    }
}

impl From<Binary> for Payload {
    fn from(value: Binary) -> Self {
        Payload::Binary(value)
    }
}

impl From<TextString> for Payload {
    fn from(value: TextString) -> Self {
        Payload::Text(value)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}
