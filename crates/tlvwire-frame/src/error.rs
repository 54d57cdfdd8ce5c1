/// Errors that can occur during payload encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The leading tag byte does not name a known payload type.
    #[error("unknown payload type {0:#04x}")]
    UnknownPayloadType(u8),

    /// A variant decoder was handed a tag that belongs to another variant.
    #[error("invalid {expected} payload (tag {actual:#04x})")]
    InvalidVariant { expected: &'static str, actual: u8 },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A text payload carried bytes that are not valid UTF-8.
    #[error("text payload is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),

    /// An I/O error occurred while reading or writing frames.
    ///
    /// A source that ends in the middle of a frame surfaces here with
    /// [`std::io::ErrorKind::UnexpectedEof`].
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True when the bytes on the wire were malformed, as opposed to the
    /// underlying stream failing.
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(self, FrameError::Io(_))
    }

    /// True when the source ended before a complete frame was read.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, FrameError::Io(err) if err.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
