use std::io::Read;
use std::net::TcpStream;

use crate::codec::{decode_after_tag, CodecConfig};
use crate::error::Result;
use crate::io::{read_tag, read_tag_or_eof};
use crate::payload::Payload;

/// Reads complete payloads from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete payloads.
/// No read-ahead buffering: bytes after the current frame stay in the stream.
pub struct PayloadReader<T> {
    inner: T,
    config: CodecConfig,
    bytes_read: u64,
    done: bool,
}

impl<T: Read> PayloadReader<T> {
    /// Create a new payload reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create a new payload reader with explicit configuration.
    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            config,
            bytes_read: 0,
            done: false,
        }
    }

    /// Read the next complete payload (blocking).
    ///
    /// End of stream anywhere, including before the tag, is an
    /// `Io(UnexpectedEof)` error.
    pub fn read_payload(&mut self) -> Result<Payload> {
        let tag = read_tag(&mut self.inner)?;
        self.finish(tag)
    }

    /// Read the next payload, or `None` if the stream ended cleanly between
    /// frames.
    pub fn next_payload(&mut self) -> Result<Option<Payload>> {
        match read_tag_or_eof(&mut self.inner)? {
            Some(tag) => self.finish(tag).map(Some),
            None => Ok(None),
        }
    }

    fn finish(&mut self, tag: u8) -> Result<Payload> {
        let (payload, n) = decode_after_tag(tag, &mut self.inner, self.config.max_payload_size)?;
        self.bytes_read += n;
        Ok(payload)
    }

    /// Total bytes of successfully decoded frames.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current reader configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

/// Yields payloads until the stream ends cleanly or the first error, which is
/// yielded once. A stream cannot be resynchronized after a bad frame.
impl<T: Read> Iterator for PayloadReader<T> {
    type Item = Result<Payload>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_payload() {
            Ok(Some(payload)) => Some(Ok(payload)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl PayloadReader<TcpStream> {
    /// Create a payload reader for a `TcpStream` and apply read timeout from config.
    pub fn with_config_tcp(inner: TcpStream, config: CodecConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
