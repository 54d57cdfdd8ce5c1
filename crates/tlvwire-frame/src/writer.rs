use std::io::Write;
use std::net::TcpStream;

use bytes::BytesMut;

use crate::codec::{encode_payload, CodecConfig};
use crate::error::{FrameError, Result};
use crate::io::{flush, write_full};
use crate::payload::{Binary, Payload, TextString};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete payloads to any `Write` stream.
///
/// Each frame is assembled in an internal buffer and handed to the stream in
/// as few writes as the stream allows, then flushed.
pub struct PayloadWriter<T> {
    inner: T,
    buf: BytesMut,
    config: CodecConfig,
    bytes_written: u64,
}

impl<T: Write> PayloadWriter<T> {
    /// Create a new payload writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create a new payload writer with explicit configuration.
    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            bytes_written: 0,
        }
    }

    /// Write a complete payload (blocking), returning the frame size.
    ///
    /// Payloads larger than the configured bound are refused before anything
    /// is written.
    pub fn write_payload(&mut self, payload: &Payload) -> Result<u64> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_payload(payload, &mut self.buf)?;
        write_full(&mut self.inner, &self.buf)?;
        self.flush()?;

        let n = self.buf.len() as u64;
        self.bytes_written += n;
        Ok(n)
    }

    /// Encode and send a binary payload.
    pub fn send_binary(&mut self, content: impl Into<Binary>) -> Result<u64> {
        self.write_payload(&Payload::Binary(content.into()))
    }

    /// Encode and send a text payload.
    pub fn send_text(&mut self, content: impl Into<TextString>) -> Result<u64> {
        self.write_payload(&Payload::Text(content.into()))
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        flush(&mut self.inner)
    }

    /// Total bytes of frames written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current writer configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl PayloadWriter<TcpStream> {
    /// Create a payload writer for a `TcpStream` and apply write timeout from config.
    pub fn with_config_tcp(inner: TcpStream, config: CodecConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
