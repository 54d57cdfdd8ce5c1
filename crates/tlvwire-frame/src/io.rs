//! Blocking read-exact / write-all loops over arbitrary streams.
//!
//! A single `read` may return fewer bytes than asked for; these helpers keep
//! going until the buffer is full, retrying `Interrupted` and failing only on
//! a genuine end of stream or a hard error.

use std::io::{self, ErrorKind, Read, Write};

use crate::error::{FrameError, Result};

/// Fill `buf` completely from `source`.
///
/// Returns `Io(UnexpectedEof)` if the source ends first.
pub(crate) fn read_full<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(FrameError::Io(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("stream ended after {filled} of {} bytes", buf.len()),
                )))
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

/// Read one tag byte, or `None` if the source is already exhausted.
pub(crate) fn read_tag_or_eof<R: Read + ?Sized>(source: &mut R) -> Result<Option<u8>> {
    let mut tag = [0u8; 1];
    loop {
        match source.read(&mut tag) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(tag[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

/// Read one tag byte; end of stream is an error.
pub(crate) fn read_tag<R: Read + ?Sized>(source: &mut R) -> Result<u8> {
    let mut tag = [0u8; 1];
    read_full(source, &mut tag)?;
    Ok(tag[0])
}

/// Write all of `buf` to `sink`.
///
/// A sink that accepts zero bytes fails with `Io(WriteZero)`.
pub(crate) fn write_full<W: Write + ?Sized>(sink: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match sink.write(&buf[offset..]) {
            Ok(0) => {
                return Err(FrameError::Io(io::Error::new(
                    ErrorKind::WriteZero,
                    "sink accepted zero bytes",
                )))
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

/// Flush `sink`, retrying `Interrupted`.
pub(crate) fn flush<W: Write + ?Sized>(sink: &mut W) -> Result<()> {
    loop {
        match sink.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stream fakes shared by the module tests.

    use std::io::{ErrorKind, Read, Write};

    /// Hands out one byte per `read` call.
    #[derive(Debug)]
    pub struct ByteByByteReader {
        pub bytes: Vec<u8>,
        pub pos: usize,
    }

    impl ByteByByteReader {
        pub fn new(bytes: Vec<u8>) -> Self {
            Self { bytes, pos: 0 }
        }
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    /// Fails the first `read` with `Interrupted`, then serves the bytes.
    pub struct InterruptedThenData {
        pub interrupted: bool,
        pub bytes: Vec<u8>,
        pub pos: usize,
    }

    impl InterruptedThenData {
        pub fn new(bytes: Vec<u8>) -> Self {
            Self {
                interrupted: false,
                bytes,
                pos: 0,
            }
        }
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Accepts at most `chunk` bytes per `write`.
    #[derive(Default)]
    pub struct ChunkedWriter {
        pub chunk: usize,
        pub data: Vec<u8>,
        pub writes: usize,
    }

    impl Write for ChunkedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.chunk);
            self.data.extend_from_slice(&buf[..n]);
            self.writes += 1;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    pub struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    pub struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::testing::*;
    use super::*;

    #[test]
    fn read_full_accumulates_partial_reads() {
        let mut source = ByteByByteReader::new(b"abcdef".to_vec());
        let mut buf = [0u8; 6];
        read_full(&mut source, &mut buf).unwrap();
        assert_eq!(&buf, b"abcdef");
    }

    #[test]
    fn read_full_retries_interrupted() {
        let mut source = InterruptedThenData::new(b"xy".to_vec());
        let mut buf = [0u8; 2];
        read_full(&mut source, &mut buf).unwrap();
        assert_eq!(&buf, b"xy");
    }

    #[test]
    fn read_full_short_stream_is_unexpected_eof() {
        let mut source = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        let err = read_full(&mut source, &mut buf).unwrap_err();
        assert!(err.is_unexpected_eof());
    }

    #[test]
    fn read_tag_or_eof_distinguishes_empty_source() {
        let mut empty = Cursor::new(Vec::<u8>::new());
        assert_eq!(read_tag_or_eof(&mut empty).unwrap(), None);

        let mut one = Cursor::new(vec![7u8]);
        assert_eq!(read_tag_or_eof(&mut one).unwrap(), Some(7));
        assert!(read_tag(&mut one).unwrap_err().is_unexpected_eof());
    }

    #[test]
    fn write_full_handles_short_writes() {
        let mut sink = ChunkedWriter {
            chunk: 3,
            ..ChunkedWriter::default()
        };
        write_full(&mut sink, b"0123456789").unwrap();
        assert_eq!(sink.data, b"0123456789");
        assert_eq!(sink.writes, 4);
    }

    #[test]
    fn write_full_zero_write_is_error() {
        let err = write_full(&mut ZeroWriter, b"x").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }
}
