//! src/stream/source.rs
//! Byte sources with a length known up front

use crate::error::CryptError;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;

/// A `Read` that knows how many bytes it has left.
///
/// The drivers plan the final chunk from `bytes_remaining()`, so it must be
/// exact. A source that ends early surfaces as an `UnexpectedEof` I/O error.
pub trait ByteSource: Read {
    fn bytes_remaining(&self) -> u64;
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    #[inline]
    fn bytes_remaining(&self) -> u64 {
        (self.get_ref().as_ref().len() as u64).saturating_sub(self.position())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn bytes_remaining(&self) -> u64 {
        (**self).bytes_remaining()
    }
}

/// Any reader paired with a declared length.
///
/// Reads never go past the declared length, even if the inner reader has more.
#[derive(Debug)]
pub struct SizedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> SizedReader<R> {
    pub fn new(inner: R, len: u64) -> Self {
        Self {
            inner,
            remaining: len,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl SizedReader<BufReader<File>> {
    /// Open a file, taking its length from metadata.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CryptError> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        Ok(Self::new(BufReader::new(file), len))
    }
}

impl<R: Read> Read for SizedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let cap = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        let want = buf.len().min(cap);
        if want == 0 {
            return Ok(0);
        }
        let n = self.inner.read(&mut buf[..want])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}

impl<R: Read> ByteSource for SizedReader<R> {
    #[inline]
    fn bytes_remaining(&self) -> u64 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_position() {
        let mut src = Cursor::new(vec![1u8; 10]);
        assert_eq!(src.bytes_remaining(), 10);
        let mut buf = [0u8; 4];
        src.read_exact(&mut buf).unwrap();
        assert_eq!(src.bytes_remaining(), 6);
    }

    #[test]
    fn sized_reader_stops_at_declared_len() {
        let mut src = SizedReader::new(&b"abcdef"[..], 4);
        let mut out = Vec::new();
        src.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcd");
        assert_eq!(src.bytes_remaining(), 0);
    }

    #[test]
    fn overstated_len_is_unexpected_eof() {
        let mut src = SizedReader::new(&b"abc"[..], 8);
        let mut buf = [0u8; 8];
        let err = src.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
