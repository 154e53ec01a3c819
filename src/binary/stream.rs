//! Position-tracking byte streams for the binary backend.
//!
//! [`OStream`] wraps any [`Write`], [`IStream`] any [`Read`] + [`Seek`]. Both
//! keep the current position so the archive can report offsets and bound
//! reads without extra seek calls.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Output stream for binary archive data.
#[derive(Debug)]
pub struct OStream<W: Write> {
    writer: W,
    pos: u64,
}

impl<W: Write> OStream<W> {
    /// Wrap a writer. Positions are counted from the point of wrapping.
    pub fn new(writer: W) -> Self {
        Self { writer, pos: 0 }
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Unwrap the underlying writer without flushing it.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl OStream<BufWriter<File>> {
    /// Create a new output stream for the given file path.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::new(BufWriter::with_capacity(256 * 1024, file)))
    }
}

impl<W: Write> Write for OStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.writer.write(buf)?;
        self.pos += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Input stream for binary archive data.
#[derive(Debug)]
pub struct IStream<R: Read + Seek> {
    reader: R,
    pos: u64,
    len: u64,
}

impl<R: Read + Seek> IStream<R> {
    /// Wrap a reader, starting at its current position.
    pub fn new(mut reader: R) -> io::Result<Self> {
        let pos = reader.stream_position()?;
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(pos))?;
        Ok(Self { reader, pos, len })
    }

    /// Get the current read position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Total length of the underlying stream.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Seek to an absolute position.
    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.pos = self.reader.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl IStream<BufReader<File>> {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> Read for IStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ostream_tracks_position() {
        let mut out = OStream::new(Vec::new());
        out.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(out.pos(), 3);
        assert_eq!(out.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn test_istream_len_and_seek() {
        let mut input = IStream::new(Cursor::new(vec![0u8; 10])).unwrap();
        assert_eq!(input.len(), 10);
        let mut buf = [0u8; 4];
        input.read_exact(&mut buf).unwrap();
        assert_eq!(input.pos(), 4);
        input.seek_to(10).unwrap();
        assert_eq!(input.pos(), 10);
    }

    #[test]
    fn test_istream_starts_at_reader_position() {
        let mut cursor = Cursor::new(vec![0u8; 8]);
        cursor.set_position(3);
        let input = IStream::new(cursor).unwrap();
        assert_eq!(input.pos(), 3);
        assert_eq!(input.len(), 8);
    }
}
