//! Binary input archive.
//!
//! Mirrors [`BinaryOutputArchive`](super::BinaryOutputArchive). Every read is
//! bounded by the innermost open safe block (or the end of the stream), and
//! closing a safe block always seeks to its declared end, so a reader that
//! knows fewer fields than the writer, or that bailed out half way, still
//! lands on the next sibling.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::stream::IStream;
use super::vle;
use crate::core::{Archive, ArchiveState, BlockFrame, BlockType, PrimitiveMut};
use crate::util::{Error, Result};

/// Sanity limits applied to length prefixes read from a binary archive.
///
/// A prefix above the limit fails before anything is allocated, so corrupt
/// input cannot request gigabytes of memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadLimits {
    /// Maximum byte length of a single string.
    pub max_string_len: usize,
    /// Maximum declared item count of an Array or Map block.
    pub max_block_len: usize,
}

impl ReadLimits {
    /// No limits beyond what the wire format can express.
    pub const fn unlimited() -> Self {
        Self {
            max_string_len: usize::MAX,
            max_block_len: usize::MAX,
        }
    }
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_string_len: 64 * 1024 * 1024,
            max_block_len: 16 * 1024 * 1024,
        }
    }
}

/// Per-block state of the binary reader.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// End offset of a safe block.
    end: Option<u64>,
}

/// Archive that reads the binary format from a [`Read`] + [`Seek`] source.
#[derive(Debug)]
pub struct BinaryInputArchive<R: Read + Seek> {
    stream: IStream<R>,
    state: ArchiveState<InputFrame>,
    limits: ReadLimits,
}

impl<R: Read + Seek> BinaryInputArchive<R> {
    /// Create an archive reading from `reader`, starting at its current
    /// position.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_limits(reader, ReadLimits::default())
    }

    /// Create an archive with custom [`ReadLimits`].
    pub fn with_limits(reader: R, limits: ReadLimits) -> Result<Self> {
        let stream = IStream::new(reader).map_err(|e| Error::io("", "", e.to_string()))?;
        Ok(Self {
            stream,
            state: ArchiveState::new(),
            limits,
        })
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.stream.pos()
    }

    #[inline]
    pub fn limits(&self) -> ReadLimits {
        self.limits
    }

    pub fn into_inner(self) -> R {
        self.stream.into_inner()
    }

    /// End of the region reads are currently allowed in.
    fn region_end(&self) -> u64 {
        self.state
            .frames()
            .iter()
            .rev()
            .find_map(|frame| frame.payload.end)
            .unwrap_or_else(|| self.stream.len())
    }

    /// Run `f` against the stream with reads limited to `end`.
    fn read_until<T>(
        &mut self,
        name: &str,
        end: u64,
        f: impl FnOnce(&mut dyn Read) -> io::Result<T>,
    ) -> Result<T> {
        let available = end.saturating_sub(self.stream.pos());
        let mut limited = (&mut self.stream).take(available);
        f(&mut limited).map_err(|e| {
            let message = if e.kind() == io::ErrorKind::UnexpectedEof {
                "read past the end of the enclosing block".to_string()
            } else {
                e.to_string()
            };
            Error::io(self.state.block_path(), name, message)
        })
    }

    fn read_with<T>(&mut self, name: &str, f: impl FnOnce(&mut dyn Read) -> io::Result<T>) -> Result<T> {
        let end = self.region_end();
        self.read_until(name, end, f)
    }

    fn read_length(&mut self, name: &str, end: u64, limit: usize, what: &str) -> Result<usize> {
        let len = self.read_until(name, end, |r| vle::read_vle(r))? as usize;
        if len > limit {
            return Err(Error::unexpected(
                self.state.block_path(),
                name,
                format!("{} length {} exceeds the limit of {}", what, len, limit),
            ));
        }
        Ok(len)
    }

    /// Length prefix of a byte run that must fit both the string limit and
    /// the bytes left in the enclosing region.
    fn read_byte_length(&mut self, name: &str, what: &str) -> Result<usize> {
        let end = self.region_end();
        let len = self.read_length(name, end, self.limits.max_string_len, what)?;
        let remaining = end.saturating_sub(self.stream.pos());
        if len as u64 > remaining {
            return Err(Error::io(
                self.state.block_path(),
                name,
                format!("{} of {} bytes overruns its enclosing region", what, len),
            ));
        }
        Ok(len)
    }
}

impl BinaryInputArchive<BufReader<File>> {
    /// Open a binary archive file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream = IStream::open(path)
            .map_err(|e| Error::io("", path.display().to_string(), e.to_string()))?;
        Ok(Self {
            stream,
            state: ArchiveState::new(),
            limits: ReadLimits::default(),
        })
    }
}

impl<R: Read + Seek> Archive for BinaryInputArchive<R> {
    fn is_input(&self) -> bool {
        true
    }

    fn is_human_readable(&self) -> bool {
        false
    }

    fn is_eof(&self) -> bool {
        self.state.is_eof()
    }

    fn block_path(&self) -> String {
        self.state.block_path()
    }

    fn current_block_type(&self) -> Option<BlockType> {
        self.state.current_block_type()
    }

    fn is_unordered_access_supported_in_current_block(&self) -> bool {
        false
    }

    fn has_element_or_block(&self, _name: &str) -> bool {
        false
    }

    fn begin_block(
        &mut self,
        name: &str,
        size_hint: &mut usize,
        safe: bool,
        block_type: BlockType,
    ) -> Result<()> {
        self.state.check_before_block(name)?;
        self.state.register_input_item();

        let mut end = self.region_end();
        let mut safe_end = None;
        if safe {
            let len = self.read_length(name, end, usize::MAX, "safe block")? as u64;
            let block_end = self.stream.pos() + len;
            if block_end > end {
                return Err(Error::io(
                    self.state.block_path(),
                    name,
                    format!("safe block of {} bytes overruns its enclosing region", len),
                ));
            }
            end = block_end;
            safe_end = Some(block_end);
        }

        let count = if block_type.has_declared_size() {
            self.read_length(name, end, self.limits.max_block_len, "block")?
        } else {
            0
        };
        *size_hint = count;

        let payload = InputFrame { end: safe_end };
        self.state
            .push(BlockFrame::new(name, block_type, count, safe, payload));
        Ok(())
    }

    fn begin_inline_block(&mut self) -> Result<()> {
        self.state.begin_inline()
    }

    fn end_block(&mut self) {
        let Some(frame) = self.state.pop() else {
            return;
        };
        let mut result = Ok(());
        if let Some(end) = frame.payload.end {
            let pos = self.stream.pos();
            if pos != end {
                tracing::debug!(
                    block = frame.name(),
                    skipped = end.saturating_sub(pos),
                    "seeking to end of safe block"
                );
                result = self.stream.seek_to(end).map_err(|e| {
                    Error::io(self.state.child_path(frame.name()), frame.name(), e.to_string())
                });
            }
        }
        self.state.finish_block(result);
    }

    fn flush(&mut self) -> Result<()> {
        self.state.take_delayed_error()
    }

    fn serialize_primitive(&mut self, name: &str, value: PrimitiveMut<'_>) -> Result<()> {
        self.state.check_before_element(name)?;
        self.state.register_input_item();
        match value {
            PrimitiveMut::Bool(v) => *v = self.read_with(name, |r| r.read_u8())? != 0,
            PrimitiveMut::I8(v) => *v = self.read_with(name, |r| r.read_i8())?,
            PrimitiveMut::U8(v) => *v = self.read_with(name, |r| r.read_u8())?,
            PrimitiveMut::I16(v) => *v = self.read_with(name, |r| r.read_i16::<LittleEndian>())?,
            PrimitiveMut::U16(v) => *v = self.read_with(name, |r| r.read_u16::<LittleEndian>())?,
            PrimitiveMut::I32(v) => *v = self.read_with(name, |r| r.read_i32::<LittleEndian>())?,
            PrimitiveMut::U32(v) => *v = self.read_with(name, |r| r.read_u32::<LittleEndian>())?,
            PrimitiveMut::I64(v) => *v = self.read_with(name, |r| r.read_i64::<LittleEndian>())?,
            PrimitiveMut::U64(v) => *v = self.read_with(name, |r| r.read_u64::<LittleEndian>())?,
            PrimitiveMut::F32(v) => *v = self.read_with(name, |r| r.read_f32::<LittleEndian>())?,
            PrimitiveMut::F64(v) => *v = self.read_with(name, |r| r.read_f64::<LittleEndian>())?,
            PrimitiveMut::String(v) => {
                let len = self.read_byte_length(name, "string")?;
                let bytes = self.read_with(name, |r| {
                    let mut buf = vec![0u8; len];
                    r.read_exact(&mut buf)?;
                    Ok(buf)
                })?;
                *v = String::from_utf8(bytes).map_err(|e| {
                    Error::unexpected(self.state.block_path(), name, e.to_string())
                })?;
            }
        }
        Ok(())
    }

    fn serialize_bytes(&mut self, name: &str, bytes: &mut [u8]) -> Result<()> {
        self.state.check_before_element(name)?;
        self.state.register_input_item();
        let len = bytes.len();
        let buf = self.read_with(name, |r| {
            let mut buf = vec![0u8; len];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })?;
        bytes.copy_from_slice(&buf);
        Ok(())
    }

    fn serialize_vle(&mut self, name: &str, value: &mut u32) -> Result<()> {
        self.state.check_before_element(name)?;
        self.state.register_input_item();
        *value = self.read_with(name, |r| vle::read_vle(r))?;
        Ok(())
    }

    fn serialize_blob_len(&mut self, name: &str, len: &mut u32) -> Result<()> {
        self.state.check_before_element(name)?;
        self.state.register_input_item();
        let checked = self.read_byte_length(name, "blob")?;
        // VLE values never exceed 0x1FFF_FFFF
        *len = checked as u32;
        Ok(())
    }
}
