//! Binary output archive.
//!
//! Primitives are written as fixed-width little-endian values. Names are not
//! stored; the reader relies on visiting fields in the same order. Array and
//! Map blocks start with `VLE(count)`. Safe blocks are staged in a private
//! buffer and committed to the parent as `VLE(byte length)` + bytes when they
//! close.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::stream::OStream;
use super::vle::{self, VLE_MAX};
use crate::core::{Archive, ArchiveState, BlockFrame, BlockType, PrimitiveMut};
use crate::util::{Error, Result};

/// Per-block state of the binary writer.
#[derive(Debug, Default)]
pub struct OutputFrame {
    /// Staging buffer of a safe block.
    staging: Option<Vec<u8>>,
}

/// Archive that writes the binary format to a [`Write`] sink.
#[derive(Debug)]
pub struct BinaryOutputArchive<W: Write> {
    stream: OStream<W>,
    state: ArchiveState<OutputFrame>,
}

impl<W: Write> BinaryOutputArchive<W> {
    /// Create an archive writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            stream: OStream::new(writer),
            state: ArchiveState::new(),
        }
    }

    /// Bytes committed to the underlying writer so far.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.stream.pos()
    }

    /// Unwrap the underlying writer. Call [`Archive::flush`] first to
    /// surface deferred errors.
    pub fn into_inner(self) -> W {
        self.stream.into_inner()
    }

    /// Run `f` against the innermost safe block's staging buffer, or the
    /// stream when no safe block is open.
    fn write_with(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn Write) -> io::Result<()>,
    ) -> Result<()> {
        let staging = self
            .state
            .frames_mut()
            .iter_mut()
            .rev()
            .find_map(|frame| frame.payload.staging.as_mut());
        let result = match staging {
            Some(buf) => f(buf),
            None => f(&mut self.stream),
        };
        result.map_err(|e| Error::io(self.state.block_path(), name, e.to_string()))
    }

    fn check_vle_range(&self, name: &str, value: u64) -> Result<u32> {
        if value > VLE_MAX as u64 {
            return Err(Error::unexpected(
                self.state.block_path(),
                name,
                format!("{} exceeds the VLE limit of {}", value, VLE_MAX),
            ));
        }
        Ok(value as u32)
    }

    /// Commit a closed safe block into its parent.
    fn commit_safe_block(&mut self, name: &str, staged: &[u8]) -> Result<()> {
        let len = self.check_vle_range(name, staged.len() as u64)?;
        self.write_with(name, |w| {
            vle::write_vle(w, len)?;
            w.write_all(staged)
        })?;
        tracing::debug!(block = name, bytes = staged.len(), "committed safe block");
        Ok(())
    }
}

impl BinaryOutputArchive<BufWriter<File>> {
    /// Create an archive writing to a new file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream = OStream::create(path)
            .map_err(|e| Error::io("", path.display().to_string(), e.to_string()))?;
        Ok(Self {
            stream,
            state: ArchiveState::new(),
        })
    }
}

impl<W: Write> Archive for BinaryOutputArchive<W> {
    fn is_input(&self) -> bool {
        false
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
        let count = if block_type.has_declared_size() {
            Some(self.check_vle_range(name, *size_hint as u64)?)
        } else {
            None
        };
        self.state.register_output_item(name)?;

        let payload = OutputFrame {
            staging: safe.then(Vec::new),
        };
        self.state
            .push(BlockFrame::new(name, block_type, *size_hint, safe, payload));

        if let Some(count) = count {
            if let Err(err) = self.write_with(name, |w| vle::write_vle(w, count)) {
                self.state.pop();
                return Err(err);
            }
        }
        Ok(())
    }

    fn begin_inline_block(&mut self) -> Result<()> {
        self.state.begin_inline()
    }

    fn end_block(&mut self) {
        let Some(frame) = self.state.pop() else {
            return;
        };
        let path = self.state.child_path(frame.name());
        let mut result = ArchiveState::check_item_count(&frame, &path);

        let name = frame.name().to_string();
        if let Some(staged) = frame.payload.staging {
            let commit = self.commit_safe_block(&name, &staged);
            if result.is_ok() {
                result = commit;
            }
        }
        self.state.finish_block(result);
    }

    fn flush(&mut self) -> Result<()> {
        self.state.take_delayed_error()?;
        self.stream
            .flush()
            .map_err(|e| Error::io(self.state.block_path(), "", e.to_string()))
    }

    fn serialize_primitive(&mut self, name: &str, value: PrimitiveMut<'_>) -> Result<()> {
        self.state.check_before_output_item(name)?;
        match value {
            PrimitiveMut::Bool(v) => {
                let byte = *v as u8;
                self.write_with(name, |w| w.write_u8(byte))
            }
            PrimitiveMut::I8(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_i8(v))
            }
            PrimitiveMut::U8(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_u8(v))
            }
            PrimitiveMut::I16(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_i16::<LittleEndian>(v))
            }
            PrimitiveMut::U16(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_u16::<LittleEndian>(v))
            }
            PrimitiveMut::I32(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_i32::<LittleEndian>(v))
            }
            PrimitiveMut::U32(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_u32::<LittleEndian>(v))
            }
            PrimitiveMut::I64(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_i64::<LittleEndian>(v))
            }
            PrimitiveMut::U64(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_u64::<LittleEndian>(v))
            }
            PrimitiveMut::F32(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_f32::<LittleEndian>(v))
            }
            PrimitiveMut::F64(v) => {
                let v = *v;
                self.write_with(name, |w| w.write_f64::<LittleEndian>(v))
            }
            PrimitiveMut::String(v) => {
                let len = self.check_vle_range(name, v.len() as u64)?;
                let bytes = v.as_bytes();
                self.write_with(name, |w| {
                    vle::write_vle(w, len)?;
                    w.write_all(bytes)
                })
            }
        }
    }

    fn serialize_bytes(&mut self, name: &str, bytes: &mut [u8]) -> Result<()> {
        self.state.check_before_output_item(name)?;
        let bytes: &[u8] = bytes;
        self.write_with(name, |w| w.write_all(bytes))
    }

    fn serialize_vle(&mut self, name: &str, value: &mut u32) -> Result<()> {
        self.state.check_before_output_item(name)?;
        let value = self.check_vle_range(name, *value as u64)?;
        self.write_with(name, |w| vle::write_vle(w, value))
    }
}
