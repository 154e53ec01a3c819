//! The archive capability interface.
//!
//! One trait, implemented by every backend. Higher-level code talks to
//! `&mut dyn Archive` and never needs to know which format it is driving; the
//! same call sequence writes on an output archive and reads on an input one.

use super::block::BlockType;
use super::primitive::{Primitive, PrimitiveMut};
use crate::util::{Error, Result};

/// Reserved element name of version fields.
pub const VERSION_ELEMENT: &str = "version";

/// Serialization session bound to one root container.
///
/// Blocks are opened with [`begin_block`](Archive::begin_block) and must be
/// closed with [`end_block`](Archive::end_block); in practice callers use the
/// guards in [`crate::core::guard`], which pair the two on every exit path.
pub trait Archive {
    /// Whether this archive reads into values (true) or writes them out.
    fn is_input(&self) -> bool;

    /// Whether the backend is a text format meant to be read by people.
    fn is_human_readable(&self) -> bool;

    /// True once the root block has been closed.
    fn is_eof(&self) -> bool;

    /// Slash-joined names of the open blocks.
    fn block_path(&self) -> String;

    /// Type of the innermost open block, `None` before the root block.
    fn current_block_type(&self) -> Option<BlockType>;

    /// True if the innermost block supports presence queries via
    /// [`has_element_or_block`](Archive::has_element_or_block).
    fn is_unordered_access_supported_in_current_block(&self) -> bool;

    /// Whether the innermost Unordered block contains `name`.
    ///
    /// Input archives answer from the source container. Output archives
    /// answer whether `name` was already written. Always `false` when
    /// unordered access is not supported.
    fn has_element_or_block(&self, name: &str) -> bool;

    /// Open a block.
    ///
    /// For Array and Map blocks `size_hint` is the declared item count; input
    /// archives overwrite it with the count found in the source. A safe
    /// block isolates failures inside it from the data that follows.
    fn begin_block(
        &mut self,
        name: &str,
        size_hint: &mut usize,
        safe: bool,
        block_type: BlockType,
    ) -> Result<()>;

    /// Open a nameless sub-scope that shares the innermost block.
    /// Items serialized inside it land in that block.
    fn begin_inline_block(&mut self) -> Result<()>;

    /// Close the innermost inline scope or block.
    ///
    /// Never fails directly: errors raised while finalizing are stored and
    /// surfaced by the next element call or [`flush`](Archive::flush).
    fn end_block(&mut self);

    /// Surface any deferred error and flush buffered output.
    fn flush(&mut self) -> Result<()>;

    /// Read or write one primitive element.
    fn serialize_primitive(&mut self, name: &str, value: PrimitiveMut<'_>) -> Result<()>;

    /// Read or write a fixed-size raw blob. The size is not stored.
    fn serialize_bytes(&mut self, name: &str, bytes: &mut [u8]) -> Result<()>;

    /// Read or write an unsigned integer with variable-length encoding.
    fn serialize_vle(&mut self, name: &str, value: &mut u32) -> Result<()>;

    /// Read or write the byte length of a raw blob stored right after it.
    ///
    /// Input archives reject lengths they cannot deliver, so the caller may
    /// allocate `len` bytes once this returns.
    fn serialize_blob_len(&mut self, name: &str, len: &mut u32) -> Result<()> {
        self.serialize_vle(name, len)
    }

    /// Read or write a version number.
    ///
    /// Returns the version that was written, or the version found on input.
    /// Zero is reserved for "unversioned": writing it is rejected, reading it
    /// is returned as-is so callers can detect data written without one.
    fn serialize_version(&mut self, version: u32) -> Result<u32> {
        if !self.is_input() && version == 0 {
            return Err(Error::unexpected(
                self.block_path(),
                VERSION_ELEMENT,
                "version 0 is reserved for unversioned data",
            ));
        }
        let mut value = version;
        self.serialize_vle(VERSION_ELEMENT, &mut value)?;
        Ok(value)
    }
}

/// Read or write any primitive through an archive.
#[inline]
pub fn serialize_primitive<T: Primitive>(ar: &mut dyn Archive, name: &str, value: &mut T) -> Result<()> {
    ar.serialize_primitive(name, value.as_primitive_mut())
}
