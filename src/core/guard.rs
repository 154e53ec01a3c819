//! Scoped block guards.
//!
//! Opening a block returns a [`BlockGuard`] that closes it exactly once when
//! dropped, whether the enclosing code returns normally or bails out with `?`.
//! The guard dereferences to the archive, so nested elements are serialized
//! through it.

use std::ops::{Deref, DerefMut};

use super::block::BlockType;
use super::traits::Archive;
use crate::util::Result;

/// An open block. Dropping it closes the block.
pub struct BlockGuard<'a> {
    archive: &'a mut dyn Archive,
    size_hint: usize,
}

impl<'a> BlockGuard<'a> {
    /// Item count of the block: the declared count on output, the count
    /// found in the source on input.
    #[inline]
    pub fn size_hint(&self) -> usize {
        self.size_hint
    }
}

impl<'a> Deref for BlockGuard<'a> {
    type Target = dyn Archive + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.archive
    }
}

impl<'a> DerefMut for BlockGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.archive
    }
}

impl Drop for BlockGuard<'_> {
    fn drop(&mut self) {
        self.archive.end_block();
    }
}

/// Open a block of any type.
pub fn open_block<'a>(
    ar: &'a mut dyn Archive,
    name: &str,
    size_hint: usize,
    safe: bool,
    block_type: BlockType,
) -> Result<BlockGuard<'a>> {
    let mut size_hint = size_hint;
    ar.begin_block(name, &mut size_hint, safe, block_type)?;
    Ok(BlockGuard { archive: ar, size_hint })
}

/// Open a Sequential block.
pub fn open_sequential_block<'a>(ar: &'a mut dyn Archive, name: &str) -> Result<BlockGuard<'a>> {
    open_block(ar, name, 0, false, BlockType::Sequential)
}

/// Open an Unordered block.
pub fn open_unordered_block<'a>(ar: &'a mut dyn Archive, name: &str) -> Result<BlockGuard<'a>> {
    open_block(ar, name, 0, false, BlockType::Unordered)
}

/// Open an Array block. On input the declared `size` is ignored and the
/// stored count is available through [`BlockGuard::size_hint`].
pub fn open_array_block<'a>(ar: &'a mut dyn Archive, name: &str, size: usize) -> Result<BlockGuard<'a>> {
    open_block(ar, name, size, false, BlockType::Array)
}

/// Open a Map block. Size semantics match [`open_array_block`].
pub fn open_map_block<'a>(ar: &'a mut dyn Archive, name: &str, size: usize) -> Result<BlockGuard<'a>> {
    open_block(ar, name, size, false, BlockType::Map)
}

/// Open a safe Sequential block.
pub fn open_safe_sequential_block<'a>(ar: &'a mut dyn Archive, name: &str) -> Result<BlockGuard<'a>> {
    open_block(ar, name, 0, true, BlockType::Sequential)
}

/// Open a safe Unordered block.
pub fn open_safe_unordered_block<'a>(ar: &'a mut dyn Archive, name: &str) -> Result<BlockGuard<'a>> {
    open_block(ar, name, 0, true, BlockType::Unordered)
}

/// Open an inline scope in the current block.
pub fn open_inline_block(ar: &mut dyn Archive) -> Result<BlockGuard<'_>> {
    ar.begin_inline_block()?;
    Ok(BlockGuard { archive: ar, size_hint: 0 })
}
