//! Block model: block types and the per-level frame every backend tracks.

use std::collections::HashSet;
use std::fmt;

/// Layout of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Order-preserving, names are irrelevant.
    #[default]
    Sequential,
    /// Named items with unique names. Best lookup support.
    Unordered,
    /// Ordered items, count fixed when the block is opened.
    Array,
    /// Ordered key/value pairs. Each item is an Unordered block holding
    /// `key` and `value`.
    Map,
}

impl BlockType {
    /// Whether the block declares its item count up front.
    #[inline]
    pub const fn has_declared_size(self) -> bool {
        matches!(self, Self::Array | Self::Map)
    }

    /// Returns the name of this block type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Unordered => "Unordered",
            Self::Array => "Array",
            Self::Map => "Map",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of one open block.
///
/// `P` is the backend payload: a staging buffer or stream region for the
/// binary backend, a tree node for the text backends.
#[derive(Debug)]
pub struct BlockFrame<P> {
    name: String,
    block_type: BlockType,
    safe: bool,
    size_hint: usize,
    num_items: usize,
    inline_depth: u32,
    /// Names already used in an Unordered output block.
    used_names: HashSet<String>,
    /// Backend-specific state.
    pub payload: P,
}

impl<P> BlockFrame<P> {
    /// Create a frame for a freshly opened block.
    pub fn new(name: &str, block_type: BlockType, size_hint: usize, safe: bool, payload: P) -> Self {
        Self {
            name: name.to_string(),
            block_type,
            safe,
            size_hint,
            num_items: 0,
            inline_depth: 0,
            used_names: HashSet::new(),
            payload,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    #[inline]
    pub fn is_safe(&self) -> bool {
        self.safe
    }

    /// Declared item count for Array/Map blocks.
    #[inline]
    pub fn size_hint(&self) -> usize {
        self.size_hint
    }

    /// Items written to or read from this block so far.
    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Number of open inline sub-scopes sharing this frame.
    #[inline]
    pub fn inline_depth(&self) -> u32 {
        self.inline_depth
    }

    /// Whether `name` was already used in this Unordered output block.
    pub fn has_used_name(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }

    pub(crate) fn add_item(&mut self) {
        self.num_items += 1;
    }

    /// Record a name, returning `false` if it was already used.
    pub(crate) fn use_name(&mut self, name: &str) -> bool {
        self.used_names.insert(name.to_string())
    }

    pub(crate) fn open_inline(&mut self) {
        self.inline_depth += 1;
    }

    /// Close one inline sub-scope. Returns `false` if none was open.
    pub(crate) fn close_inline(&mut self) -> bool {
        if self.inline_depth == 0 {
            return false;
        }
        self.inline_depth -= 1;
        true
    }
}
