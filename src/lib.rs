//! # blockarchive
//!
//! Format-agnostic, bidirectional serialization archives.
//!
//! Application code describes its data once as a tree of named blocks and
//! elements. The same description writes to, and reads back from, a compact
//! binary stream, a JSON value tree or an XML element tree.
//!
//! ## Modules
//!
//! - [`util`] - Errors, name validation, hex codec
//! - [`core`] - Block model, shared state machine, the [`Archive`] trait, block guards
//! - [`binary`] - Byte-stream backend with VLE lengths and skippable safe blocks
//! - [`json`] - Backend over [`serde_json::Value`]
//! - [`xml`] - Backend over [`dom_tree::Element`]
//! - [`serialize`] - The [`Serializable`] trait and helpers for common shapes
//!
//! ## Example
//!
//! ```ignore
//! use blockarchive::prelude::*;
//!
//! #[derive(Default)]
//! struct Config { threads: u32, name: String }
//!
//! impl Serializable for Config {
//!     fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
//!         let mut block = open_unordered_block(ar, name)?;
//!         serialize_value(&mut *block, "threads", &mut self.threads)?;
//!         serialize_value(&mut *block, "name", &mut self.name)
//!     }
//! }
//!
//! let mut config = Config { threads: 8, name: "main".into() };
//! let bytes = blockarchive::binary::to_bytes("Config", &mut config)?;
//! let json = blockarchive::json::to_value("Config", &mut config)?;
//! ```

pub mod util;
pub mod core;
pub mod binary;
pub mod json;
pub mod xml;
pub mod serialize;

pub use dom_tree;

// Re-export commonly used types
pub use util::{Error, ErrorKind, Result};
pub use core::{Archive, BlockGuard, BlockType};
pub use serialize::Serializable;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, ErrorKind, Result};
    pub use crate::core::{
        open_array_block, open_block, open_inline_block, open_map_block,
        open_safe_sequential_block, open_safe_unordered_block, open_sequential_block,
        open_unordered_block, serialize_primitive, Archive, BlockGuard, BlockType,
    };
    pub use crate::serialize::*;
    pub use crate::binary::{BinaryInputArchive, BinaryOutputArchive, ReadLimits};
    pub use crate::json::{JsonInputArchive, JsonOutputArchive};
    pub use crate::xml::{XmlInputArchive, XmlOutputArchive};
}
