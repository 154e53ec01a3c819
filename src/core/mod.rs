//! Core layer - the format-independent archive contract.
//!
//! This module provides:
//! - [`BlockType`] / [`BlockFrame`] - The block model
//! - [`ArchiveState`] - Shared state machine embedded by every backend
//! - [`Archive`] - The capability interface all backends implement
//! - [`Primitive`] / [`PrimitiveMut`] - The closed set of primitive element types
//! - [`BlockGuard`] and the `open_*` functions - Scoped blocks

mod block;
mod state;
mod traits;
mod primitive;
pub mod guard;

pub use block::{BlockFrame, BlockType};
pub use state::ArchiveState;
pub use traits::{serialize_primitive, Archive, VERSION_ELEMENT};
pub use primitive::{Primitive, PrimitiveKind, PrimitiveMut};
pub(crate) use primitive::{non_finite_text, parse_float};
pub use guard::{
    open_array_block, open_block, open_inline_block, open_map_block,
    open_safe_sequential_block, open_safe_unordered_block, open_sequential_block,
    open_unordered_block, BlockGuard,
};
