//! Serialization helper layer.
//!
//! Generic, bidirectional serialization on top of the [`Archive`] primitives.
//! The same code path writes a value on an output archive and reads it back on
//! an input archive, branching only on [`Archive::is_input`].
//!
//! ```ignore
//! use blockarchive::prelude::*;
//!
//! struct Window { width: u32, title: String, maximized: bool }
//!
//! impl Serializable for Window {
//!     fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
//!         let mut block = open_unordered_block(ar, name)?;
//!         serialize_value(&mut *block, "width", &mut self.width)?;
//!         serialize_value(&mut *block, "title", &mut self.title)?;
//!         serialize_optional_value(&mut *block, "maximized", &mut self.maximized, &false)
//!     }
//! }
//! ```

mod primitives;
mod sequence;
mod optional;
mod enums;
mod containers;
mod tie;
mod packed;

pub use sequence::{serialize_fixed_array, serialize_pod_vector, serialize_vector, DEFAULT_ELEMENT_NAME};
pub use optional::{serialize_optional_strict, serialize_optional_value};
pub use enums::{serialize_enum, serialize_enum_with_names, ArchiveEnum};
pub use containers::{serialize_map, serialize_set, KeyedContainer};
pub use tie::{serialize_tied, TiedVectors};
pub use packed::{serialize_packed, serialize_versioned};

use crate::core::Archive;
use crate::util::Result;

/// A value that can be written to and read from any archive.
pub trait Serializable {
    /// Serialize `self` as the element or block `name` of the current block.
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()>;

    /// Serialize a vector of `Self` as the block `name`.
    ///
    /// Numeric primitives override this to write the whole vector as a single
    /// byte blob in archives that are not human-readable.
    #[doc(hidden)]
    fn serialize_vec(
        vec: &mut Vec<Self>,
        ar: &mut dyn Archive,
        name: &str,
        element_name: &str,
    ) -> Result<()>
    where
        Self: Sized + Default,
    {
        sequence::serialize_elements(ar, name, element_name, vec)
    }
}

/// Serialize any [`Serializable`] value.
#[inline]
pub fn serialize_value<T: Serializable + ?Sized>(
    ar: &mut dyn Archive,
    name: &str,
    value: &mut T,
) -> Result<()> {
    value.serialize(ar, name)
}
