//! Binary backend.
//!
//! ## Wire format
//!
//! ```text
//! bool              1 byte (0 / 1)
//! i8..u64, f32/f64  fixed width, little-endian
//! string            VLE(byte length) + UTF-8 bytes
//! bytes             raw, size not stored
//! Array / Map       VLE(count) + items
//! Sequential /      items only, names are not stored
//!   Unordered
//! safe block        VLE(byte length) + exactly that many bytes
//! ```
//!
//! See [`vle`] for the variable-length integer encoding.

mod stream;
pub mod vle;
mod reader;
mod writer;

use std::io::Cursor;

pub use reader::{BinaryInputArchive, InputFrame, ReadLimits};
pub use stream::{IStream, OStream};
pub use writer::{BinaryOutputArchive, OutputFrame};

use crate::core::Archive;
use crate::serialize::Serializable;
use crate::util::Result;

/// Serialize `value` into a new byte buffer.
///
/// `name` is the name of the root block, which `value` is expected to open.
pub fn to_bytes<T: Serializable + ?Sized>(name: &str, value: &mut T) -> Result<Vec<u8>> {
    let mut archive = BinaryOutputArchive::new(Vec::new());
    value.serialize(&mut archive, name)?;
    archive.flush()?;
    Ok(archive.into_inner())
}

/// Deserialize `value` from a byte buffer produced by [`to_bytes`].
pub fn from_bytes<T: Serializable + ?Sized>(bytes: &[u8], name: &str, value: &mut T) -> Result<()> {
    let mut archive = BinaryInputArchive::new(Cursor::new(bytes))?;
    value.serialize(&mut archive, name)?;
    archive.flush()
}
