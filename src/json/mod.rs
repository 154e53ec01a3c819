//! Tree-text (JSON-like) backend over [`serde_json::Value`].
//!
//! ## Shape
//!
//! ```text
//! Unordered           -> object
//! Array / Sequential  -> array
//! Map                 -> array of {"key": .., "value": ..} objects
//! i64 / u64           -> decimal string
//! non-finite floats   -> "NaN" / "inf" / "-inf"
//! bytes               -> upper-case hex string
//! ```
//!
//! Parsing and printing JSON text is left to `serde_json`.

mod reader;
mod writer;

pub use reader::{InputNode, JsonInputArchive};
pub use writer::{JsonOutputArchive, OutputNode};

use serde_json::Value;

use crate::core::Archive;
use crate::serialize::Serializable;
use crate::util::Result;

/// Serialize `value` into a new tree.
pub fn to_value<T: Serializable + ?Sized>(name: &str, value: &mut T) -> Result<Value> {
    let mut root = Value::Null;
    {
        let mut archive = JsonOutputArchive::new(&mut root);
        value.serialize(&mut archive, name)?;
        archive.flush()?;
    }
    Ok(root)
}

/// Deserialize `value` from a tree.
pub fn from_value<T: Serializable + ?Sized>(root: &Value, name: &str, value: &mut T) -> Result<()> {
    let mut archive = JsonInputArchive::new(root);
    value.serialize(&mut archive, name)?;
    archive.flush()
}
