//! DOM-text (XML-like) backend over [`dom_tree::Element`].
//!
//! ## Shape
//!
//! ```text
//! block               -> element named after the block
//! Unordered scalar    -> attribute of the block element
//! Unordered block     -> child element
//! Array / Sequential  -> repeated child elements, scalars as element text
//! bytes               -> upper-case hex text
//! ```
//!
//! The root element takes the root block's name on output and must carry it
//! on input.

mod reader;
mod writer;

pub use reader::{InputElement, XmlInputArchive};
pub use writer::{OutputElement, XmlOutputArchive};

use dom_tree::Element;

use crate::core::Archive;
use crate::serialize::Serializable;
use crate::util::Result;

/// Serialize `value` into a new element tree.
pub fn to_element<T: Serializable + ?Sized>(name: &str, value: &mut T) -> Result<Element> {
    let mut root = Element::default();
    {
        let mut archive = XmlOutputArchive::new(&mut root);
        value.serialize(&mut archive, name)?;
        archive.flush()?;
    }
    Ok(root)
}

/// Deserialize `value` from an element tree.
pub fn from_element<T: Serializable + ?Sized>(root: &Element, name: &str, value: &mut T) -> Result<()> {
    let mut archive = XmlInputArchive::new(root);
    value.serialize(&mut archive, name)?;
    archive.flush()
}
