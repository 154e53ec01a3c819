//! DOM-text input archive.

use dom_tree::Element;

use crate::core::{Archive, ArchiveState, BlockFrame, BlockType, PrimitiveMut};
use crate::util::{Error, Result};

/// Per-block state of the DOM reader.
#[derive(Debug)]
pub struct InputElement<'a> {
    element: &'a Element,
    /// Next child of an ordered block.
    cursor: usize,
}

/// Archive that reads from a [`dom_tree::Element`] tree.
///
/// Unordered blocks resolve a name as an attribute first and fall back to a
/// child element of that name. Ordered blocks consume children in document
/// order with a single forward cursor.
#[derive(Debug)]
pub struct XmlInputArchive<'a> {
    root: &'a Element,
    state: ArchiveState<InputElement<'a>>,
}

impl<'a> XmlInputArchive<'a> {
    /// Create an archive reading from `root`.
    pub fn new(root: &'a Element) -> Self {
        Self {
            root,
            state: ArchiveState::new(),
        }
    }

    /// Next child element for a block or ordered scalar.
    fn next_child(&mut self, name: &str) -> Result<&'a Element> {
        let path = self.state.block_path();
        let Some(frame) = self.state.current_mut() else {
            if self.root.name() == name {
                return Ok(self.root);
            }
            return Err(Error::not_found(path, name, None));
        };
        let element = frame.payload.element;
        if frame.block_type() == BlockType::Unordered {
            return element
                .child(name)
                .ok_or_else(|| Error::not_found(path, name, None));
        }
        let index = frame.payload.cursor;
        match element.child_at(index) {
            Some(child) if child.name() == name => {
                frame.payload.cursor += 1;
                Ok(child)
            }
            _ => Err(Error::not_found(path, name, Some(index))),
        }
    }

    /// Text source of a scalar element.
    fn scalar(&mut self, name: &str) -> Result<&'a str> {
        if let Some(frame) = self.state.current() {
            let element = frame.payload.element;
            if frame.block_type() == BlockType::Unordered {
                if let Some(value) = element.attribute(name) {
                    return Ok(value);
                }
            }
        }
        Ok(self.next_child(name)?.text())
    }
}

impl Archive for XmlInputArchive<'_> {
    fn is_input(&self) -> bool {
        true
    }

    fn is_human_readable(&self) -> bool {
        true
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
        self.state.current_block_type() == Some(BlockType::Unordered)
    }

    fn has_element_or_block(&self, name: &str) -> bool {
        match self.state.current() {
            Some(frame) if frame.block_type() == BlockType::Unordered => {
                let element = frame.payload.element;
                element.has_attribute(name) || element.child(name).is_some()
            }
            _ => false,
        }
    }

    fn begin_block(
        &mut self,
        name: &str,
        size_hint: &mut usize,
        safe: bool,
        block_type: BlockType,
    ) -> Result<()> {
        self.state.check_before_block(name)?;
        let element = self.next_child(name)?;
        self.state.register_input_item();

        let len = match block_type {
            BlockType::Unordered => element.num_attributes() + element.num_children(),
            _ => element.num_children(),
        };
        *size_hint = len;
        self.state.push(BlockFrame::new(
            name,
            block_type,
            len,
            safe,
            InputElement { element, cursor: 0 },
        ));
        Ok(())
    }

    fn begin_inline_block(&mut self) -> Result<()> {
        self.state.begin_inline()
    }

    fn end_block(&mut self) {
        if self.state.pop().is_some() {
            self.state.finish_block(Ok(()));
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.state.take_delayed_error()
    }

    fn serialize_primitive(&mut self, name: &str, mut value: PrimitiveMut<'_>) -> Result<()> {
        self.state.check_before_element(name)?;
        let text = self.scalar(name)?;
        self.state.register_input_item();
        value
            .assign_from_text(text)
            .map_err(|message| Error::unexpected(self.state.block_path(), name, message))
    }

    fn serialize_bytes(&mut self, name: &str, bytes: &mut [u8]) -> Result<()> {
        self.state.check_before_element(name)?;
        let text = self.scalar(name)?;
        self.state.register_input_item();
        let decoded = hex::decode(text.trim())
            .map_err(|e| Error::unexpected(self.state.block_path(), name, e.to_string()))?;
        if decoded.len() != bytes.len() {
            return Err(Error::unexpected(
                self.state.block_path(),
                name,
                format!("expected {} bytes, found {}", bytes.len(), decoded.len()),
            ));
        }
        bytes.copy_from_slice(&decoded);
        Ok(())
    }

    fn serialize_vle(&mut self, name: &str, value: &mut u32) -> Result<()> {
        self.state.check_before_element(name)?;
        let text = self.scalar(name)?;
        self.state.register_input_item();
        PrimitiveMut::U32(value)
            .assign_from_text(text)
            .map_err(|message| Error::unexpected(self.state.block_path(), name, message))
    }
}
