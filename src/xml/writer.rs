//! DOM-text output archive.

use dom_tree::Element;

use crate::core::{Archive, ArchiveState, BlockFrame, BlockType, PrimitiveMut};
use crate::util::Result;

/// Per-block state of the DOM writer: the element under construction.
#[derive(Debug)]
pub struct OutputElement {
    element: Element,
}

/// Archive that builds a [`dom_tree::Element`] tree.
///
/// Every block is an element named after the block. Scalars inside
/// Unordered blocks become attributes; everything else becomes a child
/// element. The finished root element replaces the caller's root.
#[derive(Debug)]
pub struct XmlOutputArchive<'a> {
    root: &'a mut Element,
    state: ArchiveState<OutputElement>,
}

impl<'a> XmlOutputArchive<'a> {
    /// Create an archive that writes into `root`.
    pub fn new(root: &'a mut Element) -> Self {
        Self {
            root,
            state: ArchiveState::new(),
        }
    }

    /// Store a scalar in the innermost block.
    fn place_text(&mut self, name: &str, text: String) {
        let Some(frame) = self.state.current_mut() else {
            return;
        };
        if frame.block_type() == BlockType::Unordered {
            frame.payload.element.set_attribute(name, text);
        } else {
            let mut child = Element::new(name);
            child.set_text(text);
            frame.payload.element.append_child(child);
        }
    }
}

impl Archive for XmlOutputArchive<'_> {
    fn is_input(&self) -> bool {
        false
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
            Some(frame) if frame.block_type() == BlockType::Unordered => frame.has_used_name(name),
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
        self.state.register_output_item(name)?;
        let payload = OutputElement {
            element: Element::new(name),
        };
        self.state
            .push(BlockFrame::new(name, block_type, *size_hint, safe, payload));
        Ok(())
    }

    fn begin_inline_block(&mut self) -> Result<()> {
        self.state.begin_inline()
    }

    fn end_block(&mut self) {
        let Some(frame) = self.state.pop() else {
            return;
        };
        let path = self.state.child_path(frame.name());
        let result = ArchiveState::check_item_count(&frame, &path);
        let element = frame.payload.element;
        match self.state.current_mut() {
            Some(parent) => {
                parent.payload.element.append_child(element);
            }
            None => *self.root = element,
        }
        self.state.finish_block(result);
    }

    fn flush(&mut self) -> Result<()> {
        self.state.take_delayed_error()
    }

    fn serialize_primitive(&mut self, name: &str, value: PrimitiveMut<'_>) -> Result<()> {
        self.state.check_before_output_item(name)?;
        self.place_text(name, value.to_text());
        Ok(())
    }

    fn serialize_bytes(&mut self, name: &str, bytes: &mut [u8]) -> Result<()> {
        self.state.check_before_output_item(name)?;
        self.place_text(name, hex::encode_upper(bytes));
        Ok(())
    }

    fn serialize_vle(&mut self, name: &str, value: &mut u32) -> Result<()> {
        self.state.check_before_output_item(name)?;
        self.place_text(name, value.to_string());
        Ok(())
    }
}
