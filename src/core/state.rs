//! Shared archive state machine.
//!
//! [`ArchiveState`] owns the block-frame stack, the single deferred error and
//! the end-of-archive flag. Every backend embeds one and routes its public
//! calls through the `check_*` guards before touching its container.

use smallvec::SmallVec;

use super::block::{BlockFrame, BlockType};
use crate::util::{assert_valid_name, Error, Result};

/// Block-frame stack plus deferred error and EOF tracking.
#[derive(Debug)]
pub struct ArchiveState<P> {
    stack: SmallVec<[BlockFrame<P>; 8]>,
    delayed_error: Option<Error>,
    eof: bool,
}

impl<P> Default for ArchiveState<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ArchiveState<P> {
    pub fn new() -> Self {
        Self {
            stack: SmallVec::new(),
            delayed_error: None,
            eof: false,
        }
    }

    /// True once the root block has been closed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Number of open blocks.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn current(&self) -> Option<&BlockFrame<P>> {
        self.stack.last()
    }

    #[inline]
    pub fn current_mut(&mut self) -> Option<&mut BlockFrame<P>> {
        self.stack.last_mut()
    }

    /// Open frames, root first.
    #[inline]
    pub fn frames(&self) -> &[BlockFrame<P>] {
        &self.stack
    }

    #[inline]
    pub fn frames_mut(&mut self) -> &mut [BlockFrame<P>] {
        &mut self.stack
    }

    /// Type of the innermost open block.
    pub fn current_block_type(&self) -> Option<BlockType> {
        self.current().map(|f| f.block_type())
    }

    /// Slash-joined names of the open blocks, e.g. `Root/Settings/Window`.
    pub fn block_path(&self) -> String {
        let mut path = String::new();
        for (i, frame) in self.stack.iter().enumerate() {
            if i > 0 {
                path.push('/');
            }
            path.push_str(frame.name());
        }
        path
    }

    // ========================================================================
    // Guards
    // ========================================================================

    /// Surface the deferred error, if any, clearing it.
    pub fn take_delayed_error(&mut self) -> Result<()> {
        match self.delayed_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Checks run before a block is opened.
    #[track_caller]
    pub fn check_before_block(&mut self, name: &str) -> Result<()> {
        assert_valid_name(name);
        self.take_delayed_error()?;
        if self.eof {
            return Err(Error::eof(self.block_path(), name));
        }
        Ok(())
    }

    /// Checks run before an element is read or written.
    #[track_caller]
    pub fn check_before_element(&mut self, name: &str) -> Result<()> {
        assert_valid_name(name);
        self.take_delayed_error()?;
        if self.eof {
            return Err(Error::eof(self.block_path(), name));
        }
        assert!(
            !self.stack.is_empty(),
            "element '{}' serialized outside of any block",
            name
        );
        Ok(())
    }

    /// Checks run before an element is written, plus bookkeeping for the
    /// innermost block: duplicate names in Unordered blocks and the declared
    /// count of Array/Map blocks.
    #[track_caller]
    pub fn check_before_output_item(&mut self, name: &str) -> Result<()> {
        self.check_before_element(name)?;
        self.register_output_item(name)
    }

    /// Bookkeeping for an item added to the innermost block on output.
    /// Does nothing before the root block is open.
    #[track_caller]
    pub fn register_output_item(&mut self, name: &str) -> Result<()> {
        let path = self.block_path();
        let Some(frame) = self.stack.last_mut() else {
            return Ok(());
        };
        match frame.block_type() {
            BlockType::Unordered => {
                if !frame.use_name(name) {
                    return Err(Error::duplicate(path, name));
                }
            }
            BlockType::Array | BlockType::Map => {
                assert!(
                    frame.num_items() < frame.size_hint(),
                    "too many items in {} block '{}': declared {}",
                    frame.block_type(),
                    path,
                    frame.size_hint()
                );
            }
            BlockType::Sequential => {}
        }
        frame.add_item();
        Ok(())
    }

    /// Count an item consumed from the innermost block on input.
    pub fn register_input_item(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.add_item();
        }
    }

    // ========================================================================
    // Block lifecycle
    // ========================================================================

    /// Push a newly opened block.
    pub fn push(&mut self, frame: BlockFrame<P>) {
        tracing::trace!(
            block = frame.name(),
            block_type = %frame.block_type(),
            safe = frame.is_safe(),
            depth = self.stack.len(),
            "begin block"
        );
        self.stack.push(frame);
    }

    /// Open an inline sub-scope in the innermost block.
    #[track_caller]
    pub fn begin_inline(&mut self) -> Result<()> {
        self.take_delayed_error()?;
        if self.eof {
            return Err(Error::eof(self.block_path(), "inline"));
        }
        let frame = self
            .stack
            .last_mut()
            .expect("inline block opened outside of any block");
        frame.open_inline();
        Ok(())
    }

    /// First half of closing a block.
    ///
    /// Closes an inline sub-scope if one is open and returns `None`. Otherwise
    /// pops and returns the innermost frame; the backend finalizes it and then
    /// calls [`finish_block`](Self::finish_block).
    pub fn pop(&mut self) -> Option<BlockFrame<P>> {
        let frame = self.stack.last_mut()?;
        if frame.close_inline() {
            return None;
        }
        let frame = self.stack.pop()?;
        tracing::trace!(block = frame.name(), items = frame.num_items(), "end block");
        Some(frame)
    }

    /// Second half of closing a block: record a finalization failure and mark
    /// EOF once the root block is gone.
    pub fn finish_block(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.defer_error(err);
        }
        if self.stack.is_empty() {
            tracing::debug!("root block closed");
            self.eof = true;
        }
    }

    /// Store an error to be raised by the next element or flush call.
    /// The first deferred error wins.
    pub fn defer_error(&mut self, err: Error) {
        if self.delayed_error.is_some() {
            tracing::warn!(error = %err, "discarding deferred archive error");
            return;
        }
        self.delayed_error = Some(err);
    }

    /// Error for an output Array/Map block closed with fewer items than
    /// declared, with `path` naming the block itself.
    pub fn check_item_count(frame: &BlockFrame<P>, path: &str) -> Result<()> {
        if frame.block_type().has_declared_size() && frame.num_items() != frame.size_hint() {
            tracing::warn!(
                block = path,
                declared = frame.size_hint(),
                written = frame.num_items(),
                "block closed with missing items"
            );
            return Err(Error::unexpected(
                path,
                frame.name(),
                format!(
                    "{} block closed with {} of {} declared items",
                    frame.block_type(),
                    frame.num_items(),
                    frame.size_hint()
                ),
            ));
        }
        Ok(())
    }

    /// Path of the block that was just popped: the remaining path plus its name.
    pub fn child_path(&self, name: &str) -> String {
        let parent = self.block_path();
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ErrorKind;

    fn frame(name: &str, block_type: BlockType, size: usize) -> BlockFrame<()> {
        BlockFrame::new(name, block_type, size, false, ())
    }

    #[test]
    fn test_block_path() {
        let mut state = ArchiveState::new();
        assert_eq!(state.block_path(), "");
        state.push(frame("Root", BlockType::Unordered, 0));
        state.push(frame("Settings", BlockType::Unordered, 0));
        state.push(frame("Window", BlockType::Unordered, 0));
        assert_eq!(state.block_path(), "Root/Settings/Window");
        assert_eq!(state.child_path("Size"), "Root/Settings/Window/Size");
    }

    #[test]
    fn test_eof_after_root() {
        let mut state = ArchiveState::new();
        state.check_before_block("Root").unwrap();
        state.push(frame("Root", BlockType::Unordered, 0));
        assert!(state.pop().is_some());
        state.finish_block(Ok(()));
        assert!(state.is_eof());

        let err = state.check_before_block("Second").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
        let err = state.check_before_element("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_first_deferred_error_wins() {
        let mut state: ArchiveState<()> = ArchiveState::new();
        state.push(frame("Root", BlockType::Sequential, 0));
        state.defer_error(Error::io("Root", "a", "first"));
        state.defer_error(Error::io("Root", "b", "second"));

        let err = state.check_before_element("c").unwrap_err();
        assert_eq!(err.element(), "a");
        // Cleared after being raised once.
        assert!(state.check_before_element("c").is_ok());
    }

    #[test]
    fn test_inline_scope_closes_before_frame() {
        let mut state = ArchiveState::new();
        state.push(frame("Root", BlockType::Unordered, 0));
        state.begin_inline().unwrap();
        assert!(state.pop().is_none());
        assert_eq!(state.depth(), 1);
        assert!(state.pop().is_some());
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_duplicate_output_names() {
        let mut state = ArchiveState::new();
        state.push(frame("Root", BlockType::Unordered, 0));
        state.check_before_output_item("x").unwrap();
        let err = state.check_before_output_item("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateElement);
        assert_eq!(err.block_path(), "Root");
    }

    #[test]
    fn test_sequential_allows_repeated_names() {
        let mut state = ArchiveState::new();
        state.push(frame("Root", BlockType::Sequential, 0));
        state.check_before_output_item("element").unwrap();
        state.check_before_output_item("element").unwrap();
        assert_eq!(state.current().map(|f| f.num_items()), Some(2));
    }

    #[test]
    #[should_panic(expected = "too many items")]
    fn test_array_overflow_panics() {
        let mut state = ArchiveState::new();
        state.push(frame("Items", BlockType::Array, 1));
        state.check_before_output_item("element").unwrap();
        let _ = state.check_before_output_item("element");
    }

    #[test]
    fn test_item_count_mismatch() {
        let mut f = frame("Items", BlockType::Array, 2);
        f.add_item();
        let err = ArchiveState::check_item_count(&f, "Root/Items").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);
        f.add_item();
        assert!(ArchiveState::check_item_count(&f, "Root/Items").is_ok());
    }

    #[test]
    #[should_panic(expected = "outside of any block")]
    fn test_element_without_root_panics() {
        let mut state: ArchiveState<()> = ArchiveState::new();
        let _ = state.check_before_element("x");
    }
}
