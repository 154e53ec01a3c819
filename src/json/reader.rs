//! Tree-text input archive.

use serde_json::Value;

use super::writer::type_name;
use crate::core::{parse_float, Archive, ArchiveState, BlockFrame, BlockType, PrimitiveMut};
use crate::util::{Error, Result};

/// Per-block state of the tree reader.
#[derive(Debug)]
pub struct InputNode<'a> {
    node: &'a Value,
    /// Next item of an ordered block.
    cursor: usize,
}

/// Archive that reads from a [`serde_json::Value`] tree.
#[derive(Debug)]
pub struct JsonInputArchive<'a> {
    root: &'a Value,
    state: ArchiveState<InputNode<'a>>,
}

/// Whether `node` can stand for an ordered block.
///
/// Many emitters cannot tell an empty array from an empty object, so an empty
/// object is accepted as an empty array and vice versa. `null` is empty.
fn is_array_compatible(node: &Value) -> bool {
    match node {
        Value::Array(_) | Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn is_object_compatible(node: &Value) -> bool {
    match node {
        Value::Object(_) | Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn node_len(node: &Value) -> usize {
    match node {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    }
}

/// Convert an integer node to a narrow integer type.
fn read_int<T>(node: &Value) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if let Some(i) = node.as_i64() {
        <T as TryFrom<i64>>::try_from(i).ok()
    } else if let Some(u) = node.as_u64() {
        <T as TryFrom<u64>>::try_from(u).ok()
    } else {
        None
    }
}

fn read_float(node: &Value) -> Option<f64> {
    match node {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float::<f64>(s).ok(),
        _ => None,
    }
}

/// Assign `node` to the referenced primitive, or describe why it cannot be.
fn assign_primitive(node: &Value, value: PrimitiveMut<'_>) -> std::result::Result<(), String> {
    let kind = value.kind();
    let mismatch = || format!("expected {}, found {}", kind, type_name(node));
    let out_of_range = || format!("value {} does not fit {}", node, kind);
    let integer = |node: &Value| -> std::result::Result<(), String> {
        if node.is_number() {
            Err(out_of_range())
        } else {
            Err(mismatch())
        }
    };

    match value {
        PrimitiveMut::Bool(v) => *v = node.as_bool().ok_or_else(mismatch)?,
        PrimitiveMut::I8(v) => match read_int(node) {
            Some(x) => *v = x,
            None => return integer(node),
        },
        PrimitiveMut::U8(v) => match read_int(node) {
            Some(x) => *v = x,
            None => return integer(node),
        },
        PrimitiveMut::I16(v) => match read_int(node) {
            Some(x) => *v = x,
            None => return integer(node),
        },
        PrimitiveMut::U16(v) => match read_int(node) {
            Some(x) => *v = x,
            None => return integer(node),
        },
        PrimitiveMut::I32(v) => match read_int(node) {
            Some(x) => *v = x,
            None => return integer(node),
        },
        PrimitiveMut::U32(v) => match read_int(node) {
            Some(x) => *v = x,
            None => return integer(node),
        },
        PrimitiveMut::I64(v) => {
            let text = node.as_str().ok_or_else(mismatch)?;
            *v = text
                .parse()
                .map_err(|_| format!("cannot parse {:?} as i64", text))?;
        }
        PrimitiveMut::U64(v) => {
            let text = node.as_str().ok_or_else(mismatch)?;
            *v = text
                .parse()
                .map_err(|_| format!("cannot parse {:?} as u64", text))?;
        }
        PrimitiveMut::F32(v) => *v = read_float(node).ok_or_else(mismatch)? as f32,
        PrimitiveMut::F64(v) => *v = read_float(node).ok_or_else(mismatch)?,
        PrimitiveMut::String(v) => *v = node.as_str().ok_or_else(mismatch)?.to_string(),
    }
    Ok(())
}

impl<'a> JsonInputArchive<'a> {
    /// Create an archive reading from `root`.
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            state: ArchiveState::new(),
        }
    }

    /// Find the next item of the innermost block: by name in Unordered
    /// blocks, by position otherwise.
    fn lookup(&mut self, name: &str) -> Result<&'a Value> {
        let path = self.state.block_path();
        let Some(frame) = self.state.current_mut() else {
            return Ok(self.root);
        };
        let node = frame.payload.node;
        if frame.block_type() == BlockType::Unordered {
            return node
                .get(name)
                .ok_or_else(|| Error::not_found(path, name, None));
        }
        let index = frame.payload.cursor;
        let item = match node {
            Value::Array(items) => items.get(index),
            _ => None,
        };
        let item = item.ok_or_else(|| Error::not_found(path, name, Some(index)))?;
        frame.payload.cursor += 1;
        Ok(item)
    }
}

impl Archive for JsonInputArchive<'_> {
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
                frame.payload.node.get(name).is_some()
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
        let node = self.lookup(name)?;
        self.state.register_input_item();

        let compatible = match block_type {
            BlockType::Unordered => is_object_compatible(node),
            _ => is_array_compatible(node),
        };
        if !compatible {
            let expected = if block_type == BlockType::Unordered { "object" } else { "array" };
            return Err(Error::unexpected(
                self.state.block_path(),
                name,
                format!(
                    "expected {} for {} block, found {}",
                    expected,
                    block_type,
                    type_name(node)
                ),
            ));
        }

        let len = node_len(node);
        *size_hint = len;
        self.state.push(BlockFrame::new(
            name,
            block_type,
            len,
            safe,
            InputNode { node, cursor: 0 },
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

    fn serialize_primitive(&mut self, name: &str, value: PrimitiveMut<'_>) -> Result<()> {
        self.state.check_before_element(name)?;
        let node = self.lookup(name)?;
        self.state.register_input_item();
        assign_primitive(node, value)
            .map_err(|message| Error::unexpected(self.state.block_path(), name, message))
    }

    fn serialize_bytes(&mut self, name: &str, bytes: &mut [u8]) -> Result<()> {
        self.state.check_before_element(name)?;
        let node = self.lookup(name)?;
        self.state.register_input_item();
        let text = node.as_str().ok_or_else(|| {
            Error::unexpected(
                self.state.block_path(),
                name,
                format!("expected hex string, found {}", type_name(node)),
            )
        })?;
        let decoded = hex::decode(text)
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
        let node = self.lookup(name)?;
        self.state.register_input_item();
        assign_primitive(node, PrimitiveMut::U32(value))
            .map_err(|message| Error::unexpected(self.state.block_path(), name, message))
    }
}
