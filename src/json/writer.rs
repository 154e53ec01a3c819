//! Tree-text output archive.

use serde_json::{Map, Number, Value};

use crate::core::{non_finite_text, Archive, ArchiveState, BlockFrame, BlockType, PrimitiveMut};
use crate::util::Result;

/// Per-block state of the tree writer: the node under construction.
#[derive(Debug)]
pub struct OutputNode {
    node: Value,
}

/// Archive that builds a [`serde_json::Value`] tree.
///
/// Unordered blocks become objects, every other block type becomes an array.
/// The finished root block replaces the caller's root value when it closes.
#[derive(Debug)]
pub struct JsonOutputArchive<'a> {
    root: &'a mut Value,
    state: ArchiveState<OutputNode>,
}

impl<'a> JsonOutputArchive<'a> {
    /// Create an archive that writes into `root`.
    pub fn new(root: &'a mut Value) -> Self {
        Self {
            root,
            state: ArchiveState::new(),
        }
    }

    /// Attach a finished node to the innermost block, or to the root.
    fn place(&mut self, name: &str, node: Value) {
        let Some(parent) = self.state.current_mut() else {
            *self.root = node;
            return;
        };
        match &mut parent.payload.node {
            Value::Object(map) => {
                map.insert(name.to_string(), node);
            }
            Value::Array(items) => items.push(node),
            _ => unreachable!("block nodes are objects or arrays"),
        }
    }
}

fn float_value(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None => Value::String(non_finite_text(v).to_string()),
    }
}

fn primitive_to_value(value: &PrimitiveMut<'_>) -> Value {
    match value {
        PrimitiveMut::Bool(v) => Value::Bool(**v),
        PrimitiveMut::I8(v) => Value::from(**v),
        PrimitiveMut::U8(v) => Value::from(**v),
        PrimitiveMut::I16(v) => Value::from(**v),
        PrimitiveMut::U16(v) => Value::from(**v),
        PrimitiveMut::I32(v) => Value::from(**v),
        PrimitiveMut::U32(v) => Value::from(**v),
        // Kept as strings: JSON numbers only guarantee 53 bits of precision.
        PrimitiveMut::I64(v) => Value::String(v.to_string()),
        PrimitiveMut::U64(v) => Value::String(v.to_string()),
        // Go through the shortest decimal form so 0.1f32 stays 0.1.
        PrimitiveMut::F32(v) => float_value(v.to_string().parse::<f64>().unwrap_or(**v as f64)),
        PrimitiveMut::F64(v) => float_value(**v),
        PrimitiveMut::String(v) => Value::String((**v).clone()),
    }
}

impl Archive for JsonOutputArchive<'_> {
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

        let node = match block_type {
            BlockType::Unordered => Value::Object(Map::new()),
            _ => Value::Array(Vec::with_capacity((*size_hint).min(1024))),
        };
        self.state
            .push(BlockFrame::new(name, block_type, *size_hint, safe, OutputNode { node }));
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
        let name = frame.name().to_string();
        self.place(&name, frame.payload.node);
        self.state.finish_block(result);
    }

    fn flush(&mut self) -> Result<()> {
        self.state.take_delayed_error()
    }

    fn serialize_primitive(&mut self, name: &str, value: PrimitiveMut<'_>) -> Result<()> {
        self.state.check_before_output_item(name)?;
        let node = primitive_to_value(&value);
        self.place(name, node);
        Ok(())
    }

    fn serialize_bytes(&mut self, name: &str, bytes: &mut [u8]) -> Result<()> {
        self.state.check_before_output_item(name)?;
        self.place(name, Value::String(hex::encode_upper(bytes)));
        Ok(())
    }

    fn serialize_vle(&mut self, name: &str, value: &mut u32) -> Result<()> {
        self.state.check_before_output_item(name)?;
        self.place(name, Value::from(*value));
        Ok(())
    }
}

/// Short description of a node's type for error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
