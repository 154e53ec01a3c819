//! Compact text encodings and versioned blocks.

use super::Serializable;
use crate::core::{open_inline_block, open_safe_unordered_block, serialize_primitive, Archive};
use crate::util::{Error, Result};

/// Serialize `value` as one string element in human-readable archives, and
/// through its own [`Serializable`] impl everywhere else.
///
/// The string is produced by `to_text` and parsed back by `from_text`, which
/// returns `None` for malformed input. The element lives in an inline scope
/// so it sits directly in the enclosing block.
pub fn serialize_packed<T, F, G>(
    ar: &mut dyn Archive,
    name: &str,
    value: &mut T,
    to_text: F,
    from_text: G,
) -> Result<()>
where
    T: Serializable,
    F: FnOnce(&T) -> String,
    G: FnOnce(&str) -> Option<T>,
{
    if !ar.is_human_readable() {
        return value.serialize(ar, name);
    }

    let mut scope = open_inline_block(ar)?;
    if scope.is_input() {
        let mut text = String::new();
        serialize_primitive(&mut *scope, name, &mut text)?;
        *value = from_text(&text).ok_or_else(|| {
            Error::unexpected(scope.block_path(), name, format!("cannot parse {:?}", text))
        })?;
    } else {
        let mut text = to_text(&*value);
        serialize_primitive(&mut *scope, name, &mut text)?;
    }
    Ok(())
}

/// Serialize a versioned safe Unordered block.
///
/// Writes `version` as the block's first element and hands the version to
/// `body`. On input `body` receives the version found in the source, so it
/// can skip fields that older data lacks. Returns that version.
pub fn serialize_versioned<F>(ar: &mut dyn Archive, name: &str, version: u32, body: F) -> Result<u32>
where
    F: FnOnce(&mut dyn Archive, u32) -> Result<()>,
{
    let mut block = open_safe_unordered_block(ar, name)?;
    let version = block.serialize_version(version)?;
    body(&mut *block, version)?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{from_bytes, to_bytes};
    use crate::core::open_unordered_block;
    use crate::json::{from_value, to_value};
    use crate::util::ErrorKind;
    use serde_json::json;

    #[derive(Default, Debug, PartialEq, Clone, Copy)]
    struct Rect {
        min: [i32; 2],
        max: [i32; 2],
    }

    impl Serializable for Rect {
        fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
            let mut block = open_unordered_block(ar, name)?;
            self.min.serialize(&mut *block, "min")?;
            self.max.serialize(&mut *block, "max")
        }
    }

    fn rect_to_text(r: &Rect) -> String {
        format!("{} {} {} {}", r.min[0], r.min[1], r.max[0], r.max[1])
    }

    fn rect_from_text(text: &str) -> Option<Rect> {
        let v: Vec<i32> = text.split_whitespace().map(|s| s.parse().ok()).collect::<Option<_>>()?;
        match v.as_slice() {
            [a, b, c, d] => Some(Rect { min: [*a, *b], max: [*c, *d] }),
            _ => None,
        }
    }

    struct Layout {
        bounds: Rect,
    }

    impl Serializable for Layout {
        fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
            let mut block = open_unordered_block(ar, name)?;
            serialize_packed(&mut *block, "bounds", &mut self.bounds, rect_to_text, rect_from_text)
        }
    }

    #[test]
    fn test_packed_is_single_string_in_json() {
        let mut layout = Layout { bounds: Rect { min: [0, 1], max: [10, 20] } };
        let value = to_value("layout", &mut layout).expect("write");
        assert_eq!(value, json!({"bounds": "0 1 10 20"}));

        let mut back = Layout { bounds: Rect::default() };
        from_value(&value, "layout", &mut back).expect("read");
        assert_eq!(back.bounds, layout.bounds);
    }

    #[test]
    fn test_packed_malformed_text() {
        let mut back = Layout { bounds: Rect::default() };
        let err = from_value(&json!({"bounds": "1 2"}), "layout", &mut back).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);
    }

    #[test]
    fn test_packed_binary_uses_block() {
        let mut layout = Layout { bounds: Rect { min: [1, 2], max: [3, 4] } };
        let bytes = to_bytes("layout", &mut layout).expect("write");
        // two Array blocks of two i32 each
        assert_eq!(bytes.len(), 2 * (1 + 8));
        let mut back = Layout { bounds: Rect::default() };
        from_bytes(&bytes, "layout", &mut back).expect("read");
        assert_eq!(back.bounds, layout.bounds);
    }

    struct Document {
        title: String,
        pages: u32,
    }

    impl Serializable for Document {
        fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
            serialize_versioned(ar, name, 2, |ar, version| {
                self.title.serialize(ar, "title")?;
                if version >= 2 {
                    self.pages.serialize(ar, "pages")?;
                }
                Ok(())
            })
            .map(|_| ())
        }
    }

    #[test]
    fn test_versioned_roundtrip() {
        let mut doc = Document { title: "notes".into(), pages: 3 };
        let bytes = to_bytes("doc", &mut doc).expect("write");
        let mut back = Document { title: String::new(), pages: 0 };
        from_bytes(&bytes, "doc", &mut back).expect("read");
        assert_eq!(back.title, "notes");
        assert_eq!(back.pages, 3);
    }

    #[test]
    fn test_versioned_json_shape() {
        let mut doc = Document { title: "notes".into(), pages: 3 };
        let value = to_value("doc", &mut doc).expect("write");
        assert_eq!(value, json!({"version": 2, "title": "notes", "pages": 3}));
    }
}
