//! Optional values and default elision.

use tracing::trace;

use super::Serializable;
use crate::core::{open_unordered_block, Archive};
use crate::util::Result;

/// `Option<T>` elides `None` where the current block supports lookup by name,
/// and falls back to [`serialize_optional_strict`] everywhere else.
impl<T: Serializable + Default> Serializable for Option<T> {
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        if !ar.is_unordered_access_supported_in_current_block() {
            return serialize_optional_strict(ar, name, self);
        }
        if ar.is_input() {
            *self = if ar.has_element_or_block(name) {
                let mut value = T::default();
                value.serialize(ar, name)?;
                Some(value)
            } else {
                None
            };
            Ok(())
        } else {
            match self {
                Some(value) => value.serialize(ar, name),
                None => Ok(()),
            }
        }
    }
}

/// Serialize `value`, omitting it when it equals `default`.
///
/// On input a missing element yields `default`. Elision applies only where
/// the current block supports lookup by name; elsewhere the value is always
/// serialized.
pub fn serialize_optional_value<T: Serializable + PartialEq + Clone>(
    ar: &mut dyn Archive,
    name: &str,
    value: &mut T,
    default: &T,
) -> Result<()> {
    if !ar.is_unordered_access_supported_in_current_block() {
        return value.serialize(ar, name);
    }
    if ar.is_input() {
        if ar.has_element_or_block(name) {
            value.serialize(ar, name)
        } else {
            *value = default.clone();
            Ok(())
        }
    } else if value != default {
        value.serialize(ar, name)
    } else {
        trace!(element = name, "elided default value");
        Ok(())
    }
}

/// Serialize an `Option` as an Unordered block holding an `initialized` flag
/// and, when set, a `value` element. Works in every block type.
pub fn serialize_optional_strict<T: Serializable + Default>(
    ar: &mut dyn Archive,
    name: &str,
    value: &mut Option<T>,
) -> Result<()> {
    let mut block = open_unordered_block(ar, name)?;
    let mut initialized = value.is_some();
    initialized.serialize(&mut *block, "initialized")?;

    if block.is_input() {
        *value = if initialized {
            let mut inner = T::default();
            inner.serialize(&mut *block, "value")?;
            Some(inner)
        } else {
            None
        };
    } else if let Some(inner) = value {
        inner.serialize(&mut *block, "value")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{from_bytes, to_bytes};
    use crate::json::{from_value, to_value};
    use serde_json::json;

    #[derive(Default, Debug, PartialEq)]
    struct Settings {
        scale: i32,
        label: Option<String>,
    }

    impl Serializable for Settings {
        fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
            let mut block = open_unordered_block(ar, name)?;
            serialize_optional_value(&mut *block, "scale", &mut self.scale, &0)?;
            self.label.serialize(&mut *block, "label")
        }
    }

    #[test]
    fn test_defaults_are_elided_in_json() {
        let mut settings = Settings::default();
        let value = to_value("settings", &mut settings).expect("write");
        assert_eq!(value, json!({}));

        let mut back = Settings { scale: 7, label: Some("x".into()) };
        from_value(&value, "settings", &mut back).expect("read");
        assert_eq!(back, Settings::default());
    }

    #[test]
    fn test_non_default_is_written() {
        let mut settings = Settings { scale: 5, label: Some("main".into()) };
        let value = to_value("settings", &mut settings).expect("write");
        assert_eq!(value, json!({"scale": 5, "label": "main"}));
    }

    #[test]
    fn test_binary_never_elides() {
        let mut settings = Settings::default();
        let bytes = to_bytes("settings", &mut settings).expect("write");
        // i32 scale + strict option block holding `initialized`
        assert_eq!(bytes, vec![0, 0, 0, 0, 0]);

        let mut back = Settings { scale: 3, label: Some("y".into()) };
        from_bytes(&bytes, "settings", &mut back).expect("read");
        assert_eq!(back, Settings::default());
    }

    #[test]
    fn test_strict_option_roundtrip() {
        let mut some = Some(42u64);
        let bytes = to_bytes("answer", &mut some).expect("write");
        let mut back: Option<u64> = None;
        from_bytes(&bytes, "answer", &mut back).expect("read");
        assert_eq!(back, Some(42));
    }
}
