//! Enumerations.
//!
//! Binary archives store the underlying integer. Human-readable archives
//! store the name from a table indexed by that integer, and accept either a
//! known name or a plain integer on input.

use crate::core::{serialize_primitive, Archive, Primitive};
use crate::util::{Error, Result};

/// An enum with a fixed integer representation and a table of names.
pub trait ArchiveEnum: Copy {
    /// Underlying integer type written to binary archives.
    type Repr: Primitive + Copy + Default + Into<i64> + TryFrom<i64>;

    fn to_repr(self) -> Self::Repr;

    /// `None` if `repr` names no variant.
    fn from_repr(repr: Self::Repr) -> Option<Self>;

    /// Variant names indexed by their integer value.
    fn names() -> &'static [&'static str];
}

/// Serialize an enum using its own name table.
pub fn serialize_enum<E: ArchiveEnum>(ar: &mut dyn Archive, name: &str, value: &mut E) -> Result<()> {
    serialize_enum_with_names(ar, name, value, E::names())
}

/// Serialize an enum using a caller-supplied name table.
pub fn serialize_enum_with_names<E: ArchiveEnum>(
    ar: &mut dyn Archive,
    name: &str,
    value: &mut E,
    names: &[&str],
) -> Result<()> {
    if !ar.is_human_readable() {
        let mut repr = value.to_repr();
        serialize_primitive(ar, name, &mut repr)?;
        if ar.is_input() {
            *value = from_index(ar, name, repr.into())?;
        }
        return Ok(());
    }

    if ar.is_input() {
        let mut text = String::new();
        serialize_primitive(ar, name, &mut text)?;
        let index = match names.iter().position(|known| *known == text) {
            Some(index) => index as i64,
            None => text.trim().parse::<i64>().map_err(|_| {
                Error::unexpected(ar.block_path(), name, format!("unknown enum value {:?}", text))
            })?,
        };
        *value = from_index(ar, name, index)?;
        Ok(())
    } else {
        let index: i64 = value.to_repr().into();
        let mut text = usize::try_from(index)
            .ok()
            .and_then(|i| names.get(i))
            .map(|known| known.to_string())
            .unwrap_or_else(|| index.to_string());
        serialize_primitive(ar, name, &mut text)
    }
}

fn from_index<E: ArchiveEnum>(ar: &dyn Archive, name: &str, index: i64) -> Result<E> {
    E::Repr::try_from(index)
        .ok()
        .and_then(E::from_repr)
        .ok_or_else(|| Error::unexpected(ar.block_path(), name, format!("{} is not a valid enum value", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::open_unordered_block;
    use crate::json::{from_value, to_value};
    use crate::serialize::Serializable;
    use crate::util::ErrorKind;
    use serde_json::json;

    #[derive(Clone, Copy, Debug, PartialEq, Default)]
    enum Filter {
        #[default]
        Nearest,
        Linear,
        Cubic,
    }

    impl ArchiveEnum for Filter {
        type Repr = u8;

        fn to_repr(self) -> u8 {
            self as u8
        }

        fn from_repr(repr: u8) -> Option<Self> {
            match repr {
                0 => Some(Filter::Nearest),
                1 => Some(Filter::Linear),
                2 => Some(Filter::Cubic),
                _ => None,
            }
        }

        fn names() -> &'static [&'static str] {
            &["Nearest", "Linear", "Cubic"]
        }
    }

    impl Serializable for Filter {
        fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
            let mut block = open_unordered_block(ar, name)?;
            serialize_enum(&mut *block, "filter", self)
        }
    }

    #[test]
    fn test_enum_written_by_name() {
        let mut filter = Filter::Linear;
        let value = to_value("sampler", &mut filter).expect("write");
        assert_eq!(value, json!({"filter": "Linear"}));
    }

    #[test]
    fn test_enum_read_from_integer_text() {
        let mut filter = Filter::Nearest;
        from_value(&json!({"filter": "2"}), "sampler", &mut filter).expect("read");
        assert_eq!(filter, Filter::Cubic);
    }

    #[test]
    fn test_unknown_enum_name() {
        let mut filter = Filter::Linear;
        let err = from_value(&json!({"filter": "Bilinear"}), "sampler", &mut filter).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedElementValue);
        assert_eq!(filter, Filter::Linear);
    }

    #[test]
    fn test_enum_binary_uses_repr() {
        let mut filter = Filter::Cubic;
        let bytes = crate::binary::to_bytes("sampler", &mut filter).expect("write");
        assert_eq!(bytes, vec![2]);
        let mut back = Filter::Nearest;
        crate::binary::from_bytes(&bytes, "sampler", &mut back).expect("read");
        assert_eq!(back, Filter::Cubic);
    }
}
