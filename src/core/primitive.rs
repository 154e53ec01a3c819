//! Closed set of primitive element types.
//!
//! Backends see primitives through [`PrimitiveMut`], a tagged mutable
//! reference, so the object-safe [`Archive`](super::Archive) trait needs a
//! single entry point instead of one method per type.

use std::fmt;

/// Tag of a primitive type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    String,
}

impl PrimitiveKind {
    /// Returns the name of this type as a string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable reference to a primitive value.
///
/// Output archives only read through it; input archives only assign to it
/// after the value was read and converted successfully.
#[derive(Debug)]
pub enum PrimitiveMut<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    U8(&'a mut u8),
    I16(&'a mut i16),
    U16(&'a mut u16),
    I32(&'a mut i32),
    U32(&'a mut u32),
    I64(&'a mut i64),
    U64(&'a mut u64),
    F32(&'a mut f32),
    F64(&'a mut f64),
    String(&'a mut String),
}

impl PrimitiveMut<'_> {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::I8(_) => PrimitiveKind::I8,
            Self::U8(_) => PrimitiveKind::U8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::U16(_) => PrimitiveKind::U16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::U32(_) => PrimitiveKind::U32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::String(_) => PrimitiveKind::String,
        }
    }

    /// Render the value as text, the way the DOM backend stores it.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::I8(v) => v.to_string(),
            Self::U8(v) => v.to_string(),
            Self::I16(v) => v.to_string(),
            Self::U16(v) => v.to_string(),
            Self::I32(v) => v.to_string(),
            Self::U32(v) => v.to_string(),
            Self::I64(v) => v.to_string(),
            Self::U64(v) => v.to_string(),
            Self::F32(v) => format_f32(**v),
            Self::F64(v) => format_f64(**v),
            Self::String(v) => (**v).clone(),
        }
    }

    /// Parse `text` into the referenced value. On failure the value is left
    /// untouched and a description of the problem is returned.
    pub fn assign_from_text(&mut self, text: &str) -> std::result::Result<(), String> {
        fn parse<T: std::str::FromStr>(text: &str, kind: PrimitiveKind) -> std::result::Result<T, String> {
            text.trim()
                .parse::<T>()
                .map_err(|_| format!("cannot parse {:?} as {}", text, kind))
        }

        let kind = self.kind();
        match self {
            Self::Bool(v) => {
                **v = match text.trim() {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    _ => return Err(format!("cannot parse {:?} as bool", text)),
                }
            }
            Self::I8(v) => **v = parse(text, kind)?,
            Self::U8(v) => **v = parse(text, kind)?,
            Self::I16(v) => **v = parse(text, kind)?,
            Self::U16(v) => **v = parse(text, kind)?,
            Self::I32(v) => **v = parse(text, kind)?,
            Self::U32(v) => **v = parse(text, kind)?,
            Self::I64(v) => **v = parse(text, kind)?,
            Self::U64(v) => **v = parse(text, kind)?,
            Self::F32(v) => **v = parse_float::<f32>(text)?,
            Self::F64(v) => **v = parse_float::<f64>(text)?,
            Self::String(v) => **v = text.to_string(),
        }
        Ok(())
    }
}

fn format_f32(v: f32) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        non_finite_text(v as f64).to_string()
    }
}

fn format_f64(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        non_finite_text(v).to_string()
    }
}

/// Text used for non-finite floats in text backends.
pub(crate) fn non_finite_text(v: f64) -> &'static str {
    if v.is_nan() {
        "NaN"
    } else if v > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}

/// Parse a float, accepting the non-finite spellings written by text backends.
pub(crate) fn parse_float<T>(text: &str) -> std::result::Result<T, String>
where
    T: std::str::FromStr + From<f32>,
{
    match text.trim() {
        "NaN" => Ok(T::from(f32::NAN)),
        "inf" => Ok(T::from(f32::INFINITY)),
        "-inf" => Ok(T::from(f32::NEG_INFINITY)),
        other => other
            .parse::<T>()
            .map_err(|_| format!("cannot parse {:?} as a float", text)),
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Types that map 1:1 onto an archive primitive.
pub trait Primitive: sealed::Sealed {
    const KIND: PrimitiveKind;

    fn as_primitive_mut(&mut self) -> PrimitiveMut<'_>;
}

macro_rules! impl_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Primitive for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$variant;

                #[inline]
                fn as_primitive_mut(&mut self) -> PrimitiveMut<'_> {
                    PrimitiveMut::$variant(self)
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_roundtrip() {
        let mut v = 0.1f32;
        let text = PrimitiveMut::F32(&mut v).to_text();
        let mut back = 0.0f32;
        PrimitiveMut::F32(&mut back).assign_from_text(&text).unwrap();
        assert_eq!(back, 0.1f32);

        let mut big = u64::MAX;
        let text = big.as_primitive_mut().to_text();
        assert_eq!(text, "18446744073709551615");
    }

    #[test]
    fn test_failed_parse_keeps_value() {
        let mut v = 7i8;
        let err = v.as_primitive_mut().assign_from_text("300").unwrap_err();
        assert!(err.contains("i8"));
        assert_eq!(v, 7);
    }

    #[test]
    fn test_non_finite_text() {
        let mut v = f64::NEG_INFINITY;
        assert_eq!(v.as_primitive_mut().to_text(), "-inf");
        let mut back = 0.0f64;
        back.as_primitive_mut().assign_from_text("NaN").unwrap();
        assert!(back.is_nan());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(<u16 as Primitive>::KIND, PrimitiveKind::U16);
        let mut s = String::from("x");
        assert_eq!(s.as_primitive_mut().kind(), PrimitiveKind::String);
    }
}
