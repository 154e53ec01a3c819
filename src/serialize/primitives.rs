//! [`Serializable`] for primitives and thin wrappers.

use super::sequence::serialize_pod_blob;
use super::Serializable;
use crate::core::{Archive, Primitive};
use crate::util::Result;

/// Numeric primitives: element-wise in text archives, one blob otherwise.
macro_rules! impl_serializable_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serializable for $ty {
                #[inline]
                fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
                    ar.serialize_primitive(name, self.as_primitive_mut())
                }

                fn serialize_vec(
                    vec: &mut Vec<Self>,
                    ar: &mut dyn Archive,
                    name: &str,
                    element_name: &str,
                ) -> Result<()> {
                    if ar.is_human_readable() {
                        super::sequence::serialize_elements(ar, name, element_name, vec)
                    } else {
                        serialize_pod_blob(ar, name, vec)
                    }
                }
            }
        )*
    };
}

impl_serializable_numeric!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl Serializable for bool {
    #[inline]
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        ar.serialize_primitive(name, self.as_primitive_mut())
    }
}

impl Serializable for String {
    #[inline]
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        ar.serialize_primitive(name, self.as_primitive_mut())
    }
}

impl<T: Serializable + ?Sized> Serializable for Box<T> {
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        (**self).serialize(ar, name)
    }
}
