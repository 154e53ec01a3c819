//! Sequences: vectors, fixed-size arrays and POD blobs.

use bytemuck::Pod;

use super::Serializable;
use crate::core::{open_array_block, open_sequential_block, Archive};
use crate::util::{Error, Result};

/// Element name used for sequence items when none is given.
pub const DEFAULT_ELEMENT_NAME: &str = "element";

/// Upper bound on up-front allocation while reading a sequence.
const MAX_PREALLOC: usize = 4096;

impl<T: Serializable + Default> Serializable for Vec<T> {
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        T::serialize_vec(self, ar, name, DEFAULT_ELEMENT_NAME)
    }
}

/// Serialize a vector with a custom element name.
///
/// Numeric element types are written as one byte blob in binary archives.
pub fn serialize_vector<T: Serializable + Default>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    vec: &mut Vec<T>,
) -> Result<()> {
    T::serialize_vec(vec, ar, name, element_name)
}

/// Serialize a vector of plain-old-data values.
///
/// Human-readable archives get one element per item. Other archives get the
/// raw memory of the vector in host layout, prefixed by its byte length.
pub fn serialize_pod_vector<T: Serializable + Pod + Default>(
    ar: &mut dyn Archive,
    name: &str,
    vec: &mut Vec<T>,
) -> Result<()> {
    if ar.is_human_readable() {
        serialize_elements(ar, name, DEFAULT_ELEMENT_NAME, vec)
    } else {
        serialize_pod_blob(ar, name, vec)
    }
}

/// One element per item inside an Array block.
///
/// On input the vector is replaced only once every item has been read.
pub(crate) fn serialize_elements<T: Serializable + Default>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    vec: &mut Vec<T>,
) -> Result<()> {
    if ar.is_input() {
        let mut block = open_array_block(ar, name, 0)?;
        let len = block.size_hint();
        let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let mut item = T::default();
            item.serialize(&mut *block, element_name)?;
            items.push(item);
        }
        *vec = items;
    } else {
        let mut block = open_array_block(ar, name, vec.len())?;
        for item in vec.iter_mut() {
            item.serialize(&mut *block, element_name)?;
        }
    }
    Ok(())
}

/// VLE byte length followed by the raw bytes of the vector.
pub(crate) fn serialize_pod_blob<T: Pod>(
    ar: &mut dyn Archive,
    name: &str,
    vec: &mut Vec<T>,
) -> Result<()> {
    let item_size = std::mem::size_of::<T>();
    let mut block = open_sequential_block(ar, name)?;

    if block.is_input() {
        let mut byte_len = 0u32;
        block.serialize_blob_len("size", &mut byte_len)?;
        let byte_len = byte_len as usize;
        if item_size == 0 || byte_len % item_size != 0 {
            return Err(Error::unexpected(
                block.block_path(),
                "size",
                format!("{} bytes is not a whole number of {}-byte items", byte_len, item_size),
            ));
        }
        let mut items = vec![T::zeroed(); byte_len / item_size];
        block.serialize_bytes("data", bytemuck::cast_slice_mut(&mut items))?;
        *vec = items;
    } else {
        let byte_len = vec.len() * item_size;
        let mut size = u32::try_from(byte_len).map_err(|_| {
            Error::unexpected(block.block_path(), "size", format!("{} bytes is too large for a blob", byte_len))
        })?;
        block.serialize_blob_len("size", &mut size)?;
        block.serialize_bytes("data", bytemuck::cast_slice_mut(vec.as_mut_slice()))?;
    }
    Ok(())
}

impl<T: Serializable, const N: usize> Serializable for [T; N] {
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        serialize_fixed_array(ar, name, DEFAULT_ELEMENT_NAME, self)
    }
}

/// Serialize a fixed-size array as an Array block of `N` items.
///
/// On input the stored count must equal `N`. Items are read in place.
pub fn serialize_fixed_array<T: Serializable, const N: usize>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    array: &mut [T; N],
) -> Result<()> {
    let mut block = open_array_block(ar, name, N)?;
    if block.is_input() && block.size_hint() != N {
        return Err(Error::unexpected(
            block.block_path(),
            name,
            format!("expected {} items, found {}", N, block.size_hint()),
        ));
    }
    for item in array.iter_mut() {
        item.serialize(&mut *block, element_name)?;
    }
    Ok(())
}
