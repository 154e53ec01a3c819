//! Parallel vectors serialized as one sequence of records.
//!
//! `serialize_tied(ar, "points", "point", &["x", "y"], (&mut xs, &mut ys))`
//! writes an Array block of Unordered `point` blocks, each holding one `x`
//! and one `y`.

use super::Serializable;
use crate::core::{open_array_block, open_unordered_block, Archive};
use crate::util::{Error, Result};

/// A tuple of mutable vectors that share one length.
pub trait TiedVectors {
    /// Number of vectors in the tuple.
    const ARITY: usize;

    /// The shared length, or `None` if the vectors differ in length.
    fn common_len(&self) -> Option<usize>;

    /// Resize every vector to `len`, filling with defaults.
    fn resize(&mut self, len: usize);

    /// Serialize item `index` of every vector under the matching name.
    fn serialize_at(&mut self, ar: &mut dyn Archive, index: usize, names: &[&str]) -> Result<()>;
}

macro_rules! impl_tied_vectors {
    ($arity:expr; $($ty:ident : $idx:tt),+) => {
        impl<'v, $($ty: Serializable + Default),+> TiedVectors for ($(&'v mut Vec<$ty>,)+) {
            const ARITY: usize = $arity;

            fn common_len(&self) -> Option<usize> {
                let lens = [$(self.$idx.len()),+];
                let first = lens[0];
                lens.iter().all(|&len| len == first).then_some(first)
            }

            fn resize(&mut self, len: usize) {
                $(self.$idx.resize_with(len, $ty::default);)+
            }

            fn serialize_at(&mut self, ar: &mut dyn Archive, index: usize, names: &[&str]) -> Result<()> {
                $(self.$idx[index].serialize(ar, names[$idx])?;)+
                Ok(())
            }
        }
    };
}

impl_tied_vectors!(1; A: 0);
impl_tied_vectors!(2; A: 0, B: 1);
impl_tied_vectors!(3; A: 0, B: 1, C: 2);
impl_tied_vectors!(4; A: 0, B: 1, C: 2, D: 3);

/// Serialize parallel vectors as one Array block of records.
///
/// On output the vectors must share one length. On input every vector is
/// resized to the stored count before the records are read.
///
/// # Panics
///
/// Panics if `names` does not hold one name per vector.
pub fn serialize_tied<T: TiedVectors>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    names: &[&str],
    mut vectors: T,
) -> Result<()> {
    assert_eq!(
        names.len(),
        T::ARITY,
        "tied serialization of '{}' needs one name per vector",
        name
    );

    let len = if ar.is_input() {
        0
    } else {
        vectors.common_len().ok_or_else(|| {
            Error::unexpected(ar.block_path(), name, "tied vectors differ in length")
        })?
    };

    let mut block = open_array_block(ar, name, len)?;
    let len = block.size_hint();
    if block.is_input() {
        vectors.resize(len);
    }
    for index in 0..len {
        let mut record = open_unordered_block(&mut *block, element_name)?;
        vectors.serialize_at(&mut *record, index, names)?;
    }
    Ok(())
}
