//! Associative containers and pairs.
//!
//! A map is a Map block of Unordered entries holding `key` and `value`. A set
//! is an Array block of Unordered entries holding `key`. Both are cleared
//! before being rebuilt on input, and a repeated key fails the read with
//! `DuplicateElement`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

use super::sequence::DEFAULT_ELEMENT_NAME;
use super::Serializable;
use crate::core::{open_array_block, open_map_block, open_unordered_block, Archive};
use crate::util::{Error, Result};

const KEY: &str = "key";
const VALUE: &str = "value";

/// Write map entries. Keys are cloned since they cannot be borrowed mutably.
fn write_map<'m, K, V>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    len: usize,
    entries: impl Iterator<Item = (&'m K, &'m mut V)>,
) -> Result<()>
where
    K: Serializable + Clone + 'm,
    V: Serializable + 'm,
{
    let mut block = open_map_block(ar, name, len)?;
    for (key, value) in entries {
        let mut entry = open_unordered_block(&mut *block, element_name)?;
        key.clone().serialize(&mut *entry, KEY)?;
        value.serialize(&mut *entry, VALUE)?;
    }
    Ok(())
}

/// Read map entries, handing each to `insert`, which returns `false` for a
/// key that is already present.
fn read_map<K, V>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    mut insert: impl FnMut(K, V) -> bool,
) -> Result<()>
where
    K: Serializable + Default,
    V: Serializable + Default,
{
    let mut block = open_map_block(ar, name, 0)?;
    for _ in 0..block.size_hint() {
        let mut entry = open_unordered_block(&mut *block, element_name)?;
        let mut key = K::default();
        key.serialize(&mut *entry, KEY)?;
        let mut value = V::default();
        value.serialize(&mut *entry, VALUE)?;
        if !insert(key, value) {
            return Err(Error::duplicate(entry.block_path(), KEY));
        }
    }
    Ok(())
}

fn write_set<'s, K>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    len: usize,
    keys: impl Iterator<Item = &'s K>,
) -> Result<()>
where
    K: Serializable + Clone + 's,
{
    let mut block = open_array_block(ar, name, len)?;
    for key in keys {
        let mut entry = open_unordered_block(&mut *block, element_name)?;
        key.clone().serialize(&mut *entry, KEY)?;
    }
    Ok(())
}

fn read_set<K>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    mut insert: impl FnMut(K) -> bool,
) -> Result<()>
where
    K: Serializable + Default,
{
    let mut block = open_array_block(ar, name, 0)?;
    for _ in 0..block.size_hint() {
        let mut entry = open_unordered_block(&mut *block, element_name)?;
        let mut key = K::default();
        key.serialize(&mut *entry, KEY)?;
        if !insert(key) {
            return Err(Error::duplicate(entry.block_path(), KEY));
        }
    }
    Ok(())
}

/// Maps and sets that can be cleared and rebuilt entry by entry.
pub trait KeyedContainer {
    fn serialize_entries(&mut self, ar: &mut dyn Archive, name: &str, element_name: &str) -> Result<()>;
}

impl<K, V, S> KeyedContainer for HashMap<K, V, S>
where
    K: Serializable + Default + Clone + Eq + Hash,
    V: Serializable + Default,
    S: BuildHasher,
{
    fn serialize_entries(&mut self, ar: &mut dyn Archive, name: &str, element_name: &str) -> Result<()> {
        if ar.is_input() {
            self.clear();
            read_map(ar, name, element_name, |k, v| self.insert(k, v).is_none())
        } else {
            let len = self.len();
            write_map(ar, name, element_name, len, self.iter_mut())
        }
    }
}

impl<K, V> KeyedContainer for BTreeMap<K, V>
where
    K: Serializable + Default + Clone + Ord,
    V: Serializable + Default,
{
    fn serialize_entries(&mut self, ar: &mut dyn Archive, name: &str, element_name: &str) -> Result<()> {
        if ar.is_input() {
            self.clear();
            read_map(ar, name, element_name, |k, v| self.insert(k, v).is_none())
        } else {
            let len = self.len();
            write_map(ar, name, element_name, len, self.iter_mut())
        }
    }
}

impl<K, S> KeyedContainer for HashSet<K, S>
where
    K: Serializable + Default + Clone + Eq + Hash,
    S: BuildHasher,
{
    fn serialize_entries(&mut self, ar: &mut dyn Archive, name: &str, element_name: &str) -> Result<()> {
        if ar.is_input() {
            self.clear();
            read_set(ar, name, element_name, |k| self.insert(k))
        } else {
            write_set(ar, name, element_name, self.len(), self.iter())
        }
    }
}

impl<K> KeyedContainer for BTreeSet<K>
where
    K: Serializable + Default + Clone + Ord,
{
    fn serialize_entries(&mut self, ar: &mut dyn Archive, name: &str, element_name: &str) -> Result<()> {
        if ar.is_input() {
            self.clear();
            read_set(ar, name, element_name, |k| self.insert(k))
        } else {
            write_set(ar, name, element_name, self.len(), self.iter())
        }
    }
}

macro_rules! impl_serializable_keyed {
    ($([$($generics:tt)*] $ty:ty),* $(,)?) => {
        $(
            impl<$($generics)*> Serializable for $ty
            where
                $ty: KeyedContainer,
            {
                fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
                    self.serialize_entries(ar, name, DEFAULT_ELEMENT_NAME)
                }
            }
        )*
    };
}

impl_serializable_keyed!(
    [K, V, S] HashMap<K, V, S>,
    [K, V] BTreeMap<K, V>,
    [K, S] HashSet<K, S>,
    [K] BTreeSet<K>,
);

/// Serialize a map with a custom entry name.
pub fn serialize_map<M: KeyedContainer>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    map: &mut M,
) -> Result<()> {
    map.serialize_entries(ar, name, element_name)
}

/// Serialize a set with a custom entry name.
pub fn serialize_set<S: KeyedContainer>(
    ar: &mut dyn Archive,
    name: &str,
    element_name: &str,
    set: &mut S,
) -> Result<()> {
    set.serialize_entries(ar, name, element_name)
}

/// Pairs are Unordered blocks holding `first` and `second`.
impl<A: Serializable, B: Serializable> Serializable for (A, B) {
    fn serialize(&mut self, ar: &mut dyn Archive, name: &str) -> Result<()> {
        let mut block = open_unordered_block(ar, name)?;
        self.0.serialize(&mut *block, "first")?;
        self.1.serialize(&mut *block, "second")
    }
}
