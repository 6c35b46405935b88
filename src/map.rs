//! Ordered map type for BTOON maps.
//!
//! This module provides [`BtoonMap`], a wrapper around [`IndexMap`] whose keys
//! are held in ascending byte-lexicographic order at all times. The wire
//! format requires map keys to be emitted and iterated in that order, so the
//! map enforces it structurally: [`BtoonMap::insert`] places each key at its
//! sorted position.
//!
//! ## Why IndexMap?
//!
//! `IndexMap` gives hashed lookup together with explicit control over entry
//! order, which lets the map keep its sorted invariant without a re-sort on
//! every mutation and without paying `BTreeMap`'s pointer chasing on the
//! decode hot path.
//!
//! ## Examples
//!
//! ```rust
//! use btoon::{BtoonMap, Value};
//!
//! let mut map = BtoonMap::new();
//! map.insert("b".to_string(), Value::from(2u64));
//! map.insert("a".to_string(), Value::from(1u64));
//!
//! // Keys iterate in byte-lexicographic order regardless of insertion order.
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["a", "b"]);
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to BTOON values.
///
/// Keys are kept in ascending byte-lexicographic order, which is the order
/// the encoder emits them in and the order a strict decoder requires.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BtoonMap(IndexMap<String, Value>);

impl BtoonMap {
    /// Creates an empty `BtoonMap`.
    #[must_use]
    pub fn new() -> Self {
        BtoonMap(IndexMap::new())
    }

    /// Creates an empty `BtoonMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        BtoonMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair at its sorted position.
    ///
    /// If the map already contained this key, the value is replaced and the
    /// old value returned (last-wins, matching non-strict decode semantics).
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert_sorted(key, value).1
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key from the map, preserving the order of remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in ascending byte-lexicographic order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values, in key order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over key-value pairs, in key order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for BtoonMap {
    fn from(map: HashMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BtoonMap> for HashMap<String, Value> {
    fn from(map: BtoonMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for BtoonMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BtoonMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for BtoonMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = BtoonMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Extend<(String, Value)> for BtoonMap {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
