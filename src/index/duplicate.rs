// Copyright 2026 Deepindex Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Duplicate-key wrapper tree
//!
//! [`DuplicateTree`] layers multi-valued semantics over [`OrderedTree`] by
//! storing a bucket of values per key. Enumeration flattens buckets in key
//! order, preserving insertion order within a key. `len` counts every
//! value; the distinct-key count is tracked separately by the inner tree.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use smallvec::{smallvec, SmallVec};

use crate::index::avl::{OrderedTree, RangeIter};

/// Per-key value bucket; most keys carry one or two values
pub type Bucket<V> = SmallVec<[V; 2]>;

/// An ordered map permitting multiple values per key
pub struct DuplicateTree<K, V> {
    tree: OrderedTree<K, Bucket<V>>,
    len: usize,
}

impl<K: Ord, V> Default for DuplicateTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> DuplicateTree<K, V> {
    /// Create an empty tree using the key type's natural order
    pub fn new() -> Self {
        Self {
            tree: OrderedTree::new(),
            len: 0,
        }
    }

    /// Create an empty tree ordered by a custom comparer
    pub fn with_comparer(comparer: Arc<dyn Fn(&K, &K) -> Ordering>) -> Self {
        Self {
            tree: OrderedTree::with_comparer(comparer),
            len: 0,
        }
    }

    /// Total number of values across all keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no values
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Append a value under a key, creating the bucket on first use
    pub fn insert(&mut self, key: K, value: V) {
        match self.tree.locate(&key) {
            Ok(id) => self.tree.value_at_mut(id).push(value),
            Err(loc) => {
                self.tree.insert_at(loc, key, smallvec![value]);
            }
        }
        self.len += 1;
    }

    /// Insert if the key is absent, else overwrite the bucket's first slot
    ///
    /// Mirrors unique-tree semantics for callers opting into last-write-wins
    /// on a duplicate-capable tree: the bucket holds at most one logical
    /// current value at index 0, while `len` still counts true insertions.
    pub fn insert_or_update(&mut self, key: K, value: V) -> bool {
        match self.tree.locate(&key) {
            Ok(id) => {
                let bucket = self.tree.value_at_mut(id);
                if bucket.is_empty() {
                    bucket.push(value);
                    self.len += 1;
                    true
                } else {
                    bucket[0] = value;
                    false
                }
            }
            Err(loc) => {
                self.tree.insert_at(loc, key, smallvec![value]);
                self.len += 1;
                true
            }
        }
    }

    /// Mutable reference to the first value under a key
    pub fn first_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.tree.locate(key).ok()?;
        self.tree.value_at_mut(id).first_mut()
    }

    /// First value under a key, inserting one if the key is absent
    ///
    /// Used by composite mid layers, where a bucket carries exactly one
    /// sub-layer per key.
    pub fn first_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        match self.tree.locate(&key) {
            Ok(id) => {
                let bucket = self.tree.value_at_mut(id);
                if bucket.is_empty() {
                    bucket.push(make());
                    self.len += 1;
                }
                &mut bucket[0]
            }
            Err(loc) => {
                let id = self.tree.insert_at(loc, key, smallvec![make()]);
                self.len += 1;
                &mut self.tree.value_at_mut(id)[0]
            }
        }
    }

    /// Remove a key and its entire bucket
    pub fn remove(&mut self, key: &K) -> Option<Bucket<V>> {
        let bucket = self.tree.remove(key)?;
        self.len -= bucket.len();
        Some(bucket)
    }

    /// Values stored under a key, in insertion order
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.tree.get(key).map(|b| b.as_slice())
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Flattened in-order iterator over all values
    pub fn iter(&self) -> FlatIter<'_, K, V> {
        self.range(None, None)
    }

    /// Flattened in-order iterator bounded by inclusive `min` and `max`
    pub fn range(&self, min: Option<&K>, max: Option<K>) -> FlatIter<'_, K, V> {
        FlatIter {
            keys: self.tree.range(min, max),
            bucket: None,
        }
    }
}

impl<K: Ord, V> fmt::Debug for DuplicateTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateTree")
            .field("len", &self.len)
            .field("key_count", &self.key_count())
            .finish()
    }
}

/// Flattening iterator: advances within a bucket, then moves to the next
/// key's bucket, ending when the inner tree iterator is exhausted
pub struct FlatIter<'a, K, V> {
    keys: RangeIter<'a, K, Bucket<V>>,
    bucket: Option<(&'a K, std::slice::Iter<'a, V>)>,
}

impl<'a, K: Ord, V> Iterator for FlatIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = &mut self.bucket {
                if let Some(v) = values.next() {
                    return Some((key, v));
                }
            }
            let (key, bucket) = self.keys.next()?;
            self.bucket = Some((key, bucket.iter()));
        }
    }
}
