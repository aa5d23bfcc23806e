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

//! Composite (multi-column) index
//!
//! A [`CompositeIndex`] over N columns is a stack of N layers: every
//! non-final layer maps its column's key to the next layer, and the final
//! layer maps its column's key to the records themselves. One uniqueness
//! flag applies to every layer.
//!
//! Query traversal applies each layer's own column range to that layer's
//! tree enumerator and flattens depth-first. Ranges above the leaf only
//! narrow the scan; correctness comes solely from the leaf re-applying the
//! full predicate per candidate.

use std::fmt;
use std::sync::Arc;

use crate::core::{Error, Field, Result, Value};
use crate::expression::analyzer::ResolvedRestrictions;
use crate::expression::Predicate;
use crate::index::avl::{OrderedTree, RangeIter};
use crate::index::duplicate::{DuplicateTree, FlatIter};

/// Key-to-entry tree of one layer, unique or duplicate-permitting
enum KeyTree<T> {
    Unique(OrderedTree<Value, T>),
    Duplicate(DuplicateTree<Value, T>),
}

impl<T> KeyTree<T> {
    fn new(unique: bool) -> Self {
        if unique {
            KeyTree::Unique(OrderedTree::new())
        } else {
            KeyTree::Duplicate(DuplicateTree::new())
        }
    }

    /// Number of entries, counting duplicates individually
    fn len(&self) -> usize {
        match self {
            KeyTree::Unique(tree) => tree.len(),
            KeyTree::Duplicate(tree) => tree.len(),
        }
    }

    /// Number of distinct keys
    fn key_count(&self) -> usize {
        match self {
            KeyTree::Unique(tree) => tree.len(),
            KeyTree::Duplicate(tree) => tree.key_count(),
        }
    }

    fn insert(&mut self, key: Value, entry: T) -> Result<()> {
        match self {
            KeyTree::Unique(tree) => tree.insert(key, entry),
            KeyTree::Duplicate(tree) => {
                tree.insert(key, entry);
                Ok(())
            }
        }
    }

    fn insert_or_update(&mut self, key: Value, entry: T) -> bool {
        match self {
            KeyTree::Unique(tree) => tree.insert_or_update(key, entry),
            KeyTree::Duplicate(tree) => tree.insert_or_update(key, entry),
        }
    }

    /// Entry for a key, creating it through `make` on first use; a single
    /// descent via locate-then-insert-at on the miss path
    fn entry_or_create(&mut self, key: Value, make: impl FnOnce() -> T) -> &mut T {
        match self {
            KeyTree::Unique(tree) => {
                let id = match tree.locate(&key) {
                    Ok(id) => id,
                    Err(loc) => tree.insert_at(loc, key, make()),
                };
                tree.value_at_mut(id)
            }
            KeyTree::Duplicate(tree) => tree.first_or_insert_with(key, make),
        }
    }

    fn get(&self, key: &Value) -> Option<&T> {
        match self {
            KeyTree::Unique(tree) => tree.get(key),
            KeyTree::Duplicate(tree) => tree.get(key).and_then(|b| b.first()),
        }
    }

    fn get_mut(&mut self, key: &Value) -> Option<&mut T> {
        match self {
            KeyTree::Unique(tree) => tree.get_mut(key),
            KeyTree::Duplicate(tree) => tree.first_mut(key),
        }
    }

    /// Remove a key with everything under it, returning how many entries
    /// were removed
    fn remove_key(&mut self, key: &Value) -> usize {
        match self {
            KeyTree::Unique(tree) => usize::from(tree.remove(key).is_some()),
            KeyTree::Duplicate(tree) => tree.remove(key).map_or(0, |bucket| bucket.len()),
        }
    }

    fn range(&self, min: Option<&Value>, max: Option<Value>) -> KeyTreeIter<'_, T> {
        match self {
            KeyTree::Unique(tree) => KeyTreeIter::Unique(tree.range(min, max)),
            KeyTree::Duplicate(tree) => KeyTreeIter::Duplicate(tree.range(min, max)),
        }
    }
}

/// Range iterator over either tree flavor, yielding individual entries
enum KeyTreeIter<'a, T> {
    Unique(RangeIter<'a, Value, T>),
    Duplicate(FlatIter<'a, Value, T>),
}

impl<'a, T> Iterator for KeyTreeIter<'a, T> {
    type Item = (&'a Value, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            KeyTreeIter::Unique(iter) => iter.next(),
            KeyTreeIter::Duplicate(iter) => iter.next(),
        }
    }
}

/// One layer of the composite stack
enum Layer<R> {
    /// Final layer: this column's key maps to the records themselves
    Leaf { field: Field<R>, tree: KeyTree<R> },
    /// Non-final layer: this column's key maps to the next layer down
    Mid {
        field: Field<R>,
        /// Columns of the layers below, used to create sub-layers on demand
        child_fields: Vec<Field<R>>,
        unique: bool,
        tree: KeyTree<Layer<R>>,
        /// Records beneath this layer, maintained incrementally
        len: usize,
    },
}

impl<R> Layer<R> {
    /// Build the layer stack for an ordered, non-empty column list
    fn build(mut fields: Vec<Field<R>>, unique: bool) -> Layer<R> {
        let field = fields.remove(0);
        if fields.is_empty() {
            Layer::Leaf {
                field,
                tree: KeyTree::new(unique),
            }
        } else {
            Layer::Mid {
                field,
                child_fields: fields,
                unique,
                tree: KeyTree::new(unique),
                len: 0,
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Layer::Leaf { tree, .. } => tree.len(),
            Layer::Mid { len, .. } => *len,
        }
    }

    fn insert(&mut self, record: R) -> Result<()> {
        match self {
            Layer::Leaf { field, tree } => {
                let key = field.key(&record);
                tree.insert(key, record)
            }
            Layer::Mid {
                field,
                child_fields,
                unique,
                tree,
                len,
            } => {
                let key = field.key(&record);
                let child = tree.entry_or_create(key, || Layer::build(child_fields.clone(), *unique));
                child.insert(record)?;
                *len += 1;
                Ok(())
            }
        }
    }

    fn insert_or_update(&mut self, record: R) -> bool {
        match self {
            Layer::Leaf { field, tree } => {
                let key = field.key(&record);
                tree.insert_or_update(key, record)
            }
            Layer::Mid {
                field,
                child_fields,
                unique,
                tree,
                len,
            } => {
                let key = field.key(&record);
                let child = tree.entry_or_create(key, || Layer::build(child_fields.clone(), *unique));
                let inserted = child.insert_or_update(record);
                if inserted {
                    *len += 1;
                }
                inserted
            }
        }
    }

    /// Remove the record's key path, returning how many records went away.
    /// Emptied sub-layers are left in place (space traded for removal cost).
    fn remove(&mut self, record: &R) -> usize {
        match self {
            Layer::Leaf { field, tree } => {
                let key = field.key(record);
                tree.remove_key(&key)
            }
            Layer::Mid {
                field, tree, len, ..
            } => {
                let key = field.key(record);
                let removed = match tree.get_mut(&key) {
                    Some(child) => child.remove(record),
                    None => 0,
                };
                *len -= removed;
                removed
            }
        }
    }

    fn contains(&self, record: &R) -> bool {
        match self {
            Layer::Leaf { field, tree } => tree.get(&field.key(record)).is_some(),
            Layer::Mid { field, tree, .. } => match tree.get(&field.key(record)) {
                Some(child) => child.contains(record),
                None => false,
            },
        }
    }

    /// Depth-first enumeration of every record, in composite key order
    fn all<'a>(&'a self) -> Box<dyn Iterator<Item = &'a R> + 'a> {
        match self {
            Layer::Leaf { tree, .. } => Box::new(tree.range(None, None).map(|(_, r)| r)),
            Layer::Mid { tree, .. } => {
                Box::new(tree.range(None, None).flat_map(|(_, sub)| sub.all()))
            }
        }
    }

    /// Range-narrowed depth-first scan; the predicate is re-checked per
    /// candidate at the leaf only. The resolved ranges are shared by Arc so
    /// nested lazy enumerators never outlive their bounds.
    fn scan<'a>(
        &'a self,
        predicate: &'a Predicate<R>,
        ranges: Arc<ResolvedRestrictions>,
    ) -> Box<dyn Iterator<Item = &'a R> + 'a> {
        match self {
            Layer::Leaf { field, tree } => {
                let (min, max) = bounds_for(field.name(), &ranges);
                Box::new(
                    tree.range(min.as_ref(), max)
                        .map(|(_, r)| r)
                        .filter(move |r| predicate.matches(r)),
                )
            }
            Layer::Mid { field, tree, .. } => {
                let (min, max) = bounds_for(field.name(), &ranges);
                Box::new(
                    tree.range(min.as_ref(), max)
                        .flat_map(move |(_, sub)| sub.scan(predicate, Arc::clone(&ranges))),
                )
            }
        }
    }
}

fn bounds_for(column: &str, ranges: &ResolvedRestrictions) -> (Option<Value>, Option<Value>) {
    match ranges.get(column) {
        Some(range) => (range.min.clone(), range.max.clone()),
        None => (None, None),
    }
}

/// A multi-column index realized as nested trees, one layer per column
pub struct CompositeIndex<R> {
    root: Layer<R>,
    members: Vec<String>,
    unique: bool,
}

impl<R> CompositeIndex<R> {
    /// Create an index over an ordered list of key columns
    ///
    /// Fails fast on an empty column list or an unnamed column, before any
    /// tree is built.
    pub fn new(fields: Vec<Field<R>>, unique: bool) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::EmptyIndexColumns);
        }
        if fields.iter().any(|f| f.name().is_empty()) {
            return Err(Error::invalid_argument("index column name is empty"));
        }
        let members = fields.iter().map(|f| f.name().to_string()).collect();
        Ok(Self {
            root: Layer::build(fields, unique),
            members,
            unique,
        })
    }

    /// Number of records in the index, counting duplicates individually
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Check if the index holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every layer rejects duplicate keys
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Ordered column names, front to back
    pub fn indexed_members(&self) -> &[String] {
        &self.members
    }

    /// Whether a non-leading column may be range-restricted without a
    /// restriction on the columns before it. Always true for this
    /// structure, at the cost of visiting every key of the unrestricted
    /// leading columns.
    pub fn supports_out_of_order(&self) -> bool {
        true
    }

    /// Insert a record, failing on a duplicate key path when unique
    pub fn insert(&mut self, record: R) -> Result<()> {
        self.root.insert(record)
    }

    /// Insert or replace the record at its key path; returns true when a
    /// net-new record was added
    pub fn insert_or_update(&mut self, record: R) -> bool {
        self.root.insert_or_update(record)
    }

    /// Remove whatever is stored under the record's key path; returns true
    /// when something was removed
    pub fn remove(&mut self, record: &R) -> bool {
        self.root.remove(record) > 0
    }

    /// Check whether the record's key path is present
    pub fn contains(&self, record: &R) -> bool {
        self.root.contains(record)
    }

    /// Enumerate every record in composite key order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.root.all()
    }

    /// Enumerate records matching the predicate, narrowing each layer's
    /// scan with that column's resolved range
    pub fn scan<'a>(
        &'a self,
        predicate: &'a Predicate<R>,
        ranges: Arc<ResolvedRestrictions>,
    ) -> impl Iterator<Item = &'a R> + 'a {
        self.root.scan(predicate, ranges)
    }
}

impl<R> fmt::Debug for CompositeIndex<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeIndex")
            .field("members", &self.members)
            .field("unique", &self.unique)
            .field("len", &self.len())
            .finish()
    }
}
