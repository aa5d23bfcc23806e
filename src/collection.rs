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

//! Indexed record collection
//!
//! [`IndexedCollection`] holds records in one or more named composite
//! indexes and routes queries through the selector. There is no separate
//! record store: every index holds a clone, and the first index declared
//! doubles as the enumeration source and fallback scan target.

use crate::core::{Error, Field, Result};
use crate::expression::Predicate;
use crate::index::CompositeIndex;
use crate::optimizer::FilteredView;

/// A set of records kept consistent across several named indexes
pub struct IndexedCollection<R> {
    names: Vec<String>,
    indexes: Vec<CompositeIndex<R>>,
}

impl<R> Default for IndexedCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> IndexedCollection<R> {
    /// Create an empty collection with no indexes
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Declared index names, in declaration order
    pub fn index_names(&self) -> &[String] {
        &self.names
    }

    /// Look up an index by name
    pub fn index(&self, name: &str) -> Option<&CompositeIndex<R>> {
        let pos = self.names.iter().position(|n| n == name)?;
        Some(&self.indexes[pos])
    }

    /// Number of records, from the first index
    pub fn len(&self) -> usize {
        self.indexes.first().map_or(0, |i| i.len())
    }

    /// Check if the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every record in the first index's composite key order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.indexes.iter().take(1).flat_map(|i| i.iter())
    }

    /// Check whether a record's key path is present in the first index
    pub fn contains(&self, record: &R) -> bool {
        self.indexes.first().is_some_and(|i| i.contains(record))
    }

    /// Plan a lazy filtered view over the collection's indexes
    pub fn query(&self, predicate: Predicate<R>) -> FilteredView<'_, R> {
        FilteredView::new(&self.indexes, predicate)
    }
}

impl<R: Clone> IndexedCollection<R> {
    /// Declare a new named index and back-fill it with existing records
    ///
    /// Fails on a duplicate name, on invalid columns, and on a unique
    /// violation during back-fill; a failed declaration leaves the
    /// collection unchanged.
    pub fn create_index(
        &mut self,
        name: impl Into<String>,
        fields: Vec<Field<R>>,
        unique: bool,
    ) -> Result<()> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(Error::index_already_exists(name));
        }
        let mut index = CompositeIndex::new(fields, unique)?;
        if let Some(first) = self.indexes.first() {
            for record in first.iter() {
                index.insert(record.clone())?;
            }
        }
        self.names.push(name);
        self.indexes.push(index);
        Ok(())
    }

    /// Insert a record into every index
    ///
    /// Unique violations are detected up front, before any index is
    /// touched, so a failed insert never leaves the indexes disagreeing.
    pub fn insert(&mut self, record: R) -> Result<()> {
        if self.indexes.is_empty() {
            return Err(Error::invalid_argument(
                "collection has no index to store records",
            ));
        }
        if self
            .indexes
            .iter()
            .any(|i| i.is_unique() && i.contains(&record))
        {
            return Err(Error::DuplicateKey);
        }
        for index in &mut self.indexes {
            index.insert(record.clone())?;
        }
        Ok(())
    }

    /// Insert or replace in every index; returns true when the record was
    /// net-new in the first index
    ///
    /// Replacement is by key path, per index. If the new version changes a
    /// key that some index extracts, that index stores the record under the
    /// new path and keeps the stale entry under the old one; the caller
    /// must `remove` the old version first for such updates.
    pub fn insert_or_update(&mut self, record: R) -> bool {
        let mut iter = self.indexes.iter_mut();
        let inserted = match iter.next() {
            Some(first) => first.insert_or_update(record.clone()),
            None => return false,
        };
        for index in iter {
            index.insert_or_update(record.clone());
        }
        inserted
    }

    /// Remove a record's key path from every index; returns true when the
    /// first index removed something
    pub fn remove(&mut self, record: &R) -> bool {
        let mut removed = false;
        for (pos, index) in self.indexes.iter_mut().enumerate() {
            let hit = index.remove(record);
            if pos == 0 {
                removed = hit;
            }
        }
        removed
    }
}
