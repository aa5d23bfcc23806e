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

//! # deepindex
//!
//! An in-memory, multi-column indexing engine. Records live in composite
//! indexes built from nested balanced trees, one layer per key column;
//! queries are boolean predicates whose per-column ranges are extracted,
//! scored against the available indexes, and used to narrow the scan of
//! whichever index wins.
//!
//! The engine trades planner sophistication for a simple correctness
//! contract: derived ranges only prune, and the full predicate is
//! re-checked against every candidate record, so a query answers the same
//! with a good index, a bad index, or no index at all.
//!
//! ## Example
//!
//! ```
//! use deepindex::{Field, IndexedCollection, Value};
//!
//! #[derive(Clone)]
//! struct Movie {
//!     title: String,
//!     year: i64,
//! }
//!
//! let year = Field::new("year", |m: &Movie| Value::integer(m.year));
//! let title = Field::new("title", |m: &Movie| Value::text(m.title.clone()));
//!
//! let mut movies = IndexedCollection::new();
//! movies.create_index("by_year_title", vec![year.clone(), title], true)?;
//!
//! movies.insert(Movie { title: "The Matrix".into(), year: 1999 })?;
//! movies.insert(Movie { title: "Memento".into(), year: 2000 })?;
//!
//! let recent = movies.query(year.ge(2000));
//! assert_eq!(recent.count(), 1);
//! # Ok::<(), deepindex::Error>(())
//! ```

pub mod collection;
pub mod core;
pub mod expression;
pub mod index;
pub mod optimizer;

pub use crate::collection::IndexedCollection;
pub use crate::core::{Error, Field, Result, Value};
pub use crate::expression::analyzer::{analyze, resolve_all, ColumnRange, RestrictionMap};
pub use crate::expression::{Operand, Operator, Predicate};
pub use crate::index::{CompositeIndex, DuplicateTree, OrderedTree};
pub use crate::optimizer::{select, FilteredView};
