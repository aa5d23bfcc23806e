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

//! Index structures
//!
//! The ordered-tree family, bottom up: [`OrderedTree`] is the arena-backed
//! balanced tree, [`DuplicateTree`] adds per-key buckets, and
//! [`CompositeIndex`] stacks one tree layer per key column.

pub mod avl;
pub mod composite;
pub mod duplicate;

pub use avl::{Location, NodeId, OrderedTree, RangeIter};
pub use composite::CompositeIndex;
pub use duplicate::{Bucket, DuplicateTree, FlatIter};
