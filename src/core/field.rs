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

//! Named key-extraction functions
//!
//! A [`Field`] pairs a column name with a closure producing that column's
//! [`Value`] from a record. Fields declare index columns and form the
//! left-hand side of predicate comparisons, so the analyzer and the index
//! layers agree on column identity by name.

use std::fmt;
use std::sync::Arc;

use crate::core::Value;

/// A named key-extraction function over records of type `R`
pub struct Field<R> {
    name: String,
    extract: Arc<dyn Fn(&R) -> Value>,
}

impl<R> Field<R> {
    /// Create a field from a name and an extraction closure
    pub fn new(name: impl Into<String>, extract: impl Fn(&R) -> Value + 'static) -> Self {
        Self {
            name: name.into(),
            extract: Arc::new(extract),
        }
    }

    /// The column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extract this field's key from a record
    #[inline]
    pub fn key(&self, record: &R) -> Value {
        (self.extract)(record)
    }
}

impl<R> Clone for Field<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            extract: Arc::clone(&self.extract),
        }
    }
}

// The extraction closure has no useful Debug form; show the name only.
impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}
