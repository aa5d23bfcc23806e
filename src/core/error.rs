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

//! Error types for deepindex
//!
//! Every failure in the engine is a deterministic consequence of caller
//! input; there is no retry machinery anywhere in the crate.

use thiserror::Error;

/// Result type alias for deepindex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for deepindex operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Inserting a key that already exists into a unique tree or layer
    #[error("duplicate key in unique index")]
    DuplicateKey,

    /// Keyed access to a key that is not present
    #[error("key not found")]
    KeyNotFound,

    /// Reading a range bound that was never set
    #[error("range bound '{0}' has not been set")]
    RangeBoundUnset(&'static str),

    /// Declaring an index with no key columns
    #[error("index requires at least one key column")]
    EmptyIndexColumns,

    /// An index with the given name already exists in the collection
    #[error("index '{0}' already exists")]
    IndexAlreadyExists(String),

    /// Invalid argument at an API boundary
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create a new InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Create a new IndexAlreadyExists error
    pub fn index_already_exists(name: impl Into<String>) -> Self {
        Error::IndexAlreadyExists(name.into())
    }
}
