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

//! Core types for deepindex
//!
//! - [`Value`] - dynamically typed, totally ordered key value
//! - [`Field`] - named key-extraction function over records
//! - [`Error`], [`Result`] - crate-wide error handling

pub mod error;
pub mod field;
pub mod value;

pub use error::{Error, Result};
pub use field::Field;
pub use value::Value;
