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

//! Dynamically typed key values
//!
//! Every index layer keys on [`Value`], which carries a total order so a
//! single tree implementation serves all column types. Integer and Float
//! compare cross-type by numeric value; NULL orders before everything else.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

/// A dynamically typed, totally ordered key value
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value; orders before everything else
    Null,
    /// Boolean value (false < true)
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit float; compares numerically with Integer, NaN orders last
    Float(f64),
    /// UTF-8 text, ordered lexicographically by byte value
    Text(String),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Create an integer value
    pub fn integer(v: i64) -> Self {
        Value::Integer(v)
    }

    /// Create a float value
    pub fn float(v: f64) -> Self {
        Value::Float(v)
    }

    /// Create a text value
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    /// Create a boolean value
    pub fn boolean(v: bool) -> Self {
        Value::Boolean(v)
    }

    /// Create a timestamp value
    pub fn timestamp(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }

    /// Check if this value is NULL
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type discriminant used for cross-type ordering
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            // Integer and Float share a rank so they sort together
            // by numeric value
            Value::Integer(_) | Value::Float(_) => 2,
            Value::Text(_) => 3,
            Value::Timestamp(_) => 4,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.total_cmp(b),
            },
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),

            // Cross-type numeric comparison; NaN orders after every number
            (Value::Integer(i), Value::Float(f)) => {
                if f.is_nan() {
                    Ordering::Less
                } else {
                    (*i as f64).total_cmp(f)
                }
            }
            (Value::Float(f), Value::Integer(i)) => {
                if f.is_nan() {
                    Ordering::Greater
                } else {
                    f.total_cmp(&(*i as f64))
                }
            }

            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_type_ordering() {
        assert!(Value::integer(1) < Value::integer(2));
        assert!(Value::text("apple") < Value::text("banana"));
        assert!(Value::boolean(false) < Value::boolean(true));
        assert!(Value::float(1.5) < Value::float(2.5));
    }

    #[test]
    fn test_cross_type_numeric_ordering() {
        assert_eq!(Value::integer(5), Value::float(5.0));
        assert!(Value::integer(5) < Value::float(5.5));
        assert!(Value::float(4.5) < Value::integer(5));
    }

    #[test]
    fn test_nan_orders_last_among_numbers() {
        assert!(Value::integer(i64::MAX) < Value::float(f64::NAN));
        assert!(Value::float(f64::NAN) > Value::float(f64::INFINITY));
        // Every NaN bit pattern collapses to one key
        assert_eq!(Value::float(f64::NAN), Value::float(-f64::NAN));
    }

    #[test]
    fn test_null_orders_first() {
        assert!(Value::Null < Value::boolean(false));
        assert!(Value::Null < Value::integer(i64::MIN));
        assert!(Value::Null < Value::text(""));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn test_type_rank_ordering() {
        assert!(Value::boolean(true) < Value::integer(0));
        assert!(Value::integer(9999) < Value::text("0"));
        assert!(Value::text("z") < Value::timestamp(Utc::now()));
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from(42i64), Value::integer(42));
        assert_eq!(Value::from(42i32), Value::integer(42));
        assert_eq!(Value::from(2.5), Value::float(2.5));
        assert_eq!(Value::from("abc"), Value::text("abc"));
        assert_eq!(Value::from(true), Value::boolean(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::integer(7).to_string(), "7");
        assert_eq!(Value::text("x").to_string(), "x");
    }
}
