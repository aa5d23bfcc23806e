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

//! Boolean filter predicates
//!
//! Filters are an explicit tagged AST rather than an introspected language
//! expression tree: [`Predicate`] combines [`Compare`] leaves with
//! `And`/`Or`/`Not`. A comparison's right-hand side is an [`Operand`],
//! either a constant or a zero-argument deferred closure capturing
//! query-time state.
//!
//! Evaluation is total: comparisons involving NULL are false, except
//! equality of two NULLs.
//!
//! [`Compare`]: Predicate::Compare

pub mod analyzer;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::core::{Field, Value};

/// Comparison operator of a predicate leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equality (=)
    Eq,
    /// Inequality (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
}

impl Operator {
    /// Whether this operator accepts the given ordering of lhs vs. rhs
    fn holds(self, ord: Ordering) -> bool {
        match self {
            Operator::Eq => ord == Ordering::Equal,
            Operator::Ne => ord != Ordering::Equal,
            Operator::Gt => ord == Ordering::Greater,
            Operator::Gte => ord != Ordering::Less,
            Operator::Lt => ord == Ordering::Less,
            Operator::Lte => ord != Ordering::Greater,
        }
    }
}

/// Right-hand side of a comparison: a constant, or a deferred closure
/// evaluated when the query runs rather than when it is built
///
/// Constants short-circuit the deferred machinery. Cloning a deferred
/// operand shares the underlying closure, so an equality restriction keeps
/// a detectable single source for its min and max bounds.
#[derive(Clone)]
pub enum Operand {
    /// Precomputed constant value
    Const(Value),
    /// Late-bound value source
    Deferred(Arc<dyn Fn() -> Value>),
}

impl Operand {
    /// Create a constant operand
    pub fn constant(value: impl Into<Value>) -> Self {
        Operand::Const(value.into())
    }

    /// Create a deferred operand from a zero-argument closure
    pub fn deferred(f: impl Fn() -> Value + 'static) -> Self {
        Operand::Deferred(Arc::new(f))
    }

    /// Produce the operand's value; constants clone, closures are invoked
    pub fn get(&self) -> Value {
        match self {
            Operand::Const(v) => v.clone(),
            Operand::Deferred(f) => f(),
        }
    }

    /// Whether two operands are bound to the same value source
    ///
    /// Deferred operands compare by closure identity, constants by value.
    pub fn same_source(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::Const(a), Operand::Const(b)) => a == b,
            (Operand::Deferred(a), Operand::Deferred(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(v) => write!(f, "Const({:?})", v),
            Operand::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Const(v)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Const(Value::Integer(v))
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Const(Value::Integer(v as i64))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Const(Value::Float(v))
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Const(Value::Boolean(v))
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Const(Value::Text(v.to_string()))
    }
}

/// A boolean filter over records of type `R`
#[derive(Debug)]
pub enum Predicate<R> {
    /// Both sides must match; short-circuits on the first false
    And(Box<Predicate<R>>, Box<Predicate<R>>),
    /// Either side may match; short-circuits on the first true
    Or(Box<Predicate<R>>, Box<Predicate<R>>),
    /// Negation
    Not(Box<Predicate<R>>),
    /// Column comparison leaf
    Compare {
        /// Column being compared
        field: Field<R>,
        /// Comparison operator
        op: Operator,
        /// Right-hand side value source
        operand: Operand,
    },
}

impl<R> Predicate<R> {
    /// Build a comparison leaf
    pub fn compare(field: Field<R>, op: Operator, operand: impl Into<Operand>) -> Self {
        Predicate::Compare {
            field,
            op,
            operand: operand.into(),
        }
    }

    /// AND-combine with another predicate
    pub fn and(self, other: Predicate<R>) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// OR-combine with another predicate
    pub fn or(self, other: Predicate<R>) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Negate this predicate
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluate against a record
    pub fn matches(&self, record: &R) -> bool {
        match self {
            Predicate::And(l, r) => l.matches(record) && r.matches(record),
            Predicate::Or(l, r) => l.matches(record) || r.matches(record),
            Predicate::Not(p) => !p.matches(record),
            Predicate::Compare { field, op, operand } => {
                let lhs = field.key(record);
                let rhs = operand.get();
                if lhs.is_null() || rhs.is_null() {
                    // NULL compares equal only to NULL; every other
                    // comparison involving NULL is false
                    return *op == Operator::Eq && lhs.is_null() && rhs.is_null();
                }
                op.holds(lhs.cmp(&rhs))
            }
        }
    }
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        match self {
            Predicate::And(l, r) => Predicate::And(l.clone(), r.clone()),
            Predicate::Or(l, r) => Predicate::Or(l.clone(), r.clone()),
            Predicate::Not(p) => Predicate::Not(p.clone()),
            Predicate::Compare { field, op, operand } => Predicate::Compare {
                field: field.clone(),
                op: *op,
                operand: operand.clone(),
            },
        }
    }
}

/// Comparison sugar on [`Field`], so filters read like
/// `year.gt(1999).and(year.lt(2010))`
#[allow(clippy::should_implement_trait)]
impl<R> Field<R> {
    /// `field == operand`
    pub fn eq(&self, operand: impl Into<Operand>) -> Predicate<R> {
        Predicate::compare(self.clone(), Operator::Eq, operand)
    }

    /// `field != operand`
    pub fn ne(&self, operand: impl Into<Operand>) -> Predicate<R> {
        Predicate::compare(self.clone(), Operator::Ne, operand)
    }

    /// `field > operand`
    pub fn gt(&self, operand: impl Into<Operand>) -> Predicate<R> {
        Predicate::compare(self.clone(), Operator::Gt, operand)
    }

    /// `field >= operand`
    pub fn ge(&self, operand: impl Into<Operand>) -> Predicate<R> {
        Predicate::compare(self.clone(), Operator::Gte, operand)
    }

    /// `field < operand`
    pub fn lt(&self, operand: impl Into<Operand>) -> Predicate<R> {
        Predicate::compare(self.clone(), Operator::Lt, operand)
    }

    /// `field <= operand`
    pub fn le(&self, operand: impl Into<Operand>) -> Predicate<R> {
        Predicate::compare(self.clone(), Operator::Lte, operand)
    }

    /// `lo <= field <= hi`, expanded to two comparisons so the analyzer
    /// sees plain bounds
    pub fn between(&self, lo: impl Into<Operand>, hi: impl Into<Operand>) -> Predicate<R> {
        self.ge(lo).and(self.le(hi))
    }
}
