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

//! Predicate analysis: per-column range extraction
//!
//! [`analyze`] walks a [`Predicate`] and derives a [`RestrictionMap`] of
//! late-bound min/max bounds per column. The bounds only narrow index
//! scans; strict vs. inclusive is deliberately not distinguished because
//! exactness is restored by re-applying the predicate per candidate.
//!
//! AND combination intersects (tightens) ranges; OR combination unions
//! (loosens) them, and drops any column that is not restricted on both
//! sides. Shapes the analyzer cannot interpret contribute no restriction,
//! degrading the query to a wider scan, never to a wrong answer.

use rustc_hash::FxHashMap;

use crate::core::{Error, Result, Value};
use crate::expression::{Operand, Operator, Predicate};

/// A named, deferred range restriction on one column
#[derive(Debug, Clone)]
pub struct ColumnRange {
    column: String,
    min: Option<Operand>,
    max: Option<Operand>,
}

impl ColumnRange {
    /// Create an unrestricted range for a column
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            min: None,
            max: None,
        }
    }

    /// The restricted column's name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Whether a lower bound is set
    pub fn has_min(&self) -> bool {
        self.min.is_some()
    }

    /// Whether an upper bound is set
    pub fn has_max(&self) -> bool {
        self.max.is_some()
    }

    /// Set the lower bound source
    pub fn set_min(&mut self, operand: Operand) {
        self.min = Some(operand);
    }

    /// Set the upper bound source
    pub fn set_max(&mut self, operand: Operand) {
        self.max = Some(operand);
    }

    /// Evaluate the lower bound; reading an unset bound is a programming
    /// error, surfaced immediately
    pub fn min(&self) -> Result<Value> {
        match &self.min {
            Some(op) => Ok(op.get()),
            None => Err(Error::RangeBoundUnset("min")),
        }
    }

    /// Evaluate the upper bound; reading an unset bound is a programming
    /// error, surfaced immediately
    pub fn max(&self) -> Result<Value> {
        match &self.max {
            Some(op) => Ok(op.get()),
            None => Err(Error::RangeBoundUnset("max")),
        }
    }

    /// Whether min and max are bound to the same source, i.e. the range
    /// pins the column to a single point (an equality restriction)
    pub fn is_point(&self) -> bool {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => min.same_source(max),
            _ => false,
        }
    }

    /// AND combination: tighten, keeping the greater min and lesser max;
    /// a bound present on only one side is kept unmodified
    pub fn intersect(self, other: ColumnRange) -> ColumnRange {
        ColumnRange {
            column: self.column,
            min: merge(self.min, other.min, pick_greater),
            max: merge(self.max, other.max, pick_lesser),
        }
    }

    /// OR combination: loosen, keeping the lesser min and greater max;
    /// a bound missing on either side becomes unbounded
    pub fn union(self, other: ColumnRange) -> ColumnRange {
        ColumnRange {
            column: self.column,
            min: match (self.min, other.min) {
                (Some(a), Some(b)) => Some(pick_lesser(a, b)),
                _ => None,
            },
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(pick_greater(a, b)),
                _ => None,
            },
        }
    }

    /// Evaluate both bounds once, for the duration of one traversal
    pub fn resolve(&self) -> ResolvedRange {
        ResolvedRange {
            min: self.min.as_ref().map(|op| op.get()),
            max: self.max.as_ref().map(|op| op.get()),
        }
    }
}

fn merge(
    a: Option<Operand>,
    b: Option<Operand>,
    pick: fn(Operand, Operand) -> Operand,
) -> Option<Operand> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

/// Deferred max of two bound sources; constants fold eagerly
fn pick_greater(a: Operand, b: Operand) -> Operand {
    match (a, b) {
        (Operand::Const(x), Operand::Const(y)) => Operand::Const(if x >= y { x } else { y }),
        (a, b) => Operand::deferred(move || {
            let x = a.get();
            let y = b.get();
            if x >= y {
                x
            } else {
                y
            }
        }),
    }
}

/// Deferred min of two bound sources; constants fold eagerly
fn pick_lesser(a: Operand, b: Operand) -> Operand {
    match (a, b) {
        (Operand::Const(x), Operand::Const(y)) => Operand::Const(if x <= y { x } else { y }),
        (a, b) => Operand::deferred(move || {
            let x = a.get();
            let y = b.get();
            if x <= y {
                x
            } else {
                y
            }
        }),
    }
}

/// Column name -> deferred range, built once per query
pub type RestrictionMap = FxHashMap<String, ColumnRange>;

/// Column name -> bounds evaluated once for a traversal
pub type ResolvedRestrictions = FxHashMap<String, ResolvedRange>;

/// A range with its deferred bounds already evaluated
#[derive(Debug, Clone, Default)]
pub struct ResolvedRange {
    /// Inclusive lower bound, if restricted
    pub min: Option<Value>,
    /// Inclusive upper bound, if restricted
    pub max: Option<Value>,
}

/// Evaluate every range in a restriction map once
pub fn resolve_all(restrictions: &RestrictionMap) -> ResolvedRestrictions {
    restrictions
        .iter()
        .map(|(name, range)| (name.clone(), range.resolve()))
        .collect()
}

/// Extract per-column range restrictions from a filter predicate
pub fn analyze<R>(predicate: &Predicate<R>) -> RestrictionMap {
    match predicate {
        Predicate::Compare { field, op, operand } => {
            let mut range = ColumnRange::new(field.name());
            match op {
                Operator::Gt | Operator::Gte => range.set_min(operand.clone()),
                Operator::Lt | Operator::Lte => range.set_max(operand.clone()),
                Operator::Eq => {
                    // Both bounds share one source so the restriction is
                    // recognizable as a point
                    range.set_min(operand.clone());
                    range.set_max(operand.clone());
                }
                // Inequality excludes a point; it narrows nothing
                Operator::Ne => return RestrictionMap::default(),
            }
            let mut map = RestrictionMap::default();
            map.insert(field.name().to_string(), range);
            map
        }
        Predicate::And(left, right) => {
            let mut merged = analyze(left);
            for (column, range) in analyze(right) {
                let combined = match merged.remove(&column) {
                    Some(existing) => existing.intersect(range),
                    None => range,
                };
                merged.insert(column, combined);
            }
            merged
        }
        Predicate::Or(left, right) => {
            let left = analyze(left);
            let mut right = analyze(right);
            let mut merged = RestrictionMap::default();
            for (column, l) in left {
                // A column missing on either side is dropped entirely
                if let Some(r) = right.remove(&column) {
                    let union = l.union(r);
                    // A union can unbind both ends; keep only ranges that
                    // still narrow something
                    if union.has_min() || union.has_max() {
                        merged.insert(column, union);
                    }
                }
            }
            merged
        }
        // Negation and any other shape contribute no restriction
        Predicate::Not(_) => RestrictionMap::default(),
    }
}
