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

//! Heuristic index selection
//!
//! Each candidate index is scored column by column against the restriction
//! map extracted from a predicate. Point restrictions weigh the most, then
//! two-sided ranges, then one-sided; columns the predicate says nothing
//! about cost a penalty, since the scan must visit every key at that layer.
//! Scoring stops early for indexes that cannot use restrictions past a gap.

use crate::expression::analyzer::{ColumnRange, RestrictionMap};
use crate::index::CompositeIndex;

const POINT_WEIGHT: i32 = 5;
const TWO_SIDED_WEIGHT: i32 = 3;
const ONE_SIDED_WEIGHT: i32 = 2;
const UNRESTRICTED_PENALTY: i32 = -1;

fn range_weight(range: &ColumnRange) -> i32 {
    if range.is_point() {
        POINT_WEIGHT
    } else if range.has_min() && range.has_max() {
        TWO_SIDED_WEIGHT
    } else {
        ONE_SIDED_WEIGHT
    }
}

/// Score an index against a restriction map
///
/// Walks the index's columns front to back. A restricted column adds its
/// weight; an unrestricted one subtracts the penalty. Without out-of-order
/// support, scoring stops at the first unrestricted column and after the
/// first non-point restriction, because deeper restrictions could not
/// narrow the scan anyway.
pub fn score<R>(index: &CompositeIndex<R>, restrictions: &RestrictionMap) -> i32 {
    let mut total = 0;
    for member in index.indexed_members() {
        match restrictions.get(member.as_str()) {
            Some(range) => {
                total += range_weight(range);
                if !range.is_point() && !index.supports_out_of_order() {
                    break;
                }
            }
            None => {
                if !index.supports_out_of_order() {
                    break;
                }
                total += UNRESTRICTED_PENALTY;
            }
        }
    }
    total
}

/// Pick the usable index with the strictly highest score
///
/// Returns `None` when no index scores above zero; the caller falls back
/// to a full scan with per-record predicate checks. Ties go to the first
/// index in declaration order.
pub fn select<'a, R>(
    indexes: &'a [CompositeIndex<R>],
    restrictions: &RestrictionMap,
) -> Option<&'a CompositeIndex<R>> {
    let mut best: Option<(&'a CompositeIndex<R>, i32)> = None;
    for index in indexes {
        let s = score(index, restrictions);
        if s > 0 && best.map_or(true, |(_, b)| s > b) {
            best = Some((index, s));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, Value};
    use crate::expression::analyzer::analyze;

    #[derive(Debug, Clone)]
    struct Movie {
        title: &'static str,
        year: i64,
        rating: f64,
    }

    fn year() -> Field<Movie> {
        Field::new("year", |m: &Movie| Value::integer(m.year))
    }

    fn rating() -> Field<Movie> {
        Field::new("rating", |m: &Movie| Value::float(m.rating))
    }

    fn title() -> Field<Movie> {
        Field::new("title", |m: &Movie| Value::text(m.title))
    }

    fn index_on(fields: Vec<Field<Movie>>) -> CompositeIndex<Movie> {
        CompositeIndex::new(fields, false).expect("valid columns")
    }

    #[test]
    fn test_score_point_beats_range() {
        let by_year = index_on(vec![year()]);

        let point = analyze(&year().eq(1999));
        assert_eq!(score(&by_year, &point), 5);

        let two_sided = analyze(&year().gt(1990).and(year().lt(2000)));
        assert_eq!(score(&by_year, &two_sided), 3);

        let one_sided = analyze(&year().gt(1990));
        assert_eq!(score(&by_year, &one_sided), 2);
    }

    #[test]
    fn test_score_penalizes_unrestricted_columns() {
        let compound = index_on(vec![year(), rating(), title()]);

        // Only the middle column is restricted: -1 +5 -1
        let restrictions = analyze(&rating().eq(8.0));
        assert_eq!(score(&compound, &restrictions), 3);

        // Nothing restricted at all
        let empty = analyze(&title().ne("x"));
        assert_eq!(score(&compound, &empty), -3);
    }

    #[test]
    fn test_score_sums_across_columns() {
        let compound = index_on(vec![year(), rating()]);
        let restrictions = analyze(&year().eq(1999).and(rating().gt(8.0)));
        assert_eq!(score(&compound, &restrictions), 7);
    }

    #[test]
    fn test_select_prefers_higher_score() {
        let by_year = index_on(vec![year()]);
        let by_rating = index_on(vec![rating()]);
        let indexes = vec![by_rating, by_year];

        // year is a point (5), rating only one-sided (2)
        let restrictions = analyze(&year().eq(1999).and(rating().gt(8.0)));
        let chosen = select(&indexes, &restrictions).expect("usable index");
        assert_eq!(chosen.indexed_members(), &["year"]);
    }

    #[test]
    fn test_select_tie_goes_to_first_declared() {
        let indexes = vec![index_on(vec![year()]), index_on(vec![rating()])];

        // Both indexes score 5 on their own single column
        let restrictions = analyze(&year().eq(1999).and(rating().eq(8.0)));
        let chosen = select(&indexes, &restrictions).expect("usable index");
        assert_eq!(chosen.indexed_members(), &["year"]);
    }

    #[test]
    fn test_select_none_when_nothing_scores_positive() {
        let indexes = vec![index_on(vec![year()])];
        let restrictions = analyze(&title().eq("Heat"));
        assert!(select(&indexes, &restrictions).is_none());

        let empty: Vec<CompositeIndex<Movie>> = vec![];
        assert!(select(&empty, &restrictions).is_none());
    }
}
