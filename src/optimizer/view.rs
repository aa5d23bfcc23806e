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

//! Lazy filtered views
//!
//! A [`FilteredView`] binds a predicate to the index the selector picked
//! for it, or to a plain filtered scan when no index is usable. Nothing is
//! evaluated until the view is iterated; deferred bounds are resolved once
//! per iteration, so a re-iterated view observes current query-time state.

use std::sync::Arc;

use crate::expression::analyzer::{analyze, resolve_all, RestrictionMap};
use crate::expression::Predicate;
use crate::index::CompositeIndex;
use crate::optimizer::selector::select;

/// A deferred query: predicate, chosen index, and the restriction ranges
/// the index scan will be narrowed with
pub struct FilteredView<'a, R> {
    index: Option<&'a CompositeIndex<R>>,
    fallback: Option<&'a CompositeIndex<R>>,
    predicate: Predicate<R>,
    restrictions: RestrictionMap,
}

impl<'a, R> FilteredView<'a, R> {
    /// Plan a view over a set of candidate indexes
    ///
    /// Analysis and selection happen here, once; iteration only evaluates
    /// bounds and walks the structure. When no index scores positively the
    /// view falls back to enumerating the first index with a per-record
    /// predicate check.
    pub fn new(indexes: &'a [CompositeIndex<R>], predicate: Predicate<R>) -> Self {
        let restrictions = analyze(&predicate);
        let index = select(indexes, &restrictions);
        let restrictions = match index {
            Some(chosen) => trim_to_index(chosen, restrictions),
            None => restrictions,
        };
        Self {
            index,
            fallback: indexes.first(),
            predicate,
            restrictions,
        }
    }

    /// The index the selector chose, if any
    pub fn selected_index(&self) -> Option<&'a CompositeIndex<R>> {
        self.index
    }

    /// The view's combined predicate
    pub fn predicate(&self) -> &Predicate<R> {
        &self.predicate
    }

    /// Narrow the view with a further predicate, keeping the chosen index
    ///
    /// The new predicate's ranges are intersected into the existing ones,
    /// so a chained view scans no wider than the original.
    pub fn and_where(mut self, predicate: Predicate<R>) -> Self {
        let mut added = analyze(&predicate);
        if let Some(index) = self.index {
            added = trim_to_index(index, added);
        }
        for (column, range) in added {
            let combined = match self.restrictions.remove(&column) {
                Some(existing) => existing.intersect(range),
                None => range,
            };
            self.restrictions.insert(column, combined);
        }
        self.predicate = self.predicate.and(predicate);
        self
    }

    /// Enumerate matching records
    ///
    /// Deferred bounds are evaluated here, once per call. The predicate
    /// itself is re-checked per candidate either way, so the result set is
    /// identical with or without a chosen index.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &R> + '_> {
        match self.index {
            Some(index) => {
                let ranges = Arc::new(resolve_all(&self.restrictions));
                Box::new(index.scan(&self.predicate, ranges))
            }
            None => match self.fallback {
                Some(base) => Box::new(base.iter().filter(move |r| self.predicate.matches(r))),
                None => Box::new(std::iter::empty()),
            },
        }
    }

    /// Count matching records; consumes nothing, evaluates everything
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

/// Keep only the restrictions the chosen index can apply: its own member
/// columns, cut at the first unrestricted one when the index cannot use
/// restrictions past a gap
fn trim_to_index<R>(index: &CompositeIndex<R>, mut all: RestrictionMap) -> RestrictionMap {
    let mut kept = RestrictionMap::default();
    for member in index.indexed_members() {
        match all.remove(member.as_str()) {
            Some(range) => {
                kept.insert(member.clone(), range);
            }
            None => {
                if !index.supports_out_of_order() {
                    break;
                }
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, Value};
    use crate::expression::Operand;

    #[derive(Debug, Clone, PartialEq)]
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

    fn movie(title: &'static str, year: i64, rating: f64) -> Movie {
        Movie {
            title,
            year,
            rating,
        }
    }

    fn catalog() -> Vec<Movie> {
        vec![
            movie("Heat", 1995, 8.3),
            movie("The Matrix", 1999, 8.7),
            movie("Fight Club", 1999, 8.8),
            movie("Memento", 2000, 8.4),
            movie("Spirited Away", 2001, 8.6),
            movie("Oldboy", 2003, 8.4),
        ]
    }

    fn indexes() -> Vec<CompositeIndex<Movie>> {
        let mut by_year_title =
            CompositeIndex::new(vec![year(), title()], false).expect("columns");
        let mut by_rating = CompositeIndex::new(vec![rating()], false).expect("columns");
        for m in catalog() {
            by_year_title.insert(m.clone()).expect("insert");
            by_rating.insert(m).expect("insert");
        }
        vec![by_year_title, by_rating]
    }

    #[test]
    fn test_view_picks_an_index() {
        let indexes = indexes();
        let view = FilteredView::new(&indexes, year().eq(1999));
        assert_eq!(
            view.selected_index().expect("chosen").indexed_members(),
            &["year", "title"]
        );

        let titles: Vec<&str> = view.iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Fight Club", "The Matrix"]);
    }

    #[test]
    fn test_view_falls_back_to_filtered_scan() {
        let indexes = indexes();
        // Double negation is equality semantically, but the analyzer sees
        // an opaque NOT and extracts no ranges; nothing scores positive
        let view = FilteredView::new(&indexes, title().ne("Oldboy").not());
        assert!(view.selected_index().is_none());

        let found: Vec<&Movie> = view.iter().collect();
        assert_eq!(found, vec![&movie("Oldboy", 2003, 8.4)]);
    }

    #[test]
    fn test_and_where_narrows() {
        let indexes = indexes();
        let view = FilteredView::new(&indexes, year().ge(1999));
        assert_eq!(view.count(), 5);

        let narrowed = view.and_where(year().le(2000));
        assert_eq!(
            narrowed
                .selected_index()
                .expect("index kept")
                .indexed_members(),
            &["year", "title"]
        );
        let titles: Vec<&str> = narrowed.iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Fight Club", "The Matrix", "Memento"]);
    }

    #[test]
    fn test_and_where_restricts_other_columns_too() {
        let indexes = indexes();
        let view = FilteredView::new(&indexes, year().eq(1999)).and_where(title().lt("M"));
        let titles: Vec<&str> = view.iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Fight Club"]);
    }

    #[test]
    fn test_reiteration_observes_deferred_state() {
        use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

        let indexes = indexes();
        let cutoff = Arc::new(AtomicI64::new(2000));
        let captured = Arc::clone(&cutoff);
        let view = FilteredView::new(
            &indexes,
            year().ge(Operand::deferred(move || {
                Value::integer(captured.load(AtomicOrdering::Relaxed))
            })),
        );

        assert_eq!(view.count(), 3);
        cutoff.store(2003, AtomicOrdering::Relaxed);
        assert_eq!(view.count(), 1);
    }

    #[test]
    fn test_empty_index_set() {
        let none: Vec<CompositeIndex<Movie>> = vec![];
        let view = FilteredView::new(&none, year().eq(1999));
        assert!(view.selected_index().is_none());
        assert_eq!(view.count(), 0);
    }
}
