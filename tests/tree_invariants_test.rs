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

//! Randomized ordered-tree invariant tests, mirrored against the standard
//! library's BTreeMap as the ordering oracle.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use deepindex::OrderedTree;

/// AVL height bound: h <= 1.44 * log2(n + 2). Height counts edges; the
/// empty tree reports -1.
fn height_within_bound(height: i32, len: usize) -> bool {
    if len == 0 {
        return height == -1;
    }
    let bound = 1.45 * ((len + 2) as f64).log2();
    (height as f64) <= bound
}

fn assert_matches_oracle(tree: &OrderedTree<i64, i64>, oracle: &BTreeMap<i64, i64>) {
    assert_eq!(tree.len(), oracle.len());
    let flat: Vec<(i64, i64)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<(i64, i64)> = oracle.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(flat, expected, "iteration order diverged from the oracle");
    assert!(
        height_within_bound(tree.height(), tree.len()),
        "height {} too large for {} keys",
        tree.height(),
        tree.len()
    );
}

#[test]
fn test_random_inserts_match_btreemap() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = OrderedTree::new();
    let mut oracle = BTreeMap::new();

    for _ in 0..2_000 {
        let key = rng.gen_range(0..5_000i64);
        let value = rng.gen_range(0..1_000_000i64);
        tree.insert_or_update(key, value);
        oracle.insert(key, value);
    }
    assert_matches_oracle(&tree, &oracle);
}

#[test]
fn test_random_insert_remove_interleaving() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = OrderedTree::new();
    let mut oracle = BTreeMap::new();

    for round in 0..5_000 {
        let key = rng.gen_range(0..800i64);
        if rng.gen_bool(0.6) {
            tree.insert_or_update(key, round);
            oracle.insert(key, round);
        } else {
            assert_eq!(tree.remove(&key), oracle.remove(&key));
        }
        assert_eq!(tree.get(&key).copied(), oracle.get(&key).copied());
    }
    assert_matches_oracle(&tree, &oracle);
}

#[test]
fn test_drain_to_empty_and_reuse() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree = OrderedTree::new();

    let mut keys: Vec<i64> = (0..500).collect();
    for _ in 0..2 {
        for &k in &keys {
            tree.insert(k, k * 2).expect("fresh key");
        }
        assert_eq!(tree.len(), 500);

        // Remove in a shuffled order
        for i in (1..keys.len()).rev() {
            keys.swap(i, rng.gen_range(0..=i));
        }
        for &k in &keys {
            assert_eq!(tree.remove(&k), Some(k * 2));
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), -1);
    }
}

#[test]
fn test_random_range_queries_match_oracle() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut tree = OrderedTree::new();
    let mut oracle = BTreeMap::new();

    for _ in 0..1_000 {
        let key = rng.gen_range(0..10_000i64);
        tree.insert_or_update(key, key);
        oracle.insert(key, key);
    }

    for _ in 0..200 {
        let a = rng.gen_range(0..10_000i64);
        let b = rng.gen_range(0..10_000i64);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let got: Vec<i64> = tree.range(Some(&lo), Some(hi)).map(|(k, _)| *k).collect();
        let expected: Vec<i64> = oracle.range(lo..=hi).map(|(k, _)| *k).collect();
        assert_eq!(got, expected, "range [{lo}, {hi}] diverged");

        // One-sided ranges
        let got: Vec<i64> = tree.range(Some(&lo), None).map(|(k, _)| *k).collect();
        let expected: Vec<i64> = oracle.range(lo..).map(|(k, _)| *k).collect();
        assert_eq!(got, expected, "range [{lo}, ..] diverged");

        let got: Vec<i64> = tree.range(None, Some(hi)).map(|(k, _)| *k).collect();
        let expected: Vec<i64> = oracle.range(..=hi).map(|(k, _)| *k).collect();
        assert_eq!(got, expected, "range [.., {hi}] diverged");
    }
}

#[test]
fn test_first_and_last_track_extremes() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut tree = OrderedTree::new();
    let mut oracle = BTreeMap::new();

    assert!(tree.first().is_none());
    assert!(tree.last().is_none());

    for _ in 0..300 {
        let key = rng.gen_range(-1_000..1_000i64);
        tree.insert_or_update(key, ());
        oracle.insert(key, ());

        assert_eq!(tree.first().map(|(k, _)| *k), oracle.keys().next().copied());
        assert_eq!(
            tree.last().map(|(k, _)| *k),
            oracle.keys().next_back().copied()
        );
    }
}
