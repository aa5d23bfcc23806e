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

//! Composite-index soundness tests: every range-narrowed scan must return
//! exactly the records a brute-force filter over the same data returns.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use deepindex::{analyze, resolve_all, CompositeIndex, Field, Predicate, Value};

#[derive(Debug, Clone, PartialEq)]
struct Reading {
    sensor: i64,
    hour: i64,
    celsius: f64,
}

fn sensor() -> Field<Reading> {
    Field::new("sensor", |r: &Reading| Value::integer(r.sensor))
}

fn hour() -> Field<Reading> {
    Field::new("hour", |r: &Reading| Value::integer(r.hour))
}

fn celsius() -> Field<Reading> {
    Field::new("celsius", |r: &Reading| Value::float(r.celsius))
}

fn random_readings(seed: u64, count: usize) -> Vec<Reading> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Reading {
            sensor: rng.gen_range(0..20),
            hour: rng.gen_range(0..24),
            celsius: (rng.gen_range(-200..450) as f64) / 10.0,
        })
        .collect()
}

fn build_index(readings: &[Reading]) -> CompositeIndex<Reading> {
    let mut index =
        CompositeIndex::new(vec![sensor(), hour(), celsius()], false).expect("valid columns");
    for r in readings {
        index.insert(r.clone()).expect("non-unique insert");
    }
    index
}

/// Scan with extracted ranges and compare against filtering everything
fn assert_scan_sound(index: &CompositeIndex<Reading>, data: &[Reading], p: &Predicate<Reading>) {
    let ranges = Arc::new(resolve_all(&analyze(p)));
    let mut got: Vec<Reading> = index.scan(p, ranges).cloned().collect();
    let mut expected: Vec<Reading> = data.iter().filter(|r| p.matches(r)).cloned().collect();

    let key = |r: &Reading| (r.sensor, r.hour, (r.celsius * 10.0) as i64);
    got.sort_by_key(key);
    expected.sort_by_key(key);
    assert_eq!(got, expected);
}

#[test]
fn test_scan_matches_brute_force() {
    let data = random_readings(11, 500);
    let index = build_index(&data);
    assert_eq!(index.len(), data.len());

    let predicates = vec![
        sensor().eq(3),
        sensor().eq(3).and(hour().between(6, 18)),
        hour().ge(22),
        celsius().lt(0.0),
        sensor().between(5, 10).and(celsius().ge(20.0)),
        sensor().eq(1).or(sensor().eq(19)),
        sensor().le(2).or(sensor().ge(18).and(hour().lt(12))),
        hour().eq(0).and(hour().eq(1)),
        sensor().ne(4),
        sensor().gt(7).not(),
    ];
    for p in &predicates {
        assert_scan_sound(&index, &data, p);
    }
}

#[test]
fn test_scan_sound_after_removals() {
    let mut data = random_readings(77, 300);
    let mut index = build_index(&data);

    // Drop every reading of the even sensors; removal is by key path, so
    // same-path survivors must be removed from the expectation too
    let removed: Vec<Reading> = data.iter().filter(|r| r.sensor % 2 == 0).cloned().collect();
    for r in &removed {
        index.remove(r);
    }
    data.retain(|r| r.sensor % 2 != 0);
    assert_eq!(index.len(), data.len());

    assert_scan_sound(&index, &data, &sensor().between(0, 9));
    assert_scan_sound(&index, &data, &hour().eq(12));
}

#[test]
fn test_range_boundaries_are_inclusive_of_matches() {
    let data = vec![
        Reading {
            sensor: 1,
            hour: 0,
            celsius: 10.0,
        },
        Reading {
            sensor: 2,
            hour: 0,
            celsius: 20.0,
        },
        Reading {
            sensor: 3,
            hour: 0,
            celsius: 30.0,
        },
    ];
    let index = build_index(&data);

    // Strict bounds derive inclusive scan ranges; the predicate re-check
    // trims the boundary records
    let p = sensor().gt(1).and(sensor().lt(3));
    let ranges = Arc::new(resolve_all(&analyze(&p)));
    let got: Vec<i64> = index.scan(&p, ranges).map(|r| r.sensor).collect();
    assert_eq!(got, vec![2]);
}

#[test]
fn test_duplicate_key_paths_all_enumerated() {
    let mut index = CompositeIndex::new(vec![sensor()], false).expect("columns");
    for i in 0..5i64 {
        index
            .insert(Reading {
                sensor: 7,
                hour: i,
                celsius: 0.0,
            })
            .expect("insert");
    }
    assert_eq!(index.len(), 5);

    let p = sensor().eq(7);
    let ranges = Arc::new(resolve_all(&analyze(&p)));
    let hours: Vec<i64> = index.scan(&p, ranges).map(|r| r.hour).collect();
    assert_eq!(hours, vec![0, 1, 2, 3, 4], "insertion order within a key");
}

#[test]
fn test_unique_index_round_trip() {
    let mut index = CompositeIndex::new(vec![sensor(), hour()], true).expect("columns");
    let mut rng = StdRng::seed_from_u64(3);

    let mut keys: Vec<(i64, i64)> = (0..10)
        .flat_map(|s| (0..24).map(move |h| (s, h)))
        .collect();
    for i in (1..keys.len()).rev() {
        keys.swap(i, rng.gen_range(0..=i));
    }

    for &(s, h) in &keys {
        index
            .insert(Reading {
                sensor: s,
                hour: h,
                celsius: 0.0,
            })
            .expect("unique key path");
    }
    assert_eq!(index.len(), 240);

    // Everything comes back in composite key order regardless of the
    // insertion shuffle
    let enumerated: Vec<(i64, i64)> = index.iter().map(|r| (r.sensor, r.hour)).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(enumerated, sorted);

    for &(s, h) in keys.iter().take(50) {
        assert!(index.remove(&Reading {
            sensor: s,
            hour: h,
            celsius: 0.0,
        }));
    }
    assert_eq!(index.len(), 190);
}
