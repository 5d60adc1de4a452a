//! Integration tests for the concurrent partition sort.
//!
//! Exercises the public API against two containers: the comparator-driven
//! `SharedSlice` and a lock-free atomic container shaped like the
//! simulation's scalar field.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statik_sort::{OrderedContainer, SortOptions, sort, sort_by, sort_in};

/// Lock-free container of integers.
struct AtomicInts(Vec<AtomicI64>);

impl AtomicInts {
    fn new(values: &[i64]) -> Self {
        Self(values.iter().map(|&v| AtomicI64::new(v)).collect())
    }

    fn values(&self) -> Vec<i64> {
        self.0.iter().map(|v| v.load(Ordering::Relaxed)).collect()
    }
}

impl OrderedContainer for AtomicInts {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn less(&self, i: usize, j: usize) -> bool {
        match (self.0.get(i), self.0.get(j)) {
            (Some(a), Some(b)) => a.load(Ordering::Relaxed) < b.load(Ordering::Relaxed),
            _ => false,
        }
    }

    fn swap(&self, i: usize, j: usize) {
        if let (Some(a), Some(b)) = (self.0.get(i), self.0.get(j)) {
            let vb = b.load(Ordering::Relaxed);
            let va = a.swap(vb, Ordering::Relaxed);
            b.store(va, Ordering::Relaxed);
        }
    }
}

fn eager() -> SortOptions {
    SortOptions {
        sequential_cutoff: 0,
        dispatch_delay: Duration::ZERO,
    }
}

fn is_sorted(values: &[i64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

#[test]
fn sorts_small_example() {
    let (sorted, _) = sort_by(vec![5, 3, 4, 1], |a: &i32, b: &i32| a < b, &eager());
    assert_eq!(sorted, vec![1, 3, 4, 5]);
}

#[test]
fn sorts_duplicates() {
    let (sorted, _) = sort_by(vec![2, 2, 1], |a: &i32, b: &i32| a < b, &eager());
    assert_eq!(sorted, vec![1, 2, 2]);
}

#[test]
fn empty_and_single_are_noops() {
    let empty = AtomicInts::new(&[]);
    let report = sort(&empty, &eager());
    assert_eq!(report.len, 0);
    assert_eq!(report.partitions, 0);

    let single = AtomicInts::new(&[42]);
    let report = sort(&single, &eager());
    assert_eq!(report.partitions, 0);
    assert_eq!(single.values(), vec![42]);
}

#[test]
fn random_permutations_sort_and_preserve_multiset() {
    let mut rng = StdRng::seed_from_u64(7);
    for len in [2_usize, 3, 10, 97, 1000, 5000] {
        let input: Vec<i64> = (0..len).map(|_| rng.random_range(-50..50)).collect();
        let container = AtomicInts::new(&input);
        let report = sort(&container, &eager());
        let output = container.values();

        assert_eq!(report.len, len);
        assert!(is_sorted(&output), "len {len} not sorted");

        let mut expected = input;
        expected.sort_unstable();
        assert_eq!(output, expected, "len {len} lost or gained values");
    }
}

#[test]
fn already_sorted_and_reversed_inputs() {
    let ascending: Vec<i64> = (0..300).collect();
    let descending: Vec<i64> = (0..300).rev().collect();
    for input in [ascending.clone(), descending] {
        let container = AtomicInts::new(&input);
        sort(&container, &SortOptions::default());
        assert_eq!(container.values(), ascending);
    }
}

#[test]
fn dedicated_pool_and_dispatch_delay() {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    let options = SortOptions {
        sequential_cutoff: 8,
        dispatch_delay: Duration::from_millis(1),
    };
    let input: Vec<i64> = (0..200).map(|i| (i * 37) % 101).collect();
    let container = AtomicInts::new(&input);
    let report = sort_in(&pool, &container, &options);
    assert!(report.spawned_tasks > 0);
    assert!(is_sorted(&container.values()));
}

#[test]
fn terminates_while_another_writer_scrambles_values() {
    let input: Vec<i64> = (0..4000).rev().collect();
    let container = Arc::new(AtomicInts::new(&input));
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let container = Arc::clone(&container);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(99);
            while !stop.load(Ordering::Relaxed) {
                let idx = rng.random_range(0..container.0.len());
                container.0[idx].store(rng.random_range(0..4000), Ordering::Relaxed);
            }
        })
    };

    let report = sort(container.as_ref(), &eager());
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    assert_eq!(report.len, 4000);
    assert_eq!(container.len(), 4000);
}
