//! Recursive fan-out partition sort.
//!
//! Each call partitions its subrange around the subrange's first element
//! and hands the two resulting halves to independent rayon tasks. The
//! top-level call runs inside a [`rayon::scope`], whose job counter is the
//! completion barrier: every spawned task bumps it, every finished task
//! drops it, and the scope returns only once the whole recursion tree has
//! drained.
//!
//! Subranges are half-open `[lo, hi)`. The pivot ends every partition in
//! its final slot and is excluded from both children, so children are
//! disjoint and strictly shorter than their parent. Sibling tasks never
//! touch the same index and the tree is finite even when another writer
//! scrambles the container mid-sort.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::container::OrderedContainer;

/// Default size at or below which a subrange is sorted in the calling task.
pub const DEFAULT_SEQUENTIAL_CUTOFF: usize = 32;

/// Tuning knobs for the fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Subranges with at most this many elements recurse in the current
    /// task instead of spawning a new one. Zero spawns for every subrange
    /// of two or more elements.
    pub sequential_cutoff: usize,
    /// Pause inserted before a partition hands its halves to new tasks.
    /// Zero disables the pause.
    pub dispatch_delay: Duration,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            sequential_cutoff: DEFAULT_SEQUENTIAL_CUTOFF,
            dispatch_delay: Duration::ZERO,
        }
    }
}

/// What a completed sort did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortReport {
    /// Number of elements in the container when the sort started.
    pub len: usize,
    /// Number of partition steps performed.
    pub partitions: u64,
    /// Number of tasks spawned onto the pool.
    pub spawned_tasks: u64,
    /// Wall-clock duration of the whole sort.
    pub elapsed: Duration,
}

/// Shared counters and options for one sort.
struct SortContext<'a> {
    options: &'a SortOptions,
    partitions: AtomicU64,
    spawned: AtomicU64,
}

/// Sort `container` ascending in place on the current rayon pool.
///
/// Returns only after every element has been placed.
pub fn sort<C>(container: &C, options: &SortOptions) -> SortReport
where
    C: OrderedContainer + ?Sized,
{
    let started = Instant::now();
    let len = container.len();
    let ctx = SortContext {
        options,
        partitions: AtomicU64::new(0),
        spawned: AtomicU64::new(0),
    };

    rayon::scope(|scope| sort_range(scope, container, 0..len, &ctx));

    let report = SortReport {
        len,
        partitions: ctx.partitions.load(Ordering::Relaxed),
        spawned_tasks: ctx.spawned.load(Ordering::Relaxed),
        elapsed: started.elapsed(),
    };
    debug!(
        len = report.len,
        partitions = report.partitions,
        spawned_tasks = report.spawned_tasks,
        elapsed_ms = report.elapsed.as_millis(),
        "partition sort finished"
    );
    report
}

/// Sort `container` ascending in place on a dedicated thread pool.
pub fn sort_in<C>(pool: &rayon::ThreadPool, container: &C, options: &SortOptions) -> SortReport
where
    C: OrderedContainer + ?Sized,
{
    pool.install(|| sort(container, options))
}

fn sort_range<'scope, C>(
    scope: &rayon::Scope<'scope>,
    container: &'scope C,
    range: Range<usize>,
    ctx: &'scope SortContext<'scope>,
) where
    C: OrderedContainer + ?Sized,
{
    let Some(slot) = partition(container, range.start, range.end) else {
        return;
    };
    ctx.partitions.fetch_add(1, Ordering::Relaxed);

    let halves = [range.start..slot, slot.saturating_add(1)..range.end];
    let mut delayed = false;
    for half in halves {
        let len = half.end.saturating_sub(half.start);
        if len < 2 {
            continue;
        }
        if len <= ctx.options.sequential_cutoff {
            sort_range(scope, container, half, ctx);
            continue;
        }
        if !delayed && !ctx.options.dispatch_delay.is_zero() {
            std::thread::sleep(ctx.options.dispatch_delay);
            delayed = true;
        }
        ctx.spawned.fetch_add(1, Ordering::Relaxed);
        scope.spawn(move |scope| sort_range(scope, container, half, ctx));
    }
}

/// Partition `[lo, hi)` around the element at `lo`.
///
/// Returns the pivot's final slot, or `None` when the range holds fewer
/// than two elements. Afterwards every element in `[lo, slot)` orders
/// before the pivot and none in `(slot, hi)` does.
fn partition<C>(container: &C, lo: usize, hi: usize) -> Option<usize>
where
    C: OrderedContainer + ?Sized,
{
    if hi.saturating_sub(lo) < 2 {
        return None;
    }
    let pivot = lo;
    let mut start = lo.saturating_add(1);
    let mut end = hi.saturating_sub(1);
    while start < end {
        if container.less(start, pivot) {
            start = start.saturating_add(1);
        } else {
            container.swap(end, start);
            end = end.saturating_sub(1);
        }
    }
    // start == end here; decide which side of the pivot it belongs to.
    let slot = if container.less(start, pivot) {
        start
    } else {
        start.saturating_sub(1)
    };
    container.swap(pivot, slot);
    Some(slot)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::container::SharedSlice;

    fn shared(values: &[i32]) -> SharedSlice<i32, fn(&i32, &i32) -> bool> {
        SharedSlice::new(values.to_vec(), |a, b| a < b)
    }

    #[test]
    fn partition_places_pivot_at_boundary() {
        let slice = shared(&[4, 7, 1, 9, 3, 4, 2]);
        let slot = partition(&slice, 0, 7).unwrap();
        let values = slice.into_vec();
        assert_eq!(values[slot], 4);
        assert!(values[..slot].iter().all(|&v| v < 4));
        assert!(values[slot + 1..].iter().all(|&v| v >= 4));
    }

    #[test]
    fn partition_when_all_smaller_than_pivot() {
        let slice = shared(&[9, 1, 2, 3]);
        let slot = partition(&slice, 0, 4).unwrap();
        assert_eq!(slot, 3);
        assert_eq!(slice.into_vec()[3], 9);
    }

    #[test]
    fn partition_when_pivot_is_minimum() {
        let slice = shared(&[0, 5, 6, 7]);
        let slot = partition(&slice, 0, 4).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(slice.into_vec()[0], 0);
    }

    #[test]
    fn partition_two_elements() {
        let slice = shared(&[2, 1]);
        assert_eq!(partition(&slice, 0, 2), Some(1));
        assert_eq!(slice.into_vec(), vec![1, 2]);
    }

    #[test]
    fn short_ranges_are_not_partitioned() {
        let slice = shared(&[3, 2, 1]);
        assert_eq!(partition(&slice, 1, 2), None);
        assert_eq!(partition(&slice, 2, 2), None);
    }

    #[test]
    fn children_are_strictly_smaller() {
        let slice = shared(&[5, 5, 5, 5, 5]);
        let slot = partition(&slice, 0, 5).unwrap();
        // Left child [0, slot), right child [slot + 1, 5).
        assert!(slot < 5);
        assert!(5 - (slot + 1) < 5);
    }

    #[test]
    fn report_counts_spawns_above_cutoff() {
        let values: Vec<i32> = (0..64).rev().collect();
        let slice = shared(&values);
        let options = SortOptions {
            sequential_cutoff: 0,
            dispatch_delay: Duration::ZERO,
        };
        let report = sort(&slice, &options);
        assert_eq!(report.len, 64);
        assert!(report.partitions > 0);
        assert!(report.spawned_tasks > 0);
        assert_eq!(slice.into_vec(), (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn sequential_cutoff_above_len_never_spawns() {
        let slice = shared(&[3, 1, 2, 5, 4]);
        let options = SortOptions {
            sequential_cutoff: 100,
            dispatch_delay: Duration::ZERO,
        };
        let report = sort(&slice, &options);
        assert_eq!(report.spawned_tasks, 0);
        assert_eq!(slice.into_vec(), vec![1, 2, 3, 4, 5]);
    }
}
