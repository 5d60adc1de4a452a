//! The ordered-container capability required by the concurrent sort.

use parking_lot::{Mutex, MutexGuard};

use crate::partition::{self, SortOptions, SortReport};

/// A fixed-length sequence that can be reordered in place through a shared
/// reference.
///
/// Sibling sort tasks always operate on disjoint index ranges, but the
/// container itself may be touched by other writers while a sort runs, so
/// every method takes `&self`. Implementations must tolerate indices out of
/// range by returning `false` from [`less`](Self::less) and doing nothing in
/// [`swap`](Self::swap).
pub trait OrderedContainer: Sync {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the container holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the element at `i` orders strictly before the element at `j`.
    fn less(&self, i: usize, j: usize) -> bool;

    /// Exchange the elements at `i` and `j`. Swapping an index with itself
    /// is a no-op.
    fn swap(&self, i: usize, j: usize);
}

/// Adapter giving any element type an [`OrderedContainer`] view through an
/// explicit `less` comparator.
///
/// Each element sits behind its own lock; pairs are always locked in index
/// order so concurrent callers cannot deadlock.
pub struct SharedSlice<T, F> {
    cells: Box<[Mutex<T>]>,
    less: F,
}

impl<T, F> SharedSlice<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Wrap `values`, ordering them with `less`.
    pub fn new(values: Vec<T>, less: F) -> Self {
        Self {
            cells: values.into_iter().map(Mutex::new).collect(),
            less,
        }
    }

    /// Unwrap the (possibly reordered) values.
    pub fn into_vec(self) -> Vec<T> {
        self.cells
            .into_vec()
            .into_iter()
            .map(Mutex::into_inner)
            .collect()
    }

    /// Lock two distinct cells, returning the guards in `(i, j)` order.
    fn lock_pair(&self, i: usize, j: usize) -> Option<(MutexGuard<'_, T>, MutexGuard<'_, T>)> {
        if i == j {
            return None;
        }
        let first = self.cells.get(i.min(j))?.lock();
        let second = self.cells.get(i.max(j))?.lock();
        if i < j {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }
}

impl<T, F> OrderedContainer for SharedSlice<T, F>
where
    T: Send,
    F: Fn(&T, &T) -> bool + Sync,
{
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.lock_pair(i, j)
            .is_some_and(|(a, b)| (self.less)(&*a, &*b))
    }

    fn swap(&self, i: usize, j: usize) {
        if let Some((mut a, mut b)) = self.lock_pair(i, j) {
            std::mem::swap(&mut *a, &mut *b);
        }
    }
}

/// Sort `values` with the concurrent partition sort using an explicit
/// comparator, returning the sorted values and the sort's report.
///
/// Runs on rayon's global pool; use [`SharedSlice`] with
/// [`sort_in`](crate::sort_in) for a dedicated pool.
pub fn sort_by<T, F>(values: Vec<T>, less: F, options: &SortOptions) -> (Vec<T>, SortReport)
where
    T: Send,
    F: Fn(&T, &T) -> bool + Sync,
{
    let shared = SharedSlice::new(values, less);
    let report = partition::sort(&shared, options);
    (shared.into_vec(), report)
}
