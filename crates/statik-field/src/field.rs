//! The shared scalar field.
//!
//! Values are stored as `f64` bit patterns in [`AtomicU64`] cells so the
//! tick loop and an in-flight sort can read and write the same cells at the
//! same time without undefined behaviour. No ordering between cells is
//! implied: a concurrent writer can observe a swap half-done, exactly like
//! a plain unsynchronised slice.
//!
//! A separate read/write gate lets callers opt into serialisation. The tick
//! pass takes the shared side with [`ScalarField::try_share`]; exclusive
//! and snapshot sorts take the write side with
//! [`ScalarField::lock_exclusive`].

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use statik_sort::OrderedContainer;
use statik_types::GridDims;

use crate::error::FieldError;

/// Row-major `N x N` grid of unbounded `f64` values.
#[derive(Debug)]
pub struct ScalarField {
    dims: GridDims,
    cells: Box<[AtomicU64]>,
    gate: RwLock<()>,
}

impl ScalarField {
    /// A field with every cell set to zero.
    pub fn zeroed(dims: GridDims) -> Self {
        let zero = 0.0_f64.to_bits();
        Self {
            dims,
            cells: (0..dims.cell_count()).map(|_| AtomicU64::new(zero)).collect(),
            gate: RwLock::new(()),
        }
    }

    /// A field holding `values` in row-major order.
    pub fn from_values(dims: GridDims, values: &[f64]) -> Result<Self, FieldError> {
        let expected = dims.cell_count();
        if values.len() != expected {
            return Err(FieldError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            dims,
            cells: values.iter().map(|v| AtomicU64::new(v.to_bits())).collect(),
            gate: RwLock::new(()),
        })
    }

    /// Grid dimensions.
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Value at `index`, or `None` outside the grid.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.cells
            .get(index)
            .map(|cell| f64::from_bits(cell.load(Ordering::Relaxed)))
    }

    /// Overwrite the value at `index`. Ignored outside the grid.
    pub fn set(&self, index: usize, value: f64) {
        if let Some(cell) = self.cells.get(index) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    /// Copy of every value in row-major order.
    pub fn values(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|cell| f64::from_bits(cell.load(Ordering::Relaxed)))
            .collect()
    }

    /// Overwrite every cell from `values`.
    pub fn store_all(&self, values: &[f64]) -> Result<(), FieldError> {
        if values.len() != self.cells.len() {
            return Err(FieldError::LengthMismatch {
                expected: self.cells.len(),
                actual: values.len(),
            });
        }
        for (cell, value) in self.cells.iter().zip(values) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
        Ok(())
    }

    /// Take the shared side of the gate if no exclusive holder exists.
    pub fn try_share(&self) -> Option<RwLockReadGuard<'_, ()>> {
        self.gate.try_read()
    }

    /// Block until the gate can be held exclusively.
    pub fn lock_exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write()
    }
}

impl OrderedContainer for ScalarField {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn less(&self, i: usize, j: usize) -> bool {
        match (self.get(i), self.get(j)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    fn swap(&self, i: usize, j: usize) {
        if i == j {
            return;
        }
        if let (Some(a), Some(b)) = (self.cells.get(i), self.cells.get(j)) {
            let from_b = b.load(Ordering::Relaxed);
            let from_a = a.swap(from_b, Ordering::Relaxed);
            b.store(from_a, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use statik_sort::{SortOptions, sort};

    use super::*;

    #[test]
    fn from_values_checks_length() {
        let dims = GridDims::new(2);
        assert!(ScalarField::from_values(dims, &[1.0, 2.0, 3.0]).is_err());
        let field = ScalarField::from_values(dims, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(field.get(3), Some(4.0));
        assert_eq!(field.get(4), None);
    }

    #[test]
    fn set_and_get_round_trip_negative_and_large() {
        let field = ScalarField::zeroed(GridDims::new(2));
        field.set(0, -3.25);
        field.set(1, 1.0e9);
        field.set(9, 5.0);
        assert_eq!(field.values(), vec![-3.25, 1.0e9, 0.0, 0.0]);
    }

    #[test]
    fn sorts_as_ordered_container() {
        let dims = GridDims::new(3);
        let values = [0.9, 2.5, -1.0, 0.1, 0.1, 7.0, 3.3, 0.0, 1.5];
        let field = ScalarField::from_values(dims, &values).unwrap();
        sort(&field, &SortOptions::default());
        assert_eq!(
            field.values(),
            vec![-1.0, 0.0, 0.1, 0.1, 0.9, 1.5, 2.5, 3.3, 7.0]
        );
    }

    #[test]
    fn shared_gate_unavailable_while_exclusive() {
        let field = ScalarField::zeroed(GridDims::new(2));
        {
            let _write = field.lock_exclusive();
            assert!(field.try_share().is_none());
        }
        assert!(field.try_share().is_some());
    }

    #[test]
    fn store_all_rejects_wrong_length() {
        let field = ScalarField::zeroed(GridDims::new(2));
        assert!(field.store_all(&[1.0]).is_err());
        field.store_all(&[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(field.get(0), Some(4.0));
    }
}
