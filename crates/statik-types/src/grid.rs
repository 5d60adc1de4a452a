//! Square grid geometry.
//!
//! Cells are stored row-major: the cell at column `x`, row `y` lives at
//! index `y * size + x`. Adjacency is the 4-neighbourhood bounded on each
//! axis separately, so a cell at the end of a row never sees the first cell
//! of the next row as a neighbour.

use serde::{Deserialize, Serialize};

/// Dimensions of an `N x N` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    size: usize,
}

impl GridDims {
    /// Create the dimensions of a `size x size` grid.
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Side length `N`.
    pub const fn size(self) -> usize {
        self.size
    }

    /// Total number of cells, `N * N`. Saturates instead of overflowing.
    pub const fn cell_count(self) -> usize {
        self.size.saturating_mul(self.size)
    }

    /// Row-major index of `(x, y)`, or `None` when outside the grid.
    pub const fn index(self, x: usize, y: usize) -> Option<usize> {
        if x >= self.size || y >= self.size {
            return None;
        }
        match y.checked_mul(self.size) {
            Some(row) => row.checked_add(x),
            None => None,
        }
    }

    /// `(x, y)` coordinates of a row-major index, or `None` when outside
    /// the grid.
    pub const fn coords(self, index: usize) -> Option<(usize, usize)> {
        if index >= self.cell_count() {
            return None;
        }
        match (index.checked_rem(self.size), index.checked_div(self.size)) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Whether the cell lies on the first or last row or column.
    pub const fn is_border(self, index: usize) -> bool {
        let Some((x, y)) = self.coords(index) else {
            return false;
        };
        let last = self.size.saturating_sub(1);
        x == 0 || y == 0 || x == last || y == last
    }

    /// In-grid 4-neighbours of `index`, in the order left, right, up, down.
    ///
    /// Yields nothing for an index outside the grid.
    pub fn neighbors(self, index: usize) -> impl Iterator<Item = usize> {
        let candidates = self.coords(index).map_or([None; 4], |(x, y)| {
            [
                x.checked_sub(1).map(|left| (left, y)),
                x.checked_add(1).map(|right| (right, y)),
                y.checked_sub(1).map(|up| (x, up)),
                y.checked_add(1).map(|down| (x, down)),
            ]
        });
        candidates
            .into_iter()
            .flatten()
            .filter_map(move |(x, y)| self.index(x, y))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn neighbors_of(dims: GridDims, index: usize) -> Vec<usize> {
        dims.neighbors(index).collect()
    }

    #[test]
    fn index_and_coords_agree() {
        let dims = GridDims::new(4);
        assert_eq!(dims.cell_count(), 16);
        assert_eq!(dims.index(3, 2), Some(11));
        assert_eq!(dims.coords(11), Some((3, 2)));
        assert_eq!(dims.index(4, 0), None);
        assert_eq!(dims.coords(16), None);
    }

    #[test]
    fn interior_cell_has_four_neighbors() {
        let dims = GridDims::new(3);
        assert_eq!(neighbors_of(dims, 4), vec![3, 5, 1, 7]);
    }

    #[test]
    fn row_ends_do_not_wrap() {
        let dims = GridDims::new(3);
        // Index 2 is the end of row 0; index 3 starts row 1 and must not
        // be adjacent to it.
        assert_eq!(neighbors_of(dims, 2), vec![1, 5]);
        assert_eq!(neighbors_of(dims, 3), vec![4, 0, 6]);
    }

    #[test]
    fn origin_is_a_valid_neighbor() {
        let dims = GridDims::new(3);
        assert!(neighbors_of(dims, 1).contains(&0));
        assert!(neighbors_of(dims, 3).contains(&0));
    }

    #[test]
    fn out_of_grid_index_has_no_neighbors() {
        let dims = GridDims::new(3);
        assert!(neighbors_of(dims, 9).is_empty());
    }

    #[test]
    fn border_detection() {
        let dims = GridDims::new(3);
        let border: Vec<usize> = (0..9).filter(|&i| dims.is_border(i)).collect();
        assert_eq!(border, vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert!(!dims.is_border(4));
    }
}
