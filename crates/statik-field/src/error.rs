//! Error types for the `statik-field` crate.

/// Errors raised while building field state.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// The grid is too small to hold a border and a random buffer cycle.
    #[error("grid size {size} is too small (minimum {minimum})")]
    GridTooSmall {
        /// Requested side length.
        size: usize,
        /// Smallest accepted side length.
        minimum: usize,
    },

    /// A value slice does not match the grid's cell count.
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch {
        /// Number of cells in the grid.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
}
