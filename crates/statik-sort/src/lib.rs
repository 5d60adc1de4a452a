//! Concurrent in-place partition sort for the Statik simulation.
//!
//! The sort works against any [`OrderedContainer`]: a sequence that can
//! compare and swap two of its elements through a shared reference. That
//! shape lets the simulation's live scalar field be sorted while the tick
//! loop is still writing to it.
//!
//! # Modules
//!
//! - [`container`] -- the [`OrderedContainer`] capability and the
//!   comparator-driven [`SharedSlice`] adapter.
//! - [`partition`] -- the recursive fan-out sort, its [`SortOptions`] and
//!   the [`SortReport`] it produces.

pub mod container;
pub mod partition;

pub use container::{OrderedContainer, SharedSlice, sort_by};
pub use partition::{SortOptions, SortReport, sort, sort_in};
