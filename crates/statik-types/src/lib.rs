//! Shared type definitions for the Statik field simulation.
//!
//! Every crate in the workspace speaks in these types: the grid geometry,
//! the per-cell stage and freeze labels, and the policy that decides how a
//! triggered sort shares the field with the running simulation.
//!
//! # Modules
//!
//! - [`enums`] -- [`FreezeState`] and [`SortPolicy`]
//! - [`grid`] -- [`GridDims`], row-major indexing and bounded adjacency
//! - [`stage`] -- [`Stage`], the wrapping update-rule selector

pub mod enums;
pub mod grid;
pub mod stage;

pub use enums::{FreezeState, SortPolicy};
pub use grid::GridDims;
pub use stage::{InvalidStage, MAX_STAGE, Stage};
