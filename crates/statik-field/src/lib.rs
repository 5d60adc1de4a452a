//! Scalar field, freeze automaton, and staged update engine for the Statik
//! simulation.
//!
//! # Modules
//!
//! - [`error`] -- [`FieldError`] for construction-time failures.
//! - [`field`] -- [`ScalarField`], the shared `N x N` grid of values.
//! - [`freeze`] -- [`FreezeMap`], the freeze/unfreeze propagation automaton.
//! - [`random`] -- [`RandomBuffer`], the cyclic pre-drawn value buffer.
//! - [`rules`] -- [`UpdateRule`] and its tunable [`RuleParams`].
//! - [`stages`] -- [`StageMap`], the per-cell stage labels.
//! - [`engine`] -- [`StagedUpdateEngine`], the per-tick pass over the grid.

pub mod engine;
pub mod error;
pub mod field;
pub mod freeze;
pub mod random;
pub mod rules;
pub mod stages;

pub use engine::{MIN_GRID_SIZE, StagedUpdateEngine, TickSummary, display_intensity};
pub use error::FieldError;
pub use field::ScalarField;
pub use freeze::{FreezeMap, Propagation};
pub use random::RandomBuffer;
pub use rules::{RuleParams, UpdateRule};
pub use stages::StageMap;
