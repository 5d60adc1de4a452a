//! Enumeration types for the Statik simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Freeze State
// ---------------------------------------------------------------------------

/// Per-cell lock status maintained by the freeze automaton.
///
/// The forward path is `Unfrozen -> NearFrozen -> Frozen`. A frozen cell
/// only leaves `Frozen` through an unfreeze wave started by a neighbour
/// freezing next to it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FreezeState {
    /// The cell evolves freely and cannot freeze this tick.
    #[default]
    Unfrozen = 0,
    /// The cell freezes as soon as its fractional value drops below the
    /// freeze threshold.
    NearFrozen = 1,
    /// The cell's value is locked; the update engine skips it.
    Frozen = 2,
}

impl FreezeState {
    /// Whether the cell's value is currently locked.
    pub const fn is_frozen(self) -> bool {
        matches!(self, Self::Frozen)
    }
}

// ---------------------------------------------------------------------------
// Sort Policy
// ---------------------------------------------------------------------------

/// How a triggered sort shares the scalar field with the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Sort the live field while ticks keep mutating it. Sorted runs and
    /// stochastic updates interleave cell by cell.
    #[default]
    Interleaved,
    /// Hold the field's write gate for the whole sort. Ticks that arrive
    /// while the gate is held are skipped.
    Exclusive,
    /// Copy the field, sort the copy off-line, then write the sorted values
    /// back. Tick updates made while the copy was sorting are discarded.
    Snapshot,
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Interleaved => "interleaved",
            Self::Exclusive => "exclusive",
            Self::Snapshot => "snapshot",
        };
        f.write_str(name)
    }
}
