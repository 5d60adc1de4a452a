//! Freeze/unfreeze propagation automaton.
//!
//! Every cell carries a [`FreezeState`]. The border starts near-frozen and
//! the interior unfrozen. When a near-frozen cell freezes, its neighbours
//! are pulled to near-frozen, and any neighbour that was already frozen is
//! thawed together with its own non-frozen neighbours. The advancing front
//! eats the trail it leaves behind, which is what draws the snaking tubes.
//!
//! # Rules
//!
//! - Adjacency is the row/column bounded 4-neighbourhood from
//!   [`GridDims::neighbors`].
//! - Propagation runs off an explicit worklist. Each cell is thawed at most
//!   once per propagation (visited stamps), so a propagation always
//!   terminates.
//! - Border cells never rest in [`FreezeState::Unfrozen`]; a thaw that lands
//!   on the border leaves the cell near-frozen.

use std::collections::VecDeque;

use statik_types::{FreezeState, GridDims};
use tracing::trace;

/// One unit of propagation work.
#[derive(Debug, Clone, Copy)]
enum Wave {
    /// A cell just froze; pull its neighbours towards freezing.
    Freeze(usize),
    /// A previously frozen cell is thawed along with its neighbours.
    Thaw(usize),
}

/// What a single propagation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Neighbours newly moved to near-frozen.
    pub near_frozen: usize,
    /// Previously frozen cells that were thawed.
    pub thawed: usize,
    /// Non-frozen cells reset around thawed cells.
    pub reset: usize,
}

/// Tri-state freeze map over the grid.
#[derive(Debug, Clone)]
pub struct FreezeMap {
    dims: GridDims,
    states: Vec<FreezeState>,
    frozen: usize,
    stamps: Vec<u32>,
    epoch: u32,
    work: VecDeque<Wave>,
}

impl FreezeMap {
    /// Border near-frozen, interior unfrozen.
    pub fn new(dims: GridDims) -> Self {
        let cells = dims.cell_count();
        let states = (0..cells)
            .map(|index| {
                if dims.is_border(index) {
                    FreezeState::NearFrozen
                } else {
                    FreezeState::Unfrozen
                }
            })
            .collect();
        Self {
            dims,
            states,
            frozen: 0,
            stamps: vec![0; cells],
            epoch: 0,
            work: VecDeque::new(),
        }
    }

    /// Grid dimensions.
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// State of `index` ([`FreezeState::Unfrozen`] outside the grid).
    pub fn state(&self, index: usize) -> FreezeState {
        self.states.get(index).copied().unwrap_or_default()
    }

    /// Whether `index` is frozen.
    pub fn is_frozen(&self, index: usize) -> bool {
        self.state(index).is_frozen()
    }

    /// Number of frozen cells.
    pub const fn frozen_count(&self) -> usize {
        self.frozen
    }

    /// All states in row-major order.
    pub fn states(&self) -> &[FreezeState] {
        &self.states
    }

    /// Overwrite the state of `index` without propagating. Returns `true`
    /// when the state changed.
    pub fn set_state(&mut self, index: usize, state: FreezeState) -> bool {
        let Some(slot) = self.states.get_mut(index) else {
            return false;
        };
        let previous = *slot;
        if previous == state {
            return false;
        }
        *slot = state;
        if previous.is_frozen() {
            self.frozen = self.frozen.saturating_sub(1);
        } else if state.is_frozen() {
            self.frozen = self.frozen.saturating_add(1);
        }
        true
    }

    /// Freeze `index` if it is near-frozen and `fraction` is below
    /// `threshold`, then propagate. Returns the propagation when the cell
    /// froze.
    pub fn try_freeze(&mut self, index: usize, fraction: f64, threshold: f64) -> Option<Propagation> {
        // NaN compares false, so a non-finite value never freezes.
        let below = fraction < threshold;
        if self.state(index) != FreezeState::NearFrozen || !below {
            return None;
        }
        self.set_state(index, FreezeState::Frozen);
        Some(self.propagate(index))
    }

    /// Run propagate-freeze outward from `origin`, which is expected to
    /// have just frozen.
    pub fn propagate(&mut self, origin: usize) -> Propagation {
        self.next_epoch();
        self.mark(origin);
        self.work.clear();
        self.work.push_back(Wave::Freeze(origin));

        let mut outcome = Propagation::default();
        while let Some(wave) = self.work.pop_front() {
            match wave {
                Wave::Freeze(cell) => {
                    for neighbor in self.dims.neighbors(cell) {
                        if self.is_frozen(neighbor) {
                            if self.mark(neighbor) {
                                self.work.push_back(Wave::Thaw(neighbor));
                            }
                        } else if self.set_state(neighbor, FreezeState::NearFrozen) {
                            outcome.near_frozen = outcome.near_frozen.saturating_add(1);
                        }
                    }
                }
                Wave::Thaw(cell) => {
                    if self.set_state(cell, self.resting_state(cell)) {
                        outcome.thawed = outcome.thawed.saturating_add(1);
                    }
                    for neighbor in self.dims.neighbors(cell) {
                        if !self.is_frozen(neighbor)
                            && self.set_state(neighbor, self.resting_state(neighbor))
                        {
                            outcome.reset = outcome.reset.saturating_add(1);
                        }
                    }
                }
            }
        }
        trace!(
            origin,
            near_frozen = outcome.near_frozen,
            thawed = outcome.thawed,
            reset = outcome.reset,
            "freeze propagated"
        );
        outcome
    }

    /// Where a thawed cell comes to rest.
    fn resting_state(&self, index: usize) -> FreezeState {
        if self.dims.is_border(index) {
            FreezeState::NearFrozen
        } else {
            FreezeState::Unfrozen
        }
    }

    fn next_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.stamps.fill(0);
            self.epoch = 1;
        }
    }

    /// Mark `index` visited in the current epoch. Returns `true` the first
    /// time.
    fn mark(&mut self, index: usize) -> bool {
        match self.stamps.get_mut(index) {
            Some(stamp) if *stamp != self.epoch => {
                *stamp = self.epoch;
                true
            }
            _ => false,
        }
    }
}
