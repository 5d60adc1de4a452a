//! The staged update engine: one row-major pass over the grid per tick.
//!
//! For every cell, in order:
//!
//! 1. **Stage gate** -- the cell adopts the global stage if its fractional
//!    value is below the adoption threshold.
//! 2. **Freeze gate** -- a near-frozen cell whose fractional value is below
//!    the freeze threshold freezes and propagates.
//! 3. **Skip** -- frozen cells are left untouched for the rest of the pass.
//! 4. **Update** -- the rule picked by the cell's own stage produces an
//!    increment, which is damped and added to the value.
//! 5. **Display** -- the cell's display intensity is written to the frame.
//!
//! The fractional value used by the gates is the truncated remainder
//! `value % 1`, so negative values gate as negative fractions. Display
//! intensity uses the euclidean remainder and always lands in `[0, 1)`.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statik_types::{GridDims, Stage};
use tracing::debug;

use crate::error::FieldError;
use crate::field::ScalarField;
use crate::freeze::FreezeMap;
use crate::random::RandomBuffer;
use crate::rules::{RuleParams, UpdateRule};
use crate::stages::StageMap;

/// Smallest grid the engine accepts. The short buffer cycle needs at least
/// one element.
pub const MIN_GRID_SIZE: usize = 2;

/// Counters describing one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick number of the pass (1 for the first pass).
    pub tick: u64,
    /// Global stage the pass ran under.
    pub global_stage: Stage,
    /// Cells that adopted the global stage during the pass.
    pub adopted: usize,
    /// Cells that froze during the pass.
    pub newly_frozen: usize,
    /// Frozen cells thawed by propagation during the pass.
    pub thawed: usize,
    /// Frozen cells skipped by the pass.
    pub skipped: usize,
    /// Frozen cells after the pass.
    pub frozen_total: usize,
}

/// Map a raw value to a display intensity in `[0, 1)`.
#[allow(clippy::cast_possible_truncation)]
pub fn display_intensity(value: f64) -> f32 {
    value.rem_euclid(1.0) as f32
}

/// Per-tick simulation core. Owns the stage labels, the freeze map and the
/// random sources; shares the scalar field.
#[derive(Debug)]
pub struct StagedUpdateEngine {
    field: Arc<ScalarField>,
    stages: StageMap,
    freeze: FreezeMap,
    random: RandomBuffer,
    rng: StdRng,
    params: RuleParams,
    ticks: u64,
}

impl StagedUpdateEngine {
    /// Build an engine over a fresh `size x size` field filled with uniform
    /// values in `[0, 1)`, all drawn from `seed`.
    pub fn seeded(size: usize, params: RuleParams, seed: u64) -> Result<Self, FieldError> {
        check_size(size)?;
        let dims = GridDims::new(size);
        let mut rng = StdRng::seed_from_u64(seed);
        let values: Vec<f64> = (0..dims.cell_count()).map(|_| rng.random::<f64>()).collect();
        let field = Arc::new(ScalarField::from_values(dims, &values)?);
        Ok(Self::assemble(field, params, rng))
    }

    /// Build an engine over an existing field. The random buffer and the
    /// fresh-draw rule are still seeded from `seed`.
    pub fn with_field(field: Arc<ScalarField>, params: RuleParams, seed: u64) -> Result<Self, FieldError> {
        check_size(field.dims().size())?;
        Ok(Self::assemble(field, params, StdRng::seed_from_u64(seed)))
    }

    fn assemble(field: Arc<ScalarField>, params: RuleParams, mut rng: StdRng) -> Self {
        let dims = field.dims();
        let random = RandomBuffer::draw(dims.size(), &mut rng);
        Self {
            stages: StageMap::new(dims.cell_count()),
            freeze: FreezeMap::new(dims),
            random,
            rng,
            params,
            ticks: 0,
            field,
        }
    }

    /// The shared field.
    pub const fn field(&self) -> &Arc<ScalarField> {
        &self.field
    }

    /// Per-cell stage labels.
    pub const fn stages(&self) -> &StageMap {
        &self.stages
    }

    /// Mutable stage labels.
    pub const fn stages_mut(&mut self) -> &mut StageMap {
        &mut self.stages
    }

    /// Freeze map.
    pub const fn freeze(&self) -> &FreezeMap {
        &self.freeze
    }

    /// Mutable freeze map.
    pub const fn freeze_mut(&mut self) -> &mut FreezeMap {
        &mut self.freeze
    }

    /// Rule constants.
    pub const fn params(&self) -> &RuleParams {
        &self.params
    }

    /// Number of passes run so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one pass under `global`, writing each updated cell's display
    /// intensity into `intensity` (row-major; cells beyond its length are
    /// updated but not displayed).
    pub fn tick(&mut self, global: Stage, intensity: &mut [f32]) -> TickSummary {
        self.ticks = self.ticks.saturating_add(1);
        let mut summary = TickSummary {
            tick: self.ticks,
            global_stage: global,
            ..TickSummary::default()
        };

        for index in 0..self.field.dims().cell_count() {
            let Some(value) = self.field.get(index) else {
                continue;
            };
            let fraction = value % 1.0;

            if self
                .stages
                .adopt(index, global, fraction < self.params.adoption_threshold)
            {
                summary.adopted = summary.adopted.saturating_add(1);
            }

            if let Some(propagation) =
                self.freeze
                    .try_freeze(index, fraction, self.params.freeze_threshold)
            {
                summary.newly_frozen = summary.newly_frozen.saturating_add(1);
                summary.thawed = summary.thawed.saturating_add(propagation.thawed);
            }

            if self.freeze.is_frozen(index) {
                summary.skipped = summary.skipped.saturating_add(1);
                continue;
            }

            let updated = self.apply_rule(self.stages.get(index), value);
            self.field.set(index, updated);
            if let Some(pixel) = intensity.get_mut(index) {
                *pixel = display_intensity(updated);
            }
        }

        summary.frozen_total = self.freeze.frozen_count();
        debug!(
            tick = summary.tick,
            global_stage = summary.global_stage.value(),
            adopted = summary.adopted,
            newly_frozen = summary.newly_frozen,
            thawed = summary.thawed,
            frozen_total = summary.frozen_total,
            "pass complete"
        );
        summary
    }

    /// New value of a cell currently holding `value` under `stage`.
    fn apply_rule(&mut self, stage: Stage, value: f64) -> f64 {
        let p = &self.params;
        let (base, increment) = match UpdateRule::from(stage) {
            UpdateRule::Fresh => (value, self.rng.random::<f64>()),
            UpdateRule::Constant => (value, p.constant_increment),
            UpdateRule::LinearDecay => (value, -p.linear_decay * value),
            UpdateRule::LineBuffer => (value, self.random.next_line()),
            UpdateRule::ShortBuffer => {
                let (drawn, wrapped) = self.random.next_short();
                (if wrapped { 0.0 } else { value }, drawn)
            }
            UpdateRule::SquareDecay => (value, -p.square_decay * value * value),
        };
        increment.mul_add(self.params.damping, base)
    }
}

const fn check_size(size: usize) -> Result<(), FieldError> {
    if size < MIN_GRID_SIZE {
        return Err(FieldError::GridTooSmall {
            size,
            minimum: MIN_GRID_SIZE,
        });
    }
    Ok(())
}
