//! Tick callback that logs periodic progress.

use statik_core::runner::TickCallback;
use statik_core::simulation::Simulation;
use statik_field::TickSummary;
use tracing::{debug, info};

/// Logs a summary line every `every` passes.
pub struct ProgressCallback {
    every: u64,
    adopted: u64,
    newly_frozen: u64,
}

impl ProgressCallback {
    /// Report every `every` passes (0 disables the report).
    pub const fn new(every: u64) -> Self {
        Self {
            every,
            adopted: 0,
            newly_frozen: 0,
        }
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
        self.adopted = self.adopted.saturating_add(widen(summary.adopted));
        self.newly_frozen = self
            .newly_frozen
            .saturating_add(widen(summary.newly_frozen));

        if summary.thawed > 0 {
            debug!(tick = summary.tick, thawed = summary.thawed, "Frozen cells thawed");
        }

        if summary.tick.checked_rem(self.every) != Some(0) {
            return;
        }
        let operator = simulation.operator();
        info!(
            tick = summary.tick,
            global_stage = summary.global_stage.value(),
            frozen = summary.frozen_total,
            adopted = self.adopted,
            newly_frozen = self.newly_frozen,
            skipped_ticks = simulation.skipped_ticks(),
            sorts_in_flight = operator.sorts_in_flight(),
            sorts_completed = operator.sorts_completed(),
            "Progress"
        );
        self.adopted = 0;
        self.newly_frozen = 0;
    }
}

fn widen(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}
