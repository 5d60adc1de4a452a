//! Tick counter and global stage.
//!
//! The clock is the single source of truth for the simulation's temporal
//! state: how many passes have run and which stage newly eligible cells
//! adopt. Both only move forward; the stage wraps modulo
//! [`MAX_STAGE`](statik_types::MAX_STAGE).

use statik_types::Stage;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Tick counter plus the process-wide global stage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageClock {
    /// Passes completed so far.
    tick: u64,

    /// Stage cells adopt once their fractional value is low enough.
    stage: Stage,

    /// Number of stage advances so far.
    stage_changes: u64,
}

impl StageClock {
    /// A clock at tick 0 on [`Stage::ZERO`].
    pub const fn new() -> Self {
        Self {
            tick: 0,
            stage: Stage::ZERO,
            stage_changes: 0,
        }
    }

    /// Passes completed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Current global stage.
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Number of stage advances so far.
    pub const fn stage_changes(&self) -> u64 {
        self.stage_changes
    }

    /// Count one more pass and return the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter is exhausted.
    pub fn advance_tick(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Move the global stage forward by one, wrapping after the last stage.
    pub const fn advance_stage(&mut self) -> Stage {
        self.stage = self.stage.next();
        self.stage_changes = self.stage_changes.saturating_add(1);
        self.stage
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = StageClock::new();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.stage(), Stage::ZERO);
    }

    #[test]
    fn stage_wraps_after_six_advances() {
        let mut clock = StageClock::new();
        for _ in 0..6 {
            clock.advance_stage();
        }
        assert_eq!(clock.stage(), Stage::ZERO);
        assert_eq!(clock.stage_changes(), 6);
        assert_eq!(clock.advance_stage().value(), 1);
    }

    #[test]
    fn tick_overflow_is_reported() {
        let mut clock = StageClock::new();
        assert_eq!(clock.advance_tick().unwrap(), 1);
        clock.tick = u64::MAX;
        assert_eq!(clock.advance_tick(), Err(ClockError::TickOverflow));
    }
}
