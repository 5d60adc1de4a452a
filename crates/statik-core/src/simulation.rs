//! The simulation context.
//!
//! [`Simulation`] owns everything a running field needs: the update engine,
//! the stage clock, the frame buffer and its sink, the sort coordinator and
//! the shared operator state. Nothing lives in globals; the runner drives a
//! `Simulation` and tests can drive one directly, a pass at a time.

use std::sync::Arc;

use statik_field::{FieldError, StagedUpdateEngine, TickSummary};
use statik_types::Stage;
use tracing::{debug, info};

use crate::clock::{ClockError, StageClock};
use crate::config::SimulationConfig;
use crate::frame::{Frame, FrameBuffer, FrameSink};
use crate::operator::OperatorState;
use crate::sorter::{SortCoordinator, SortHandle, SorterError};

/// Errors raised while building or stepping a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The field or engine could not be built.
    #[error("field error: {source}")]
    Field {
        /// The underlying field error.
        #[from]
        source: FieldError,
    },

    /// The sort pool could not be built.
    #[error("sorter error: {source}")]
    Sorter {
        /// The underlying sorter error.
        #[from]
        source: SorterError,
    },

    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// A running field and everything it talks to.
pub struct Simulation {
    engine: StagedUpdateEngine,
    clock: StageClock,
    frame: Arc<FrameBuffer>,
    sink: Arc<dyn FrameSink>,
    sorter: SortCoordinator,
    operator: Arc<OperatorState>,
    skipped_ticks: u64,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("clock", &self.clock)
            .field("policy", &self.sorter.policy())
            .field("skipped_ticks", &self.skipped_ticks)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Build a simulation from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the grid is too small or the sort
    /// pool cannot be started.
    pub fn from_config(
        config: &SimulationConfig,
        sink: Arc<dyn FrameSink>,
    ) -> Result<Self, SimulationError> {
        let engine =
            StagedUpdateEngine::seeded(config.grid.size, config.rules.clone(), config.grid.seed)?;
        let sorter =
            SortCoordinator::new(config.sort.policy, config.sort.options(), config.sort.threads)?;
        let operator = Arc::new(OperatorState::new(config.simulation.max_ticks));
        info!(
            size = config.grid.size,
            seed = config.grid.seed,
            policy = %config.sort.policy,
            "Simulation initialised"
        );
        Ok(Self::new(engine, sorter, operator, sink))
    }

    /// Assemble a simulation from parts.
    pub fn new(
        engine: StagedUpdateEngine,
        sorter: SortCoordinator,
        operator: Arc<OperatorState>,
        sink: Arc<dyn FrameSink>,
    ) -> Self {
        let frame = Arc::new(FrameBuffer::new(engine.field().dims().size()));
        Self {
            engine,
            clock: StageClock::new(),
            frame,
            sink,
            sorter,
            operator,
            skipped_ticks: 0,
        }
    }

    /// Run one pass over the field.
    ///
    /// Returns `Ok(None)` when an exclusive sort holds the field; the pass
    /// is skipped rather than blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Clock`] if the tick counter overflows.
    pub fn tick(&mut self) -> Result<Option<TickSummary>, SimulationError> {
        let field = Arc::clone(self.engine.field());
        let Some(_shared) = field.try_share() else {
            self.skipped_ticks = self.skipped_ticks.saturating_add(1);
            debug!(skipped = self.skipped_ticks, "Field held by a sort, pass skipped");
            return Ok(None);
        };

        let tick = self.clock.advance_tick()?;
        let (summary, first_since_snapshot) = {
            let mut writer = self.frame.lock();
            let mut summary = self.engine.tick(self.clock.stage(), writer.intensity_mut());
            summary.tick = tick;
            (summary, writer.publish())
        };
        // Sink is called after the frame lock is released.
        if first_since_snapshot {
            self.sink.frame_ready();
        }
        Ok(Some(summary))
    }

    /// Move the global stage forward by one.
    pub fn advance_stage(&mut self) -> Stage {
        let stage = self.clock.advance_stage();
        info!(stage = stage.value(), tick = self.clock.tick(), "Global stage advanced");
        stage
    }

    /// Start sorting the live field. Never blocks.
    pub fn trigger_sort(&self) -> SortHandle {
        self.sorter.trigger(self.engine.field(), &self.operator)
    }

    /// Copy the current frame and clear the ready flag.
    pub fn snapshot_frame(&self) -> Frame {
        self.frame.snapshot()
    }

    /// The update engine.
    pub const fn engine(&self) -> &StagedUpdateEngine {
        &self.engine
    }

    /// Mutable update engine.
    pub const fn engine_mut(&mut self) -> &mut StagedUpdateEngine {
        &mut self.engine
    }

    /// Tick counter and global stage.
    pub const fn clock(&self) -> &StageClock {
        &self.clock
    }

    /// Shared frame buffer.
    pub const fn frame_buffer(&self) -> &Arc<FrameBuffer> {
        &self.frame
    }

    /// Shared operator state.
    pub const fn operator(&self) -> &Arc<OperatorState> {
        &self.operator
    }

    /// Passes skipped because an exclusive sort held the field.
    pub const fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }
}
