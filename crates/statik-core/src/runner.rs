//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives a [`Simulation`] from three event sources:
//!
//! - **Tick timer**: one pass per period, suppressed while paused
//! - **Stage timer**: advances the global stage on a slower period
//! - **Control channel**: pause, resume, sort triggers and stop, fed by a
//!   [`SimulationHandle`]
//!
//! Tick, stage and sort-trigger events each run exactly one pass. Pausing
//! only silences the tick timer: stage and trigger events still run a pass
//! while paused, and pause/resume messages run none. Pausing never cancels
//! a sort that is already running.

use std::sync::Arc;
use std::time::Duration;

use statik_field::TickSummary;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tracing::{info, warn};

use crate::config::TimingConfig;
use crate::frame::{Frame, FrameBuffer};
use crate::operator::{OperatorState, SimulationEndReason};
use crate::simulation::{Simulation, SimulationError};

/// Capacity of the control channel.
pub const CONTROL_CHANNEL_CAPACITY: usize = 64;

/// Shortest timer period the loop accepts.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A pass could not run.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },

    /// The runner is gone; the control message was not delivered.
    #[error("simulation runner is no longer listening")]
    ControlClosed,
}

/// Messages accepted by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Stop ticking. Sorts in flight continue.
    Pause,
    /// Start ticking again.
    Resume,
    /// Start a sort of the live field.
    TriggerSort,
    /// End the run once in-flight sorts have finished.
    Stop,
}

/// Cloneable handle for controlling a running simulation.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    sender: mpsc::Sender<Control>,
    operator: Arc<OperatorState>,
    frame: Arc<FrameBuffer>,
}

impl SimulationHandle {
    /// Create a handle for `simulation` and the receiver to pass to
    /// [`run_simulation`].
    pub fn new(simulation: &Simulation) -> (Self, mpsc::Receiver<Control>) {
        let (sender, receiver) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        let handle = Self {
            sender,
            operator: Arc::clone(simulation.operator()),
            frame: Arc::clone(simulation.frame_buffer()),
        };
        (handle, receiver)
    }

    async fn send(&self, control: Control) -> Result<(), RunnerError> {
        self.sender
            .send(control)
            .await
            .map_err(|mpsc::error::SendError(_control)| RunnerError::ControlClosed)
    }

    /// Stop ticking.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ControlClosed`] if the runner has exited.
    pub async fn pause(&self) -> Result<(), RunnerError> {
        self.send(Control::Pause).await
    }

    /// Start ticking again.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ControlClosed`] if the runner has exited.
    pub async fn resume(&self) -> Result<(), RunnerError> {
        self.send(Control::Resume).await
    }

    /// Ask the runner to start a sort of the live field.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ControlClosed`] if the runner has exited.
    pub async fn trigger_sort(&self) -> Result<(), RunnerError> {
        self.send(Control::TriggerSort).await
    }

    /// Request a clean stop.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ControlClosed`] if the runner has exited.
    pub async fn stop(&self) -> Result<(), RunnerError> {
        self.operator.request_stop();
        self.send(Control::Stop).await
    }

    /// Copy the current frame and clear the ready flag.
    pub fn snapshot_frame(&self) -> Frame {
        self.frame.snapshot()
    }

    /// Shared operator state.
    pub const fn operator(&self) -> &Arc<OperatorState> {
        &self.operator
    }
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last pass summary, if any pass completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of passes executed.
    pub total_ticks: u64,
    /// Passes skipped because an exclusive sort held the field.
    pub skipped_ticks: u64,
    /// Sorts finished during the run.
    pub sorts_completed: u64,
}

/// Callback invoked after each pass completes.
pub trait TickCallback: Send {
    /// Called after a pass completes.
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _simulation: &Simulation) {}
}

/// What woke the loop.
enum Event {
    Tick,
    Stage,
    Control(Control),
    Closed,
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a pass fails unrecoverably.
pub async fn run_simulation(
    simulation: &mut Simulation,
    timing: &TimingConfig,
    mut control: mpsc::Receiver<Control>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let operator = Arc::clone(simulation.operator());
    let tick_period = timing.tick_interval().max(MIN_PERIOD);
    let stage_period = timing.stage_interval().max(MIN_PERIOD);
    let mut ticker = interval(tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let first_stage = Instant::now()
        .checked_add(stage_period)
        .unwrap_or_else(Instant::now);
    let mut stages = interval_at(first_stage, stage_period);
    stages.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = timing.tick_interval_ms,
        stage_interval_ms = timing.stage_interval_ms,
        "Simulation starting"
    );

    let end_reason = loop {
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            break SimulationEndReason::OperatorStop;
        }

        let paused = operator.is_paused();
        let event = tokio::select! {
            biased;
            message = control.recv() => message.map_or(Event::Closed, Event::Control),
            _ = stages.tick() => Event::Stage,
            _ = ticker.tick(), if !paused => Event::Tick,
        };

        match event {
            Event::Tick => {}
            Event::Stage => {
                simulation.advance_stage();
            }
            Event::Control(Control::Pause) => {
                operator.pause();
                info!(tick = simulation.clock().tick(), "Simulation paused");
                continue;
            }
            Event::Control(Control::Resume) => {
                if operator.is_paused() {
                    operator.resume();
                    ticker.reset();
                    info!(tick = simulation.clock().tick(), "Simulation resumed");
                }
                continue;
            }
            Event::Control(Control::TriggerSort) => {
                // Fire-and-forget: completion is tracked by the operator.
                drop(simulation.trigger_sort());
            }
            Event::Control(Control::Stop) => {
                operator.request_stop();
                continue;
            }
            Event::Closed => {
                info!("All simulation handles dropped");
                break SimulationEndReason::ControlClosed;
            }
        }

        let Some(summary) = simulation.tick()? else {
            continue;
        };
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, simulation);

        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            last_summary = Some(summary);
            break SimulationEndReason::MaxTicksReached;
        }
        last_summary = Some(summary);
    };

    if operator.sorts_in_flight() > 0 {
        info!(
            in_flight = operator.sorts_in_flight(),
            "Waiting for in-flight sorts"
        );
        operator.wait_for_sorts().await;
    }

    Ok(SimulationResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
        skipped_ticks: simulation.skipped_ticks(),
        sorts_completed: operator.sorts_completed(),
    })
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        skipped_ticks = result.skipped_ticks,
        sorts_completed = result.sorts_completed,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            global_stage = summary.global_stage.value(),
            frozen = summary.frozen_total,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use statik_field::{RuleParams, StagedUpdateEngine};
    use statik_sort::SortOptions;
    use statik_types::SortPolicy;

    use super::*;
    use crate::frame::NoopSink;
    use crate::sorter::SortCoordinator;

    fn make_simulation(max_ticks: u64) -> Simulation {
        let engine = StagedUpdateEngine::seeded(8, RuleParams::default(), 1).unwrap();
        let sorter =
            SortCoordinator::new(SortPolicy::Interleaved, SortOptions::default(), 2).unwrap();
        Simulation::new(
            engine,
            sorter,
            Arc::new(OperatorState::new(max_ticks)),
            Arc::new(NoopSink),
        )
    }

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            tick_interval_ms: 1,
            stage_interval_ms: 60_000,
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut sim = make_simulation(5);
        let (_handle, control) = SimulationHandle::new(&sim);
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut sim, &fast_timing(), control, &mut cb)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
    }

    #[tokio::test]
    async fn operator_stop() {
        let mut sim = make_simulation(0);
        let (handle, control) = SimulationHandle::new(&sim);
        handle.stop().await.unwrap();
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut sim, &fast_timing(), control, &mut cb)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test]
    async fn dropped_handles_end_the_run() {
        let mut sim = make_simulation(0);
        let (handle, control) = SimulationHandle::new(&sim);
        drop(handle);
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut sim, &fast_timing(), control, &mut cb)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::ControlClosed);
    }

    #[tokio::test]
    async fn stage_and_trigger_events_run_passes_while_paused() {
        let mut sim = make_simulation(0);
        let (handle, control) = SimulationHandle::new(&sim);
        sim.operator().pause();
        let timing = TimingConfig {
            tick_interval_ms: 1,
            stage_interval_ms: 5,
        };

        let runner = tokio::spawn(async move {
            let mut cb = NoOpCallback;
            let result = run_simulation(&mut sim, &timing, control, &mut cb).await;
            (sim, result)
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.trigger_sort().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.stop().await.unwrap();
        let (sim, result) = runner.await.unwrap();
        let result = result.unwrap();

        // The tick timer stays silent, so every pass came from a stage
        // change or the sort trigger.
        let stage_changes = sim.clock().stage_changes();
        assert!(stage_changes > 0);
        assert!(sim.operator().is_paused());
        assert_eq!(result.total_ticks, stage_changes.saturating_add(1));
        assert_eq!(result.sorts_completed, 1);
    }

    #[tokio::test]
    async fn pause_and_resume_messages_run_no_pass() {
        let mut sim = make_simulation(0);
        let (handle, control) = SimulationHandle::new(&sim);
        sim.operator().pause();
        handle.resume().await.unwrap();
        handle.pause().await.unwrap();
        handle.resume().await.unwrap();
        handle.pause().await.unwrap();
        drop(handle);
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut sim, &fast_timing(), control, &mut cb)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::ControlClosed);
        assert_eq!(result.total_ticks, 0);
        assert!(sim.operator().is_paused());
    }

    #[tokio::test]
    async fn closed_runner_rejects_controls() {
        let sim = make_simulation(0);
        let (handle, control) = SimulationHandle::new(&sim);
        drop(control);
        assert!(matches!(
            handle.pause().await,
            Err(RunnerError::ControlClosed)
        ));
    }
}
