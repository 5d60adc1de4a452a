//! Operator control state for runtime simulation management.
//!
//! Shared atomic state read by the tick loop and written by whoever holds a
//! [`SimulationHandle`](crate::runner::SimulationHandle): pause/resume, a
//! clean stop request, and bookkeeping for sorts that are still running on
//! the sort pool.
//!
//! # Architecture
//!
//! All mutable control fields are atomics wrapped in [`Arc`] so they can be
//! shared between the runner task, input tasks and the sort pool without
//! locks on the hot path.
//!
//! [`Arc`]: std::sync::Arc

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Notify;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// An operator issued a stop command.
    OperatorStop,
    /// Every control handle was dropped.
    ControlClosed,
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether ticking is currently paused.
    paused: AtomicBool,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Sorts started and not yet finished.
    sorts_in_flight: AtomicU64,

    /// Sorts finished since start.
    sorts_completed: AtomicU64,

    /// Woken whenever the last in-flight sort finishes.
    sorts_drained: Notify,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,
}

impl OperatorState {
    /// Create a new operator state.
    pub fn new(max_ticks: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            sorts_in_flight: AtomicU64::new(0),
            sorts_completed: AtomicU64::new(0),
            sorts_drained: Notify::new(),
            max_ticks,
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether ticking is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause ticking. In-flight sorts keep running.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume ticking.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Sorts
    // -----------------------------------------------------------------------

    /// Record that a sort was dispatched.
    pub fn sort_started(&self) {
        self.sorts_in_flight.fetch_add(1, Ordering::AcqRel);
    }

    /// Record that a sort finished.
    pub fn sort_finished(&self) {
        let previous = self
            .sorts_in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_sub(1))
            })
            .unwrap_or(0);
        self.sorts_completed.fetch_add(1, Ordering::AcqRel);
        if previous <= 1 {
            self.sorts_drained.notify_waiters();
        }
    }

    /// Sorts started and not yet finished.
    pub fn sorts_in_flight(&self) -> u64 {
        self.sorts_in_flight.load(Ordering::Acquire)
    }

    /// Sorts finished since start.
    pub fn sorts_completed(&self) -> u64 {
        self.sorts_completed.load(Ordering::Acquire)
    }

    /// Wait until no sort is in flight.
    pub async fn wait_for_sorts(&self) {
        loop {
            let drained = self.sorts_drained.notified();
            if self.sorts_in_flight() == 0 {
                return;
            }
            drained.await;
        }
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Configured maximum ticks (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn pause_and_resume() {
        let op = OperatorState::new(0);
        assert!(!op.is_paused());
        op.pause();
        assert!(op.is_paused());
        op.resume();
        assert!(!op.is_paused());
    }

    #[test]
    fn tick_limit() {
        assert!(!OperatorState::new(0).tick_limit_reached(u64::MAX));
        let op = OperatorState::new(3);
        assert!(!op.tick_limit_reached(2));
        assert!(op.tick_limit_reached(3));
    }

    #[test]
    fn end_reason_serializes_snake_case() {
        let json = serde_json::to_string(&SimulationEndReason::MaxTicksReached).unwrap();
        assert_eq!(json, "\"max_ticks_reached\"");
    }

    #[test]
    fn sort_bookkeeping() {
        let op = OperatorState::new(0);
        op.sort_started();
        op.sort_started();
        assert_eq!(op.sorts_in_flight(), 2);
        op.sort_finished();
        op.sort_finished();
        assert_eq!(op.sorts_in_flight(), 0);
        assert_eq!(op.sorts_completed(), 2);
    }

    #[tokio::test]
    async fn wait_for_sorts_returns_once_drained() {
        let op = Arc::new(OperatorState::new(0));
        op.sort_started();
        let waiter = {
            let op = Arc::clone(&op);
            tokio::spawn(async move { op.wait_for_sorts().await })
        };
        tokio::task::yield_now().await;
        op.sort_finished();
        tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
