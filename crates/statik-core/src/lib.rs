//! Configuration, stage clock, frame hand-off, and the simulation loop for
//! the Statik field.
//!
//! This crate wraps the staged update engine in a running simulation: a
//! fixed-period tick, a slower global stage advance, on-demand sorts of the
//! live field, and a mutex-guarded frame buffer for whatever renders it.
//!
//! # Modules
//!
//! - [`clock`] -- [`StageClock`], the tick counter and global stage.
//! - [`config`] -- Configuration loading from `statik-config.yaml` into
//!   strongly-typed structs.
//! - [`frame`] -- [`FrameBuffer`], [`Frame`] and the [`FrameSink`] trait.
//! - [`operator`] -- Shared pause/stop/sort bookkeeping.
//! - [`runner`] -- [`run_simulation`] and the [`SimulationHandle`].
//! - [`simulation`] -- [`Simulation`], the explicit simulation context.
//! - [`sorter`] -- [`SortCoordinator`], sorts dispatched onto a dedicated
//!   pool under the configured sharing policy.
//!
//! [`StageClock`]: clock::StageClock
//! [`FrameBuffer`]: frame::FrameBuffer
//! [`Frame`]: frame::Frame
//! [`FrameSink`]: frame::FrameSink
//! [`run_simulation`]: runner::run_simulation
//! [`SimulationHandle`]: runner::SimulationHandle
//! [`Simulation`]: simulation::Simulation
//! [`SortCoordinator`]: sorter::SortCoordinator

pub mod clock;
pub mod config;
pub mod frame;
pub mod operator;
pub mod runner;
pub mod simulation;
pub mod sorter;
