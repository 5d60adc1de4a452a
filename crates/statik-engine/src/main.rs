//! Headless engine binary for the Statik field.
//!
//! Loads configuration, builds the simulation, and runs the tick loop with
//! console controls and a frame consumer attached. Runs until `quit` is
//! typed, Ctrl-C is pressed, or the configured tick limit is reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `statik-config.yaml` (or `STATIK_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation (field, engine, sort pool, frame buffer)
//! 4. Start the frame consumer
//! 5. Start console controls and the Ctrl-C handler
//! 6. Run the simulation loop
//! 7. Log the result

mod console;
mod consumer;
mod error;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use statik_core::config::SimulationConfig;
use statik_core::frame::NotifySink;
use statik_core::runner::{self, SimulationHandle};
use statik_core::simulation::Simulation;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "statik-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("statik-engine starting");
    match config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        size = config.grid.size,
        seed = config.grid.seed,
        tick_interval_ms = config.timing.tick_interval_ms,
        stage_interval_ms = config.timing.stage_interval_ms,
        policy = %config.sort.policy,
        max_ticks = config.simulation.max_ticks,
        "Configuration"
    );

    // 3. Build the simulation.
    let sink = NotifySink::new();
    let frames_ready = sink.notify();
    let mut simulation =
        Simulation::from_config(&config, Arc::new(sink)).map_err(EngineError::from)?;
    let (handle, control) = SimulationHandle::new(&simulation);

    // 4. Frame consumer.
    let consumer = tokio::spawn(consumer::consume_frames(
        frames_ready,
        handle.clone(),
        config.logging.report_every_ticks,
    ));

    // 5. Console controls and Ctrl-C.
    let console = tokio::spawn(console::read_commands(
        console::spawn_stdin_reader(),
        handle.clone(),
    ));
    let interrupt = {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping");
                if let Err(e) = handle.stop().await {
                    warn!(error = %e, "Stop request not delivered");
                }
            }
        })
    };
    info!("Commands: sort, pause, resume, frame, quit");

    // Only the spawned tasks keep the control channel open from here on.
    drop(handle);

    // 6. Run the simulation.
    let mut callback = ProgressCallback::new(config.logging.report_every_ticks);
    let result = runner::run_simulation(&mut simulation, &config.timing, control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    consumer.abort();
    console.abort();
    interrupt.abort();

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "statik-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Reads the file named by `STATIK_CONFIG`, or `statik-config.yaml` in the
/// current working directory. A missing file yields the defaults.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var_os("STATIK_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = SimulationConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        Ok((SimulationConfig::parse("")?, None))
    }
}
