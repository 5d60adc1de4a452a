//! Line-based console controls.
//!
//! Each line on stdin is one command. This stands in for the window
//! system's key and visibility events: `sort` is the trigger key,
//! `pause`/`resume` are the window being hidden and shown.
//!
//! Stdin is read on a plain OS thread and forwarded over a channel; the
//! blocking read cannot be cancelled and must not hold up shutdown.

use std::io::BufRead;

use statik_core::runner::SimulationHandle;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Lines buffered between the stdin thread and the command loop.
const LINE_BUFFER: usize = 16;

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a sort of the live field.
    Sort,
    /// Stop ticking.
    Pause,
    /// Start ticking again.
    Resume,
    /// Log a one-line description of the current frame.
    Frame,
    /// End the run.
    Quit,
}

impl Command {
    /// Parse one input line. Blank and unknown lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "sort" => Some(Self::Sort),
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "f" | "frame" => Some(Self::Frame),
            "q" | "quit" | "stop" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Start a thread that forwards stdin lines until stdin closes or the
/// receiver is dropped.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel(LINE_BUFFER);
    let spawned = std::thread::Builder::new()
        .name(String::from("statik-console"))
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.blocking_send(line).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Console read failed, console controls disabled");
                        return;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Console thread could not be started");
    }
    receiver
}

/// Apply commands from `lines` until the input closes, the runner goes
/// away, or a quit command is read.
pub async fn read_commands(mut lines: mpsc::Receiver<String>, handle: SimulationHandle) {
    loop {
        let Some(line) = lines.recv().await else {
            info!("Console input closed");
            return;
        };

        let Some(command) = Command::parse(&line) else {
            if !line.trim().is_empty() {
                warn!(line = line.trim(), "Unknown command (sort, pause, resume, frame, quit)");
            }
            continue;
        };

        let sent = match command {
            Command::Sort => handle.trigger_sort().await,
            Command::Pause => handle.pause().await,
            Command::Resume => handle.resume().await,
            Command::Frame => {
                let frame = handle.snapshot_frame();
                info!(
                    size = frame.size,
                    mean_intensity = f64::from(frame.mean_intensity()),
                    sorts_in_flight = handle.operator().sorts_in_flight(),
                    "Frame"
                );
                Ok(())
            }
            Command::Quit => {
                if let Err(e) = handle.stop().await {
                    warn!(error = %e, "Stop request not delivered");
                }
                return;
            }
        };

        if sent.is_err() {
            info!("Simulation no longer running, console closing");
            return;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use statik_core::config::SimulationConfig;
    use statik_core::frame::NoopSink;
    use statik_core::runner::Control;
    use statik_core::simulation::Simulation;

    use super::*;

    #[tokio::test]
    async fn commands_are_forwarded_until_quit() {
        let config = SimulationConfig::parse("grid:\n  size: 4\nsort:\n  threads: 1\n").unwrap();
        let sim = Simulation::from_config(&config, Arc::new(NoopSink)).unwrap();
        let (handle, mut control) = SimulationHandle::new(&sim);
        let (lines, input) = mpsc::channel(8);
        for line in ["pause", "bogus", "", "sort", "quit", "resume"] {
            lines.send(String::from(line)).await.unwrap();
        }

        read_commands(input, handle.clone()).await;

        assert_eq!(control.recv().await, Some(Control::Pause));
        assert_eq!(control.recv().await, Some(Control::TriggerSort));
        assert_eq!(control.recv().await, Some(Control::Stop));
        assert!(control.try_recv().is_err());
        assert!(handle.operator().is_stop_requested());
    }

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(Command::parse("sort"), Some(Command::Sort));
        assert_eq!(Command::parse("  S \n"), Some(Command::Sort));
        assert_eq!(Command::parse("pause"), Some(Command::Pause));
        assert_eq!(Command::parse("r"), Some(Command::Resume));
        assert_eq!(Command::parse("Quit"), Some(Command::Quit));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("dance"), None);
    }
}
