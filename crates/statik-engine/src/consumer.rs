//! Frame consumer: the headless stand-in for a renderer.
//!
//! Waits for "frame ready" notifications, copies the frame out through the
//! handle (which clears the ready flag so the next pass can notify again)
//! and encodes it to RGBA the way an uploader would.

use std::sync::Arc;

use statik_core::runner::SimulationHandle;
use tokio::sync::Notify;
use tracing::debug;

/// Consume frames until the task is aborted.
pub async fn consume_frames(notify: Arc<Notify>, handle: SimulationHandle, log_every: u64) {
    let mut frames: u64 = 0;
    loop {
        notify.notified().await;
        let frame = handle.snapshot_frame();
        let rgba = frame.rgba();
        frames = frames.saturating_add(1);
        if frames.checked_rem(log_every) == Some(0) {
            debug!(
                frames,
                size = frame.size,
                bytes = rgba.len(),
                mean_intensity = f64::from(frame.mean_intensity()),
                "Frame consumed"
            );
        }
    }
}
