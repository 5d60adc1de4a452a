//! Frame hand-off between the tick loop and a renderer.
//!
//! The tick loop writes per-cell display intensities into a shared buffer
//! while holding its mutex. A "frame ready" flag guarantees at most one
//! outstanding notification: the sink is only told about a new frame when
//! the previous one has been consumed with [`FrameBuffer::snapshot`].

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::Notify;

/// A copy of the display intensities at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Side length of the grid.
    pub size: usize,
    /// Row-major intensities in `[0, 1)`.
    pub intensity: Vec<f32>,
}

impl Frame {
    /// Amber-tinted RGBA bytes, four per cell: `(i, 0.7 i, 0.1 i, 1)`
    /// scaled to `0..=255`.
    pub fn rgba(&self) -> Vec<u8> {
        self.intensity
            .iter()
            .flat_map(|&i| [channel(i), channel(0.7 * i), channel(0.1 * i), u8::MAX])
            .collect()
    }

    /// Mean intensity over the frame (0 for an empty frame).
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_intensity(&self) -> f32 {
        if self.intensity.is_empty() {
            return 0.0;
        }
        self.intensity.iter().sum::<f32>() / self.intensity.len() as f32
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Receiver of "a new frame is ready" notifications.
pub trait FrameSink: Send + Sync {
    /// Called at most once per consumed frame.
    fn frame_ready(&self);
}

/// A sink that ignores notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl FrameSink for NoopSink {
    fn frame_ready(&self) {}
}

/// A sink that wakes a task waiting on a [`Notify`].
#[derive(Debug, Default, Clone)]
pub struct NotifySink {
    notify: Arc<Notify>,
}

impl NotifySink {
    /// A sink with a fresh [`Notify`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The [`Notify`] the consumer waits on.
    pub fn notify(&self) -> Arc<Notify> {
        Arc::clone(&self.notify)
    }
}

impl FrameSink for NotifySink {
    fn frame_ready(&self) {
        self.notify.notify_one();
    }
}

#[derive(Debug)]
struct FrameState {
    intensity: Vec<f32>,
    notified: bool,
}

/// Mutex-guarded intensity buffer with the "frame ready" flag.
#[derive(Debug)]
pub struct FrameBuffer {
    size: usize,
    state: Mutex<FrameState>,
}

/// Exclusive access to the intensity buffer for one pass.
#[derive(Debug)]
pub struct FrameWriter<'a> {
    guard: MutexGuard<'a, FrameState>,
}

impl FrameWriter<'_> {
    /// Row-major intensities.
    pub fn intensity_mut(&mut self) -> &mut [f32] {
        &mut self.guard.intensity
    }

    /// Mark the frame ready. Returns `true` when the sink should be
    /// notified, i.e. no earlier notification is still outstanding.
    pub fn publish(&mut self) -> bool {
        !std::mem::replace(&mut self.guard.notified, true)
    }
}

impl FrameBuffer {
    /// A black frame for a `size x size` grid.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            state: Mutex::new(FrameState {
                intensity: vec![0.0; size.saturating_mul(size)],
                notified: false,
            }),
        }
    }

    /// Side length of the grid.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Lock the buffer for writing.
    pub fn lock(&self) -> FrameWriter<'_> {
        FrameWriter {
            guard: self.state.lock(),
        }
    }

    /// Copy the intensities out and clear the ready flag.
    pub fn snapshot(&self) -> Frame {
        let mut state = self.state.lock();
        state.notified = false;
        Frame {
            size: self.size,
            intensity: state.intensity.clone(),
        }
    }

    /// Whether a notification is outstanding.
    pub fn is_pending(&self) -> bool {
        self.state.lock().notified
    }
}
