//! Frame-rate measurement.

use std::time::Duration;

/// Smoothed frames-per-second from observed frame deltas.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    frames: u64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Timer seeded at 60 FPS.
    pub fn new() -> Self {
        Self {
            smoothed_fps: 60.0,
            smoothing: 0.05, // 5% new value, 95% old value
            frames: 0,
        }
    }

    /// Record one frame that took `elapsed`.
    pub fn record(&mut self, elapsed: Duration) {
        self.frames += 1;
        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Get the current FPS (smoothed)
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Frames recorded so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
