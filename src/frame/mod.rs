//! The per-frame loop: a cancellable, self-rescheduling frame request plus
//! the monotonic clock that times it.
//!
//! The loop never runs anything itself. The host fires scheduled frames by
//! calling [`AnimationLoop::begin_frame`] (through the lifecycle layer),
//! which re-arms the next request and hands back a [`FrameTick`].

pub mod clock;
pub mod scheduler;
pub mod timing;

use std::rc::Rc;
use std::time::Duration;

pub use clock::{Clock, MonotonicClock};
pub use scheduler::{FrameRequestId, FrameScheduler};
pub use timing::FrameTiming;
use web_time::Instant;

/// Elapsed time since the previous tick. Consumed once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the previous tick (or since `start` for the first).
    pub delta: f32,
}

/// Armed/disarmed frame loop with at most one pending request.
pub struct AnimationLoop {
    scheduler: Rc<dyn FrameScheduler>,
    clock: Rc<dyn Clock>,
    armed: bool,
    pending: Option<FrameRequestId>,
    last: Option<Instant>,
    timing: FrameTiming,
}

impl AnimationLoop {
    /// Disarmed loop.
    pub fn new(scheduler: Rc<dyn FrameScheduler>, clock: Rc<dyn Clock>) -> Self {
        Self {
            scheduler,
            clock,
            armed: false,
            pending: None,
            last: None,
            timing: FrameTiming::new(),
        }
    }

    /// Arm the loop and request the first frame. No-op if already armed.
    pub fn start(&mut self) {
        if self.armed {
            return;
        }
        self.armed = true;
        self.last = Some(self.clock.now());
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Called when a scheduled frame fires. Replaces any outstanding
    /// request with a fresh one and returns the tick, or `None` if the loop
    /// has been stopped.
    pub fn begin_frame(&mut self) -> Option<FrameTick> {
        if !self.armed {
            return None;
        }
        // A frame delivered out of turn must not leave the armed request
        // behind.
        if let Some(stale) = self.pending.take() {
            self.scheduler.cancel_frame(stale);
        }
        self.pending = Some(self.scheduler.request_frame());

        let now = self.clock.now();
        let elapsed = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        self.timing.record(elapsed);
        Some(FrameTick {
            delta: elapsed.as_secs_f32(),
        })
    }

    /// Disarm and cancel the pending request. No-op when nothing is
    /// scheduled.
    pub fn stop(&mut self) {
        self.armed = false;
        self.last = None;
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
    }

    /// Whether the loop is armed.
    pub fn is_running(&self) -> bool {
        self.armed
    }

    /// The outstanding frame request, if any.
    pub fn pending_request(&self) -> Option<FrameRequestId> {
        self.pending
    }

    /// Smoothed frame rate.
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// Ticks delivered since construction.
    pub fn frame_count(&self) -> u64 {
        self.timing.frame_count()
    }
}
