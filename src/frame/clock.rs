//! Time sources for the frame loop.

use web_time::Instant;

/// Monotonic time source for frame deltas and load timeouts.
pub trait Clock {
    /// The current instant. Must never go backwards.
    fn now(&self) -> Instant;
}

/// Wall-clock [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
