//! Host frame scheduling seam.

/// Identifies one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Host hook that fires a callback at the display refresh cadence.
///
/// Each request fires at most once. The host calls
/// [`Globe::on_frame`](crate::lifecycle::Globe::on_frame) when a request
/// fires.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame.
    fn request_frame(&self) -> FrameRequestId;

    /// Withdraw a request that has not fired yet. Unknown or already-fired
    /// ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}
