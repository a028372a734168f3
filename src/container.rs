//! The host surface a globe is mounted into.
//!
//! A [`Container`] is owned by the host application and must outlive the
//! session mounted into it. The globe only reads its metrics, attaches one
//! rendering surface to it, and registers one resize listener on it; both
//! are removed again on cleanup.

/// Identifies a rendering surface attached to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Identifies a resize listener registered on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Host-side element the globe renders into.
///
/// Methods take `&self`: containers are cheap shared handles (the session
/// keeps a clone for resize handling) and use interior mutability for
/// their attachment bookkeeping.
pub trait Container: Clone {
    /// Client area size in logical pixels `(width, height)`.
    fn client_size(&self) -> (u32, u32);

    /// Physical pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f64;

    /// Width of the host viewport that drives responsive scaling.
    ///
    /// Defaults to the container's own width.
    fn viewport_width(&self) -> u32 {
        self.client_size().0
    }

    /// Attach a rendering surface as a child of this container.
    fn append_surface(&self, surface: SurfaceId);

    /// Detach a rendering surface. Returns `false` if it was not attached.
    fn remove_surface(&self, surface: SurfaceId) -> bool;

    /// Register interest in viewport resize notifications.
    fn add_resize_listener(&self) -> ListenerId;

    /// Unregister a resize listener. Returns `false` if it was not
    /// registered.
    fn remove_resize_listener(&self, listener: ListenerId) -> bool;
}
