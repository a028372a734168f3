//! Input handling: platform-agnostic pointer events consumed by the orbit
//! controls.

/// Platform-agnostic input events.
pub mod event;

pub use event::{InputEvent, MouseButton};
