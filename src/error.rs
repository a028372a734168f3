//! Crate-level error types.

use std::fmt;
use std::time::Duration;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the orbis crate.
#[derive(Debug)]
pub enum GlobeError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// WGSL composition or validation failure.
    Shader(String),
    /// A frame could not be rendered.
    Render(String),
    /// The container reported a size that cannot back a camera or surface.
    InvalidViewport {
        /// Reported width in logical pixels.
        width: u32,
        /// Reported height in logical pixels.
        height: u32,
    },
    /// Fetching a model asset (or one of its buffers) failed.
    AssetFetch {
        /// Path or URL that was requested.
        path: String,
        /// Underlying failure description.
        message: String,
    },
    /// The fetched bytes are not a usable glTF document.
    ModelParse(String),
    /// `load` was called while a previous load is still pending.
    LoadInFlight,
    /// The model load exceeded the configured timeout.
    LoadTimedOut(Duration),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for GlobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Render(msg) => write!(f, "render error: {msg}"),
            Self::InvalidViewport { width, height } => {
                write!(f, "invalid viewport size {width}x{height}")
            }
            Self::AssetFetch { path, message } => {
                write!(f, "failed to fetch '{path}': {message}")
            }
            Self::ModelParse(msg) => write!(f, "model parse error: {msg}"),
            Self::LoadInFlight => {
                write!(f, "a model load is already in flight")
            }
            Self::LoadTimedOut(after) => {
                write!(f, "model load timed out after {:.1}s", after.as_secs_f32())
            }
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for GlobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for GlobeError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for GlobeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<gltf::Error> for GlobeError {
    fn from(e: gltf::Error) -> Self {
        Self::ModelParse(e.to_string())
    }
}
