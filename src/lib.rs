// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (default clippy thresholds)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU-accelerated rotating globe built on wgpu.
//!
//! Orbis mounts a lit, shadowed, auto-rotating glTF globe into a host
//! container and guarantees that everything it creates is released again
//! on unmount.
//!
//! # Key entry points
//!
//! - [`Globe`] - the component: mount with [`Globe::initialize_globe`],
//!   forward frames, resizes and pointer input, unmount with
//!   [`Globe::cleanup`]
//! - [`GlobeHost`] - the host seams a globe needs (surface factory, frame
//!   scheduler, clock, asset source)
//! - [`options::Options`] - camera, controls, lighting, renderer and model
//!   configuration, loadable from TOML
//! - [`Viewer`] - a standalone winit window hosting one globe (feature
//!   `viewer`)
//!
//! # Architecture
//!
//! A mounted globe owns one [`GlobeSession`]: scene graph, camera, orbit
//! controls, renderer, model loader, animation mixer, resize listener and
//! frame loop. The model is fetched and parsed on a background thread and
//! attached on the first frame after it arrives. Rendering runs a shadow
//! depth pass, a multisampled HDR geometry pass and a tone-mapping
//! composite onto a transparent surface.

pub mod animation;
pub mod camera;
pub mod container;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod input;
pub mod lifecycle;
pub mod model;
pub mod options;
pub mod renderer;
pub mod resize;
pub mod scale;
pub mod scene;
#[cfg(test)]
mod testing;
#[cfg(feature = "viewer")]
pub mod viewer;
pub mod viewport;

pub use container::Container;
pub use error::GlobeError;
pub use input::{InputEvent, MouseButton};
pub use lifecycle::{Globe, GlobeHost, GlobeSession};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
