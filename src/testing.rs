//! Test doubles for the host seams: container, surface factory, frame
//! scheduler, clock, and a gated asset source.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use web_time::Instant;

use crate::camera::Camera;
use crate::container::{Container, ListenerId, SurfaceId};
use crate::error::GlobeError;
use crate::frame::{Clock, FrameRequestId, FrameScheduler};
use crate::model::source::{AssetSource, ProgressFn};
use crate::renderer::{RenderSurface, RendererConfig, SurfaceFactory};
use crate::scene::Scene;
use crate::viewport::ViewportDimensions;

/// A one-triangle glTF document (embedded buffer) with two nodes and two
/// animation clips, "spin" and "bob".
pub(crate) const TWO_CLIP_GLTF: &str = r#"{
  "asset": {"version": "2.0"},
  "scene": 0,
  "scenes": [{"nodes": [0]}],
  "nodes": [
    {"name": "globe", "mesh": 0, "children": [1]},
    {"name": "ring", "translation": [0.0, 0.5, 0.0]}
  ],
  "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]}],
  "buffers": [{
    "byteLength": 76,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAAAAAAIA/AAAAAA=="
  }],
  "bufferViews": [
    {"buffer": 0, "byteOffset": 0, "byteLength": 36},
    {"buffer": 0, "byteOffset": 36, "byteLength": 6},
    {"buffer": 0, "byteOffset": 44, "byteLength": 8},
    {"buffer": 0, "byteOffset": 52, "byteLength": 24}
  ],
  "accessors": [
    {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
     "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
    {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"},
    {"bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
     "min": [0.0], "max": [1.0]},
    {"bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3"}
  ],
  "animations": [
    {"name": "spin",
     "channels": [{"sampler": 0, "target": {"node": 0, "path": "translation"}}],
     "samplers": [{"input": 2, "output": 3}]},
    {"name": "bob",
     "channels": [{"sampler": 0, "target": {"node": 1, "path": "translation"}}],
     "samplers": [{"input": 2, "output": 3, "interpolation": "STEP"}]}
  ]
}"#;

// -- Container -----------------------------------------------------------

#[derive(Debug)]
struct ContainerState {
    width: u32,
    height: u32,
    pixel_ratio: f64,
    viewport_width: Option<u32>,
    surfaces: Vec<SurfaceId>,
    listeners: Vec<ListenerId>,
    next_listener: u64,
}

/// In-memory container that records attached surfaces and listeners.
/// Clones share state.
#[derive(Debug, Clone)]
pub(crate) struct FakeContainer(Rc<RefCell<ContainerState>>);

impl FakeContainer {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self(Rc::new(RefCell::new(ContainerState {
            width,
            height,
            pixel_ratio: 1.0,
            viewport_width: None,
            surfaces: Vec::new(),
            listeners: Vec::new(),
            next_listener: 1,
        })))
    }

    pub(crate) fn set_pixel_ratio(&self, ratio: f64) {
        self.0.borrow_mut().pixel_ratio = ratio;
    }

    /// Width of the surrounding viewport, independent of the container.
    pub(crate) fn set_viewport_width(&self, width: u32) {
        self.0.borrow_mut().viewport_width = Some(width);
    }

    pub(crate) fn resize(&self, width: u32, height: u32) {
        let mut state = self.0.borrow_mut();
        state.width = width;
        state.height = height;
    }

    pub(crate) fn surface_count(&self) -> usize {
        self.0.borrow().surfaces.len()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }
}

impl Container for FakeContainer {
    fn client_size(&self) -> (u32, u32) {
        let state = self.0.borrow();
        (state.width, state.height)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.0.borrow().pixel_ratio
    }

    fn viewport_width(&self) -> u32 {
        let state = self.0.borrow();
        state.viewport_width.unwrap_or(state.width)
    }

    fn append_surface(&self, surface: SurfaceId) {
        self.0.borrow_mut().surfaces.push(surface);
    }

    fn remove_surface(&self, surface: SurfaceId) -> bool {
        let mut state = self.0.borrow_mut();
        let before = state.surfaces.len();
        state.surfaces.retain(|&s| s != surface);
        state.surfaces.len() != before
    }

    fn add_resize_listener(&self) -> ListenerId {
        let mut state = self.0.borrow_mut();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push(id);
        id
    }

    fn remove_resize_listener(&self, listener: ListenerId) -> bool {
        let mut state = self.0.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|&l| l != listener);
        state.listeners.len() != before
    }
}

// -- Surfaces ------------------------------------------------------------

#[derive(Debug, Default)]
struct SurfaceLog {
    next_id: u64,
    created: usize,
    disposed: usize,
    renders: usize,
    renders_with_model: usize,
    fail: bool,
}

/// Factory for [`FakeSurface`]s; counts creations, renders and disposals
/// across every surface it made.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSurfaceFactory(Rc<RefCell<SurfaceLog>>);

impl FakeSurfaceFactory {
    /// A factory whose surfaces cannot be created.
    pub(crate) fn failing() -> Self {
        let factory = Self::default();
        factory.0.borrow_mut().fail = true;
        factory
    }

    pub(crate) fn created_count(&self) -> usize {
        self.0.borrow().created
    }

    pub(crate) fn disposed_count(&self) -> usize {
        self.0.borrow().disposed
    }

    pub(crate) fn render_count(&self) -> usize {
        self.0.borrow().renders
    }

    /// Renders that saw at least one mesh in the scene.
    pub(crate) fn renders_with_model(&self) -> usize {
        self.0.borrow().renders_with_model
    }
}

impl SurfaceFactory<FakeContainer> for FakeSurfaceFactory {
    fn create_surface(
        &self,
        _container: &FakeContainer,
        dims: &ViewportDimensions,
        config: &RendererConfig,
    ) -> Result<Box<dyn RenderSurface>, GlobeError> {
        let mut log = self.0.borrow_mut();
        if log.fail {
            return Err(GlobeError::Render("no adapter".to_owned()));
        }
        log.next_id += 1;
        log.created += 1;
        Ok(Box::new(FakeSurface {
            id: SurfaceId(log.next_id),
            size: (dims.width, dims.height),
            ratio: dims.clamped_pixel_ratio(config.max_pixel_ratio),
            max_ratio: config.max_pixel_ratio,
            disposed: false,
            log: Rc::clone(&self.0),
        }))
    }
}

struct FakeSurface {
    id: SurfaceId,
    size: (u32, u32),
    ratio: f32,
    max_ratio: f32,
    disposed: bool,
    log: Rc<RefCell<SurfaceLog>>,
}

impl RenderSurface for FakeSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn pixel_ratio(&self) -> f32 {
        self.ratio
    }

    fn resize(&mut self, dims: &ViewportDimensions) {
        self.size = (dims.width, dims.height);
        self.ratio = dims.clamped_pixel_ratio(self.max_ratio);
    }

    fn render(
        &mut self,
        scene: &Scene,
        _camera: &Camera,
    ) -> Result<(), GlobeError> {
        if self.disposed {
            return Err(GlobeError::Render("surface disposed".to_owned()));
        }
        let mut log = self.log.borrow_mut();
        log.renders += 1;
        if scene.mesh_count() > 0 {
            log.renders_with_model += 1;
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.log.borrow_mut().disposed += 1;
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

// -- Frames and time -----------------------------------------------------

#[derive(Debug, Default)]
struct SchedulerState {
    next: u64,
    pending: Vec<FrameRequestId>,
    cancelled: Vec<FrameRequestId>,
}

/// Frame scheduler driven by the test: requests queue up until [`fire`]d.
///
/// [`fire`]: ManualScheduler::fire
#[derive(Debug, Default)]
pub(crate) struct ManualScheduler(RefCell<SchedulerState>);

impl ManualScheduler {
    /// Consume the oldest pending request. Returns `false` if none was
    /// pending.
    pub(crate) fn fire(&self) -> bool {
        let mut state = self.0.borrow_mut();
        if state.pending.is_empty() {
            return false;
        }
        let _ = state.pending.remove(0);
        true
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.0.borrow().pending.len()
    }

    pub(crate) fn cancelled(&self) -> Vec<FrameRequestId> {
        self.0.borrow().cancelled.clone()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self) -> FrameRequestId {
        let mut state = self.0.borrow_mut();
        state.next += 1;
        let id = FrameRequestId(state.next);
        state.pending.push(id);
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let mut state = self.0.borrow_mut();
        let before = state.pending.len();
        state.pending.retain(|&p| p != id);
        if state.pending.len() != before {
            state.cancelled.push(id);
        }
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub(crate) struct ManualClock {
    base: Instant,
    offset: Cell<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub(crate) fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

// -- Assets --------------------------------------------------------------

#[derive(Debug, Default)]
struct Gate {
    released: bool,
    served: bool,
}

/// Asset source that blocks every fetch until [`release`] is called, then
/// serves the same bytes for any path.
///
/// [`release`]: GatedSource::release
#[derive(Debug, Clone)]
pub(crate) struct GatedSource {
    bytes: Arc<Vec<u8>>,
    gate: Arc<(Mutex<Gate>, Condvar)>,
}

impl GatedSource {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            gate: Arc::new((Mutex::new(Gate::default()), Condvar::new())),
        }
    }

    pub(crate) fn release(&self) {
        let (lock, cvar) = &*self.gate;
        if let Ok(mut gate) = lock.lock() {
            gate.released = true;
        }
        cvar.notify_all();
    }

    /// Block until a fetch has returned its bytes (bounded wait).
    pub(crate) fn wait_until_served(&self) {
        let (lock, cvar) = &*self.gate;
        let Ok(gate) = lock.lock() else { return };
        let _ = cvar
            .wait_timeout_while(gate, Duration::from_secs(5), |g| !g.served)
            .map(|(gate, _)| gate.served);
    }
}

impl AssetSource for GatedSource {
    fn fetch(
        &self,
        path: &str,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<u8>, GlobeError> {
        let (lock, cvar) = &*self.gate;
        {
            let gate = lock.lock().map_err(|e| GlobeError::AssetFetch {
                path: path.to_owned(),
                message: e.to_string(),
            })?;
            let _gate = cvar
                .wait_while(gate, |g| !g.released)
                .map_err(|e| GlobeError::AssetFetch {
                    path: path.to_owned(),
                    message: e.to_string(),
                })?;
        }
        let total = self.bytes.len() as u64;
        progress(total / 2, Some(total));
        progress(total, Some(total));
        let bytes = self.bytes.as_ref().clone();
        if let Ok(mut gate) = lock.lock() {
            gate.served = true;
        }
        cvar.notify_all();
        Ok(bytes)
    }
}
