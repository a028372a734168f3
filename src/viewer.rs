//! Standalone globe window backed by winit.
//!
//! The window is the globe's container: its logical inner size and scale
//! factor are the viewport metrics, redraw requests are the frame
//! scheduler, and window events are forwarded to the [`Globe`].
//!
//! ```no_run
//! # use orbis::Viewer;
//! Viewer::builder()
//!     .with_model("assets/models/scene.gltf")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::container::{Container, ListenerId, SurfaceId};
use crate::error::GlobeError;
use crate::frame::{FrameRequestId, FrameScheduler, MonotonicClock};
use crate::gpu::GlobeRenderer;
use crate::input::{InputEvent, MouseButton};
use crate::lifecycle::{Globe, GlobeHost};
use crate::model::{AssetSource, FileSource};
use crate::options::Options;
use crate::renderer::{RenderSurface, RendererConfig, SurfaceFactory};
use crate::viewport::ViewportDimensions;

// ── Container ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Attachments {
    surfaces: Vec<SurfaceId>,
    listeners: Vec<ListenerId>,
    next_listener: u64,
}

/// A winit window acting as the globe's container. Clones share state.
#[derive(Clone)]
pub struct WindowContainer {
    window: Arc<Window>,
    attachments: Rc<RefCell<Attachments>>,
}

impl WindowContainer {
    /// Wrap `window`.
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            attachments: Rc::default(),
        }
    }

    /// Whether any resize listener is registered.
    pub fn has_resize_listeners(&self) -> bool {
        !self.attachments.borrow().listeners.is_empty()
    }
}

impl Container for WindowContainer {
    fn client_size(&self) -> (u32, u32) {
        let logical = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        (logical.width.round() as u32, logical.height.round() as u32)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn append_surface(&self, surface: SurfaceId) {
        self.attachments.borrow_mut().surfaces.push(surface);
    }

    fn remove_surface(&self, surface: SurfaceId) -> bool {
        let mut attachments = self.attachments.borrow_mut();
        let before = attachments.surfaces.len();
        attachments.surfaces.retain(|&s| s != surface);
        attachments.surfaces.len() != before
    }

    fn add_resize_listener(&self) -> ListenerId {
        let mut attachments = self.attachments.borrow_mut();
        attachments.next_listener += 1;
        let id = ListenerId(attachments.next_listener);
        attachments.listeners.push(id);
        id
    }

    fn remove_resize_listener(&self, listener: ListenerId) -> bool {
        let mut attachments = self.attachments.borrow_mut();
        let before = attachments.listeners.len();
        attachments.listeners.retain(|&l| l != listener);
        attachments.listeners.len() != before
    }
}

// ── Frame scheduling ─────────────────────────────────────────────────────

/// Frame requests become `request_redraw` calls; the pending request fires
/// on the next `RedrawRequested`.
pub struct RedrawScheduler {
    window: Arc<Window>,
    next: Cell<u64>,
    pending: Cell<Option<FrameRequestId>>,
}

impl RedrawScheduler {
    /// Scheduler for `window`.
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next: Cell::new(0),
            pending: Cell::new(None),
        }
    }

    /// Consume the pending request, if any.
    pub fn take_pending(&self) -> Option<FrameRequestId> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&self) -> FrameRequestId {
        let id = FrameRequestId(self.next.get() + 1);
        self.next.set(id.0);
        self.pending.set(Some(id));
        self.window.request_redraw();
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        if self.pending.get() == Some(id) {
            self.pending.set(None);
        }
    }
}

// ── Surfaces ─────────────────────────────────────────────────────────────

/// Creates [`GlobeRenderer`]s presenting to the window.
pub struct WgpuSurfaceFactory {
    window: Arc<Window>,
    next_id: Cell<u64>,
}

impl WgpuSurfaceFactory {
    /// Factory for `window`.
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: Cell::new(0),
        }
    }
}

impl SurfaceFactory<WindowContainer> for WgpuSurfaceFactory {
    fn create_surface(
        &self,
        _container: &WindowContainer,
        dims: &ViewportDimensions,
        config: &RendererConfig,
    ) -> Result<Box<dyn RenderSurface>, GlobeError> {
        let id = SurfaceId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        let renderer = pollster::block_on(GlobeRenderer::new(
            id,
            Arc::clone(&self.window),
            dims,
            config,
        ))?;
        Ok(Box::new(renderer))
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    model: Option<String>,
    options: Option<Options>,
    source: Option<Arc<dyn AssetSource>>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            model: None,
            options: None,
            source: None,
            title: "Orbis".into(),
        }
    }

    /// Model path (or URL, with an HTTP source). Overrides
    /// `options.model.path`.
    #[must_use]
    pub fn with_model(mut self, path: impl Into<String>) -> Self {
        self.model = Some(path.into());
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Where to fetch the model from. Defaults to the working directory.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn AssetSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        let mut options = self.options.unwrap_or_default();
        if let Some(model) = self.model {
            options.model.path = model;
        }
        Viewer {
            options,
            source: self
                .source
                .unwrap_or_else(|| Arc::new(FileSource::default())),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing the rotating globe.
pub struct Viewer {
    options: Options,
    source: Arc<dyn AssetSource>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// [`GlobeError::Viewer`] if the event loop cannot be created or fails.
    pub fn run(self) -> Result<(), GlobeError> {
        let event_loop =
            EventLoop::new().map_err(|e| GlobeError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = ViewerApp {
            window: None,
            globe: None,
            container: None,
            scheduler: None,
            options: Some(self.options),
            source: self.source,
            title: self.title,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| GlobeError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    globe: Option<Globe<WindowContainer>>,
    container: Option<WindowContainer>,
    scheduler: Option<Rc<RedrawScheduler>>,
    options: Option<Options>,
    source: Arc<dyn AssetSource>,
    title: String,
}

impl ViewerApp {
    fn forward(&mut self, event: InputEvent) {
        if let Some(globe) = &mut self.globe {
            let _ = globe.handle_input(event);
        }
    }

    fn resized(&mut self) {
        let listening = self
            .container
            .as_ref()
            .is_some_and(WindowContainer::has_resize_listeners);
        if let (true, Some(globe)) = (listening, &mut self.globe) {
            let _ = globe.on_resize();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_transparent(true);
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.5) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.6) as u32;
            attrs.with_inner_size(winit::dpi::LogicalSize::new(
                logical_w, logical_h,
            ))
        } else {
            attrs
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let container = WindowContainer::new(Arc::clone(&window));
        let scheduler = Rc::new(RedrawScheduler::new(Arc::clone(&window)));
        let host = GlobeHost {
            factory: Box::new(WgpuSurfaceFactory::new(Arc::clone(&window))),
            scheduler: scheduler.clone(),
            clock: Rc::new(MonotonicClock),
            source: Arc::clone(&self.source),
        };
        let mut globe = Globe::new(host, self.options.take().unwrap_or_default());
        globe.initialize_globe(&container);

        self.window = Some(window);
        self.container = Some(container);
        self.scheduler = Some(scheduler);
        self.globe = Some(globe);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(globe) = &mut self.globe {
                    globe.cleanup();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(_)
            | WindowEvent::ScaleFactorChanged { .. } => self.resized(),

            WindowEvent::RedrawRequested => {
                let fired = self
                    .scheduler
                    .as_ref()
                    .and_then(|s| s.take_pending())
                    .is_some();
                if let (true, Some(globe)) = (fired, &mut self.globe) {
                    let _ = globe.on_frame();
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.forward(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let scale =
                    self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                let logical = position.to_logical::<f32>(scale);
                self.forward(InputEvent::CursorMoved {
                    x: logical.x,
                    y: logical.y,
                });
            }

            WindowEvent::CursorLeft { .. } => {
                self.forward(InputEvent::CursorLeft);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                self.forward(InputEvent::Scroll {
                    delta: scroll_delta,
                });
            }

            _ => (),
        }
    }
}
