//! The globe component and the session it owns.
//!
//! A [`Globe`] is created once with its host collaborators and options. The
//! host mounts it with [`Globe::initialize_globe`], forwards frame, resize
//! and pointer events, and unmounts it with [`Globe::cleanup`]. Everything a
//! mounted globe owns lives in one [`GlobeSession`], so unmounting is just
//! tearing that value down.
//!
//! Nothing here returns errors to the host: initialization and model load
//! failures are logged, and events arriving without a mounted session are
//! ignored.

mod accessors;
mod construction;
mod frame;
mod teardown;

use std::rc::Rc;
use std::sync::Arc;

use crate::animation::AnimationMixer;
use crate::camera::{Camera, OrbitControls};
use crate::container::Container;
use crate::frame::{AnimationLoop, Clock, FrameScheduler};
use crate::input::InputEvent;
use crate::model::{AssetSource, ModelLoader};
use crate::options::Options;
use crate::renderer::{RenderSurface, SurfaceFactory};
use crate::resize::{ResizeController, ResizeOutcome, ResizeTargets};
use crate::scene::{NodeId, Scene};

/// The collaborators a globe needs from its host.
pub struct GlobeHost<C: Container> {
    /// Creates the render surface on mount.
    pub factory: Box<dyn SurfaceFactory<C>>,
    /// Schedules frame callbacks.
    pub scheduler: Rc<dyn FrameScheduler>,
    /// Monotonic time source for frame deltas and load timeouts.
    pub clock: Rc<dyn Clock>,
    /// Where the model bytes come from.
    pub source: Arc<dyn AssetSource>,
}

/// Everything one mount of the globe owns.
///
/// Fields are optional because initialization can stop part way; teardown
/// releases whatever exists.
pub struct GlobeSession<C: Container> {
    container: Option<C>,
    renderer: Option<Box<dyn RenderSurface>>,
    scene: Option<Scene>,
    camera: Option<Camera>,
    controls: Option<OrbitControls>,
    mixer: Option<AnimationMixer>,
    frame_loop: AnimationLoop,
    resize: ResizeController,
    loader: ModelLoader,
    /// Non-owning; the scene owns the node.
    model: Option<NodeId>,
}

impl<C: Container> GlobeSession<C> {
    fn new(container: C, host: &GlobeHost<C>, options: &Options) -> Self {
        Self {
            container: Some(container),
            renderer: None,
            scene: None,
            camera: None,
            controls: None,
            mixer: None,
            frame_loop: AnimationLoop::new(
                Rc::clone(&host.scheduler),
                Rc::clone(&host.clock),
            ),
            resize: ResizeController::default(),
            loader: ModelLoader::new(options.model.load_timeout()),
            model: None,
        }
    }
}

/// A mountable rotating globe.
pub struct Globe<C: Container> {
    host: GlobeHost<C>,
    options: Options,
    session: Option<GlobeSession<C>>,
}

impl<C: Container> Globe<C> {
    /// An unmounted globe.
    pub fn new(host: GlobeHost<C>, options: Options) -> Self {
        Self {
            host,
            options,
            session: None,
        }
    }

    /// Called when a scheduled frame fires. Returns `true` if a frame was
    /// rendered.
    pub fn on_frame(&mut self) -> bool {
        let now = self.host.clock.now();
        self.session
            .as_mut()
            .is_some_and(|session| session.tick(now))
    }

    /// Called when the container's size changed.
    pub fn on_resize(&mut self) -> Option<ResizeOutcome> {
        let session = self.session.as_mut()?;
        session.resize.handle(ResizeTargets {
            container: session.container.as_ref(),
            camera: session.camera.as_mut(),
            renderer: session.renderer.as_deref_mut(),
            scene: session.scene.as_mut(),
            model: session.model,
        })
    }

    /// Forward a pointer event to the orbit controls. Returns `true` if it
    /// was consumed.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let (Some(controls), Some(container)) =
            (session.controls.as_mut(), session.container.as_ref())
        else {
            return false;
        };
        let height = container.client_size().1 as f32;
        controls.handle_input(event, height)
    }
}

impl<C: Container> Drop for Globe<C> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
