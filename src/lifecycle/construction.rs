//! Mounting: building a session step by step.

use std::sync::Arc;

use super::{Globe, GlobeHost, GlobeSession};
use crate::camera::OrbitControls;
use crate::container::Container;
use crate::error::GlobeError;
use crate::options::Options;
use crate::renderer::{self, RendererConfig};
use crate::resize::ResizeController;
use crate::scene::{build_scene, install_lighting};
use crate::viewport::ViewportDimensions;

impl<C: Container> Globe<C> {
    /// Mount the globe into `container`.
    ///
    /// Builds the scene and camera, the renderer, lighting and controls,
    /// starts the model load in the background, registers the resize
    /// listener and starts the frame loop. A failing step is logged and
    /// stops construction; the partial session is still released by
    /// [`cleanup`](Self::cleanup). Mounting an already-mounted globe logs a
    /// warning and does nothing.
    pub fn initialize_globe(&mut self, container: &C) {
        if self.session.is_some() {
            log::warn!("initialize_globe called on a mounted globe; ignoring");
            return;
        }
        let mut session =
            GlobeSession::new(container.clone(), &self.host, &self.options);
        match session.build(container, &self.host, &self.options) {
            Ok(()) => log::info!("Globe initialized"),
            Err(e) => log::error!("Failed to initialize globe: {e}"),
        }
        self.session = Some(session);
    }
}

impl<C: Container> GlobeSession<C> {
    fn build(
        &mut self,
        container: &C,
        host: &GlobeHost<C>,
        options: &Options,
    ) -> Result<(), GlobeError> {
        let dims = ViewportDimensions::read(container);
        let (scene, camera) = build_scene(&dims, &options.camera)?;
        let scene = self.scene.insert(scene);
        let camera = self.camera.insert(camera);

        let config = RendererConfig::from(&options.renderer);
        self.renderer = Some(renderer::create(
            host.factory.as_ref(),
            container,
            &dims,
            &config,
        )?);

        install_lighting(scene, &options.lighting);
        self.controls = Some(OrbitControls::attach(camera, &options.controls));

        // A load that cannot start leaves the globe modelless, not broken.
        if let Err(e) = self.loader.load(
            &options.model.path,
            Arc::clone(&host.source),
            host.clock.now(),
        ) {
            log::error!("Failed to start model load: {e}");
        }

        self.resize = ResizeController::attach(container);
        self.frame_loop.start();
        Ok(())
    }
}
