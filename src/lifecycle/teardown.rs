//! Unmounting.

use super::{Globe, GlobeSession};
use crate::container::Container;
use crate::renderer;

impl<C: Container> Globe<C> {
    /// Release everything the mounted session owns. Safe to call on a
    /// partially built session, before any mount, and more than once.
    pub fn cleanup(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.teardown();
        log::info!("Globe cleaned up");
    }
}

impl<C: Container> GlobeSession<C> {
    /// Ordered release: loop, resize listener, animations, renderer,
    /// controls, loader, then every remaining handle.
    fn teardown(&mut self) {
        self.frame_loop.stop();
        if let Some(container) = self.container.as_ref() {
            self.resize.detach(container);
        }
        if let Some(mixer) = self.mixer.as_mut() {
            mixer.stop_all_action();
        }
        renderer::dispose(&mut self.renderer, self.container.as_ref());
        if let Some(controls) = self.controls.as_mut() {
            controls.dispose();
        }
        self.loader.cancel();

        self.mixer = None;
        self.controls = None;
        self.model = None;
        self.camera = None;
        self.scene = None;
        self.container = None;
    }
}
