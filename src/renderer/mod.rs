//! The rendering surface seam.
//!
//! A [`RenderSurface`] draws a [`Scene`] through a [`Camera`] into a surface
//! attached to a [`Container`]. Surfaces are produced by a
//! [`SurfaceFactory`]; the wgpu implementation lives in
//! [`gpu`](crate::gpu), and tests use recording fakes.

use crate::camera::Camera;
use crate::container::{Container, SurfaceId};
use crate::error::GlobeError;
use crate::options::{
    OutputColorSpace, RendererOptions, ShadowFilter, ToneMapping,
};
use crate::scene::Scene;
use crate::viewport::ViewportDimensions;

/// MSAA sample count used when antialiasing is enabled.
pub const MSAA_SAMPLES: u32 = 4;

/// Resolved surface configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    /// Multisample the geometry pass.
    pub antialias: bool,
    /// Composite with premultiplied alpha over the host instead of opaque.
    pub alpha: bool,
    /// Upper bound on physical pixels per logical pixel.
    pub max_pixel_ratio: f32,
    /// Encoding of the presented image.
    pub output_color_space: OutputColorSpace,
    /// HDR to display curve.
    pub tone_mapping: ToneMapping,
    /// Exposure multiplier applied before tone mapping.
    pub exposure: f32,
    /// Render the directional light's shadow map.
    pub shadows: bool,
    /// Shadow map sampling.
    pub shadow_filter: ShadowFilter,
}

impl From<&RendererOptions> for RendererConfig {
    fn from(options: &RendererOptions) -> Self {
        Self {
            antialias: options.antialias,
            alpha: options.alpha,
            max_pixel_ratio: options.max_pixel_ratio,
            output_color_space: options.output_color_space,
            tone_mapping: options.tone_mapping,
            exposure: options.exposure,
            shadows: options.shadows,
            shadow_filter: options.shadow_filter,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::from(&RendererOptions::default())
    }
}

impl RendererConfig {
    /// Geometry pass sample count.
    pub fn sample_count(&self) -> u32 {
        if self.antialias {
            MSAA_SAMPLES
        } else {
            1
        }
    }
}

/// A GPU-backed drawing surface.
pub trait RenderSurface {
    /// Identity of the surface within its container.
    fn id(&self) -> SurfaceId;

    /// Logical size `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Pixel ratio in effect, already clamped.
    fn pixel_ratio(&self) -> f32;

    /// Match a new container size.
    fn resize(&mut self, dims: &ViewportDimensions);

    /// Draw one frame.
    ///
    /// # Errors
    ///
    /// [`GlobeError::Render`] when the frame could not be produced.
    fn render(&mut self, scene: &Scene, camera: &Camera)
        -> Result<(), GlobeError>;

    /// Release GPU resources. Idempotent.
    fn dispose(&mut self);

    /// Whether [`dispose`](Self::dispose) has run.
    fn is_disposed(&self) -> bool;
}

/// Produces surfaces for a container type.
pub trait SurfaceFactory<C: Container> {
    /// Create a surface sized for `dims`.
    ///
    /// # Errors
    ///
    /// Any GPU initialization failure.
    fn create_surface(
        &self,
        container: &C,
        dims: &ViewportDimensions,
        config: &RendererConfig,
    ) -> Result<Box<dyn RenderSurface>, GlobeError>;
}

/// Create a surface and attach it to `container`.
///
/// # Errors
///
/// Propagates the factory's error; nothing is attached in that case.
pub fn create<C: Container>(
    factory: &dyn SurfaceFactory<C>,
    container: &C,
    dims: &ViewportDimensions,
    config: &RendererConfig,
) -> Result<Box<dyn RenderSurface>, GlobeError> {
    let surface = factory.create_surface(container, dims, config)?;
    container.append_surface(surface.id());
    let (width, height) = surface.size();
    log::info!(
        "Renderer ready: {width}x{height} @{:.2}x, {} sample(s)",
        surface.pixel_ratio(),
        config.sample_count()
    );
    Ok(surface)
}

/// Release `renderer` (if any) and detach it from `container`. Leaves
/// `None` behind, so a second call does nothing.
pub fn dispose<C: Container>(
    renderer: &mut Option<Box<dyn RenderSurface>>,
    container: Option<&C>,
) {
    let Some(mut surface) = renderer.take() else {
        return;
    };
    surface.dispose();
    if let Some(container) = container {
        if !container.remove_surface(surface.id()) {
            log::debug!("surface {:?} was not attached", surface.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeContainer, FakeSurfaceFactory};

    fn dims(container: &FakeContainer) -> ViewportDimensions {
        ViewportDimensions::read(container)
    }

    #[test]
    fn config_follows_options() {
        let config = RendererConfig::default();
        assert!(config.antialias && config.alpha && config.shadows);
        assert_eq!(config.sample_count(), 4);
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert_eq!(config.exposure, 2.0);
        assert_eq!(config.tone_mapping, ToneMapping::AcesFilmic);
        assert_eq!(config.shadow_filter, ShadowFilter::PcfSoft);

        let opts = RendererOptions {
            antialias: false,
            ..RendererOptions::default()
        };
        assert_eq!(RendererConfig::from(&opts).sample_count(), 1);
    }

    #[test]
    fn create_attaches_and_dispose_detaches() {
        let container = FakeContainer::new(400, 300);
        let factory = FakeSurfaceFactory::default();
        let mut renderer = Some(
            create(&factory, &container, &dims(&container), &RendererConfig::default())
                .unwrap(),
        );
        assert_eq!(container.surface_count(), 1);

        dispose(&mut renderer, Some(&container));
        assert!(renderer.is_none());
        assert_eq!(container.surface_count(), 0);
        assert_eq!(factory.disposed_count(), 1);

        dispose(&mut renderer, Some(&container));
        assert_eq!(factory.disposed_count(), 1);
    }

    #[test]
    fn failed_creation_attaches_nothing() {
        let container = FakeContainer::new(400, 300);
        let factory = FakeSurfaceFactory::failing();
        let result =
            create(&factory, &container, &dims(&container), &RendererConfig::default());
        assert!(matches!(result, Err(GlobeError::Gpu(_) | GlobeError::Render(_))));
        assert_eq!(container.surface_count(), 0);
    }
}
