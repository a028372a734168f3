//! Viewport metrics read from a [`Container`].

use crate::container::Container;
use crate::error::GlobeError;

/// Container size and pixel density, read on demand.
///
/// Never cache one of these across frames: the host can resize at any time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportDimensions {
    /// Container width in logical pixels.
    pub width: u32,
    /// Container height in logical pixels.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
    /// Host viewport width used for the responsive scale tier.
    pub viewport_width: u32,
}

impl ViewportDimensions {
    /// Read the current metrics of `container`.
    pub fn read<C: Container>(container: &C) -> Self {
        let (width, height) = container.client_size();
        Self {
            width,
            height,
            device_pixel_ratio: container.device_pixel_ratio(),
            viewport_width: container.viewport_width(),
        }
    }

    /// Width over height.
    ///
    /// # Errors
    ///
    /// Returns [`GlobeError::InvalidViewport`] when the height is zero.
    pub fn aspect(&self) -> Result<f32, GlobeError> {
        if self.height == 0 {
            return Err(GlobeError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.width as f32 / self.height as f32)
    }

    /// Device pixel ratio capped at `max_ratio`.
    pub fn clamped_pixel_ratio(&self, max_ratio: f32) -> f32 {
        (self.device_pixel_ratio as f32).min(max_ratio)
    }

    /// Physical render-target size for the clamped pixel ratio.
    pub fn physical_size(&self, max_ratio: f32) -> (u32, u32) {
        let ratio = self.clamped_pixel_ratio(max_ratio);
        (
            ((self.width as f32 * ratio).round() as u32).max(1),
            ((self.height as f32 * ratio).round() as u32).max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeContainer;

    #[test]
    fn reads_container_metrics() {
        let container = FakeContainer::new(400, 300);
        container.set_pixel_ratio(1.5);
        let dims = ViewportDimensions::read(&container);
        assert_eq!((dims.width, dims.height), (400, 300));
        assert_eq!(dims.device_pixel_ratio, 1.5);
        assert_eq!(dims.viewport_width, 400);
        assert_eq!(dims.aspect().unwrap(), 400.0 / 300.0);
    }

    #[test]
    fn zero_height_has_no_aspect() {
        let container = FakeContainer::new(400, 0);
        let dims = ViewportDimensions::read(&container);
        assert!(matches!(
            dims.aspect(),
            Err(GlobeError::InvalidViewport { width: 400, height: 0 })
        ));
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        let container = FakeContainer::new(100, 50);
        container.set_pixel_ratio(3.0);
        let dims = ViewportDimensions::read(&container);
        assert_eq!(dims.clamped_pixel_ratio(2.0), 2.0);
        assert_eq!(dims.physical_size(2.0), (200, 100));

        container.set_pixel_ratio(1.25);
        let dims = ViewportDimensions::read(&container);
        assert_eq!(dims.physical_size(2.0), (125, 63));
    }

    #[test]
    fn low_pixel_ratio_is_kept() {
        let container = FakeContainer::new(400, 300);
        container.set_pixel_ratio(0.5);
        let dims = ViewportDimensions::read(&container);
        assert_eq!(dims.clamped_pixel_ratio(2.0), 0.5);
        assert_eq!(dims.physical_size(2.0), (200, 150));

        container.resize(1, 1);
        let dims = ViewportDimensions::read(&container);
        assert_eq!(dims.physical_size(2.0), (1, 1));
    }
}
