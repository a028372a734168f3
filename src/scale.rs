//! Responsive model scaling by viewport width.

/// Viewport widths below this are [`ScaleTier::Small`].
pub const SMALL_BREAKPOINT: u32 = 640;
/// Viewport widths below this (and at least [`SMALL_BREAKPOINT`]) are
/// [`ScaleTier::Medium`].
pub const MEDIUM_BREAKPOINT: u32 = 768;

/// Discrete size class of the host viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleTier {
    /// Phones.
    Small,
    /// Tablets.
    Medium,
    /// Desktops.
    Large,
}

impl ScaleTier {
    /// Classify a viewport width.
    pub fn from_width(width: u32) -> Self {
        if width < SMALL_BREAKPOINT {
            Self::Small
        } else if width < MEDIUM_BREAKPOINT {
            Self::Medium
        } else {
            Self::Large
        }
    }

    /// Uniform model scale for this tier.
    pub fn factor(self) -> f32 {
        match self {
            Self::Small => 0.55,
            Self::Medium => 0.70,
            Self::Large => 0.85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_split_at_breakpoints() {
        assert_eq!(ScaleTier::from_width(0), ScaleTier::Small);
        assert_eq!(ScaleTier::from_width(639), ScaleTier::Small);
        assert_eq!(ScaleTier::from_width(640), ScaleTier::Medium);
        assert_eq!(ScaleTier::from_width(767), ScaleTier::Medium);
        assert_eq!(ScaleTier::from_width(768), ScaleTier::Large);
        assert_eq!(ScaleTier::from_width(3840), ScaleTier::Large);
    }

    #[test]
    fn factors_are_fixed() {
        assert_eq!(ScaleTier::Small.factor(), 0.55);
        assert_eq!(ScaleTier::Medium.factor(), 0.70);
        assert_eq!(ScaleTier::Large.factor(), 0.85);
    }

    #[test]
    fn every_width_maps_to_its_range() {
        for width in (0..2000).step_by(7) {
            let expected = if width < 640 {
                0.55
            } else if width < 768 {
                0.70
            } else {
                0.85
            };
            assert_eq!(ScaleTier::from_width(width).factor(), expected);
        }
    }
}
