//! Keyframe animation clips.
//!
//! A clip is a set of tracks, each driving one property (translation,
//! rotation or scale) of one node of the asset it was loaded with. Nodes are
//! addressed by their index in the asset; the mixer maps those indices to
//! scene nodes.

use glam::{Quat, Vec3, Vec4};

use crate::scene::Transform;

/// How values between two keyframes are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Linear (spherical linear for rotations).
    #[default]
    Linear,
    /// Hold the previous keyframe until the next one.
    Step,
    /// Cubic Hermite spline. Values are stored as
    /// `(in_tangent, value, out_tangent)` triples per keyframe.
    CubicSpline,
}

/// Keyframe values of one track.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackValues {
    /// Node translation.
    Translation(Vec<Vec3>),
    /// Node rotation.
    Rotation(Vec<Quat>),
    /// Node scale.
    Scale(Vec<Vec3>),
}

/// One animated property of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Index of the driven node within its asset.
    pub target: usize,
    /// Interpolation between keyframes.
    pub interpolation: Interpolation,
    /// Keyframe times in seconds, ascending.
    pub times: Vec<f32>,
    /// Keyframe values.
    pub values: TrackValues,
}

/// A sampled track value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackSample {
    /// Node translation.
    Translation(Vec3),
    /// Node rotation.
    Rotation(Quat),
    /// Node scale.
    Scale(Vec3),
}

impl TrackSample {
    /// Write this sample into the matching transform component.
    pub fn apply(self, transform: &mut Transform) {
        match self {
            Self::Translation(t) => transform.translation = t,
            Self::Rotation(r) => transform.rotation = r,
            Self::Scale(s) => transform.scale = s,
        }
    }
}

impl Track {
    /// Time of the last keyframe.
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value at `time`, clamped to the first/last keyframe outside the
    /// keyed range. `None` if the track has no usable keyframes.
    pub fn sample(&self, time: f32) -> Option<TrackSample> {
        let interp = self.interpolation;
        match &self.values {
            TrackValues::Translation(v) => {
                sample_channel(&self.times, v, interp, time)
                    .map(TrackSample::Translation)
            }
            TrackValues::Rotation(v) => {
                sample_channel(&self.times, v, interp, time)
                    .map(TrackSample::Rotation)
            }
            TrackValues::Scale(v) => sample_channel(&self.times, v, interp, time)
                .map(TrackSample::Scale),
        }
    }
}

/// A named set of tracks played together.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name from the asset, if any.
    pub name: Option<String>,
    /// Animated properties.
    pub tracks: Vec<Track>,
    duration: f32,
}

impl AnimationClip {
    /// Clip whose duration is the latest keyframe across `tracks`.
    pub fn new(name: Option<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0, f32::max);
        Self {
            name,
            tracks,
            duration,
        }
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Name for log output.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

trait Keyframe: Copy {
    fn scaled(self, s: f32) -> Self;
    fn lerp(a: Self, b: Self, t: f32) -> Self;
    fn hermite(p0: Self, m0: Self, p1: Self, m1: Self, t: f32) -> Self;
}

fn hermite_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    ]
}

impl Keyframe for Vec3 {
    fn scaled(self, s: f32) -> Self {
        self * s
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }

    fn hermite(p0: Self, m0: Self, p1: Self, m1: Self, t: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_weights(t);
        p0 * h00 + m0 * h10 + p1 * h01 + m1 * h11
    }
}

impl Keyframe for Quat {
    // Tangents are not unit quaternions; scale all four components.
    fn scaled(self, s: f32) -> Self {
        Quat::from_vec4(Vec4::from(self) * s)
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t)
    }

    fn hermite(p0: Self, m0: Self, p1: Self, m1: Self, t: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_weights(t);
        let v = Vec4::from(p0) * h00
            + Vec4::from(m0) * h10
            + Vec4::from(p1) * h01
            + Vec4::from(m1) * h11;
        Quat::from_vec4(v).normalize()
    }
}

fn sample_channel<T: Keyframe>(
    times: &[f32],
    values: &[T],
    interpolation: Interpolation,
    time: f32,
) -> Option<T> {
    let cubic = interpolation == Interpolation::CubicSpline;
    let stride = if cubic { 3 } else { 1 };
    let count = times.len().min(values.len() / stride);
    if count == 0 {
        return None;
    }
    let value = |k: usize| values[k * stride + usize::from(cubic)];

    let last = count - 1;
    if count == 1 || time <= times[0] {
        return Some(value(0));
    }
    if time >= times[last] {
        return Some(value(last));
    }

    // First keyframe strictly after `time`; 1..=last given the checks above.
    let next = times[..count].partition_point(|&k| k <= time);
    let prev = next - 1;
    let span = times[next] - times[prev];
    if span <= 0.0 {
        return Some(value(next));
    }
    let t = (time - times[prev]) / span;

    Some(match interpolation {
        Interpolation::Step => value(prev),
        Interpolation::Linear => T::lerp(value(prev), value(next), t),
        Interpolation::CubicSpline => {
            let out_tangent = values[prev * 3 + 2];
            let in_tangent = values[next * 3];
            T::hermite(
                value(prev),
                out_tangent.scaled(span),
                value(next),
                in_tangent.scaled(span),
                t,
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn translation_track(interpolation: Interpolation) -> Track {
        Track {
            target: 0,
            interpolation,
            times: vec![0.0, 1.0, 3.0],
            values: TrackValues::Translation(vec![
                Vec3::ZERO,
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(2.0, 4.0, 0.0),
            ]),
        }
    }

    fn translation(sample: Option<TrackSample>) -> Vec3 {
        match sample {
            Some(TrackSample::Translation(v)) => v,
            other => panic!("expected translation, got {other:?}"),
        }
    }

    #[test]
    fn linear_interpolates_between_keyframes() {
        let track = translation_track(Interpolation::Linear);
        assert_eq!(translation(track.sample(0.5)), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(translation(track.sample(2.0)), Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn samples_clamp_outside_keyed_range() {
        let track = translation_track(Interpolation::Linear);
        assert_eq!(translation(track.sample(-1.0)), Vec3::ZERO);
        assert_eq!(translation(track.sample(10.0)), Vec3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn step_holds_previous_value() {
        let track = translation_track(Interpolation::Step);
        assert_eq!(translation(track.sample(0.99)), Vec3::ZERO);
        assert_eq!(translation(track.sample(1.0)), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn rotation_uses_slerp() {
        let end = Quat::from_rotation_y(FRAC_PI_2);
        let track = Track {
            target: 0,
            interpolation: Interpolation::Linear,
            times: vec![0.0, 1.0],
            values: TrackValues::Rotation(vec![Quat::IDENTITY, end]),
        };
        let Some(TrackSample::Rotation(mid)) = track.sample(0.5) else {
            panic!("expected rotation");
        };
        let expected = Quat::from_rotation_y(FRAC_PI_2 * 0.5);
        assert!(mid.angle_between(expected) < 1e-4);
    }

    #[test]
    fn cubic_spline_with_zero_tangents_hits_keyframes() {
        let zero = Vec3::ZERO;
        let track = Track {
            target: 0,
            interpolation: Interpolation::CubicSpline,
            times: vec![0.0, 2.0],
            values: TrackValues::Scale(vec![
                zero,
                Vec3::ONE,
                zero,
                zero,
                Vec3::splat(3.0),
                zero,
            ]),
        };
        let at = |t| match track.sample(t) {
            Some(TrackSample::Scale(v)) => v,
            other => panic!("expected scale, got {other:?}"),
        };
        assert_eq!(at(0.0), Vec3::ONE);
        assert_eq!(at(2.0), Vec3::splat(3.0));
        // Smoothstep midpoint of 1 -> 3.
        assert!((at(1.0) - Vec3::splat(2.0)).length() < 1e-5);
    }

    #[test]
    fn clip_duration_is_latest_keyframe() {
        let clip = AnimationClip::new(
            Some("spin".to_owned()),
            vec![translation_track(Interpolation::Linear)],
        );
        assert_eq!(clip.duration(), 3.0);
        assert_eq!(clip.display_name(), "spin");
        assert_eq!(AnimationClip::new(None, vec![]).duration(), 0.0);
    }

    #[test]
    fn empty_track_has_no_sample() {
        let track = Track {
            target: 0,
            interpolation: Interpolation::Linear,
            times: vec![],
            values: TrackValues::Translation(vec![]),
        };
        assert!(track.sample(0.0).is_none());
    }
}
