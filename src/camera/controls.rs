use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::core::Camera;
use crate::input::{InputEvent, MouseButton};
use crate::options::ControlsOptions;

/// Keeps the polar angle off the exact poles where `look_at` degenerates.
const POLE_EPSILON: f32 = 1e-6;
/// Dolly factor per scroll unit when zoom is enabled.
const ZOOM_STEP: f32 = 0.95;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 500.0;

/// Position relative to the orbit target in spherical coordinates
/// (`theta` around +Y from +Z, `phi` down from +Y).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let ring = self.phi.sin() * self.radius;
        Vec3::new(
            ring * self.theta.sin(),
            self.radius * self.phi.cos(),
            ring * self.theta.cos(),
        )
    }
}

/// Orbit controls around a fixed target.
///
/// Dragging with the primary button queues azimuth/polar rotation; each
/// [`update`](Self::update) applies a damped share of the queue, adds
/// auto-rotation, clamps the polar angle, and writes the result into the
/// camera.
pub struct OrbitControls {
    target: Vec3,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,

    enable_damping: bool,
    damping_factor: f32,
    auto_rotate: bool,
    auto_rotate_speed: f32,
    rotate_speed: f32,
    enable_zoom: bool,
    min_polar_angle: f32,
    max_polar_angle: f32,

    dragging: bool,
    last_cursor: Option<Vec2>,
    disposed: bool,
}

impl OrbitControls {
    /// Bind controls to the camera's current eye and target.
    pub fn attach(camera: &Camera, options: &ControlsOptions) -> Self {
        let min_polar_angle = options.min_polar_angle.clamp(0.0, PI);
        Self {
            target: camera.target,
            spherical: Spherical::from_offset(camera.eye - camera.target),
            delta_theta: 0.0,
            delta_phi: 0.0,
            enable_damping: options.enable_damping,
            damping_factor: options.damping_factor.clamp(0.0, 1.0),
            auto_rotate: options.auto_rotate,
            auto_rotate_speed: options.auto_rotate_speed,
            rotate_speed: options.rotate_speed,
            enable_zoom: options.enable_zoom,
            min_polar_angle,
            max_polar_angle: options.max_polar_angle.clamp(min_polar_angle, PI),
            dragging: false,
            last_cursor: None,
            disposed: false,
        }
    }

    /// Advance damping and auto-rotation by `dt` seconds and move the
    /// camera. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera, dt: f32) -> bool {
        if self.disposed {
            return false;
        }

        if self.auto_rotate && !self.dragging {
            self.rotate_left(self.auto_rotation_angle(dt));
        }

        if self.enable_damping {
            self.spherical.theta += self.delta_theta * self.damping_factor;
            self.spherical.phi += self.delta_phi * self.damping_factor;
        } else {
            self.spherical.theta += self.delta_theta;
            self.spherical.phi += self.delta_phi;
        }
        self.spherical.theta %= TAU;
        self.spherical.phi = self
            .spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);

        let eye = self.target + self.spherical.to_offset();
        let moved = eye.distance_squared(camera.eye) > f32::EPSILON
            || camera.target != self.target;
        camera.eye = eye;
        camera.target = self.target;
        camera.up = Vec3::Y;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        moved
    }

    /// Feed a pointer event. `viewport_height` (logical pixels) scales drag
    /// distance to rotation. Returns `true` if the event was consumed.
    pub fn handle_input(
        &mut self,
        event: InputEvent,
        viewport_height: f32,
    ) -> bool {
        if self.disposed {
            return false;
        }
        match event {
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
            } => {
                self.dragging = pressed;
                true
            }
            InputEvent::MouseButton { .. } => false,
            InputEvent::CursorMoved { x, y } => {
                let cursor = Vec2::new(x, y);
                let previous = self.last_cursor.replace(cursor);
                if !self.dragging {
                    return false;
                }
                if let Some(previous) = previous {
                    let delta = cursor - previous;
                    let height = viewport_height.max(1.0);
                    self.rotate_left(TAU * delta.x / height * self.rotate_speed);
                    self.rotate_up(TAU * delta.y / height * self.rotate_speed);
                }
                true
            }
            InputEvent::Scroll { delta } => {
                if !self.enable_zoom {
                    return false;
                }
                self.spherical.radius = (self.spherical.radius
                    * ZOOM_STEP.powf(delta))
                .clamp(MIN_DISTANCE, MAX_DISTANCE);
                true
            }
            InputEvent::CursorLeft => {
                self.dragging = false;
                self.last_cursor = None;
                false
            }
        }
    }

    /// Release the input binding. Later events are ignored and `update`
    /// no longer moves the camera.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.dragging = false;
        self.last_cursor = None;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether a primary-button drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Current polar angle in radians (0 = looking down from +Y).
    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    /// Current azimuth in radians around +Y.
    pub fn azimuth(&self) -> f32 {
        self.spherical.theta
    }

    /// Current distance from the target.
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Radians per second; a speed of 1.0 is one revolution per minute.
    fn auto_rotation_angle(&self, dt: f32) -> f32 {
        TAU / 60.0 * self.auto_rotate_speed * dt
    }

    fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CameraOptions;

    fn camera() -> Camera {
        Camera::new(&CameraOptions::default(), 1.0)
    }

    fn still_options() -> ControlsOptions {
        ControlsOptions {
            auto_rotate: false,
            ..ControlsOptions::default()
        }
    }

    fn drag(controls: &mut OrbitControls, from: (f32, f32), to: (f32, f32)) {
        let _ = controls.handle_input(
            InputEvent::CursorMoved { x: from.0, y: from.1 },
            600.0,
        );
        let _ = controls.handle_input(
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            },
            600.0,
        );
        let _ = controls
            .handle_input(InputEvent::CursorMoved { x: to.0, y: to.1 }, 600.0);
        let _ = controls.handle_input(
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: false,
            },
            600.0,
        );
    }

    #[test]
    fn attach_preserves_camera_placement() {
        let mut cam = camera();
        let eye = cam.eye;
        let mut controls = OrbitControls::attach(&cam, &still_options());
        assert!((controls.distance() - eye.length()).abs() < 1e-5);
        let moved = controls.update(&mut cam, 1.0 / 60.0);
        assert!(!moved);
        assert!((cam.eye - eye).length() < 1e-4);
    }

    #[test]
    fn auto_rotation_is_damped() {
        let mut cam = camera();
        let mut controls =
            OrbitControls::attach(&cam, &ControlsOptions::default());
        let start = controls.azimuth();
        assert!(controls.update(&mut cam, 1.0));
        // rotate_left(2π/60 · 0.3 · 1s), applied at the 0.05 damping share
        let expected = -(TAU / 60.0 * 0.3) * 0.05;
        assert!((controls.azimuth() - start - expected).abs() < 1e-6);
    }

    #[test]
    fn drag_keeps_coasting_after_release() {
        let mut cam = camera();
        let mut controls = OrbitControls::attach(&cam, &still_options());
        drag(&mut controls, (100.0, 100.0), (160.0, 100.0));
        let a0 = controls.azimuth();
        let _ = controls.update(&mut cam, 0.016);
        let a1 = controls.azimuth();
        let _ = controls.update(&mut cam, 0.016);
        let a2 = controls.azimuth();
        let step1 = (a1 - a0).abs();
        let step2 = (a2 - a1).abs();
        assert!(step1 > 0.0);
        assert!(step2 > 0.0 && step2 < step1);
        assert!((step2 / step1 - 0.95).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = camera();
        let mut controls = OrbitControls::attach(&cam, &still_options());
        // Drag far downward: rotate_up with a large negative delta pushes phi
        // toward the top pole.
        drag(&mut controls, (0.0, 0.0), (0.0, 5000.0));
        for _ in 0..500 {
            let _ = controls.update(&mut cam, 0.016);
        }
        assert!(controls.polar_angle() >= PI * 0.3 - 1e-6);

        drag(&mut controls, (0.0, 5000.0), (0.0, -20000.0));
        for _ in 0..500 {
            let _ = controls.update(&mut cam, 0.016);
        }
        assert!(controls.polar_angle() <= PI * 0.7 + 1e-6);
        let phi_from_eye = (cam.eye.y / cam.eye.length()).acos();
        assert!((phi_from_eye - controls.polar_angle()).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_ignored_when_disabled() {
        let cam = camera();
        let mut controls =
            OrbitControls::attach(&cam, &ControlsOptions::default());
        let before = controls.distance();
        assert!(!controls.handle_input(InputEvent::Scroll { delta: 3.0 }, 600.0));
        assert_eq!(controls.distance(), before);
    }

    #[test]
    fn zoom_dollies_when_enabled() {
        let cam = camera();
        let mut controls = OrbitControls::attach(
            &cam,
            &ControlsOptions {
                enable_zoom: true,
                ..ControlsOptions::default()
            },
        );
        let before = controls.distance();
        assert!(controls.handle_input(InputEvent::Scroll { delta: 1.0 }, 600.0));
        assert!((controls.distance() - before * 0.95).abs() < 1e-5);
    }

    #[test]
    fn right_button_is_not_consumed() {
        let cam = camera();
        let mut controls =
            OrbitControls::attach(&cam, &ControlsOptions::default());
        assert!(!controls.handle_input(
            InputEvent::MouseButton {
                button: MouseButton::Right,
                pressed: true,
            },
            600.0,
        ));
        assert!(!controls.is_dragging());
    }

    #[test]
    fn disposed_controls_ignore_input_and_updates() {
        let mut cam = camera();
        let mut controls =
            OrbitControls::attach(&cam, &ControlsOptions::default());
        controls.dispose();
        controls.dispose();
        assert!(controls.is_disposed());
        assert!(!controls.handle_input(
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            },
            600.0,
        ));
        let eye = cam.eye;
        assert!(!controls.update(&mut cam, 1.0));
        assert_eq!(cam.eye, eye);
    }
}
