//! Camera controllers.
//!
//! A controller accumulates user input between frames and applies it to the
//! camera once per tick from [`CameraControls::update`].

use std::f32::consts::PI;

use glam::Vec3;
use winit::event::WindowEvent;

use crate::camera::PerspectiveCamera;
use crate::core::{Button, Controller, WindowDimensions, WinitController};

const EPS: f32 = 1e-6;

/// Camera movement and control abstraction
pub trait CameraControls {
    /// Feed a platform input event, returns true if the controller used it
    fn process_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    /// Advance internal state (damping, inertia) and move the camera
    /// Returns true if the camera changed
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool;

    /// Render surface changed size. `camera` already carries the new projection.
    fn resize(&mut self, _dimensions: WindowDimensions, _camera: &PerspectiveCamera) {}
}

/// Spherical coordinates around the Y axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y
    phi: f32,
    /// Azimuth around Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                phi: PI / 2.0,
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
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit controller - rotates, pans and dollies the camera around a target
///
/// Left drag rotates, right drag or shift + left drag pans, middle drag and
/// the wheel dolly, arrow keys pan. With damping enabled the accumulated
/// motion is applied gradually so the camera keeps gliding after input stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Pixels panned per update while an arrow key is held
    pub key_pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    input: WinitController,
    viewport: WindowDimensions,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera, viewport: WindowDimensions) -> Self {
        Self {
            target: camera.target,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            key_pan_speed: 7.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            input: WinitController::new(),
            viewport,
            spherical_delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// Input state, for driving the controller without a window
    pub fn input_mut(&mut self) -> &mut WinitController {
        &mut self.input
    }

    /// Orbit horizontally by `angle` radians
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    /// Orbit vertically by `angle` radians
    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Move closer to the target, `factor` in (0, 1)
    pub fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Move away from the target, `factor` in (0, 1)
    pub fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    /// Pan by a screen-space distance in pixels
    pub fn pan(&mut self, camera: &PerspectiveCamera, delta_x: f32, delta_y: f32) {
        let height = self.viewport.height.max(1) as f32;
        let distance = (camera.position - self.target).length();
        let target_distance = distance * (camera.fov.to_radians() / 2.0).tan();

        let forward = camera.forward();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        let pan_left = 2.0 * delta_x * target_distance / height * self.pan_speed;
        let pan_up = 2.0 * delta_y * target_distance / height * self.pan_speed;

        self.pan_offset += -right * pan_left + up * pan_up;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Turn the input accumulated since the last update into motion
    fn consume_input(&mut self, camera: &PerspectiveCamera) {
        let (dx, dy) = self.input.mouse_delta();
        let height = self.viewport.height.max(1) as f32;
        let shift = self.input.is_down(Button::Shift);

        if self.input.is_down(Button::MouseLeft) && !shift {
            self.rotate_left(2.0 * PI * dx / height * self.rotate_speed);
            self.rotate_up(2.0 * PI * dy / height * self.rotate_speed);
        } else if self.input.is_down(Button::MouseRight)
            || (self.input.is_down(Button::MouseLeft) && shift)
        {
            self.pan(camera, dx, dy);
        } else if self.input.is_down(Button::MouseMiddle) && dy != 0.0 {
            if dy > 0.0 {
                self.dolly_out(self.zoom_scale());
            } else {
                self.dolly_in(self.zoom_scale());
            }
        }

        let lines = self.input.scroll_delta();
        if lines != 0.0 {
            self.scale *= self.zoom_scale().powf(lines);
        }

        let key_x = self.input.axis(Button::ArrowRight, Button::ArrowLeft) * self.key_pan_speed;
        let key_y = self.input.axis(Button::ArrowDown, Button::ArrowUp) * self.key_pan_speed;
        if key_x != 0.0 || key_y != 0.0 {
            self.pan(camera, key_x, key_y);
        }

        self.input.reset_deltas();
    }
}

impl CameraControls for OrbitControls {
    fn process_event(&mut self, event: &WindowEvent) -> bool {
        self.input.process_event(event)
    }

    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        self.consume_input(camera);

        let previous_position = camera.position;
        let previous_target = self.target;

        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= keep;
            self.spherical_delta.phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (camera.position - previous_position).length_squared() > EPS
            || (self.target - previous_target).length_squared() > EPS
    }

    fn resize(&mut self, dimensions: WindowDimensions, _camera: &PerspectiveCamera) {
        self.viewport = dimensions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        camera.position = position;
        camera
    }

    fn controls_for(camera: &PerspectiveCamera) -> OrbitControls {
        OrbitControls::new(camera, WindowDimensions::new(800, 600))
    }

    #[test]
    fn test_spherical_round_trip_offset() {
        let offset = Vec3::new(1.0, 2.0, 3.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-4);
    }

    #[test]
    fn test_update_without_input_is_idle() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);

        assert!(!controls.update(&mut camera));
        assert!((camera.position - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_rotate_keeps_distance() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);
        controls.enable_damping = false;

        controls.rotate_left(PI / 2.0);
        assert!(controls.update(&mut camera));

        assert!((camera.position.length() - 10.0).abs() < 1e-3);
        // theta decreased by a quarter turn: +Z swings to -X
        assert!((camera.position - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-3);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_damping_applies_fraction_and_glides() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);

        controls.rotate_left(1.0);
        controls.update(&mut camera);
        let first = Spherical::from_offset(camera.position).theta;
        assert!((first + 0.05).abs() < 1e-4);

        // No new input, but the residual keeps moving the camera
        assert!(controls.update(&mut camera));
        let second = Spherical::from_offset(camera.position).theta;
        assert!((second - first + 0.05 * 0.95).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_clamped() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);
        controls.enable_damping = false;

        controls.rotate_up(10.0);
        controls.update(&mut camera);

        // Pinned just short of the pole, still at the same distance
        assert!(camera.position.y > 9.99);
        assert!((camera.position.length() - 10.0).abs() < 1e-3);
        assert!(camera.position.is_finite());
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn test_dolly_in_reduces_distance() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);

        controls.dolly_in(0.5);
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_distance_limits() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);
        controls.min_distance = 8.0;

        controls.dolly_in(0.1);
        controls.update(&mut camera);
        assert!((camera.position.length() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_pan_moves_target_and_camera_together() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);
        controls.enable_damping = false;

        controls.pan(&camera, 100.0, 0.0);
        controls.update(&mut camera);

        // Dragging right moves the view left
        assert!(controls.target.x < 0.0);
        assert!((camera.position - controls.target - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-3);
        assert_eq!(camera.target, controls.target);
    }

    #[test]
    fn test_left_drag_rotates() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);
        controls.enable_damping = false;

        let input = controls.input_mut();
        input.press(Button::MouseLeft);
        input.move_cursor(400.0, 300.0);
        input.move_cursor(500.0, 300.0);

        assert!(controls.update(&mut camera));
        assert!(camera.position.x < 0.0);
        assert!((camera.position.length() - 10.0).abs() < 1e-3);

        // Deltas were consumed
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_wheel_zooms_in() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = controls_for(&camera);

        controls.input_mut().scroll(1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 9.5).abs() < 1e-3);
    }

    #[test]
    fn test_camera_at_target_stays_finite() {
        let mut camera = camera_at(Vec3::ZERO);
        let mut controls = controls_for(&camera);

        controls.rotate_left(0.3);
        controls.update(&mut camera);
        assert!(camera.position.is_finite());
        assert!(camera.view_matrix().is_finite());
    }
}
