use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Pixels of trackpad scroll that count as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// All pressed buttons as a vec (for efficient get_down_keys)
    pressed_vec: Vec<Button>,
    /// Current cursor position (relative to window)
    mouse_position: Option<(f32, f32)>,
    /// Cursor movement since last reset
    mouse_delta: (f32, f32),
    /// Wheel lines since last reset, positive away from the user
    scroll_delta: f32,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent, returns true if it was an input event
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(keycode) = event.physical_key else {
                    return false;
                };
                let Some(button) = Self::keycode_to_button(keycode) else {
                    return false;
                };
                match event.state {
                    ElementState::Pressed => self.press(button),
                    ElementState::Released => self.release(button),
                }
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(btn) = Self::mouse_button_to_button(*button) else {
                    return false;
                };
                match state {
                    ElementState::Pressed => self.press(btn),
                    ElementState::Released => self.release(btn),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(lines);
                true
            }
            WindowEvent::Focused(false) => {
                self.pressed_keys.clear();
                self.pressed_vec.clear();
                true
            }
            _ => false,
        }
    }

    pub fn press(&mut self, button: Button) {
        if self.pressed_keys.insert(button) {
            self.pressed_vec.push(button);
        }
    }

    pub fn release(&mut self, button: Button) {
        if self.pressed_keys.remove(&button) {
            self.pressed_vec.retain(|&b| b != button);
        }
    }

    /// Move the cursor, accumulating the delta from the last known position
    pub fn move_cursor(&mut self, x: f32, y: f32) {
        if let Some((old_x, old_y)) = self.mouse_position {
            self.mouse_delta.0 += x - old_x;
            self.mouse_delta.1 += y - old_y;
        }
        self.mouse_position = Some((x, y));
    }

    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    /// Reset per-frame state (mouse and scroll deltas)
    /// Call this at the end of each frame after processing input
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::ArrowUp => Some(Button::ArrowUp),
            KeyCode::ArrowDown => Some(Button::ArrowDown),
            KeyCode::ArrowLeft => Some(Button::ArrowLeft),
            KeyCode::ArrowRight => Some(Button::ArrowRight),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Middle => Some(Button::MouseMiddle),
            MouseButton::Right => Some(Button::MouseRight),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed_vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Winit events carry device ids that tests cannot construct,
    // so these drive the adapter through its direct methods

    #[test]
    fn test_new_controller_empty() {
        let controller = WinitController::new();
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.get_down_keys().len(), 0);
        assert_eq!(controller.mouse_position(), None);
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));
        assert_eq!(controller.scroll_delta(), 0.0);
    }

    #[test]
    fn test_press_release() {
        let mut controller = WinitController::new();
        controller.press(Button::MouseLeft);
        controller.press(Button::MouseLeft);
        controller.press(Button::Shift);

        assert_eq!(controller.get_down_keys(), &[Button::MouseLeft, Button::Shift]);

        controller.release(Button::MouseLeft);
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.get_down_keys(), &[Button::Shift]);
    }

    #[test]
    fn test_cursor_delta_accumulates() {
        let mut controller = WinitController::new();
        // First position only establishes the origin
        controller.move_cursor(100.0, 100.0);
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));

        controller.move_cursor(110.0, 95.0);
        controller.move_cursor(115.0, 90.0);
        assert_eq!(controller.mouse_delta(), (15.0, -10.0));
    }

    #[test]
    fn test_delta_reset() {
        let mut controller = WinitController::new();
        controller.move_cursor(100.0, 200.0);
        controller.move_cursor(110.0, 205.0);
        controller.scroll(2.0);

        controller.reset_deltas();
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));
        assert_eq!(controller.scroll_delta(), 0.0);
        // Position should remain
        assert_eq!(controller.mouse_position(), Some((110.0, 205.0)));
    }

    #[test]
    fn test_only_orbit_keys_are_tracked() {
        assert_eq!(
            WinitController::keycode_to_button(KeyCode::ArrowLeft),
            Some(Button::ArrowLeft)
        );
        assert_eq!(
            WinitController::keycode_to_button(KeyCode::ShiftRight),
            Some(Button::Shift)
        );
        // Escape belongs to the app shell, not the camera
        assert_eq!(WinitController::keycode_to_button(KeyCode::Escape), None);
        assert_eq!(WinitController::keycode_to_button(KeyCode::KeyW), None);
    }
}
