//! The contract between the simulation and the window that hosts it.
//!
//! The host calls `setup` once, then `update` and `draw` once per frame, and
//! forwards input between frames. Everything runs on the host's thread.

use std::path::PathBuf;

use cgmath::Point2;

use crate::color::Rgba;

/// Mouse buttons, carrying the numeric codes the host reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u16),
}

impl MouseButton {
    pub fn from_code(code: u16) -> MouseButton {
        match code {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::Other(code) => code,
        }
    }
}

impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => MouseButton::Left,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            winit::event::MouseButton::Right => MouseButton::Right,
            winit::event::MouseButton::Back => MouseButton::from_code(3),
            winit::event::MouseButton::Forward => MouseButton::from_code(4),
            winit::event::MouseButton::Other(code) => MouseButton::Other(code),
        }
    }
}

/// Drawing primitives the host provides.
pub trait Canvas {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn set_background(&mut self, color: Rgba);
    fn set_frame_rate(&mut self, fps: u32);
    /// Color used by subsequent shapes.
    fn set_color(&mut self, color: Rgba);
    fn circle(&mut self, center: Point2<f32>, radius: f32);
}

pub trait Sketch {
    fn setup(&mut self, canvas: &mut dyn Canvas);

    fn update(&mut self) {}

    fn draw(&mut self, canvas: &mut dyn Canvas);

    fn key_pressed(&mut self, _key: winit::keyboard::KeyCode) {}

    fn key_released(&mut self, _key: winit::keyboard::KeyCode) {}

    fn mouse_moved(&mut self, _position: Point2<f32>) {}

    fn mouse_dragged(&mut self, _position: Point2<f32>, _button: MouseButton) {}

    fn mouse_pressed(&mut self, position: Point2<f32>, button: MouseButton);

    fn mouse_released(&mut self, _position: Point2<f32>, _button: MouseButton) {}

    fn window_resized(&mut self, _width: f32, _height: f32) {}

    /// A file was dropped onto the window.
    fn drag_event(&mut self, _path: PathBuf) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_codes_follow_host_numbering() {
        assert_eq!(MouseButton::from_code(0), MouseButton::Left);
        assert_eq!(MouseButton::from_code(1), MouseButton::Middle);
        assert_eq!(MouseButton::from_code(2), MouseButton::Right);
        assert_eq!(MouseButton::from_code(7), MouseButton::Other(7));
        assert_eq!(MouseButton::Right.code(), 2);
    }

    #[test]
    fn winit_buttons_convert() {
        assert_eq!(
            MouseButton::from(winit::event::MouseButton::Middle),
            MouseButton::Middle
        );
        assert_eq!(
            MouseButton::from(winit::event::MouseButton::Back),
            MouseButton::Other(3)
        );
    }
}
