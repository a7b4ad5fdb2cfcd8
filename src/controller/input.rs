//! Platform-agnostic input handling
//!
//! Both hosts translate their native events into [`InputEvent`]s: the web
//! host from DOM `keydown`/`resize`, the native host from winit.

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key went down. Carries the key's printed value (`KeyboardEvent.key`).
    KeyDown(String),
    /// The viewport changed size, in physical pixels.
    Resize { width: u32, height: u32 },
}

/// What a recognised key does to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    RaiseLight,
    LowerLight,
    PanLeft,
    PanRight,
}

impl KeyAction {
    /// Case-insensitive `w`/`s`/`a`/`d` mapping; anything else is `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "w" => Some(KeyAction::RaiseLight),
            "s" => Some(KeyAction::LowerLight),
            "a" => Some(KeyAction::PanLeft),
            "d" => Some(KeyAction::PanRight),
            _ => None,
        }
    }

    /// Direction of the step along the affected axis.
    pub fn sign(self) -> f32 {
        match self {
            KeyAction::RaiseLight | KeyAction::PanRight => 1.0,
            KeyAction::LowerLight | KeyAction::PanLeft => -1.0,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, Window};

    pub fn keyboard_event_to_input(e: &KeyboardEvent) -> InputEvent {
        InputEvent::KeyDown(e.key())
    }

    /// Current inner size of the browser window.
    pub fn window_size(window: &Window) -> (u32, u32) {
        let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>, fallback: f64| {
            v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback) as u32
        };
        (read(window.inner_width(), 800.0), read(window.inner_height(), 600.0))
    }

    pub fn resize_to_input(window: &Window) -> InputEvent {
        let (width, height) = window_size(window);
        InputEvent::Resize { width, height }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::event::{ElementState, KeyEvent, WindowEvent};
    use winit::keyboard::Key;

    /// Translate the winit events the scene cares about.
    pub fn window_event_to_input(event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { state: ElementState::Pressed, logical_key, .. },
                ..
            } => match logical_key {
                Key::Character(s) => Some(InputEvent::KeyDown(s.to_string())),
                _ => None,
            },
            WindowEvent::Resized(size) => Some(InputEvent::Resize { width: size.width, height: size.height }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_maps_case_insensitively() {
        assert_eq!(KeyAction::from_key("w"), Some(KeyAction::RaiseLight));
        assert_eq!(KeyAction::from_key("W"), Some(KeyAction::RaiseLight));
        assert_eq!(KeyAction::from_key("S"), Some(KeyAction::LowerLight));
        assert_eq!(KeyAction::from_key("a"), Some(KeyAction::PanLeft));
        assert_eq!(KeyAction::from_key("D"), Some(KeyAction::PanRight));
    }

    #[test]
    fn other_keys_are_ignored() {
        for key in ["q", "ArrowUp", " ", "", "ww", "Shift"] {
            assert_eq!(KeyAction::from_key(key), None, "{key:?}");
        }
    }

    #[test]
    fn signs_pair_up() {
        assert_eq!(KeyAction::RaiseLight.sign(), -KeyAction::LowerLight.sign());
        assert_eq!(KeyAction::PanLeft.sign(), -1.0);
    }
}
