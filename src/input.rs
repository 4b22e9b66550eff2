//! Input events consumed by the intro.
//!
//! The animator only understands a handful of environment signals: viewport
//! resizes, the page scroll offset, wheel movement, key presses and pointer
//! clicks. [`InputEvent`] is that vocabulary. [`WindowInput`] translates raw
//! winit window events into it for the native runner.
//!
//! Wheel deltas follow the web convention: positive `delta_y` means the
//! content moves up, i.e. the user scrolls down.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Pixels per wheel "line" when the platform reports line deltas.
pub const LINE_HEIGHT: f32 = 40.0;

/// Keyboard keys the intro distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Escape,
    Space,
    Enter,
    Tab,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Other(u32),
}

impl KeyCode {
    /// Keys that dismiss the intro.
    pub fn is_dismiss_key(&self) -> bool {
        matches!(self, KeyCode::Escape | KeyCode::Space | KeyCode::Enter)
    }
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Enter | WinitKeyCode::NumpadEnter => KeyCode::Enter,
            WinitKeyCode::Tab => KeyCode::Tab,
            WinitKeyCode::ArrowUp => KeyCode::Up,
            WinitKeyCode::ArrowDown => KeyCode::Down,
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,
            WinitKeyCode::PageUp => KeyCode::PageUp,
            WinitKeyCode::PageDown => KeyCode::PageDown,
            WinitKeyCode::Home => KeyCode::Home,
            WinitKeyCode::End => KeyCode::End,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Classes of events a listener can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Resize,
    Scroll,
    Wheel,
    KeyDown,
    Click,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Resize,
        EventKind::Scroll,
        EventKind::Wheel,
        EventKind::KeyDown,
        EventKind::Click,
    ];
}

/// An environment signal delivered to the intro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The viewport changed size (pixels).
    Resize { width: u32, height: u32 },
    /// The page's vertical scroll offset (pixels from top).
    Scroll { offset_y: f32 },
    /// Wheel movement; positive is downward.
    Wheel { delta_y: f32 },
    /// A key went down.
    Key(KeyCode),
    /// Primary pointer click at a position.
    Click { position: Vec2 },
}

impl InputEvent {
    /// The listener class this event is dispatched to.
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::Resize { .. } => EventKind::Resize,
            InputEvent::Scroll { .. } => EventKind::Scroll,
            InputEvent::Wheel { .. } => EventKind::Wheel,
            InputEvent::Key(_) => EventKind::KeyDown,
            InputEvent::Click { .. } => EventKind::Click,
        }
    }
}

/// Wheel delta in web convention (positive = scrolling down, pixels).
pub fn wheel_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
    }
}

/// Translates winit window events into [`InputEvent`]s.
///
/// A native window has no page to scroll, so wheel movement also drives a
/// virtual scroll offset that never goes above the top of the page.
#[derive(Debug, Default)]
pub struct WindowInput {
    cursor: Vec2,
    scroll_offset: f32,
}

impl WindowInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual scroll offset.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Last known cursor position.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Translate one window event. Most events yield nothing; a wheel event
    /// yields the wheel delta followed by the updated scroll offset.
    pub fn translate(&mut self, event: &WindowEvent) -> Vec<InputEvent> {
        match event {
            WindowEvent::Resized(size) => vec![InputEvent::Resize {
                width: size.width,
                height: size.height,
            }],

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return Vec::new();
                }
                match event.physical_key {
                    PhysicalKey::Code(code) => vec![InputEvent::Key(KeyCode::from(code))],
                    PhysicalKey::Unidentified(_) => Vec::new(),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Vec::new()
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => vec![InputEvent::Click {
                position: self.cursor,
            }],

            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = wheel_delta_y(delta);
                self.scroll_offset = (self.scroll_offset + delta_y).max(0.0);
                vec![
                    InputEvent::Wheel { delta_y },
                    InputEvent::Scroll {
                        offset_y: self.scroll_offset,
                    },
                ]
            }

            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    #[test]
    fn test_dismiss_keys() {
        assert!(KeyCode::Escape.is_dismiss_key());
        assert!(KeyCode::Space.is_dismiss_key());
        assert!(KeyCode::Enter.is_dismiss_key());
        assert!(!KeyCode::Down.is_dismiss_key());
        assert!(!KeyCode::Other(7).is_dismiss_key());
    }

    #[test]
    fn test_winit_key_mapping() {
        assert_eq!(KeyCode::from(WinitKeyCode::Escape), KeyCode::Escape);
        assert_eq!(KeyCode::from(WinitKeyCode::NumpadEnter), KeyCode::Enter);
        assert!(matches!(KeyCode::from(WinitKeyCode::KeyQ), KeyCode::Other(_)));
    }

    #[test]
    fn test_wheel_delta_convention() {
        // Line deltas: positive y is "scroll up" in winit.
        assert_eq!(wheel_delta_y(&MouseScrollDelta::LineDelta(0.0, -1.0)), LINE_HEIGHT);
        assert_eq!(
            wheel_delta_y(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 30.0))),
            -30.0
        );
    }

    #[test]
    fn test_event_kinds() {
        assert_eq!(InputEvent::Key(KeyCode::Space).kind(), EventKind::KeyDown);
        assert_eq!(InputEvent::Wheel { delta_y: 1.0 }.kind(), EventKind::Wheel);
        assert_eq!(
            InputEvent::Resize { width: 1, height: 1 }.kind(),
            EventKind::Resize
        );
    }

    #[test]
    fn test_translate_resize() {
        let mut input = WindowInput::new();
        let events = input.translate(&WindowEvent::Resized(PhysicalSize::new(800, 600)));
        assert_eq!(
            events,
            vec![InputEvent::Resize {
                width: 800,
                height: 600
            }]
        );
    }
}
