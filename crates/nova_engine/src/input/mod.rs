//! Input collaborator boundary
//!
//! A process-wide poller that scripts query. It is not driven by the scene
//! tick; the external frame loop is expected to refresh it once per frame
//! alongside `Scene::tick`.

use crate::foundation::math::Vec2;

/// Key codes queried by scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Space bar
    Space,
    /// Left shift
    LeftShift,
    /// Escape key
    Escape,
    /// Return / enter key
    Enter,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons queried by scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button / wheel click
    Middle,
}

/// Contract implemented by the platform input poller
pub trait InputSource: Send + Sync {
    /// Whether the key is currently held down
    fn is_key_down(&self, key: KeyCode) -> bool;

    /// Whether the mouse button is currently held down
    fn is_mouse_button_down(&self, button: MouseButton) -> bool;

    /// Current cursor position in window coordinates
    fn mouse_position(&self) -> Vec2;
}

/// Input source that reports nothing pressed
///
/// Default service so headless scenes and tests never branch on a missing
/// input collaborator.
#[derive(Debug, Default)]
pub struct NullInput;

impl InputSource for NullInput {
    fn is_key_down(&self, _key: KeyCode) -> bool {
        false
    }

    fn is_mouse_button_down(&self, _button: MouseButton) -> bool {
        false
    }

    fn mouse_position(&self) -> Vec2 {
        Vec2::zeros()
    }
}
