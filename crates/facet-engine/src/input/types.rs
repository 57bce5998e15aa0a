use std::fmt;

/// Keyboard key identifier.
///
/// Only keys the viewer binds are named; everything else maps to
/// `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    X,
    Space,
    Escape,

    /// Platform-dependent key not represented above.
    Unknown(u32),
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Platform-agnostic input events, in arrival order.
///
/// Pointer coordinates are logical pixels, origin top-left, +Y down.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The user asked to close the window.
    Quit,

    MouseDown { button: MouseButton, x: f32, y: f32 },
    MouseUp { button: MouseButton },
    MouseMove { x: f32, y: f32 },

    /// Drawable area changed, in physical pixels.
    Resize { width: u32, height: u32 },

    KeyDown(Key),
    KeyUp(Key),

    /// Window lost focus; held keys and buttons are released.
    FocusLost,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
