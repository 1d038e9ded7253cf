//! Input abstraction layer.
//!
//! The host window translates its native mouse, keyboard, and drag-and-drop
//! events into `InputEvent`s. Pointer coordinates are view pixels, with the
//! origin at the top-left of the canvas view.

use std::path::PathBuf;

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button: select, drag, scale, rubber band.
    Primary,
    /// Middle button: pan.
    Middle,
    /// Right button: context menu.
    Secondary,
}

/// What was dropped onto the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DropPayload {
    /// Local files, in drop order.
    Paths(Vec<PathBuf>),
    /// Plain text.
    Text(String),
}

/// A normalized input event from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },

    PointerMove { x: f64, y: f64, modifiers: Modifiers },

    PointerUp { x: f64, y: f64, button: PointerButton },

    /// The pointer left the view. Any gesture in progress is abandoned.
    PointerLeave,

    DoubleClick { x: f64, y: f64 },

    /// Wheel notch. Positive `delta_y` zooms in.
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// `key` is the `KeyboardEvent.key`-style name (`"c"`, `"Delete"`, …).
    Key { key: String, modifiers: Modifiers },

    Drop { x: f64, y: f64, payload: DropPayload },

    /// The host view changed size.
    Resize { width: f64, height: f64 },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            button: PointerButton::Primary,
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers,
        }
    }
}
