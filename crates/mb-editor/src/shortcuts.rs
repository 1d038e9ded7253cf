//! Keyboard shortcut mapping for the canvas.
//!
//! Clipboard, duplicate and select-all need the command modifier (see
//! [`Modifiers::command`]); delete, escape and zoom work bare as well.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Copy,
    Cut,
    Paste,
    Delete,
    Duplicate,
    SelectAll,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetZoom,

    // ── Selection ──
    Deselect,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. `None` if the combo is unbound.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetZoom),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "+" | "=" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipboard_needs_command() {
        assert_eq!(
            ShortcutMap::resolve("c", Modifiers::CTRL),
            Some(ShortcutAction::Copy)
        );
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("V", meta), Some(ShortcutAction::Paste));
        assert_eq!(ShortcutMap::resolve("c", Modifiers::NONE), None);
    }

    #[test]
    fn zoom_with_or_without_command() {
        assert_eq!(
            ShortcutMap::resolve("+", Modifiers::NONE),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", Modifiers::CTRL),
            Some(ShortcutAction::ZoomOut)
        );
    }

    #[test]
    fn duplicate_needs_command() {
        assert_eq!(
            ShortcutMap::resolve("d", Modifiers::CTRL),
            Some(ShortcutAction::Duplicate)
        );
        assert_eq!(ShortcutMap::resolve("d", Modifiers::NONE), None);
    }

    #[test]
    fn delete_and_escape() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::SHIFT),
            Some(ShortcutAction::Deselect)
        );
        assert_eq!(ShortcutMap::resolve("q", Modifiers::NONE), None);
    }
}
