//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map
//! lives in Rust so the browser bridge and native tests share it.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    SelectAll,
    Duplicate,
    Copy,
    Paste,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    /// Clear the selection and abandon any in-progress link.
    Deselect,
}

/// Resolves key events into shortcut actions.
///
/// `ctrl` and `meta` are interchangeable so ⌘ works on macOS and Ctrl
/// everywhere else.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "c" | "C" => Some(ShortcutAction::Copy),
                "v" | "V" => Some(ShortcutAction::Paste),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    const CMD_SHIFT: Modifiers = Modifiers {
        meta: true,
        shift: true,
        ..Modifiers::NONE
    };

    #[test]
    fn resolve_edit_shortcuts() {
        assert_eq!(ShortcutMap::resolve("z", Modifiers::CTRL), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("z", CMD), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("Z", CMD_SHIFT), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutMap::resolve("y", Modifiers::CTRL), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutMap::resolve("a", CMD), Some(ShortcutAction::SelectAll));
        assert_eq!(ShortcutMap::resolve("c", CMD), Some(ShortcutAction::Copy));
        assert_eq!(ShortcutMap::resolve("v", CMD), Some(ShortcutAction::Paste));
        assert_eq!(ShortcutMap::resolve("d", CMD), Some(ShortcutAction::Duplicate));
    }

    #[test]
    fn resolve_plain_keys() {
        assert_eq!(ShortcutMap::resolve("Delete", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutMap::resolve("Backspace", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutMap::resolve("Escape", Modifiers::NONE), Some(ShortcutAction::Deselect));
    }

    #[test]
    fn unbound_combos_resolve_to_none() {
        assert_eq!(ShortcutMap::resolve("z", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("a", Modifiers::SHIFT), None);
        assert_eq!(ShortcutMap::resolve("y", CMD_SHIFT), None);
    }
}
