//! Code ↔ name lookup tables.
//!
//! These are pure functions over static tables.  They are meant for
//! subscriber code (logging, configuration by name); the trackers themselves
//! only ever deal with numeric codes.
//!
//! Forward lookups never fail: a code without a mapping resolves to the
//! [`UNKNOWN_KEY`] / [`UNKNOWN_BUTTON`] sentinel.  Reverse lookups are
//! case-insensitive and return `None` when no code has that name.

pub mod mouse_buttons;
pub mod windows_vk;

use crate::codes::{ButtonCode, KeyCode};

/// Name returned by [`key_name`] for codes that have no mapping.
pub const UNKNOWN_KEY: &str = "UNKNOWN_KEY";

/// Name returned by [`button_name`] for codes that have no mapping.
pub const UNKNOWN_BUTTON: &str = "UNKNOWN_BUTTON";

/// Returns the symbolic name of a keyboard key, or [`UNKNOWN_KEY`].
pub fn key_name(code: KeyCode) -> &'static str {
    windows_vk::vk_to_name(code.value()).unwrap_or(UNKNOWN_KEY)
}

/// Resolves a key name (any letter case) to its [`KeyCode`].
pub fn key_code(name: &str) -> Option<KeyCode> {
    windows_vk::name_to_vk(name).map(KeyCode)
}

/// Returns the symbolic name of a mouse button, or [`UNKNOWN_BUTTON`].
pub fn button_name(code: ButtonCode) -> &'static str {
    mouse_buttons::button_to_name(code.value()).unwrap_or(UNKNOWN_BUTTON)
}

/// Resolves a button name (any letter case) to its [`ButtonCode`].
pub fn button_code(name: &str) -> Option<ButtonCode> {
    mouse_buttons::name_to_button(name).map(ButtonCode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_and_code_agree_for_letter_a() {
        assert_eq!(key_name(KeyCode::A), "A");
        assert_eq!(key_code("A"), Some(KeyCode::A));
    }

    #[test]
    fn test_key_code_is_case_insensitive() {
        assert_eq!(key_code("escape"), Some(KeyCode::ESCAPE));
        assert_eq!(key_code("l_Shift"), Some(KeyCode::LSHIFT));
        assert_eq!(key_code("f12"), Some(KeyCode::F12));
    }

    #[test]
    fn test_unknown_key_name_returns_none() {
        assert_eq!(key_code("NOT_A_KEY"), None);
        assert_eq!(key_code(""), None);
    }

    #[test]
    fn test_unmapped_key_code_returns_sentinel() {
        assert_eq!(key_name(KeyCode(0x07)), UNKNOWN_KEY);
        assert_eq!(key_name(KeyCode(0x1_0000)), UNKNOWN_KEY);
    }

    #[test]
    fn test_button_lookups_in_both_directions() {
        assert_eq!(button_name(ButtonCode::LEFT), "BUTTON_LEFT");
        assert_eq!(button_code("button_x2"), Some(ButtonCode::X2));
        assert_eq!(button_code("BUTTON_FOURTH"), None);
        assert_eq!(button_name(ButtonCode(0)), UNKNOWN_BUTTON);
    }
}
