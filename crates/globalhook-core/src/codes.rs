//! Device code newtypes for the keyboard and mouse namespaces.
//!
//! A keyboard key is identified by its Windows Virtual Key (VK) code, the
//! number the low-level keyboard hook reports in `KBDLLHOOKSTRUCT::vkCode`.
//! A mouse button is identified by a single-bit button value.  Both are plain
//! integers on the wire, but they live in separate namespaces: VK code 0x01
//! (`VK_LBUTTON`) and button value 1 (left button) are unrelated.  Keeping
//! them as distinct types lets the compiler enforce that separation.

use std::fmt;

use crate::keymap;

/// A keyboard key, identified by its Windows Virtual Key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACK: KeyCode = KeyCode(0x08);
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const RETURN: KeyCode = KeyCode(0x0D);
    pub const PAUSE: KeyCode = KeyCode(0x13);
    pub const CAPITAL: KeyCode = KeyCode(0x14);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);
    pub const LEFT: KeyCode = KeyCode(0x25);
    pub const UP: KeyCode = KeyCode(0x26);
    pub const RIGHT: KeyCode = KeyCode(0x27);
    pub const DOWN: KeyCode = KeyCode(0x28);
    pub const DIGIT_0: KeyCode = KeyCode(0x30);
    pub const A: KeyCode = KeyCode(0x41);
    pub const Z: KeyCode = KeyCode(0x5A);
    pub const NUMPAD_0: KeyCode = KeyCode(0x60);
    pub const F1: KeyCode = KeyCode(0x70);
    pub const F12: KeyCode = KeyCode(0x7B);
    pub const LSHIFT: KeyCode = KeyCode(0xA0);
    pub const RSHIFT: KeyCode = KeyCode(0xA1);
    pub const LCONTROL: KeyCode = KeyCode(0xA2);
    pub const RCONTROL: KeyCode = KeyCode(0xA3);
    pub const LMENU: KeyCode = KeyCode(0xA4);
    pub const RMENU: KeyCode = KeyCode(0xA5);

    /// Returns the raw virtual key value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(keymap::key_name(*self))
    }
}

/// A mouse button, identified by its button bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonCode(pub u32);

impl ButtonCode {
    pub const LEFT: ButtonCode = ButtonCode(1 << 0);
    pub const RIGHT: ButtonCode = ButtonCode(1 << 1);
    pub const MIDDLE: ButtonCode = ButtonCode(1 << 4);
    pub const X1: ButtonCode = ButtonCode(1 << 5);
    pub const X2: ButtonCode = ButtonCode(1 << 6);

    /// Returns the raw button value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ButtonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(keymap::button_name(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_code_display_uses_symbolic_name() {
        assert_eq!(KeyCode::A.to_string(), "A");
        assert_eq!(KeyCode::LSHIFT.to_string(), "L_SHIFT");
    }

    #[test]
    fn test_key_code_display_falls_back_to_unknown_sentinel() {
        assert_eq!(KeyCode(0xFF).to_string(), keymap::UNKNOWN_KEY);
    }

    #[test]
    fn test_button_codes_are_single_bits() {
        for button in [
            ButtonCode::LEFT,
            ButtonCode::RIGHT,
            ButtonCode::MIDDLE,
            ButtonCode::X1,
            ButtonCode::X2,
        ] {
            assert_eq!(button.value().count_ones(), 1, "{button:?} must be one bit");
        }
    }

    #[test]
    fn test_button_code_display_uses_symbolic_name() {
        assert_eq!(ButtonCode::MIDDLE.to_string(), "BUTTON_MIDDLE");
        assert_eq!(ButtonCode(3).to_string(), keymap::UNKNOWN_BUTTON);
    }
}
