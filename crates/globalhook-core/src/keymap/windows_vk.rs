//! Windows Virtual Key (VK) code ↔ key name table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//! Windows VK codes range from 0x00 to 0xFF.
//!
//! # What is a Windows Virtual Key (VK) code?
//!
//! Windows assigns each keyboard key a number called a "Virtual Key code".
//! These are defined in `<winuser.h>` and named `VK_*` (e.g., `VK_RETURN = 0x0D`,
//! `VK_SPACE = 0x20`).  They are "virtual" because they represent *logical* keys
//! rather than physical scan codes: pressing the letter A on any keyboard layout
//! always produces `VK_A = 0x41`.
//!
//! # How this table works
//!
//! `VK_NAME_TABLE` is a compile-time constant array of 256 optional names,
//! indexed by VK code.  Position 0x41 holds `"A"` because VK_A is 0x41.  Codes
//! without a name store `None`.  Forward lookup is an O(1) index; the reverse
//! direction is a linear scan, which is fine for the rare name → code case.
//!
//! Some VK values carry two names in winuser.h (`VK_KANA`/`VK_HANGUL` are both
//! 0x15).  The table holds the first name; [`ALIASES`] lets the second one
//! resolve as well.

/// Translates a VK code to its key name.
///
/// Returns `None` for codes above 0xFF or codes with no name.
pub fn vk_to_name(vk: u32) -> Option<&'static str> {
    VK_NAME_TABLE.get(vk as usize).copied().flatten()
}

/// Translates a key name (ASCII case-insensitive) back to its VK code.
pub fn name_to_vk(name: &str) -> Option<u32> {
    for (vk, entry) in VK_NAME_TABLE.iter().enumerate() {
        if let Some(candidate) = entry {
            if candidate.eq_ignore_ascii_case(name) {
                return Some(vk as u32);
            }
        }
    }
    ALIASES
        .iter()
        .find(|&&(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|&(_, vk)| vk)
}

/// Secondary names for VK codes whose table entry uses a different name.
pub const ALIASES: &[(&str, u32)] = &[
    ("HANGUL", 0x15), // VK_HANGUL shares 0x15 with VK_KANA
];

/// Complete VK → name table indexed by VK code (0x00–0xFF).
///
/// Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes
const VK_NAME_TABLE: [Option<&str>; 256] = {
    let mut t: [Option<&str>; 256] = [None; 256];

    // ── Mouse buttons as seen by the keyboard state table ────────────────────
    t[0x01] = Some("L_BUTTON");    // VK_LBUTTON
    t[0x02] = Some("R_BUTTON");    // VK_RBUTTON
    t[0x03] = Some("CANCEL");      // VK_CANCEL
    t[0x04] = Some("M_BUTTON");    // VK_MBUTTON
    t[0x05] = Some("X_BUTTON1");   // VK_XBUTTON1
    t[0x06] = Some("X_BUTTON2");   // VK_XBUTTON2

    // ── Control keys ─────────────────────────────────────────────────────────
    t[0x08] = Some("BACK");        // VK_BACK
    t[0x09] = Some("TAB");         // VK_TAB
    t[0x0C] = Some("CLEAR");       // VK_CLEAR
    t[0x0D] = Some("RETURN");      // VK_RETURN
    t[0x13] = Some("PAUSE");       // VK_PAUSE
    t[0x14] = Some("CAPITAL");     // VK_CAPITAL
    t[0x1B] = Some("ESCAPE");      // VK_ESCAPE
    t[0x20] = Some("SPACE");       // VK_SPACE

    // ── IME keys ─────────────────────────────────────────────────────────────
    t[0x15] = Some("KANA");        // VK_KANA / VK_HANGUL
    t[0x17] = Some("JUNJA");       // VK_JUNJA
    t[0x18] = Some("FINAL");       // VK_FINAL
    t[0x19] = Some("KANJI");       // VK_KANJI / VK_HANJA
    t[0x1C] = Some("CONVERT");     // VK_CONVERT
    t[0x1D] = Some("NON_CONVERT"); // VK_NONCONVERT
    t[0x1E] = Some("ACCEPT");      // VK_ACCEPT
    t[0x1F] = Some("MODE_CHANGE"); // VK_MODECHANGE

    // ── Navigation and editing ───────────────────────────────────────────────
    t[0x21] = Some("PRIOR");       // VK_PRIOR (Page Up)
    t[0x22] = Some("NEXT");        // VK_NEXT (Page Down)
    t[0x23] = Some("END");
    t[0x24] = Some("HOME");
    t[0x25] = Some("LEFT");
    t[0x26] = Some("UP");
    t[0x27] = Some("RIGHT");
    t[0x28] = Some("DOWN");
    t[0x29] = Some("SELECT");
    t[0x2A] = Some("PRINT");
    t[0x2B] = Some("EXECUTE");
    t[0x2C] = Some("SNAPSHOT");    // VK_SNAPSHOT (Print Screen)
    t[0x2D] = Some("INSERT");
    t[0x2E] = Some("DELETE");
    t[0x2F] = Some("HELP");

    // ── Digit row (VK_0=0x30 … VK_9=0x39) ───────────────────────────────────
    t[0x30] = Some("0");
    t[0x31] = Some("1");
    t[0x32] = Some("2");
    t[0x33] = Some("3");
    t[0x34] = Some("4");
    t[0x35] = Some("5");
    t[0x36] = Some("6");
    t[0x37] = Some("7");
    t[0x38] = Some("8");
    t[0x39] = Some("9");

    // ── Alphabet keys (VK_A=0x41 … VK_Z=0x5A) ────────────────────────────────
    t[0x41] = Some("A");
    t[0x42] = Some("B");
    t[0x43] = Some("C");
    t[0x44] = Some("D");
    t[0x45] = Some("E");
    t[0x46] = Some("F");
    t[0x47] = Some("G");
    t[0x48] = Some("H");
    t[0x49] = Some("I");
    t[0x4A] = Some("J");
    t[0x4B] = Some("K");
    t[0x4C] = Some("L");
    t[0x4D] = Some("M");
    t[0x4E] = Some("N");
    t[0x4F] = Some("O");
    t[0x50] = Some("P");
    t[0x51] = Some("Q");
    t[0x52] = Some("R");
    t[0x53] = Some("S");
    t[0x54] = Some("T");
    t[0x55] = Some("U");
    t[0x56] = Some("V");
    t[0x57] = Some("W");
    t[0x58] = Some("X");
    t[0x59] = Some("Y");
    t[0x5A] = Some("Z");

    // ── Windows keys ─────────────────────────────────────────────────────────
    t[0x5B] = Some("L_WIN");       // VK_LWIN
    t[0x5C] = Some("R_WIN");       // VK_RWIN
    t[0x5D] = Some("APPS");        // VK_APPS
    t[0x5F] = Some("SLEEP");       // VK_SLEEP

    // ── Numpad (VK_NUMPAD0=0x60 … VK_NUMPAD9=0x69) ───────────────────────────
    t[0x60] = Some("NUMPAD0");
    t[0x61] = Some("NUMPAD1");
    t[0x62] = Some("NUMPAD2");
    t[0x63] = Some("NUMPAD3");
    t[0x64] = Some("NUMPAD4");
    t[0x65] = Some("NUMPAD5");
    t[0x66] = Some("NUMPAD6");
    t[0x67] = Some("NUMPAD7");
    t[0x68] = Some("NUMPAD8");
    t[0x69] = Some("NUMPAD9");
    t[0x6A] = Some("MULTIPLY");
    t[0x6B] = Some("ADD");
    t[0x6C] = Some("SEPARATOR");
    t[0x6D] = Some("SUBTRACT");
    t[0x6E] = Some("DECIMAL");
    t[0x6F] = Some("DIVIDE");

    // ── Function keys (VK_F1=0x70 … VK_F12=0x7B) ─────────────────────────────
    t[0x70] = Some("F1");
    t[0x71] = Some("F2");
    t[0x72] = Some("F3");
    t[0x73] = Some("F4");
    t[0x74] = Some("F5");
    t[0x75] = Some("F6");
    t[0x76] = Some("F7");
    t[0x77] = Some("F8");
    t[0x78] = Some("F9");
    t[0x79] = Some("F10");
    t[0x7A] = Some("F11");
    t[0x7B] = Some("F12");

    // ── Left/right modifiers (what WH_KEYBOARD_LL reports) ───────────────────
    t[0xA0] = Some("L_SHIFT");     // VK_LSHIFT
    t[0xA1] = Some("R_SHIFT");     // VK_RSHIFT
    t[0xA2] = Some("L_CONTROL");   // VK_LCONTROL
    t[0xA3] = Some("R_CONTROL");   // VK_RCONTROL
    t[0xA4] = Some("L_ALT");       // VK_LMENU
    t[0xA5] = Some("R_ALT");       // VK_RMENU

    t
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Pairs of (VK code, expected name) covering every group in the table.
    const STANDARD_NAMES: &[(u32, &str)] = &[
        (0x01, "L_BUTTON"), (0x05, "X_BUTTON1"), (0x08, "BACK"), (0x0D, "RETURN"),
        (0x15, "KANA"), (0x19, "KANJI"), (0x1D, "NON_CONVERT"), (0x1F, "MODE_CHANGE"),
        (0x21, "PRIOR"), (0x2C, "SNAPSHOT"), (0x2F, "HELP"),
        (0x30, "0"), (0x39, "9"), (0x41, "A"), (0x5A, "Z"),
        (0x5B, "L_WIN"), (0x5F, "SLEEP"),
        (0x60, "NUMPAD0"), (0x69, "NUMPAD9"), (0x6C, "SEPARATOR"), (0x6F, "DIVIDE"),
        (0x70, "F1"), (0x7B, "F12"),
        (0xA0, "L_SHIFT"), (0xA3, "R_CONTROL"), (0xA4, "L_ALT"), (0xA5, "R_ALT"),
    ];

    #[test]
    fn test_standard_vk_codes_have_expected_names() {
        for &(vk, expected) in STANDARD_NAMES {
            assert_eq!(
                vk_to_name(vk),
                Some(expected),
                "vk_to_name(0x{vk:02X}) should return {expected}"
            );
        }
    }

    #[test]
    fn test_all_26_letter_keys_are_named() {
        for vk in 0x41u32..=0x5A {
            let expected = char::from_u32(vk).map(|c| c.to_string());
            assert_eq!(vk_to_name(vk).map(str::to_string), expected);
        }
    }

    #[test]
    fn test_unnamed_vk_codes_return_none() {
        // Generic SHIFT/CONTROL/MENU are never reported by the low-level hook.
        for vk in [0x00u32, 0x07, 0x0A, 0x10, 0x11, 0x12, 0x16, 0x5E, 0x7C, 0xFF] {
            assert_eq!(vk_to_name(vk), None, "0x{vk:02X} should have no name");
        }
    }

    #[test]
    fn test_out_of_range_codes_return_none() {
        assert_eq!(vk_to_name(0x100), None);
        assert_eq!(vk_to_name(u32::MAX), None);
    }

    #[test]
    fn test_alias_resolves_to_shared_code() {
        assert_eq!(name_to_vk("HANGUL"), Some(0x15));
        assert_eq!(name_to_vk("kana"), Some(0x15));
    }

    #[test]
    fn test_name_to_vk_rejects_near_misses() {
        assert_eq!(name_to_vk("F13"), None);
        assert_eq!(name_to_vk("NUMPAD10"), None);
        assert_eq!(name_to_vk("10"), None);
    }
}
