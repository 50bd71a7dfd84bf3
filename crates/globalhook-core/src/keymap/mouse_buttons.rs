//! Mouse button value ↔ name table.

/// `(button value, name)` pairs for every button the mouse hook reports.
pub const BUTTON_NAMES: &[(u32, &str)] = &[
    (1 << 0, "BUTTON_LEFT"),
    (1 << 1, "BUTTON_RIGHT"),
    (1 << 4, "BUTTON_MIDDLE"),
    (1 << 5, "BUTTON_X1"),
    (1 << 6, "BUTTON_X2"),
];

/// Returns the name of a button value, or `None` if it has no mapping.
pub fn button_to_name(button: u32) -> Option<&'static str> {
    BUTTON_NAMES
        .iter()
        .find(|&&(value, _)| value == button)
        .map(|&(_, name)| name)
}

/// Returns the button value for `name`, ignoring ASCII case.
pub fn name_to_button(name: &str) -> Option<u32> {
    BUTTON_NAMES
        .iter()
        .find(|&&(_, candidate)| candidate.eq_ignore_ascii_case(name))
        .map(|&(value, _)| value)
}
