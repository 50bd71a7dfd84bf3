//! globalhook library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::callbacks::CallbackToken;
pub use application::keyboard_tracker::{KeyCallback, KeyboardHandler, KeyboardTracker};
pub use application::mouse_tracker::{MouseCallback, MouseHandler, MouseTracker, Position};
pub use globalhook_core::{ButtonCode, KeyCode};
