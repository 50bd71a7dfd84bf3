//! # globalhook-core
//!
//! Shared, OS-independent building blocks for globalhook: the device code
//! types the trackers are keyed on, and the static tables that translate those
//! codes to and from symbolic names.
//!
//! # Architecture overview
//!
//! globalhook turns the raw stream of a system-wide keyboard/mouse hook into
//! de-duplicated "pressed", "held" and "released" notifications.  This crate
//! is the pure-data foundation of that pipeline.  It defines:
//!
//! - **`codes`** – [`KeyCode`] and [`ButtonCode`], two distinct newtypes so a
//!   keyboard code can never be confused with a mouse button code, plus the
//!   well-known constants for both namespaces.
//!
//! - **`keymap`** – Name lookup in both directions.  Unknown codes resolve to a
//!   sentinel name instead of failing; unknown names resolve to `None`.
//!
//! Nothing in here touches OS APIs, threads or I/O.

pub mod codes;
pub mod keymap;

pub use codes::{ButtonCode, KeyCode};
pub use keymap::{button_code, button_name, key_code, key_name, UNKNOWN_BUTTON, UNKNOWN_KEY};
