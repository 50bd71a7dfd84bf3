//! Application layer: the input-state trackers and their building blocks.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure lookup tables in `globalhook-core`) and the infrastructure (OS hooks,
//! config files).
//!
//! Code in this layer:
//!
//! - **Turns raw hook events into meaningful transitions**: pressed once,
//!   held periodically, released once.
//! - **Depends on abstractions** (the `HookAdapter` trait) rather than the
//!   Windows hook itself, so every tracker runs against a mock in tests.
//! - **Contains no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`keyboard_tracker`** / **`mouse_tracker`** – The public trackers.
//!   Each owns a hook adapter, a callback registry and its press state.
//!
//! - **`press_tracker`** – The press/hold/release state machine both trackers
//!   share.  This runs on every raw key and button event.
//!
//! - **`hold_timer`** – Cancellable fixed-rate timer thread behind "held".
//!
//! - **`callbacks`** – Ordered subscriber registry with token-based removal.
//!
//! - **`lifecycle`** – Listening flag and the keep-alive thread.

pub mod callbacks;
pub mod hold_timer;
pub mod keyboard_tracker;
pub mod lifecycle;
pub mod mouse_tracker;
pub mod press_tracker;
