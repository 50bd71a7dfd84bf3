//! Infrastructure layer.
//!
//! Contains OS-facing adapters: the low-level keyboard/mouse hooks and
//! file-system storage for the configuration.
//!
//! **Dependency rule**: this layer may depend on `globalhook_core`, but
//! MUST NOT depend on the `application` layer.

pub mod hook;
pub mod storage;
