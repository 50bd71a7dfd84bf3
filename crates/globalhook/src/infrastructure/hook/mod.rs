//! Raw hook adapters: the OS-facing source of keyboard and mouse events.
//!
//! On Windows, this installs a low-level keyboard hook (WH_KEYBOARD_LL) or
//! mouse hook (WH_MOUSE_LL) on a dedicated Win32 message loop thread.  Raw
//! events are handed to a second adapter-owned thread which invokes the
//! installed [`RawEventSink`].
//!
//! # Windows-Specific Implementation
//!
//! The hook callbacks must complete within ~300ms or Windows will remove the hook.
//! Subscriber code therefore never runs inside the callback itself; it is
//! deferred out of the callback via an `mpsc` channel.
//!
//! # Testability
//!
//! The [`HookAdapter`] trait allows tests to inject synthetic events without
//! requiring OS hooks (see [`mock::MockHook`]).

use std::fmt;
use std::sync::Arc;

use globalhook_core::{ButtonCode, KeyCode};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// A raw input event produced by a hook adapter, before any de-duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// A key went down.  Auto-repeat re-delivers this while the key is held.
    KeyPressed { code: KeyCode },
    /// A key was released.
    KeyReleased { code: KeyCode },
    /// A mouse button was pressed at screen position (x, y).
    ButtonPressed { button: ButtonCode, x: i32, y: i32 },
    /// A mouse button was released at screen position (x, y).
    ButtonReleased { button: ButtonCode, x: i32, y: i32 },
    /// The cursor moved to an absolute screen position.
    MouseMoved { x: i32, y: i32 },
    /// The vertical wheel was scrolled.
    MouseWheel {
        /// Scroll delta; positive = away from user, negative = toward user.
        delta: i32,
        x: i32,
        y: i32,
    },
}

impl RawEvent {
    /// Returns the device class that produced this event.
    pub fn kind(&self) -> HookKind {
        match self {
            RawEvent::KeyPressed { .. } | RawEvent::KeyReleased { .. } => HookKind::Keyboard,
            _ => HookKind::Mouse,
        }
    }
}

/// Device class served by a hook adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Keyboard,
    Mouse,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Keyboard => f.write_str("keyboard"),
            HookKind::Mouse => f.write_str("mouse"),
        }
    }
}

/// Callback an adapter invokes once per raw event, from an adapter-owned thread.
pub type RawEventSink = Arc<dyn Fn(RawEvent) + Send + Sync>;

/// Error type for hook adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to install {kind} hook: {reason}")]
    InstallFailed { kind: HookKind, reason: String },
    #[error("{0} hook is already installed")]
    AlreadyInstalled(HookKind),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting the OS hook that produces raw events.
///
/// The production implementation uses Windows hooks; tests use [`mock::MockHook`].
#[cfg_attr(test, mockall::automock)]
pub trait HookAdapter: Send + Sync {
    /// Installs the hook.  Every captured event is passed to `sink` until
    /// [`uninstall`](HookAdapter::uninstall) is called.
    fn install(&self, sink: RawEventSink) -> Result<(), HookError>;
    /// Removes the hook and releases all OS resources.  Calling this while
    /// not installed is a no-op.
    fn uninstall(&self);
}

/// Adapter used on platforms without a hook implementation.
///
/// Installation always fails, which leaves the tracker in its degraded
/// "listening but not hooked" state.
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedHook {
    kind: HookKind,
}

impl UnsupportedHook {
    pub fn new(kind: HookKind) -> Self {
        Self { kind }
    }
}

impl HookAdapter for UnsupportedHook {
    fn install(&self, _sink: RawEventSink) -> Result<(), HookError> {
        Err(HookError::UnsupportedPlatform(format!(
            "no {} hook for {}",
            self.kind,
            std::env::consts::OS
        )))
    }

    fn uninstall(&self) {}
}

/// Returns the hook adapter for the current platform.
pub fn platform_hook(kind: HookKind) -> Arc<dyn HookAdapter> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsHook::new(kind))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnsupportedHook::new(kind))
    }
}
