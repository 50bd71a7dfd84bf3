//! Mock hook adapter for testing.
//!
//! Allows tests to inject synthetic [`RawEvent`]s without requiring a running
//! Windows message loop or OS hooks.  Events are delivered synchronously on
//! the caller's thread, which stands in for the adapter thread.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Mutex, PoisonError,
};
use std::thread;
use std::time::Duration;

use super::{HookAdapter, HookError, HookKind, RawEvent, RawEventSink};

/// A mock implementation of [`HookAdapter`] that lets tests inject events.
pub struct MockHook {
    kind: HookKind,
    sink: Mutex<Option<RawEventSink>>,
    /// The most recently installed sink, kept after `uninstall()` so tests can
    /// simulate a hook that keeps firing during teardown.
    last_sink: Mutex<Option<RawEventSink>>,
    fail_install: AtomicBool,
    /// How long `install()` blocks before taking effect.
    install_delay: Mutex<Duration>,
    install_count: AtomicU32,
    uninstall_count: AtomicU32,
}

impl MockHook {
    /// Creates a new mock hook whose installation succeeds.
    pub fn new(kind: HookKind) -> Self {
        Self {
            kind,
            sink: Mutex::new(None),
            last_sink: Mutex::new(None),
            fail_install: AtomicBool::new(false),
            install_delay: Mutex::new(Duration::ZERO),
            install_count: AtomicU32::new(0),
            uninstall_count: AtomicU32::new(0),
        }
    }

    /// Creates a mock hook whose installation always fails.
    pub fn failing(kind: HookKind) -> Self {
        let hook = Self::new(kind);
        hook.set_fail_install(true);
        hook
    }

    /// Makes subsequent `install()` calls fail (or succeed again).
    pub fn set_fail_install(&self, fail: bool) {
        self.fail_install.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `install()` calls block for `delay` first, like a
    /// hook thread that takes a while to come up.
    pub fn set_install_delay(&self, delay: Duration) {
        *self.install_delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Returns `false` (and drops the event) when no sink is installed.
    pub fn emit(&self, event: RawEvent) -> bool {
        // Clone the sink out so the lock is not held while the tracker runs;
        // a subscriber may call `stop()`, which re-enters `uninstall()`.
        let sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match sink {
            Some(sink) => {
                sink(event);
                true
            }
            None => false,
        }
    }

    /// Delivers an event through the last installed sink even if the hook has
    /// since been uninstalled, mimicking an OS hook that lags behind teardown.
    ///
    /// Returns `false` if no sink was ever installed.
    pub fn emit_stale(&self, event: RawEvent) -> bool {
        let sink = self.last_sink.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match sink {
            Some(sink) => {
                sink(event);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a sink is installed.
    pub fn is_installed(&self) -> bool {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Returns the number of `install()` calls, including failed ones.
    pub fn install_count(&self) -> u32 {
        self.install_count.load(Ordering::SeqCst)
    }

    /// Returns the number of `uninstall()` calls.
    pub fn uninstall_count(&self) -> u32 {
        self.uninstall_count.load(Ordering::SeqCst)
    }
}

impl HookAdapter for MockHook {
    fn install(&self, sink: RawEventSink) -> Result<(), HookError> {
        self.install_count.fetch_add(1, Ordering::SeqCst);
        let delay = *self.install_delay.lock().unwrap_or_else(PoisonError::into_inner);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if self.fail_install.load(Ordering::SeqCst) {
            return Err(HookError::InstallFailed {
                kind: self.kind,
                reason: "mock configured to fail".to_string(),
            });
        }
        let mut guard = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return Err(HookError::AlreadyInstalled(self.kind));
        }
        *guard = Some(sink.clone());
        *self.last_sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
        Ok(())
    }

    fn uninstall(&self) {
        self.uninstall_count.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
