//! PressTracker: the press/hold/release state machine shared by the keyboard
//! and mouse trackers.
//!
//! Raw hooks report every physical transition, including OS auto-repeat while
//! a key is held.  This type turns that stream into clean notifications:
//!
//! - `pressed` once per physical press (repeats are suppressed while down),
//! - `held` every hold interval while the code stays down,
//! - `released` for every raw release.
//!
//! Device specifics (handler traits, registries, cursor tracking) live behind
//! the [`Transitions`] trait, so the same bookkeeping drives both devices.
//!
//! # Locking
//!
//! The down-set and the hold timers share one mutex.  The listening flag is
//! re-checked under it, so a press racing with `stop()` either completes
//! before `stop()` drains the timers or observes the lowered flag.  The lock
//! is released before any subscriber runs and before any timer is joined.
//!
//! Hook installation can be slow and runs without the state lock.  After a
//! successful install `start()` re-checks the flag under the lock and only
//! then records the hook as owned; if a concurrent `stop()` lowered the flag
//! in the meantime the fresh hook is removed again.  `stop()` takes ownership
//! of the hook in the same critical section that lowers the flag, so it only
//! ever removes a hook that was recorded before it, never one installed by a
//! later `start()`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::application::hold_timer::HoldTimer;
use crate::application::lifecycle::Lifecycle;
use crate::infrastructure::hook::{HookAdapter, HookKind, RawEventSink};

/// Device-specific fan-out of the three transitions.
pub trait Transitions: Send + Sync + 'static {
    type Code: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Extra data reported with each transition (screen position for the mouse).
    type Point: Copy + Send + 'static;

    fn pressed(&self, code: Self::Code, at: Self::Point);
    /// `at` is the point of the press that started the hold.
    fn held(&self, code: Self::Code, at: Self::Point);
    fn released(&self, code: Self::Code, at: Self::Point);
}

struct PressState<C> {
    down: HashSet<C>,
    timers: HashMap<C, HoldTimer>,
    /// Set once an installed hook has been handed to the current session.
    hook_installed: bool,
}

pub struct PressTracker<T: Transitions> {
    kind: HookKind,
    hook: Arc<dyn HookAdapter>,
    transitions: Arc<T>,
    hold_interval: Duration,
    lifecycle: Lifecycle,
    state: Mutex<PressState<T::Code>>,
}

impl<T: Transitions> PressTracker<T> {
    pub fn new(
        kind: HookKind,
        hook: Arc<dyn HookAdapter>,
        transitions: T,
        hold_interval: Duration,
    ) -> Self {
        let name = match kind {
            HookKind::Keyboard => "keyboard",
            HookKind::Mouse => "mouse",
        };
        Self {
            kind,
            hook,
            transitions: Arc::new(transitions),
            hold_interval,
            lifecycle: Lifecycle::new(name),
            state: Mutex::new(PressState {
                down: HashSet::new(),
                timers: HashMap::new(),
                hook_installed: false,
            }),
        }
    }

    pub fn transitions(&self) -> &T {
        &self.transitions
    }

    /// Starts listening and installs the hook with `sink` as its consumer.
    ///
    /// An installation failure is logged and leaves the tracker listening
    /// without a hook; `stop()` followed by `start()` retries.
    pub fn start(&self, sink: RawEventSink) {
        {
            let _state = self.lock_state();
            if !self.lifecycle.begin() {
                warn!("{} tracker: start ignored, already listening", self.kind);
                return;
            }
        }

        if let Err(e) = self.hook.install(sink) {
            error!("{} tracker: {e}; listening without a hook", self.kind);
            return;
        }

        {
            let mut state = self.lock_state();
            if self.lifecycle.is_listening() {
                state.hook_installed = true;
                info!(
                    "{} tracker listening (hold interval {:?})",
                    self.kind, self.hold_interval
                );
                return;
            }
        }
        warn!("{} tracker: stopped during hook install, removing hook", self.kind);
        self.hook.uninstall();
    }

    /// Stops listening, cancels every hold timer and removes the hook.
    pub fn stop(&self) {
        let (timers, owns_hook): (Vec<HoldTimer>, bool) = {
            let mut state = self.lock_state();
            if !self.lifecycle.end() {
                warn!("{} tracker: stop ignored, not listening", self.kind);
                return;
            }
            state.down.clear();
            let timers = state.timers.drain().map(|(_, timer)| timer).collect();
            (timers, std::mem::take(&mut state.hook_installed))
        };

        let cancelled = timers.len();
        for timer in timers {
            timer.cancel();
        }
        // An install still in flight is undone by its own start().
        if owns_hook {
            self.hook.uninstall();
        }
        info!("{} tracker stopped ({cancelled} hold timers cancelled)", self.kind);
    }

    /// Handles a raw press of `code`.
    pub fn press(&self, code: T::Code, at: T::Point) {
        if !self.lifecycle.is_listening() {
            return;
        }
        {
            let mut state = self.lock_state();
            if !self.lifecycle.is_listening() {
                return;
            }
            if !state.down.insert(code) {
                trace!("{} tracker: repeat press of {code} suppressed", self.kind);
                return;
            }
        }

        debug!("{} tracker: {code} pressed", self.kind);
        self.transitions.pressed(code, at);

        // A subscriber may have released the code or stopped the tracker.
        let mut state = self.lock_state();
        if !self.lifecycle.is_listening()
            || !state.down.contains(&code)
            || state.timers.contains_key(&code)
        {
            return;
        }
        let transitions = Arc::clone(&self.transitions);
        match HoldTimer::spawn(format!("hold-{code}"), self.hold_interval, move || {
            transitions.held(code, at)
        }) {
            Ok(timer) => {
                state.timers.insert(code, timer);
            }
            Err(e) => error!(
                "{} tracker: failed to start hold timer for {code}: {e}",
                self.kind
            ),
        }
    }

    /// Handles a raw release of `code`.
    ///
    /// `released` is dispatched even if the press was never observed.
    pub fn release(&self, code: T::Code, at: T::Point) {
        if !self.lifecycle.is_listening() {
            return;
        }
        let timer = {
            let mut state = self.lock_state();
            if !self.lifecycle.is_listening() {
                return;
            }
            state.down.remove(&code);
            state.timers.remove(&code)
        };

        if let Some(timer) = timer {
            timer.cancel();
        }
        debug!("{} tracker: {code} released", self.kind);
        self.transitions.released(code, at);
    }

    pub fn is_down(&self, code: T::Code) -> bool {
        self.lock_state().down.contains(&code)
    }

    pub fn is_listening(&self) -> bool {
        self.lifecycle.is_listening()
    }

    pub fn is_hook_installed(&self) -> bool {
        self.lock_state().hook_installed
    }

    pub fn wait_until_stopped(&self) {
        self.lifecycle.wait_until_stopped();
    }

    #[cfg(test)]
    fn live_timers(&self) -> usize {
        self.lock_state().timers.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, PressState<T::Code>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Transitions> Drop for PressTracker<T> {
    fn drop(&mut self) {
        if self.lifecycle.is_listening() {
            self.stop();
        }
    }
}
