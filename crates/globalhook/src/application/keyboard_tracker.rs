//! KeyboardTracker: OS-wide key press/hold/release notifications.
//!
//! Subscribers implement [`KeyboardHandler`] (every method defaults to a
//! no-op) or use the closure-based [`KeyCallback`].  Notifications are
//! delivered on the hook adapter's thread (`pressed`, `released`) and on the
//! per-key hold timer thread (`held`), so handlers must be `Send + Sync` and
//! tolerate concurrent calls for different keys.
//!
//! A handler may release keys or stop the tracker from any notification.
//! When it does so from `on_key_held`, the affected hold timers are cancelled
//! without waiting, so another key's tick that is already running can still
//! finish after the call returns.

use std::sync::Arc;
use std::time::Duration;

use globalhook_core::KeyCode;
use tracing::trace;

use crate::application::callbacks::{CallbackRegistry, CallbackToken};
use crate::application::hold_timer::DEFAULT_HOLD_INTERVAL;
use crate::application::press_tracker::{PressTracker, Transitions};
use crate::infrastructure::hook::{HookAdapter, HookKind, RawEvent, RawEventSink};

/// Receives keyboard transitions.  Override only what you need.
pub trait KeyboardHandler: Send + Sync {
    /// Called once when `code` goes down.
    fn on_key_pressed(&self, _code: KeyCode) {}
    /// Called every hold interval while `code` stays down.
    fn on_key_held(&self, _code: KeyCode) {}
    /// Called when `code` is released.
    fn on_key_released(&self, _code: KeyCode) {}
}

type KeyFn = Box<dyn Fn(KeyCode) + Send + Sync>;

/// A [`KeyboardHandler`] assembled from optional closures.
///
/// ```ignore
/// tracker.add_callback(KeyCallback::new().on_pressed(|code| println!("{code}")));
/// ```
#[derive(Default)]
pub struct KeyCallback {
    pressed: Option<KeyFn>,
    held: Option<KeyFn>,
    released: Option<KeyFn>,
}

impl KeyCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pressed(mut self, f: impl Fn(KeyCode) + Send + Sync + 'static) -> Self {
        self.pressed = Some(Box::new(f));
        self
    }

    pub fn on_held(mut self, f: impl Fn(KeyCode) + Send + Sync + 'static) -> Self {
        self.held = Some(Box::new(f));
        self
    }

    pub fn on_released(mut self, f: impl Fn(KeyCode) + Send + Sync + 'static) -> Self {
        self.released = Some(Box::new(f));
        self
    }
}

impl KeyboardHandler for KeyCallback {
    fn on_key_pressed(&self, code: KeyCode) {
        if let Some(f) = &self.pressed {
            f(code);
        }
    }

    fn on_key_held(&self, code: KeyCode) {
        if let Some(f) = &self.held {
            f(code);
        }
    }

    fn on_key_released(&self, code: KeyCode) {
        if let Some(f) = &self.released {
            f(code);
        }
    }
}

pub struct KeyboardTransitions {
    registry: CallbackRegistry<dyn KeyboardHandler>,
}

impl Transitions for KeyboardTransitions {
    type Code = KeyCode;
    type Point = ();

    fn pressed(&self, code: KeyCode, _at: ()) {
        self.registry
            .dispatch("pressed", |handler| handler.on_key_pressed(code));
    }

    fn held(&self, code: KeyCode, _at: ()) {
        self.registry.dispatch("held", |handler| handler.on_key_held(code));
    }

    fn released(&self, code: KeyCode, _at: ()) {
        self.registry
            .dispatch("released", |handler| handler.on_key_released(code));
    }
}

/// Tracks which keys are down and notifies subscribers of transitions.
///
/// Cloning yields another handle to the same tracker.
#[derive(Clone)]
pub struct KeyboardTracker {
    core: Arc<PressTracker<KeyboardTransitions>>,
}

impl KeyboardTracker {
    /// Creates a stopped tracker fed by `hook`, with the default 100 ms hold interval.
    pub fn new(hook: Arc<dyn HookAdapter>) -> Self {
        Self::with_hold_interval(hook, DEFAULT_HOLD_INTERVAL)
    }

    pub fn with_hold_interval(hook: Arc<dyn HookAdapter>, hold_interval: Duration) -> Self {
        let transitions = KeyboardTransitions {
            registry: CallbackRegistry::new("keyboard"),
        };
        Self {
            core: Arc::new(PressTracker::new(
                HookKind::Keyboard,
                hook,
                transitions,
                hold_interval,
            )),
        }
    }

    /// Starts listening and installs the keyboard hook.
    ///
    /// A second call while listening is logged and ignored.  If the hook
    /// cannot be installed the error is logged and the tracker stays
    /// listening without a hook (see [`is_hook_installed`](Self::is_hook_installed)).
    pub fn start(&self) {
        let core = Arc::downgrade(&self.core);
        let sink: RawEventSink = Arc::new(move |event: RawEvent| {
            if let Some(core) = core.upgrade() {
                route(&core, event);
            }
        });
        self.core.start(sink);
    }

    /// Stops listening: cancels hold timers, forgets down keys, removes the hook.
    pub fn stop(&self) {
        self.core.stop();
    }

    pub fn is_down(&self, code: KeyCode) -> bool {
        self.core.is_down(code)
    }

    pub fn is_listening(&self) -> bool {
        self.core.is_listening()
    }

    pub fn is_hook_installed(&self) -> bool {
        self.core.is_hook_installed()
    }

    /// Blocks until [`stop`](Self::stop) is called.
    pub fn wait_until_stopped(&self) {
        self.core.wait_until_stopped();
    }

    /// Subscribes `handler`.  Subscribers are notified in registration order.
    pub fn add_callback<H: KeyboardHandler + 'static>(&self, handler: H) -> CallbackToken {
        let handler: Arc<dyn KeyboardHandler> = Arc::new(handler);
        self.core.transitions().registry.add(handler)
    }

    /// Unsubscribes the handler registered under `token`.
    pub fn remove_callback(&self, token: CallbackToken) -> bool {
        self.core.transitions().registry.remove(token)
    }

    /// Feeds one raw event, exactly as the installed hook would.  Mouse events are ignored.
    pub fn handle_raw(&self, event: RawEvent) {
        route(&self.core, event);
    }
}

fn route(core: &PressTracker<KeyboardTransitions>, event: RawEvent) {
    if event.kind() != HookKind::Keyboard {
        trace!("keyboard tracker: ignoring {event:?}");
        return;
    }
    match event {
        RawEvent::KeyPressed { code } => core.press(code, ()),
        RawEvent::KeyReleased { code } => core.release(code, ()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hook::mock::MockHook;
    use std::sync::Mutex;

    fn started() -> (KeyboardTracker, Arc<MockHook>) {
        let hook = Arc::new(MockHook::new(HookKind::Keyboard));
        let tracker = KeyboardTracker::with_hold_interval(hook.clone(), Duration::from_secs(10));
        tracker.start();
        (tracker, hook)
    }

    #[test]
    fn test_hook_events_reach_key_callbacks() {
        // Arrange
        let (tracker, hook) = started();
        let pressed = Arc::new(Mutex::new(Vec::new()));
        let released = Arc::new(Mutex::new(Vec::new()));
        let (p, r) = (Arc::clone(&pressed), Arc::clone(&released));
        tracker.add_callback(
            KeyCallback::new()
                .on_pressed(move |code| p.lock().unwrap().push(code))
                .on_released(move |code| r.lock().unwrap().push(code)),
        );

        // Act
        hook.emit(RawEvent::KeyPressed { code: KeyCode::A });
        let down = tracker.is_down(KeyCode::A);
        hook.emit(RawEvent::KeyReleased { code: KeyCode::A });

        // Assert
        assert!(down);
        assert!(!tracker.is_down(KeyCode::A));
        assert_eq!(*pressed.lock().unwrap(), vec![KeyCode::A]);
        assert_eq!(*released.lock().unwrap(), vec![KeyCode::A]);
        tracker.stop();
    }

    #[test]
    fn test_mouse_events_are_ignored() {
        let (tracker, _hook) = started();
        let calls = Arc::new(Mutex::new(0));
        let c = Arc::clone(&calls);
        tracker.add_callback(KeyCallback::new().on_pressed(move |_| *c.lock().unwrap() += 1));

        tracker.handle_raw(RawEvent::ButtonPressed {
            button: globalhook_core::ButtonCode::LEFT,
            x: 0,
            y: 0,
        });

        assert_eq!(*calls.lock().unwrap(), 0);
        tracker.stop();
    }

    #[test]
    fn test_hold_handlers_releasing_each_others_keys_finish() {
        // Arrange – each key's hold handler releases the other key
        let hook = Arc::new(MockHook::new(HookKind::Keyboard));
        let tracker = KeyboardTracker::with_hold_interval(hook.clone(), Duration::from_millis(20));
        tracker.start();
        let handle = tracker.clone();
        let returned = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&returned);
        tracker.add_callback(KeyCallback::new().on_held(move |code| {
            let other = if code == KeyCode::A { KeyCode::Z } else { KeyCode::A };
            std::thread::sleep(Duration::from_millis(10));
            handle.handle_raw(RawEvent::KeyReleased { code: other });
            r.lock().unwrap().push(code);
        }));

        // Act
        hook.emit(RawEvent::KeyPressed { code: KeyCode::A });
        hook.emit(RawEvent::KeyPressed { code: KeyCode::Z });
        std::thread::sleep(Duration::from_millis(150));

        // Assert – every handler returned and both keys ended up released
        assert!(!returned.lock().unwrap().is_empty());
        assert!(!tracker.is_down(KeyCode::A));
        assert!(!tracker.is_down(KeyCode::Z));
        tracker.stop();
    }

    #[test]
    fn test_trait_handler_with_defaults_only_overrides_what_it_needs() {
        // Arrange
        struct ReleaseCounter(Arc<Mutex<u32>>);
        impl KeyboardHandler for ReleaseCounter {
            fn on_key_released(&self, _code: KeyCode) {
                *self.0.lock().unwrap() += 1;
            }
        }
        let (tracker, _hook) = started();
        let releases = Arc::new(Mutex::new(0));
        tracker.add_callback(ReleaseCounter(Arc::clone(&releases)));

        // Act
        tracker.handle_raw(RawEvent::KeyPressed { code: KeyCode::SPACE });
        tracker.handle_raw(RawEvent::KeyReleased { code: KeyCode::SPACE });

        // Assert
        assert_eq!(*releases.lock().unwrap(), 1);
        tracker.stop();
    }

    #[test]
    fn test_start_and_stop_drive_hook_installation() {
        let hook = Arc::new(MockHook::new(HookKind::Keyboard));
        let tracker = KeyboardTracker::new(hook.clone());

        tracker.start();
        assert!(hook.is_installed());
        assert!(tracker.is_hook_installed());

        tracker.stop();
        assert!(!hook.is_installed());
        assert_eq!(hook.install_count(), 1);
        assert_eq!(hook.uninstall_count(), 1);
    }

    #[test]
    fn test_dropping_last_handle_uninstalls_hook() {
        let hook = Arc::new(MockHook::new(HookKind::Keyboard));
        let tracker = KeyboardTracker::new(hook.clone());
        let second = tracker.clone();
        tracker.start();

        drop(tracker);
        assert!(hook.is_installed(), "a clone still owns the tracker");
        drop(second);

        assert!(!hook.is_installed());
    }
}
