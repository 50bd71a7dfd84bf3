//! MouseTracker: OS-wide button press/hold/release, movement and wheel
//! notifications.
//!
//! Button transitions follow the same rules as the keyboard tracker.  Movement
//! and wheel events are passed straight through to subscribers while the
//! tracker is listening.
//!
//! Hold ticks report the position where the button went down, even if the
//! cursor has moved since.  The latest position is available separately
//! through [`MouseTracker::cursor`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use globalhook_core::ButtonCode;
use tracing::trace;

use crate::application::callbacks::{CallbackRegistry, CallbackToken};
use crate::application::hold_timer::DEFAULT_HOLD_INTERVAL;
use crate::application::press_tracker::{PressTracker, Transitions};
use crate::infrastructure::hook::{HookAdapter, HookKind, RawEvent, RawEventSink};

/// Absolute screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Receives mouse notifications.  Override only what you need.
pub trait MouseHandler: Send + Sync {
    fn on_mouse_pressed(&self, _button: ButtonCode, _x: i32, _y: i32) {}
    /// Called every hold interval while `button` stays down, with the press position.
    fn on_mouse_held(&self, _button: ButtonCode, _x: i32, _y: i32) {}
    fn on_mouse_released(&self, _button: ButtonCode, _x: i32, _y: i32) {}
    fn on_mouse_moved(&self, _x: i32, _y: i32) {}
    /// Positive `delta` scrolls away from the user.
    fn on_mouse_wheel(&self, _delta: i32) {}
}

type ButtonFn = Box<dyn Fn(ButtonCode, i32, i32) + Send + Sync>;

/// A [`MouseHandler`] assembled from optional closures.
#[derive(Default)]
pub struct MouseCallback {
    pressed: Option<ButtonFn>,
    held: Option<ButtonFn>,
    released: Option<ButtonFn>,
    moved: Option<Box<dyn Fn(i32, i32) + Send + Sync>>,
    wheel: Option<Box<dyn Fn(i32) + Send + Sync>>,
}

impl MouseCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pressed(mut self, f: impl Fn(ButtonCode, i32, i32) + Send + Sync + 'static) -> Self {
        self.pressed = Some(Box::new(f));
        self
    }

    pub fn on_held(mut self, f: impl Fn(ButtonCode, i32, i32) + Send + Sync + 'static) -> Self {
        self.held = Some(Box::new(f));
        self
    }

    pub fn on_released(mut self, f: impl Fn(ButtonCode, i32, i32) + Send + Sync + 'static) -> Self {
        self.released = Some(Box::new(f));
        self
    }

    pub fn on_moved(mut self, f: impl Fn(i32, i32) + Send + Sync + 'static) -> Self {
        self.moved = Some(Box::new(f));
        self
    }

    pub fn on_wheel(mut self, f: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.wheel = Some(Box::new(f));
        self
    }
}

impl MouseHandler for MouseCallback {
    fn on_mouse_pressed(&self, button: ButtonCode, x: i32, y: i32) {
        if let Some(f) = &self.pressed {
            f(button, x, y);
        }
    }

    fn on_mouse_held(&self, button: ButtonCode, x: i32, y: i32) {
        if let Some(f) = &self.held {
            f(button, x, y);
        }
    }

    fn on_mouse_released(&self, button: ButtonCode, x: i32, y: i32) {
        if let Some(f) = &self.released {
            f(button, x, y);
        }
    }

    fn on_mouse_moved(&self, x: i32, y: i32) {
        if let Some(f) = &self.moved {
            f(x, y);
        }
    }

    fn on_mouse_wheel(&self, delta: i32) {
        if let Some(f) = &self.wheel {
            f(delta);
        }
    }
}

pub struct MouseTransitions {
    registry: CallbackRegistry<dyn MouseHandler>,
    cursor: Mutex<Position>,
}

impl MouseTransitions {
    fn cursor(&self) -> Position {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_cursor(&self, at: Position) {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }
}

impl Transitions for MouseTransitions {
    type Code = ButtonCode;
    type Point = Position;

    fn pressed(&self, button: ButtonCode, at: Position) {
        self.registry
            .dispatch("pressed", |handler| handler.on_mouse_pressed(button, at.x, at.y));
    }

    fn held(&self, button: ButtonCode, at: Position) {
        self.registry
            .dispatch("held", |handler| handler.on_mouse_held(button, at.x, at.y));
    }

    fn released(&self, button: ButtonCode, at: Position) {
        self.registry
            .dispatch("released", |handler| handler.on_mouse_released(button, at.x, at.y));
    }
}

/// Tracks which mouse buttons are down and notifies subscribers.
///
/// Cloning yields another handle to the same tracker.
#[derive(Clone)]
pub struct MouseTracker {
    core: Arc<PressTracker<MouseTransitions>>,
}

impl MouseTracker {
    /// Creates a stopped tracker fed by `hook`, with the default 100 ms hold interval.
    pub fn new(hook: Arc<dyn HookAdapter>) -> Self {
        Self::with_hold_interval(hook, DEFAULT_HOLD_INTERVAL)
    }

    pub fn with_hold_interval(hook: Arc<dyn HookAdapter>, hold_interval: Duration) -> Self {
        let transitions = MouseTransitions {
            registry: CallbackRegistry::new("mouse"),
            cursor: Mutex::new(Position::default()),
        };
        Self {
            core: Arc::new(PressTracker::new(HookKind::Mouse, hook, transitions, hold_interval)),
        }
    }

    /// Starts listening and installs the mouse hook.
    ///
    /// Same failure semantics as [`KeyboardTracker::start`](crate::application::keyboard_tracker::KeyboardTracker::start).
    pub fn start(&self) {
        let core = Arc::downgrade(&self.core);
        let sink: RawEventSink = Arc::new(move |event: RawEvent| {
            if let Some(core) = core.upgrade() {
                route(&core, event);
            }
        });
        self.core.start(sink);
    }

    pub fn stop(&self) {
        self.core.stop();
    }

    pub fn is_down(&self, button: ButtonCode) -> bool {
        self.core.is_down(button)
    }

    pub fn is_listening(&self) -> bool {
        self.core.is_listening()
    }

    pub fn is_hook_installed(&self) -> bool {
        self.core.is_hook_installed()
    }

    pub fn wait_until_stopped(&self) {
        self.core.wait_until_stopped();
    }

    /// Last cursor position seen while listening.
    pub fn cursor(&self) -> Position {
        self.core.transitions().cursor()
    }

    pub fn add_callback<H: MouseHandler + 'static>(&self, handler: H) -> CallbackToken {
        let handler: Arc<dyn MouseHandler> = Arc::new(handler);
        self.core.transitions().registry.add(handler)
    }

    pub fn remove_callback(&self, token: CallbackToken) -> bool {
        self.core.transitions().registry.remove(token)
    }

    /// Feeds one raw event, exactly as the installed hook would.  Key events are ignored.
    pub fn handle_raw(&self, event: RawEvent) {
        route(&self.core, event);
    }
}

fn route(core: &PressTracker<MouseTransitions>, event: RawEvent) {
    if event.kind() != HookKind::Mouse {
        trace!("mouse tracker: ignoring {event:?}");
        return;
    }
    if !core.is_listening() {
        return;
    }
    let transitions = core.transitions();
    match event {
        RawEvent::ButtonPressed { button, x, y } => {
            let at = Position { x, y };
            transitions.set_cursor(at);
            core.press(button, at);
        }
        RawEvent::ButtonReleased { button, x, y } => {
            let at = Position { x, y };
            transitions.set_cursor(at);
            core.release(button, at);
        }
        RawEvent::MouseMoved { x, y } => {
            transitions.set_cursor(Position { x, y });
            transitions
                .registry
                .dispatch("moved", |handler| handler.on_mouse_moved(x, y));
        }
        RawEvent::MouseWheel { delta, .. } => {
            transitions
                .registry
                .dispatch("wheel", |handler| handler.on_mouse_wheel(delta));
        }
        RawEvent::KeyPressed { .. } | RawEvent::KeyReleased { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hook::mock::MockHook;
    use std::thread;

    fn started(hold_ms: u64) -> (MouseTracker, Arc<MockHook>) {
        let hook = Arc::new(MockHook::new(HookKind::Mouse));
        let tracker = MouseTracker::with_hold_interval(hook.clone(), Duration::from_millis(hold_ms));
        tracker.start();
        (tracker, hook)
    }

    #[test]
    fn test_press_and_release_carry_event_coordinates() {
        // Arrange
        let (tracker, hook) = started(10_000);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (p, r) = (Arc::clone(&seen), Arc::clone(&seen));
        tracker.add_callback(
            MouseCallback::new()
                .on_pressed(move |b, x, y| p.lock().unwrap().push(("pressed", b, x, y)))
                .on_released(move |b, x, y| r.lock().unwrap().push(("released", b, x, y))),
        );

        // Act
        hook.emit(RawEvent::ButtonPressed { button: ButtonCode::LEFT, x: 10, y: 20 });
        hook.emit(RawEvent::ButtonReleased { button: ButtonCode::LEFT, x: 30, y: 40 });

        // Assert
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("pressed", ButtonCode::LEFT, 10, 20),
                ("released", ButtonCode::LEFT, 30, 40),
            ]
        );
        tracker.stop();
    }

    #[test]
    fn test_move_and_wheel_pass_through_and_move_updates_cursor() {
        let (tracker, hook) = started(10_000);
        let moves = Arc::new(Mutex::new(Vec::new()));
        let wheels = Arc::new(Mutex::new(Vec::new()));
        let (m, w) = (Arc::clone(&moves), Arc::clone(&wheels));
        tracker.add_callback(
            MouseCallback::new()
                .on_moved(move |x, y| m.lock().unwrap().push((x, y)))
                .on_wheel(move |delta| w.lock().unwrap().push(delta)),
        );

        hook.emit(RawEvent::MouseMoved { x: 5, y: 6 });
        hook.emit(RawEvent::MouseWheel { delta: -120, x: 5, y: 6 });

        assert_eq!(*moves.lock().unwrap(), vec![(5, 6)]);
        assert_eq!(*wheels.lock().unwrap(), vec![-120]);
        assert_eq!(tracker.cursor(), Position { x: 5, y: 6 });
        tracker.stop();
    }

    #[test]
    fn test_hold_ticks_report_press_position_after_drag() {
        // Arrange
        let (tracker, hook) = started(20);
        let held = Arc::new(Mutex::new(Vec::new()));
        let h = Arc::clone(&held);
        tracker.add_callback(MouseCallback::new().on_held(move |_, x, y| h.lock().unwrap().push((x, y))));

        // Act – press at (1, 1), then drag to (50, 60) before the first tick
        hook.emit(RawEvent::ButtonPressed { button: ButtonCode::RIGHT, x: 1, y: 1 });
        hook.emit(RawEvent::MouseMoved { x: 50, y: 60 });
        thread::sleep(Duration::from_millis(90));
        hook.emit(RawEvent::ButtonReleased { button: ButtonCode::RIGHT, x: 50, y: 60 });

        // Assert
        let held = held.lock().unwrap();
        assert!(!held.is_empty());
        assert!(held.iter().all(|&at| at == (1, 1)), "hold moved with the cursor: {held:?}");
        assert_eq!(tracker.cursor(), Position { x: 50, y: 60 });
        tracker.stop();
    }

    #[test]
    fn test_events_while_stopped_do_not_move_cursor() {
        let hook = Arc::new(MockHook::new(HookKind::Mouse));
        let tracker = MouseTracker::new(hook);

        tracker.handle_raw(RawEvent::MouseMoved { x: 99, y: 99 });

        assert_eq!(tracker.cursor(), Position::default());
    }

    #[test]
    fn test_key_events_are_ignored() {
        let (tracker, _hook) = started(10_000);
        tracker.handle_raw(RawEvent::KeyPressed { code: globalhook_core::KeyCode::A });
        assert!(!tracker.is_down(ButtonCode::LEFT));
        tracker.stop();
    }
}
