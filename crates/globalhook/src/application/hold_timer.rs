//! Cancellable fixed-rate repeat task backing "held" notifications.
//!
//! Each [`HoldTimer`] owns one named thread that calls its tick closure every
//! `period`, measured from the moment the timer was created (tick *n* is due
//! at `created + n * period`).  A tick that overruns its slot is followed by
//! the overdue ticks immediately, the same catch-up behaviour as a classic
//! fixed-rate timer.
//!
//! # Cancellation guarantee
//!
//! [`HoldTimer::cancel`] blocks until the timer thread has exited.  A tick
//! that is already running when cancellation is requested finishes first, and
//! no tick starts afterwards, so once `cancel()` returns the closure will
//! never run again.
//!
//! The exception is a cancel issued from inside *any* tick (a subscriber that
//! releases or stops inside its hold handler).  The target timer is marked
//! cancelled and exits after its current tick, but the call does not wait for
//! it.  Two ticks cancelling each other would otherwise join each other
//! forever.  In that case one more tick of the target may still be running
//! after `cancel()` returns.

use std::cell::Cell;
use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default interval between two hold ticks.
pub const DEFAULT_HOLD_INTERVAL: Duration = Duration::from_millis(100);

thread_local! {
    static ON_TIMER_THREAD: Cell<bool> = const { Cell::new(false) };
}

/// Returns `true` when called from a hold timer's tick.
fn on_timer_thread() -> bool {
    ON_TIMER_THREAD.with(Cell::get)
}

/// A running periodic task; dropping it cancels the task.
pub struct HoldTimer {
    signal: Arc<CancelSignal>,
    handle: Option<JoinHandle<()>>,
}

struct CancelSignal {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl CancelSignal {
    /// Sleeps until `deadline`.  Returns `false` if cancelled in the meantime.
    fn sleep_until(&self, deadline: Instant) -> bool {
        let mut cancelled = self.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *cancelled {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            cancelled = self
                .wake
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn cancel(&self) {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }
}

impl HoldTimer {
    /// Starts a timer thread called `name` that runs `tick` every `period`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn<F>(name: String, period: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let signal = Arc::new(CancelSignal {
            cancelled: Mutex::new(false),
            wake: Condvar::new(),
        });
        let worker = Arc::clone(&signal);
        let created = Instant::now();

        let handle = thread::Builder::new().name(name).spawn(move || {
            ON_TIMER_THREAD.with(|flag| flag.set(true));
            let mut due = created;
            loop {
                due += period;
                if !worker.sleep_until(due) {
                    break;
                }
                tick();
            }
        })?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// Stops the timer and waits for an in-flight tick to finish.
    ///
    /// Called from a tick, it only signals the timer and returns.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.signal.cancel();
        if let Some(handle) = self.handle.take() {
            // Ticks never join a timer thread, their own or another one.
            if !on_timer_thread() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for HoldTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_timer(period: Duration) -> (HoldTimer, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let timer = HoldTimer::spawn("test-hold".to_string(), period, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("spawn should succeed");
        (timer, ticks)
    }

    #[test]
    fn test_timer_ticks_repeatedly_at_fixed_rate() {
        // Arrange
        let (timer, ticks) = counting_timer(Duration::from_millis(20));

        // Act
        thread::sleep(Duration::from_millis(110));
        timer.cancel();

        // Assert – 5 slots elapsed; allow scheduler jitter on either side
        let count = ticks.load(Ordering::SeqCst);
        assert!((3..=6).contains(&count), "expected ~5 ticks, got {count}");
    }

    #[test]
    fn test_timer_does_not_tick_before_first_period() {
        let (timer, ticks) = counting_timer(Duration::from_millis(200));
        thread::sleep(Duration::from_millis(50));
        timer.cancel();
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_tick_after_cancel_returns() {
        // Arrange
        let (timer, ticks) = counting_timer(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(30));

        // Act
        timer.cancel();
        let at_cancel = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(40));

        // Assert
        assert_eq!(ticks.load(Ordering::SeqCst), at_cancel);
    }

    #[test]
    fn test_cancel_waits_for_in_flight_tick() {
        // Arrange – a tick that takes far longer than the period
        let finished = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(AtomicUsize::new(0));
        let (f, s) = (Arc::clone(&finished), Arc::clone(&started));
        let timer = HoldTimer::spawn("slow-hold".to_string(), Duration::from_millis(5), move || {
            s.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(60));
            f.fetch_add(1, Ordering::SeqCst);
        })
        .expect("spawn should succeed");
        while started.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        // Act
        timer.cancel();

        // Assert – every started tick has completed by the time cancel returns
        assert_eq!(
            finished.load(Ordering::SeqCst),
            started.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn test_dropping_timer_cancels_it() {
        let (timer, ticks) = counting_timer(Duration::from_millis(5));
        drop(timer);
        let after_drop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_drop);
    }

    #[test]
    fn test_tick_can_cancel_its_own_timer_without_deadlock() {
        // Arrange – the timer is handed to its own tick closure after spawn
        let slot: Arc<Mutex<Option<HoldTimer>>> = Arc::new(Mutex::new(None));
        let ticks = Arc::new(AtomicUsize::new(0));
        let (inner_slot, counter) = (Arc::clone(&slot), Arc::clone(&ticks));
        let timer = HoldTimer::spawn("self-cancel".to_string(), Duration::from_millis(30), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(own) = inner_slot.lock().unwrap().take() {
                own.cancel();
            }
        })
        .expect("spawn should succeed");
        *slot.lock().unwrap() = Some(timer);

        // Act
        thread::sleep(Duration::from_millis(150));

        // Assert – exactly one tick ran, then the thread exited
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ticks_cancelling_each_others_timers_do_not_deadlock() {
        // Arrange – each timer's tick takes and cancels the other timer
        let slot_a: Arc<Mutex<Option<HoldTimer>>> = Arc::new(Mutex::new(None));
        let slot_b: Arc<Mutex<Option<HoldTimer>>> = Arc::new(Mutex::new(None));
        let taken = Arc::new(AtomicUsize::new(0));
        let returned = Arc::new(AtomicUsize::new(0));
        let cross = |other: Arc<Mutex<Option<HoldTimer>>>| {
            let (taken, returned) = (Arc::clone(&taken), Arc::clone(&returned));
            move || {
                let timer = other.lock().unwrap().take();
                if let Some(timer) = timer {
                    taken.fetch_add(1, Ordering::SeqCst);
                    // Keep both ticks in flight at the same time.
                    thread::sleep(Duration::from_millis(20));
                    timer.cancel();
                    returned.fetch_add(1, Ordering::SeqCst);
                }
            }
        };
        let period = Duration::from_millis(30);
        let a = HoldTimer::spawn("cross-a".to_string(), period, cross(Arc::clone(&slot_b)))
            .expect("spawn should succeed");
        let b = HoldTimer::spawn("cross-b".to_string(), period, cross(Arc::clone(&slot_a)))
            .expect("spawn should succeed");
        *slot_a.lock().unwrap() = Some(a);
        *slot_b.lock().unwrap() = Some(b);

        // Act
        thread::sleep(Duration::from_millis(200));

        // Assert – every cancel issued from a tick has returned
        assert!(taken.load(Ordering::SeqCst) >= 1);
        assert_eq!(returned.load(Ordering::SeqCst), taken.load(Ordering::SeqCst));
    }

    #[test]
    fn test_timer_thread_flag_is_set_only_inside_ticks() {
        let seen = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&seen);
        let timer = HoldTimer::spawn("flag".to_string(), Duration::from_millis(5), move || {
            *inner.lock().unwrap() = Some(on_timer_thread());
        })
        .expect("spawn should succeed");
        thread::sleep(Duration::from_millis(40));
        timer.cancel();

        assert_eq!(*seen.lock().unwrap(), Some(true));
        assert!(!on_timer_thread());
    }
}
