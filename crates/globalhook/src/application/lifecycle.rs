//! Listening flag and keep-alive for one tracker.
//!
//! While a tracker is listening it owns a parked keep-alive thread, so the
//! process has a live non-daemon thread for as long as hooks are active.  The
//! thread sleeps on a condition variable and is woken by [`Lifecycle::end`];
//! host code can block on the same condition through
//! [`Lifecycle::wait_until_stopped`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

pub struct Lifecycle {
    name: &'static str,
    listening: AtomicBool,
    parking: Arc<Parking>,
    keep_alive: Mutex<Option<JoinHandle<()>>>,
}

struct Parking {
    running: Mutex<bool>,
    wake: Condvar,
}

impl Parking {
    fn set_running(&self, running: bool) {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner) = running;
        self.wake.notify_all();
    }

    fn wait_while_running(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        while *running {
            running = self.wake.wait(running).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Lifecycle {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listening: AtomicBool::new(false),
            parking: Arc::new(Parking {
                running: Mutex::new(false),
                wake: Condvar::new(),
            }),
            keep_alive: Mutex::new(None),
        }
    }

    /// Raises the listening flag and parks a keep-alive thread.
    ///
    /// Returns `false` without side effects if already listening.
    pub fn begin(&self) -> bool {
        if self.listening.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.parking.set_running(true);

        let parking = Arc::clone(&self.parking);
        let spawned = thread::Builder::new()
            .name(format!("{}-keepalive", self.name))
            .spawn(move || parking.wait_while_running());
        match spawned {
            Ok(handle) => {
                *self.keep_alive.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
                debug!(tracker = self.name, "keep-alive parked");
            }
            // Listening still works without it; only process liveness is affected.
            Err(e) => error!(tracker = self.name, "failed to spawn keep-alive thread: {e}"),
        }
        true
    }

    /// Lowers the listening flag and releases the keep-alive thread.
    ///
    /// Returns `false` without side effects if not listening.
    pub fn end(&self) -> bool {
        if !self.listening.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.parking.set_running(false);

        let handle = self
            .keep_alive
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        debug!(tracker = self.name, "keep-alive released");
        true
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Blocks until [`end`](Self::end) is called.  Returns at once if not listening.
    pub fn wait_until_stopped(&self) {
        self.parking.wait_while_running();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_begin_and_end_toggle_listening() {
        // Arrange
        let lifecycle = Lifecycle::new("test");

        // Act / Assert
        assert!(!lifecycle.is_listening());
        assert!(lifecycle.begin());
        assert!(lifecycle.is_listening());
        assert!(lifecycle.end());
        assert!(!lifecycle.is_listening());
    }

    #[test]
    fn test_second_begin_and_second_end_are_rejected() {
        let lifecycle = Lifecycle::new("test");
        assert!(lifecycle.begin());
        assert!(!lifecycle.begin());
        assert!(lifecycle.end());
        assert!(!lifecycle.end());
    }

    #[test]
    fn test_wait_until_stopped_returns_after_end() {
        // Arrange
        let lifecycle = Arc::new(Lifecycle::new("test"));
        lifecycle.begin();
        let (done_tx, done_rx) = mpsc::channel();
        let waiter = Arc::clone(&lifecycle);
        let handle = thread::spawn(move || {
            waiter.wait_until_stopped();
            done_tx.send(()).unwrap();
        });

        // Act – the waiter must still be blocked before end()
        let early = done_rx.recv_timeout(Duration::from_millis(50));
        lifecycle.end();

        // Assert
        assert!(early.is_err(), "waiter returned before end()");
        done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("waiter should wake after end()");
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_until_stopped_returns_immediately_when_idle() {
        let lifecycle = Lifecycle::new("test");
        lifecycle.wait_until_stopped();
    }

    #[test]
    fn test_lifecycle_can_restart() {
        let lifecycle = Lifecycle::new("test");
        assert!(lifecycle.begin());
        assert!(lifecycle.end());
        assert!(lifecycle.begin());
        assert!(lifecycle.is_listening());
        assert!(lifecycle.end());
    }
}
