//! CallbackRegistry: ordered fan-out of transitions to subscribers.
//!
//! Subscribers are stored in registration order and each is identified by
//! the [`CallbackToken`] returned from [`CallbackRegistry::add`].  Removal
//! goes through that token, so two structurally identical handlers can never
//! be confused with one another.
//!
//! # Concurrency
//!
//! The subscriber list is copy-on-write: `dispatch` takes a snapshot and
//! iterates it without holding any lock.  Hold ticks (timer threads) and
//! press/release handling (adapter thread) can therefore dispatch
//! concurrently, and a handler may add or remove subscribers; such a change
//! becomes visible from the next dispatch.
//!
//! # Failure isolation
//!
//! Every handler invocation runs inside `catch_unwind`.  A panicking
//! subscriber is logged and skipped; the remaining subscribers of the same
//! dispatch still run and the tracker's bookkeeping is unaffected.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error};
use uuid::Uuid;

/// Opaque handle identifying one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(Uuid);

impl CallbackToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Entry<H: ?Sized> {
    token: CallbackToken,
    handler: Arc<H>,
}

impl<H: ?Sized> Clone for Entry<H> {
    fn clone(&self) -> Self {
        Self {
            token: self.token,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Ordered collection of subscribers of handler type `H`.
pub struct CallbackRegistry<H: ?Sized> {
    /// Registry name used in log output (`"keyboard"`, `"mouse"`).
    label: &'static str,
    entries: RwLock<Arc<Vec<Entry<H>>>>,
}

impl<H: ?Sized> CallbackRegistry<H> {
    /// Creates an empty registry.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Appends `handler`; it will be invoked after all earlier subscribers.
    pub fn add(&self, handler: Arc<H>) -> CallbackToken {
        let token = CallbackToken::new();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut entries).push(Entry { token, handler });
        debug!(registry = self.label, %token, subscribers = entries.len(), "subscriber added");
        token
    }

    /// Removes the subscriber registered under `token`.
    ///
    /// Returns `false` if the token is unknown (never added or already removed).
    pub fn remove(&self, token: CallbackToken) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(index) = entries.iter().position(|entry| entry.token == token) else {
            debug!(registry = self.label, %token, "remove ignored: unknown subscriber");
            return false;
        };
        Arc::make_mut(&mut entries).remove(index);
        debug!(registry = self.label, %token, subscribers = entries.len(), "subscriber removed");
        true
    }

    /// Returns the number of registered subscribers.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes `invoke` once per subscriber, in registration order.
    ///
    /// `transition` names the notification in log output should a subscriber panic.
    pub fn dispatch(&self, transition: &'static str, mut invoke: impl FnMut(&H)) {
        let snapshot = self.snapshot();
        for entry in snapshot.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| invoke(entry.handler.as_ref())));
            if let Err(payload) = outcome {
                error!(
                    registry = self.label,
                    token = %entry.token,
                    transition,
                    "subscriber panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn snapshot(&self) -> Arc<Vec<Entry<H>>> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
