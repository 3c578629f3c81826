//! Cooperative cancellation signal.
//!
//! An [`AbortController`] owns the right to fire; any number of cloned
//! [`AbortSignal`]s observe it. Observers can query the signal at any time
//! or register a one-shot listener with [`AbortSignal::subscribe`]. The
//! returned [`Subscription`] removes the listener when dropped, so callers
//! that finish normally never leak a registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Reason attached to a fired signal.
///
/// Cheap to clone; every cancelled caller receives a clone of the same
/// reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortReason(Arc<str>);

impl AbortReason {
    /// Reason used by [`AbortController::abort`].
    pub const DEFAULT_MESSAGE: &'static str = "This operation was aborted";

    /// Creates a reason with the given message.
    #[must_use]
    pub fn new(message: impl AsRef<str>) -> Self {
        Self(Arc::from(message.as_ref()))
    }

    /// Returns the reason message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl Default for AbortReason {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MESSAGE)
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type Listener = Box<dyn FnOnce(AbortReason) + Send>;

struct Inner {
    aborted: AtomicBool,
    reason: Mutex<Option<AbortReason>>,
    listeners: Mutex<HashMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl Inner {
    fn fire(&self, reason: AbortReason) {
        {
            let mut slot = self.reason.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return;
            }
            *slot = Some(reason.clone());
            self.aborted.store(true, Ordering::Release);
        }

        // Listeners run outside the lock so they may unsubscribe or query us.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, listener)| listener)
            .collect();

        tracing::debug!(listeners = listeners.len(), %reason, "Abort signal fired");

        for listener in listeners {
            listener(reason.clone());
        }
    }
}

/// Owner side of an abort signal.
///
/// Dropping the controller does not fire the signal.
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    /// Creates a controller with a fresh, unfired signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            signal: AbortSignal {
                inner: Arc::new(Inner {
                    aborted: AtomicBool::new(false),
                    reason: Mutex::new(None),
                    listeners: Mutex::new(HashMap::new()),
                    next_id: AtomicU64::new(0),
                }),
            },
        }
    }

    /// Returns a signal observing this controller.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Fires the signal with the default reason.
    ///
    /// Firing is one-shot: later calls are ignored and keep the first reason.
    pub fn abort(&self) {
        self.abort_with(AbortReason::default());
    }

    /// Fires the signal with the given reason.
    pub fn abort_with(&self, reason: AbortReason) {
        self.signal.inner.fire(reason);
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AbortController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortController")
            .field("signal", &self.signal)
            .finish()
    }
}

/// Observer side of an abort signal. Clones observe the same controller.
#[derive(Clone)]
pub struct AbortSignal {
    inner: Arc<Inner>,
}

impl AbortSignal {
    /// Returns true once the controller has fired.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// Returns the reason the signal fired with, if it has fired.
    #[must_use]
    pub fn reason(&self) -> Option<AbortReason> {
        self.inner
            .reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a listener that runs at most once, when the signal fires.
    ///
    /// If the signal has already fired, the listener runs immediately on the
    /// calling thread. The listener is removed when the returned
    /// [`Subscription`] is dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnOnce(AbortReason) + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut listeners = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            // Checked under the listener lock: `fire` sets the flag before
            // draining, so a listener inserted here is never missed.
            if !self.is_aborted() {
                listeners.insert(id, Box::new(listener));
                return Subscription {
                    id,
                    inner: Arc::downgrade(&self.inner),
                };
            }
        }

        listener(self.reason().unwrap_or_default());
        Subscription {
            id,
            inner: std::sync::Weak::new(),
        }
    }

    /// Returns the number of listeners currently registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.is_aborted())
            .finish_non_exhaustive()
    }
}

/// Registration handle returned by [`AbortSignal::subscribe`].
///
/// Removes the listener on drop. Removing an already-fired or already
/// removed listener is a no-op.
#[must_use = "dropping a subscription removes its listener"]
pub struct Subscription {
    id: u64,
    inner: std::sync::Weak<Inner>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
