//! Delayed-execution abstraction for testability.
//!
//! This module provides a [`Scheduler`] trait that runs a callback once a
//! delay has elapsed, and a [`TimerHandle`] that cancels it. Production
//! code uses [`TokioScheduler`]; tests either run it under a paused Tokio
//! clock or inject their own implementation.

use std::fmt;
use std::time::Duration;

/// Callback run by a [`Scheduler`] when its delay elapses.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction over "run this later".
///
/// Implementations must never run the callback synchronously from inside
/// [`Scheduler::schedule_after`], even for a zero delay: callers hold
/// internal locks while scheduling.
///
/// # Example
///
/// ```
/// use settle::time::{Scheduler, TokioScheduler};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut handle = TokioScheduler.schedule_after(Duration::from_secs(60), Box::new(|| {}));
/// handle.cancel();
/// handle.cancel(); // idempotent
/// # }
/// ```
pub trait Scheduler: Send + Sync + 'static {
    /// Runs `callback` once `delay` has elapsed, unless cancelled first.
    fn schedule_after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancellation handle for a scheduled callback.
///
/// Dropping the handle does not cancel the callback.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + Sync + 'static>>,
}

impl TimerHandle {
    /// Creates a handle that runs `cancel` the first time it is cancelled.
    #[must_use]
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Creates a handle with nothing to cancel.
    #[must_use]
    pub const fn detached() -> Self {
        Self { cancel: None }
    }

    /// Cancels the scheduled callback.
    ///
    /// Safe to call any number of times, and after the callback has run.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Returns true if [`TimerHandle::cancel`] has not been called yet.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.cancel.is_some()
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// Production scheduler backed by `tokio::time::sleep`.
///
/// Each scheduled callback runs in its own spawned task, so this must be
/// used from within a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        let abort = task.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(count: &Arc<AtomicUsize>) -> TimerCallback {
        let count = Arc::clone(count);
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    mod timer_handle {
        use super::*;

        #[test]
        fn cancel_runs_once() {
            let count = Arc::new(AtomicUsize::new(0));
            let count_clone = Arc::clone(&count);
            let mut handle = TimerHandle::new(move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
            });

            assert!(handle.is_armed());
            handle.cancel();
            handle.cancel();

            assert!(!handle.is_armed());
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn detached_handle_cancels_nothing() {
            let mut handle = TimerHandle::detached();
            assert!(!handle.is_armed());
            handle.cancel();
        }

        #[test]
        fn debug_format_shows_state() {
            let handle = TimerHandle::new(|| {});
            assert!(format!("{handle:?}").contains("armed: true"));
        }
    }

    mod tokio_scheduler {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn runs_callback_after_delay() {
            let count = Arc::new(AtomicUsize::new(0));
            let _handle =
                TokioScheduler.schedule_after(Duration::from_millis(100), counting_callback(&count));

            tokio::time::sleep(Duration::from_millis(90)).await;
            assert_eq!(count.load(Ordering::SeqCst), 0);

            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn zero_delay_is_still_deferred() {
            let count = Arc::new(AtomicUsize::new(0));
            let _handle = TokioScheduler.schedule_after(Duration::ZERO, counting_callback(&count));

            assert_eq!(count.load(Ordering::SeqCst), 0);

            tokio::time::sleep(Duration::from_millis(1)).await;
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn cancelled_callback_never_runs() {
            let count = Arc::new(AtomicUsize::new(0));
            let mut handle =
                TokioScheduler.schedule_after(Duration::from_millis(50), counting_callback(&count));

            handle.cancel();
            tokio::time::sleep(Duration::from_millis(100)).await;

            assert_eq!(count.load(Ordering::SeqCst), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn cancel_after_firing_is_harmless() {
            let count = Arc::new(AtomicUsize::new(0));
            let mut handle =
                TokioScheduler.schedule_after(Duration::from_millis(10), counting_callback(&count));

            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
            handle.cancel();

            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn tokio_scheduler_is_send_sync() {
            fn assert_send_sync<T: Send + Sync>() {}
            assert_send_sync::<TokioScheduler>();
            assert_send_sync::<TimerHandle>();
        }
    }
}
