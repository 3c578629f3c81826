//! Coalescer implementation.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::call::{CallFuture, Waiter, settle_all};
use crate::producer::{Invocation, Producer, invoke};

/// Configuration for a [`Coalescer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalesceOptions {
    /// Queue calls that arrive during an execution for one follow-up run,
    /// instead of handing them the current execution's outcome.
    pub after: bool,
}

impl CoalesceOptions {
    /// Creates options with after mode off.
    #[must_use]
    pub const fn new() -> Self {
        Self { after: false }
    }

    /// Sets after mode.
    #[must_use]
    pub const fn with_after(mut self, after: bool) -> Self {
        self.after = after;
        self
    }
}

/// Keeps at most one producer execution in flight.
///
/// | Call arrives while | after mode off | after mode on |
/// |--------------------|----------------|---------------|
/// | idle | Starts an execution | Starts an execution |
/// | an execution runs | Shares its outcome | Joins the queued follow-up |
///
/// The follow-up runs with the arguments of the newest call that joined it,
/// right after the current execution settles (success or failure). Calls
/// arriving while the follow-up runs queue the next one, until nothing is
/// left to drain.
///
/// Clones share the same slot. Must be used from within a Tokio runtime.
///
/// # Example
///
/// ```
/// use settle::coalesce::{CoalesceOptions, Coalescer};
/// use settle::producer::Invocation;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let refresh = Coalescer::new(
///     |call: Invocation<u32>| async move { Ok::<_, String>(call.args) },
///     CoalesceOptions::new(),
/// );
///
/// let first = refresh.call(1);
/// let second = refresh.call(2);
///
/// // Both callers observe the execution started by the first call.
/// assert_eq!(first.await.unwrap(), 1);
/// assert_eq!(second.await.unwrap(), 1);
/// # }
/// ```
pub struct Coalescer<P, A, C = ()>
where
    P: Producer<A, C>,
{
    shared: Arc<Shared<P, A, C>>,
}

struct Shared<P, A, C>
where
    P: Producer<A, C>,
{
    producer: Arc<P>,
    after: bool,
    state: Mutex<FlightState<A, C, P::Output, P::Error>>,
}

struct FlightState<A, C, T, E> {
    /// Callers of the outstanding execution; `None` while idle.
    current: Option<Vec<Waiter<T, E>>>,
    follow_up: Option<FollowUp<A, C, T, E>>,
}

/// The single queued re-run: newest arguments, every caller that queued.
struct FollowUp<A, C, T, E> {
    call: Invocation<A, C>,
    waiters: Vec<Waiter<T, E>>,
}

impl<P, A, C> Coalescer<P, A, C>
where
    P: Producer<A, C>,
    A: Send + 'static,
    C: Send + 'static,
{
    /// Wraps `producer`.
    pub fn new(producer: P, options: CoalesceOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                producer: Arc::new(producer),
                after: options.after,
                state: Mutex::new(FlightState {
                    current: None,
                    follow_up: None,
                }),
            }),
        }
    }

    /// Calls the producer through the coalescer, without a calling context.
    pub fn call(&self, args: A) -> CallFuture<P::Output, P::Error> {
        Shared::dispatch(&self.shared, Invocation::new(args))
    }

    /// Calls the producer through the coalescer, bound to `context`.
    pub fn call_with(&self, context: C, args: A) -> CallFuture<P::Output, P::Error> {
        Shared::dispatch(&self.shared, Invocation::with_context(context, args))
    }

    /// Returns true if no execution is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.shared.lock_state().current.is_none()
    }

    /// Returns true if a follow-up execution is queued.
    #[must_use]
    pub fn has_follow_up(&self) -> bool {
        self.shared.lock_state().follow_up.is_some()
    }
}

impl<P, A, C> Shared<P, A, C>
where
    P: Producer<A, C>,
    A: Send + 'static,
    C: Send + 'static,
{
    fn lock_state(&self) -> MutexGuard<'_, FlightState<A, C, P::Output, P::Error>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(this: &Arc<Self>, call: Invocation<A, C>) -> CallFuture<P::Output, P::Error> {
        let (waiter, future) = CallFuture::pending();
        let mut state = this.lock_state();

        let Some(current) = state.current.as_mut() else {
            state.current = Some(vec![waiter]);
            drop(state);

            tracing::debug!("Execution started");
            tokio::spawn(Self::drain(Arc::clone(this), call));
            return future;
        };

        if !this.after {
            current.push(waiter);
            return future;
        }

        match &mut state.follow_up {
            Some(follow_up) => {
                follow_up.call = call;
                follow_up.waiters.push(waiter);
            }
            None => {
                state.follow_up = Some(FollowUp {
                    call,
                    waiters: vec![waiter],
                });
            }
        }
        tracing::debug!("Follow-up queued");

        future
    }

    /// Runs `call`, then every follow-up queued meanwhile, one at a time.
    async fn drain(this: Arc<Self>, mut call: Invocation<A, C>) {
        loop {
            let result = invoke(Arc::clone(&this.producer), call).await;
            let (waiters, next) = this.promote_follow_up();
            settle_all(waiters, &result);

            match next {
                Some(follow_up) => {
                    tracing::debug!("Running follow-up");
                    call = follow_up;
                }
                None => {
                    tracing::debug!("Drained, coalescer idle");
                    return;
                }
            }
        }
    }

    /// Detaches the settled execution's callers and makes the queued
    /// follow-up, if any, the current execution.
    fn promote_follow_up(&self) -> (Vec<Waiter<P::Output, P::Error>>, Option<Invocation<A, C>>) {
        let mut state = self.lock_state();
        let waiters = state.current.take().unwrap_or_default();

        match state.follow_up.take() {
            Some(FollowUp { call, waiters: next }) => {
                state.current = Some(next);
                (waiters, Some(call))
            }
            None => (waiters, None),
        }
    }
}

impl<P, A, C> Clone for Coalescer<P, A, C>
where
    P: Producer<A, C>,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P, A, C> fmt::Debug for Coalescer<P, A, C>
where
    P: Producer<A, C>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coalescer")
            .field("after", &self.shared.after)
            .finish_non_exhaustive()
    }
}
