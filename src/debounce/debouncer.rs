//! Windowed debouncer.

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use crate::abort::{AbortReason, AbortSignal, Subscription};
use crate::call::{CallFuture, Waiter, settle_all};
use crate::error::{CallError, OptionsError};
use crate::producer::{CallResult, Invocation, Producer, invoke};
use crate::time::{Scheduler, TimerHandle, TokioScheduler};

use super::DebounceOptions;

type Outcome<P, A, C> = CallResult<<P as Producer<A, C>>::Output, <P as Producer<A, C>>::Error>;

/// Collapses bursts of calls into one producer execution.
///
/// Every call restarts a quiet-period timer. When the timer finally fires,
/// the producer runs once with the arguments of the last call of the burst
/// and every caller of the burst receives that one outcome.
///
/// With [`DebounceOptions::with_leading_edge`], the first call of a burst
/// runs the producer right away and the rest of the burst receives that
/// leading execution's outcome when the burst closes.
///
/// Clones share the same burst state. Separately constructed debouncers
/// never do, even when they wrap the same producer.
///
/// Must be used from within a Tokio runtime.
///
/// # Example
///
/// ```
/// use settle::debounce::{DebounceOptions, Debouncer};
/// use settle::producer::Invocation;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let search = Debouncer::new(
///     |call: Invocation<&'static str>| async move { Ok::<_, String>(call.args.len()) },
///     DebounceOptions::new(100.0),
/// )
/// .unwrap();
///
/// let first = search.call("r");
/// let last = search.call("rust");
///
/// assert_eq!(first.await.unwrap(), 4);
/// assert_eq!(last.await.unwrap(), 4);
/// # }
/// ```
pub struct Debouncer<P, A, C = (), S = TokioScheduler>
where
    P: Producer<A, C>,
{
    shared: Arc<Shared<P, A, C, S>>,
}

struct Shared<P, A, C, S>
where
    P: Producer<A, C>,
{
    producer: Arc<P>,
    scheduler: S,
    window: Duration,
    leading_edge: bool,
    abort_signal: Option<AbortSignal>,
    state: Mutex<BurstState<A, C, P::Output, P::Error>>,
}

/// Mutable burst bookkeeping. A burst is open exactly while `timer` is set.
struct BurstState<A, C, T, E> {
    timer: Option<TimerHandle>,
    /// Identifies the live timer; stale firings compare unequal.
    timer_seq: u64,
    /// Identifies the open burst for abort listeners.
    burst: u64,
    /// Latest call of the burst; its arguments feed the delayed execution.
    latest: Option<Invocation<A, C>>,
    waiters: Vec<Waiter<T, E>>,
    leading: Option<Arc<LeadingSlot<T, E>>>,
    abort_subscription: Option<Subscription>,
}

impl<A, C, T, E> BurstState<A, C, T, E> {
    const fn new() -> Self {
        Self {
            timer: None,
            timer_seq: 0,
            burst: 0,
            latest: None,
            waiters: Vec::new(),
            leading: None,
            abort_subscription: None,
        }
    }

    const fn is_open(&self) -> bool {
        self.timer.is_some()
    }
}

/// Outcome of a leading-edge execution, shared with the rest of its burst.
struct LeadingSlot<T, E> {
    state: Mutex<LeadingState<T, E>>,
}

enum LeadingState<T, E> {
    Running(Vec<Waiter<T, E>>),
    Settled(CallResult<T, E>),
}

impl<T: Clone, E: Clone> LeadingSlot<T, E> {
    fn new(leader: Waiter<T, E>) -> Self {
        Self {
            state: Mutex::new(LeadingState::Running(vec![leader])),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LeadingState<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands `waiters` the leading outcome, now or once it is known.
    fn attach(&self, waiters: Vec<Waiter<T, E>>) {
        let mut state = self.lock();
        match &mut *state {
            LeadingState::Running(pending) => pending.extend(waiters),
            LeadingState::Settled(result) => {
                let result = result.clone();
                drop(state);
                settle_all(waiters, &result);
            }
        }
    }

    fn complete(&self, result: CallResult<T, E>) {
        let previous = mem::replace(&mut *self.lock(), LeadingState::Settled(result.clone()));
        if let LeadingState::Running(waiters) = previous {
            settle_all(waiters, &result);
        }
    }
}

impl<P, A, C> Debouncer<P, A, C, TokioScheduler>
where
    P: Producer<A, C>,
    A: Send + 'static,
    C: Send + 'static,
{
    /// Wraps `producer` using the Tokio timer.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidArgument`] if the window is not a
    /// finite number.
    pub fn new(producer: P, options: DebounceOptions) -> Result<Self, OptionsError> {
        Self::with_scheduler(producer, options, TokioScheduler)
    }
}

impl<P, A, C, S> Debouncer<P, A, C, S>
where
    P: Producer<A, C>,
    A: Send + 'static,
    C: Send + 'static,
    S: Scheduler,
{
    /// Wraps `producer` using a custom scheduler for the quiet-period timer.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidArgument`] if the window is not a
    /// finite number.
    pub fn with_scheduler(
        producer: P,
        options: DebounceOptions,
        scheduler: S,
    ) -> Result<Self, OptionsError> {
        let window = options.window()?;

        Ok(Self {
            shared: Arc::new(Shared {
                producer: Arc::new(producer),
                scheduler,
                window,
                leading_edge: options.leading_edge(),
                abort_signal: options.abort_signal().cloned(),
                state: Mutex::new(BurstState::new()),
            }),
        })
    }

    /// Calls the producer through the debouncer, without a calling context.
    pub fn call(&self, args: A) -> CallFuture<P::Output, P::Error> {
        Shared::dispatch(&self.shared, Invocation::new(args))
    }

    /// Calls the producer through the debouncer, bound to `context`.
    pub fn call_with(&self, context: C, args: A) -> CallFuture<P::Output, P::Error> {
        Shared::dispatch(&self.shared, Invocation::with_context(context, args))
    }

    /// Returns the effective quiet-period window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// Returns true while a burst is open.
    #[must_use]
    pub fn is_burst_open(&self) -> bool {
        self.shared.lock_state().is_open()
    }

    /// Returns the number of callers waiting for the open burst to close.
    ///
    /// The leading caller of a burst is not counted; it waits on its own
    /// execution instead.
    #[must_use]
    pub fn pending_callers(&self) -> usize {
        self.shared.lock_state().waiters.len()
    }
}

impl<P, A, C, S> Shared<P, A, C, S>
where
    P: Producer<A, C>,
    A: Send + 'static,
    C: Send + 'static,
    S: Scheduler,
{
    fn lock_state(&self) -> MutexGuard<'_, BurstState<A, C, P::Output, P::Error>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(this: &Arc<Self>, call: Invocation<A, C>) -> CallFuture<P::Output, P::Error> {
        if let Some(reason) = this.abort_signal.as_ref().and_then(AbortSignal::reason) {
            tracing::debug!(%reason, "Call rejected, signal already aborted");
            return CallFuture::ready(Err(CallError::Cancelled(reason)));
        }

        let (waiter, future) = CallFuture::pending();
        let mut state = this.lock_state();

        let run_now = this.leading_edge && !state.is_open();
        if !state.is_open() {
            state.burst += 1;
            tracing::debug!(burst = state.burst, leading = run_now, "Burst opened");
        }
        this.restart_timer(&mut state);

        if run_now {
            let slot = Arc::new(LeadingSlot::new(waiter));
            state.leading = Some(Arc::clone(&slot));
            drop(state);

            let producer = Arc::clone(&this.producer);
            tokio::spawn(async move {
                slot.complete(invoke(producer, call).await);
            });
            return future;
        }

        if !this.leading_edge {
            state.latest = Some(call);
        }
        state.waiters.push(waiter);

        let needs_listener = state.waiters.len() == 1 && state.abort_subscription.is_none();
        let burst = state.burst;
        drop(state);

        if needs_listener {
            if let Some(signal) = &this.abort_signal {
                Self::listen_for_abort(this, signal, burst);
            }
        }

        future
    }

    /// Cancels the live timer, if any, and arms a fresh one.
    fn restart_timer(self: &Arc<Self>, state: &mut BurstState<A, C, P::Output, P::Error>) {
        if let Some(mut timer) = state.timer.take() {
            timer.cancel();
        }

        state.timer_seq += 1;
        let seq = state.timer_seq;
        let shared = Arc::clone(self);
        state.timer = Some(
            self.scheduler
                .schedule_after(self.window, Box::new(move || shared.close_burst(seq))),
        );
    }

    fn listen_for_abort(this: &Arc<Self>, signal: &AbortSignal, burst: u64) {
        let weak: Weak<Self> = Arc::downgrade(this);
        // Subscribed without holding the state lock: an already-fired
        // signal runs the listener right here.
        let subscription = signal.subscribe(move |reason| {
            if let Some(shared) = weak.upgrade() {
                shared.abort_burst(burst, reason);
            }
        });

        let mut state = this.lock_state();
        if state.is_open() && state.burst == burst && state.abort_subscription.is_none() {
            state.abort_subscription = Some(subscription);
        }
    }

    /// Timer callback: flushes the burst the timer `seq` belongs to.
    fn close_burst(&self, seq: u64) {
        let mut state = self.lock_state();
        if !state.is_open() || state.timer_seq != seq {
            return;
        }

        state.timer = None;
        let waiters = mem::take(&mut state.waiters);
        let latest = state.latest.take();
        let leading = state.leading.take();
        let subscription = state.abort_subscription.take();
        let burst = state.burst;
        drop(state);
        drop(subscription);

        tracing::debug!(burst, waiters = waiters.len(), "Burst closed");

        if waiters.is_empty() {
            return;
        }

        match (leading, latest) {
            (Some(slot), _) => slot.attach(waiters),
            (None, Some(call)) => {
                let producer = Arc::clone(&self.producer);
                tokio::spawn(async move {
                    let result: Outcome<P, A, C> = invoke(producer, call).await;
                    settle_all(waiters, &result);
                });
            }
            (None, None) => settle_all(waiters, &Err(CallError::Abandoned)),
        }
    }

    /// Abort listener: fails every waiter of `burst` and cancels its timer.
    fn abort_burst(&self, burst: u64, reason: AbortReason) {
        let mut state = self.lock_state();
        if !state.is_open() || state.burst != burst {
            return;
        }

        if let Some(mut timer) = state.timer.take() {
            timer.cancel();
        }
        let waiters = mem::take(&mut state.waiters);
        state.latest = None;
        state.leading = None;
        let subscription = state.abort_subscription.take();
        drop(state);
        drop(subscription);

        tracing::debug!(burst, waiters = waiters.len(), %reason, "Burst aborted");
        settle_all(waiters, &Err(CallError::Cancelled(reason)));
    }
}

impl<P, A, C, S> Clone for Debouncer<P, A, C, S>
where
    P: Producer<A, C>,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P, A, C, S> fmt::Debug for Debouncer<P, A, C, S>
where
    P: Producer<A, C>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.shared.window)
            .field("leading_edge", &self.shared.leading_edge)
            .field("abort_signal", &self.shared.abort_signal)
            .finish_non_exhaustive()
    }
}
