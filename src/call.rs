//! Eventual values handed back to callers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::CallError;
use crate::producer::CallResult;

/// Eventual result of one call to a wrapped producer.
///
/// Returned immediately by every call; the work it stands for is already
/// scheduled, whether or not this future is polled. Dropping it only
/// discards the caller's interest in the outcome.
#[must_use = "the call is scheduled regardless; await this to observe its outcome"]
pub struct CallFuture<T, E> {
    state: CallState<T, E>,
}

enum CallState<T, E> {
    Ready(Option<CallResult<T, E>>),
    Waiting(oneshot::Receiver<CallResult<T, E>>),
}

impl<T, E> CallFuture<T, E> {
    /// Creates a future that resolves to `result` on its first poll.
    pub(crate) const fn ready(result: CallResult<T, E>) -> Self {
        Self {
            state: CallState::Ready(Some(result)),
        }
    }

    /// Creates a future and the waiter that settles it.
    pub(crate) fn pending() -> (Waiter<T, E>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            Waiter { tx },
            Self {
                state: CallState::Waiting(rx),
            },
        )
    }
}

// The payload is only ever moved out, never pinned in place.
impl<T, E> Unpin for CallFuture<T, E> {}

impl<T, E> Future for CallFuture<T, E> {
    type Output = CallResult<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            CallState::Ready(result) => {
                Poll::Ready(result.take().unwrap_or(Err(CallError::Abandoned)))
            }
            CallState::Waiting(rx) => Pin::new(rx)
                .poll(cx)
                .map(|received| received.unwrap_or(Err(CallError::Abandoned))),
        }
    }
}

impl<T, E> fmt::Debug for CallFuture<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            CallState::Ready(_) => "ready",
            CallState::Waiting(_) => "waiting",
        };
        f.debug_struct("CallFuture").field("state", &state).finish()
    }
}

/// Settling side of one [`CallFuture`].
pub(crate) struct Waiter<T, E> {
    tx: oneshot::Sender<CallResult<T, E>>,
}

impl<T, E> Waiter<T, E> {
    /// Settles the caller. A caller that stopped listening is ignored.
    pub(crate) fn settle(self, result: CallResult<T, E>) {
        let _ = self.tx.send(result);
    }
}

/// Settles every waiter with a clone of `result`, in registration order.
pub(crate) fn settle_all<T, E>(waiters: Vec<Waiter<T, E>>, result: &CallResult<T, E>)
where
    T: Clone,
    E: Clone,
{
    for waiter in waiters {
        waiter.settle(result.clone());
    }
}
