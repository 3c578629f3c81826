//! The wrapped operation and how it is invoked.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use crate::error::CallError;

/// Result delivered to every caller attached to one execution.
pub type CallResult<T, E> = Result<T, CallError<E>>;

/// One call's arguments plus the context it was made on.
///
/// The context plays the role of the receiver a method call is bound to;
/// it travels next to the arguments through every internal path and
/// reaches the producer untouched. Calls made without a context carry
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<A, C = ()> {
    /// Arguments of the call
    pub args: A,
    /// Calling context, if the caller supplied one
    pub context: Option<C>,
}

impl<A, C> Invocation<A, C> {
    /// Creates an invocation without a calling context.
    #[must_use]
    pub const fn new(args: A) -> Self {
        Self {
            args,
            context: None,
        }
    }

    /// Creates an invocation bound to `context`.
    #[must_use]
    pub const fn with_context(context: C, args: A) -> Self {
        Self {
            args,
            context: Some(context),
        }
    }

    /// Splits the invocation into arguments and context.
    pub fn into_parts(self) -> (A, Option<C>) {
        (self.args, self.context)
    }
}

/// An asynchronous, result-producing operation that can be wrapped.
///
/// Output and error are `Clone` because one execution's outcome is handed
/// to every caller that shares it. Wrap them in `Arc` when the clones must
/// be the very same object.
///
/// Any `Fn(Invocation<A, C>) -> impl Future<Output = Result<T, E>>` closure
/// implements this trait.
///
/// # Example
///
/// ```
/// use settle::producer::{Invocation, Producer};
///
/// let double = |call: Invocation<u32>| async move { Ok::<_, String>(call.args * 2) };
/// let _future = double.produce(Invocation::new(21));
/// ```
pub trait Producer<A, C = ()>: Send + Sync + 'static {
    /// Value produced on success.
    type Output: Clone + Send + 'static;
    /// Error produced on failure.
    type Error: Clone + Send + 'static;
    /// Future returned by [`Producer::produce`].
    type Future: Future<Output = Result<Self::Output, Self::Error>> + Send + 'static;

    /// Starts one execution.
    fn produce(&self, call: Invocation<A, C>) -> Self::Future;
}

impl<F, Fut, A, C, T, E> Producer<A, C> for F
where
    F: Fn(Invocation<A, C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Error = E;
    type Future = Fut;

    fn produce(&self, call: Invocation<A, C>) -> Self::Future {
        self(call)
    }
}

/// Runs one producer execution in its own task.
///
/// Both failure channels end up in the returned result: an `Err` from the
/// producer becomes [`CallError::Producer`], and a panic (while building
/// the future or while polling it) becomes [`CallError::Panicked`].
pub(crate) async fn invoke<P, A, C>(
    producer: Arc<P>,
    call: Invocation<A, C>,
) -> CallResult<P::Output, P::Error>
where
    P: Producer<A, C>,
    A: Send + 'static,
    C: Send + 'static,
{
    let task = tokio::spawn(async move { producer.produce(call).await });

    match task.await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(CallError::Producer(error)),
        Err(join_error) if join_error.is_panic() => Err(CallError::Panicked {
            message: panic_message(join_error.into_panic().as_ref()),
        }),
        Err(_) => Err(CallError::Abandoned),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
