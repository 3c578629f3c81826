//! Error types shared by the debouncer and the coalescer.

use thiserror::Error;

use crate::abort::AbortReason;

/// Error delivered to a caller of a wrapped producer.
///
/// Every caller attached to the same execution receives a clone of the
/// same error. Producer errors are passed through untouched, so their
/// identity survives as long as `E`'s `Clone` preserves it (for example
/// an `Arc`).
#[derive(Debug, Clone, Error)]
pub enum CallError<E> {
    /// The abort signal fired before the call was served.
    #[error("Call cancelled: {0}")]
    Cancelled(AbortReason),

    /// The producer returned an error.
    #[error("Producer failed: {0}")]
    Producer(E),

    /// The producer panicked, either while building its future or while
    /// the future was running.
    #[error("Producer panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string
        message: String,
    },

    /// The wrapped callable went away before the call was settled.
    ///
    /// Only happens when the runtime shuts down with calls still pending.
    #[error("Call abandoned before it settled")]
    Abandoned,
}

impl<E> CallError<E> {
    /// Returns true if this call failed because of the abort signal.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns the producer's own error, if that is what failed the call.
    #[must_use]
    pub const fn producer_error(&self) -> Option<&E> {
        match self {
            Self::Producer(e) => Some(e),
            _ => None,
        }
    }

    /// Consumes the error and returns the producer's own error, if any.
    pub fn into_producer_error(self) -> Option<E> {
        match self {
            Self::Producer(e) => Some(e),
            _ => None,
        }
    }
}

/// Error raised while wrapping a producer.
///
/// The wrapped callable is never produced when this is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    /// An option value is outside its accepted domain.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the offending option
        name: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}
