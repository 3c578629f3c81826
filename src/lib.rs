//! settle: debounce and in-flight coalescing for async operations
//!
//! A library for wrapping an asynchronous, result-producing operation so
//! that rapid or overlapping calls share executions:
//!
//! - [`Debouncer`] collapses a burst of calls into one execution once the
//!   calls stop for a quiet-period window (optionally running on the
//!   leading edge instead, and cancellable through an [`AbortSignal`]).
//! - [`Coalescer`] lets every call that arrives while an execution is in
//!   flight share that execution's outcome (optionally queuing one
//!   follow-up execution with the latest arguments).
//!
//! Every call returns a [`CallFuture`] right away. Callers attached to the
//! same execution all receive a clone of its outcome.
//!
//! The `config` and `runner` modules back the `settle` command-line tool,
//! which runs a templated shell command once its stdin input settles.

pub mod abort;
mod call;
pub mod coalesce;
pub mod config;
pub mod debounce;
pub mod error;
pub mod producer;
pub mod runner;
pub mod time;

pub use abort::{AbortController, AbortReason, AbortSignal};
pub use call::CallFuture;
pub use coalesce::{CoalesceOptions, Coalescer};
pub use debounce::{DebounceOptions, Debouncer};
pub use error::{CallError, OptionsError};
pub use producer::{CallResult, Invocation, Producer};
