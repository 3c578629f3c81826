//! Time-window debouncing.
//!
//! This module provides:
//! - Wrap-time configuration ([`DebounceOptions`])
//! - The burst-collapsing wrapper ([`Debouncer`])
//!
//! # Burst Semantics
//!
//! | Scenario | Producer runs | Callers receive |
//! |----------|---------------|-----------------|
//! | N calls within one window | Once, with the last call's arguments | The same outcome |
//! | Calls spaced wider than the window | Once per call | Their own outcome |
//! | Leading edge, N calls within one window | Once, with the first call's arguments | The leading outcome |
//! | Abort while waiting | Never | [`CallError::Cancelled`](crate::CallError::Cancelled) |
//! | Call after the signal fired | Never | [`CallError::Cancelled`](crate::CallError::Cancelled) |

mod debouncer;
mod options;


pub use debouncer::Debouncer;
pub use options::DebounceOptions;
