//! In-flight coalescing.
//!
//! This module provides:
//! - Wrap-time configuration ([`CoalesceOptions`])
//! - The in-flight wrapper ([`Coalescer`])
//!
//! At most one producer execution is outstanding per coalescer. Calls that
//! arrive meanwhile either share its outcome, or (in after mode) are folded
//! into a single follow-up execution that runs once it settles.

mod coalescer;


pub use coalescer::{CoalesceOptions, Coalescer};
