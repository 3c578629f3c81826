//! Command runner used by the `settle` tool.
//!
//! This module provides:
//! - Trigger line filtering ([`LineFilter`])
//! - The shell command producer ([`CommandRunner`], [`Trigger`], [`CommandOutcome`])
//! - Error handling ([`RunnerError`])

mod command;
mod error;
mod filter;


pub use command::{CommandOutcome, CommandRunner, Trigger};
pub use error::RunnerError;
pub use filter::LineFilter;
