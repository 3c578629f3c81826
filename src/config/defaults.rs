//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

/// Default quiet-period window in milliseconds.
pub const WINDOW_MS: f64 = 500.0;

/// Default shell for running the command.
pub const SHELL: &str = "sh";

/// Default output path for `settle init`.
pub const CONFIG_FILE: &str = "settle.toml";
