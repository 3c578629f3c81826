//! Turns `settle` flags and an optional `settle.toml` into a
//! [`ValidatedConfig`].
//!
//! A flag given on the command line beats the same key in the file, and the
//! file beats [`defaults`]. `--command` / `command.template` is the one
//! setting without a default.
//!
//! `--include` and `--exclude` each swap out the file's list as a whole; an
//! `--include` leaves the file's `exclude` list alone. `--leading` and
//! `--after` can only switch a behavior on, so `true` in the file stays
//! `true`. `leading` is read in debounce mode only and `after` in
//! coalesce mode only.
//!
//! Everything that can be checked up front (template syntax, regexes, the
//! window) is checked here, so a bad value stops the tool before it reads
//! any input. `settle init` writes a commented starting file via
//! [`write_default_config`].

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command, ModeArg};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{Mode, ValidatedConfig, expand_tilde, write_default_config};
