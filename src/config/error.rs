//! What can go wrong between `settle.toml`, the command line and a runnable
//! configuration.

use std::path::PathBuf;

use thiserror::Error;

/// A configuration the tool refuses to start with.
///
/// All of these surface before any input line is read, and `main` maps them
/// to exit code 1.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` names a file that could not be read.
    #[error("Cannot read config file '{}': {source}", path.display())]
    FileRead {
        /// File passed to `--config`
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML, or has a key settle does not know.
    #[error("Config file is not valid settle TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// `settle init` could not create its output file.
    #[error("Cannot write config file '{}': {source}", path.display())]
    FileWrite {
        /// Output path of `settle init`
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither the CLI nor the file supplied a value with no default.
    #[error("No {field} given. {hint}")]
    MissingRequired {
        /// One of the [`field`] names
        field: &'static str,
        /// Where the value can be set
        hint: &'static str,
    },

    /// An `include` or `exclude` entry does not compile.
    #[error("Trigger pattern '{pattern}' does not compile: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The window is negative or not a finite number of milliseconds.
    #[error("Window of {value}ms rejected: {reason}")]
    InvalidWindow { value: f64, reason: &'static str },

    /// `debounce.mode` holds something other than `debounce` or `coalesce`.
    #[error("Unknown mode '{value}': use debounce or coalesce")]
    InvalidMode { value: String },

    /// The command template does not compile as Handlebars.
    #[error("Command template does not compile: {reason}")]
    InvalidTemplate { reason: String },
}

/// Names of settings that have no default.
pub mod field {
    /// `--command` / `command.template`
    pub const TEMPLATE: &str = "template";
}

impl ConfigError {
    /// Shorthand for [`ConfigError::MissingRequired`].
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
