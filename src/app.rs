//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use settle::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, missing command template, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - unreadable input, runtime setup failure, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Returns a hint for common configuration errors, if there is one.
pub fn config_hint(error: &ConfigError) -> Option<&'static str> {
    match error {
        ConfigError::MissingRequired { field: f, .. } if *f == field::TEMPLATE => {
            Some("Run 'settle init' to generate a configuration template.")
        }
        ConfigError::FileRead { .. } => {
            Some("Run 'settle init' to generate a configuration template.")
        }
        ConfigError::InvalidTemplate { .. } => {
            Some("Available template variables: {{line}}, {{count}}.")
        }
        _ => None,
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    if let Some(hint) = config_hint(error) {
        eprintln!("\n{hint}");
    }
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_template_suggests_init() {
        let error = ConfigError::missing(field::TEMPLATE, "Use --command");

        assert!(config_hint(&error).unwrap().contains("settle init"));
    }

    #[test]
    fn unreadable_file_suggests_init() {
        let error = ConfigError::FileRead {
            path: PathBuf::from("settle.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };

        assert!(config_hint(&error).unwrap().contains("settle init"));
    }

    #[test]
    fn template_error_lists_variables() {
        let error = ConfigError::InvalidTemplate {
            reason: "unclosed".to_string(),
        };

        assert!(config_hint(&error).unwrap().contains("{{line}}"));
    }

    #[test]
    fn other_errors_have_no_hint() {
        let error = ConfigError::InvalidMode {
            value: "throttle".to_string(),
        };

        assert!(config_hint(&error).is_none());
    }

    #[test]
    fn runtime_error_is_two() {
        assert_eq!(exit_code::runtime_error(), std::process::ExitCode::from(2));
    }
}
