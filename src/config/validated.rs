//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::coalesce::CoalesceOptions;
use crate::debounce::DebounceOptions;
use crate::runner::{CommandRunner, LineFilter};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// How triggers are collapsed into command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One run per burst, after a quiet period
    #[default]
    Debounce,
    /// One run shared by every trigger that arrives while it is running
    Coalesce,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debounce => write!(f, "debounce"),
            Self::Coalesce => write!(f, "coalesce"),
        }
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// How triggers are collapsed
    pub mode: Mode,

    /// Quiet-period window in milliseconds (finite, non-negative)
    pub window_ms: f64,

    /// Run on the leading edge of a burst (debounce mode)
    pub leading: bool,

    /// Queue one follow-up run while busy (coalesce mode)
    pub after: bool,

    /// Command template source
    pub template: String,

    /// Compiled command runner (shell and dry-run applied)
    pub runner: CommandRunner,

    /// Trigger line filter
    pub filter: LineFilter,

    /// Dry-run mode (log commands without running them)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ mode: {}, window: {}ms, leading: {}, after: {}, shell: {}, \
             dry_run: {}, filters: {} }}",
            self.mode,
            self.window_ms,
            self.leading,
            self.after,
            self.runner.shell(),
            self.dry_run,
            self.filter.len(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The command template is missing or has a syntax error
    /// - The mode is unknown
    /// - The window is negative or not finite
    /// - Regex patterns are invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let mode = Self::resolve_mode(cli, toml)?;
        let window_ms = Self::resolve_window(cli, toml)?;

        // Flags only enable
        let leading = cli.leading || toml.is_some_and(|t| t.debounce.leading);
        let after = cli.after || toml.is_some_and(|t| t.debounce.after);

        let template = Self::resolve_template(cli, toml)?;
        let shell = cli
            .shell
            .as_deref()
            .or_else(|| toml.and_then(|t| t.command.shell.as_deref()))
            .unwrap_or(defaults::SHELL);

        let runner = CommandRunner::new(&template)
            .map_err(|e| ConfigError::InvalidTemplate {
                reason: e.to_string(),
            })?
            .with_shell(shell)
            .with_dry_run(cli.dry_run);

        let filter = Self::build_filter(cli, toml)?;

        Ok(Self {
            mode,
            window_ms,
            leading,
            after,
            template,
            runner,
            filter,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path
    /// (a leading `~` is expanded to the home directory).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(&expand_tilde(path))?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Options for debounce mode.
    #[must_use]
    pub const fn debounce_options(&self) -> DebounceOptions {
        DebounceOptions::new(self.window_ms).with_leading_edge(self.leading)
    }

    /// Options for coalesce mode.
    #[must_use]
    pub const fn coalesce_options(&self) -> CoalesceOptions {
        CoalesceOptions::new().with_after(self.after)
    }

    fn resolve_mode(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Mode, ConfigError> {
        // CLI takes precedence
        if let Some(mode) = cli.mode {
            return Ok(mode.into());
        }

        match toml.and_then(|t| t.debounce.mode.as_deref()) {
            Some(value) => parse_mode(value),
            None => Ok(Mode::default()),
        }
    }

    fn resolve_window(cli: &Cli, toml: Option<&TomlConfig>) -> Result<f64, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let value = cli
            .window_ms
            .or_else(|| toml.and_then(|t| t.debounce.window_ms))
            .unwrap_or(defaults::WINDOW_MS);

        if !value.is_finite() {
            return Err(ConfigError::InvalidWindow {
                value,
                reason: "must be a finite number",
            });
        }

        if value < 0.0 {
            return Err(ConfigError::InvalidWindow {
                value,
                reason: "must not be negative",
            });
        }

        Ok(value)
    }

    fn resolve_template(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        cli.template
            .clone()
            .or_else(|| toml.and_then(|t| t.command.template.clone()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::TEMPLATE,
                    "Use --command or set command.template in config file",
                )
            })
    }

    fn build_filter(cli: &Cli, toml: Option<&TomlConfig>) -> Result<LineFilter, ConfigError> {
        // CLI lists replace TOML lists independently
        let includes = if cli.include.is_empty() {
            toml.map_or(&[][..], |t| t.trigger.include.as_slice())
        } else {
            cli.include.as_slice()
        };
        let excludes = if cli.exclude.is_empty() {
            toml.map_or(&[][..], |t| t.trigger.exclude.as_slice())
        } else {
            cli.exclude.as_slice()
        };

        let mut filter = LineFilter::new();
        for pattern in includes {
            filter = filter.include(pattern).map_err(|e| invalid_regex(pattern, e))?;
        }
        for pattern in excludes {
            filter = filter.exclude(pattern).map_err(|e| invalid_regex(pattern, e))?;
        }

        Ok(filter)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Expands a leading `~` to the current user's home directory.
///
/// Paths without a leading `~`, and every path when the home directory is
/// unknown, are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}

// Helper functions

fn parse_mode(s: &str) -> Result<Mode, ConfigError> {
    match s.to_lowercase().as_str() {
        "debounce" => Ok(Mode::Debounce),
        "coalesce" => Ok(Mode::Coalesce),
        _ => Err(ConfigError::InvalidMode {
            value: s.to_string(),
        }),
    }
}

fn invalid_regex(pattern: &str, source: regex::Error) -> ConfigError {
    ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    }
}
