//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Trigger line filter section
    #[serde(default)]
    pub trigger: TriggerSection,

    /// Debounce/coalesce behavior section
    #[serde(default)]
    pub debounce: DebounceSection,

    /// Command section
    #[serde(default)]
    pub command: CommandSection,
}

/// Trigger line filter section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerSection {
    /// Regex patterns for lines that trigger a run
    #[serde(default)]
    pub include: Vec<String>,

    /// Regex patterns for lines that never trigger a run
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Debounce/coalesce behavior section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebounceSection {
    /// "debounce" or "coalesce"
    pub mode: Option<String>,

    /// Quiet-period window in milliseconds
    pub window_ms: Option<f64>,

    /// Run on the leading edge of a burst
    #[serde(default)]
    pub leading: bool,

    /// Queue one follow-up run while busy
    #[serde(default)]
    pub after: bool,
}

/// Command section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSection {
    /// Handlebars command template
    pub template: Option<String>,

    /// Shell used to run the command
    pub shell: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# settle configuration file

[trigger]
# Regex patterns for lines that trigger a run (empty = every line)
# Note: CLI patterns REPLACE these entirely (not merged)
# include = ['\.rs$']

# Regex patterns for lines that never trigger a run
# Note: CLI patterns REPLACE these entirely (not merged)
# exclude = ['^target/']

[debounce]
# "debounce": run once per burst of triggers
# "coalesce": share one run among triggers that arrive while it is running
mode = "debounce"

# Quiet-period window in milliseconds (default: 500, debounce mode)
window_ms = 500

# Run on the first trigger of a burst instead of the last (debounce mode)
# leading = false

# Run once more after a busy run for triggers that arrived meanwhile (coalesce mode)
# after = false

[command]
# Handlebars command template (required)
# Available variables: {{line}}, {{count}}
# {{line}} expands to "$1"; the line itself is passed as that argument
# template = "cargo test"

# Shell used to run the command (default: sh)
# shell = "sh"
"#
    .to_string()
}
