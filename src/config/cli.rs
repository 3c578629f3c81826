//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::defaults;
use super::validated::Mode;

/// settle: run a command once its input settles
///
/// Reads trigger lines from stdin and runs a templated shell command once
/// per burst of lines (debounce mode) or once per overlapping run
/// (coalesce mode).
#[derive(Debug, Parser)]
#[command(name = "settle")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Handlebars command template; variables: {{line}}, {{count}}
    #[arg(long = "command", short = 'x', value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Shell used to run the command (as `<shell> -c <command>`)
    #[arg(long)]
    pub shell: Option<String>,

    /// How triggers are collapsed
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Quiet-period window in milliseconds (debounce mode)
    #[arg(long = "window", short = 'w', value_name = "MS")]
    pub window_ms: Option<f64>,

    /// Run on the first trigger of a burst instead of the last (debounce mode)
    #[arg(long)]
    pub leading: bool,

    /// Run once more after a busy run, for triggers that arrived meanwhile (coalesce mode)
    #[arg(long)]
    pub after: bool,

    /// Regex for lines that trigger a run (can be specified multiple times)
    #[arg(long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Regex for lines that never trigger a run (can be specified multiple times)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Test mode - log rendered commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for settle
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

/// Mode argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Run once per burst of triggers
    #[value(name = "debounce")]
    Debounce,
    /// Share one run among overlapping triggers
    #[value(name = "coalesce")]
    Coalesce,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Debounce => Self::Debounce,
            ModeArg::Coalesce => Self::Coalesce,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
