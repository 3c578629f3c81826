//! Shell command producer.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;
use tokio::process::Command;

use crate::producer::{Invocation, Producer};

use super::RunnerError;

/// Name the command template is registered under.
const TEMPLATE_NAME: &str = "command";

/// Default shell used to run rendered commands.
const DEFAULT_SHELL: &str = "sh";

/// What `{{line}}` renders to: the first positional parameter, quoted.
const LINE_PARAMETER: &str = "\"$1\"";

/// `$0` of the shell script.
const SCRIPT_NAME: &str = "settle";

/// One accepted input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// The line as read, without its terminator
    pub line: String,
    /// 1-based number of the trigger among all accepted lines
    pub count: u64,
}

impl Trigger {
    /// Creates a trigger.
    #[must_use]
    pub fn new(line: impl Into<String>, count: u64) -> Self {
        Self {
            line: line.into(),
            count,
        }
    }
}

/// Outcome of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// The rendered command line
    pub command: String,
    /// The triggering line, as passed to the command in `$1`
    pub line: String,
    /// Exit code (`None` for dry runs)
    pub code: Option<i32>,
    /// Whether the command was only rendered
    pub dry_run: bool,
}

/// Template data for rendering the command line.
#[derive(Serialize)]
struct TemplateData {
    line: &'static str,
    count: u64,
}

impl From<&Trigger> for TemplateData {
    fn from(trigger: &Trigger) -> Self {
        Self {
            line: LINE_PARAMETER,
            count: trigger.count,
        }
    }
}

/// Runs a templated shell command per trigger.
///
/// The template uses Handlebars syntax with two variables:
/// - `{{line}}`: the triggering input line
/// - `{{count}}`: the trigger's running number
///
/// The line never becomes part of the command text. `{{line}}` renders to
/// `"$1"` and the line itself is handed to the shell as its first
/// positional parameter (`<shell> -c <command> settle <line>`), so
/// characters such as `;`, `$( )` or backticks in the input stay data.
/// Leave `{{line}}` unquoted in the template; it already expands to a
/// double-quoted parameter.
///
/// Rendering is strict: referencing any other variable fails. Output is not
/// HTML-escaped. The child process gets a null stdin and inherits stdout
/// and stderr.
///
/// # Example
///
/// ```
/// use settle::runner::{CommandRunner, Trigger};
///
/// let runner = CommandRunner::new("echo changed: {{line}}").unwrap();
/// let command = runner.render(&Trigger::new("src/lib.rs; rm -rf ~", 1)).unwrap();
///
/// assert_eq!(command, r#"echo changed: "$1""#);
/// ```
#[derive(Debug, Clone)]
pub struct CommandRunner {
    registry: Arc<Handlebars<'static>>,
    shell: String,
    dry_run: bool,
}

impl CommandRunner {
    /// Compiles `template` into a runner using the default shell.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if the template has a syntax error.
    pub fn new(template: &str) -> Result<Self, RunnerError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| RunnerError::Template {
                reason: e.to_string(),
            })?;

        Ok(Self {
            registry: Arc::new(registry),
            shell: DEFAULT_SHELL.to_string(),
            dry_run: false,
        })
    }

    /// Sets the shell the command is passed to.
    ///
    /// The shell must accept `-c <command> <name> <args>...` the way POSIX
    /// `sh` does.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Enables dry-run mode: commands are rendered and logged, never run.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the configured shell.
    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Returns true in dry-run mode.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Renders the command line for `trigger`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if rendering fails.
    pub fn render(&self, trigger: &Trigger) -> Result<String, RunnerError> {
        self.registry
            .render(TEMPLATE_NAME, &TemplateData::from(trigger))
            .map_err(|e| RunnerError::Template {
                reason: e.to_string(),
            })
    }

    /// Renders and runs the command for `trigger`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if rendering fails,
    /// [`RunnerError::Spawn`] if the shell cannot be started, and
    /// [`RunnerError::Failed`] if the command exits unsuccessfully.
    pub async fn run(&self, trigger: &Trigger) -> Result<CommandOutcome, RunnerError> {
        let command = self.render(trigger)?;

        if self.dry_run {
            tracing::info!(count = trigger.count, line = %trigger.line, "Dry run: {command}");
            return Ok(CommandOutcome {
                command,
                line: trigger.line.clone(),
                code: None,
                dry_run: true,
            });
        }

        tracing::info!(count = trigger.count, line = %trigger.line, "Running: {command}");
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(&command)
            .arg(SCRIPT_NAME)
            .arg(&trigger.line)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                tracing::warn!(count = trigger.count, "Failed to spawn {}: {e}", self.shell);
                RunnerError::Spawn {
                    command: command.clone(),
                    source: Arc::new(e),
                }
            })?;

        if !status.success() {
            tracing::warn!(count = trigger.count, "Command failed: {status}");
            return Err(RunnerError::Failed {
                command,
                code: status.code(),
            });
        }

        tracing::debug!(count = trigger.count, "Command finished");
        Ok(CommandOutcome {
            command,
            line: trigger.line.clone(),
            code: status.code(),
            dry_run: false,
        })
    }
}

impl Producer<Trigger> for CommandRunner {
    type Output = CommandOutcome;
    type Error = RunnerError;
    type Future = Pin<Box<dyn Future<Output = Result<CommandOutcome, RunnerError>> + Send>>;

    fn produce(&self, call: Invocation<Trigger>) -> Self::Future {
        let runner = self.clone();
        Box::pin(async move { runner.run(&call.args).await })
    }
}
