//! Error types for the command runner.

use std::sync::Arc;

use thiserror::Error;

/// Error type for running the triggered command.
///
/// Cloneable so that one failed execution can be reported to every caller
/// that shared it.
#[derive(Debug, Clone, Error)]
pub enum RunnerError {
    /// The command template could not be compiled or rendered.
    #[error("Command template error: {reason}")]
    Template {
        /// Reason reported by the template engine
        reason: String,
    },

    /// The shell could not be started.
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        /// Rendered command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The command ran but exited unsuccessfully.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    #[error("Command '{command}' exited with {}", code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    Failed {
        /// Rendered command line
        command: String,
        /// Exit code, if any
        code: Option<i32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn template_error_displays_reason() {
        let error = RunnerError::Template {
            reason: "unclosed tag".to_string(),
        };
        assert_eq!(error.to_string(), "Command template error: unclosed tag");
    }

    #[test]
    fn spawn_error_preserves_source() {
        let error = RunnerError::Spawn {
            command: "make".to_string(),
            source: Arc::new(std::io::Error::new(std::io::ErrorKind::NotFound, "no shell")),
        };

        assert!(error.to_string().contains("Failed to spawn 'make'"));
        assert!(error.source().unwrap().to_string().contains("no shell"));
    }

    #[test]
    fn failed_error_displays_exit_code() {
        let error = RunnerError::Failed {
            command: "false".to_string(),
            code: Some(1),
        };
        assert_eq!(error.to_string(), "Command 'false' exited with status 1");
    }

    #[test]
    fn failed_error_without_code_mentions_signal() {
        let error = RunnerError::Failed {
            command: "sleep 100".to_string(),
            code: None,
        };
        assert!(error.to_string().ends_with("exited with a signal"));
    }

    #[test]
    fn clones_share_io_source() {
        let error = RunnerError::Spawn {
            command: "x".to_string(),
            source: Arc::new(std::io::Error::other("boom")),
        };
        let clone = error.clone();

        match (error, clone) {
            (RunnerError::Spawn { source: a, .. }, RunnerError::Spawn { source: b, .. }) => {
                assert!(Arc::ptr_eq(&a, &b));
            }
            _ => unreachable!(),
        }
    }
}
