//! Application execution logic.
//!
//! This module contains the main async loop that reads trigger lines from
//! stdin and feeds them to the configured debouncer or coalescer.

use std::future::Future;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::task::JoinSet;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};

use settle::abort::{AbortController, AbortReason, AbortSignal};
use settle::coalesce::Coalescer;
use settle::config::{Mode, ValidatedConfig};
use settle::debounce::Debouncer;
use settle::runner::{CommandOutcome, CommandRunner, LineFilter, RunnerError, Trigger};
use settle::{CallError, CallFuture, OptionsError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to read from standard input.
    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),

    /// The debouncer rejected its options.
    #[error("Failed to set up debouncer: {0}")]
    Options(#[from] OptionsError),
}

/// The wrapped command, in the configured mode.
enum Dispatcher {
    Debounce(Debouncer<CommandRunner, Trigger>),
    Coalesce(Coalescer<CommandRunner, Trigger>),
}

impl Dispatcher {
    /// Wraps the config's runner; debounced bursts listen to `signal`.
    fn from_config(config: &ValidatedConfig, signal: AbortSignal) -> Result<Self, RunError> {
        let runner = config.runner.clone();

        Ok(match config.mode {
            Mode::Debounce => Self::Debounce(Debouncer::new(
                runner,
                config.debounce_options().with_abort_signal(signal),
            )?),
            Mode::Coalesce => Self::Coalesce(Coalescer::new(runner, config.coalesce_options())),
        })
    }

    fn call(&self, trigger: Trigger) -> CallFuture<CommandOutcome, RunnerError> {
        match self {
            Self::Debounce(debouncer) => debouncer.call(trigger),
            Self::Coalesce(coalescer) => coalescer.call(trigger),
        }
    }
}

/// How one trigger's call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Succeeded,
    Failed,
    Cancelled,
}

/// Per-trigger tally of a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunSummary {
    triggers: u64,
    skipped: u64,
    succeeded: u64,
    failed: u64,
    cancelled: u64,
}

impl RunSummary {
    const fn record(&mut self, settled: Settled) {
        match settled {
            Settled::Succeeded => self.succeeded += 1,
            Settled::Failed => self.failed += 1,
            Settled::Cancelled => self.cancelled += 1,
        }
    }
}

/// Executes the main application loop.
///
/// This function:
/// 1. Wraps the command runner in a debouncer or coalescer
/// 2. Turns every accepted stdin line into one call
/// 3. Waits for outstanding calls once input ends or on Ctrl+C
///
/// # Errors
///
/// Returns an error if stdin cannot be read or the debouncer cannot be
/// built.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires a real
/// stdin and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let controller = AbortController::new();
    let dispatcher = Dispatcher::from_config(&config, controller.signal())?;

    if config.dry_run {
        tracing::info!("Dry-run mode enabled - commands will be logged but not run");
    }
    tracing::info!("Waiting for trigger lines on stdin ({} mode)", config.mode);

    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let summary = drive(
        lines,
        &config.filter,
        &dispatcher,
        &controller,
        shutdown_signal(),
    )
    .await?;

    tracing::info!(
        "Done: {} trigger(s), {} skipped, {} succeeded, {} failed, {} cancelled",
        summary.triggers,
        summary.skipped,
        summary.succeeded,
        summary.failed,
        summary.cancelled,
    );
    Ok(())
}

/// Feeds accepted lines to `dispatcher` until input ends or `shutdown`
/// completes, then waits for every outstanding call.
///
/// Shutdown aborts `controller` first, so open debounce bursts settle as
/// cancelled instead of running.
async fn drive<S, F>(
    mut lines: S,
    filter: &LineFilter,
    dispatcher: &Dispatcher,
    controller: &AbortController,
    shutdown: F,
) -> Result<RunSummary, RunError>
where
    S: Stream<Item = std::io::Result<String>> + Unpin,
    F: Future<Output = ()>,
{
    let mut summary = RunSummary::default();
    let mut pending = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, cancelling pending runs...");
                controller.abort_with(AbortReason::new("Interrupted"));
                break;
            }

            line = lines.next() => {
                let Some(line) = line else {
                    tracing::debug!("Input closed");
                    break;
                };
                let line = line.map_err(RunError::Input)?;

                if !filter.accepts(&line) {
                    summary.skipped += 1;
                    tracing::debug!("Skipped: {line}");
                    continue;
                }

                summary.triggers += 1;
                let count = summary.triggers;
                let call = dispatcher.call(Trigger::new(line, count));
                pending.spawn(report(count, call));
            }
        }
    }

    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok(settled) => summary.record(settled),
            Err(e) => tracing::error!("Report task failed: {e}"),
        }
    }

    Ok(summary)
}

/// Waits for one trigger's call and logs how it ended.
async fn report(count: u64, call: CallFuture<CommandOutcome, RunnerError>) -> Settled {
    match call.await {
        Ok(outcome) => {
            tracing::debug!(count, line = %outcome.line, "Settled: {}", outcome.command);
            Settled::Succeeded
        }
        Err(CallError::Cancelled(reason)) => {
            tracing::debug!(count, "Cancelled: {reason}");
            Settled::Cancelled
        }
        Err(e) => {
            tracing::debug!(count, "Failed: {e}");
            Settled::Failed
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
