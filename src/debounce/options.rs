//! Options for the windowed debouncer.

use std::time::Duration;

use crate::abort::AbortSignal;
use crate::error::OptionsError;

/// Configuration for a [`Debouncer`](super::Debouncer).
///
/// The window is kept as a floating-point millisecond count so that the
/// full input domain can be validated when the producer is wrapped:
///
/// | Window | Behavior |
/// |--------|----------|
/// | positive | Burst closes after this quiet period |
/// | zero or negative | Burst closes on the next timer tick (still asynchronous) |
/// | NaN or infinite | Rejected with [`OptionsError::InvalidArgument`] |
///
/// # Example
///
/// ```
/// use settle::abort::AbortController;
/// use settle::debounce::DebounceOptions;
///
/// let controller = AbortController::new();
/// let options = DebounceOptions::new(250.0)
///     .with_leading_edge(true)
///     .with_abort_signal(controller.signal());
///
/// assert!(options.leading_edge());
/// ```
#[derive(Debug, Clone)]
pub struct DebounceOptions {
    window_millis: f64,
    leading_edge: bool,
    abort_signal: Option<AbortSignal>,
}

impl DebounceOptions {
    /// Option name reported when the window is invalid.
    pub const WINDOW_FIELD: &'static str = "window_millis";

    /// Creates options with the given window and no leading edge or signal.
    #[must_use]
    pub const fn new(window_millis: f64) -> Self {
        Self {
            window_millis,
            leading_edge: false,
            abort_signal: None,
        }
    }

    /// Creates options from a window duration.
    #[must_use]
    pub fn from_duration(window: Duration) -> Self {
        Self::new(window.as_secs_f64() * 1000.0)
    }

    /// Sets whether the first call of a burst runs the producer immediately.
    #[must_use]
    pub const fn with_leading_edge(mut self, leading_edge: bool) -> Self {
        self.leading_edge = leading_edge;
        self
    }

    /// Attaches an abort signal observed by every call.
    #[must_use]
    pub fn with_abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort_signal = Some(signal);
        self
    }

    /// Returns the configured window in milliseconds, as given.
    #[must_use]
    pub const fn window_millis(&self) -> f64 {
        self.window_millis
    }

    /// Returns true if leading-edge execution is enabled.
    #[must_use]
    pub const fn leading_edge(&self) -> bool {
        self.leading_edge
    }

    /// Returns the attached abort signal, if any.
    #[must_use]
    pub const fn abort_signal(&self) -> Option<&AbortSignal> {
        self.abort_signal.as_ref()
    }

    /// Validates the window and converts it to a timer delay.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidArgument`] if the window is NaN,
    /// infinite, or too large to represent as a [`Duration`].
    pub fn window(&self) -> Result<Duration, OptionsError> {
        if !self.window_millis.is_finite() {
            return Err(OptionsError::InvalidArgument {
                name: Self::WINDOW_FIELD,
                reason: format!("expected a finite number, got {}", self.window_millis),
            });
        }

        if self.window_millis <= 0.0 {
            return Ok(Duration::ZERO);
        }

        Duration::try_from_secs_f64(self.window_millis / 1000.0).map_err(|e| {
            OptionsError::InvalidArgument {
                name: Self::WINDOW_FIELD,
                reason: e.to_string(),
            }
        })
    }
}
