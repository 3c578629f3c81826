//! Trigger line filtering.
//!
//! Same evaluation order as an include/exclude chain:
//! 1. **Exclude patterns (AND)**: any match rejects the line.
//! 2. **Include patterns (OR)**: any match accepts it. No includes = accept all.

use regex::Regex;

/// Decides which input lines count as triggers.
///
/// # Examples
///
/// ```
/// use settle::runner::LineFilter;
///
/// let filter = LineFilter::new()
///     .include(r"\.rs$").unwrap()
///     .exclude(r"^target/").unwrap();
///
/// assert!(filter.accepts("src/lib.rs"));
/// assert!(!filter.accepts("target/debug/build.rs"));
/// assert!(!filter.accepts("README.md"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl LineFilter {
    /// Creates a filter that accepts every line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regex.
    pub fn include(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.includes.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Adds an exclude pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regex.
    pub fn exclude(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.excludes.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Returns true if `line` should trigger a call.
    #[must_use]
    pub fn accepts(&self, line: &str) -> bool {
        if self.excludes.iter().any(|re| re.is_match(line)) {
            return false;
        }

        self.includes.is_empty() || self.includes.iter().any(|re| re.is_match(line))
    }

    /// Returns the total number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.includes.len() + self.excludes.len()
    }

    /// Returns true if no patterns are configured (accepts everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
