//! Accumulating status for multi-step construction.

use std::fmt;

use super::Error;

/// Collects errors and warnings raised while building something.
///
/// Builders keep going after a bad entry so that every problem in a batch
/// gets reported at once. The build succeeded iff no error was recorded.
#[derive(Clone, Debug, Default)]
pub struct Status {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::debug!(error = %msg, "status error");
        self.errors.push(msg);
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::trace!(warning = %msg, "status warning");
        self.warnings.push(msg);
    }

    /// Record a construction error.
    pub fn record(&mut self, err: &Error) {
        self.add_error(err.to_string());
    }

    /// True while no error has been recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// All errors joined by newlines.
    pub fn error_text(&self) -> String {
        self.errors.join("\n")
    }

    /// All warnings joined by newlines.
    pub fn warning_text(&self) -> String {
        self.warnings.join("\n")
    }

    /// Fold another status into this one.
    pub fn merge(&mut self, other: Status) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            write!(f, "ok")?;
        } else {
            write!(f, "{} error(s)", self.errors.len())?;
        }
        if self.has_warnings() {
            write!(f, ", {} warning(s)", self.warnings.len())?;
        }
        Ok(())
    }
}
