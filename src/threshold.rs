//! Severity selection from SQL execution time.

use std::fmt;
use std::time::Duration;

use tracing::Level;

/// Severity of a spy event, ordered from least to most serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warn => Level::WARN,
            Severity::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Warn and error thresholds for SQL execution time.
///
/// Each threshold is independently optional; `None` disables it. An error
/// threshold below the warn threshold is accepted as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Thresholds {
    pub warn: Option<Duration>,
    pub error: Option<Duration>,
}

impl Thresholds {
    /// Both thresholds disabled: every timed statement is `Info`.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_warn(mut self, threshold: Duration) -> Self {
        self.warn = Some(threshold);
        self
    }

    pub fn with_error(mut self, threshold: Duration) -> Self {
        self.error = Some(threshold);
        self
    }

    /// See [`evaluate`].
    pub fn evaluate(&self, exec_time_ms: i64) -> Severity {
        evaluate(exec_time_ms, self)
    }
}

/// Select the severity for a statement that took `exec_time_ms`.
///
/// The error threshold is checked first, then the warn threshold; both
/// boundaries are inclusive. A negative time (not measured) breaches nothing.
pub fn evaluate(exec_time_ms: i64, thresholds: &Thresholds) -> Severity {
    if breaches(exec_time_ms, thresholds.error) {
        Severity::Error
    } else if breaches(exec_time_ms, thresholds.warn) {
        Severity::Warn
    } else {
        Severity::Info
    }
}

fn breaches(exec_time_ms: i64, threshold: Option<Duration>) -> bool {
    match (threshold, u64::try_from(exec_time_ms)) {
        (Some(threshold), Ok(elapsed)) => Duration::from_millis(elapsed) >= threshold,
        _ => false,
    }
}
