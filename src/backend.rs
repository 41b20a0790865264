//! Logging backends spy events are forwarded to.

use std::sync::Arc;

use tracing::{field, Level};

use crate::label::{CategoryLabel, DEBUG_TARGET, SPY_TARGET};
use crate::message::SpyMessage;
use crate::threshold::Severity;

/// Sink for routed spy events.
///
/// Implementations provide their own thread safety and buffering; the router
/// calls them synchronously and at most once per event.
pub trait LogBackend: Send + Sync {
    /// Whether an event at `severity` would be emitted for `label`.
    ///
    /// `None` asks about the primary channel as a whole. Callers use this to
    /// skip building payloads nobody will see.
    fn is_enabled(&self, severity: Severity, label: Option<CategoryLabel>) -> bool;

    /// Emit one event on the primary channel.
    fn log(&self, severity: Severity, label: CategoryLabel, message: &SpyMessage<'_>);

    /// Emit a DEBUG line on the secondary diagnostics channel.
    fn debug(&self, message: &str);
}

impl<T: LogBackend + ?Sized> LogBackend for Arc<T> {
    fn is_enabled(&self, severity: Severity, label: Option<CategoryLabel>) -> bool {
        (**self).is_enabled(severity, label)
    }

    fn log(&self, severity: Severity, label: CategoryLabel, message: &SpyMessage<'_>) {
        (**self).log(severity, label, message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }
}

/// Invoke a tracing macro at a runtime-determined severity.
///
/// `tracing` needs the level and target of a callsite to be constants, so
/// every combination gets its own arm. The macro arguments continue after
/// the level, starting with a comma when there are any.
macro_rules! at_severity {
    ($severity:expr, $target:expr, $mac:ident!($($rest:tt)*)) => {
        match $severity {
            Severity::Error => tracing::$mac!(target: $target, Level::ERROR $($rest)*),
            Severity::Warn => tracing::$mac!(target: $target, Level::WARN $($rest)*),
            Severity::Info => tracing::$mac!(target: $target, Level::INFO $($rest)*),
            Severity::Debug => tracing::$mac!(target: $target, Level::DEBUG $($rest)*),
        }
    };
}

/// [`at_severity!`] under the constant target of a runtime label.
macro_rules! at_label {
    ($label:expr, $severity:expr, $mac:ident!($($rest:tt)*)) => {
        match $label {
            CategoryLabel::Sql => {
                at_severity!($severity, CategoryLabel::Sql.target(), $mac!($($rest)*))
            }
            CategoryLabel::Select => {
                at_severity!($severity, CategoryLabel::Select.target(), $mac!($($rest)*))
            }
            CategoryLabel::Insert => {
                at_severity!($severity, CategoryLabel::Insert.target(), $mac!($($rest)*))
            }
            CategoryLabel::Update => {
                at_severity!($severity, CategoryLabel::Update.target(), $mac!($($rest)*))
            }
            CategoryLabel::Delete => {
                at_severity!($severity, CategoryLabel::Delete.target(), $mac!($($rest)*))
            }
            CategoryLabel::Create => {
                at_severity!($severity, CategoryLabel::Create.target(), $mac!($($rest)*))
            }
            CategoryLabel::Jdbc => {
                at_severity!($severity, CategoryLabel::Jdbc.target(), $mac!($($rest)*))
            }
            CategoryLabel::Audit => {
                at_severity!($severity, CategoryLabel::Audit.target(), $mac!($($rest)*))
            }
            CategoryLabel::ResultSet => {
                at_severity!($severity, CategoryLabel::ResultSet.target(), $mac!($($rest)*))
            }
            CategoryLabel::Connection => {
                at_severity!($severity, CategoryLabel::Connection.target(), $mac!($($rest)*))
            }
            CategoryLabel::Exception => {
                at_severity!($severity, CategoryLabel::Exception.target(), $mac!($($rest)*))
            }
        }
    };
}

/// A [`LogBackend`] emitting `tracing` events.
///
/// Each label maps to its own target (see [`CategoryLabel::target`]), so
/// subscriber directives such as `sqlspy=info,sqlspy::sql::select=warn`
/// filter by label with parent fallback. Events carry these fields:
///
/// | Field | Description |
/// |-------|-------------|
/// | `marker` | Label name, e.g. `SQLSPY_SELECT` |
/// | `connection` | Connection number of the spy |
/// | `spy` | Class type of the spy |
/// | `method` | Intercepted method call (when known) |
/// | `sql` | Statement text (when known) |
/// | `exec_time_ms` | Execution time, `-1` when not measured |
/// | `error` | Upstream error (exception events only) |
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend;

impl TracingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl LogBackend for TracingBackend {
    fn is_enabled(&self, severity: Severity, label: Option<CategoryLabel>) -> bool {
        match label {
            Some(label) => at_label!(label, severity, enabled!()),
            None => at_severity!(severity, SPY_TARGET, enabled!()),
        }
    }

    fn log(&self, severity: Severity, label: CategoryLabel, message: &SpyMessage<'_>) {
        let spy = message.spy();
        at_label!(
            label,
            severity,
            event!(
                ,
                marker = label.name(),
                connection = spy.connection_number(),
                spy = spy.class_type(),
                method = message.method_call(),
                sql = message.sql(),
                exec_time_ms = message.exec_time(),
                error = message.error().map(field::display),
                "{}",
                message
            )
        );
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: DEBUG_TARGET, "{}", message);
    }
}
