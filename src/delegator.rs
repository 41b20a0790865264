//! Routing of spy events to a logging backend.

use std::error::Error;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::backend::{LogBackend, TracingBackend};
use crate::config::{SpyConfig, SpyLogConfig};
use crate::error::GlobalAlreadyInstalled;
use crate::label::{CategoryLabel, DEBUG_TARGET};
use crate::message::SpyMessage;
use crate::parser::parse_operation;
use crate::spy::{ConnectionEvent, Spy, SpyEvent};
use crate::threshold::Severity;

/// Receiver of the events raised by spy wrappers.
///
/// Execution times are milliseconds, `-1` when the caller did not measure.
pub trait SpyLogDelegator: Send + Sync {
    /// Whether spy logging is on at all; when `false` the spy layer can skip
    /// wrapping connections.
    fn is_jdbc_logging_enabled(&self) -> bool;

    fn exception_occurred(
        &self,
        spy: &dyn Spy,
        method_call: &str,
        error: &dyn Error,
        sql: Option<&str>,
        exec_time: i64,
    );

    fn method_returned(&self, spy: &dyn Spy, method_call: &str, return_msg: &str);

    fn constructor_returned(&self, spy: &dyn Spy, construction_info: &str);

    /// Statement about to run, before its execution time is known.
    fn sql_occurred(&self, spy: &dyn Spy, method_call: &str, sql: &str);

    fn sql_timing_occurred(&self, spy: &dyn Spy, exec_time: i64, method_call: &str, sql: &str);

    fn connection_opened(&self, spy: &dyn Spy, exec_time: i64);

    fn connection_closed(&self, spy: &dyn Spy, exec_time: i64);

    /// Diagnostics about the spy machinery itself.
    fn debug(&self, message: &str);

    /// Route an event to the matching method.
    fn dispatch(&self, event: SpyEvent<'_>) {
        match event {
            SpyEvent::ConnectionOpened { spy, exec_time } => self.connection_opened(spy, exec_time),
            SpyEvent::ConnectionClosed { spy, exec_time } => self.connection_closed(spy, exec_time),
            SpyEvent::MethodReturned {
                spy,
                method_call,
                return_msg,
            } => self.method_returned(spy, method_call, return_msg),
            SpyEvent::SqlTiming {
                spy,
                exec_time,
                method_call,
                sql,
            } => self.sql_timing_occurred(spy, exec_time, method_call, sql),
            SpyEvent::Exception {
                spy,
                method_call,
                error,
                sql,
                exec_time,
            } => self.exception_occurred(spy, method_call, error, sql, exec_time),
            SpyEvent::ConstructorReturned {
                spy,
                construction_info,
            } => self.constructor_returned(spy, construction_info),
            SpyEvent::SqlOccurred {
                spy,
                method_call,
                sql,
            } => self.sql_occurred(spy, method_call, sql),
        }
    }
}

/// The [`SpyLogDelegator`] that labels events and picks their severity.
///
/// Stateless apart from its backend and configuration; the configuration is
/// consulted on every event.
///
/// # Example
///
/// ```rust
/// use sqlspy_tracing::{SpyId, SpyLogConfig, SpyLogDelegator, SpyLogRouter};
/// use std::time::Duration;
///
/// let router = SpyLogRouter::with_tracing(
///     SpyLogConfig::default().with_warn_threshold(Duration::from_millis(200)),
/// );
/// let spy = SpyId::statement(1);
/// router.sql_timing_occurred(&spy, 350, "executeQuery(select 1)", "select 1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpyLogRouter<B = TracingBackend, C = SpyLogConfig> {
    backend: B,
    config: C,
}

impl<C: SpyConfig> SpyLogRouter<TracingBackend, C> {
    /// Route to `tracing` with the given configuration.
    pub fn with_tracing(config: C) -> Self {
        Self::new(TracingBackend, config)
    }
}

impl<B: LogBackend, C: SpyConfig> SpyLogRouter<B, C> {
    pub fn new(backend: B, config: C) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn debug_enabled(&self, label: CategoryLabel) -> bool {
        self.backend.is_enabled(Severity::Debug, Some(label))
    }

    fn connection_opened_or_closed(&self, spy: &dyn Spy, exec_time: i64, event: ConnectionEvent) {
        let label = CategoryLabel::Connection;
        let message = SpyMessage::Connection {
            spy,
            event,
            exec_time,
            debug_enabled: self.debug_enabled(label),
        };
        self.backend.log(Severity::Info, label, &message);
    }
}

impl<B: LogBackend, C: SpyConfig> SpyLogDelegator for SpyLogRouter<B, C> {
    /// ERROR enabled for the root target or for any single label.
    fn is_jdbc_logging_enabled(&self) -> bool {
        self.backend.is_enabled(Severity::Error, None)
            || CategoryLabel::ALL
                .iter()
                .any(|label| self.backend.is_enabled(Severity::Error, Some(*label)))
    }

    /// Always logged at ERROR under [`CategoryLabel::Exception`], whatever the
    /// spy kind: failures on connections and result sets share that label.
    fn exception_occurred(
        &self,
        spy: &dyn Spy,
        method_call: &str,
        error: &dyn Error,
        sql: Option<&str>,
        exec_time: i64,
    ) {
        let label = CategoryLabel::Exception;
        let message = SpyMessage::Exception {
            spy,
            method_call,
            error,
            sql,
            exec_time,
            debug_enabled: self.debug_enabled(label),
        };
        self.backend.log(Severity::Error, label, &message);
    }

    fn method_returned(&self, spy: &dyn Spy, method_call: &str, return_msg: &str) {
        let label = if spy.is_result_set() {
            CategoryLabel::ResultSet
        } else {
            CategoryLabel::Audit
        };
        let message = SpyMessage::MethodReturned {
            spy,
            method_call,
            return_msg,
            debug_enabled: self.debug_enabled(label),
        };
        self.backend.log(Severity::Info, label, &message);
    }

    fn constructor_returned(&self, _spy: &dyn Spy, _construction_info: &str) {}

    // Statements are only logged once their execution time is known.
    fn sql_occurred(&self, _spy: &dyn Spy, _method_call: &str, _sql: &str) {}

    fn sql_timing_occurred(&self, spy: &dyn Spy, exec_time: i64, method_call: &str, sql: &str) {
        let operation = parse_operation(sql);
        if !self.config.dump_sql_filter().allows(operation) {
            return;
        }

        let label = operation.label();
        let severity = self.config.thresholds().evaluate(exec_time);
        if severity == Severity::Info && !self.backend.is_enabled(Severity::Info, Some(label)) {
            return;
        }

        let message = SpyMessage::SqlTiming {
            spy,
            exec_time,
            method_call,
            sql,
            debug_enabled: self.debug_enabled(label),
        };
        self.backend.log(severity, label, &message);
    }

    fn connection_opened(&self, spy: &dyn Spy, exec_time: i64) {
        self.connection_opened_or_closed(spy, exec_time, ConnectionEvent::Opening);
    }

    fn connection_closed(&self, spy: &dyn Spy, exec_time: i64) {
        self.connection_opened_or_closed(spy, exec_time, ConnectionEvent::Closing);
    }

    fn debug(&self, message: &str) {
        self.backend.debug(message);
    }
}

static GLOBAL: OnceCell<Box<dyn SpyLogDelegator>> = OnceCell::new();

/// Install the process-wide delegator returned by [`global`].
///
/// Fails once a delegator is in place, including the default one created by
/// an earlier call to [`global`].
pub fn install_global<D>(delegator: D) -> Result<(), GlobalAlreadyInstalled>
where
    D: SpyLogDelegator + 'static,
{
    GLOBAL
        .set(Box::new(delegator))
        .map_err(|_| GlobalAlreadyInstalled)
}

/// The process-wide delegator.
///
/// Without [`install_global`], a [`SpyLogRouter`] over `tracing` configured
/// from `SQLSPY_*` environment variables is created on first use.
pub fn global() -> &'static dyn SpyLogDelegator {
    GLOBAL
        .get_or_init(|| {
            let config = SpyLogConfig::from_env().unwrap_or_else(|err| {
                debug!(target: DEBUG_TARGET, error = %err, "Invalid sqlspy environment, using defaults");
                SpyLogConfig::default()
            });
            Box::new(SpyLogRouter::with_tracing(config)) as Box<dyn SpyLogDelegator>
        })
        .as_ref()
}
