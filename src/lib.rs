//! # sqlspy-tracing
//!
//! Routes events raised by a JDBC-style call-interception ("spy") layer to
//! `tracing`, deciding for each one whether it is logged, at which level and
//! under which category label.
//!
//! The spy layer wraps connections, statements and result sets, times every
//! call and reports to a [`SpyLogDelegator`]. This crate provides that
//! delegate; it never touches a database itself.
//!
//! ## Features
//!
//! - **Category labels**: every event is tagged with a [`CategoryLabel`]
//!   (`SQL` with one child per statement kind, `JDBC` with `AUDIT` and
//!   `RESULTSET`, `CONNECTION`, `EXCEPTION`), each mapped to its own
//!   `tracing` target
//! - **Statement filtering**: per-operation dump flags drop selects, inserts,
//!   updates, deletes or creates before any payload is built
//! - **Timing thresholds**: slow statements are raised to WARN or ERROR
//! - **Exceptions always logged**: at ERROR, regardless of filters
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlspy_tracing::{SpyId, SpyLogConfig, SpyLogDelegator, SpyLogRouter};
//! use std::time::Duration;
//!
//! let router = SpyLogRouter::with_tracing(
//!     SpyLogConfig::default()
//!         .with_warn_threshold(Duration::from_millis(200))
//!         .with_error_threshold(Duration::from_secs(1)),
//! );
//!
//! let spy = SpyId::statement(1);
//! router.connection_opened(&SpyId::connection(1), 4);
//! router.sql_timing_occurred(&spy, 350, "executeQuery(select * from users)", "select * from users");
//! ```
//!
//! ## Targets
//!
//! | Label | Target |
//! |-------|--------|
//! | `SQL` | `sqlspy::sql` |
//! | `SELECT` ... `CREATE` | `sqlspy::sql::select` ... `sqlspy::sql::create` |
//! | `JDBC` | `sqlspy::jdbc` |
//! | `AUDIT` / `RESULTSET` | `sqlspy::jdbc::audit` / `sqlspy::jdbc::resultset` |
//! | `CONNECTION` | `sqlspy::connection` |
//! | `EXCEPTION` | `sqlspy::exception` |
//!
//! Internal diagnostics go to the separate `spy_debug` target at DEBUG.
//!
//! ## Configuration
//!
//! [`SpyLogConfig`] can be built in code, parsed from a properties file
//! (`sqlspy.dump.sql.select=false`, `sqlspy.sqltiming.warn.threshold=200`)
//! or read from `SQLSPY_*` environment variables. Wrap it in a
//! [`SharedSpyConfig`] to change it while routers are running.

mod backend;
mod config;
mod delegator;
mod error;
mod filter;
mod label;
mod message;
mod parser;
mod spy;
mod threshold;

#[cfg(test)]
mod testing;

pub use backend::{LogBackend, TracingBackend};
pub use config::{keys, SharedSpyConfig, SpyConfig, SpyLogConfig};
pub use delegator::{global, install_global, SpyLogDelegator, SpyLogRouter};
pub use error::{ConfigError, ConfigResult, GlobalAlreadyInstalled};
pub use filter::{should_log, SqlDumpFilter};
pub use label::{CategoryLabel, DEBUG_TARGET, SPY_TARGET};
pub use message::SpyMessage;
pub use parser::{parse_operation, SqlOperation};
pub use spy::{
    ConnectionEvent, Spy, SpyEvent, SpyId, CALLABLE_STATEMENT_CLASS_TYPE, CONNECTION_CLASS_TYPE,
    NOT_MEASURED, PREPARED_STATEMENT_CLASS_TYPE, RESULT_SET_CLASS_TYPE, STATEMENT_CLASS_TYPE,
};
pub use threshold::{evaluate, Severity, Thresholds};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CategoryLabel, Spy, SpyConfig, SpyLogConfig, SpyLogDelegator, SpyLogRouter, TracingBackend,
    };
}
