//! Configuration for spy event routing.
//!
//! The router never caches configuration: it asks its [`SpyConfig`] on every
//! event, so a [`SharedSpyConfig`] swapped at runtime takes effect on the
//! next statement.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::filter::SqlDumpFilter;
use crate::label::DEBUG_TARGET;
use crate::parser::SqlOperation;
use crate::threshold::Thresholds;

/// Property keys understood by [`SpyLogConfig::from_properties`].
///
/// The matching environment variable is the key upper-cased with dots
/// replaced by underscores (`SQLSPY_DUMP_SQL_SELECT`).
pub mod keys {
    pub const DUMP_SQL_PREFIX: &str = "sqlspy.dump.sql.";
    pub const DUMP_SQL_SELECT: &str = "sqlspy.dump.sql.select";
    pub const DUMP_SQL_INSERT: &str = "sqlspy.dump.sql.insert";
    pub const DUMP_SQL_UPDATE: &str = "sqlspy.dump.sql.update";
    pub const DUMP_SQL_DELETE: &str = "sqlspy.dump.sql.delete";
    pub const DUMP_SQL_CREATE: &str = "sqlspy.dump.sql.create";
    pub const DUMP_SQL_FILTERING: &str = "sqlspy.dump.sql.filtering";
    pub const SQLTIMING_WARN_THRESHOLD: &str = "sqlspy.sqltiming.warn.threshold";
    pub const SQLTIMING_ERROR_THRESHOLD: &str = "sqlspy.sqltiming.error.threshold";

    pub const ALL: [&str; 8] = [
        DUMP_SQL_SELECT,
        DUMP_SQL_INSERT,
        DUMP_SQL_UPDATE,
        DUMP_SQL_DELETE,
        DUMP_SQL_CREATE,
        DUMP_SQL_FILTERING,
        SQLTIMING_WARN_THRESHOLD,
        SQLTIMING_ERROR_THRESHOLD,
    ];

    /// Environment variable overriding `key`.
    pub fn env_var(key: &str) -> String {
        key.to_ascii_uppercase().replace('.', "_")
    }
}

/// Source of filtering and threshold settings, read on every event.
pub trait SpyConfig: Send + Sync {
    /// Current dump filter.
    fn dump_sql_filter(&self) -> SqlDumpFilter;

    /// Current SQL timing thresholds.
    fn thresholds(&self) -> Thresholds;

    fn is_dump_sql_filtering_on(&self) -> bool {
        self.dump_sql_filter().enabled
    }

    fn is_dump_sql(&self, operation: SqlOperation) -> bool {
        self.dump_sql_filter().flag(operation)
    }

    fn sql_timing_warn_threshold(&self) -> Option<Duration> {
        self.thresholds().warn
    }

    fn sql_timing_error_threshold(&self) -> Option<Duration> {
        self.thresholds().error
    }
}

impl<T: SpyConfig + ?Sized> SpyConfig for &T {
    fn dump_sql_filter(&self) -> SqlDumpFilter {
        (**self).dump_sql_filter()
    }

    fn thresholds(&self) -> Thresholds {
        (**self).thresholds()
    }
}

impl<T: SpyConfig + ?Sized> SpyConfig for Arc<T> {
    fn dump_sql_filter(&self) -> SqlDumpFilter {
        (**self).dump_sql_filter()
    }

    fn thresholds(&self) -> Thresholds {
        (**self).thresholds()
    }
}

/// Configuration options for spy event routing.
///
/// # Example
///
/// ```rust
/// use sqlspy_tracing::{SqlOperation, SpyLogConfig};
/// use std::time::Duration;
///
/// let config = SpyLogConfig::default()
///     .with_dump_sql(SqlOperation::Select, false)
///     .with_warn_threshold(Duration::from_millis(200))
///     .with_error_threshold(Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpyLogConfig {
    /// Which statement kinds are logged.
    /// Default: filtering off, every kind logged
    pub dump_sql: SqlDumpFilter,

    /// Execution time thresholds for WARN and ERROR.
    /// Default: both disabled, every statement logged at INFO
    pub thresholds: Thresholds,
}

impl SpyLogConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn dumping of one statement kind on or off.
    ///
    /// Turning a kind off also switches filtering on; turning one on leaves
    /// the master switch alone.
    pub fn with_dump_sql(mut self, operation: SqlOperation, dump: bool) -> Self {
        self.dump_sql.set_flag(operation, dump);
        if !dump && operation != SqlOperation::Unknown {
            self.dump_sql.enabled = true;
        }
        self
    }

    /// Force the master filtering switch.
    pub fn with_dump_sql_filtering(mut self, enabled: bool) -> Self {
        self.dump_sql.enabled = enabled;
        self
    }

    /// Statements taking at least this long are logged at WARN.
    pub fn with_warn_threshold(mut self, threshold: Duration) -> Self {
        self.thresholds.warn = Some(threshold);
        self
    }

    /// Statements taking at least this long are logged at ERROR.
    pub fn with_error_threshold(mut self, threshold: Duration) -> Self {
        self.thresholds.error = Some(threshold);
        self
    }

    /// Disable both timing thresholds.
    pub fn without_thresholds(mut self) -> Self {
        self.thresholds = Thresholds::disabled();
        self
    }

    /// Create a development-friendly configuration: every statement logged,
    /// tight thresholds.
    pub fn development() -> Self {
        Self {
            dump_sql: SqlDumpFilter::default(),
            thresholds: Thresholds::disabled()
                .with_warn(Duration::from_millis(100))
                .with_error(Duration::from_secs(1)),
        }
    }

    /// Create a production configuration: selects are not dumped, only
    /// slow statements are raised above INFO.
    pub fn production() -> Self {
        Self {
            dump_sql: SqlDumpFilter {
                select: false,
                ..SqlDumpFilter::enabled()
            },
            thresholds: Thresholds::disabled()
                .with_warn(Duration::from_secs(1))
                .with_error(Duration::from_secs(5)),
        }
    }

    /// Parse `key=value` properties text on top of the defaults.
    ///
    /// Lines starting with `#` or `;` are comments and `:` is accepted as the
    /// separator too. Keys under a `[section]` header are read as
    /// `section.key`. Keys outside the `sqlspy.` namespace are ignored.
    pub fn from_properties(text: &str) -> ConfigResult<Self> {
        Self::from_ini(&Ini::load_from_str(text)?)
    }

    /// Read a properties file, see [`SpyLogConfig::from_properties`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_ini(&Ini::load_from_file(path)?)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let entries: Vec<(String, &str)> = ini
            .iter()
            .flat_map(|(section, properties)| {
                properties.iter().map(move |(key, value)| match section {
                    Some(section) => (format!("{section}.{key}"), value),
                    None => (key.to_string(), value),
                })
            })
            .collect();

        let mut config = Self::default();
        config.apply_properties(entries.iter().map(|(key, value)| (key.as_str(), *value)))?;
        Ok(config)
    }

    /// Defaults with `SQLSPY_*` environment overrides applied.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `SQLSPY_*` environment variable overrides.
    ///
    /// Supported env vars:
    /// - `SQLSPY_DUMP_SQL_SELECT` (and `_INSERT`, `_UPDATE`, `_DELETE`, `_CREATE`)
    /// - `SQLSPY_DUMP_SQL_FILTERING`
    /// - `SQLSPY_SQLTIMING_WARN_THRESHOLD` - milliseconds
    /// - `SQLSPY_SQLTIMING_ERROR_THRESHOLD` - milliseconds
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any environment-like lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let found: Vec<(&str, String)> = keys::ALL
            .iter()
            .filter_map(|key| {
                let name = keys::env_var(key);
                lookup(&name).map(|value| {
                    debug!(target: DEBUG_TARGET, "Overriding {} from {}", key, name);
                    (*key, value)
                })
            })
            .collect();
        self.apply_properties(found.iter().map(|(key, value)| (*key, value.as_str())))
    }

    fn apply_properties<'a, I>(&mut self, entries: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filtering = None;
        let mut flags_changed = false;

        for (key, value) in entries {
            if key == keys::DUMP_SQL_FILTERING {
                filtering = Some(parse_bool(key, value)?);
            } else if let Some(operation) = dump_flag_operation(key) {
                self.dump_sql.set_flag(operation, parse_bool(key, value)?);
                flags_changed = true;
            } else if key == keys::SQLTIMING_WARN_THRESHOLD {
                self.thresholds.warn = parse_threshold(key, value)?;
            } else if key == keys::SQLTIMING_ERROR_THRESHOLD {
                self.thresholds.error = parse_threshold(key, value)?;
            } else if key.starts_with("sqlspy.") {
                debug!(target: DEBUG_TARGET, key, "Ignoring unknown sqlspy property");
            }
        }

        match filtering {
            Some(enabled) => self.dump_sql.enabled = enabled,
            None if flags_changed => self.dump_sql.enabled = !self.dump_sql.dumps_everything(),
            None => {}
        }
        Ok(())
    }
}

impl SpyConfig for SpyLogConfig {
    fn dump_sql_filter(&self) -> SqlDumpFilter {
        self.dump_sql
    }

    fn thresholds(&self) -> Thresholds {
        self.thresholds
    }
}

/// A [`SpyLogConfig`] that can be replaced while routers are using it.
#[derive(Debug, Default)]
pub struct SharedSpyConfig {
    inner: RwLock<SpyLogConfig>,
}

impl SharedSpyConfig {
    pub fn new(config: SpyLogConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Swap in a new configuration, returning the previous one.
    pub fn replace(&self, config: SpyLogConfig) -> SpyLogConfig {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, config)
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> SpyLogConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl From<SpyLogConfig> for SharedSpyConfig {
    fn from(config: SpyLogConfig) -> Self {
        Self::new(config)
    }
}

impl SpyConfig for SharedSpyConfig {
    fn dump_sql_filter(&self) -> SqlDumpFilter {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dump_sql
    }

    fn thresholds(&self) -> Thresholds {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .thresholds
    }
}

fn dump_flag_operation(key: &str) -> Option<SqlOperation> {
    let suffix = key.strip_prefix(keys::DUMP_SQL_PREFIX)?;
    SqlOperation::KNOWN
        .into_iter()
        .find(|operation| operation.as_str() == suffix)
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::invalid_bool(key, value))
    }
}

/// Empty value disables the threshold.
fn parse_threshold(key: &str, value: &str) -> ConfigResult<Option<Duration>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u64>()
        .map(|millis| Some(Duration::from_millis(millis)))
        .map_err(|_| ConfigError::invalid_threshold(key, value))
}
