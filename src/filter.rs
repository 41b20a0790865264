//! Per-operation filtering of timed SQL events.

use crate::parser::SqlOperation;

/// Which statement kinds are dumped when filtering is switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlDumpFilter {
    /// Master switch. When `false` every statement is logged.
    pub enabled: bool,
    pub select: bool,
    pub insert: bool,
    pub update: bool,
    pub delete: bool,
    pub create: bool,
}

impl Default for SqlDumpFilter {
    fn default() -> Self {
        Self {
            enabled: false,
            select: true,
            insert: true,
            update: true,
            delete: true,
            create: true,
        }
    }
}

impl SqlDumpFilter {
    /// Filtering on, every operation still dumped.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Filtering on, nothing dumped except unclassifiable statements.
    pub fn none() -> Self {
        Self {
            enabled: true,
            select: false,
            insert: false,
            update: false,
            delete: false,
            create: false,
        }
    }

    /// Dump flag for `operation`; `Unknown` has no flag and is always dumped.
    pub fn flag(&self, operation: SqlOperation) -> bool {
        match operation {
            SqlOperation::Select => self.select,
            SqlOperation::Insert => self.insert,
            SqlOperation::Update => self.update,
            SqlOperation::Delete => self.delete,
            SqlOperation::Create => self.create,
            SqlOperation::Unknown => true,
        }
    }

    /// Set the dump flag for `operation`. Setting `Unknown` is ignored.
    pub fn set_flag(&mut self, operation: SqlOperation, dump: bool) {
        match operation {
            SqlOperation::Select => self.select = dump,
            SqlOperation::Insert => self.insert = dump,
            SqlOperation::Update => self.update = dump,
            SqlOperation::Delete => self.delete = dump,
            SqlOperation::Create => self.create = dump,
            SqlOperation::Unknown => {}
        }
    }

    /// Whether every per-operation flag is set.
    pub fn dumps_everything(&self) -> bool {
        SqlOperation::KNOWN.iter().all(|op| self.flag(*op))
    }

    /// See [`should_log`].
    pub fn allows(&self, operation: SqlOperation) -> bool {
        should_log(operation, self)
    }
}

/// Whether events for `operation` pass the dump filter.
///
/// Unclassifiable statements are never filtered out.
pub fn should_log(operation: SqlOperation, filter: &SqlDumpFilter) -> bool {
    !filter.enabled || operation == SqlOperation::Unknown || filter.flag(operation)
}
