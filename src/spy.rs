//! Spy identities and the events they raise.

use std::error::Error;

/// Class type reported by connection spies.
pub const CONNECTION_CLASS_TYPE: &str = "Connection";
/// Class type reported by plain statement spies.
pub const STATEMENT_CLASS_TYPE: &str = "Statement";
pub const PREPARED_STATEMENT_CLASS_TYPE: &str = "PreparedStatement";
pub const CALLABLE_STATEMENT_CLASS_TYPE: &str = "CallableStatement";
/// Class type reported by result-set spies; selects the result-set label.
pub const RESULT_SET_CLASS_TYPE: &str = "ResultSet";

/// Execution time passed when the duration was not measured.
pub const NOT_MEASURED: i64 = -1;

/// Identity of the wrapper (connection, statement, result set) that raised
/// an event.
pub trait Spy {
    /// Component kind, e.g. [`RESULT_SET_CLASS_TYPE`].
    fn class_type(&self) -> &str;

    /// Number of the connection this spy belongs to.
    fn connection_number(&self) -> u64;

    fn is_result_set(&self) -> bool {
        self.class_type() == RESULT_SET_CLASS_TYPE
    }
}

/// Direction of a connection lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opening,
    Closing,
}

impl ConnectionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionEvent::Opening => "opened",
            ConnectionEvent::Closing => "closed",
        }
    }
}

/// One intercepted call, as handed over by the spy layer.
///
/// Execution times are in milliseconds; [`NOT_MEASURED`] where unknown.
pub enum SpyEvent<'a> {
    ConnectionOpened {
        spy: &'a dyn Spy,
        exec_time: i64,
    },
    ConnectionClosed {
        spy: &'a dyn Spy,
        exec_time: i64,
    },
    MethodReturned {
        spy: &'a dyn Spy,
        method_call: &'a str,
        return_msg: &'a str,
    },
    SqlTiming {
        spy: &'a dyn Spy,
        exec_time: i64,
        method_call: &'a str,
        sql: &'a str,
    },
    Exception {
        spy: &'a dyn Spy,
        method_call: &'a str,
        error: &'a (dyn Error + 'a),
        sql: Option<&'a str>,
        exec_time: i64,
    },
    ConstructorReturned {
        spy: &'a dyn Spy,
        construction_info: &'a str,
    },
    SqlOccurred {
        spy: &'a dyn Spy,
        method_call: &'a str,
        sql: &'a str,
    },
}

impl SpyEvent<'_> {
    pub fn spy(&self) -> &dyn Spy {
        match self {
            SpyEvent::ConnectionOpened { spy, .. }
            | SpyEvent::ConnectionClosed { spy, .. }
            | SpyEvent::MethodReturned { spy, .. }
            | SpyEvent::SqlTiming { spy, .. }
            | SpyEvent::Exception { spy, .. }
            | SpyEvent::ConstructorReturned { spy, .. }
            | SpyEvent::SqlOccurred { spy, .. } => *spy,
        }
    }
}

/// Minimal spy identity for callers that have no wrapper object of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpyId {
    pub class_type: String,
    pub connection_number: u64,
}

impl SpyId {
    pub fn new(class_type: impl Into<String>, connection_number: u64) -> Self {
        Self {
            class_type: class_type.into(),
            connection_number,
        }
    }

    pub fn connection(connection_number: u64) -> Self {
        Self::new(CONNECTION_CLASS_TYPE, connection_number)
    }

    pub fn statement(connection_number: u64) -> Self {
        Self::new(STATEMENT_CLASS_TYPE, connection_number)
    }

    pub fn result_set(connection_number: u64) -> Self {
        Self::new(RESULT_SET_CLASS_TYPE, connection_number)
    }
}

impl Spy for SpyId {
    fn class_type(&self) -> &str {
        &self.class_type
    }

    fn connection_number(&self) -> u64 {
        self.connection_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_set_detection() {
        assert!(SpyId::result_set(1).is_result_set());
        assert!(!SpyId::statement(1).is_result_set());
        assert!(!SpyId::new(PREPARED_STATEMENT_CLASS_TYPE, 1).is_result_set());
        assert!(!SpyId::new("resultset", 1).is_result_set());
    }

    #[test]
    fn test_event_spy() {
        let spy = SpyId::new(CALLABLE_STATEMENT_CLASS_TYPE, 7);
        let event = SpyEvent::SqlOccurred {
            spy: &spy,
            method_call: "execute()",
            sql: "call p()",
        };
        assert_eq!(event.spy().connection_number(), 7);
        assert_eq!(event.spy().class_type(), CALLABLE_STATEMENT_CLASS_TYPE);
    }
}
