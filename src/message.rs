//! Payloads handed to the logging backend.
//!
//! A message only borrows what the spy layer passed in. Building one is cheap,
//! but the router still builds it only once an event is known to be logged.

use std::error::Error;
use std::fmt;

use crate::spy::{ConnectionEvent, Spy, NOT_MEASURED};

/// Payload of a single spy event.
///
/// `debug_enabled` tells renderers whether the backend would also accept
/// DEBUG for this label, in which case the spy identity is spelled out.
pub enum SpyMessage<'a> {
    Connection {
        spy: &'a dyn Spy,
        event: ConnectionEvent,
        exec_time: i64,
        debug_enabled: bool,
    },
    MethodReturned {
        spy: &'a dyn Spy,
        method_call: &'a str,
        return_msg: &'a str,
        debug_enabled: bool,
    },
    SqlTiming {
        spy: &'a dyn Spy,
        exec_time: i64,
        method_call: &'a str,
        sql: &'a str,
        debug_enabled: bool,
    },
    Exception {
        spy: &'a dyn Spy,
        method_call: &'a str,
        error: &'a (dyn Error + 'a),
        sql: Option<&'a str>,
        exec_time: i64,
        debug_enabled: bool,
    },
}

impl<'a> SpyMessage<'a> {
    pub fn spy(&self) -> &'a dyn Spy {
        match self {
            SpyMessage::Connection { spy, .. }
            | SpyMessage::MethodReturned { spy, .. }
            | SpyMessage::SqlTiming { spy, .. }
            | SpyMessage::Exception { spy, .. } => *spy,
        }
    }

    pub fn method_call(&self) -> Option<&'a str> {
        match self {
            SpyMessage::MethodReturned { method_call, .. }
            | SpyMessage::SqlTiming { method_call, .. }
            | SpyMessage::Exception { method_call, .. } => Some(*method_call),
            SpyMessage::Connection { .. } => None,
        }
    }

    pub fn sql(&self) -> Option<&'a str> {
        match self {
            SpyMessage::SqlTiming { sql, .. } => Some(*sql),
            SpyMessage::Exception { sql, .. } => *sql,
            _ => None,
        }
    }

    /// Execution time in milliseconds, possibly [`NOT_MEASURED`].
    pub fn exec_time(&self) -> Option<i64> {
        match self {
            SpyMessage::Connection { exec_time, .. }
            | SpyMessage::SqlTiming { exec_time, .. }
            | SpyMessage::Exception { exec_time, .. } => Some(*exec_time),
            SpyMessage::MethodReturned { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&'a (dyn Error + 'a)> {
        match self {
            SpyMessage::Exception { error, .. } => Some(*error),
            _ => None,
        }
    }

    pub fn debug_enabled(&self) -> bool {
        match self {
            SpyMessage::Connection { debug_enabled, .. }
            | SpyMessage::MethodReturned { debug_enabled, .. }
            | SpyMessage::SqlTiming { debug_enabled, .. }
            | SpyMessage::Exception { debug_enabled, .. } => *debug_enabled,
        }
    }
}

impl fmt::Display for SpyMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spy = self.spy();
        write!(f, "{}. ", spy.connection_number())?;
        if self.debug_enabled() {
            write!(f, "[{}] ", spy.class_type())?;
        }

        match self {
            SpyMessage::Connection {
                event, exec_time, ..
            } => {
                write!(f, "Connection {}", event.as_str())?;
                write_exec_time(f, *exec_time)
            }
            SpyMessage::MethodReturned {
                method_call,
                return_msg,
                ..
            } => {
                if return_msg.is_empty() {
                    write!(f, "{method_call} returned")
                } else {
                    write!(f, "{method_call} returned {return_msg}")
                }
            }
            SpyMessage::SqlTiming { sql, exec_time, .. } => {
                f.write_str(sql)?;
                write_exec_time(f, *exec_time)
            }
            SpyMessage::Exception {
                method_call,
                sql,
                exec_time,
                ..
            } => {
                write!(f, "{method_call} FAILED!")?;
                if let Some(sql) = sql {
                    write!(f, " {sql}")?;
                }
                write_exec_time(f, *exec_time)
            }
        }
    }
}

fn write_exec_time(f: &mut fmt::Formatter<'_>, exec_time: i64) -> fmt::Result {
    if exec_time == NOT_MEASURED {
        Ok(())
    } else {
        write!(f, " {{executed in {exec_time} msec}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spy::SpyId;
    use std::io;

    #[test]
    fn test_sql_timing_display() {
        let spy = SpyId::statement(3);
        let message = SpyMessage::SqlTiming {
            spy: &spy,
            exec_time: 12,
            method_call: "executeQuery(select 1)",
            sql: "select 1",
            debug_enabled: false,
        };
        assert_eq!(message.to_string(), "3. select 1 {executed in 12 msec}");
        assert_eq!(message.sql(), Some("select 1"));
        assert_eq!(message.exec_time(), Some(12));
        assert!(message.error().is_none());
    }

    #[test]
    fn test_connection_not_measured() {
        let spy = SpyId::connection(5);
        let message = SpyMessage::Connection {
            spy: &spy,
            event: ConnectionEvent::Closing,
            exec_time: NOT_MEASURED,
            debug_enabled: true,
        };
        assert_eq!(message.to_string(), "5. [Connection] Connection closed");
        assert_eq!(message.exec_time(), Some(NOT_MEASURED));
        assert_eq!(message.method_call(), None);
    }

    #[test]
    fn test_method_returned_display() {
        let spy = SpyId::result_set(2);
        let message = SpyMessage::MethodReturned {
            spy: &spy,
            method_call: "ResultSet.next()",
            return_msg: "true",
            debug_enabled: false,
        };
        assert_eq!(message.to_string(), "2. ResultSet.next() returned true");

        let message = SpyMessage::MethodReturned {
            spy: &spy,
            method_call: "ResultSet.close()",
            return_msg: "",
            debug_enabled: false,
        };
        assert_eq!(message.to_string(), "2. ResultSet.close() returned");
    }

    #[test]
    fn test_exception_display() {
        let spy = SpyId::statement(9);
        let error = io::Error::other("socket closed");
        let message = SpyMessage::Exception {
            spy: &spy,
            method_call: "Statement.execute(delete from t)",
            error: &error,
            sql: Some("delete from t"),
            exec_time: 4,
            debug_enabled: false,
        };
        assert_eq!(
            message.to_string(),
            "9. Statement.execute(delete from t) FAILED! delete from t {executed in 4 msec}"
        );
        assert_eq!(message.error().map(|e| e.to_string()), Some("socket closed".into()));
    }
}
