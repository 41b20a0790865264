//! SQL operation detection.

use std::fmt;

use crate::label::CategoryLabel;

/// Number of leading characters compared against the operation keywords.
const KEYWORD_WIDTH: usize = 6;

/// SQL operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlOperation {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Unknown,
}

impl SqlOperation {
    /// Every classifiable operation (everything except `Unknown`).
    pub const KNOWN: [SqlOperation; 5] = [
        SqlOperation::Select,
        SqlOperation::Insert,
        SqlOperation::Update,
        SqlOperation::Delete,
        SqlOperation::Create,
    ];

    /// Returns the lower-case keyword, or an empty string for `Unknown`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlOperation::Select => "select",
            SqlOperation::Insert => "insert",
            SqlOperation::Update => "update",
            SqlOperation::Delete => "delete",
            SqlOperation::Create => "create",
            SqlOperation::Unknown => "",
        }
    }

    /// The label statements of this kind are logged under.
    pub fn label(&self) -> CategoryLabel {
        CategoryLabel::for_operation(Some(*self))
    }
}

impl fmt::Display for SqlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlOperation::Unknown => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Parse the SQL operation type from a statement.
///
/// Only the first six characters of the trimmed statement are looked at,
/// compared case-insensitively against `select`, `insert`, `update`,
/// `delete` and `create`. Statements that open with a comment, a `WITH`
/// clause or a parenthesis, and statements shorter than six characters,
/// are `Unknown`.
pub fn parse_operation(sql: &str) -> SqlOperation {
    let trimmed = sql.trim();
    let prefix: String = trimmed.chars().take(KEYWORD_WIDTH).collect();
    if prefix.chars().count() < KEYWORD_WIDTH {
        return SqlOperation::Unknown;
    }

    match prefix.to_lowercase().as_str() {
        "select" => SqlOperation::Select,
        "insert" => SqlOperation::Insert,
        "update" => SqlOperation::Update,
        "delete" => SqlOperation::Delete,
        "create" => SqlOperation::Create,
        _ => SqlOperation::Unknown,
    }
}
