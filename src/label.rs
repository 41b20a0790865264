//! Category labels attached to every spy event.
//!
//! Labels form a small fixed forest. Each label owns a `tracing` target laid
//! out as a path under `sqlspy`, so a subscriber directive on a parent target
//! (`sqlspy::sql=warn`) also covers its children (`sqlspy::sql::select`).

use std::fmt;

use crate::parser::SqlOperation;

/// Root target of the primary spy channel.
pub const SPY_TARGET: &str = "sqlspy";

/// Target of the secondary channel used for the crate's own diagnostics.
///
/// Must not share the `sqlspy` prefix: subscriber directives match targets by
/// prefix, and the two channels are filtered independently.
pub const DEBUG_TARGET: &str = "spy_debug";

/// A category label (marker) for spy events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryLabel {
    /// Statement execution, parent of the per-operation labels.
    Sql,
    Select,
    Insert,
    Update,
    Delete,
    Create,
    /// All JDBC calls, parent of `Audit` and `ResultSet`.
    Jdbc,
    /// JDBC calls other than result-set calls.
    Audit,
    ResultSet,
    Connection,
    Exception,
}

impl CategoryLabel {
    /// Every label, roots before their children.
    pub const ALL: [CategoryLabel; 11] = [
        CategoryLabel::Sql,
        CategoryLabel::Select,
        CategoryLabel::Insert,
        CategoryLabel::Update,
        CategoryLabel::Delete,
        CategoryLabel::Create,
        CategoryLabel::Jdbc,
        CategoryLabel::Audit,
        CategoryLabel::ResultSet,
        CategoryLabel::Connection,
        CategoryLabel::Exception,
    ];

    /// Unique name of the label.
    pub const fn name(&self) -> &'static str {
        match self {
            CategoryLabel::Sql => "SQLSPY_SQL",
            CategoryLabel::Select => "SQLSPY_SELECT",
            CategoryLabel::Insert => "SQLSPY_INSERT",
            CategoryLabel::Update => "SQLSPY_UPDATE",
            CategoryLabel::Delete => "SQLSPY_DELETE",
            CategoryLabel::Create => "SQLSPY_CREATE",
            CategoryLabel::Jdbc => "SQLSPY_JDBC",
            CategoryLabel::Audit => "SQLSPY_AUDIT",
            CategoryLabel::ResultSet => "SQLSPY_RESULTSET",
            CategoryLabel::Connection => "SQLSPY_CONNECTION",
            CategoryLabel::Exception => "SQLSPY_EXCEPTION",
        }
    }

    /// The `tracing` target events with this label are emitted under.
    ///
    /// `const` so it can be used where `tracing` macros require a constant.
    pub const fn target(&self) -> &'static str {
        match self {
            CategoryLabel::Sql => "sqlspy::sql",
            CategoryLabel::Select => "sqlspy::sql::select",
            CategoryLabel::Insert => "sqlspy::sql::insert",
            CategoryLabel::Update => "sqlspy::sql::update",
            CategoryLabel::Delete => "sqlspy::sql::delete",
            CategoryLabel::Create => "sqlspy::sql::create",
            CategoryLabel::Jdbc => "sqlspy::jdbc",
            CategoryLabel::Audit => "sqlspy::jdbc::audit",
            CategoryLabel::ResultSet => "sqlspy::jdbc::resultset",
            CategoryLabel::Connection => "sqlspy::connection",
            CategoryLabel::Exception => "sqlspy::exception",
        }
    }

    /// Parent label, `None` for roots.
    pub const fn parent(&self) -> Option<CategoryLabel> {
        match self {
            CategoryLabel::Select
            | CategoryLabel::Insert
            | CategoryLabel::Update
            | CategoryLabel::Delete
            | CategoryLabel::Create => Some(CategoryLabel::Sql),
            CategoryLabel::Audit | CategoryLabel::ResultSet => Some(CategoryLabel::Jdbc),
            CategoryLabel::Sql
            | CategoryLabel::Jdbc
            | CategoryLabel::Connection
            | CategoryLabel::Exception => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Iterate over the parents of this label, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = CategoryLabel> {
        std::iter::successors(self.parent(), |label| label.parent())
    }

    /// Whether `self` equals `other` or sits somewhere below it.
    pub fn is_descendant_of(&self, other: CategoryLabel) -> bool {
        *self == other || self.ancestors().any(|label| label == other)
    }

    /// The root labels of the forest.
    pub fn roots() -> impl Iterator<Item = CategoryLabel> {
        Self::ALL.into_iter().filter(CategoryLabel::is_root)
    }

    /// Label for a classified statement; unknown or absent operations fall
    /// back to [`CategoryLabel::Sql`].
    pub fn for_operation(operation: Option<SqlOperation>) -> CategoryLabel {
        match operation {
            Some(SqlOperation::Select) => CategoryLabel::Select,
            Some(SqlOperation::Insert) => CategoryLabel::Insert,
            Some(SqlOperation::Update) => CategoryLabel::Update,
            Some(SqlOperation::Delete) => CategoryLabel::Delete,
            Some(SqlOperation::Create) => CategoryLabel::Create,
            Some(SqlOperation::Unknown) | None => CategoryLabel::Sql,
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hierarchy() {
        assert_eq!(CategoryLabel::Select.parent(), Some(CategoryLabel::Sql));
        assert_eq!(CategoryLabel::Create.parent(), Some(CategoryLabel::Sql));
        assert_eq!(CategoryLabel::Audit.parent(), Some(CategoryLabel::Jdbc));
        assert_eq!(CategoryLabel::ResultSet.parent(), Some(CategoryLabel::Jdbc));
        assert_eq!(CategoryLabel::Connection.parent(), None);
        assert_eq!(CategoryLabel::Exception.parent(), None);

        let roots: Vec<_> = CategoryLabel::roots().collect();
        assert_eq!(
            roots,
            vec![
                CategoryLabel::Sql,
                CategoryLabel::Jdbc,
                CategoryLabel::Connection,
                CategoryLabel::Exception
            ]
        );
    }

    #[test]
    fn test_every_child_has_a_root_parent() {
        for label in CategoryLabel::ALL {
            if let Some(parent) = label.parent() {
                assert!(parent.is_root(), "{label} has a non-root parent");
                assert!(label.is_descendant_of(parent));
                assert!(!parent.is_descendant_of(label));
            }
        }
        assert!(!CategoryLabel::Audit.is_descendant_of(CategoryLabel::Sql));
    }

    #[test]
    fn test_names_and_targets_unique() {
        let names: HashSet<_> = CategoryLabel::ALL.iter().map(|l| l.name()).collect();
        let targets: HashSet<_> = CategoryLabel::ALL.iter().map(|l| l.target()).collect();
        assert_eq!(names.len(), CategoryLabel::ALL.len());
        assert_eq!(targets.len(), CategoryLabel::ALL.len());
    }

    #[test]
    fn test_targets_follow_hierarchy() {
        for label in CategoryLabel::ALL {
            assert!(label.target().starts_with(SPY_TARGET));
            if let Some(parent) = label.parent() {
                assert!(label.target().starts_with(&format!("{}::", parent.target())));
            }
        }
        assert!(!DEBUG_TARGET.starts_with(SPY_TARGET));
    }

    #[test]
    fn test_for_operation() {
        assert_eq!(
            CategoryLabel::for_operation(Some(SqlOperation::Select)),
            CategoryLabel::Select
        );
        assert_eq!(
            CategoryLabel::for_operation(Some(SqlOperation::Delete)),
            CategoryLabel::Delete
        );
        assert_eq!(
            CategoryLabel::for_operation(Some(SqlOperation::Unknown)),
            CategoryLabel::Sql
        );
        assert_eq!(CategoryLabel::for_operation(None), CategoryLabel::Sql);
    }
}
