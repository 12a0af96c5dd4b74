//! The executable result of a translation.
use std::collections::BTreeSet;

use crate::ast::SqlType;

/// Binds one positional `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinder {
    name: String,
    sql_type: SqlType,
}

impl ParameterBinder {
    pub(crate) fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }

    /// The name of the parameter the value comes from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &SqlType {
        &self.sql_type
    }
}

/// SQL text with its positionally aligned binders, ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdbcOperation {
    pub(crate) sql: String,
    pub(crate) parameter_binders: Vec<ParameterBinder>,
    pub(crate) affected_table_names: BTreeSet<String>,
    pub(crate) unique_constraint_name_that_may_fail: Option<String>,
    pub(crate) follow_on_locking: bool,
}

impl JdbcOperation {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// One binder per placeholder, in the order they appear in the text.
    /// A parameter rendered twice is bound twice.
    pub fn parameter_binders(&self) -> &[ParameterBinder] {
        &self.parameter_binders
    }

    /// Physical tables the statement reads or writes.
    pub fn affected_table_names(&self) -> &BTreeSet<String> {
        &self.affected_table_names
    }

    /// Set when an insert may fail on a unique constraint the caller asked
    /// to ignore. An empty name means any unique constraint.
    pub fn unique_constraint_name_that_may_fail(&self) -> Option<&str> {
        self.unique_constraint_name_that_may_fail.as_deref()
    }

    /// The requested row locks were not rendered and must be acquired with
    /// a separate statement after this one ran.
    pub fn needs_follow_on_locking(&self) -> bool {
        self.follow_on_locking
    }
}
