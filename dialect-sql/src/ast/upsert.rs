use std::borrow::Cow;

use crate::ast::{Expression, NamedTableReference};

/// A column together with the value written to, or compared against, it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValueBinding<'a> {
    pub(crate) column: Cow<'a, str>,
    pub(crate) value: Expression<'a>,
}

impl<'a> ColumnValueBinding<'a> {
    pub fn new(column: impl Into<Cow<'a, str>>, value: impl Into<Expression<'a>>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &Expression<'a> {
        &self.value
    }
}

/// Writes one row of an optional (secondary) table: updates it when a row
/// with the key exists, inserts it otherwise.
///
/// With an optimistic lock binding the update only happens while the
/// version column still holds the expected value.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalTableUpdate<'a> {
    pub(crate) table: NamedTableReference<'a>,
    pub(crate) key_bindings: Vec<ColumnValueBinding<'a>>,
    pub(crate) value_bindings: Vec<ColumnValueBinding<'a>>,
    pub(crate) optimistic_lock: Option<ColumnValueBinding<'a>>,
}

impl<'a> OptionalTableUpdate<'a> {
    pub fn new(table: NamedTableReference<'a>) -> Self {
        Self {
            table,
            key_bindings: Vec::new(),
            value_bindings: Vec::new(),
            optimistic_lock: None,
        }
    }

    pub fn key(mut self, binding: ColumnValueBinding<'a>) -> Self {
        self.key_bindings.push(binding);
        self
    }

    pub fn value(mut self, binding: ColumnValueBinding<'a>) -> Self {
        self.value_bindings.push(binding);
        self
    }

    pub fn optimistic_lock(mut self, binding: ColumnValueBinding<'a>) -> Self {
        self.optimistic_lock = Some(binding);
        self
    }

    pub fn table(&self) -> &NamedTableReference<'a> {
        &self.table
    }

    /// Key columns followed by value columns, the order rows are inserted in.
    pub fn all_bindings(&self) -> impl Iterator<Item = &ColumnValueBinding<'a>> {
        self.key_bindings.iter().chain(self.value_bindings.iter())
    }
}
