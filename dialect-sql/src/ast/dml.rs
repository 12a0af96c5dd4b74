use std::borrow::Cow;

use crate::ast::{
    ColumnReference, CteStatement, Expression, FromClause, NamedTableReference, Predicate, QueryPart, TableGroup,
    Values,
};

/// The qualifier conflict assignments use to reference the proposed row.
pub const EXCLUDED: &str = "excluded";

/// A `set` item. More than one column makes it a row assignment,
/// `(a,b)=(select ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<'a> {
    pub(crate) columns: Vec<ColumnReference<'a>>,
    pub(crate) value: Expression<'a>,
}

impl<'a> Assignment<'a> {
    pub fn new(column: ColumnReference<'a>, value: impl Into<Expression<'a>>) -> Self {
        Self {
            columns: vec![column],
            value: value.into(),
        }
    }

    pub fn row(columns: Vec<ColumnReference<'a>>, value: impl Into<Expression<'a>>) -> Self {
        Self {
            columns,
            value: value.into(),
        }
    }

    pub fn columns(&self) -> &[ColumnReference<'a>] {
        &self.columns
    }

    pub fn value(&self) -> &Expression<'a> {
        &self.value
    }
}

/// `on conflict ... do nothing | do update set ...`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConflictClause<'a> {
    pub(crate) constraint_name: Option<Cow<'a, str>>,
    pub(crate) constraint_columns: Vec<Cow<'a, str>>,
    pub(crate) assignments: Vec<Assignment<'a>>,
    pub(crate) predicate: Option<Predicate<'a>>,
}

impl<'a> ConflictClause<'a> {
    pub fn on_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        Self {
            constraint_columns: columns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn on_constraint(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            constraint_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A conflict target nobody named; any unique violation counts.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn set(mut self, assignment: Assignment<'a>) -> Self {
        self.assignments.push(assignment);
        self
    }

    /// Only update rows matching the predicate.
    pub fn so_that(mut self, predicate: Predicate<'a>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn is_do_nothing(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn is_do_update(&self) -> bool {
        !self.assignments.is_empty()
    }

    pub fn constraint_name(&self) -> Option<&str> {
        self.constraint_name.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource<'a> {
    Values(Vec<Values<'a>>),
    Select(Box<QueryPart<'a>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement<'a> {
    pub(crate) ctes: Vec<CteStatement<'a>>,
    pub(crate) target: NamedTableReference<'a>,
    pub(crate) columns: Vec<ColumnReference<'a>>,
    pub(crate) source: InsertSource<'a>,
    pub(crate) conflict: Option<ConflictClause<'a>>,
    pub(crate) returning: Vec<ColumnReference<'a>>,
}

impl<'a> InsertStatement<'a> {
    pub fn values(target: NamedTableReference<'a>, columns: Vec<ColumnReference<'a>>, rows: Vec<Values<'a>>) -> Self {
        Self {
            ctes: Vec::new(),
            target,
            columns,
            source: InsertSource::Values(rows),
            conflict: None,
            returning: Vec::new(),
        }
    }

    pub fn select(
        target: NamedTableReference<'a>,
        columns: Vec<ColumnReference<'a>>,
        query: impl Into<QueryPart<'a>>,
    ) -> Self {
        Self {
            ctes: Vec::new(),
            target,
            columns,
            source: InsertSource::Select(Box::new(query.into())),
            conflict: None,
            returning: Vec::new(),
        }
    }

    pub fn with(mut self, cte: CteStatement<'a>) -> Self {
        self.ctes.push(cte);
        self
    }

    pub fn on_conflict(mut self, conflict: ConflictClause<'a>) -> Self {
        self.conflict = Some(conflict);
        self
    }

    pub fn returning(mut self, columns: Vec<ColumnReference<'a>>) -> Self {
        self.returning = columns;
        self
    }

    pub fn target(&self) -> &NamedTableReference<'a> {
        &self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement<'a> {
    pub(crate) ctes: Vec<CteStatement<'a>>,
    pub(crate) target: NamedTableReference<'a>,
    pub(crate) from_clause: FromClause<'a>,
    pub(crate) assignments: Vec<Assignment<'a>>,
    pub(crate) restriction: Option<Predicate<'a>>,
    pub(crate) returning: Vec<ColumnReference<'a>>,
}

impl<'a> UpdateStatement<'a> {
    pub fn new(target: NamedTableReference<'a>) -> Self {
        Self {
            ctes: Vec::new(),
            target,
            from_clause: FromClause::default(),
            assignments: Vec::new(),
            restriction: None,
            returning: Vec::new(),
        }
    }

    pub fn with(mut self, cte: CteStatement<'a>) -> Self {
        self.ctes.push(cte);
        self
    }

    /// Joins additional tables the assignments or restriction reference.
    pub fn from(mut self, group: TableGroup<'a>) -> Self {
        self.from_clause.roots.push(group);
        self
    }

    pub fn set(mut self, assignment: Assignment<'a>) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn so_that(mut self, predicate: Predicate<'a>) -> Self {
        self.restriction = Some(Predicate::and_optional(self.restriction.take(), predicate));
        self
    }

    pub fn returning(mut self, columns: Vec<ColumnReference<'a>>) -> Self {
        self.returning = columns;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement<'a> {
    pub(crate) ctes: Vec<CteStatement<'a>>,
    pub(crate) target: NamedTableReference<'a>,
    pub(crate) from_clause: FromClause<'a>,
    pub(crate) restriction: Option<Predicate<'a>>,
    pub(crate) returning: Vec<ColumnReference<'a>>,
}

impl<'a> DeleteStatement<'a> {
    pub fn new(target: NamedTableReference<'a>) -> Self {
        Self {
            ctes: Vec::new(),
            target,
            from_clause: FromClause::default(),
            restriction: None,
            returning: Vec::new(),
        }
    }

    pub fn with(mut self, cte: CteStatement<'a>) -> Self {
        self.ctes.push(cte);
        self
    }

    pub fn from(mut self, group: TableGroup<'a>) -> Self {
        self.from_clause.roots.push(group);
        self
    }

    pub fn so_that(mut self, predicate: Predicate<'a>) -> Self {
        self.restriction = Some(Predicate::and_optional(self.restriction.take(), predicate));
        self
    }

    pub fn returning(mut self, columns: Vec<ColumnReference<'a>>) -> Self {
        self.returning = columns;
        self
    }
}
