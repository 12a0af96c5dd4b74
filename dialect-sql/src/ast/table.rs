use std::borrow::Cow;

use crate::ast::{Expression, FunctionExpression, Predicate, QueryPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Cross,
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn sql_text(self) -> &'static str {
        match self {
            JoinType::Cross => " cross join ",
            JoinType::Inner => " join ",
            JoinType::Left => " left join ",
            JoinType::Right => " right join ",
            JoinType::Full => " full join ",
        }
    }

    pub fn is_outer(self) -> bool {
        matches!(self, JoinType::Left | JoinType::Right | JoinType::Full)
    }
}

/// A physical table, optionally aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTableReference<'a> {
    pub(crate) name: Cow<'a, str>,
    pub(crate) alias: Option<Cow<'a, str>>,
    pub(crate) identifier_columns: Vec<Cow<'a, str>>,
}

impl<'a> NamedTableReference<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            identifier_columns: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<Cow<'a, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The primary key columns of the entity mapped to this table.
    pub fn identified_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.identifier_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn identifier_columns(&self) -> &[Cow<'a, str>] {
        &self.identifier_columns
    }

    /// The name columns are qualified with: the alias, else the table name.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A subquery in the `from` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTableReference<'a> {
    pub(crate) query: Box<QueryPart<'a>>,
    pub(crate) alias: Cow<'a, str>,
    pub(crate) column_names: Vec<Cow<'a, str>>,
    pub(crate) lateral: bool,
}

impl<'a> DerivedTableReference<'a> {
    pub fn new(query: impl Into<QueryPart<'a>>, alias: impl Into<Cow<'a, str>>) -> Self {
        Self {
            query: Box::new(query.into()),
            alias: alias.into(),
            column_names: Vec::new(),
            lateral: false,
        }
    }

    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.column_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn lateral(mut self) -> Self {
        self.lateral = true;
        self
    }

    pub fn query(&self) -> &QueryPart<'a> {
        &self.query
    }
}

/// A set-returning function in the `from` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTableReference<'a> {
    pub(crate) function: FunctionExpression<'a>,
    pub(crate) alias: Cow<'a, str>,
    pub(crate) column_names: Vec<Cow<'a, str>>,
    pub(crate) lateral: bool,
    pub(crate) ordinality: Option<Cow<'a, str>>,
}

impl<'a> FunctionTableReference<'a> {
    pub fn new(function: FunctionExpression<'a>, alias: impl Into<Cow<'a, str>>) -> Self {
        Self {
            function,
            alias: alias.into(),
            column_names: Vec::new(),
            lateral: false,
            ordinality: None,
        }
    }

    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.column_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn lateral(mut self) -> Self {
        self.lateral = true;
        self
    }

    /// Requests a one-based index column with the given name.
    pub fn with_ordinality(mut self, column: impl Into<Cow<'a, str>>) -> Self {
        self.ordinality = Some(column.into());
        self
    }
}

/// One row of a `values` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Values<'a>(pub(crate) Vec<Expression<'a>>);

impl<'a> Values<'a> {
    pub fn new<T>(expressions: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<Expression<'a>>,
    {
        Values(expressions.into_iter().map(Into::into).collect())
    }

    pub fn expressions(&self) -> &[Expression<'a>] {
        &self.0
    }
}

/// An inline `values` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesTableReference<'a> {
    pub(crate) rows: Vec<Values<'a>>,
    pub(crate) alias: Cow<'a, str>,
    pub(crate) column_names: Vec<Cow<'a, str>>,
}

impl<'a> ValuesTableReference<'a> {
    pub fn new<I, S>(rows: Vec<Values<'a>>, alias: impl Into<Cow<'a, str>>, column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        Self {
            rows,
            alias: alias.into(),
            column_names: column_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// A synthetic table given as raw `(select ... union all select ...)` text,
/// as produced for table-per-class hierarchies.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionTableReference<'a> {
    pub(crate) sql: Cow<'a, str>,
    pub(crate) alias: Cow<'a, str>,
}

impl<'a> UnionTableReference<'a> {
    pub fn new(sql: impl Into<Cow<'a, str>>, alias: impl Into<Cow<'a, str>>) -> Self {
        Self {
            sql: sql.into(),
            alias: alias.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableReference<'a> {
    Named(NamedTableReference<'a>),
    Derived(DerivedTableReference<'a>),
    Function(FunctionTableReference<'a>),
    Values(ValuesTableReference<'a>),
    Union(UnionTableReference<'a>),
}

impl<'a> TableReference<'a> {
    /// The identification variable, i.e. the alias columns are qualified with.
    pub fn identification_variable(&self) -> Option<&str> {
        match self {
            TableReference::Named(named) => Some(named.qualifier()),
            TableReference::Derived(derived) => Some(&derived.alias),
            TableReference::Function(function) => Some(&function.alias),
            TableReference::Values(values) => Some(&values.alias),
            TableReference::Union(union) => Some(&union.alias),
        }
    }

    pub fn is_lateral(&self) -> bool {
        match self {
            TableReference::Derived(derived) => derived.lateral,
            TableReference::Function(function) => function.lateral,
            _ => false,
        }
    }
}

impl<'a> From<NamedTableReference<'a>> for TableReference<'a> {
    fn from(named: NamedTableReference<'a>) -> Self {
        TableReference::Named(named)
    }
}

impl<'a> From<DerivedTableReference<'a>> for TableReference<'a> {
    fn from(derived: DerivedTableReference<'a>) -> Self {
        TableReference::Derived(derived)
    }
}

impl<'a> From<FunctionTableReference<'a>> for TableReference<'a> {
    fn from(function: FunctionTableReference<'a>) -> Self {
        TableReference::Function(function)
    }
}

impl<'a> From<ValuesTableReference<'a>> for TableReference<'a> {
    fn from(values: ValuesTableReference<'a>) -> Self {
        TableReference::Values(values)
    }
}

impl<'a> From<UnionTableReference<'a>> for TableReference<'a> {
    fn from(union: UnionTableReference<'a>) -> Self {
        TableReference::Union(union)
    }
}

/// A join of a table group to the group that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGroupJoin<'a> {
    pub(crate) join_type: JoinType,
    pub(crate) group: TableGroup<'a>,
    pub(crate) predicate: Option<Predicate<'a>>,
}

impl<'a> TableGroupJoin<'a> {
    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn group(&self) -> &TableGroup<'a> {
        &self.group
    }
}

/// A table reference together with the tables joined to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGroup<'a> {
    pub(crate) primary: TableReference<'a>,
    pub(crate) joins: Vec<TableGroupJoin<'a>>,
}

impl<'a> TableGroup<'a> {
    pub fn new(primary: impl Into<TableReference<'a>>) -> Self {
        Self {
            primary: primary.into(),
            joins: Vec::new(),
        }
    }

    pub fn join(mut self, join_type: JoinType, group: TableGroup<'a>, predicate: Option<Predicate<'a>>) -> Self {
        self.joins.push(TableGroupJoin {
            join_type,
            group,
            predicate,
        });
        self
    }

    pub fn inner_join(self, group: TableGroup<'a>, on: Predicate<'a>) -> Self {
        self.join(JoinType::Inner, group, Some(on))
    }

    pub fn left_join(self, group: TableGroup<'a>, on: Predicate<'a>) -> Self {
        self.join(JoinType::Left, group, Some(on))
    }

    pub fn right_join(self, group: TableGroup<'a>, on: Predicate<'a>) -> Self {
        self.join(JoinType::Right, group, Some(on))
    }

    pub fn full_join(self, group: TableGroup<'a>, on: Predicate<'a>) -> Self {
        self.join(JoinType::Full, group, Some(on))
    }

    pub fn cross_join(self, group: TableGroup<'a>) -> Self {
        self.join(JoinType::Cross, group, None)
    }

    pub fn primary(&self) -> &TableReference<'a> {
        &self.primary
    }

    pub fn joins(&self) -> &[TableGroupJoin<'a>] {
        &self.joins
    }

    /// Identifier columns of the entity this group maps, qualified by the
    /// group's alias. Empty when the primary table carries none.
    pub fn identifier_columns(&self) -> Vec<Expression<'a>> {
        match &self.primary {
            TableReference::Named(named) => named
                .identifier_columns
                .iter()
                .map(|column| Expression::column(named.qualifier().to_string(), column.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// The `from` clause: one or more comma-separated roots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FromClause<'a> {
    pub(crate) roots: Vec<TableGroup<'a>>,
}

impl<'a> FromClause<'a> {
    pub fn new(roots: Vec<TableGroup<'a>>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[TableGroup<'a>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// True if any group, at any depth, is joined with the given type.
    pub fn has_join_of_type(&self, join_type: JoinType) -> bool {
        fn group_has(group: &TableGroup<'_>, join_type: JoinType) -> bool {
            group
                .joins
                .iter()
                .any(|join| join.join_type == join_type || group_has(&join.group, join_type))
        }

        self.roots.iter().any(|root| group_has(root, join_type))
    }
}
