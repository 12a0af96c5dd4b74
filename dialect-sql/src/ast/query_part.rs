use std::borrow::Cow;

use crate::ast::{Expression, FromClause, Predicate, TableGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPrecedence {
    First,
    Last,
}

/// An `order by` item.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpecification<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) order: Order,
    pub(crate) nulls: Option<NullPrecedence>,
}

impl<'a> SortSpecification<'a> {
    pub fn asc(expression: impl Into<Expression<'a>>) -> Self {
        Self {
            expression: expression.into(),
            order: Order::Asc,
            nulls: None,
        }
    }

    pub fn desc(expression: impl Into<Expression<'a>>) -> Self {
        Self {
            expression: expression.into(),
            order: Order::Desc,
            nulls: None,
        }
    }

    pub fn nulls(mut self, precedence: NullPrecedence) -> Self {
        self.nulls = Some(precedence);
        self
    }

    pub fn expression(&self) -> &Expression<'a> {
        &self.expression
    }

    pub(crate) fn with_expression(&self, expression: Expression<'a>) -> Self {
        Self {
            expression,
            order: self.order,
            nulls: self.nulls,
        }
    }
}

/// How the fetch expression limits the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchClauseType {
    #[default]
    RowsOnly,
    RowsWithTies,
    PercentOnly,
    PercentWithTies,
}

impl FetchClauseType {
    pub fn is_percent(self) -> bool {
        matches!(self, FetchClauseType::PercentOnly | FetchClauseType::PercentWithTies)
    }

    pub fn is_with_ties(self) -> bool {
        matches!(self, FetchClauseType::RowsWithTies | FetchClauseType::PercentWithTies)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl SetOperator {
    pub fn sql_text(self) -> &'static str {
        match self {
            SetOperator::Union => "union",
            SetOperator::UnionAll => "union all",
            SetOperator::Intersect => "intersect",
            SetOperator::IntersectAll => "intersect all",
            SetOperator::Except => "except",
            SetOperator::ExceptAll => "except all",
        }
    }
}

/// A selection item, optionally aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlSelection<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) alias: Option<Cow<'a, str>>,
}

impl<'a> SqlSelection<'a> {
    pub fn new(expression: impl Into<Expression<'a>>) -> Self {
        Self {
            expression: expression.into(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<Cow<'a, str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn expression(&self) -> &Expression<'a> {
        &self.expression
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectClause<'a> {
    pub(crate) distinct: bool,
    pub(crate) selections: Vec<SqlSelection<'a>>,
}

impl<'a> SelectClause<'a> {
    pub fn selections(&self) -> &[SqlSelection<'a>] {
        &self.selections
    }
}

/// A single `select` block.
///
/// ```rust
/// # use dialect_sql::ast::*;
/// let query = QuerySpec::root()
///     .from(TableGroup::new(NamedTableReference::new("employee").alias("e")))
///     .column(Expression::column("e", "name"))
///     .so_that(Expression::column("e", "id").equals(param("id", SqlType::BigInt)));
///
/// assert_eq!(1, query.select_clause().selections().len());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuerySpec<'a> {
    pub(crate) root: bool,
    pub(crate) select_clause: SelectClause<'a>,
    pub(crate) from_clause: FromClause<'a>,
    pub(crate) restriction: Option<Predicate<'a>>,
    pub(crate) group_by: Vec<Expression<'a>>,
    pub(crate) having: Option<Predicate<'a>>,
    pub(crate) sort: Vec<SortSpecification<'a>>,
    pub(crate) offset: Option<Expression<'a>>,
    pub(crate) fetch: Option<Expression<'a>>,
    pub(crate) fetch_type: FetchClauseType,
}

impl<'a> QuerySpec<'a> {
    /// The root query of a statement.
    pub fn root() -> Self {
        Self {
            root: true,
            ..Default::default()
        }
    }

    /// A subquery or a member of a query group.
    pub fn sub_query() -> Self {
        Self::default()
    }

    pub fn from(mut self, group: TableGroup<'a>) -> Self {
        self.from_clause.roots.push(group);
        self
    }

    pub fn column(mut self, expression: impl Into<Expression<'a>>) -> Self {
        self.select_clause.selections.push(SqlSelection::new(expression));
        self
    }

    pub fn selection(mut self, selection: SqlSelection<'a>) -> Self {
        self.select_clause.selections.push(selection);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.select_clause.distinct = true;
        self
    }

    /// Adds a restriction, combined with `and` if one exists.
    pub fn so_that(mut self, predicate: impl Into<Predicate<'a>>) -> Self {
        self.restriction = Some(Predicate::and_optional(self.restriction.take(), predicate.into()));
        self
    }

    pub fn group_by(mut self, expression: impl Into<Expression<'a>>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    pub fn having(mut self, predicate: impl Into<Predicate<'a>>) -> Self {
        self.having = Some(Predicate::and_optional(self.having.take(), predicate.into()));
        self
    }

    pub fn order_by(mut self, sort: SortSpecification<'a>) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn offset(mut self, offset: impl Into<Expression<'a>>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn fetch(mut self, fetch: impl Into<Expression<'a>>) -> Self {
        self.fetch = Some(fetch.into());
        self
    }

    pub fn fetch_type(mut self, fetch_type: FetchClauseType) -> Self {
        self.fetch_type = fetch_type;
        self
    }

    pub fn select_clause(&self) -> &SelectClause<'a> {
        &self.select_clause
    }

    pub fn from_clause(&self) -> &FromClause<'a> {
        &self.from_clause
    }

    pub fn restriction(&self) -> Option<&Predicate<'a>> {
        self.restriction.as_ref()
    }
}

impl<'a> From<QuerySpec<'a>> for QueryPart<'a> {
    fn from(spec: QuerySpec<'a>) -> Self {
        QueryPart::Spec(Box::new(spec))
    }
}

/// Two or more query parts combined with a set operator.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryGroup<'a> {
    pub(crate) root: bool,
    pub(crate) set_operator: SetOperator,
    pub(crate) parts: Vec<QueryPart<'a>>,
    pub(crate) sort: Vec<SortSpecification<'a>>,
    pub(crate) offset: Option<Expression<'a>>,
    pub(crate) fetch: Option<Expression<'a>>,
    pub(crate) fetch_type: FetchClauseType,
}

impl<'a> QueryGroup<'a> {
    /// The leftmost query spec, which determines the selection list.
    pub fn first_query_spec(&self) -> &QuerySpec<'a> {
        match self.parts.first() {
            Some(part) => part.first_query_spec(),
            None => empty_spec(),
        }
    }

    pub fn new(set_operator: SetOperator, parts: Vec<QueryPart<'a>>) -> Self {
        Self {
            root: false,
            set_operator,
            parts,
            sort: Vec::new(),
            offset: None,
            fetch: None,
            fetch_type: FetchClauseType::default(),
        }
    }

    /// Marks the group as the root query of its statement.
    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn order_by(mut self, sort: SortSpecification<'a>) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn offset(mut self, offset: impl Into<Expression<'a>>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn fetch(mut self, fetch: impl Into<Expression<'a>>) -> Self {
        self.fetch = Some(fetch.into());
        self
    }

    pub fn fetch_type(mut self, fetch_type: FetchClauseType) -> Self {
        self.fetch_type = fetch_type;
        self
    }

    pub fn set_operator(&self) -> SetOperator {
        self.set_operator
    }

    pub fn parts(&self) -> &[QueryPart<'a>] {
        &self.parts
    }
}

impl<'a> From<QueryGroup<'a>> for QueryPart<'a> {
    fn from(group: QueryGroup<'a>) -> Self {
        QueryPart::Group(Box::new(group))
    }
}

/// A query spec or a query group.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPart<'a> {
    Spec(Box<QuerySpec<'a>>),
    Group(Box<QueryGroup<'a>>),
}

impl<'a> QueryPart<'a> {
    /// The leftmost query spec, which determines the selection list.
    pub fn first_query_spec(&self) -> &QuerySpec<'a> {
        match self {
            QueryPart::Spec(spec) => spec,
            QueryPart::Group(group) => group.first_query_spec(),
        }
    }

    pub fn as_spec(&self) -> Option<&QuerySpec<'a>> {
        match self {
            QueryPart::Spec(spec) => Some(spec),
            QueryPart::Group(_) => None,
        }
    }
}

fn empty_spec<'a>() -> &'a QuerySpec<'a> {
    static EMPTY: std::sync::OnceLock<QuerySpec<'static>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(QuerySpec::default)
}

/// Access to what a query part carries for ordering and pagination,
/// shared by query specs and query groups.
pub trait Paginated<'a> {
    fn is_root(&self) -> bool;

    fn is_group(&self) -> bool;

    fn sort_specifications(&self) -> &[SortSpecification<'a>];

    fn offset_expression(&self) -> Option<&Expression<'a>>;

    fn fetch_expression(&self) -> Option<&Expression<'a>>;

    fn fetch_clause_type(&self) -> FetchClauseType;

    fn has_sort_specifications(&self) -> bool {
        !self.sort_specifications().is_empty()
    }

    fn has_offset_or_fetch_clause(&self) -> bool {
        self.offset_expression().is_some() || self.fetch_expression().is_some()
    }
}

impl<'a> Paginated<'a> for QuerySpec<'a> {
    fn is_root(&self) -> bool {
        self.root
    }

    fn is_group(&self) -> bool {
        false
    }

    fn sort_specifications(&self) -> &[SortSpecification<'a>] {
        &self.sort
    }

    fn offset_expression(&self) -> Option<&Expression<'a>> {
        self.offset.as_ref()
    }

    fn fetch_expression(&self) -> Option<&Expression<'a>> {
        self.fetch.as_ref()
    }

    fn fetch_clause_type(&self) -> FetchClauseType {
        self.fetch_type
    }
}

impl<'a> Paginated<'a> for QueryGroup<'a> {
    fn is_root(&self) -> bool {
        self.root
    }

    fn is_group(&self) -> bool {
        true
    }

    fn sort_specifications(&self) -> &[SortSpecification<'a>] {
        &self.sort
    }

    fn offset_expression(&self) -> Option<&Expression<'a>> {
        self.offset.as_ref()
    }

    fn fetch_expression(&self) -> Option<&Expression<'a>> {
        self.fetch.as_ref()
    }

    fn fetch_clause_type(&self) -> FetchClauseType {
        self.fetch_type
    }
}

impl<'a> Paginated<'a> for QueryPart<'a> {
    fn is_root(&self) -> bool {
        match self {
            QueryPart::Spec(spec) => spec.is_root(),
            QueryPart::Group(group) => group.is_root(),
        }
    }

    fn is_group(&self) -> bool {
        matches!(self, QueryPart::Group(_))
    }

    fn sort_specifications(&self) -> &[SortSpecification<'a>] {
        match self {
            QueryPart::Spec(spec) => spec.sort_specifications(),
            QueryPart::Group(group) => group.sort_specifications(),
        }
    }

    fn offset_expression(&self) -> Option<&Expression<'a>> {
        match self {
            QueryPart::Spec(spec) => spec.offset_expression(),
            QueryPart::Group(group) => group.offset_expression(),
        }
    }

    fn fetch_expression(&self) -> Option<&Expression<'a>> {
        match self {
            QueryPart::Spec(spec) => spec.fetch_expression(),
            QueryPart::Group(group) => group.fetch_expression(),
        }
    }

    fn fetch_clause_type(&self) -> FetchClauseType {
        match self {
            QueryPart::Spec(spec) => spec.fetch_clause_type(),
            QueryPart::Group(group) => group.fetch_clause_type(),
        }
    }
}
