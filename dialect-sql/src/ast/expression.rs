use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use std::borrow::Cow;

use crate::ast::{Predicate, QueryPart, SortSpecification};

/// The resolved JDBC-level type of an expression. Drives every type-sensitive
/// rendering decision: comparisons of non-comparable types, integer
/// division and typed `null` literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Numeric,
    Float,
    Double,
    Char,
    Varchar,
    NVarchar,
    Clob,
    NClob,
    Blob,
    Varbinary,
    Date,
    Time,
    Timestamp,
    Xml,
    Json,
    /// A named array type, e.g. `StringArray`.
    Array(String),
    #[default]
    Unknown,
}

impl SqlType {
    pub fn is_integral(&self) -> bool {
        matches!(self, SqlType::SmallInt | SqlType::Integer | SqlType::BigInt)
    }

    pub fn is_character_lob(&self) -> bool {
        matches!(self, SqlType::Clob | SqlType::NClob)
    }

    pub fn is_lob(&self) -> bool {
        self.is_character_lob() || matches!(self, SqlType::Blob)
    }

    /// The standard name used in `cast(... as <name>)`.
    pub fn cast_name(&self) -> &str {
        match self {
            SqlType::Boolean => "boolean",
            SqlType::SmallInt => "smallint",
            SqlType::Integer => "integer",
            SqlType::BigInt => "bigint",
            SqlType::Numeric => "numeric",
            SqlType::Float => "real",
            SqlType::Double => "double precision",
            SqlType::Char => "char",
            SqlType::Varchar | SqlType::Unknown => "varchar(4000)",
            SqlType::NVarchar => "nvarchar(4000)",
            SqlType::Clob => "clob",
            SqlType::NClob => "nclob",
            SqlType::Blob => "blob",
            SqlType::Varbinary => "varbinary(4000)",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Timestamp => "timestamp",
            SqlType::Xml => "xml",
            SqlType::Json => "json",
            SqlType::Array(name) => name,
        }
    }
}

/// A reference to a column, optionally qualified by a table alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReference<'a> {
    pub(crate) qualifier: Option<Cow<'a, str>>,
    pub(crate) name: Cow<'a, str>,
    pub(crate) sql_type: SqlType,
}

impl<'a> ColumnReference<'a> {
    pub fn new(qualifier: impl Into<Cow<'a, str>>, name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
            sql_type: SqlType::Unknown,
        }
    }

    pub fn unqualified(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
            sql_type: SqlType::Unknown,
        }
    }

    /// Sets the resolved column type.
    pub fn typed(mut self, sql_type: SqlType) -> Self {
        self.sql_type = sql_type;
        self
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &SqlType {
        &self.sql_type
    }

    /// The same column, referenced through another table alias.
    pub fn requalified(&self, qualifier: impl Into<Cow<'a, str>>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: self.name.clone(),
            sql_type: self.sql_type.clone(),
        }
    }
}

/// Constant values rendered inline into the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal<'a> {
    Null(SqlType),
    Boolean(bool),
    Integer(i64),
    Numeric(BigDecimal),
    Double(f64),
    Text(Cow<'a, str>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Literal<'_> {
    pub fn sql_type(&self) -> SqlType {
        match self {
            Literal::Null(typ) => typ.clone(),
            Literal::Boolean(_) => SqlType::Boolean,
            Literal::Integer(_) => SqlType::BigInt,
            Literal::Numeric(_) => SqlType::Numeric,
            Literal::Double(_) => SqlType::Double,
            Literal::Text(_) => SqlType::Varchar,
            Literal::Date(_) => SqlType::Date,
            Literal::Timestamp(_) => SqlType::Timestamp,
        }
    }
}

/// A JDBC parameter. Rendered as a placeholder; every rendering adds one
/// binder to the resulting operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<'a> {
    pub(crate) name: Cow<'a, str>,
    pub(crate) sql_type: SqlType,
}

impl<'a> Parameter<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &SqlType {
        &self.sql_type
    }
}

/// A named, typed parameter.
///
/// ```rust
/// # use dialect_sql::ast::*;
/// let p = param("id", SqlType::BigInt);
/// assert!(matches!(p, Expression::Parameter(_)));
/// ```
pub fn param<'a>(name: impl Into<Cow<'a, str>>, sql_type: SqlType) -> Expression<'a> {
    Expression::Parameter(Parameter {
        name: name.into(),
        sql_type,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOperator {
    pub fn sql_text(self) -> &'static str {
        match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Subtract => "-",
            ArithmeticOperator::Multiply => "*",
            ArithmeticOperator::Divide => "/",
            ArithmeticOperator::Modulo => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryArithmetic<'a> {
    pub(crate) lhs: Expression<'a>,
    pub(crate) operator: ArithmeticOperator,
    pub(crate) rhs: Expression<'a>,
    pub(crate) result_type: SqlType,
}

impl BinaryArithmetic<'_> {
    /// Both operands are integral and the operator divides.
    pub fn is_integer_division(&self) -> bool {
        self.operator == ArithmeticOperator::Divide
            && self.lhs.sql_type().map(|t| t.is_integral()).unwrap_or(false)
            && self.rhs.sql_type().map(|t| t.is_integral()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseSearched<'a> {
    pub(crate) whens: Vec<(Predicate<'a>, Expression<'a>)>,
    pub(crate) otherwise: Option<Expression<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseSimple<'a> {
    pub(crate) operand: Expression<'a>,
    pub(crate) whens: Vec<(Expression<'a>, Expression<'a>)>,
    pub(crate) otherwise: Option<Expression<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Rows,
    Range,
    Groups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameExclusion {
    NoOthers,
    CurrentRow,
    Group,
    Ties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub start: FrameBound,
    pub end: FrameBound,
    pub exclusion: FrameExclusion,
}

impl Frame {
    /// `range between unbounded preceding and current row`, what an empty
    /// `over()` means.
    pub fn is_default(&self) -> bool {
        self.start == FrameBound::UnboundedPreceding
            && self.end == FrameBound::CurrentRow
            && self.exclusion == FrameExclusion::NoOthers
    }
}

/// A window function application.
#[derive(Debug, Clone, PartialEq)]
pub struct Over<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) partitions: Vec<Expression<'a>>,
    pub(crate) order: Vec<SortSpecification<'a>>,
    pub(crate) frame: Option<Frame>,
}

impl<'a> Over<'a> {
    pub fn new(expression: impl Into<Expression<'a>>) -> Self {
        Self {
            expression: expression.into(),
            partitions: Vec::new(),
            order: Vec::new(),
            frame: None,
        }
    }

    pub fn partition_by(mut self, expression: impl Into<Expression<'a>>) -> Self {
        self.partitions.push(expression.into());
        self
    }

    pub fn order_by(mut self, sort: SortSpecification<'a>) -> Self {
        self.order.push(sort);
        self
    }

    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    /// No partitioning, no ordering and the default frame.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty() && self.order.is_empty() && self.frame.map(|f| f.is_default()).unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression<'a> {
    pub(crate) name: Cow<'a, str>,
    pub(crate) arguments: Vec<Expression<'a>>,
    pub(crate) return_type: SqlType,
    pub(crate) aggregate: bool,
}

impl<'a> FunctionExpression<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            return_type: SqlType::Unknown,
            aggregate: false,
        }
    }

    /// An aggregate function such as `count` or `max`.
    pub fn aggregate(name: impl Into<Cow<'a, str>>) -> Self {
        Self {
            aggregate: true,
            ..Self::new(name)
        }
    }

    pub fn argument(mut self, argument: impl Into<Expression<'a>>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn returns(mut self, sql_type: SqlType) -> Self {
        self.return_type = sql_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarizationKind {
    Rollup,
    Cube,
}

impl SummarizationKind {
    pub fn sql_text(self) -> &'static str {
        match self {
            SummarizationKind::Rollup => "rollup",
            SummarizationKind::Cube => "cube",
        }
    }
}

/// A `group by rollup(...)` or `group by cube(...)` item.
#[derive(Debug, Clone, PartialEq)]
pub struct Summarization<'a> {
    pub(crate) kind: SummarizationKind,
    pub(crate) groupings: Vec<Expression<'a>>,
}

impl<'a> Summarization<'a> {
    pub fn new(kind: SummarizationKind, groupings: Vec<Expression<'a>>) -> Self {
        Self { kind, groupings }
    }
}

/// An expression in the statement tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<'a> {
    Column(ColumnReference<'a>),
    Literal(Literal<'a>),
    Parameter(Parameter<'a>),
    Arithmetic(Box<BinaryArithmetic<'a>>),
    CaseSearched(Box<CaseSearched<'a>>),
    CaseSimple(Box<CaseSimple<'a>>),
    /// A row value constructor, `(a,b)`.
    Tuple(Vec<Expression<'a>>),
    Over(Box<Over<'a>>),
    Function(FunctionExpression<'a>),
    Summarization(Summarization<'a>),
    SubQuery(Box<QueryPart<'a>>),
    /// The `*` in `count(*)`.
    Star,
}

impl<'a> Expression<'a> {
    pub fn column(qualifier: impl Into<Cow<'a, str>>, name: impl Into<Cow<'a, str>>) -> Self {
        Expression::Column(ColumnReference::new(qualifier, name))
    }

    pub fn null(sql_type: SqlType) -> Self {
        Expression::Literal(Literal::Null(sql_type))
    }

    pub fn arithmetic(
        lhs: impl Into<Expression<'a>>,
        operator: ArithmeticOperator,
        rhs: impl Into<Expression<'a>>,
        result_type: SqlType,
    ) -> Self {
        Expression::Arithmetic(Box::new(BinaryArithmetic {
            lhs: lhs.into(),
            operator,
            rhs: rhs.into(),
            result_type,
        }))
    }

    pub fn case_searched(whens: Vec<(Predicate<'a>, Expression<'a>)>, otherwise: Option<Expression<'a>>) -> Self {
        Expression::CaseSearched(Box::new(CaseSearched { whens, otherwise }))
    }

    pub fn case_simple(
        operand: impl Into<Expression<'a>>,
        whens: Vec<(Expression<'a>, Expression<'a>)>,
        otherwise: Option<Expression<'a>>,
    ) -> Self {
        Expression::CaseSimple(Box::new(CaseSimple {
            operand: operand.into(),
            whens,
            otherwise,
        }))
    }

    pub fn tuple<T>(expressions: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<Expression<'a>>,
    {
        Expression::Tuple(expressions.into_iter().map(Into::into).collect())
    }

    pub fn sub_query(query: impl Into<QueryPart<'a>>) -> Self {
        Expression::SubQuery(Box::new(query.into()))
    }

    /// The resolved type, when the expression has a single one.
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Expression::Column(column) => Some(column.sql_type.clone()),
            Expression::Literal(literal) => Some(literal.sql_type()),
            Expression::Parameter(parameter) => Some(parameter.sql_type.clone()),
            Expression::Arithmetic(arithmetic) => Some(arithmetic.result_type.clone()),
            Expression::CaseSearched(case) => case.whens.first().and_then(|(_, result)| result.sql_type()),
            Expression::CaseSimple(case) => case.whens.first().and_then(|(_, result)| result.sql_type()),
            Expression::Tuple(expressions) if expressions.len() == 1 => expressions[0].sql_type(),
            Expression::Over(over) => over.expression.sql_type(),
            Expression::Function(function) => Some(function.return_type.clone()),
            Expression::Tuple(_) | Expression::Summarization(_) | Expression::SubQuery(_) | Expression::Star => {
                None
            }
        }
    }

    /// The number of columns the expression spans.
    pub fn column_count(&self) -> usize {
        match self {
            Expression::Tuple(expressions) => expressions.len(),
            Expression::SubQuery(query) => query.first_query_spec().select_clause.selections.len(),
            _ => 1,
        }
    }

    /// The expressions of a tuple, or the expression itself.
    pub fn tuple_elements(&self) -> Vec<&Expression<'a>> {
        match self {
            Expression::Tuple(expressions) => expressions.iter().collect(),
            other => vec![other],
        }
    }
}

impl<'a> From<ColumnReference<'a>> for Expression<'a> {
    fn from(column: ColumnReference<'a>) -> Self {
        Expression::Column(column)
    }
}

impl<'a> From<Literal<'a>> for Expression<'a> {
    fn from(literal: Literal<'a>) -> Self {
        Expression::Literal(literal)
    }
}

impl<'a> From<FunctionExpression<'a>> for Expression<'a> {
    fn from(function: FunctionExpression<'a>) -> Self {
        Expression::Function(function)
    }
}

impl<'a> From<Over<'a>> for Expression<'a> {
    fn from(over: Over<'a>) -> Self {
        Expression::Over(Box::new(over))
    }
}

impl<'a> From<Summarization<'a>> for Expression<'a> {
    fn from(summarization: Summarization<'a>) -> Self {
        Expression::Summarization(summarization)
    }
}

impl From<i64> for Expression<'_> {
    fn from(value: i64) -> Self {
        Expression::Literal(Literal::Integer(value))
    }
}

impl From<i32> for Expression<'_> {
    fn from(value: i32) -> Self {
        Expression::Literal(Literal::Integer(value as i64))
    }
}

impl From<bool> for Expression<'_> {
    fn from(value: bool) -> Self {
        Expression::Literal(Literal::Boolean(value))
    }
}

impl<'a> From<&'a str> for Expression<'a> {
    fn from(value: &'a str) -> Self {
        Expression::Literal(Literal::Text(Cow::Borrowed(value)))
    }
}

impl From<String> for Expression<'_> {
    fn from(value: String) -> Self {
        Expression::Literal(Literal::Text(Cow::Owned(value)))
    }
}

impl From<NaiveDate> for Expression<'_> {
    fn from(value: NaiveDate) -> Self {
        Expression::Literal(Literal::Date(value))
    }
}

impl From<NaiveDateTime> for Expression<'_> {
    fn from(value: NaiveDateTime) -> Self {
        Expression::Literal(Literal::Timestamp(value))
    }
}

impl From<BigDecimal> for Expression<'_> {
    fn from(value: BigDecimal) -> Self {
        Expression::Literal(Literal::Numeric(value))
    }
}

/// `count(*)`
pub fn count_star<'a>() -> FunctionExpression<'a> {
    FunctionExpression::aggregate("count")
        .argument(Expression::Star)
        .returns(SqlType::BigInt)
}

/// `row_number()`
pub fn row_number<'a>() -> FunctionExpression<'a> {
    FunctionExpression::new("row_number").returns(SqlType::BigInt)
}
