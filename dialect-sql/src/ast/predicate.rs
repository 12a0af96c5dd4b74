use crate::ast::{Expression, QueryPart};

/// Comparison operators, including the null-safe pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    DistinctFrom,
    NotDistinctFrom,
}

impl ComparisonOperator {
    pub fn sql_text(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::DistinctFrom => " is distinct from ",
            ComparisonOperator::NotDistinctFrom => " is not distinct from ",
        }
    }

    /// The operator producing the opposite result.
    pub fn negate(self) -> Self {
        match self {
            ComparisonOperator::Equal => ComparisonOperator::NotEqual,
            ComparisonOperator::NotEqual => ComparisonOperator::Equal,
            ComparisonOperator::LessThan => ComparisonOperator::GreaterThanOrEqual,
            ComparisonOperator::GreaterThan => ComparisonOperator::LessThanOrEqual,
            ComparisonOperator::LessThanOrEqual => ComparisonOperator::GreaterThan,
            ComparisonOperator::GreaterThanOrEqual => ComparisonOperator::LessThan,
            ComparisonOperator::DistinctFrom => ComparisonOperator::NotDistinctFrom,
            ComparisonOperator::NotDistinctFrom => ComparisonOperator::DistinctFrom,
        }
    }

    /// The operator to use when both operands swap sides.
    pub fn invert(self) -> Self {
        match self {
            ComparisonOperator::LessThan => ComparisonOperator::GreaterThan,
            ComparisonOperator::GreaterThan => ComparisonOperator::LessThan,
            ComparisonOperator::LessThanOrEqual => ComparisonOperator::GreaterThanOrEqual,
            ComparisonOperator::GreaterThanOrEqual => ComparisonOperator::LessThanOrEqual,
            other => other,
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            ComparisonOperator::LessThan
                | ComparisonOperator::GreaterThan
                | ComparisonOperator::LessThanOrEqual
                | ComparisonOperator::GreaterThanOrEqual
        )
    }

    pub fn is_distinctness(self) -> bool {
        matches!(
            self,
            ComparisonOperator::DistinctFrom | ComparisonOperator::NotDistinctFrom
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison<'a> {
    pub(crate) lhs: Expression<'a>,
    pub(crate) operator: ComparisonOperator,
    pub(crate) rhs: Expression<'a>,
}

impl<'a> Comparison<'a> {
    pub fn lhs(&self) -> &Expression<'a> {
        &self.lhs
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn rhs(&self) -> &Expression<'a> {
        &self.rhs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikePredicate<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) pattern: Expression<'a>,
    pub(crate) escape: Option<Expression<'a>>,
    pub(crate) negated: bool,
    pub(crate) case_sensitive: bool,
}

impl<'a> LikePredicate<'a> {
    pub fn escape(mut self, escape: impl Into<Expression<'a>>) -> Self {
        self.escape = Some(escape.into());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn negated(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

impl<'a> From<LikePredicate<'a>> for Predicate<'a> {
    fn from(like: LikePredicate<'a>) -> Self {
        Predicate::Like(Box::new(like))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InListPredicate<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) list: Vec<Expression<'a>>,
    pub(crate) negated: bool,
}

/// `x in (<elements of the bound array>)`
#[derive(Debug, Clone, PartialEq)]
pub struct InArrayPredicate<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) array: Expression<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InSubQueryPredicate<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) query: QueryPart<'a>,
    pub(crate) negated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExistsPredicate<'a> {
    pub(crate) query: QueryPart<'a>,
    pub(crate) negated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullnessPredicate<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) negated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BetweenPredicate<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) lower: Expression<'a>,
    pub(crate) upper: Expression<'a>,
    pub(crate) negated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionNature {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Junction<'a> {
    pub(crate) nature: JunctionNature,
    pub(crate) predicates: Vec<Predicate<'a>>,
}

/// A boolean-valued expression used where a predicate is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanExpressionPredicate<'a> {
    pub(crate) expression: Expression<'a>,
    pub(crate) negated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<'a> {
    Comparison(Box<Comparison<'a>>),
    Like(Box<LikePredicate<'a>>),
    InList(Box<InListPredicate<'a>>),
    InArray(Box<InArrayPredicate<'a>>),
    InSubQuery(Box<InSubQueryPredicate<'a>>),
    Exists(Box<ExistsPredicate<'a>>),
    NullCheck(Box<NullnessPredicate<'a>>),
    Between(Box<BetweenPredicate<'a>>),
    Junction(Junction<'a>),
    Negated(Box<Predicate<'a>>),
    BooleanExpression(Box<BooleanExpressionPredicate<'a>>),
}

impl<'a> Predicate<'a> {
    pub fn comparison(lhs: impl Into<Expression<'a>>, operator: ComparisonOperator, rhs: impl Into<Expression<'a>>) -> Self {
        Predicate::Comparison(Box::new(Comparison {
            lhs: lhs.into(),
            operator,
            rhs: rhs.into(),
        }))
    }

    pub fn exists(query: impl Into<QueryPart<'a>>) -> Self {
        Predicate::Exists(Box::new(ExistsPredicate {
            query: query.into(),
            negated: false,
        }))
    }

    pub fn not_exists(query: impl Into<QueryPart<'a>>) -> Self {
        Predicate::Exists(Box::new(ExistsPredicate {
            query: query.into(),
            negated: true,
        }))
    }

    pub fn boolean(expression: impl Into<Expression<'a>>) -> Self {
        Predicate::BooleanExpression(Box::new(BooleanExpressionPredicate {
            expression: expression.into(),
            negated: false,
        }))
    }

    pub fn conjunction(predicates: Vec<Predicate<'a>>) -> Self {
        Predicate::Junction(Junction {
            nature: JunctionNature::And,
            predicates,
        })
    }

    pub fn disjunction(predicates: Vec<Predicate<'a>>) -> Self {
        Predicate::Junction(Junction {
            nature: JunctionNature::Or,
            predicates,
        })
    }

    /// Combines with `other` using `and`, flattening nested conjunctions.
    pub fn and(self, other: Predicate<'a>) -> Self {
        match self {
            Predicate::Junction(Junction {
                nature: JunctionNature::And,
                mut predicates,
            }) => {
                predicates.push(other);
                Predicate::conjunction(predicates)
            }
            this => Predicate::conjunction(vec![this, other]),
        }
    }

    pub fn or(self, other: Predicate<'a>) -> Self {
        match self {
            Predicate::Junction(Junction {
                nature: JunctionNature::Or,
                mut predicates,
            }) => {
                predicates.push(other);
                Predicate::disjunction(predicates)
            }
            this => Predicate::disjunction(vec![this, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Negated(Box::new(self))
    }

    /// Combines an optional restriction with another predicate.
    pub fn and_optional(restriction: Option<Predicate<'a>>, other: Predicate<'a>) -> Self {
        match restriction {
            Some(restriction) => restriction.and(other),
            None => other,
        }
    }
}

/// Fluent predicate construction on anything that converts into an
/// expression.
///
/// ```rust
/// # use dialect_sql::ast::*;
/// let name = Predicate::from(Expression::column("e", "name").like("A%"));
/// let p = name.and(Expression::column("e", "age").greater_than(18));
/// assert!(matches!(p, Predicate::Junction(_)));
/// ```
pub trait Comparable<'a> {
    fn compare(self, operator: ComparisonOperator, rhs: impl Into<Expression<'a>>) -> Predicate<'a>;

    fn like(self, pattern: impl Into<Expression<'a>>) -> LikePredicate<'a>;

    fn in_list<T>(self, list: impl IntoIterator<Item = T>) -> Predicate<'a>
    where
        T: Into<Expression<'a>>;

    fn not_in_list<T>(self, list: impl IntoIterator<Item = T>) -> Predicate<'a>
    where
        T: Into<Expression<'a>>;

    fn in_array(self, array: impl Into<Expression<'a>>) -> Predicate<'a>;

    fn in_selection(self, query: impl Into<QueryPart<'a>>) -> Predicate<'a>;

    fn not_in_selection(self, query: impl Into<QueryPart<'a>>) -> Predicate<'a>;

    fn is_null(self) -> Predicate<'a>;

    fn is_not_null(self) -> Predicate<'a>;

    fn between(self, lower: impl Into<Expression<'a>>, upper: impl Into<Expression<'a>>) -> Predicate<'a>;

    fn equals(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::Equal, rhs)
    }

    fn not_equals(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::NotEqual, rhs)
    }

    fn less_than(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::LessThan, rhs)
    }

    fn less_than_or_equals(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::LessThanOrEqual, rhs)
    }

    fn greater_than(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::GreaterThan, rhs)
    }

    fn greater_than_or_equals(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::GreaterThanOrEqual, rhs)
    }

    fn is_distinct_from(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::DistinctFrom, rhs)
    }

    fn is_not_distinct_from(self, rhs: impl Into<Expression<'a>>) -> Predicate<'a>
    where
        Self: Sized,
    {
        self.compare(ComparisonOperator::NotDistinctFrom, rhs)
    }
}

impl<'a, T> Comparable<'a> for T
where
    T: Into<Expression<'a>>,
{
    fn compare(self, operator: ComparisonOperator, rhs: impl Into<Expression<'a>>) -> Predicate<'a> {
        Predicate::comparison(self, operator, rhs)
    }

    fn like(self, pattern: impl Into<Expression<'a>>) -> LikePredicate<'a> {
        LikePredicate {
            expression: self.into(),
            pattern: pattern.into(),
            escape: None,
            negated: false,
            case_sensitive: true,
        }
    }

    fn in_list<U>(self, list: impl IntoIterator<Item = U>) -> Predicate<'a>
    where
        U: Into<Expression<'a>>,
    {
        Predicate::InList(Box::new(InListPredicate {
            expression: self.into(),
            list: list.into_iter().map(Into::into).collect(),
            negated: false,
        }))
    }

    fn not_in_list<U>(self, list: impl IntoIterator<Item = U>) -> Predicate<'a>
    where
        U: Into<Expression<'a>>,
    {
        Predicate::InList(Box::new(InListPredicate {
            expression: self.into(),
            list: list.into_iter().map(Into::into).collect(),
            negated: true,
        }))
    }

    fn in_array(self, array: impl Into<Expression<'a>>) -> Predicate<'a> {
        Predicate::InArray(Box::new(InArrayPredicate {
            expression: self.into(),
            array: array.into(),
        }))
    }

    fn in_selection(self, query: impl Into<QueryPart<'a>>) -> Predicate<'a> {
        Predicate::InSubQuery(Box::new(InSubQueryPredicate {
            expression: self.into(),
            query: query.into(),
            negated: false,
        }))
    }

    fn not_in_selection(self, query: impl Into<QueryPart<'a>>) -> Predicate<'a> {
        Predicate::InSubQuery(Box::new(InSubQueryPredicate {
            expression: self.into(),
            query: query.into(),
            negated: true,
        }))
    }

    fn is_null(self) -> Predicate<'a> {
        Predicate::NullCheck(Box::new(NullnessPredicate {
            expression: self.into(),
            negated: false,
        }))
    }

    fn is_not_null(self) -> Predicate<'a> {
        Predicate::NullCheck(Box::new(NullnessPredicate {
            expression: self.into(),
            negated: true,
        }))
    }

    fn between(self, lower: impl Into<Expression<'a>>, upper: impl Into<Expression<'a>>) -> Predicate<'a> {
        Predicate::Between(Box::new(BetweenPredicate {
            expression: self.into(),
            lower: lower.into(),
            upper: upper.into(),
            negated: false,
        }))
    }
}
