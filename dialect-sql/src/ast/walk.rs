//! Read-only structural queries over the statement tree.
use std::collections::BTreeSet;

use crate::ast::*;

impl<'a> Expression<'a> {
    /// True if an aggregate function is applied outside of a window.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::Function(function) => {
                function.aggregate || function.arguments.iter().any(Expression::contains_aggregate)
            }
            Expression::Arithmetic(arithmetic) => {
                arithmetic.lhs.contains_aggregate() || arithmetic.rhs.contains_aggregate()
            }
            Expression::CaseSearched(case) => {
                case.whens.iter().any(|(_, result)| result.contains_aggregate())
                    || case.otherwise.as_ref().is_some_and(Expression::contains_aggregate)
            }
            Expression::CaseSimple(case) => {
                case.operand.contains_aggregate()
                    || case.whens.iter().any(|(_, result)| result.contains_aggregate())
                    || case.otherwise.as_ref().is_some_and(Expression::contains_aggregate)
            }
            Expression::Tuple(expressions) => expressions.iter().any(Expression::contains_aggregate),
            Expression::Over(_)
            | Expression::Column(_)
            | Expression::Literal(_)
            | Expression::Parameter(_)
            | Expression::Summarization(_)
            | Expression::SubQuery(_)
            | Expression::Star => false,
        }
    }

    pub fn references_table(&self, table: &str) -> bool {
        match self {
            Expression::SubQuery(query) => query.references_table(table),
            Expression::Arithmetic(arithmetic) => {
                arithmetic.lhs.references_table(table) || arithmetic.rhs.references_table(table)
            }
            Expression::CaseSearched(case) => {
                case.whens
                    .iter()
                    .any(|(when, result)| when.references_table(table) || result.references_table(table))
                    || case.otherwise.as_ref().is_some_and(|e| e.references_table(table))
            }
            Expression::CaseSimple(case) => {
                case.operand.references_table(table)
                    || case
                        .whens
                        .iter()
                        .any(|(when, result)| when.references_table(table) || result.references_table(table))
                    || case.otherwise.as_ref().is_some_and(|e| e.references_table(table))
            }
            Expression::Tuple(expressions) => expressions.iter().any(|e| e.references_table(table)),
            Expression::Function(function) => function.arguments.iter().any(|e| e.references_table(table)),
            Expression::Over(over) => over.expression.references_table(table),
            _ => false,
        }
    }

    /// Collects the table aliases columns in this expression are qualified
    /// with, not descending into subqueries.
    pub fn collect_qualifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            Expression::Column(column) => {
                if let Some(qualifier) = column.qualifier() {
                    out.insert(qualifier.to_string());
                }
            }
            Expression::Arithmetic(arithmetic) => {
                arithmetic.lhs.collect_qualifiers(out);
                arithmetic.rhs.collect_qualifiers(out);
            }
            Expression::CaseSearched(case) => {
                for (when, result) in case.whens.iter() {
                    when.collect_qualifiers(out);
                    result.collect_qualifiers(out);
                }

                if let Some(otherwise) = &case.otherwise {
                    otherwise.collect_qualifiers(out);
                }
            }
            Expression::CaseSimple(case) => {
                case.operand.collect_qualifiers(out);

                for (when, result) in case.whens.iter() {
                    when.collect_qualifiers(out);
                    result.collect_qualifiers(out);
                }

                if let Some(otherwise) = &case.otherwise {
                    otherwise.collect_qualifiers(out);
                }
            }
            Expression::Tuple(expressions) => expressions.iter().for_each(|e| e.collect_qualifiers(out)),
            Expression::Function(function) => function.arguments.iter().for_each(|e| e.collect_qualifiers(out)),
            Expression::Over(over) => over.expression.collect_qualifiers(out),
            _ => (),
        }
    }
}

impl<'a> Predicate<'a> {
    pub fn references_table(&self, table: &str) -> bool {
        match self {
            Predicate::Comparison(comparison) => {
                comparison.lhs.references_table(table) || comparison.rhs.references_table(table)
            }
            Predicate::Like(like) => like.expression.references_table(table) || like.pattern.references_table(table),
            Predicate::InList(in_list) => {
                in_list.expression.references_table(table) || in_list.list.iter().any(|e| e.references_table(table))
            }
            Predicate::InArray(in_array) => in_array.expression.references_table(table),
            Predicate::InSubQuery(in_sub) => {
                in_sub.expression.references_table(table) || in_sub.query.references_table(table)
            }
            Predicate::Exists(exists) => exists.query.references_table(table),
            Predicate::NullCheck(check) => check.expression.references_table(table),
            Predicate::Between(between) => {
                between.expression.references_table(table)
                    || between.lower.references_table(table)
                    || between.upper.references_table(table)
            }
            Predicate::Junction(junction) => junction.predicates.iter().any(|p| p.references_table(table)),
            Predicate::Negated(inner) => inner.references_table(table),
            Predicate::BooleanExpression(boolean) => boolean.expression.references_table(table),
        }
    }

    pub fn collect_qualifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            Predicate::Comparison(comparison) => {
                comparison.lhs.collect_qualifiers(out);
                comparison.rhs.collect_qualifiers(out);
            }
            Predicate::Like(like) => {
                like.expression.collect_qualifiers(out);
                like.pattern.collect_qualifiers(out);
            }
            Predicate::InList(in_list) => {
                in_list.expression.collect_qualifiers(out);
                in_list.list.iter().for_each(|e| e.collect_qualifiers(out));
            }
            Predicate::InArray(in_array) => in_array.expression.collect_qualifiers(out),
            Predicate::InSubQuery(in_sub) => in_sub.expression.collect_qualifiers(out),
            Predicate::Exists(_) => (),
            Predicate::NullCheck(check) => check.expression.collect_qualifiers(out),
            Predicate::Between(between) => {
                between.expression.collect_qualifiers(out);
                between.lower.collect_qualifiers(out);
                between.upper.collect_qualifiers(out);
            }
            Predicate::Junction(junction) => junction.predicates.iter().for_each(|p| p.collect_qualifiers(out)),
            Predicate::Negated(inner) => inner.collect_qualifiers(out),
            Predicate::BooleanExpression(boolean) => boolean.expression.collect_qualifiers(out),
        }
    }
}

impl<'a> TableGroup<'a> {
    pub fn references_table(&self, table: &str) -> bool {
        let primary = match &self.primary {
            TableReference::Named(named) => named.name() == table,
            TableReference::Derived(derived) => derived.query.references_table(table),
            TableReference::Function(function) => function.function.arguments.iter().any(|e| e.references_table(table)),
            TableReference::Values(values) => values
                .rows
                .iter()
                .any(|row| row.0.iter().any(|e| e.references_table(table))),
            TableReference::Union(union) => union.sql.contains(table),
        };

        primary
            || self.joins.iter().any(|join| {
                join.group.references_table(table) || join.predicate.as_ref().is_some_and(|p| p.references_table(table))
            })
    }

    /// All identification variables of this group and its joins.
    pub fn collect_aliases(&self, out: &mut BTreeSet<String>) {
        if let Some(alias) = self.primary.identification_variable() {
            out.insert(alias.to_string());
        }

        for join in self.joins.iter() {
            join.group.collect_aliases(out);
        }
    }
}

impl<'a> FromClause<'a> {
    pub fn references_table(&self, table: &str) -> bool {
        self.roots.iter().any(|root| root.references_table(table))
    }

    pub fn aliases(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();

        for root in self.roots.iter() {
            root.collect_aliases(&mut out);
        }

        out
    }
}

impl<'a> QuerySpec<'a> {
    /// Aggregates in the selection or `having` clause.
    pub fn has_aggregate_functions(&self) -> bool {
        self.select_clause
            .selections
            .iter()
            .any(|selection| selection.expression.contains_aggregate())
            || self.having.is_some()
    }

    pub fn references_table(&self, table: &str) -> bool {
        self.from_clause.references_table(table)
            || self
                .select_clause
                .selections
                .iter()
                .any(|s| s.expression.references_table(table))
            || self.restriction.as_ref().is_some_and(|p| p.references_table(table))
            || self.having.as_ref().is_some_and(|p| p.references_table(table))
    }
}

impl<'a> QueryPart<'a> {
    /// True if the query reads the named table anywhere, subqueries included.
    pub fn references_table(&self, table: &str) -> bool {
        match self {
            QueryPart::Spec(spec) => spec.references_table(table),
            QueryPart::Group(group) => group.parts.iter().any(|part| part.references_table(table)),
        }
    }
}
