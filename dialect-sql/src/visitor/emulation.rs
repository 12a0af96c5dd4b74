//! Rewrites shared by translators whose database lacks a construct.
use std::{borrow::Cow, collections::BTreeSet};

use tracing::trace;

use super::{Clause, Result, SelectionAliases, Visitor};
use crate::{ast::*, dialect::Capability, error::Error};

/// A query part borrowed from the tree, spec or group.
#[derive(Clone, Copy)]
pub(crate) enum PartRef<'r, 'a> {
    Spec(&'r QuerySpec<'a>),
    Group(&'r QueryGroup<'a>),
}

impl<'r, 'a> PartRef<'r, 'a> {
    fn paginated(self) -> &'r dyn Paginated<'a> {
        match self {
            PartRef::Spec(spec) => spec,
            PartRef::Group(group) => group,
        }
    }

    fn first_query_spec(self) -> &'r QuerySpec<'a> {
        match self {
            PartRef::Spec(spec) => spec,
            PartRef::Group(group) => group.first_query_spec(),
        }
    }
}

/// Applies offset and fetch through an outer query filtering on a row
/// number computed by the wrapped query:
///
/// `select r_0_.c0 from (select e.name c0,row_number() over(order by ...) rn from ...) r_0_ where r_0_.rn>? and r_0_.rn<=?+?`
pub(crate) fn emulate_fetch_offset_with_window_functions<V: Visitor>(v: &mut V, part: PartRef<'_, '_>) -> Result {
    let paginated = part.paginated();

    if !v.supports(Capability::WindowFunctions) {
        let feature = if paginated.offset_expression().is_some() {
            "offset clause"
        } else {
            "fetch clause of this type"
        };

        return Err(v.unsupported(feature));
    }

    let selections = part.first_query_spec().select_clause.selections();
    let names: Vec<String> = (0..selections.len()).map(|i| format!("c{i}")).collect();
    let alias = format!("r_{}_", v.state_mut().next_alias_number());
    let depth = v.state().query_part_depth();

    trace!(
        target: "dialect_sql::translate",
        alias = alias.as_str(),
        depth,
        group = paginated.is_group(),
        "emulating offset/fetch with a row number"
    );

    let saved_row_numbering = v.state().row_numbering_depth;
    let saved_aliases = v.state().selection_aliases.clone();

    let result = v.with_query_part(paginated, |v| {
        let outer_aliases = v.state().forced_selection_aliases().map(|names| names.to_vec());

        v.with_clause(Clause::Select, |v| {
            v.write("select ")?;

            for (i, selection) in selections.iter().enumerate() {
                if i > 0 {
                    v.write(",")?;
                }

                v.write(format_args!("{alias}.{}", names[i]))?;

                let outer_alias = outer_aliases
                    .as_ref()
                    .and_then(|aliases| aliases.get(i).map(|a| a.as_str()))
                    .or(selection.alias.as_deref());

                if let Some(outer_alias) = outer_alias {
                    v.write(" ")?;
                    v.write(outer_alias)?;
                }
            }

            Ok(())
        })?;

        v.write(" from (")?;

        match part {
            PartRef::Spec(spec) => {
                let state = v.state_mut();
                state.row_numbering_depth = Some(depth + 2);
                state.selection_aliases = Some(SelectionAliases {
                    depth: depth + 2,
                    names: names.clone(),
                });

                v.visit_query_spec(spec)?;
            }
            PartRef::Group(group) => {
                let first = part.first_query_spec();
                let mut sort = Vec::with_capacity(group.sort.len());

                for spec in group.sort.iter() {
                    match group_sort_index(first, &spec.expression) {
                        Some(index) => sort.push(spec.with_expression(Expression::column("q_", format!("c{index}")))),
                        None => return Err(v.unsupported("ordering a paginated query group by an unselected expression")),
                    }
                }

                let wrapper = QuerySpec::sub_query();

                v.with_query_part(&wrapper, |v| {
                    v.write("select q_.*")?;
                    render_row_numbering_columns(v, &sort, group.fetch_type, group.fetch.is_some())?;
                    v.write(" from (")?;

                    let state = v.state_mut();
                    state.row_numbering_depth = Some(depth + 3);
                    state.selection_aliases = Some(SelectionAliases {
                        depth: depth + 3,
                        names: names.clone(),
                    });

                    v.visit_query_group(group)?;
                    v.write(") q_")
                })?;
            }
        }

        let state = v.state_mut();
        state.row_numbering_depth = saved_row_numbering;
        state.selection_aliases = saved_aliases.clone();

        v.write(") ")?;
        v.write(&alias)?;

        let offset = paginated.offset_expression();
        let fetch = paginated.fetch_expression();
        let fetch_type = paginated.fetch_clause_type();

        v.write(" where ")?;

        v.with_clause(Clause::Where, |v| {
            if let Some(offset) = offset {
                v.write(format_args!("{alias}.rn>"))?;
                v.visit_expression(offset)?;
            }

            if let Some(fetch) = fetch {
                if offset.is_some() {
                    v.write(" and ")?;
                }

                let column = if fetch_type.is_with_ties() { "rnk" } else { "rn" };
                v.write(format_args!("{alias}.{column}<="))?;

                if fetch_type.is_percent() {
                    v.write(format_args!("ceil({alias}.cnt*"))?;
                    v.visit_expression(fetch)?;
                    v.write("/100e0)")?;
                } else {
                    v.visit_expression(fetch)?;
                }

                if let Some(offset) = offset {
                    v.write("+")?;
                    v.visit_expression(offset)?;
                }
            }

            Ok(())
        })?;

        if paginated.has_sort_specifications() && paginated.is_root() {
            v.write(format_args!(" order by {alias}.rn"))?;
        }

        Ok(())
    });

    let state = v.state_mut();
    state.row_numbering_depth = saved_row_numbering;
    state.selection_aliases = saved_aliases;

    result
}

/// Position of a group's sort item in the selections of its first member:
/// a one-based ordinal, a selected expression or a selection alias.
fn group_sort_index(first: &QuerySpec<'_>, expression: &Expression<'_>) -> Option<usize> {
    let selections = first.select_clause.selections();

    match expression {
        Expression::Literal(Literal::Integer(n)) if *n >= 1 && (*n as usize) <= selections.len() => {
            Some(*n as usize - 1)
        }
        Expression::Column(column) if column.qualifier().is_none() => selections
            .iter()
            .position(|selection| selection.alias.as_deref() == Some(column.name()))
            .or_else(|| selections.iter().position(|selection| &selection.expression == expression)),
        other => selections.iter().position(|selection| &selection.expression == other),
    }
}

/// The row number columns of the query spec targeted by the emulation.
pub(crate) fn render_row_numbering_selections<V: Visitor>(v: &mut V, spec: &QuerySpec<'_>) -> Result {
    render_row_numbering_columns(v, &spec.sort, spec.fetch_type, spec.fetch.is_some())
}

fn render_row_numbering_columns<V: Visitor>(
    v: &mut V,
    sort: &[SortSpecification<'_>],
    fetch_type: FetchClauseType,
    has_fetch: bool,
) -> Result {
    v.write(",")?;
    v.render_row_number(sort)?;
    v.write(" rn")?;

    if has_fetch && fetch_type.is_with_ties() {
        v.write(",rank() over(order by ")?;

        if sort.is_empty() {
            v.write("1")?;
        } else {
            v.visit_sort_specifications(sort)?;
        }

        v.write(") rnk")?;
    }

    if has_fetch && fetch_type.is_percent() {
        v.write(",count(*) over() cnt")?;
    }

    Ok(())
}

/// Splits a query with a `full join` into the union of a `left join` and
/// a `right join` that only keeps the rows the left join did not produce.
pub(crate) fn emulate_full_join<V: Visitor>(v: &mut V, spec: &QuerySpec<'_>) -> Result {
    if spec.has_offset_or_fetch_clause() {
        return Err(v.unsupported("full join with offset or fetch"));
    }

    if !spec.group_by.is_empty() || spec.having.is_some() || spec.has_aggregate_functions() {
        return Err(v.unsupported("full join with aggregation"));
    }

    let mut left = spec.clone();
    left.root = false;
    left.sort.clear();

    let mut right = left.clone();

    let left_ids = rewrite_first_full_join(&mut left.from_clause.roots, JoinType::Left)
        .ok_or_else(|| Error::assertion("full join emulation without a full join"))?;

    rewrite_first_full_join(&mut right.from_clause.roots, JoinType::Right);

    let operator = match left_ids.len() {
        0 => SetOperator::Union,
        1 => {
            let null_check = left_ids.into_iter().next().map(|id| id.is_null());
            if let Some(null_check) = null_check {
                right.restriction = Some(Predicate::and_optional(right.restriction.take(), null_check));
            }

            SetOperator::UnionAll
        }
        _ => {
            let null_check = Expression::Tuple(left_ids).is_null();
            right.restriction = Some(Predicate::and_optional(right.restriction.take(), null_check));

            SetOperator::UnionAll
        }
    };

    let selections = spec.select_clause.selections();
    let mut sort = Vec::with_capacity(spec.sort.len());

    for item in spec.sort.iter() {
        match selections.iter().position(|selection| selection.expression == item.expression) {
            Some(index) => sort.push(item.with_expression(Expression::from((index + 1) as i64))),
            None => return Err(v.unsupported("ordering an emulated full join by an unselected expression")),
        }
    }

    trace!(target: "dialect_sql::translate", ?operator, "emulating full join");

    let mut group = QueryGroup::new(operator, vec![left.into(), right.into()]);
    group.root = spec.root;
    group.sort = sort;

    v.visit_query_group(&group)
}

/// Turns the first `full join` into the given type and returns the
/// identifier columns of the group on its left side.
fn rewrite_first_full_join<'a>(groups: &mut [TableGroup<'a>], join_type: JoinType) -> Option<Vec<Expression<'a>>> {
    for group in groups.iter_mut() {
        let ids = group.identifier_columns();

        for join in group.joins.iter_mut() {
            if join.join_type == JoinType::Full {
                join.join_type = join_type;
                return Some(ids);
            }

            if let Some(nested) = rewrite_first_full_join(std::slice::from_mut(&mut join.group), join_type) {
                return Some(nested);
            }
        }
    }

    None
}

/// Joins the subquery uncorrelated and moves its correlation into an
/// `exists (... intersect ...)` on the join predicate.
pub(crate) fn render_lateral_join_with_intersect<V: Visitor>(
    v: &mut V,
    join: &TableGroupJoin<'_>,
    derived: &DerivedTableReference<'_>,
) -> Result {
    let spec = match derived.query.as_ref() {
        QueryPart::Spec(spec) => spec,
        QueryPart::Group(_) => return Err(v.unsupported("lateral subquery with set operators")),
    };

    let emulatable = !spec.root
        && !spec.has_offset_or_fetch_clause()
        && spec.group_by.is_empty()
        && !spec.has_aggregate_functions()
        && !v.state().in_lateral
        && v.supports(Capability::Intersect);

    if !emulatable {
        return Err(v.unsupported("lateral subquery"));
    }

    let names: Vec<String> = spec
        .select_clause
        .selections()
        .iter()
        .enumerate()
        .map(|(i, selection)| {
            derived
                .column_names
                .get(i)
                .map(|name| name.to_string())
                .or_else(|| selection.alias.as_ref().map(|alias| alias.to_string()))
                .or_else(|| match &selection.expression {
                    Expression::Column(column) => Some(column.name.to_string()),
                    _ => None,
                })
                .unwrap_or_else(|| format!("c{i}"))
        })
        .collect();

    let mut uncorrelated = spec.clone();
    uncorrelated.restriction = None;
    uncorrelated.sort.clear();

    let mut correlated = spec.clone();
    correlated.sort.clear();

    trace!(target: "dialect_sql::translate", alias = %derived.alias, "emulating lateral join");

    let join_type = match join.join_type {
        JoinType::Cross => JoinType::Inner,
        other => other,
    };

    v.write(join_type.sql_text())?;

    let depth = v.state().query_part_depth();
    let saved_aliases = v.state_mut().selection_aliases.replace(SelectionAliases {
        depth: depth + 1,
        names: names.clone(),
    });

    let saved_lateral = std::mem::replace(&mut v.state_mut().in_lateral, true);

    let result = v.surround_with("(", ")", |v| v.visit_query_spec(&uncorrelated));
    v.state_mut().selection_aliases = saved_aliases;

    let result = result.and_then(|_| {
        v.write(" ")?;
        v.write(&derived.alias)?;
        v.write(" on ")?;

        match &join.predicate {
            Some(Predicate::Junction(junction)) if junction.nature == JunctionNature::Or => {
                v.surround_with("(", ")", |v| v.visit_junction(junction))?;
                v.write(" and ")?;
            }
            Some(predicate) => {
                v.visit_predicate(predicate)?;
                v.write(" and ")?;
            }
            None => (),
        }

        v.write("exists (select ")?;
        v.visit_separated(&names, ",", |v, name| v.write(format_args!("{}.{name}", derived.alias)))?;
        v.render_from_dual()?;
        v.write(" intersect ")?;
        v.visit_query_spec(&correlated)?;
        v.write(")")
    });

    v.state_mut().in_lateral = saved_lateral;
    result?;

    for nested in join.group.joins.iter() {
        v.visit_table_group_join(nested)?;
    }

    Ok(())
}

/// Names the columns of a derived table through selection aliases, for
/// databases without `alias(a,b)` after a derived table.
pub(crate) fn render_derived_table_with_selection_aliases<V: Visitor>(
    v: &mut V,
    derived: &DerivedTableReference<'_>,
) -> Result {
    let depth = v.state().query_part_depth();
    let names = derived.column_names.iter().map(|name| name.to_string()).collect();

    let saved = v
        .state_mut()
        .selection_aliases
        .replace(SelectionAliases { depth: depth + 1, names });

    let result = v.surround_with("(", ")", |v| v.visit_query_part(&derived.query));
    v.state_mut().selection_aliases = saved;
    result?;

    v.write(" ")?;
    v.write(&derived.alias)
}

/// `select ?,? union all select ?,?`, the first select optionally naming
/// the columns.
pub(crate) fn render_values_list_as_union<V: Visitor>(
    v: &mut V,
    rows: &[Values<'_>],
    aliases: Option<&[Cow<'_, str>]>,
) -> Result {
    let mode = v.union_values_parameter_mode();

    v.with_parameter_mode(mode, |v| {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                v.write(" union all ")?;
            }

            v.write("select ")?;

            for (j, expression) in row.expressions().iter().enumerate() {
                if j > 0 {
                    v.write(",")?;
                }

                v.visit_expression(expression)?;

                if i == 0 {
                    if let Some(name) = aliases.and_then(|names| names.get(j)) {
                        v.write(" ")?;
                        v.write(name)?;
                    }
                }
            }

            v.render_from_dual()?;
        }

        Ok(())
    })
}

/// `case when x is null then 0 else 1 end`, sorted before the expression.
pub(crate) fn render_null_precedence_with_case<V: Visitor>(
    v: &mut V,
    expression: &Expression<'_>,
    nulls: NullPrecedence,
) -> Result {
    let (null_rank, other_rank) = match nulls {
        NullPrecedence::First => (0, 1),
        NullPrecedence::Last => (1, 0),
    };

    v.write("case when ")?;
    v.visit_expression(expression)?;
    v.write(format_args!(" is null then {null_rank} else {other_rank} end"))
}

/// Decomposes a row value comparison into comparisons of its elements.
pub(crate) fn render_tuple_comparison<'a, V: Visitor>(
    v: &mut V,
    lhs: &[Expression<'a>],
    operator: ComparisonOperator,
    rhs: &Expression<'a>,
) -> Result {
    let rhs = match rhs {
        Expression::Tuple(elements) if elements.len() == lhs.len() => elements,
        Expression::SubQuery(query) if matches!(operator, ComparisonOperator::Equal | ComparisonOperator::NotEqual) => {
            let negated = operator == ComparisonOperator::NotEqual;
            return render_tuple_in_sub_query_as_exists(v, lhs, query, negated);
        }
        Expression::SubQuery(query) if operator.is_ordering() => {
            return render_tuple_ordering_against_sub_query(v, lhs, operator, query);
        }
        Expression::SubQuery(_) => return Err(v.unsupported("row value distinctness against a subquery")),
        _ => return Err(Error::assertion("row value comparison needs a tuple of the same arity")),
    };

    let pairs: Vec<_> = lhs.iter().zip(rhs.iter()).collect();

    match operator {
        ComparisonOperator::Equal | ComparisonOperator::NotDistinctFrom => {
            v.visit_separated(&pairs, " and ", |v, (l, r)| v.render_comparison(l, operator, r))
        }
        ComparisonOperator::NotEqual | ComparisonOperator::DistinctFrom => v.surround_with("(", ")", |v| {
            v.visit_separated(&pairs, " or ", |v, (l, r)| v.render_comparison(l, operator, r))
        }),
        _ => {
            let strict = match operator {
                ComparisonOperator::LessThan | ComparisonOperator::LessThanOrEqual => ComparisonOperator::LessThan,
                _ => ComparisonOperator::GreaterThan,
            };

            v.surround_with("(", ")", |v| {
                for i in 0..pairs.len() {
                    if i > 0 {
                        v.write(" or ")?;
                    }

                    for (l, r) in pairs.iter().take(i) {
                        v.render_comparison(l, ComparisonOperator::Equal, r)?;
                        v.write(" and ")?;
                    }

                    let (l, r) = pairs[i];
                    let operator = if i + 1 == pairs.len() { operator } else { strict };
                    v.render_comparison(l, operator, r)?;
                }

                Ok(())
            })
        }
    }
}

/// `case when a=b or a is null and b is null then 0 else 1 end=1`
pub(crate) fn render_distinct_from_with_case<V: Visitor>(
    v: &mut V,
    lhs: &Expression<'_>,
    operator: ComparisonOperator,
    rhs: &Expression<'_>,
) -> Result {
    v.write("case when ")?;
    v.visit_expression(lhs)?;
    v.write("=")?;
    v.visit_expression(rhs)?;
    v.write(" or ")?;
    v.visit_expression(lhs)?;
    v.write(" is null and ")?;
    v.visit_expression(rhs)?;
    v.write(" is null then 0 else 1 end=")?;

    match operator {
        ComparisonOperator::DistinctFrom => v.write("1"),
        _ => v.write("0"),
    }
}

/// `(a,b) in ((1,2),(3,4))` as `(a=1 and b=2 or a=3 and b=4)`.
pub(crate) fn render_tuple_in_list<'a, V: Visitor>(
    v: &mut V,
    lhs: &[Expression<'a>],
    list: &[Expression<'a>],
    negated: bool,
) -> Result {
    let (begin, end) = if negated { ("not(", ")") } else { ("(", ")") };

    v.surround_with(begin, end, |v| {
        for (i, row) in list.iter().enumerate() {
            if i > 0 {
                v.write(" or ")?;
            }

            render_tuple_comparison(v, lhs, ComparisonOperator::Equal, row)?;
        }

        Ok(())
    })
}

/// `(a,b) in (select x,y from t where r)` as
/// `exists (select 1 from t where r and x=a and y=b)`.
pub(crate) fn render_tuple_in_sub_query_as_exists<'a, V: Visitor>(
    v: &mut V,
    lhs: &[Expression<'a>],
    query: &QueryPart<'a>,
    negated: bool,
) -> Result {
    let spec = match query {
        QueryPart::Spec(spec) if !spec.has_offset_or_fetch_clause() && spec.group_by.is_empty() => spec,
        _ => return Err(v.unsupported("row value in a subquery with set operators, grouping or pagination")),
    };

    let selections = spec.select_clause.selections();

    if selections.len() != lhs.len() {
        return Err(Error::assertion("row value and subquery selection differ in arity"));
    }

    let mut exists = QuerySpec::sub_query().column(1);
    exists.from_clause = spec.from_clause.clone();
    exists.restriction = spec.restriction.clone();

    for (selection, element) in selections.iter().zip(lhs.iter()) {
        let equality = selection.expression.clone().equals(element.clone());
        exists.restriction = Some(Predicate::and_optional(exists.restriction.take(), equality));
    }

    v.write(if negated { "not exists " } else { "exists " })?;
    v.render_sub_query(&QueryPart::from(exists))
}

/// `(a,b)<(select x,y from t where r)` as
/// `exists (select 1 from t where r and (a<x or a=x and b<y))`.
/// A subquery yielding more than one row matches when any of them does.
fn render_tuple_ordering_against_sub_query<'a, V: Visitor>(
    v: &mut V,
    lhs: &[Expression<'a>],
    operator: ComparisonOperator,
    query: &QueryPart<'a>,
) -> Result {
    let spec = match query {
        QueryPart::Spec(spec) if !spec.has_offset_or_fetch_clause() && spec.group_by.is_empty() => spec,
        _ => return Err(v.unsupported("row value compared to a subquery with set operators, grouping or pagination")),
    };

    let selections: Vec<Expression<'a>> = spec
        .select_clause
        .selections()
        .iter()
        .map(|selection| selection.expression.clone())
        .collect();

    if selections.len() != lhs.len() {
        return Err(Error::assertion("row value and subquery selection differ in arity"));
    }

    let mut exists = QuerySpec::sub_query().column(1);
    exists.from_clause = spec.from_clause.clone();

    let ordering = Predicate::comparison(Expression::Tuple(lhs.to_vec()), operator, Expression::Tuple(selections));
    exists.restriction = Some(Predicate::and_optional(spec.restriction.clone(), ordering));

    v.write("exists ")?;
    v.render_sub_query(&QueryPart::from(exists))
}

/// Materializes a subquery reading the DML target through a derived table.
pub(crate) fn render_self_referencing_sub_query<V: Visitor>(v: &mut V, query: &QueryPart<'_>) -> Result {
    let alias = format!("dt_{}_", v.state_mut().next_alias_number());

    v.write("(select * from ")?;
    v.surround_with("(", ")", |v| v.visit_query_part(query))?;
    v.write(format_args!(" {alias})"))
}

/// The restriction of an update or delete with a `from` clause, expressed
/// on the target alone.
fn driving_restriction<'a, V: Visitor>(
    v: &V,
    target: &NamedTableReference<'a>,
    from: &FromClause<'a>,
    restriction: Option<&Predicate<'a>>,
) -> Predicate<'a> {
    let ids = TableGroup::new(target.clone()).identifier_columns();

    if ids.len() == 1 || (ids.len() > 1 && v.supports(Capability::RowValueEquality)) {
        let key = match ids.len() {
            1 => ids[0].clone(),
            _ => Expression::Tuple(ids.clone()),
        };

        let mut query = QuerySpec::sub_query().from(TableGroup::new(target.clone()));
        query.from_clause.roots.extend(from.roots.iter().cloned());
        query.select_clause.selections = ids.into_iter().map(SqlSelection::new).collect();
        query.restriction = restriction.cloned();

        key.in_selection(query)
    } else {
        let mut query = QuerySpec::sub_query().column(1);
        query.from_clause = from.clone();
        query.restriction = restriction.cloned();

        Predicate::exists(query)
    }
}

/// True when an assigned value reads one of the joined tables.
pub(crate) fn assigns_from_joined_tables(assignments: &[Assignment<'_>], from: &FromClause<'_>) -> bool {
    let aliases = from.aliases();
    let mut qualifiers = BTreeSet::new();

    for assignment in assignments.iter() {
        assignment.value.collect_qualifiers(&mut qualifiers);
    }

    qualifiers.iter().any(|qualifier| aliases.contains(qualifier))
}

/// The driving subquery cannot provide values read from the joined tables.
fn ensure_values_independent_of<V: Visitor>(v: &V, assignments: &[Assignment<'_>], from: &FromClause<'_>) -> Result {
    if assigns_from_joined_tables(assignments, from) {
        return Err(v.unsupported("update assigning values from joined tables"));
    }

    Ok(())
}

/// `update t a set ... where a.id in (select a.id from t a,<from> where ...)`
pub(crate) fn render_update_with_driving_subquery<V: Visitor>(v: &mut V, update: &UpdateStatement<'_>) -> Result {
    ensure_values_independent_of(v, &update.assignments, &update.from_clause)?;

    let mut rewritten = update.clone();
    rewritten.from_clause = FromClause::default();
    rewritten.restriction = Some(driving_restriction(
        v,
        &update.target,
        &update.from_clause,
        update.restriction.as_ref(),
    ));

    v.visit_update_statement_only_standard(&rewritten)
}

/// `delete from t a where a.id in (select a.id from t a,<from> where ...)`
pub(crate) fn render_delete_with_driving_subquery<V: Visitor>(v: &mut V, delete: &DeleteStatement<'_>) -> Result {
    let mut rewritten = delete.clone();
    rewritten.from_clause = FromClause::default();
    rewritten.restriction = Some(driving_restriction(
        v,
        &delete.target,
        &delete.from_clause,
        delete.restriction.as_ref(),
    ));

    v.visit_delete_statement_only_standard(&rewritten)
}

/// `merge into t a using (select a.id k0_,<value> v0_ from t a,<from> where ...) s_ on (a.id=s_.k0_) when matched then update set c=s_.v0_`
pub(crate) fn render_update_with_merge<V: Visitor>(v: &mut V, update: &UpdateStatement<'_>) -> Result {
    if !update.returning.is_empty() {
        return Err(v.unsupported("returning clause on an update emulated with merge"));
    }

    let ids = TableGroup::new(update.target.clone()).identifier_columns();

    if ids.is_empty() {
        return Err(v.unsupported("update assigning values from joined tables to a target without identifier columns"));
    }

    let source = "s_";

    let mut driving = QuerySpec::sub_query().from(TableGroup::new(update.target.clone()));
    driving.from_clause.roots.extend(update.from_clause.roots.iter().cloned());
    driving.restriction = update.restriction.clone();

    for (i, id) in ids.iter().enumerate() {
        driving.select_clause.selections.push(SqlSelection::new(id.clone()).alias(format!("k{i}_")));
    }

    let mut assignments = Vec::with_capacity(update.assignments.len());

    for (i, assignment) in update.assignments.iter().enumerate() {
        let column = match assignment.columns.as_slice() {
            [column] => column.clone(),
            _ => return Err(v.unsupported("row assignment in an update emulated with merge")),
        };

        driving.select_clause
            .selections
            .push(SqlSelection::new(assignment.value.clone()).alias(format!("v{i}_")));

        assignments.push(Assignment::new(column, Expression::column(source, format!("v{i}_"))));
    }

    trace!(target: "dialect_sql::translate", table = %update.target.name, "emulating update with merge");

    v.with_clause(Clause::Merge, |v| {
        v.write("merge into ")?;
        v.render_dml_target_table(&update.target)?;
        v.write(" using ")?;
        v.surround_with("(", ")", |v| v.visit_query_spec(&driving))?;
        v.write(format_args!(" {source} on ("))?;

        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                v.write(" and ")?;
            }

            v.visit_expression(id)?;
            v.write(format_args!("={source}.k{i}_"))?;
        }

        v.write(")")?;
        v.render_merge_when_matched_update(&assignments, None)
    })
}
