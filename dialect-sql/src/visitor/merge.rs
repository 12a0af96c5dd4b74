//! `merge` renderings of insert conflicts and optional table writes.
use std::borrow::Cow;

use super::{Clause, Result, Visitor};
use crate::{ast::*, dialect::Capability};

/// An insert with a conflict clause as a `merge` matching the proposed rows
/// on the conflict columns:
///
/// `merge into t using (values (?,?)) excluded(a,b) on (t.a=excluded.a) when not matched then insert (a,b) values (excluded.a,excluded.b) when matched then update set b=excluded.b`
pub(crate) fn render_insert_as_merge<V: Visitor>(
    v: &mut V,
    insert: &InsertStatement<'_>,
    conflict: &ConflictClause<'_>,
) -> Result {
    if conflict.constraint_name.is_some() && conflict.is_do_update() {
        return Err(v.unsupported("conflict clause naming a constraint with do update"));
    }

    if conflict.constraint_columns.is_empty() {
        if conflict.is_do_update() {
            return Err(v.unsupported("conflict clause with do update but no conflict columns"));
        }

        // Runs as a plain insert, the caller ignores the violation.
        let name = conflict.constraint_name().unwrap_or_default().to_string();
        v.state_mut().unique_constraint_name = Some(name);

        return v.visit_insert_statement_only_standard(insert);
    }

    let columns: Vec<Cow<'_, str>> = insert.columns.iter().map(|column| column.name.clone()).collect();
    let qualifier = insert.target.qualifier().to_string();

    v.with_clause(Clause::Merge, |v| {
        v.write("merge into ")?;
        v.render_dml_target_table(&insert.target)?;
        v.write(" using ")?;
        render_insert_source(v, &insert.source, &columns)?;

        v.write(" on (")?;
        v.visit_separated(&conflict.constraint_columns, " and ", |v, column| {
            v.write(format_args!("{qualifier}.{column}={EXCLUDED}.{column}"))
        })?;
        v.write(")")?;

        render_when_not_matched_insert(v, &columns, EXCLUDED)?;

        if conflict.is_do_update() {
            v.with_clause(Clause::Conflict, |v| {
                v.render_merge_when_matched_update(&conflict.assignments, conflict.predicate.as_ref())
            })?;
        }

        Ok(())
    })?;

    v.visit_returning_columns(&insert.returning)
}

fn render_insert_source<V: Visitor>(v: &mut V, source: &InsertSource<'_>, columns: &[Cow<'_, str>]) -> Result {
    let mode = v.merge_source_parameter_mode();

    v.with_parameter_mode(mode, |v| match source {
        InsertSource::Values(rows) => {
            let values = ValuesTableReference::new(rows.clone(), EXCLUDED, columns.iter().cloned());
            v.visit_values_table_reference(&values)
        }
        InsertSource::Select(query) => {
            let derived = DerivedTableReference::new(query.as_ref().clone(), EXCLUDED).columns(columns.iter().cloned());
            v.visit_derived_table_reference(&derived)
        }
    })
}

fn render_when_not_matched_insert<V: Visitor>(v: &mut V, columns: &[Cow<'_, str>], source: &str) -> Result {
    v.write(" when not matched then insert ")?;
    v.surround_with("(", ")", |v| v.visit_separated(columns, ",", |v, column| v.write(column)))?;
    v.write(" values ")?;
    v.surround_with("(", ")", |v| {
        v.visit_separated(columns, ",", |v, column| v.write(format_args!("{source}.{column}")))
    })
}

/// Writes a row of an optional table through a `merge` keyed on the key
/// columns. With an optimistic lock, the update only matches the expected
/// version.
pub(crate) fn render_optional_table_update_as_merge<V: Visitor>(v: &mut V, upsert: &OptionalTableUpdate<'_>) -> Result {
    if !v.supports(Capability::Merge) {
        return Err(v.unsupported("merge"));
    }

    let source = "s";
    let qualifier = upsert.table.qualifier().to_string();
    let columns: Vec<Cow<'_, str>> = upsert.all_bindings().map(|binding| binding.column.clone()).collect();
    let row = Values(upsert.all_bindings().map(|binding| binding.value.clone()).collect());

    let assignments: Vec<Assignment<'_>> = upsert
        .value_bindings
        .iter()
        .map(|binding| {
            Assignment::new(
                ColumnReference::unqualified(binding.column.clone()),
                Expression::column(source, binding.column.clone()),
            )
        })
        .collect();

    let version_check = upsert
        .optimistic_lock
        .as_ref()
        .map(|lock| Expression::column(qualifier.clone(), lock.column.clone()).equals(lock.value.clone()));

    v.with_clause(Clause::Merge, |v| {
        v.write("merge into ")?;
        v.render_dml_target_table(&upsert.table)?;
        v.write(" using ")?;

        let mode = v.merge_source_parameter_mode();
        let values = ValuesTableReference::new(vec![row], source, columns.iter().cloned());
        v.with_parameter_mode(mode, |v| v.visit_values_table_reference(&values))?;

        v.write(" on (")?;
        v.visit_separated(&upsert.key_bindings, " and ", |v, key| {
            v.write(format_args!("{qualifier}.{column}={source}.{column}", column = key.column))
        })?;
        v.write(")")?;

        render_when_not_matched_insert(v, &columns, source)?;

        if assignments.is_empty() {
            return Ok(());
        }

        v.render_merge_when_matched_update(&assignments, version_check.as_ref())
    })
}
