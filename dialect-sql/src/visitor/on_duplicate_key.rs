//! `insert ... on duplicate key update` renderings for MySQL and MariaDB.
use std::borrow::Cow;

use super::{Clause, Result, Visitor};
use crate::{ast::*, dialect::Capability, error::Error};

/// Whether the proposed row is referenced through a row alias, `as excluded`,
/// rather than the `values(c)` function.
fn uses_row_alias<V: Visitor>(v: &V, source: &InsertSource<'_>) -> bool {
    v.supports(Capability::InsertRowAlias) && matches!(source, InsertSource::Values(_))
}

pub(crate) fn render_insert_on_duplicate_key<V: Visitor>(v: &mut V, insert: &InsertStatement<'_>) -> Result {
    let conflict = match &insert.conflict {
        Some(conflict) => conflict,
        None => return v.visit_insert_statement_only_standard(insert),
    };

    if conflict.constraint_name.is_some() && conflict.is_do_update() {
        return Err(v.unsupported("conflict clause naming a constraint with do update"));
    }

    let row_alias = uses_row_alias(v, &insert.source);

    v.with_clause(Clause::Insert, |v| {
        v.write("insert into ")?;
        v.write(&insert.target.name)?;
        v.render_insert_columns(&insert.columns)?;
        v.write(" ")?;
        v.visit_insert_source(&insert.source)?;

        if row_alias {
            v.write(format_args!(" as {EXCLUDED}"))?;
        }

        Ok(())
    })?;

    v.write(" on duplicate key update ")?;

    let previous = std::mem::replace(&mut v.state_mut().excluded_as_values_function, !row_alias);

    let result = v.with_clause(Clause::Conflict, |v| {
        if conflict.is_do_nothing() {
            let column = insert
                .columns
                .first()
                .ok_or_else(|| Error::assertion("insert without columns cannot ignore duplicates"))?;

            return v.write(format_args!("{name}={name}", name = column.name));
        }

        // `@upd` holds the predicate as it was before the first assignment.
        for (i, assignment) in conflict.assignments.iter().enumerate() {
            let column = match assignment.columns.as_slice() {
                [column] => column,
                _ => return Err(v.unsupported("row assignment in a conflict clause")),
            };

            if i > 0 {
                v.write(",")?;
            }

            v.render_assigned_column(column)?;
            v.write("=")?;

            match &conflict.predicate {
                Some(predicate) if i == 0 => {
                    v.write("if((@upd:=")?;
                    v.surround_with("(", ")", |v| v.visit_predicate(predicate))?;
                    v.write("),")?;
                }
                Some(_) => v.write("if(@upd,")?,
                None => {
                    v.visit_expression(&assignment.value)?;
                    continue;
                }
            }

            v.visit_expression(&assignment.value)?;
            v.write(",")?;
            v.write(&column.name)?;
            v.write(")")?;
        }

        Ok(())
    });

    v.state_mut().excluded_as_values_function = previous;
    result?;

    v.visit_returning_columns(&insert.returning)
}

/// Writes a row of an optional table as an insert updating the existing row
/// on a duplicate key. An optimistic lock captures the current version in
/// `@ver` and only takes the proposed values while it matches.
pub(crate) fn render_optional_table_update_on_duplicate_key<V: Visitor>(
    v: &mut V,
    upsert: &OptionalTableUpdate<'_>,
) -> Result {
    let row_alias = v.supports(Capability::InsertRowAlias);
    let columns: Vec<ColumnReference<'_>> = upsert
        .all_bindings()
        .map(|binding| ColumnReference::unqualified(binding.column.clone()))
        .collect();

    let row = Values(upsert.all_bindings().map(|binding| binding.value.clone()).collect());

    v.with_clause(Clause::Insert, |v| {
        v.write("insert into ")?;
        v.write(&upsert.table.name)?;
        v.render_insert_columns(&columns)?;
        v.write(" ")?;
        v.with_clause(Clause::Values, |v| v.visit_values_list(std::slice::from_ref(&row)))?;

        if row_alias {
            v.write(format_args!(" as {EXCLUDED}"))?;
        }

        Ok(())
    })?;

    v.write(" on duplicate key update ")?;

    let excluded = |column: &str| -> String {
        if row_alias {
            format!("{EXCLUDED}.{column}")
        } else {
            format!("values({column})")
        }
    };

    if upsert.value_bindings.is_empty() {
        let key = upsert
            .key_bindings
            .first()
            .ok_or_else(|| Error::assertion("optional table update without key columns"))?;

        return v.write(format_args!("{name}={name}", name = key.column));
    }

    // The version column is assigned last so the others still see its old value.
    let mut bindings: Vec<&ColumnValueBinding<'_>> = upsert.value_bindings.iter().collect();

    if let Some(lock) = &upsert.optimistic_lock {
        bindings.sort_by_key(|binding| binding.column == lock.column);
    }

    v.with_clause(Clause::Set, |v| {
        for (i, binding) in bindings.iter().enumerate() {
            if i > 0 {
                v.write(",")?;
            }

            let column: &Cow<'_, str> = &binding.column;
            let value = excluded(column.as_ref());

            match &upsert.optimistic_lock {
                None => v.write(format_args!("{column}={value}"))?,
                Some(lock) => {
                    if i == 0 {
                        v.write(format_args!("{column}=if((@ver:={version})=", version = lock.column))?;
                    } else {
                        v.write(format_args!("{column}=if(@ver="))?;
                    }

                    v.visit_expression(&lock.value)?;
                    v.write(format_args!(",{value},{column})"))?;
                }
            }
        }

        Ok(())
    })
}
