use super::{mysql, on_duplicate_key, Result, Visitor};
use crate::ast::*;

translator!(
    /// A translator for MariaDB 10.3 and later. Shares most of its rendering
    /// with MySQL; `returning` is only available on inserts and deletes.
    MariaDb
);

impl Visitor for MariaDb {
    translation_accessors!();

    fn render_limit_offset(&mut self, offset: Option<&Expression<'_>>, fetch: Option<&Expression<'_>>) -> Result {
        mysql::render_limit_offset(self, offset, fetch)
    }

    fn render_text_literal(&mut self, value: &str) -> Result {
        mysql::render_text_literal(self, value)
    }

    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        mysql::render_cast_type(sql_type)
    }

    fn render_integer_division(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        mysql::render_integer_division(self, lhs, rhs)
    }

    fn render_partition_item(&mut self, expression: &Expression<'_>) -> Result {
        mysql::render_partition_item(self, expression)
    }

    fn visit_summarization(&mut self, summarization: &Summarization<'_>) -> Result {
        mysql::render_summarization(self, summarization)
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn supports_derived_column_list(&self) -> bool {
        false
    }

    fn render_missing_like_escape(&mut self) -> Result {
        self.write(" escape ''")
    }

    fn visit_in_array_predicate(&mut self, _in_array: &InArrayPredicate<'_>) -> Result {
        Err(self.unsupported("in array predicate"))
    }

    fn render_for_update_clause(&mut self, options: LockOptions) -> Result {
        match options.mode {
            LockMode::None => Ok(()),
            LockMode::PessimisticRead => self.write(" lock in share mode"),
            LockMode::PessimisticWrite => {
                self.write(" for update")?;
                self.render_lock_wait(options.wait, " nowait", " skip locked")
            }
        }
    }

    fn visit_insert_statement_only(&mut self, insert: &InsertStatement<'_>) -> Result {
        on_duplicate_key::render_insert_on_duplicate_key(self, insert)
    }

    fn visit_optional_table_update(&mut self, upsert: &OptionalTableUpdate<'_>) -> Result {
        self.begin_dml(&upsert.table);
        on_duplicate_key::render_optional_table_update_on_duplicate_key(self, upsert)
    }

    fn visit_update_statement_only(&mut self, update: &UpdateStatement<'_>) -> Result {
        if !update.returning.is_empty() {
            return Err(self.unsupported("returning clause on an update"));
        }

        mysql::render_update(self, update)
    }

    fn render_assigned_column(&mut self, column: &ColumnReference<'_>) -> Result {
        mysql::render_assigned_column(self, column)
    }

    fn visit_delete_statement_only(&mut self, delete: &DeleteStatement<'_>) -> Result {
        mysql::render_delete(self, delete)
    }
}
