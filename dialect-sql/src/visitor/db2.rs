use super::{Clause, ParameterRenderingMode, Result, Visitor};
use crate::{
    ast::*,
    dialect::{Capability, Db2Variant},
};

translator!(
    /// A translator for DB2 on Linux/Unix/Windows, IBM i and z/OS.
    ///
    /// Untyped parameter markers are rejected in select lists and `values`
    /// rows, so parameters there are rendered inside a cast. Returned
    /// columns are read from the `final table` or `old table` of the
    /// statement.
    Db2
);

impl Db2 {
    /// Versions with null precedence, `is distinct from` and `skip locked data`.
    fn is_modern(&self) -> bool {
        let version = self.dialect().version();

        match self.dialect().db2_variant() {
            Db2Variant::Luw => version.is_same_or_after(11, 1, 0),
            Db2Variant::IbmI => version.is_same_or_after(7, 3, 0),
            Db2Variant::ZOs => version.is_same_or_after(12, 0, 0),
        }
    }

    /// `select <columns> from final table (<statement>)`
    fn render_data_change_table<F>(&mut self, table: &str, columns: &[ColumnReference<'_>], f: F) -> Result
    where
        F: FnOnce(&mut Self) -> Result,
    {
        if !self.supports(Capability::FinalTable) {
            return Err(self.unsupported("returning clause"));
        }

        self.write("select ")?;
        self.with_clause(Clause::Returning, |v| {
            v.visit_separated(columns, ",", |v, column| v.write(&column.name))
        })?;

        self.write(format_args!(" from {table} table ("))?;
        f(self)?;
        self.write(")")
    }
}

impl Visitor for Db2 {
    translation_accessors!();

    fn needs_recursive_keyword_in_with_clause(&self) -> bool {
        false
    }

    fn select_clause_parameter_mode(&self) -> ParameterRenderingMode {
        ParameterRenderingMode::NoUntyped
    }

    fn union_values_parameter_mode(&self) -> ParameterRenderingMode {
        ParameterRenderingMode::NoUntyped
    }

    fn merge_source_parameter_mode(&self) -> ParameterRenderingMode {
        ParameterRenderingMode::NoUntyped
    }

    fn render_from_dual(&mut self) -> Result {
        self.write(" from sysibm.sysdummy1")
    }

    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean if !self.is_modern() => "smallint".to_string(),
            SqlType::Double => "double".to_string(),
            SqlType::NVarchar => "vargraphic(2000)".to_string(),
            SqlType::Varbinary => "varbinary(4000)".to_string(),
            other => other.cast_name().to_string(),
        }
    }

    fn supports_fetch_clause_type(&self, fetch_type: FetchClauseType) -> bool {
        fetch_type == FetchClauseType::RowsOnly
    }

    fn supports_null_precedence(&self) -> bool {
        self.is_modern()
    }

    fn visit_function_table_reference(&mut self, function: &FunctionTableReference<'_>) -> Result {
        if function.ordinality.is_some() {
            return Err(self.unsupported("table function with ordinality"));
        }

        if function.lateral {
            self.write("lateral ")?;
        }

        self.surround_with("table(", ")", |v| v.visit_function(&function.function))?;
        self.render_table_alias_with_columns(&function.alias, &function.column_names)
    }

    fn visit_in_array_predicate(&mut self, in_array: &InArrayPredicate<'_>) -> Result {
        self.visit_expression(&in_array.expression)?;
        self.write(" in (select * from unnest(")?;
        self.visit_expression(&in_array.array)?;
        self.write("))")
    }

    fn render_for_update_clause(&mut self, options: LockOptions) -> Result {
        match options.mode {
            LockMode::None => return Ok(()),
            LockMode::PessimisticRead => self.write(" for read only with rs use and keep share locks")?,
            LockMode::PessimisticWrite => self.write(" for read only with rs use and keep update locks")?,
        }

        self.render_lock_wait(options.wait, "", " skip locked data")
    }

    fn visit_insert_statement(&mut self, insert: &InsertStatement<'_>) -> Result {
        self.begin_dml(&insert.target);
        self.visit_cte_container(&insert.ctes)?;

        if insert.returning.is_empty() {
            return self.visit_insert_statement_only(insert);
        }

        if insert.conflict.is_some() {
            return Err(self.unsupported("returning clause on an insert with a conflict clause"));
        }

        let mut plain = insert.clone();
        plain.returning.clear();

        self.render_data_change_table("final", &insert.returning, |v| v.visit_insert_statement_only(&plain))
    }

    fn visit_update_statement(&mut self, update: &UpdateStatement<'_>) -> Result {
        self.begin_dml(&update.target);
        self.visit_cte_container(&update.ctes)?;

        if update.returning.is_empty() {
            return self.visit_update_statement_only(update);
        }

        let mut plain = update.clone();
        plain.returning.clear();

        self.render_data_change_table("final", &update.returning, |v| v.visit_update_statement_only(&plain))
    }

    fn visit_delete_statement(&mut self, delete: &DeleteStatement<'_>) -> Result {
        self.begin_dml(&delete.target);
        self.visit_cte_container(&delete.ctes)?;

        if delete.returning.is_empty() {
            return self.visit_delete_statement_only(delete);
        }

        let mut plain = delete.clone();
        plain.returning.clear();

        self.render_data_change_table("old", &delete.returning, |v| v.visit_delete_statement_only(&plain))
    }
}
