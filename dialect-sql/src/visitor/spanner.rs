use itertools::Itertools;
use tracing::trace;

use super::{Clause, LockStrategy, Result, SelectionAliases, Visitor};
use crate::ast::*;

translator!(
    /// A translator for Cloud Spanner's GoogleSQL dialect.
    ///
    /// Spanner has no lateral joins: a lateral subquery becomes an array of
    /// structs the join unnests, `unnest(array(select as struct ...))`.
    Spanner
);

impl Spanner {
    /// `insert [or ignore|or update] into t (a,b) values ...`
    fn render_insert(&mut self, insert: &InsertStatement<'_>, modifier: &str) -> Result {
        self.with_clause(Clause::Insert, |v| {
            v.write("insert ")?;
            v.write(modifier)?;
            v.write("into ")?;
            v.write(&insert.target.name)?;
            v.render_insert_columns(&insert.columns)?;
            v.write(" ")?;
            v.visit_insert_source(&insert.source)
        })?;

        self.visit_returning_columns(&insert.returning)
    }

    /// `insert or update` overwrites every inserted column of an existing
    /// row, so the conflict must assign exactly the non-key columns from
    /// the inserted row.
    fn is_insert_or_update(insert: &InsertStatement<'_>, conflict: &ConflictClause<'_>) -> bool {
        if conflict.predicate.is_some() || conflict.constraint_columns.is_empty() {
            return false;
        }

        let takes_inserted_value = |assignment: &Assignment<'_>| match (assignment.columns.as_slice(), &assignment.value) {
            ([column], Expression::Column(value)) => {
                value.qualifier() == Some(EXCLUDED) && value.name() == column.name()
            }
            _ => false,
        };

        if !conflict.assignments.iter().all(takes_inserted_value) {
            return false;
        }

        let assigned = conflict.assignments.iter().map(|a| a.columns[0].name()).sorted_unstable();
        let updatable = insert
            .columns
            .iter()
            .map(|column| column.name())
            .filter(|name| !conflict.constraint_columns.iter().any(|key| key == name))
            .sorted_unstable();

        assigned.eq(updatable)
    }
}

impl Visitor for Spanner {
    translation_accessors!();

    fn render_select_modifiers(&mut self, _spec: &QuerySpec<'_>) -> Result {
        if self.state().struct_selection_depth == Some(self.state().query_part_depth()) {
            self.write("as struct ")?;
        }

        Ok(())
    }

    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean => "bool".to_string(),
            SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => "int64".to_string(),
            SqlType::Float | SqlType::Double => "float64".to_string(),
            SqlType::Char | SqlType::Varchar | SqlType::NVarchar | SqlType::Clob | SqlType::NClob | SqlType::Xml => {
                "string".to_string()
            }
            SqlType::Blob | SqlType::Varbinary => "bytes".to_string(),
            SqlType::Unknown => "string".to_string(),
            other => other.cast_name().to_string(),
        }
    }

    /// GoogleSQL strings take backslash escapes and no doubled quotes.
    fn render_text_literal(&mut self, value: &str) -> Result {
        self.write("'")?;
        self.write(value.replace('\\', "\\\\").replace('\'', "\\'"))?;
        self.write("'")
    }

    fn render_integer_division(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        self.write("div(")?;
        self.visit_expression(lhs)?;
        self.write(",")?;
        self.visit_expression(rhs)?;
        self.write(")")
    }

    fn render_like_escape(&mut self, _escape: &Expression<'_>) -> Result {
        Err(self.unsupported("like escape character"))
    }

    fn visit_in_array_predicate(&mut self, in_array: &InArrayPredicate<'_>) -> Result {
        self.visit_expression(&in_array.expression)?;
        self.write(" in unnest(")?;
        self.visit_expression(&in_array.array)?;
        self.write(")")
    }

    fn supports_derived_column_list(&self) -> bool {
        false
    }

    fn visit_function_table_reference(&mut self, function: &FunctionTableReference<'_>) -> Result {
        if function.ordinality.is_some() {
            return Err(self.unsupported("table function with ordinality"));
        }

        self.visit_function(&function.function)?;
        self.write(" ")?;
        self.write(&function.alias)
    }

    /// `<join> unnest(array(select as struct ...)) alias[ on p]`
    fn render_lateral_join(&mut self, join: &TableGroupJoin<'_>, derived: &DerivedTableReference<'_>) -> Result {
        let join_type = match (join.join_type, &join.predicate) {
            (JoinType::Inner, None) => JoinType::Cross,
            (join_type, _) => join_type,
        };

        trace!(target: "dialect_sql::translate", alias = %derived.alias, "unnesting lateral subquery");

        self.write(join_type.sql_text())?;
        self.write("unnest(array")?;

        let depth = self.state().query_part_depth() + 1;
        let state = self.state_mut();
        let saved_struct = state.struct_selection_depth.replace(depth);
        let saved_lateral = std::mem::replace(&mut state.in_lateral, true);
        let saved_aliases = if derived.column_names.is_empty() {
            state.selection_aliases.clone()
        } else {
            state.selection_aliases.replace(SelectionAliases {
                depth,
                names: derived.column_names.iter().map(|name| name.to_string()).collect(),
            })
        };

        let result = self.surround_with("(", ")", |v| v.visit_query_part(&derived.query));

        let state = self.state_mut();
        state.struct_selection_depth = saved_struct;
        state.in_lateral = saved_lateral;
        state.selection_aliases = saved_aliases;
        result?;

        self.write(") ")?;
        self.write(&derived.alias)?;

        if join_type != JoinType::Cross {
            self.write(" on ")?;

            match &join.predicate {
                Some(predicate) => self.visit_predicate(predicate)?,
                None => self.render_true_predicate()?,
            }
        }

        for nested in join.group.joins.iter() {
            self.visit_table_group_join(nested)?;
        }

        Ok(())
    }

    fn determine_locking_strategy(&self, _spec: &QuerySpec<'_>, _follow_on: FollowOnLocking) -> crate::Result<LockStrategy> {
        // Read-write transactions lock what they read.
        Ok(LockStrategy::None)
    }

    fn render_returning_clause(&mut self, columns: &[ColumnReference<'_>]) -> Result {
        self.write(" then return ")?;

        self.with_clause(Clause::Returning, |v| {
            v.visit_separated(columns, ",", |v, column| v.write(&column.name))
        })
    }

    fn visit_insert_statement_only(&mut self, insert: &InsertStatement<'_>) -> Result {
        match &insert.conflict {
            None => self.render_insert(insert, ""),
            Some(conflict) if conflict.is_do_nothing() => self.render_insert(insert, "or ignore "),
            Some(conflict) if Self::is_insert_or_update(insert, conflict) => self.render_insert(insert, "or update "),
            Some(_) => Err(self.unsupported("conflict clause assigning other than the inserted values")),
        }
    }

    fn visit_optional_table_update(&mut self, upsert: &OptionalTableUpdate<'_>) -> Result {
        if upsert.optimistic_lock.is_some() {
            return Err(self.unsupported("upsert with a version check"));
        }

        self.begin_dml(&upsert.table);

        let insert = InsertStatement::values(
            NamedTableReference::new(upsert.table.name.clone()),
            upsert
                .all_bindings()
                .map(|binding| ColumnReference::unqualified(binding.column.clone()))
                .collect(),
            vec![Values::new(upsert.all_bindings().map(|binding| binding.value.clone()))],
        );

        self.render_insert(&insert, "or update ")
    }

    fn visit_update_statement_only_standard(&mut self, update: &UpdateStatement<'_>) -> Result {
        self.with_clause(Clause::Update, |v| {
            v.write("update ")?;
            v.render_dml_target_table(&update.target)
        })?;

        self.render_set_clause(&update.assignments)?;

        match &update.restriction {
            Some(restriction) => self.visit_where_clause(Some(restriction))?,
            None => self.write(" where true")?,
        }

        self.visit_returning_columns(&update.returning)
    }

    fn visit_delete_statement_only_standard(&mut self, delete: &DeleteStatement<'_>) -> Result {
        self.with_clause(Clause::Delete, |v| {
            v.write("delete from ")?;
            v.render_dml_target_table(&delete.target)
        })?;

        match &delete.restriction {
            Some(restriction) => self.visit_where_clause(Some(restriction))?,
            None => self.write(" where true")?,
        }

        self.visit_returning_columns(&delete.returning)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, dialect::Dialect, visitor::*};
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    fn employee() -> TableGroup<'static> {
        TableGroup::new(NamedTableReference::new("employee").alias("e"))
    }

    fn build(statement: impl Into<Statement<'static>>) -> crate::Result<String> {
        Spanner::build(Dialect::spanner(), &statement.into()).map(|operation| operation.sql().to_string())
    }

    #[test]
    fn limit_and_offset() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::asc(Expression::column("e", "name")))
            .offset(param("offset", SqlType::Integer))
            .fetch(param("limit", SqlType::Integer));

        assert_eq!(
            "select e.name from employee e order by e.name limit ? offset ?",
            build(query).unwrap()
        );
    }

    #[test]
    fn text_literals_escape_with_backslashes() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(Expression::column("e", "path").equals(r"it's c:\tmp"));

        expect![[r#"select e.id from employee e where e.path='it\'s c:\\tmp'"#]].assert_eq(&build(query).unwrap());
    }

    #[test]
    fn integer_division_uses_div() {
        let quotient = Expression::arithmetic(
            ColumnReference::new("e", "days").typed(SqlType::Integer),
            ArithmeticOperator::Divide,
            7,
            SqlType::Integer,
        );

        let query = QuerySpec::root().from(employee()).column(quotient);

        assert_eq!("select div(e.days,7) from employee e", build(query).unwrap());
    }

    #[test]
    fn like_escape_is_rejected() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(Expression::column("e", "name").like("a!%%").escape("!"));

        assert!(build(query).unwrap_err().is_unsupported());

        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(Expression::column("e", "name").like("a%"));

        assert_eq!("select e.id from employee e where e.name like 'a%'", build(query).unwrap());
    }

    #[test]
    fn in_array_unnests_the_parameter() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .so_that(Expression::column("e", "id").in_array(param("ids", SqlType::Array("int64".into()))));

        assert_eq!("select e.name from employee e where e.id in unnest(?)", build(query).unwrap());
    }

    #[test]
    fn dml_without_restriction_gets_where_true() {
        let delete = DeleteStatement::new(NamedTableReference::new("audit_log"));
        assert_eq!("delete from audit_log where true", build(delete).unwrap());

        let update = UpdateStatement::new(NamedTableReference::new("employee"))
            .set(Assignment::new(ColumnReference::unqualified("active"), false))
            .returning(vec![ColumnReference::unqualified("id")]);

        assert_eq!(
            "update employee set active=false where true then return id",
            build(update).unwrap()
        );
    }

    #[test]
    fn delete_then_return() {
        let delete = DeleteStatement::new(NamedTableReference::new("employee").alias("e"))
            .so_that(Expression::column("e", "id").equals(param("id", SqlType::BigInt)))
            .returning(vec![ColumnReference::unqualified("name")]);

        assert_eq!("delete from employee e where e.id=? then return name", build(delete).unwrap());
    }

    #[test]
    fn insert_ignoring_duplicates() {
        let insert = InsertStatement::values(
            NamedTableReference::new("tag"),
            vec![ColumnReference::unqualified("name")],
            vec![Values::new(["a"]), Values::new(["b"])],
        )
        .on_conflict(ConflictClause::on_columns(["name"]));

        assert_eq!("insert or ignore into tag (name) values ('a'),('b')", build(insert).unwrap());
    }

    #[test]
    fn insert_overwriting_duplicates() {
        let values = || {
            InsertStatement::values(
                NamedTableReference::new("employee"),
                vec![ColumnReference::unqualified("id"), ColumnReference::unqualified("name")],
                vec![Values::new([param("id", SqlType::BigInt), param("name", SqlType::Varchar)])],
            )
        };

        let overwrite = values().on_conflict(ConflictClause::on_columns(["id"]).set(Assignment::new(
            ColumnReference::unqualified("name"),
            Expression::column(EXCLUDED, "name"),
        )));

        assert_eq!(
            "insert or update into employee (id,name) values (?,?)",
            build(overwrite).unwrap()
        );

        let computed = values().on_conflict(ConflictClause::on_columns(["id"]).set(Assignment::new(
            ColumnReference::unqualified("name"),
            "unknown",
        )));

        assert!(build(computed).unwrap_err().is_unsupported());
    }

    #[test]
    fn upsert_is_insert_or_update() {
        let upsert = OptionalTableUpdate::new(NamedTableReference::new("employee_details").alias("d"))
            .key(ColumnValueBinding::new("id", param("id", SqlType::BigInt)))
            .value(ColumnValueBinding::new("notes", param("notes", SqlType::Varchar)));

        let operation = Spanner::build(Dialect::spanner(), &upsert.into()).unwrap();

        assert_eq!("insert or update into employee_details (id,notes) values (?,?)", operation.sql());
        assert!(operation.affected_table_names().contains("employee_details"));

        let versioned = OptionalTableUpdate::new(NamedTableReference::new("employee_details"))
            .key(ColumnValueBinding::new("id", param("id", SqlType::BigInt)))
            .value(ColumnValueBinding::new("notes", param("notes", SqlType::Varchar)))
            .optimistic_lock(ColumnValueBinding::new("version", param("version", SqlType::Integer)));

        assert!(build(versioned).unwrap_err().is_unsupported());
    }

    #[test]
    fn lateral_subquery_is_unnested_as_structs() {
        let orders = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("orders").alias("o")))
            .column(Expression::column("o", "total"))
            .so_that(Expression::column("o", "employee_id").equals(Expression::column("e", "id")));

        let query = QuerySpec::root()
            .from(employee().cross_join(TableGroup::new(DerivedTableReference::new(orders, "x").lateral())))
            .column(Expression::column("e", "name"))
            .column(Expression::column("x", "total"));

        expect![[r#"select e.name,x.total from employee e cross join unnest(array(select as struct o.total from orders o where o.employee_id=e.id)) x"#]]
            .assert_eq(&build(query).unwrap());
    }

    #[test]
    fn locks_are_left_to_the_transaction() {
        let select = SelectStatement::new(QuerySpec::root().from(employee()).column(Expression::column("e", "id")))
            .lock(LockOptions::new(LockMode::PessimisticWrite));

        let operation = Spanner::build(Dialect::spanner(), &select.into()).unwrap();

        assert_eq!("select e.id from employee e", operation.sql());
        assert!(!operation.needs_follow_on_locking());
    }
}
