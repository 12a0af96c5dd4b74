use super::{on_duplicate_key, Clause, Result, Visitor};
use crate::{ast::*, dialect::Capability};

translator!(
    /// A translator for MySQL 5.7 and later.
    Mysql
);

/// The largest row count `limit` accepts, used when only an offset is given.
const MAX_ROWS: u64 = u64::MAX;

/// `limit ?` or `limit ?,?` with the offset first.
pub(super) fn render_limit_offset<V: Visitor>(
    v: &mut V,
    offset: Option<&Expression<'_>>,
    fetch: Option<&Expression<'_>>,
) -> Result {
    v.write(" limit ")?;

    if let Some(offset) = offset {
        v.with_clause(Clause::Offset, |v| v.visit_expression(offset))?;
        v.write(",")?;
    }

    match fetch {
        Some(fetch) => v.with_clause(Clause::Fetch, |v| v.visit_expression(fetch)),
        None => v.write(MAX_ROWS),
    }
}

/// Backslashes escape in string literals unless `NO_BACKSLASH_ESCAPES` is set.
pub(super) fn render_text_literal<V: Visitor>(v: &mut V, value: &str) -> Result {
    v.write("'")?;
    v.write(value.replace('\\', "\\\\").replace('\'', "''"))?;
    v.write("'")
}

pub(super) fn render_cast_type(sql_type: &SqlType) -> String {
    match sql_type {
        SqlType::Boolean | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => "signed".to_string(),
        SqlType::Numeric => "decimal(38,10)".to_string(),
        SqlType::Float | SqlType::Double => "double".to_string(),
        SqlType::Char | SqlType::Varchar | SqlType::NVarchar | SqlType::Clob | SqlType::NClob | SqlType::Unknown => {
            "char".to_string()
        }
        SqlType::Blob | SqlType::Varbinary => "binary".to_string(),
        SqlType::Timestamp => "datetime(6)".to_string(),
        SqlType::Json => "json".to_string(),
        other => other.cast_name().to_string(),
    }
}

pub(super) fn render_integer_division<V: Visitor>(v: &mut V, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
    v.write("(")?;
    v.visit_expression(lhs)?;
    v.write(" div ")?;
    v.visit_expression(rhs)?;
    v.write(")")
}

/// A constant grouping, which MySQL has no `()` for.
pub(super) fn render_partition_item<V: Visitor>(v: &mut V, expression: &Expression<'_>) -> Result {
    match expression {
        Expression::Literal(_) => v.write("'0'"),
        Expression::Summarization(summarization) => v.visit_summarization(summarization),
        other => v.visit_expression(other),
    }
}

/// `group by a,b with rollup`; there is no `cube`.
pub(super) fn render_summarization<V: Visitor>(v: &mut V, summarization: &Summarization<'_>) -> Result {
    if summarization.kind == SummarizationKind::Cube {
        return Err(v.unsupported("cube"));
    }

    v.visit_separated(&summarization.groupings, ",", |v, e| v.visit_expression(e))?;
    v.write(" with rollup")
}

/// `update t a,<from> set a.c=? where ...`
pub(super) fn render_update<V: Visitor>(v: &mut V, update: &UpdateStatement<'_>) -> Result {
    v.with_clause(Clause::Update, |v| {
        v.write("update ")?;
        v.render_dml_target_table(&update.target)?;

        v.with_clause(Clause::From, |v| {
            for root in update.from_clause.roots.iter() {
                v.write(",")?;
                v.visit_table_group(root)?;
            }

            Ok(())
        })
    })?;

    v.render_set_clause(&update.assignments)?;
    v.visit_where_clause(update.restriction.as_ref())?;
    v.visit_returning_columns(&update.returning)
}

/// `delete a from t a,<from> where ...`, naming the alias deleted from.
pub(super) fn render_delete<V: Visitor>(v: &mut V, delete: &DeleteStatement<'_>) -> Result {
    let aliased = delete.target.alias.is_some();

    if !aliased && delete.from_clause.is_empty() {
        return v.visit_delete_statement_only_standard(delete);
    }

    v.with_clause(Clause::Delete, |v| {
        v.write("delete ")?;
        v.write(delete.target.qualifier())?;
        v.write(" from ")?;
        v.render_dml_target_table(&delete.target)?;

        v.with_clause(Clause::From, |v| {
            for root in delete.from_clause.roots.iter() {
                v.write(",")?;
                v.visit_table_group(root)?;
            }

            Ok(())
        })
    })?;

    v.visit_where_clause(delete.restriction.as_ref())?;
    v.visit_returning_columns(&delete.returning)
}

pub(super) fn render_assigned_column<V: Visitor>(v: &mut V, column: &ColumnReference<'_>) -> Result {
    if let Some(qualifier) = &column.qualifier {
        v.write(qualifier)?;
        v.write(".")?;
    }

    v.write(&column.name)
}

impl Visitor for Mysql {
    translation_accessors!();

    fn render_limit_offset(&mut self, offset: Option<&Expression<'_>>, fetch: Option<&Expression<'_>>) -> Result {
        render_limit_offset(self, offset, fetch)
    }

    fn render_text_literal(&mut self, value: &str) -> Result {
        render_text_literal(self, value)
    }

    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        render_cast_type(sql_type)
    }

    fn render_integer_division(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        render_integer_division(self, lhs, rhs)
    }

    fn render_partition_item(&mut self, expression: &Expression<'_>) -> Result {
        render_partition_item(self, expression)
    }

    fn visit_summarization(&mut self, summarization: &Summarization<'_>) -> Result {
        render_summarization(self, summarization)
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn render_missing_like_escape(&mut self) -> Result {
        self.write(" escape ''")
    }

    fn visit_values_row(&mut self, row: &Values<'_>) -> Result {
        if self.supports(Capability::ValuesRowConstructor) && !self.state().is_in_clause(Clause::Insert) {
            self.write("row")?;
        }

        self.surround_with("(", ")", |v| v.visit_separated(&row.0, ",", |v, e| v.visit_expression(e)))
    }

    fn visit_in_array_predicate(&mut self, _in_array: &InArrayPredicate<'_>) -> Result {
        Err(self.unsupported("in array predicate"))
    }

    fn render_for_update_clause(&mut self, options: LockOptions) -> Result {
        let modern = self.dialect().version().is_same_or_after(8, 0, 0);

        match options.mode {
            LockMode::None => return Ok(()),
            LockMode::PessimisticRead if modern => self.write(" for share")?,
            LockMode::PessimisticRead => return self.write(" lock in share mode"),
            LockMode::PessimisticWrite => self.write(" for update")?,
        }

        self.render_lock_wait(options.wait, " nowait", " skip locked")
    }

    fn visit_insert_statement_only(&mut self, insert: &InsertStatement<'_>) -> Result {
        on_duplicate_key::render_insert_on_duplicate_key(self, insert)
    }

    fn visit_optional_table_update(&mut self, upsert: &OptionalTableUpdate<'_>) -> Result {
        self.begin_dml(&upsert.table);
        on_duplicate_key::render_optional_table_update_on_duplicate_key(self, upsert)
    }

    fn visit_update_statement_only(&mut self, update: &UpdateStatement<'_>) -> Result {
        render_update(self, update)
    }

    fn render_assigned_column(&mut self, column: &ColumnReference<'_>) -> Result {
        render_assigned_column(self, column)
    }

    fn visit_delete_statement_only(&mut self, delete: &DeleteStatement<'_>) -> Result {
        render_delete(self, delete)
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

    fn build(statement: impl Into<Statement<'static>>) -> String {
        Mysql::build(Dialect::mysql(8, 0, 30), &statement.into()).unwrap().sql().to_string()
    }

    fn insert_employee() -> InsertStatement<'static> {
        InsertStatement::values(
            NamedTableReference::new("employee"),
            vec![ColumnReference::unqualified("id"), ColumnReference::unqualified("name")],
            vec![Values::new([param("id", SqlType::BigInt), param("name", SqlType::Varchar)])],
        )
        .on_conflict(ConflictClause::on_columns(["id"]).set(Assignment::new(
            ColumnReference::unqualified("name"),
            Expression::column(EXCLUDED, "name"),
        )))
    }

    #[test]
    fn limit_with_offset_first() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::asc(Expression::column("e", "name")))
            .offset(param("offset", SqlType::Integer))
            .fetch(param("limit", SqlType::Integer));

        let operation = Mysql::build(Dialect::mysql(8, 0, 30), &query.into()).unwrap();

        assert_eq!("select e.name from employee e order by e.name limit ?,?", operation.sql());

        let names: Vec<_> = operation.parameter_binders().iter().map(|b| b.name()).collect();
        assert_eq!(vec!["offset", "limit"], names);
    }

    #[test]
    fn on_duplicate_key_with_row_alias() {
        assert_eq!(
            "insert into employee (id,name) values (?,?) as excluded on duplicate key update name=excluded.name",
            build(insert_employee())
        );
    }

    #[test]
    fn on_duplicate_key_with_values_function_before_8_0_19() {
        let operation = Mysql::build(Dialect::mysql(5, 7, 0), &insert_employee().into()).unwrap();

        assert_eq!(
            "insert into employee (id,name) values (?,?) on duplicate key update name=values(name)",
            operation.sql()
        );
    }

    #[test]
    fn conflict_predicate_is_evaluated_once_for_all_assignments() {
        let insert = InsertStatement::values(
            NamedTableReference::new("employee"),
            vec![
                ColumnReference::unqualified("id"),
                ColumnReference::unqualified("name"),
                ColumnReference::unqualified("version"),
            ],
            vec![Values::new([
                param("id", SqlType::BigInt),
                param("name", SqlType::Varchar),
                param("version", SqlType::Integer),
            ])],
        )
        .on_conflict(
            ConflictClause::on_columns(["id"])
                .set(Assignment::new(
                    ColumnReference::unqualified("version"),
                    Expression::column(EXCLUDED, "version"),
                ))
                .set(Assignment::new(
                    ColumnReference::unqualified("name"),
                    Expression::column(EXCLUDED, "name"),
                ))
                .so_that(Expression::column("employee", "version").less_than(Expression::column(EXCLUDED, "version"))),
        );

        expect![[r#"insert into employee (id,name,version) values (?,?,?) as excluded on duplicate key update version=if((@upd:=(employee.version<excluded.version)),excluded.version,version),name=if(@upd,excluded.name,name)"#]]
            .assert_eq(&build(insert));
    }

    #[test]
    fn optional_table_update_checks_the_version() {
        let upsert = OptionalTableUpdate::new(NamedTableReference::new("employee_details"))
            .key(ColumnValueBinding::new("id", param("id", SqlType::BigInt)))
            .value(ColumnValueBinding::new("notes", param("notes", SqlType::Varchar)))
            .optimistic_lock(ColumnValueBinding::new("version", param("version", SqlType::Integer)));

        expect![[r#"insert into employee_details (id,notes) values (?,?) as excluded on duplicate key update notes=if((@ver:=version)=?,excluded.notes,notes)"#]]
            .assert_eq(&build(upsert));
    }

    #[test]
    fn like_disables_backslash_escapes() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(Expression::column("e", "name").like("50\\%"));

        assert_eq!(r"select e.id from employee e where e.name like '50\\%' escape ''", build(query));
    }

    #[test]
    fn full_join_is_emulated_with_union_all() {
        let query = QuerySpec::root()
            .from(
                TableGroup::new(NamedTableReference::new("employee").alias("e").identified_by(["id"])).full_join(
                    TableGroup::new(NamedTableReference::new("department").alias("d")),
                    Expression::column("e", "department_id").equals(Expression::column("d", "id")),
                ),
            )
            .column(Expression::column("e", "name"))
            .column(Expression::column("d", "name"));

        expect![[r#"select e.name,d.name from employee e left join department d on e.department_id=d.id union all select e.name,d.name from employee e right join department d on e.department_id=d.id where e.id is null"#]]
            .assert_eq(&build(query));
    }

    #[test]
    fn delete_names_the_alias() {
        let delete = DeleteStatement::new(NamedTableReference::new("employee").alias("e"))
            .so_that(Expression::column("e", "id").equals(param("id", SqlType::BigInt)));

        assert_eq!("delete e from employee e where e.id=?", build(delete));
    }

    #[test]
    fn self_referencing_delete_materializes_the_subquery() {
        let managers = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("employee").alias("m")))
            .column(Expression::column("m", "id"))
            .so_that(Expression::column("m", "active").equals(false));

        let delete = DeleteStatement::new(NamedTableReference::new("employee").alias("e"))
            .so_that(Expression::column("e", "manager_id").in_selection(managers));

        expect![[r#"delete e from employee e where e.manager_id in (select * from (select m.id from employee m where m.active=false) dt_0_)"#]]
            .assert_eq(&build(delete));
    }

    #[test]
    fn multi_table_update() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e"))
            .from(TableGroup::new(NamedTableReference::new("department").alias("d")))
            .set(Assignment::new(ColumnReference::new("e", "active"), false))
            .so_that(Expression::column("e", "department_id").equals(Expression::column("d", "id")))
            .so_that(Expression::column("d", "closed").equals(true));

        assert_eq!(
            "update employee e,department d set e.active=false where e.department_id=d.id and d.closed=true",
            build(update)
        );
    }

    #[test]
    fn integer_division_and_rollup() {
        let quotient = Expression::arithmetic(
            ColumnReference::new("e", "days").typed(SqlType::Integer),
            ArithmeticOperator::Divide,
            7,
            SqlType::Integer,
        );

        let query = QuerySpec::root()
            .from(employee())
            .column(quotient)
            .column(count_star())
            .group_by(Summarization::new(
                SummarizationKind::Rollup,
                vec![Expression::column("e", "department_id"), Expression::column("e", "title")],
            ));

        assert_eq!(
            "select (e.days div 7),count(*) from employee e group by e.department_id,e.title with rollup",
            build(query)
        );
    }

    #[test]
    fn returning_is_unsupported() {
        let delete = DeleteStatement::new(NamedTableReference::new("employee"))
            .returning(vec![ColumnReference::unqualified("id")]);

        let err = Mysql::build(Dialect::mysql(8, 0, 30), &delete.into()).unwrap_err();

        assert!(err.is_unsupported());
    }
}
