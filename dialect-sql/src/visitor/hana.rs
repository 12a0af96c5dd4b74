use super::{Clause, Result, Visitor};
use crate::ast::*;

translator!(
    /// A translator for SAP HANA.
    Hana
);

impl Hana {
    /// Converts a LOB operand into a type `=` and `<>` accept.
    fn render_comparable_operand(&mut self, expression: &Expression<'_>) -> Result {
        match expression.sql_type() {
            Some(sql_type) if sql_type.is_character_lob() => {
                self.surround_with("to_nvarchar(", ")", |v| v.visit_expression(expression))
            }
            Some(SqlType::Blob) => self.surround_with("to_binary(", ")", |v| v.visit_expression(expression)),
            _ => self.visit_expression(expression),
        }
    }
}

impl Visitor for Hana {
    translation_accessors!();

    fn render_from_dual(&mut self) -> Result {
        self.write(" from sys.dummy")
    }

    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Double => "double".to_string(),
            SqlType::Varchar | SqlType::Unknown => "nvarchar(5000)".to_string(),
            SqlType::NVarchar => "nvarchar(5000)".to_string(),
            other => other.cast_name().to_string(),
        }
    }

    fn render_integer_division(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        self.write("cast((")?;
        self.visit_expression(lhs)?;
        self.write("/")?;
        self.visit_expression(rhs)?;
        self.write(") as integer)")
    }

    fn render_partition_item(&mut self, expression: &Expression<'_>) -> Result {
        match expression {
            Expression::Literal(_) if self.state().current_clause() == Some(Clause::GroupBy) => {
                self.write("grouping sets (())")
            }
            Expression::Literal(_) => self.write("()"),
            Expression::Summarization(summarization) => self.visit_summarization(summarization),
            other => self.visit_expression(other),
        }
    }

    fn render_comparison(&mut self, lhs: &Expression<'_>, operator: ComparisonOperator, rhs: &Expression<'_>) -> Result {
        let is_lob = |e: &Expression<'_>| e.sql_type().map(|t| t.is_lob()).unwrap_or(false);

        if matches!(operator, ComparisonOperator::Equal | ComparisonOperator::NotEqual) && (is_lob(lhs) || is_lob(rhs)) {
            self.render_comparable_operand(lhs)?;
            self.write(operator.sql_text())?;
            return self.render_comparable_operand(rhs);
        }

        self.render_comparison_standard(lhs, operator, rhs)
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
            LockMode::PessimisticRead => self.write(" for share lock")?,
            LockMode::PessimisticWrite => self.write(" for update")?,
        }

        self.render_lock_wait(options.wait, " nowait", " ignore locked")
    }

    fn visit_update_statement_only(&mut self, update: &UpdateStatement<'_>) -> Result {
        if update.from_clause.is_empty() {
            return self.visit_update_statement_only_standard(update);
        }

        self.with_clause(Clause::Update, |v| {
            v.write("update ")?;
            v.render_dml_target_table(&update.target)
        })?;

        self.render_set_clause(&update.assignments)?;

        self.write(" from ")?;
        self.with_clause(Clause::From, |v| {
            v.render_dml_target_table(&update.target)?;

            for root in update.from_clause.roots.iter() {
                v.write(",")?;
                v.visit_table_group(root)?;
            }

            Ok(())
        })?;

        self.visit_where_clause(update.restriction.as_ref())?;
        self.visit_returning_columns(&update.returning)
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
        Hana::build(Dialect::hana(2, 0), &statement.into()).unwrap().sql().to_string()
    }

    #[test]
    fn limit_and_offset() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::asc(Expression::column("e", "name")))
            .offset(param("offset", SqlType::Integer))
            .fetch(param("limit", SqlType::Integer));

        assert_eq!("select e.name from employee e order by e.name limit ? offset ?", build(query));
    }

    #[test]
    fn fetch_with_ties_is_emulated_with_rank() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::desc(Expression::column("e", "salary")))
            .fetch(param("limit", SqlType::Integer))
            .fetch_type(FetchClauseType::RowsWithTies);

        expect![[r#"select r_0_.c0 from (select e.name c0,row_number() over(order by e.salary desc) rn,rank() over(order by e.salary desc) rnk from employee e) r_0_ where r_0_.rnk<=? order by r_0_.rn"#]]
            .assert_eq(&build(query));
    }

    #[test]
    fn lob_equality_converts_the_lob() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(
                Expression::Column(ColumnReference::new("e", "notes").typed(SqlType::Clob))
                    .equals(param("notes", SqlType::Varchar)),
            );

        assert_eq!("select e.id from employee e where to_nvarchar(e.notes)=?", build(query));
    }

    #[test]
    fn integer_division_casts_the_quotient() {
        let quotient = Expression::arithmetic(
            ColumnReference::new("e", "days").typed(SqlType::Integer),
            ArithmeticOperator::Divide,
            ColumnReference::new("e", "weeks").typed(SqlType::Integer),
            SqlType::Integer,
        );

        let query = QuerySpec::root().from(employee()).column(quotient);

        assert_eq!("select cast((e.days/e.weeks) as integer) from employee e", build(query));
    }

    #[test]
    fn grouping_by_a_literal() {
        let query = QuerySpec::root()
            .from(employee())
            .column(count_star())
            .group_by(1);

        assert_eq!("select count(*) from employee e group by grouping sets (())", build(query));
    }

    #[test]
    fn update_with_from_clause() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e"))
            .from(TableGroup::new(NamedTableReference::new("department").alias("d")))
            .set(Assignment::new(ColumnReference::new("e", "active"), false))
            .so_that(Expression::column("e", "department_id").equals(Expression::column("d", "id")));

        assert_eq!(
            "update employee e set active=false from employee e,department d where e.department_id=d.id",
            build(update)
        );
    }

    #[test]
    fn lateral_join_is_emulated_before_cloud() {
        let orders = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("orders").alias("o")))
            .column(Expression::column("o", "total"))
            .so_that(Expression::column("o", "employee_id").equals(Expression::column("e", "id")));

        let query = QuerySpec::root()
            .from(employee().cross_join(TableGroup::new(DerivedTableReference::new(orders, "x").lateral())))
            .column(Expression::column("e", "name"))
            .column(Expression::column("x", "total"));

        expect![[r#"select e.name,x.total from employee e join (select o.total total from orders o) x on exists (select x.total from sys.dummy intersect select o.total from orders o where o.employee_id=e.id)"#]]
            .assert_eq(&build(query));
    }

    #[test]
    fn shared_lock_skipping_locked_rows() {
        let select = SelectStatement::new(QuerySpec::root().from(employee()).column(Expression::column("e", "id")))
            .lock(LockOptions::new(LockMode::PessimisticRead).wait(LockWait::SkipLocked));

        assert_eq!("select e.id from employee e for share lock ignore locked", build(select));
    }
}
