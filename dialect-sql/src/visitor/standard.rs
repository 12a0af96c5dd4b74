use super::Visitor;
use crate::ast::CteMaterialization;

translator!(
    /// A translator for SQL:2016 with every optional feature: the reference
    /// rendering the other translators deviate from.
    Standard
);

impl Visitor for Standard {
    translation_accessors!();

    fn render_cte_materialization(&mut self, materialization: CteMaterialization) -> super::Result {
        match materialization {
            CteMaterialization::Undefined => Ok(()),
            CteMaterialization::Materialized => self.write("materialized "),
            CteMaterialization::NotMaterialized => self.write("not materialized "),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, dialect::Dialect, visitor::*};
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    fn build(statement: impl Into<Statement<'static>>) -> (String, Vec<String>) {
        let operation = Standard::build(Dialect::standard(), &statement.into()).unwrap();
        let binders = operation.parameter_binders().iter().map(|b| b.name().to_string()).collect();

        (operation.sql().to_string(), binders)
    }

    fn employee() -> TableGroup<'static> {
        TableGroup::new(NamedTableReference::new("employee").alias("e"))
    }

    #[test]
    fn select_with_offset_and_fetch() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::asc(Expression::column("e", "name")))
            .offset(param("offset", SqlType::Integer))
            .fetch(param("limit", SqlType::Integer));

        let (sql, binders) = build(query);

        assert_eq!("select e.name from employee e order by e.name offset ? rows fetch first ? rows only", sql);
        assert_eq!(vec!["offset", "limit"], binders);
    }

    #[test]
    fn fetch_with_ties_and_percent() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::desc(Expression::column("e", "salary")).nulls(NullPrecedence::Last))
            .fetch(10)
            .fetch_type(FetchClauseType::PercentWithTies);

        let (sql, _) = build(query);

        expect![[r#"select e.name from employee e order by e.salary desc nulls last fetch first 10 percent rows with ties"#]]
            .assert_eq(&sql);
    }

    #[test]
    fn materialized_cte() {
        let cte = CteStatement::new(
            "recent",
            QuerySpec::sub_query()
                .from(TableGroup::new(NamedTableReference::new("orders").alias("o")))
                .column(Expression::column("o", "id")),
        )
        .materialization(CteMaterialization::Materialized);

        let select = SelectStatement::new(
            QuerySpec::root()
                .from(TableGroup::new(NamedTableReference::new("recent")))
                .column(Expression::column("recent", "id")),
        )
        .with(cte);

        let (sql, _) = build(select);

        assert_eq!(
            "with recent as materialized (select o.id from orders o) select recent.id from recent",
            sql
        );
    }

    #[test]
    fn recursive_cte_uses_the_keyword() {
        let cte = CteStatement::new(
            "tree",
            QuerySpec::sub_query()
                .from(TableGroup::new(NamedTableReference::new("node").alias("n")))
                .column(Expression::column("n", "id")),
        )
        .columns(["id"])
        .recursive();

        let select = SelectStatement::new(
            QuerySpec::root()
                .from(TableGroup::new(NamedTableReference::new("tree").alias("t")))
                .column(Expression::column("t", "id")),
        )
        .with(cte);

        let (sql, _) = build(select);

        assert_eq!("with recursive tree(id) as (select n.id from node n) select t.id from tree t", sql);
    }

    #[test]
    fn locking_clause_with_wait_option() {
        let select = SelectStatement::new(QuerySpec::root().from(employee()).column(Expression::column("e", "id")))
            .lock(LockOptions::new(LockMode::PessimisticWrite).wait(LockWait::SkipLocked));

        let operation = Standard::build(Dialect::standard(), &select.into()).unwrap();

        assert_eq!("select e.id from employee e for update skip locked", operation.sql());
        assert!(!operation.needs_follow_on_locking());
    }

    #[test]
    fn shared_lock() {
        let select = SelectStatement::new(QuerySpec::root().from(employee()).column(Expression::column("e", "id")))
            .lock(LockOptions::new(LockMode::PessimisticRead).wait(LockWait::NoWait));

        let (sql, _) = build(select);

        assert_eq!("select e.id from employee e for share nowait", sql);
    }

    #[test]
    fn locking_a_distinct_query_follows_on() {
        let select = SelectStatement::new(
            QuerySpec::root()
                .from(employee())
                .column(Expression::column("e", "id"))
                .distinct(),
        )
        .lock(LockOptions::new(LockMode::PessimisticWrite));

        let operation = Standard::build(Dialect::standard(), &select.into()).unwrap();

        assert_eq!("select distinct e.id from employee e", operation.sql());
        assert!(operation.needs_follow_on_locking());
    }

    #[test]
    fn locking_a_distinct_query_can_be_disallowed() {
        let select = SelectStatement::new(
            QuerySpec::root()
                .from(employee())
                .column(Expression::column("e", "id"))
                .distinct(),
        )
        .lock(LockOptions::new(LockMode::PessimisticWrite).follow_on(FollowOnLocking::Disallow));

        let err = Standard::build(Dialect::standard(), &select.into()).unwrap_err();

        assert!(!err.is_unsupported());
    }

    #[test]
    fn native_distinct_from_and_row_values() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(Expression::column("e", "manager").is_distinct_from(param("manager", SqlType::BigInt)))
            .so_that(
                Expression::tuple([Expression::column("e", "a"), Expression::column("e", "b")])
                    .less_than(Expression::tuple([1, 2])),
            );

        let (sql, _) = build(query);

        assert_eq!(
            "select e.id from employee e where e.manager is distinct from ? and (e.a,e.b)<(1,2)",
            sql
        );
    }

    #[test]
    fn query_group_with_pagination() {
        let left = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("customer").alias("c")))
            .column(Expression::column("c", "name"));

        let right = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("supplier").alias("s")))
            .column(Expression::column("s", "name"));

        let group = QueryGroup::new(SetOperator::Union, vec![left.into(), right.into()])
            .as_root()
            .order_by(SortSpecification::asc(1))
            .fetch(param("limit", SqlType::Integer));

        let (sql, _) = build(group);

        assert_eq!(
            "select c.name from customer c union select s.name from supplier s order by 1 fetch first ? rows only",
            sql
        );
    }

    #[test]
    fn joins_and_empty_in_list() {
        let query = QuerySpec::root()
            .from(employee().left_join(
                TableGroup::new(NamedTableReference::new("department").alias("d")),
                Expression::column("e", "department_id").equals(Expression::column("d", "id")),
            ))
            .column(Expression::column("d", "name"))
            .so_that(Expression::column("e", "id").in_list(Vec::<Expression>::new()));

        let (sql, _) = build(query);

        assert_eq!(
            "select d.name from employee e left join department d on e.department_id=d.id where false",
            sql
        );
    }

    #[test]
    fn window_function_with_frame() {
        let over = Over::new(FunctionExpression::aggregate("sum").argument(Expression::column("e", "salary")))
            .partition_by(Expression::column("e", "department_id"))
            .order_by(SortSpecification::asc(Expression::column("e", "hired")))
            .frame(Frame {
                kind: FrameKind::Rows,
                start: FrameBound::Preceding(2),
                end: FrameBound::CurrentRow,
                exclusion: FrameExclusion::NoOthers,
            });

        let query = QuerySpec::root().from(employee()).column(over);

        let (sql, _) = build(query);

        expect![[r#"select sum(e.salary) over(partition by e.department_id order by e.hired rows between 2 preceding and current row) from employee e"#]]
            .assert_eq(&sql);
    }

    #[test]
    fn update_with_returning() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e"))
            .set(Assignment::new(
                ColumnReference::new("e", "salary"),
                Expression::arithmetic(
                    Expression::column("e", "salary"),
                    ArithmeticOperator::Multiply,
                    2,
                    SqlType::Numeric,
                ),
            ))
            .so_that(Expression::column("e", "id").equals(param("id", SqlType::BigInt)))
            .returning(vec![ColumnReference::new("e", "salary")]);

        let (sql, binders) = build(update);

        assert_eq!("update employee e set salary=(e.salary*2) where e.id=? returning salary", sql);
        assert_eq!(vec!["id"], binders);
    }

    #[test]
    fn update_with_from_uses_a_driving_subquery() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e").identified_by(["id"]))
            .from(TableGroup::new(NamedTableReference::new("department").alias("d")))
            .set(Assignment::new(ColumnReference::new("e", "active"), false))
            .so_that(Expression::column("e", "department_id").equals(Expression::column("d", "id")))
            .so_that(Expression::column("d", "closed").equals(true));

        let (sql, _) = build(update);

        expect![[r#"update employee e set active=false where e.id in (select e.id from employee e,department d where e.department_id=d.id and d.closed=true)"#]]
            .assert_eq(&sql);
    }

    #[test]
    fn update_reading_joined_values_is_driven_by_a_merge() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e").identified_by(["id"]))
            .from(TableGroup::new(NamedTableReference::new("department").alias("d")))
            .set(Assignment::new(ColumnReference::new("e", "salary_cap"), Expression::column("d", "budget")))
            .so_that(Expression::column("e", "department_id").equals(Expression::column("d", "id")));

        let (sql, _) = build(update);

        expect![[r#"merge into employee e using (select e.id k0_,d.budget v0_ from employee e,department d where e.department_id=d.id) s_ on (e.id=s_.k0_) when matched then update set salary_cap=s_.v0_"#]]
            .assert_eq(&sql);
    }

    #[test]
    fn update_reading_joined_values_needs_target_identifiers() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e"))
            .from(TableGroup::new(NamedTableReference::new("department").alias("d")))
            .set(Assignment::new(ColumnReference::new("e", "salary_cap"), Expression::column("d", "budget")))
            .so_that(Expression::column("e", "department_id").equals(Expression::column("d", "id")));

        let err = Standard::build(Dialect::standard(), &update.into()).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn insert_multiple_rows() {
        let insert = InsertStatement::values(
            NamedTableReference::new("tag"),
            vec![ColumnReference::unqualified("name")],
            vec![Values::new(["a"]), Values::new(["b"])],
        );

        let operation = Standard::build(Dialect::standard(), &insert.into()).unwrap();

        assert_eq!("insert into tag (name) values ('a'),('b')", operation.sql());
        assert!(operation.affected_table_names().contains("tag"));
    }
}
