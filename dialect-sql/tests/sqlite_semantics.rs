//! Runs emulated SQL against an in-memory SQLite database and checks that it
//! returns the same rows as the native form.

use dialect_sql::prelude::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use rusqlite::{functions::FunctionFlags, params_from_iter, types::Value, Connection};

struct TestApi {
    conn: Connection,
}

impl TestApi {
    fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();

        conn.execute_batch(indoc! {r#"
            create table department (id integer primary key, name text not null);
            create table employee (
                id integer primary key,
                name text not null,
                department_id integer,
                manager integer,
                salary integer not null
            );

            insert into department values (10, 'eng'), (20, 'ops'), (40, 'hr');
            insert into employee values
                (1, 'dana', 10, null, 300),
                (2, 'ari', 10, 1, 200),
                (3, 'kim', 20, 1, 200),
                (4, 'lee', null, 2, 100),
                (5, 'bo', 20, 2, 150),
                (6, 'cy', 30, null, 300);
        "#})
        .unwrap();

        conn.create_scalar_function(
            "ceil",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let x: f64 = ctx.get(0)?;
                Ok(x.ceil() as i64)
            },
        )
        .unwrap();

        Self { conn }
    }

    fn query(&self, dialect: &Dialect, statement: impl Into<Statement<'static>>, bindings: &[(&str, Value)]) -> Vec<Vec<Option<i64>>> {
        let operation = translate(dialect, &statement.into()).unwrap();

        let values = operation.parameter_binders().iter().map(|binder| {
            bindings
                .iter()
                .find(|(name, _)| *name == binder.name())
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| panic!("no value bound for `{}`", binder.name()))
        });

        let mut stmt = self
            .conn
            .prepare(operation.sql())
            .unwrap_or_else(|e| panic!("{e}: {}", operation.sql()));

        let width = stmt.column_count();

        stmt.query_map(params_from_iter(values), |row| {
            (0..width).map(|i| row.get::<_, Option<i64>>(i)).collect()
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
    }

    fn ids(&self, dialect: &Dialect, statement: impl Into<Statement<'static>>, bindings: &[(&str, Value)]) -> Vec<i64> {
        self.query(dialect, statement, bindings)
            .into_iter()
            .filter_map(|row| row[0])
            .collect()
    }
}

fn employee() -> TableGroup<'static> {
    TableGroup::new(NamedTableReference::new("employee").alias("e"))
}

fn page_by_name() -> QuerySpec<'static> {
    QuerySpec::root()
        .from(employee())
        .column(Expression::column("e", "id"))
        .order_by(SortSpecification::asc(Expression::column("e", "name")))
        .offset(param("offset", SqlType::Integer))
        .fetch(param("limit", SqlType::Integer))
}

#[test]
fn row_number_pagination_matches_limit_offset() {
    let api = TestApi::new();
    let by_name = [2, 5, 6, 1, 3, 4];

    for (offset, limit) in [(0, 2), (1, 3), (4, 10), (6, 2), (2, 0)] {
        let bindings = [("offset", Value::Integer(offset)), ("limit", Value::Integer(limit))];
        let expected: Vec<i64> = by_name.iter().copied().skip(offset as usize).take(limit as usize).collect();

        let native = api.ids(&Dialect::hana(2, 0), page_by_name(), &bindings);
        assert_eq!(expected, native, "limit/offset, offset {offset} limit {limit}");

        for dialect in [Dialect::oracle(11), Dialect::db2_luw(10, 5)] {
            let emulated = api.ids(&dialect, page_by_name(), &bindings);
            assert_eq!(expected, emulated, "{dialect:?}, offset {offset} limit {limit}");
        }
    }
}

#[test]
fn fetch_with_ties_keeps_every_peer_of_the_last_row() {
    let api = TestApi::new();

    for (limit, mut expected) in [(1, vec![1, 6]), (2, vec![1, 6]), (3, vec![1, 2, 3, 6])] {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .order_by(SortSpecification::desc(Expression::column("e", "salary")))
            .fetch(param("limit", SqlType::Integer))
            .fetch_type(FetchClauseType::RowsWithTies);

        let mut ids = api.ids(&Dialect::hana(2, 0), query, &[("limit", Value::Integer(limit))]);
        ids.sort_unstable();
        expected.sort_unstable();

        assert_eq!(expected, ids, "with ties, limit {limit}");
    }
}

#[test]
fn offset_without_fetch_skips_rows_on_every_pagination_form() {
    let api = TestApi::new();
    let by_name = [2, 5, 6, 1, 3, 4];

    let query = || {
        QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .order_by(SortSpecification::asc(Expression::column("e", "name")))
            .offset(param("offset", SqlType::Integer))
    };

    for offset in [0, 2, 5, 6] {
        let expected: Vec<i64> = by_name.iter().copied().skip(offset as usize).collect();

        for dialect in [Dialect::hana(2, 0), Dialect::oracle(11), Dialect::db2_luw(10, 5)] {
            let ids = api.ids(&dialect, query(), &[("offset", Value::Integer(offset))]);
            assert_eq!(expected, ids, "{dialect:?}, offset {offset}");
        }
    }
}

#[test]
fn emulated_fetch_with_ties_ranks_the_peers_of_the_last_row() {
    let api = TestApi::new();

    for (limit, expected) in [(1, vec![1, 6]), (2, vec![1, 6]), (3, vec![1, 2, 3, 6])] {
        for dialect in [Dialect::oracle(11), Dialect::db2_luw(10, 5)] {
            let query = QuerySpec::root()
                .from(employee())
                .column(Expression::column("e", "id"))
                .order_by(SortSpecification::desc(Expression::column("e", "salary")))
                .fetch(param("limit", SqlType::Integer))
                .fetch_type(FetchClauseType::RowsWithTies);

            let mut ids = api.ids(&dialect, query, &[("limit", Value::Integer(limit))]);
            ids.sort_unstable();

            assert_eq!(expected, ids, "{dialect:?}, with ties, limit {limit}");
        }
    }
}

#[test]
fn emulated_percent_fetch_rounds_the_row_count_up() {
    let api = TestApi::new();

    for (percent, expected) in [(40, vec![2, 5, 6]), (10, vec![2]), (100, vec![2, 5, 6, 1, 3, 4])] {
        for dialect in [Dialect::oracle(11), Dialect::db2_luw(10, 5)] {
            let query = QuerySpec::root()
                .from(employee())
                .column(Expression::column("e", "id"))
                .order_by(SortSpecification::asc(Expression::column("e", "name")))
                .fetch(param("percent", SqlType::Integer))
                .fetch_type(FetchClauseType::PercentOnly);

            let ids = api.ids(&dialect, query, &[("percent", Value::Integer(percent))]);
            assert_eq!(expected, ids, "{dialect:?}, {percent} percent");
        }
    }

    let with_ties = QuerySpec::root()
        .from(employee())
        .column(Expression::column("e", "id"))
        .order_by(SortSpecification::desc(Expression::column("e", "salary")))
        .fetch(param("percent", SqlType::Integer))
        .fetch_type(FetchClauseType::PercentWithTies);

    let mut ids = api.ids(&Dialect::oracle(11), with_ties, &[("percent", Value::Integer(40))]);
    ids.sort_unstable();

    assert_eq!(vec![1, 2, 3, 6], ids);
}

#[test]
fn distinct_from_emulation_follows_null_safe_semantics() {
    let api = TestApi::new();
    let managers: [(i64, Option<i64>); 6] = [(1, None), (2, Some(1)), (3, Some(1)), (4, Some(2)), (5, Some(2)), (6, None)];

    let query = |negated: bool| {
        let manager = Expression::column("e", "manager");
        let candidate = param("manager", SqlType::BigInt);

        let predicate = if negated {
            manager.is_not_distinct_from(candidate)
        } else {
            manager.is_distinct_from(candidate)
        };

        QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(predicate)
            .order_by(SortSpecification::asc(Expression::column("e", "id")))
    };

    for candidate in [Some(1), Some(2), Some(7), None] {
        let value = candidate.map_or(Value::Null, Value::Integer);
        let bindings = [("manager", value)];

        for negated in [false, true] {
            let expected: Vec<i64> = managers
                .iter()
                .filter(|(_, manager)| (*manager == candidate) == negated)
                .map(|(id, _)| *id)
                .collect();

            for dialect in [Dialect::standard(), Dialect::hana(2, 0), Dialect::db2_luw(10, 5)] {
                let ids = api.ids(&dialect, query(negated), &bindings);
                assert_eq!(expected, ids, "{dialect:?}, {candidate:?}, negated: {negated}");
            }
        }
    }
}

#[test]
fn full_join_emulation_returns_both_unmatched_sides() {
    let api = TestApi::new();

    let query = || {
        QuerySpec::root()
            .from(
                TableGroup::new(NamedTableReference::new("employee").alias("e").identified_by(["id"])).full_join(
                    TableGroup::new(NamedTableReference::new("department").alias("d")),
                    Expression::column("e", "department_id").equals(Expression::column("d", "id")),
                ),
            )
            .column(Expression::column("e", "id"))
            .column(Expression::column("d", "id"))
    };

    let expected = vec![
        vec![None, Some(40)],
        vec![Some(1), Some(10)],
        vec![Some(2), Some(10)],
        vec![Some(3), Some(20)],
        vec![Some(4), None],
        vec![Some(5), Some(20)],
        vec![Some(6), None],
    ];

    for dialect in [Dialect::standard(), Dialect::mysql(8, 0, 30)] {
        let mut rows = api.query(&dialect, query(), &[]);
        rows.sort();

        assert_eq!(expected, rows, "{dialect:?}");
    }
}

#[test]
fn full_join_emulation_inside_a_derived_table() {
    let api = TestApi::new();

    let query = || {
        let inner = QuerySpec::sub_query()
            .from(
                TableGroup::new(NamedTableReference::new("employee").alias("e").identified_by(["id"])).full_join(
                    TableGroup::new(NamedTableReference::new("department").alias("d")),
                    Expression::column("e", "department_id").equals(Expression::column("d", "id")),
                ),
            )
            .selection(SqlSelection::new(Expression::column("e", "id")).alias("emp"))
            .selection(SqlSelection::new(Expression::column("d", "id")).alias("dept"));

        QuerySpec::root()
            .from(TableGroup::new(DerivedTableReference::new(inner, "x")))
            .column(Expression::column("x", "emp"))
            .column(Expression::column("x", "dept"))
    };

    let expected = vec![
        vec![None, Some(40)],
        vec![Some(1), Some(10)],
        vec![Some(2), Some(10)],
        vec![Some(3), Some(20)],
        vec![Some(4), None],
        vec![Some(5), Some(20)],
        vec![Some(6), None],
    ];

    for dialect in [Dialect::standard(), Dialect::mysql(8, 0, 30)] {
        let mut rows = api.query(&dialect, query(), &[]);
        rows.sort();

        assert_eq!(expected, rows, "{dialect:?}");
    }
}
