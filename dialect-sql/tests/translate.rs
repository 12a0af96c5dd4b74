use dialect_sql::prelude::*;
use expect_test::expect;
use pretty_assertions::assert_eq;

const DIALECTS: &[&str] = &[
    "standard",
    "db2:9.7",
    "db2:11.5",
    "db2i:7.5",
    "db2zos:12",
    "hana:2.0",
    "hana:4.0",
    "mariadb:10.6",
    "mysql:5.7",
    "mysql:8.0.30",
    "oracle:11",
    "oracle:19",
    "oracle:23",
    "spanner",
    "sybase_ase:16.0",
];

fn dialects() -> impl Iterator<Item = Dialect> {
    DIALECTS.iter().map(|s| s.parse().unwrap())
}

fn managers_by_department() -> QuerySpec<'static> {
    QuerySpec::root()
        .from(
            TableGroup::new(NamedTableReference::new("employee").alias("e")).inner_join(
                TableGroup::new(NamedTableReference::new("department").alias("d")),
                Expression::column("e", "department_id").equals(Expression::column("d", "id")),
            ),
        )
        .column(Expression::column("e", "id"))
        .column(Expression::column("d", "name"))
        .so_that(Expression::column("e", "manager").is_distinct_from(param("manager", SqlType::BigInt)))
        .order_by(SortSpecification::asc(Expression::column("e", "name")))
        .fetch(param("limit", SqlType::Integer))
}

#[test]
fn translating_twice_yields_the_same_operation() {
    for dialect in dialects() {
        let statement: Statement = managers_by_department().into();

        let first = translate(&dialect, &statement).unwrap();
        let second = translate(&dialect, &statement).unwrap();

        assert_eq!(first.sql(), second.sql(), "{dialect}");
        assert_eq!(first.parameter_binders(), second.parameter_binders(), "{dialect}");
        assert_eq!(first.affected_table_names(), second.affected_table_names(), "{dialect}");
    }
}

#[test]
fn every_parameter_gets_a_binder_in_order() {
    for dialect in dialects() {
        let operation = translate(&dialect, &managers_by_department().into()).unwrap();

        let placeholders = operation.sql().matches('?').count();
        assert_eq!(placeholders, operation.parameter_binders().len(), "{dialect}: {}", operation.sql());

        assert!(
            operation.parameter_binders().iter().any(|b| b.name() == "manager"),
            "{dialect}"
        );
        assert!(operation.parameter_binders().iter().any(|b| b.name() == "limit"), "{dialect}");
    }
}

#[test]
fn select_reports_the_tables_it_reads() {
    let operation = translate(&Dialect::standard(), &managers_by_department().into()).unwrap();
    let tables: Vec<&str> = operation.affected_table_names().iter().map(String::as_str).collect();

    assert_eq!(vec!["department", "employee"], tables);
}

#[test]
fn pagination_per_family() {
    let rendered: Vec<String> = ["mysql:8.0.30", "oracle:19", "sybase_ase:16.0", "hana:2.0"]
        .iter()
        .map(|s| {
            let dialect: Dialect = s.parse().unwrap();
            let query = QuerySpec::root()
                .from(TableGroup::new(NamedTableReference::new("employee").alias("e")))
                .column(Expression::column("e", "name"))
                .order_by(SortSpecification::asc(Expression::column("e", "name")))
                .fetch(param("limit", SqlType::Integer));

            translate(&dialect, &query.into()).unwrap().sql().to_string()
        })
        .collect();

    expect![[r#"
        [
            "select e.name from employee e order by e.name limit ?",
            "select e.name from employee e order by e.name fetch first ? rows only",
            "select top ? e.name from employee e order by e.name",
            "select e.name from employee e order by e.name limit ?",
        ]
    "#]]
    .assert_debug_eq(&rendered);
}

#[test]
fn unsupported_constructs_fail_before_rendering() {
    let like_escape = QuerySpec::root()
        .from(TableGroup::new(NamedTableReference::new("employee").alias("e")))
        .column(Expression::column("e", "id"))
        .so_that(Expression::column("e", "name").like("a!%%").escape("!"));

    let err = translate(&Dialect::spanner(), &like_escape.into()).unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(Some("Spanner"), err.dialect());

    let offset = QuerySpec::root()
        .from(TableGroup::new(NamedTableReference::new("employee").alias("e")))
        .column(Expression::column("e", "name"))
        .offset(10);

    let err = translate(&Dialect::sybase_ase(16, 0), &offset.into()).unwrap_err();
    assert!(err.is_unsupported());

    let update = UpdateStatement::new(NamedTableReference::new("employee"))
        .set(Assignment::new(ColumnReference::unqualified("active"), false))
        .returning(vec![ColumnReference::unqualified("id")]);

    let err = translate(&Dialect::mariadb(10, 6, 0), &update.into()).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnsupportedFeature { .. }));
}

#[test]
fn dialects_parse_from_connection_urls() {
    let dialect = Dialect::from_url("db2zos://localhost:446/sample?version=12.1").unwrap();

    assert_eq!(SqlFamily::Db2, dialect.family());
    assert_eq!(Db2Variant::ZOs, dialect.db2_variant());
    assert!(dialect.version().is_same_or_after(12, 1, 0));

    let err = Dialect::from_url("informix://localhost/db").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidDialect(_)));
}
