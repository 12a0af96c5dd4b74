//! # dialect-sql
//!
//! Lowers a database-agnostic SQL statement tree into the SQL text of one
//! specific database product, compensating for what the product lacks:
//! pagination without `offset`/`fetch`, `full join` without native support,
//! lateral correlation, comparisons of LOB and XML values, upserts and more.
//!
//! A statement is built with the [`ast`] builders and rendered for a
//! [`Dialect`](dialect::Dialect), a database family plus its server version:
//!
//! ```rust
//! # use dialect_sql::prelude::*;
//! # fn main() -> dialect_sql::Result<()> {
//! let query = QuerySpec::root()
//!     .from(TableGroup::new(NamedTableReference::new("employee").alias("e")))
//!     .column(Expression::column("e", "name"))
//!     .order_by(SortSpecification::asc(Expression::column("e", "name")))
//!     .fetch(param("limit", SqlType::Integer));
//!
//! let dialect: Dialect = "mysql:8.0.30".parse()?;
//! let operation = dialect_sql::translate(&dialect, &query.into())?;
//!
//! assert_eq!("select e.name from employee e order by e.name limit ?", operation.sql());
//! assert_eq!("limit", operation.parameter_binders()[0].name());
//! # Ok(())
//! # }
//! ```
//!
//! Constructs a database can neither render nor emulate fail with an
//! [`Error`](error::Error) before any SQL is produced.
pub mod ast;
pub mod dialect;
pub mod error;
pub mod operation;
pub mod prelude;
pub mod visitor;

use dialect::{Dialect, SqlFamily};
use visitor::Visitor;

pub type Result<T> = std::result::Result<T, error::Error>;

/// Renders the statement for the given dialect with its translator.
pub fn translate(dialect: &Dialect, statement: &ast::Statement<'_>) -> Result<operation::JdbcOperation> {
    let dialect = *dialect;

    match dialect.family() {
        SqlFamily::Standard => visitor::Standard::build(dialect, statement),
        SqlFamily::Db2 => visitor::Db2::build(dialect, statement),
        SqlFamily::Hana => visitor::Hana::build(dialect, statement),
        SqlFamily::MariaDb => visitor::MariaDb::build(dialect, statement),
        SqlFamily::Mysql => visitor::Mysql::build(dialect, statement),
        SqlFamily::Oracle => visitor::Oracle::build(dialect, statement),
        SqlFamily::Spanner => visitor::Spanner::build(dialect, statement),
        SqlFamily::SybaseAse => visitor::SybaseAse::build(dialect, statement),
    }
}
