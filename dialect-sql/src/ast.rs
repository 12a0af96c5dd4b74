//! The database-agnostic statement tree.
//!
//! Trees are built upstream and handed to a translator read-only. The
//! builders here are what callers and tests use to put one together:
//!
//! ```rust
//! # use dialect_sql::ast::*;
//! let statement: Statement = QuerySpec::root()
//!     .from(TableGroup::new(NamedTableReference::new("employee").alias("e")))
//!     .column(Expression::column("e", "id"))
//!     .order_by(SortSpecification::asc(Expression::column("e", "name")))
//!     .offset(param("offset", SqlType::Integer))
//!     .fetch(param("limit", SqlType::Integer))
//!     .into();
//!
//! assert!(matches!(statement, Statement::Select(_)));
//! ```
mod dml;
mod expression;
mod predicate;
mod query_part;
mod statement;
mod table;
mod upsert;
mod walk;

pub use dml::*;
pub use expression::*;
pub use predicate::*;
pub use query_part::*;
pub use statement::*;
pub use table::*;
pub use upsert::*;
