//! A "prelude" for users of the `dialect-sql` crate.
pub use crate::ast::*;
pub use crate::dialect::{Capability, DatabaseVersion, Db2Variant, Dialect, SqlFamily};
pub use crate::error::{Error, ErrorKind};
pub use crate::operation::{JdbcOperation, ParameterBinder};
pub use crate::translate;
