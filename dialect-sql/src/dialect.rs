//! Target database profiles.
//!
//! A [`Dialect`] pairs a database family with the server version the SQL is
//! rendered for. Every translator decision that depends on the target goes
//! through [`Dialect::supports`], which answers from a capability set derived
//! from the family and version.
mod version;

pub use version::DatabaseVersion;

use enumflags2::{bitflags, BitFlags};
use serde::Deserialize;
use std::{fmt, str::FromStr};
use url::Url;

use crate::error::{Error, ErrorKind};

/// The database product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlFamily {
    Standard,
    Db2,
    Hana,
    #[serde(alias = "mariadb")]
    MariaDb,
    Mysql,
    Oracle,
    Spanner,
    SybaseAse,
}

impl SqlFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlFamily::Standard => "standard",
            SqlFamily::Db2 => "db2",
            SqlFamily::Hana => "hana",
            SqlFamily::MariaDb => "mariadb",
            SqlFamily::Mysql => "mysql",
            SqlFamily::Oracle => "oracle",
            SqlFamily::Spanner => "spanner",
            SqlFamily::SybaseAse => "sybase_ase",
        }
    }

    /// The version assumed when the configuration names none.
    pub fn default_version(self) -> DatabaseVersion {
        match self {
            SqlFamily::Standard => DatabaseVersion::new(2016, 0, 0),
            SqlFamily::Db2 => DatabaseVersion::new(11, 5, 0),
            SqlFamily::Hana => DatabaseVersion::new(2, 0, 0),
            SqlFamily::MariaDb => DatabaseVersion::new(10, 11, 0),
            SqlFamily::Mysql => DatabaseVersion::new(8, 0, 30),
            SqlFamily::Oracle => DatabaseVersion::new(19, 0, 0),
            SqlFamily::Spanner => DatabaseVersion::new(1, 0, 0),
            SqlFamily::SybaseAse => DatabaseVersion::new(16, 0, 0),
        }
    }
}

impl fmt::Display for SqlFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlFamily::Standard => write!(f, "Standard SQL"),
            SqlFamily::Db2 => write!(f, "DB2"),
            SqlFamily::Hana => write!(f, "SAP HANA"),
            SqlFamily::MariaDb => write!(f, "MariaDB"),
            SqlFamily::Mysql => write!(f, "MySQL"),
            SqlFamily::Oracle => write!(f, "Oracle"),
            SqlFamily::Spanner => write!(f, "Spanner"),
            SqlFamily::SybaseAse => write!(f, "Sybase ASE"),
        }
    }
}

impl FromStr for SqlFamily {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let family = match s.to_ascii_lowercase().as_str() {
            "standard" | "ansi" => SqlFamily::Standard,
            "db2" | "db2i" | "db2zos" => SqlFamily::Db2,
            "hana" | "saphana" => SqlFamily::Hana,
            "mariadb" => SqlFamily::MariaDb,
            "mysql" => SqlFamily::Mysql,
            "oracle" => SqlFamily::Oracle,
            "spanner" => SqlFamily::Spanner,
            "sybase" | "sybase_ase" | "ase" => SqlFamily::SybaseAse,
            other => {
                let kind = ErrorKind::invalid_dialect(format!("unknown database family `{other}`"));
                return Err(Error::builder(kind).build());
            }
        };

        Ok(family)
    }
}

/// The DB2 product line, which differ in syntax support per version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Db2Variant {
    #[default]
    Luw,
    IbmI,
    ZOs,
}

impl FromStr for Db2Variant {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "luw" => Ok(Db2Variant::Luw),
            "i" | "ibmi" | "ibm_i" | "db2i" => Ok(Db2Variant::IbmI),
            "z" | "zos" | "z_os" | "db2zos" => Ok(Db2Variant::ZOs),
            other => {
                let kind = ErrorKind::invalid_dialect(format!("unknown DB2 variant `{other}`"));
                Err(Error::builder(kind).build())
            }
        }
    }
}

/// A syntax feature a target may or may not provide natively.
#[bitflags]
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `offset ? rows fetch first ? rows only`
    OffsetFetch,
    /// `fetch first ? rows only` without an offset clause.
    FetchFirst,
    /// `limit ? offset ?` or `limit ?,?`
    LimitOffset,
    /// `select top ? ...`
    Top,
    WindowFunctions,
    FullJoin,
    Lateral,
    /// `is [not] distinct from`
    DistinctFrom,
    /// `<=>`
    NullSafeEquals,
    RowValueEquality,
    RowValueOrdering,
    MultiRowValues,
    ValuesTable,
    Returning,
    /// `select ... from final table (insert ...)`
    FinalTable,
    BooleanType,
    Intersect,
    Merge,
    /// `update t join x on ... set ...` or `update t set ... from t, x`
    MultiTableDml,
    /// A DML statement may read its own target table in a subquery.
    SelfReferencingDml,
    SkipLocked,
    NoWait,
    SharedLocks,
    Rollup,
    Cube,
    LikeEscape,
    /// `/` on two integers yields an exact integer.
    IntegerDivision,
    /// `insert ... values (...) as excluded on duplicate key update`
    InsertRowAlias,
    /// `row(...)` constructors around values table rows.
    ValuesRowConstructor,
}

/// The target of a translation: a database family and its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    family: SqlFamily,
    version: DatabaseVersion,
    db2_variant: Db2Variant,
}

impl Dialect {
    pub fn new(family: SqlFamily, version: DatabaseVersion) -> Self {
        Self {
            family,
            version,
            db2_variant: Db2Variant::default(),
        }
    }

    /// The family at its default version.
    pub fn latest(family: SqlFamily) -> Self {
        Self::new(family, family.default_version())
    }

    pub fn db2(variant: Db2Variant, version: DatabaseVersion) -> Self {
        Self {
            family: SqlFamily::Db2,
            version,
            db2_variant: variant,
        }
    }

    pub fn standard() -> Self {
        Self::latest(SqlFamily::Standard)
    }

    pub fn db2_luw(major: u16, minor: u16) -> Self {
        Self::db2(Db2Variant::Luw, DatabaseVersion::new(major, minor, 0))
    }

    pub fn hana(major: u16, minor: u16) -> Self {
        Self::new(SqlFamily::Hana, DatabaseVersion::new(major, minor, 0))
    }

    pub fn mariadb(major: u16, minor: u16, patch: u16) -> Self {
        Self::new(SqlFamily::MariaDb, DatabaseVersion::new(major, minor, patch))
    }

    pub fn mysql(major: u16, minor: u16, patch: u16) -> Self {
        Self::new(SqlFamily::Mysql, DatabaseVersion::new(major, minor, patch))
    }

    pub fn oracle(major: u16) -> Self {
        Self::new(SqlFamily::Oracle, DatabaseVersion::new(major, 0, 0))
    }

    pub fn spanner() -> Self {
        Self::latest(SqlFamily::Spanner)
    }

    pub fn sybase_ase(major: u16, minor: u16) -> Self {
        Self::new(SqlFamily::SybaseAse, DatabaseVersion::new(major, minor, 0))
    }

    pub fn family(&self) -> SqlFamily {
        self.family
    }

    pub fn version(&self) -> DatabaseVersion {
        self.version
    }

    pub fn db2_variant(&self) -> Db2Variant {
        self.db2_variant
    }

    /// Parses a connection URL. The scheme names the family, the optional
    /// `version` and `variant` query parameters refine it.
    ///
    /// ```rust
    /// # use dialect_sql::dialect::*;
    /// # fn main() -> Result<(), dialect_sql::error::Error> {
    /// let dialect = Dialect::from_url("db2://localhost:50000/sample?version=10.5&variant=luw")?;
    ///
    /// assert_eq!(SqlFamily::Db2, dialect.family());
    /// assert_eq!(DatabaseVersion::new(10, 5, 0), dialect.version());
    /// assert!(!dialect.supports(Capability::OffsetFetch));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_url(url: &str) -> crate::Result<Self> {
        let url = Url::parse(url)?;
        let family: SqlFamily = url.scheme().parse()?;

        let mut version = None;
        let mut variant = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "version" => version = Some(value.parse::<DatabaseVersion>()?),
                "variant" => variant = Some(value.parse::<Db2Variant>()?),
                _ => (),
            }
        }

        let variant = match (url.scheme(), variant) {
            (_, Some(variant)) => variant,
            ("db2i", None) => Db2Variant::IbmI,
            ("db2zos", None) => Db2Variant::ZOs,
            _ => Db2Variant::default(),
        };

        Ok(Self {
            family,
            version: version.unwrap_or_else(|| family.default_version()),
            db2_variant: variant,
        })
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// The full capability set of this family at this version.
    pub fn capabilities(&self) -> BitFlags<Capability> {
        use Capability::*;

        let v = self.version;
        let mut caps = BitFlags::empty();

        let mut when = |cond: bool, flags: BitFlags<Capability>| {
            if cond {
                caps |= flags;
            }
        };

        match self.family {
            SqlFamily::Standard => {
                when(
                    true,
                    OffsetFetch
                        | FetchFirst
                        | WindowFunctions
                        | FullJoin
                        | Lateral
                        | DistinctFrom
                        | RowValueEquality
                        | RowValueOrdering
                        | MultiRowValues
                        | ValuesTable
                        | Returning
                        | BooleanType
                        | Intersect
                        | Merge
                        | SelfReferencingDml
                        | SkipLocked
                        | NoWait
                        | SharedLocks
                        | Rollup
                        | Cube
                        | LikeEscape
                        | IntegerDivision,
                );
            }
            SqlFamily::Db2 => {
                when(
                    true,
                    FetchFirst
                        | WindowFunctions
                        | FullJoin
                        | Lateral
                        | RowValueEquality
                        | MultiRowValues
                        | ValuesTable
                        | Intersect
                        | Merge
                        | SelfReferencingDml
                        | SharedLocks
                        | Rollup
                        | Cube
                        | LikeEscape
                        | IntegerDivision,
                );

                let (offset_fetch, final_table, modern) = match self.db2_variant {
                    Db2Variant::Luw => (
                        v.is_same_or_after(11, 1, 0),
                        true,
                        v.is_same_or_after(11, 1, 0),
                    ),
                    Db2Variant::IbmI => (
                        v.is_same_or_after(7, 2, 0),
                        v.is_same_or_after(7, 5, 0),
                        v.is_same_or_after(7, 3, 0),
                    ),
                    Db2Variant::ZOs => (
                        v.is_same_or_after(12, 0, 0),
                        v.is_same_or_after(10, 0, 0),
                        v.is_same_or_after(12, 0, 0),
                    ),
                };

                when(offset_fetch, OffsetFetch.into());
                when(final_table, FinalTable.into());
                when(modern, DistinctFrom | BooleanType | SkipLocked);
            }
            SqlFamily::Hana => {
                when(
                    true,
                    LimitOffset
                        | WindowFunctions
                        | FullJoin
                        | RowValueEquality
                        | BooleanType
                        | Intersect
                        | Merge
                        | MultiTableDml
                        | SelfReferencingDml
                        | SkipLocked
                        | NoWait
                        | SharedLocks
                        | Rollup
                        | Cube
                        | LikeEscape,
                );

                // HANA Cloud reports 4.x
                when(v.is_same_or_after(4, 0, 0), Lateral | ValuesTable);
            }
            SqlFamily::Mysql => {
                when(
                    true,
                    LimitOffset
                        | NullSafeEquals
                        | RowValueEquality
                        | RowValueOrdering
                        | MultiRowValues
                        | BooleanType
                        | MultiTableDml
                        | SharedLocks
                        | Rollup
                        | LikeEscape,
                );

                when(v.is_same_or_after(8, 0, 0), WindowFunctions | SkipLocked | NoWait);
                when(v.is_same_or_after(8, 0, 14), Lateral.into());
                when(
                    v.is_same_or_after(8, 0, 19),
                    ValuesTable | ValuesRowConstructor | InsertRowAlias,
                );
                when(v.is_same_or_after(8, 0, 31), Intersect.into());
            }
            SqlFamily::MariaDb => {
                when(
                    true,
                    LimitOffset
                        | NullSafeEquals
                        | RowValueEquality
                        | RowValueOrdering
                        | MultiRowValues
                        | BooleanType
                        | MultiTableDml
                        | SharedLocks
                        | Rollup
                        | LikeEscape,
                );

                when(v.is_same_or_after(10, 2, 0), WindowFunctions.into());
                when(v.is_same_or_after(10, 3, 0), ValuesTable | Intersect | NoWait);
                when(v.is_same_or_after(10, 5, 0), Returning.into());
                when(v.is_same_or_after(10, 6, 0), SkipLocked.into());
                when(v.is_same_or_after(11, 1, 0), SelfReferencingDml.into());
            }
            SqlFamily::Oracle => {
                when(
                    true,
                    WindowFunctions
                        | FullJoin
                        | RowValueEquality
                        | Intersect
                        | Merge
                        | SelfReferencingDml
                        | SkipLocked
                        | NoWait
                        | Rollup
                        | Cube
                        | LikeEscape,
                );

                when(v.is_same_or_after(12, 0, 0), OffsetFetch | FetchFirst | Lateral);
                when(
                    v.is_same_or_after(23, 0, 0),
                    DistinctFrom | RowValueOrdering | MultiRowValues | ValuesTable | BooleanType,
                );
            }
            SqlFamily::Spanner => {
                when(
                    true,
                    LimitOffset
                        | WindowFunctions
                        | FullJoin
                        | DistinctFrom
                        | MultiRowValues
                        | Returning
                        | BooleanType
                        | Intersect
                        | SelfReferencingDml
                        | Rollup,
                );
            }
            SqlFamily::SybaseAse => {
                when(
                    true,
                    Top | MultiTableDml | SelfReferencingDml | SharedLocks | LikeEscape | IntegerDivision,
                );

                when(v.is_same_or_after(15, 7, 0), Merge.into());
            }
        }

        caps
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.family, self.db2_variant) {
            (SqlFamily::Db2, Db2Variant::IbmI) => write!(f, "DB2 for IBM i {}", self.version),
            (SqlFamily::Db2, Db2Variant::ZOs) => write!(f, "DB2 for z/OS {}", self.version),
            (family, _) => write!(f, "{} {}", family, self.version),
        }
    }
}

/// Parses `family[:version]`, e.g. `oracle:19.3` or `mysql`.
impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let (family_part, version) = match s.split_once(':') {
            Some((family, version)) => (family, Some(version.parse::<DatabaseVersion>()?)),
            None => (s, None),
        };

        let family: SqlFamily = family_part.parse()?;

        let variant = match family_part.to_ascii_lowercase().as_str() {
            "db2i" => Db2Variant::IbmI,
            "db2zos" => Db2Variant::ZOs,
            _ => Db2Variant::Luw,
        };

        Ok(Self {
            family,
            version: version.unwrap_or_else(|| family.default_version()),
            db2_variant: variant,
        })
    }
}

#[derive(Deserialize)]
struct DialectConfig {
    family: SqlFamily,
    version: Option<DatabaseVersion>,
    #[serde(default)]
    variant: Db2Variant,
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let config = DialectConfig::deserialize(deserializer)?;

        Ok(Self {
            family: config.family,
            version: config.version.unwrap_or_else(|| config.family.default_version()),
            db2_variant: config.variant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_family_and_version() {
        let dialect: Dialect = "oracle:11.2".parse().unwrap();

        assert_eq!(SqlFamily::Oracle, dialect.family());
        assert!(!dialect.supports(Capability::OffsetFetch));
        assert!(!dialect.supports(Capability::Lateral));
    }

    #[test]
    fn missing_version_uses_family_default() {
        let dialect: Dialect = "mysql".parse().unwrap();
        assert_eq!(SqlFamily::Mysql.default_version(), dialect.version());
    }

    #[test]
    fn db2i_prefix_selects_variant() {
        let dialect: Dialect = "db2i:7.1".parse().unwrap();

        assert_eq!(Db2Variant::IbmI, dialect.db2_variant());
        assert!(!dialect.supports(Capability::OffsetFetch));
        assert!(dialect.supports(Capability::FetchFirst));
    }

    #[test]
    fn unknown_family_is_an_error() {
        let err = "postgres:16".parse::<Dialect>().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidDialect(_)));
    }

    #[test]
    fn url_with_variant() {
        let dialect = Dialect::from_url("db2://host/db?variant=zos&version=12").unwrap();

        assert_eq!(Db2Variant::ZOs, dialect.db2_variant());
        assert!(dialect.supports(Capability::OffsetFetch));
    }

    #[test]
    fn malformed_url_keeps_the_parser_message() {
        let err = Dialect::from_url("no scheme here").unwrap_err();

        assert!(matches!(err.kind(), ErrorKind::InvalidDialect(_)));
        assert!(err.original_message().is_some());
    }

    #[test]
    fn deserializes_from_json() {
        let dialect: Dialect = serde_json::from_str(r#"{"family":"maria_db","version":"10.4"}"#).unwrap();

        assert_eq!(SqlFamily::MariaDb, dialect.family());
        assert!(!dialect.supports(Capability::Returning));
        assert!(!dialect.supports(Capability::SelfReferencingDml));
    }

    #[test]
    fn mysql_row_alias_threshold() {
        assert!(!Dialect::mysql(8, 0, 18).supports(Capability::InsertRowAlias));
        assert!(Dialect::mysql(8, 0, 19).supports(Capability::InsertRowAlias));
    }
}
