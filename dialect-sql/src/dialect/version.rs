use serde::{de, Deserialize, Deserializer};
use std::{fmt, str::FromStr};

use crate::error::{Error, ErrorKind};

/// A database server version with major/minor/patch granularity.
///
/// ```rust
/// # use dialect_sql::dialect::DatabaseVersion;
/// let version: DatabaseVersion = "8.0.19".parse().unwrap();
///
/// assert!(version.is_same_or_after(8, 0, 19));
/// assert!(version.is_before(8, 0, 31));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatabaseVersion {
    major: u16,
    minor: u16,
    patch: u16,
}

impl DatabaseVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self { major, minor, patch }
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }

    pub fn patch(&self) -> u16 {
        self.patch
    }

    pub fn is_same_or_after(&self, major: u16, minor: u16, patch: u16) -> bool {
        *self >= Self::new(major, minor, patch)
    }

    pub fn is_before(&self, major: u16, minor: u16, patch: u16) -> bool {
        !self.is_same_or_after(major, minor, patch)
    }
}

impl fmt::Display for DatabaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for DatabaseVersion {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let mut parts = s.trim().split('.');
        let mut next = || -> crate::Result<u16> {
            match parts.next() {
                Some(part) if !part.is_empty() => Ok(part.parse()?),
                Some(_) => Err(Error::builder(ErrorKind::invalid_dialect(format!("malformed version `{s}`"))).build()),
                None => Ok(0),
            }
        };

        let version = Self::new(next()?, next()?, next()?);

        if parts.next().is_some() {
            let kind = ErrorKind::invalid_dialect(format!("too many version components in `{s}`"));
            return Err(Error::builder(kind).build());
        }

        Ok(version)
    }
}

impl<'de> Deserialize<'de> for DatabaseVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
