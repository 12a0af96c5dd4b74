//! Error module
use std::{borrow::Cow, fmt};
use thiserror::Error;

use crate::dialect::SqlFamily;

#[derive(Debug, Error)]
/// The error type for translating a statement tree into SQL.
///
/// A translation either produces the complete operation or one of these
/// errors; no partially rendered SQL escapes the translator.
pub struct Error {
    kind: ErrorKind,
    dialect: Option<String>,
    original_message: Option<String>,
}

pub(crate) struct ErrorBuilder {
    kind: ErrorKind,
    dialect: Option<String>,
    original_message: Option<String>,
}

impl ErrorBuilder {
    pub(crate) fn set_dialect(&mut self, dialect: impl Into<String>) -> &mut Self {
        self.dialect = Some(dialect.into());
        self
    }

    pub(crate) fn set_original_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.original_message = Some(message.into());
        self
    }

    pub(crate) fn build(self) -> Error {
        Error {
            kind: self.kind,
            dialect: self.dialect,
            original_message: self.original_message,
        }
    }
}

impl Error {
    pub(crate) fn builder(kind: ErrorKind) -> ErrorBuilder {
        ErrorBuilder {
            kind,
            dialect: None,
            original_message: None,
        }
    }

    /// A construct the target database can neither render natively nor
    /// emulate.
    pub(crate) fn unsupported(feature: impl Into<Cow<'static, str>>, family: SqlFamily) -> Self {
        let mut builder = Self::builder(ErrorKind::UnsupportedFeature {
            feature: feature.into(),
            dialect: family.to_string(),
        });

        builder.set_dialect(family.to_string());
        builder.build()
    }

    /// The statement tree breaks an invariant the translator relies on.
    pub(crate) fn assertion(message: impl Into<Cow<'static, str>>) -> Self {
        Self::builder(ErrorKind::AssertionFailure(message.into())).build()
    }

    pub(crate) fn illegal_operation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::builder(ErrorKind::IllegalQueryOperation(message.into())).build()
    }

    pub(crate) fn known_broken(
        feature: impl Into<Cow<'static, str>>,
        family: SqlFamily,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        let mut builder = Self::builder(ErrorKind::KnownBroken {
            feature: feature.into(),
            dialect: family.to_string(),
            reason: reason.into(),
        });

        builder.set_dialect(family.to_string());
        builder.build()
    }

    /// The dialect the failing translation targeted, if known.
    pub fn dialect(&self) -> Option<&str> {
        self.dialect.as_deref()
    }

    /// Additional context attached where the error was raised.
    pub fn original_message(&self) -> Option<&str> {
        self.original_message.as_deref()
    }

    /// A more specific error type for matching.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// True for the unsupported-operation class of errors.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind, ErrorKind::UnsupportedFeature { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("{} is not supported by {}", feature, dialect)]
    UnsupportedFeature { feature: Cow<'static, str>, dialect: String },

    #[error("{} is known to be broken on {}: {}", feature, dialect, reason)]
    KnownBroken {
        feature: Cow<'static, str>,
        dialect: String,
        reason: Cow<'static, str>,
    },

    #[error("Illegal query operation: {}", _0)]
    IllegalQueryOperation(Cow<'static, str>),

    #[error("Assertion failed: {}", _0)]
    AssertionFailure(Cow<'static, str>),

    #[error("Conversion failed: {}", _0)]
    ConversionError(Cow<'static, str>),

    #[error("Invalid dialect configuration: {}", _0)]
    InvalidDialect(String),
}

impl ErrorKind {
    pub(crate) fn conversion(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::ConversionError(msg.into())
    }

    pub(crate) fn invalid_dialect(msg: impl Into<String>) -> Self {
        Self::InvalidDialect(msg.into())
    }
}

impl From<Error> for ErrorKind {
    fn from(e: Error) -> Self {
        e.kind
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::builder(ErrorKind::conversion("Problems writing AST into a query string.")).build()
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Error {
        let mut builder = Error::builder(ErrorKind::invalid_dialect("malformed connection url"));
        builder.set_original_message(e.to_string());
        builder.build()
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Error {
        let kind = ErrorKind::invalid_dialect(format!("invalid version component: {e}"));
        Error::builder(kind).build()
    }
}
