use std::borrow::Cow;

use crate::ast::{
    DeleteStatement, InsertStatement, OptionalTableUpdate, QueryGroup, QueryPart, QuerySpec, UpdateStatement,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CteMaterialization {
    #[default]
    Undefined,
    Materialized,
    NotMaterialized,
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CteStatement<'a> {
    pub(crate) name: Cow<'a, str>,
    pub(crate) column_names: Vec<Cow<'a, str>>,
    pub(crate) query: QueryPart<'a>,
    pub(crate) materialization: CteMaterialization,
    pub(crate) recursive: bool,
}

impl<'a> CteStatement<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, query: impl Into<QueryPart<'a>>) -> Self {
        Self {
            name: name.into(),
            column_names: Vec::new(),
            query: query.into(),
            materialization: CteMaterialization::default(),
            recursive: false,
        }
    }

    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.column_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn materialization(mut self, materialization: CteMaterialization) -> Self {
        self.materialization = materialization;
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    #[default]
    None,
    PessimisticRead,
    PessimisticWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockWait {
    #[default]
    Wait,
    NoWait,
    SkipLocked,
}

/// How the caller wants follow-on locking handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowOnLocking {
    /// Decide from the query structure and the dialect.
    #[default]
    Allow,
    /// Always lock with a separate, subsequent query.
    Force,
    /// Never use follow-on locking; skip locking when it would be needed.
    Ignore,
    /// Fail when follow-on locking would be needed.
    Disallow,
}

/// Pessimistic lock request attached to a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockOptions {
    pub(crate) mode: LockMode,
    pub(crate) wait: LockWait,
    pub(crate) follow_on: FollowOnLocking,
}

impl LockOptions {
    pub fn new(mode: LockMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn wait(mut self, wait: LockWait) -> Self {
        self.wait = wait;
        self
    }

    pub fn follow_on(mut self, follow_on: FollowOnLocking) -> Self {
        self.follow_on = follow_on;
        self
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement<'a> {
    pub(crate) ctes: Vec<CteStatement<'a>>,
    pub(crate) query_part: QueryPart<'a>,
    pub(crate) lock_options: Option<LockOptions>,
}

impl<'a> SelectStatement<'a> {
    pub fn new(query_part: impl Into<QueryPart<'a>>) -> Self {
        Self {
            ctes: Vec::new(),
            query_part: query_part.into(),
            lock_options: None,
        }
    }

    pub fn with(mut self, cte: CteStatement<'a>) -> Self {
        self.ctes.push(cte);
        self
    }

    pub fn lock(mut self, options: LockOptions) -> Self {
        self.lock_options = Some(options);
        self
    }

    pub fn query_part(&self) -> &QueryPart<'a> {
        &self.query_part
    }
}

/// The root of a statement tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'a> {
    Select(SelectStatement<'a>),
    Insert(InsertStatement<'a>),
    Update(UpdateStatement<'a>),
    Delete(DeleteStatement<'a>),
    Upsert(OptionalTableUpdate<'a>),
}

impl<'a> From<SelectStatement<'a>> for Statement<'a> {
    fn from(select: SelectStatement<'a>) -> Self {
        Statement::Select(select)
    }
}

impl<'a> From<InsertStatement<'a>> for Statement<'a> {
    fn from(insert: InsertStatement<'a>) -> Self {
        Statement::Insert(insert)
    }
}

impl<'a> From<UpdateStatement<'a>> for Statement<'a> {
    fn from(update: UpdateStatement<'a>) -> Self {
        Statement::Update(update)
    }
}

impl<'a> From<DeleteStatement<'a>> for Statement<'a> {
    fn from(delete: DeleteStatement<'a>) -> Self {
        Statement::Delete(delete)
    }
}

impl<'a> From<OptionalTableUpdate<'a>> for Statement<'a> {
    fn from(upsert: OptionalTableUpdate<'a>) -> Self {
        Statement::Upsert(upsert)
    }
}

impl<'a> From<QueryPart<'a>> for Statement<'a> {
    fn from(query_part: QueryPart<'a>) -> Self {
        Statement::Select(SelectStatement::new(query_part))
    }
}

impl<'a> From<QuerySpec<'a>> for Statement<'a> {
    fn from(spec: QuerySpec<'a>) -> Self {
        Statement::from(QueryPart::from(spec))
    }
}

impl<'a> From<QueryGroup<'a>> for Statement<'a> {
    fn from(group: QueryGroup<'a>) -> Self {
        Statement::from(QueryPart::from(group))
    }
}
