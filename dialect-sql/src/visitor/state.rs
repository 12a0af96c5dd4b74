use std::collections::BTreeSet;

use crate::{
    ast::{CteMaterialization, LockOptions, SqlType},
    dialect::Dialect,
    operation::{JdbcOperation, ParameterBinder},
};

/// The clause currently being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Offset,
    Fetch,
    Over,
    Insert,
    Values,
    Update,
    Set,
    Delete,
    Merge,
    Conflict,
    Returning,
}

/// How parameters and `null` literals are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterRenderingMode {
    #[default]
    Default,
    /// Wrap in a cast so the database can infer a type, e.g. in a select
    /// list or a `values` row used as a merge source.
    NoUntyped,
}

/// How the requested row locks are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStrategy {
    /// A clause or table hints in the statement itself.
    Clause,
    /// A separate statement after this one.
    FollowOn,
    /// Not at all.
    None,
}

/// The kind of statement a translation renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Upsert,
}

/// What the walker needs to know about an enclosing query part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPartFrame {
    pub is_group: bool,
    pub is_root: bool,
    pub has_sort: bool,
    pub has_offset_or_fetch: bool,
}

/// Column aliases forced onto the selections of the query specs at a
/// given depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectionAliases {
    pub(crate) depth: usize,
    pub(crate) names: Vec<String>,
}

/// Mutable state of one translation. Created per statement, dropped after
/// producing the [`JdbcOperation`].
#[derive(Debug)]
pub struct Translation {
    dialect: Dialect,
    sql: String,
    binders: Vec<ParameterBinder>,
    affected_tables: BTreeSet<String>,
    clause_stack: Vec<Clause>,
    query_part_stack: Vec<QueryPartFrame>,
    pub(crate) statement_kind: Option<StatementKind>,
    pub(crate) row_numbering_depth: Option<usize>,
    pub(crate) selection_aliases: Option<SelectionAliases>,
    pub(crate) in_lateral: bool,
    pub(crate) parameter_mode: ParameterRenderingMode,
    pub(crate) lock_options: Option<LockOptions>,
    pub(crate) lock_strategy: LockStrategy,
    pub(crate) follow_on_locking: bool,
    pub(crate) unique_constraint_name: Option<String>,
    pub(crate) dml_target: Option<String>,
    pub(crate) excluded_as_values_function: bool,
    pub(crate) current_cte: Option<(CteMaterialization, usize)>,
    pub(crate) struct_selection_depth: Option<usize>,
    alias_counter: usize,
}

impl Translation {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::with_capacity(256),
            binders: Vec::new(),
            affected_tables: BTreeSet::new(),
            clause_stack: Vec::new(),
            query_part_stack: Vec::new(),
            statement_kind: None,
            row_numbering_depth: None,
            selection_aliases: None,
            in_lateral: false,
            parameter_mode: ParameterRenderingMode::default(),
            lock_options: None,
            lock_strategy: LockStrategy::None,
            follow_on_locking: false,
            unique_constraint_name: None,
            dml_target: None,
            excluded_as_values_function: false,
            current_cte: None,
            struct_selection_depth: None,
            alias_counter: 0,
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub(crate) fn buffer(&mut self) -> &mut String {
        &mut self.sql
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn add_binder(&mut self, name: &str, sql_type: SqlType) {
        self.binders.push(ParameterBinder::new(name, sql_type));
    }

    pub(crate) fn add_affected_table(&mut self, name: &str) {
        if !self.affected_tables.contains(name) {
            self.affected_tables.insert(name.to_string());
        }
    }

    pub fn current_clause(&self) -> Option<Clause> {
        self.clause_stack.last().copied()
    }

    pub fn is_in_clause(&self, clause: Clause) -> bool {
        self.clause_stack.contains(&clause)
    }

    pub fn clause_stack_is_empty(&self) -> bool {
        self.clause_stack.is_empty()
    }

    pub(crate) fn push_clause(&mut self, clause: Clause) {
        self.clause_stack.push(clause);
    }

    pub(crate) fn pop_clause(&mut self) {
        self.clause_stack.pop();
    }

    /// Number of query parts currently being rendered.
    pub fn query_part_depth(&self) -> usize {
        self.query_part_stack.len()
    }

    pub(crate) fn push_query_part(&mut self, frame: QueryPartFrame) {
        self.query_part_stack.push(frame);
    }

    pub(crate) fn pop_query_part(&mut self) {
        self.query_part_stack.pop();
    }

    pub fn current_query_part(&self) -> Option<&QueryPartFrame> {
        self.query_part_stack.last()
    }

    /// The query part enclosing the current one.
    pub fn parent_query_part(&self) -> Option<&QueryPartFrame> {
        let len = self.query_part_stack.len();
        if len < 2 {
            None
        } else {
            self.query_part_stack.get(len - 2)
        }
    }

    /// Any enclosing query part is a query group.
    pub fn is_part_of_query_group(&self) -> bool {
        self.query_part_stack.iter().any(|frame| frame.is_group)
    }

    /// The query part being rendered is the target of a row numbering
    /// emulation, i.e. its pagination is applied by an outer query.
    pub fn is_row_numbering_current_query_part(&self) -> bool {
        self.row_numbering_depth == Some(self.query_part_stack.len())
    }

    /// The query part about to be entered is the row numbering target.
    pub fn is_row_numbering_next_query_part(&self) -> bool {
        self.row_numbering_depth == Some(self.query_part_stack.len() + 1)
    }

    /// Forced aliases apply to the current query spec: it sits at the alias
    /// depth or below it with only query groups in between.
    pub(crate) fn forced_selection_aliases(&self) -> Option<&[String]> {
        let aliases = self.selection_aliases.as_ref()?;
        let depth = self.query_part_stack.len();

        if depth < aliases.depth || aliases.depth == 0 {
            return None;
        }

        let between = &self.query_part_stack[aliases.depth - 1..depth - 1];

        if between.iter().all(|frame| frame.is_group) {
            Some(&aliases.names)
        } else {
            None
        }
    }

    /// A fresh number for synthetic aliases.
    pub(crate) fn next_alias_number(&mut self) -> usize {
        let next = self.alias_counter;
        self.alias_counter += 1;
        next
    }

    pub(crate) fn into_operation(self) -> JdbcOperation {
        JdbcOperation {
            sql: self.sql,
            parameter_binders: self.binders,
            affected_table_names: self.affected_tables,
            unique_constraint_name_that_may_fail: self.unique_constraint_name,
            follow_on_locking: self.follow_on_locking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(is_group: bool) -> QueryPartFrame {
        QueryPartFrame {
            is_group,
            is_root: false,
            has_sort: false,
            has_offset_or_fetch: false,
        }
    }

    #[test]
    fn forced_aliases_pass_through_groups_only() {
        let mut translation = Translation::new(Dialect::standard());

        translation.selection_aliases = Some(SelectionAliases {
            depth: 1,
            names: vec!["c0".into()],
        });

        translation.push_query_part(frame(true));
        translation.push_query_part(frame(false));
        assert!(translation.forced_selection_aliases().is_some());

        translation.push_query_part(frame(false));
        assert!(translation.forced_selection_aliases().is_none());
    }

    #[test]
    fn row_numbering_target_is_tracked_by_depth() {
        let mut translation = Translation::new(Dialect::standard());
        translation.row_numbering_depth = Some(1);

        assert!(translation.is_row_numbering_next_query_part());

        translation.push_query_part(frame(false));
        assert!(translation.is_row_numbering_current_query_part());

        translation.push_query_part(frame(false));
        assert!(!translation.is_row_numbering_current_query_part());
    }
}
