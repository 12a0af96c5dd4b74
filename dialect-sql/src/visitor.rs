//! Visitors for reading a statement tree and generating dialect-specific SQL.
//!
//! Every supported database has its own translator implementing [`Visitor`].
//! The trait's provided methods render standard SQL and delegate the
//! decisions a database may answer differently to small hooks, which the
//! translators override. Overrides that only extend the default behavior
//! call the matching `*_standard` method.
//!
//! Emulations shared by several databases, such as pagination through row
//! numbering or `full join` through a `union all`, live in helper modules
//! and are reached through the hooks.
use std::{borrow::Cow, fmt, fmt::Write as _};

use tracing::{debug, trace};

use crate::{
    ast::*,
    dialect::{Capability, Dialect},
    error::Error,
    operation::JdbcOperation,
};

/// Declares the storage of a translator and implements the state accessors
/// the [`Visitor`] trait requires.
macro_rules! translator {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name {
            translation: $crate::visitor::Translation,
        }
    };
}

macro_rules! translation_accessors {
    () => {
        fn from_translation(translation: $crate::visitor::Translation) -> Self {
            Self { translation }
        }

        fn state(&self) -> &$crate::visitor::Translation {
            &self.translation
        }

        fn state_mut(&mut self) -> &mut $crate::visitor::Translation {
            &mut self.translation
        }

        fn into_translation(self) -> $crate::visitor::Translation {
            self.translation
        }
    };
}

mod db2;
mod emulation;
mod hana;
mod locking;
mod mariadb;
mod merge;
mod mysql;
mod on_duplicate_key;
mod oracle;
mod spanner;
mod standard;
mod state;
mod sybase_ase;

pub use db2::Db2;
pub use hana::Hana;
pub use mariadb::MariaDb;
pub use mysql::Mysql;
pub use oracle::Oracle;
pub use spanner::Spanner;
pub use standard::Standard;
pub use state::*;
pub use sybase_ase::SybaseAse;

/// Result of rendering a fragment into the translation buffer.
pub type Result = crate::Result<()>;

/// A translator from the statement tree into SQL for one database family.
pub trait Visitor: Sized {
    fn from_translation(translation: Translation) -> Self;

    fn state(&self) -> &Translation;

    fn state_mut(&mut self) -> &mut Translation;

    fn into_translation(self) -> Translation;

    /// Renders a statement into an executable operation.
    fn build(dialect: Dialect, statement: &Statement<'_>) -> crate::Result<JdbcOperation> {
        let mut visitor = Self::from_translation(Translation::new(dialect));
        visitor.visit_statement(statement)?;

        let operation = visitor.into_translation().into_operation();

        debug!(
            target: "dialect_sql::translate",
            dialect = %dialect,
            sql = operation.sql(),
            binders = operation.parameter_binders().len(),
            follow_on_locking = operation.needs_follow_on_locking(),
            "translated statement"
        );

        Ok(operation)
    }

    fn dialect(&self) -> Dialect {
        *self.state().dialect()
    }

    fn supports(&self, capability: Capability) -> bool {
        self.state().dialect().supports(capability)
    }

    fn unsupported(&self, feature: impl Into<Cow<'static, str>>) -> Error {
        Error::unsupported(feature, self.dialect().family())
    }

    /// Appends to the SQL buffer.
    fn write<D: fmt::Display>(&mut self, s: D) -> Result {
        write!(self.state_mut().buffer(), "{s}")?;
        Ok(())
    }

    fn surround_with<F>(&mut self, begin: &str, end: &str, f: F) -> Result
    where
        F: FnOnce(&mut Self) -> Result,
    {
        self.write(begin)?;
        f(self)?;
        self.write(end)
    }

    /// Renders the items with a separator in between.
    fn visit_separated<T, F>(&mut self, items: &[T], separator: &str, mut f: F) -> Result
    where
        F: FnMut(&mut Self, &T) -> Result,
    {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(separator)?;
            }

            f(self, item)?;
        }

        Ok(())
    }

    fn with_clause<F>(&mut self, clause: Clause, f: F) -> Result
    where
        F: FnOnce(&mut Self) -> Result,
    {
        self.state_mut().push_clause(clause);
        let result = f(self);
        self.state_mut().pop_clause();

        result
    }

    fn with_parameter_mode<F>(&mut self, mode: ParameterRenderingMode, f: F) -> Result
    where
        F: FnOnce(&mut Self) -> Result,
    {
        let previous = std::mem::replace(&mut self.state_mut().parameter_mode, mode);
        let result = f(self);
        self.state_mut().parameter_mode = previous;

        result
    }

    /// Makes the part the current query part while `f` runs.
    fn with_query_part<'a, P, F>(&mut self, part: &P, f: F) -> Result
    where
        P: Paginated<'a> + ?Sized,
        F: FnOnce(&mut Self) -> Result,
    {
        self.state_mut().push_query_part(QueryPartFrame {
            is_group: part.is_group(),
            is_root: part.is_root(),
            has_sort: part.has_sort_specifications(),
            has_offset_or_fetch: part.has_offset_or_fetch_clause(),
        });

        let result = f(self);
        self.state_mut().pop_query_part();

        result
    }

    fn visit_statement(&mut self, statement: &Statement<'_>) -> Result {
        let kind = match statement {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::Upsert(_) => StatementKind::Upsert,
        };

        self.state_mut().statement_kind = Some(kind);

        match statement {
            Statement::Select(select) => self.visit_select_statement(select),
            Statement::Insert(insert) => self.visit_insert_statement(insert),
            Statement::Update(update) => self.visit_update_statement(update),
            Statement::Delete(delete) => self.visit_delete_statement(delete),
            Statement::Upsert(upsert) => self.visit_optional_table_update(upsert),
        }
    }

    fn visit_select_statement(&mut self, select: &SelectStatement<'_>) -> Result {
        let options = select.lock_options.filter(|options| options.mode != LockMode::None);
        self.state_mut().lock_options = options;

        if let Some(options) = options {
            let strategy = match &select.query_part {
                QueryPart::Spec(spec) => self.determine_locking_strategy(spec, options.follow_on)?,
                QueryPart::Group(_) => {
                    locking::resolve(options.follow_on, "Locking with set operators is not supported")?
                }
            };

            trace!(target: "dialect_sql::translate", ?strategy, "resolved locking strategy");

            let state = self.state_mut();
            state.lock_strategy = strategy;
            state.follow_on_locking = strategy == LockStrategy::FollowOn;
        }

        self.visit_cte_container(&select.ctes)?;
        self.visit_query_part(&select.query_part)
    }

    /// Whether a `with` clause may be used in this position.
    fn supports_with_clause(&self) -> bool {
        true
    }

    fn needs_recursive_keyword_in_with_clause(&self) -> bool {
        true
    }

    fn visit_cte_container(&mut self, ctes: &[CteStatement<'_>]) -> Result {
        if ctes.is_empty() {
            return Ok(());
        }

        if !self.supports_with_clause() {
            return Err(self.unsupported("with clause"));
        }

        self.write("with ")?;

        if self.needs_recursive_keyword_in_with_clause() && ctes.iter().any(|cte| cte.recursive) {
            self.write("recursive ")?;
        }

        for (i, cte) in ctes.iter().enumerate() {
            if i > 0 {
                self.write(",")?;
            }

            self.write(&cte.name)?;

            if !cte.column_names.is_empty() {
                self.surround_with("(", ")", |v| {
                    v.visit_separated(&cte.column_names, ",", |v, name| v.write(name))
                })?;
            }

            self.write(" as ")?;
            self.render_cte_materialization(cte.materialization)?;

            let depth = self.state().query_part_depth() + 1;
            let previous = self.state_mut().current_cte.replace((cte.materialization, depth));
            let result = self.surround_with("(", ")", |v| v.visit_query_part(&cte.query));
            self.state_mut().current_cte = previous;

            result?;
        }

        self.write(" ")
    }

    fn render_cte_materialization(&mut self, _materialization: CteMaterialization) -> Result {
        Ok(())
    }

    fn visit_query_part(&mut self, part: &QueryPart<'_>) -> Result {
        match part {
            QueryPart::Spec(spec) => self.visit_query_spec(spec),
            QueryPart::Group(group) => self.visit_query_group(group),
        }
    }

    fn visit_query_spec(&mut self, spec: &QuerySpec<'_>) -> Result {
        if self.needs_full_join_emulation(spec) {
            return emulation::emulate_full_join(self, spec);
        }

        if self.should_emulate_fetch_clause(spec) {
            return emulation::emulate_fetch_offset_with_window_functions(self, emulation::PartRef::Spec(spec));
        }

        self.visit_query_spec_standard(spec)
    }

    fn visit_query_spec_standard(&mut self, spec: &QuerySpec<'_>) -> Result {
        self.with_query_part(spec, |v| {
            v.render_select_clause(spec)?;
            v.visit_from_clause(&spec.from_clause)?;
            v.visit_where_clause(spec.restriction.as_ref())?;
            v.visit_group_by_clause(&spec.group_by)?;
            v.visit_having_clause(spec.having.as_ref())?;
            v.visit_order_by(&spec.sort)?;
            v.visit_offset_fetch_clause(spec)?;

            if spec.root && v.state().lock_strategy == LockStrategy::Clause {
                v.visit_for_update_clause()?;
            }

            Ok(())
        })
    }

    fn needs_full_join_emulation(&self, spec: &QuerySpec<'_>) -> bool {
        !self.supports(Capability::FullJoin) && spec.from_clause.has_join_of_type(JoinType::Full)
    }

    fn visit_query_group(&mut self, group: &QueryGroup<'_>) -> Result {
        if self.should_emulate_fetch_clause(group) {
            return emulation::emulate_fetch_offset_with_window_functions(self, emulation::PartRef::Group(group));
        }

        self.visit_query_group_standard(group)
    }

    fn visit_query_group_standard(&mut self, group: &QueryGroup<'_>) -> Result {
        let needs_intersect = matches!(
            group.set_operator,
            SetOperator::Intersect | SetOperator::IntersectAll | SetOperator::Except | SetOperator::ExceptAll
        );

        if needs_intersect && !self.supports(Capability::Intersect) {
            return Err(self.unsupported(group.set_operator.sql_text()));
        }

        self.with_query_part(group, |v| {
            for (i, part) in group.parts.iter().enumerate() {
                if i > 0 {
                    v.write(" ")?;
                    v.render_set_operator(group.set_operator)?;
                    v.write(" ")?;
                }

                let wrap = part.is_group() || part.has_sort_specifications() || part.has_offset_or_fetch_clause();

                if wrap {
                    v.surround_with("(", ")", |v| v.visit_query_part(part))?;
                } else {
                    v.visit_query_part(part)?;
                }
            }

            v.visit_order_by(&group.sort)?;
            v.visit_offset_fetch_clause(group)
        })
    }

    fn render_set_operator(&mut self, operator: SetOperator) -> Result {
        self.write(operator.sql_text())
    }

    fn render_select_clause(&mut self, spec: &QuerySpec<'_>) -> Result {
        let mode = self.select_clause_parameter_mode();

        self.with_clause(Clause::Select, |v| {
            v.write("select ")?;
            v.render_select_hints(spec)?;

            if spec.select_clause.distinct {
                v.write("distinct ")?;
            }

            v.render_select_modifiers(spec)?;
            v.with_parameter_mode(mode, |v| v.visit_sql_selections(spec))
        })
    }

    /// How parameters in a select list are rendered.
    fn select_clause_parameter_mode(&self) -> ParameterRenderingMode {
        self.state().parameter_mode
    }

    /// Optimizer hints right after `select`.
    fn render_select_hints(&mut self, _spec: &QuerySpec<'_>) -> Result {
        Ok(())
    }

    /// Modifiers after `distinct`, e.g. `top ?`.
    fn render_select_modifiers(&mut self, _spec: &QuerySpec<'_>) -> Result {
        Ok(())
    }

    fn visit_sql_selections(&mut self, spec: &QuerySpec<'_>) -> Result {
        let forced = self.state().forced_selection_aliases().map(|names| names.to_vec());

        for (i, selection) in spec.select_clause.selections.iter().enumerate() {
            if i > 0 {
                self.write(",")?;
            }

            self.visit_expression(&selection.expression)?;

            match forced.as_ref().and_then(|names| names.get(i)) {
                Some(alias) => {
                    self.write(" ")?;
                    self.write(alias)?;
                }
                None => {
                    if let Some(alias) = &selection.alias {
                        self.write(" ")?;
                        self.write(alias)?;
                    }
                }
            }
        }

        if self.state().is_row_numbering_current_query_part() {
            emulation::render_row_numbering_selections(self, spec)?;
        }

        Ok(())
    }

    /// The window function numbering the rows of a paginated query.
    fn render_row_number(&mut self, sort: &[SortSpecification<'_>]) -> Result {
        self.write("row_number() over(order by ")?;

        if sort.is_empty() {
            self.write("1")?;
        } else {
            self.visit_sort_specifications(sort)?;
        }

        self.write(")")
    }

    /// Rendered when a query spec has an empty `from` clause.
    fn render_from_dual(&mut self) -> Result {
        Ok(())
    }

    fn visit_from_clause(&mut self, from: &FromClause<'_>) -> Result {
        if from.roots.is_empty() {
            return self.render_from_dual();
        }

        self.write(" from ")?;

        self.with_clause(Clause::From, |v| {
            v.visit_separated(&from.roots, ",", |v, root| v.visit_table_group(root))
        })
    }

    fn visit_table_group(&mut self, group: &TableGroup<'_>) -> Result {
        self.visit_table_reference(&group.primary)?;

        for join in group.joins.iter() {
            self.visit_table_group_join(join)?;
        }

        Ok(())
    }

    fn visit_table_group_join(&mut self, join: &TableGroupJoin<'_>) -> Result {
        if let TableReference::Derived(derived) = &join.group.primary {
            if derived.lateral && !self.supports(Capability::Lateral) {
                return self.render_lateral_join(join, derived);
            }
        }

        self.visit_table_group_join_standard(join)
    }

    fn visit_table_group_join_standard(&mut self, join: &TableGroupJoin<'_>) -> Result {
        let join_type = match (join.join_type, &join.predicate) {
            (JoinType::Inner, None) => JoinType::Cross,
            (join_type, _) => join_type,
        };

        self.write(join_type.sql_text())?;
        self.visit_table_reference(&join.group.primary)?;

        if join_type != JoinType::Cross {
            self.write(" on ")?;

            match &join.predicate {
                Some(predicate) => self.visit_predicate(predicate)?,
                None => self.render_true_predicate()?,
            }
        }

        for nested in join.group.joins.iter() {
            self.visit_table_group_join(nested)?;
        }

        Ok(())
    }

    /// A lateral subquery the database cannot join natively.
    fn render_lateral_join(&mut self, join: &TableGroupJoin<'_>, derived: &DerivedTableReference<'_>) -> Result {
        emulation::render_lateral_join_with_intersect(self, join, derived)
    }

    fn visit_table_reference(&mut self, table: &TableReference<'_>) -> Result {
        match table {
            TableReference::Named(named) => self.visit_named_table_reference(named),
            TableReference::Derived(derived) => self.visit_derived_table_reference(derived),
            TableReference::Function(function) => self.visit_function_table_reference(function),
            TableReference::Values(values) => self.visit_values_table_reference(values),
            TableReference::Union(union) => self.visit_union_table_reference(union),
        }
    }

    fn visit_named_table_reference(&mut self, table: &NamedTableReference<'_>) -> Result {
        self.state_mut().add_affected_table(&table.name);
        self.write(&table.name)?;

        if let Some(alias) = &table.alias {
            self.write(" ")?;
            self.write(alias)?;
        }

        if self.is_locked_table_position() {
            self.render_table_lock_hint()?;
        }

        Ok(())
    }

    /// A table in the `from` clause of the root query of a statement that
    /// locks with a clause.
    fn is_locked_table_position(&self) -> bool {
        let state = self.state();

        state.lock_strategy == LockStrategy::Clause
            && state.is_in_clause(Clause::From)
            && state.current_query_part().map(|frame| frame.is_root).unwrap_or(false)
    }

    /// A per-table lock hint, for databases that lock with table hints.
    fn render_table_lock_hint(&mut self) -> Result {
        Ok(())
    }

    /// Whether `alias(a,b)` may follow a derived table.
    fn supports_derived_column_list(&self) -> bool {
        true
    }

    fn visit_derived_table_reference(&mut self, derived: &DerivedTableReference<'_>) -> Result {
        if derived.lateral && self.supports(Capability::Lateral) {
            self.write("lateral ")?;
        }

        let in_lateral = self.state().in_lateral;
        self.state_mut().in_lateral = in_lateral || derived.lateral;

        let result = if derived.column_names.is_empty() || self.supports_derived_column_list() {
            self.visit_derived_table_reference_standard(derived)
        } else {
            emulation::render_derived_table_with_selection_aliases(self, derived)
        };

        self.state_mut().in_lateral = in_lateral;
        result
    }

    fn visit_derived_table_reference_standard(&mut self, derived: &DerivedTableReference<'_>) -> Result {
        self.surround_with("(", ")", |v| v.visit_query_part(&derived.query))?;
        self.render_table_alias_with_columns(&derived.alias, &derived.column_names)
    }

    fn render_table_alias_with_columns(&mut self, alias: &str, columns: &[Cow<'_, str>]) -> Result {
        self.write(" ")?;
        self.write(alias)?;

        if !columns.is_empty() {
            self.surround_with("(", ")", |v| v.visit_separated(columns, ",", |v, column| v.write(column)))?;
        }

        Ok(())
    }

    fn visit_function_table_reference(&mut self, function: &FunctionTableReference<'_>) -> Result {
        if function.lateral && self.supports(Capability::Lateral) {
            self.write("lateral ")?;
        }

        self.visit_function(&function.function)?;

        match &function.ordinality {
            Some(ordinality) => {
                self.write(" with ordinality")?;

                let mut columns = function.column_names.clone();

                if !columns.is_empty() {
                    columns.push(ordinality.clone());
                }

                self.render_table_alias_with_columns(&function.alias, &columns)
            }
            None => self.render_table_alias_with_columns(&function.alias, &function.column_names),
        }
    }

    fn visit_values_table_reference(&mut self, values: &ValuesTableReference<'_>) -> Result {
        if self.supports(Capability::ValuesTable) && self.supports_derived_column_list() {
            self.surround_with("(", ")", |v| v.visit_values_list_standard(&values.rows))?;
            self.render_table_alias_with_columns(&values.alias, &values.column_names)
        } else {
            self.surround_with("(", ")", |v| {
                emulation::render_values_list_as_union(v, &values.rows, Some(values.column_names.as_slice()))
            })?;
            self.write(" ")?;
            self.write(&values.alias)
        }
    }

    fn visit_union_table_reference(&mut self, union: &UnionTableReference<'_>) -> Result {
        self.write(&union.sql)?;
        self.write(" ")?;
        self.write(&union.alias)
    }

    fn visit_where_clause(&mut self, restriction: Option<&Predicate<'_>>) -> Result {
        if let Some(predicate) = restriction {
            self.write(" where ")?;
            self.with_clause(Clause::Where, |v| v.visit_predicate(predicate))?;
        }

        Ok(())
    }

    fn visit_group_by_clause(&mut self, expressions: &[Expression<'_>]) -> Result {
        if expressions.is_empty() {
            return Ok(());
        }

        self.write(" group by ")?;

        self.with_clause(Clause::GroupBy, |v| {
            v.visit_separated(expressions, ",", |v, expression| v.render_partition_item(expression))
        })
    }

    /// An item of `group by` or `partition by`.
    fn render_partition_item(&mut self, expression: &Expression<'_>) -> Result {
        match expression {
            Expression::Literal(_) => self.write("()"),
            Expression::Summarization(summarization) => self.visit_summarization(summarization),
            other => self.visit_expression(other),
        }
    }

    fn visit_having_clause(&mut self, having: Option<&Predicate<'_>>) -> Result {
        if let Some(predicate) = having {
            self.write(" having ")?;
            self.with_clause(Clause::Having, |v| v.visit_predicate(predicate))?;
        }

        Ok(())
    }

    fn visit_order_by(&mut self, sort: &[SortSpecification<'_>]) -> Result {
        if sort.is_empty() || self.state().is_row_numbering_current_query_part() {
            return Ok(());
        }

        self.write(" order by ")?;
        self.with_clause(Clause::OrderBy, |v| v.visit_sort_specifications(sort))
    }

    fn visit_sort_specifications(&mut self, sort: &[SortSpecification<'_>]) -> Result {
        self.visit_separated(sort, ",", |v, spec| v.visit_sort_specification(spec))
    }

    fn supports_null_precedence(&self) -> bool {
        true
    }

    fn visit_sort_specification(&mut self, sort: &SortSpecification<'_>) -> Result {
        if let Some(nulls) = sort.nulls {
            if !self.supports_null_precedence() {
                emulation::render_null_precedence_with_case(self, &sort.expression, nulls)?;
                self.write(",")?;
            }
        }

        self.visit_expression(&sort.expression)?;

        if sort.order == Order::Desc {
            self.write(" desc")?;
        }

        match sort.nulls {
            Some(NullPrecedence::First) if self.supports_null_precedence() => self.write(" nulls first"),
            Some(NullPrecedence::Last) if self.supports_null_precedence() => self.write(" nulls last"),
            _ => Ok(()),
        }
    }

    fn supports_fetch_clause_type(&self, fetch_type: FetchClauseType) -> bool {
        match fetch_type {
            FetchClauseType::RowsOnly => {
                self.supports(Capability::OffsetFetch)
                    || self.supports(Capability::FetchFirst)
                    || self.supports(Capability::LimitOffset)
                    || self.supports(Capability::Top)
            }
            _ => self.supports(Capability::OffsetFetch),
        }
    }

    /// Whether the pagination of the part must be applied by an outer query
    /// filtering on a row number.
    fn should_emulate_fetch_clause(&self, part: &dyn Paginated<'_>) -> bool {
        if self.state().is_row_numbering_next_query_part() || !part.has_offset_or_fetch_clause() {
            return false;
        }

        let native_offset = self.supports(Capability::OffsetFetch) || self.supports(Capability::LimitOffset);

        if part.offset_expression().is_some() && !native_offset {
            return true;
        }

        part.fetch_expression().is_some() && !self.supports_fetch_clause_type(part.fetch_clause_type())
    }

    fn visit_offset_fetch_clause(&mut self, part: &dyn Paginated<'_>) -> Result {
        if self.state().is_row_numbering_current_query_part() || !part.has_offset_or_fetch_clause() {
            return Ok(());
        }

        self.render_offset_fetch_clause(part)
    }

    fn render_offset_fetch_clause(&mut self, part: &dyn Paginated<'_>) -> Result {
        if self.supports(Capability::OffsetFetch) || self.supports(Capability::FetchFirst) {
            if let Some(offset) = part.offset_expression() {
                self.write(" offset ")?;
                self.with_clause(Clause::Offset, |v| v.visit_expression(offset))?;
                self.write(" rows")?;
            }

            if let Some(fetch) = part.fetch_expression() {
                self.write(" fetch first ")?;
                self.with_clause(Clause::Fetch, |v| v.visit_expression(fetch))?;

                self.write(match part.fetch_clause_type() {
                    FetchClauseType::RowsOnly => " rows only",
                    FetchClauseType::RowsWithTies => " rows with ties",
                    FetchClauseType::PercentOnly => " percent rows only",
                    FetchClauseType::PercentWithTies => " percent rows with ties",
                })?;
            }

            Ok(())
        } else if self.supports(Capability::LimitOffset) {
            self.render_limit_offset(part.offset_expression(), part.fetch_expression())
        } else {
            Ok(())
        }
    }

    /// `limit ? offset ?`
    fn render_limit_offset(&mut self, offset: Option<&Expression<'_>>, fetch: Option<&Expression<'_>>) -> Result {
        self.write(" limit ")?;

        match fetch {
            Some(fetch) => self.with_clause(Clause::Fetch, |v| v.visit_expression(fetch))?,
            None => self.write(i64::MAX)?,
        }

        if let Some(offset) = offset {
            self.write(" offset ")?;
            self.with_clause(Clause::Offset, |v| v.visit_expression(offset))?;
        }

        Ok(())
    }

    fn determine_locking_strategy(&self, spec: &QuerySpec<'_>, follow_on: FollowOnLocking) -> crate::Result<LockStrategy> {
        locking::determine_locking_strategy_standard(self, spec, follow_on)
    }

    fn visit_for_update_clause(&mut self) -> Result {
        match self.state().lock_options {
            Some(options) => self.render_for_update_clause(options),
            None => Ok(()),
        }
    }

    fn render_for_update_clause(&mut self, options: LockOptions) -> Result {
        match options.mode {
            LockMode::PessimisticRead if self.supports(Capability::SharedLocks) => self.write(" for share")?,
            LockMode::None => return Ok(()),
            _ => self.write(" for update")?,
        }

        self.render_lock_wait(options.wait, " nowait", " skip locked")
    }

    fn render_lock_wait(&mut self, wait: LockWait, no_wait: &str, skip_locked: &str) -> Result {
        match wait {
            LockWait::NoWait if self.supports(Capability::NoWait) => self.write(no_wait),
            LockWait::SkipLocked if self.supports(Capability::SkipLocked) => self.write(skip_locked),
            _ => Ok(()),
        }
    }

    fn visit_insert_statement(&mut self, insert: &InsertStatement<'_>) -> Result {
        self.begin_dml(&insert.target);
        self.visit_cte_container(&insert.ctes)?;
        self.visit_insert_statement_only(insert)
    }

    /// Records the target of a DML statement.
    fn begin_dml(&mut self, target: &NamedTableReference<'_>) {
        let state = self.state_mut();
        state.add_affected_table(&target.name);
        state.dml_target = Some(target.name.to_string());
    }

    fn visit_insert_statement_only(&mut self, insert: &InsertStatement<'_>) -> Result {
        match &insert.conflict {
            None => self.visit_insert_statement_only_standard(insert),
            Some(conflict) if self.supports(Capability::Merge) => merge::render_insert_as_merge(self, insert, conflict),
            Some(_) => Err(self.unsupported("insert conflict clause")),
        }
    }

    fn visit_insert_statement_only_standard(&mut self, insert: &InsertStatement<'_>) -> Result {
        self.with_clause(Clause::Insert, |v| {
            v.write("insert into ")?;
            v.write(&insert.target.name)?;
            v.render_insert_columns(&insert.columns)?;
            v.write(" ")?;
            v.visit_insert_source(&insert.source)
        })?;

        self.visit_returning_columns(&insert.returning)
    }

    fn render_insert_columns(&mut self, columns: &[ColumnReference<'_>]) -> Result {
        if columns.is_empty() {
            return Ok(());
        }

        self.write(" ")?;
        self.surround_with("(", ")", |v| v.visit_separated(columns, ",", |v, column| v.write(&column.name)))
    }

    fn visit_insert_source(&mut self, source: &InsertSource<'_>) -> Result {
        match source {
            InsertSource::Values(rows) => self.with_clause(Clause::Values, |v| v.visit_values_list(rows)),
            InsertSource::Select(query) => self.visit_query_part(query),
        }
    }

    fn visit_values_list(&mut self, rows: &[Values<'_>]) -> Result {
        if rows.len() < 2 || self.supports(Capability::MultiRowValues) {
            self.visit_values_list_standard(rows)
        } else {
            emulation::render_values_list_as_union(self, rows, None)
        }
    }

    fn visit_values_list_standard(&mut self, rows: &[Values<'_>]) -> Result {
        self.write("values ")?;
        self.visit_separated(rows, ",", |v, row| v.visit_values_row(row))
    }

    fn visit_values_row(&mut self, row: &Values<'_>) -> Result {
        self.surround_with("(", ")", |v| v.visit_separated(&row.0, ",", |v, e| v.visit_expression(e)))
    }

    /// How parameters are rendered in the selections of a `values` list
    /// emulated as a `union all` of selects.
    fn union_values_parameter_mode(&self) -> ParameterRenderingMode {
        self.state().parameter_mode
    }

    fn visit_update_statement(&mut self, update: &UpdateStatement<'_>) -> Result {
        self.begin_dml(&update.target);
        self.visit_cte_container(&update.ctes)?;
        self.visit_update_statement_only(update)
    }

    fn visit_update_statement_only(&mut self, update: &UpdateStatement<'_>) -> Result {
        if update.from_clause.is_empty() {
            self.visit_update_statement_only_standard(update)
        } else if self.supports(Capability::Merge)
            && emulation::assigns_from_joined_tables(&update.assignments, &update.from_clause)
        {
            emulation::render_update_with_merge(self, update)
        } else {
            emulation::render_update_with_driving_subquery(self, update)
        }
    }

    fn visit_update_statement_only_standard(&mut self, update: &UpdateStatement<'_>) -> Result {
        self.with_clause(Clause::Update, |v| {
            v.write("update ")?;
            v.render_dml_target_table(&update.target)
        })?;

        self.render_set_clause(&update.assignments)?;
        self.visit_where_clause(update.restriction.as_ref())?;
        self.visit_returning_columns(&update.returning)
    }

    /// `name[ alias]` of an update or delete target.
    fn render_dml_target_table(&mut self, target: &NamedTableReference<'_>) -> Result {
        self.write(&target.name)?;

        if let Some(alias) = &target.alias {
            self.write(" ")?;
            self.write(alias)?;
        }

        Ok(())
    }

    fn render_set_clause(&mut self, assignments: &[Assignment<'_>]) -> Result {
        self.write(" set ")?;

        self.with_clause(Clause::Set, |v| {
            v.visit_separated(assignments, ",", |v, assignment| v.visit_set_assignment(assignment))
        })
    }

    fn visit_set_assignment(&mut self, assignment: &Assignment<'_>) -> Result {
        match (assignment.columns.as_slice(), &assignment.value) {
            ([column], value) => {
                self.render_assigned_column(column)?;
                self.write("=")?;

                match value {
                    Expression::Tuple(values) if values.len() == 1 => self.visit_expression(&values[0]),
                    value => self.visit_expression(value),
                }
            }
            (columns, Expression::SubQuery(query)) => {
                self.surround_with("(", ")", |v| {
                    v.visit_separated(columns, ",", |v, column| v.render_assigned_column(column))
                })?;

                self.write("=")?;
                self.render_sub_query(query)
            }
            (columns, Expression::Tuple(values)) if columns.len() == values.len() => {
                for (i, (column, value)) in columns.iter().zip(values.iter()).enumerate() {
                    if i > 0 {
                        self.write(",")?;
                    }

                    self.render_assigned_column(column)?;
                    self.write("=")?;
                    self.visit_expression(value)?;
                }

                Ok(())
            }
            _ => Err(Error::assertion("row assignment needs a subquery or a tuple of the same arity")),
        }
    }

    /// The column on the left of a `set` item.
    fn render_assigned_column(&mut self, column: &ColumnReference<'_>) -> Result {
        self.write(&column.name)
    }

    fn visit_delete_statement(&mut self, delete: &DeleteStatement<'_>) -> Result {
        self.begin_dml(&delete.target);
        self.visit_cte_container(&delete.ctes)?;
        self.visit_delete_statement_only(delete)
    }

    fn visit_delete_statement_only(&mut self, delete: &DeleteStatement<'_>) -> Result {
        if delete.from_clause.is_empty() {
            self.visit_delete_statement_only_standard(delete)
        } else {
            emulation::render_delete_with_driving_subquery(self, delete)
        }
    }

    fn visit_delete_statement_only_standard(&mut self, delete: &DeleteStatement<'_>) -> Result {
        self.with_clause(Clause::Delete, |v| {
            v.write("delete from ")?;
            v.render_dml_target_table(&delete.target)
        })?;

        self.visit_where_clause(delete.restriction.as_ref())?;
        self.visit_returning_columns(&delete.returning)
    }

    fn visit_returning_columns(&mut self, columns: &[ColumnReference<'_>]) -> Result {
        if columns.is_empty() {
            return Ok(());
        }

        if !self.supports(Capability::Returning) {
            return Err(self.unsupported("returning clause"));
        }

        self.render_returning_clause(columns)
    }

    fn render_returning_clause(&mut self, columns: &[ColumnReference<'_>]) -> Result {
        self.write(" returning ")?;

        self.with_clause(Clause::Returning, |v| {
            v.visit_separated(columns, ",", |v, column| v.write(&column.name))
        })
    }

    fn visit_optional_table_update(&mut self, upsert: &OptionalTableUpdate<'_>) -> Result {
        self.begin_dml(&upsert.table);
        merge::render_optional_table_update_as_merge(self, upsert)
    }

    /// How parameters in the source rows of a `merge` are rendered.
    fn merge_source_parameter_mode(&self) -> ParameterRenderingMode {
        self.state().parameter_mode
    }

    /// ` when matched[ and p] then update set ...`
    fn render_merge_when_matched_update(
        &mut self,
        assignments: &[Assignment<'_>],
        predicate: Option<&Predicate<'_>>,
    ) -> Result {
        self.write(" when matched")?;

        if let Some(predicate) = predicate {
            self.write(" and ")?;
            self.with_clause(Clause::Where, |v| v.visit_predicate(predicate))?;
        }

        self.write(" then update")?;
        self.render_set_clause(assignments)
    }

    fn visit_expression(&mut self, expression: &Expression<'_>) -> Result {
        match expression {
            Expression::Column(column) => self.visit_column_reference(column),
            Expression::Literal(literal) => self.visit_literal(literal),
            Expression::Parameter(parameter) => self.visit_parameter(parameter),
            Expression::Arithmetic(arithmetic) => self.visit_binary_arithmetic(arithmetic),
            Expression::CaseSearched(case) => self.visit_case_searched(case),
            Expression::CaseSimple(case) => self.visit_case_simple(case),
            Expression::Tuple(expressions) => self.visit_tuple(expressions),
            Expression::Over(over) => self.visit_over(over),
            Expression::Function(function) => self.visit_function(function),
            Expression::Summarization(summarization) => self.visit_summarization(summarization),
            Expression::SubQuery(query) => self.render_sub_query(query),
            Expression::Star => self.write("*"),
        }
    }

    fn visit_column_reference(&mut self, column: &ColumnReference<'_>) -> Result {
        if column.qualifier() == Some(EXCLUDED) && self.state().excluded_as_values_function {
            self.write("values(")?;
            self.write(&column.name)?;
            return self.write(")");
        }

        if let Some(qualifier) = &column.qualifier {
            self.write(qualifier)?;
            self.write(".")?;
        }

        self.write(&column.name)
    }

    fn visit_literal(&mut self, literal: &Literal<'_>) -> Result {
        match literal {
            Literal::Null(sql_type) => self.render_null(sql_type),
            Literal::Boolean(value) => self.render_boolean(*value),
            Literal::Integer(value) => self.write(value),
            Literal::Numeric(value) => self.write(value),
            Literal::Double(value) => self.write(format_args!("{value:?}")),
            Literal::Text(value) => self.render_text_literal(value),
            Literal::Date(date) => self.write(format_args!("date '{}'", date.format("%Y-%m-%d"))),
            Literal::Timestamp(ts) => self.write(format_args!("timestamp '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f"))),
        }
    }

    fn render_text_literal(&mut self, value: &str) -> Result {
        self.write("'")?;
        self.write(value.replace('\'', "''"))?;
        self.write("'")
    }

    fn render_null(&mut self, sql_type: &SqlType) -> Result {
        if self.state().parameter_mode == ParameterRenderingMode::NoUntyped && *sql_type != SqlType::Unknown {
            let cast_type = self.render_cast_type(sql_type);
            self.write(format_args!("cast(null as {cast_type})"))
        } else {
            self.write("null")
        }
    }

    fn render_boolean(&mut self, value: bool) -> Result {
        match (self.supports(Capability::BooleanType), value) {
            (true, true) => self.write("true"),
            (true, false) => self.write("false"),
            (false, true) => self.write("1"),
            (false, false) => self.write("0"),
        }
    }

    /// The type name used in a `cast(... as <type>)`.
    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        sql_type.cast_name().to_string()
    }

    fn visit_parameter(&mut self, parameter: &Parameter<'_>) -> Result {
        let typed =
            self.state().parameter_mode == ParameterRenderingMode::NoUntyped && parameter.sql_type != SqlType::Unknown;

        if typed {
            let cast_type = self.render_cast_type(&parameter.sql_type);
            self.write(format_args!("cast(? as {cast_type})"))?;
        } else {
            self.write("?")?;
        }

        self.state_mut().add_binder(&parameter.name, parameter.sql_type.clone());

        Ok(())
    }

    fn visit_binary_arithmetic(&mut self, arithmetic: &BinaryArithmetic<'_>) -> Result {
        if arithmetic.operator == ArithmeticOperator::Modulo {
            return self.render_modulo(&arithmetic.lhs, &arithmetic.rhs);
        }

        if arithmetic.is_integer_division() && !self.supports(Capability::IntegerDivision) {
            return self.render_integer_division(&arithmetic.lhs, &arithmetic.rhs);
        }

        self.render_binary_arithmetic_standard(arithmetic)
    }

    fn render_binary_arithmetic_standard(&mut self, arithmetic: &BinaryArithmetic<'_>) -> Result {
        self.write("(")?;
        self.visit_expression(&arithmetic.lhs)?;
        self.write(arithmetic.operator.sql_text())?;
        self.visit_expression(&arithmetic.rhs)?;
        self.write(")")
    }

    fn render_modulo(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        self.write("mod(")?;
        self.visit_expression(lhs)?;
        self.write(",")?;
        self.visit_expression(rhs)?;
        self.write(")")
    }

    /// Division of two integers where `/` would not truncate.
    fn render_integer_division(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        self.write("cast((")?;
        self.visit_expression(lhs)?;
        self.write("/")?;
        self.visit_expression(rhs)?;
        self.write(") as bigint)")
    }

    fn visit_case_searched(&mut self, case: &CaseSearched<'_>) -> Result {
        self.write("case")?;

        for (predicate, result) in case.whens.iter() {
            self.write(" when ")?;
            self.visit_predicate(predicate)?;
            self.write(" then ")?;
            self.visit_expression(result)?;
        }

        if let Some(otherwise) = &case.otherwise {
            self.write(" else ")?;
            self.visit_expression(otherwise)?;
        }

        self.write(" end")
    }

    fn visit_case_simple(&mut self, case: &CaseSimple<'_>) -> Result {
        self.write("case ")?;
        self.visit_expression(&case.operand)?;

        for (value, result) in case.whens.iter() {
            self.write(" when ")?;
            self.visit_expression(value)?;
            self.write(" then ")?;
            self.visit_expression(result)?;
        }

        if let Some(otherwise) = &case.otherwise {
            self.write(" else ")?;
            self.visit_expression(otherwise)?;
        }

        self.write(" end")
    }

    fn visit_tuple(&mut self, expressions: &[Expression<'_>]) -> Result {
        self.surround_with("(", ")", |v| v.visit_separated(expressions, ",", |v, e| v.visit_expression(e)))
    }

    fn visit_over(&mut self, over: &Over<'_>) -> Result {
        if !self.supports(Capability::WindowFunctions) {
            return Err(self.unsupported("window functions"));
        }

        self.visit_over_standard(over)
    }

    fn visit_over_standard(&mut self, over: &Over<'_>) -> Result {
        self.visit_expression(&over.expression)?;
        self.write(" over(")?;

        self.with_clause(Clause::Over, |v| {
            let mut separator = "";

            if !over.partitions.is_empty() {
                v.write("partition by ")?;
                v.visit_separated(&over.partitions, ",", |v, e| v.render_partition_item(e))?;
                separator = " ";
            }

            if !over.order.is_empty() {
                v.write(separator)?;
                v.write("order by ")?;
                v.visit_sort_specifications(&over.order)?;
                separator = " ";
            }

            match over.frame {
                Some(frame) if !frame.is_default() => {
                    v.write(separator)?;
                    v.render_frame(&frame)
                }
                _ => Ok(()),
            }
        })?;

        self.write(")")
    }

    fn render_frame(&mut self, frame: &Frame) -> Result {
        fn bound(bound: FrameBound) -> Cow<'static, str> {
            match bound {
                FrameBound::UnboundedPreceding => "unbounded preceding".into(),
                FrameBound::Preceding(n) => format!("{n} preceding").into(),
                FrameBound::CurrentRow => "current row".into(),
                FrameBound::Following(n) => format!("{n} following").into(),
                FrameBound::UnboundedFollowing => "unbounded following".into(),
            }
        }

        self.write(match frame.kind {
            FrameKind::Rows => "rows",
            FrameKind::Range => "range",
            FrameKind::Groups => "groups",
        })?;

        self.write(format_args!(" between {} and {}", bound(frame.start), bound(frame.end)))?;

        self.write(match frame.exclusion {
            FrameExclusion::NoOthers => "",
            FrameExclusion::CurrentRow => " exclude current row",
            FrameExclusion::Group => " exclude group",
            FrameExclusion::Ties => " exclude ties",
        })
    }

    fn visit_function(&mut self, function: &FunctionExpression<'_>) -> Result {
        self.write(&function.name)?;
        self.surround_with("(", ")", |v| {
            v.visit_separated(&function.arguments, ",", |v, e| v.visit_expression(e))
        })
    }

    fn visit_summarization(&mut self, summarization: &Summarization<'_>) -> Result {
        let capability = match summarization.kind {
            SummarizationKind::Rollup => Capability::Rollup,
            SummarizationKind::Cube => Capability::Cube,
        };

        if !self.supports(capability) {
            return Err(self.unsupported(summarization.kind.sql_text()));
        }

        self.write(summarization.kind.sql_text())?;
        self.visit_tuple(&summarization.groupings)
    }

    /// A parenthesized subquery.
    fn render_sub_query(&mut self, query: &QueryPart<'_>) -> Result {
        if self.needs_self_referencing_wrapper(query) {
            return emulation::render_self_referencing_sub_query(self, query);
        }

        self.surround_with("(", ")", |v| v.visit_query_part(query))
    }

    /// An update or delete reads its own target in a subquery, which the
    /// database rejects unless the subquery is materialized.
    fn needs_self_referencing_wrapper(&self, query: &QueryPart<'_>) -> bool {
        let state = self.state();

        if self.supports(Capability::SelfReferencingDml) {
            return false;
        }

        if !matches!(state.statement_kind, Some(StatementKind::Update | StatementKind::Delete)) {
            return false;
        }

        match &state.dml_target {
            Some(target) => query.references_table(target),
            None => false,
        }
    }

    fn visit_predicate(&mut self, predicate: &Predicate<'_>) -> Result {
        match predicate {
            Predicate::Comparison(comparison) => self.visit_comparison(comparison),
            Predicate::Like(like) => self.visit_like_predicate(like),
            Predicate::InList(in_list) => self.visit_in_list_predicate(in_list),
            Predicate::InArray(in_array) => self.visit_in_array_predicate(in_array),
            Predicate::InSubQuery(in_sub_query) => self.visit_in_sub_query_predicate(in_sub_query),
            Predicate::Exists(exists) => self.visit_exists_predicate(exists),
            Predicate::NullCheck(null_check) => self.visit_nullness_predicate(null_check),
            Predicate::Between(between) => self.visit_between_predicate(between),
            Predicate::Junction(junction) => self.visit_junction(junction),
            Predicate::Negated(inner) => self.surround_with("not(", ")", |v| v.visit_predicate(inner)),
            Predicate::BooleanExpression(boolean) => self.visit_boolean_expression_predicate(boolean),
        }
    }

    /// A predicate that always holds.
    fn render_true_predicate(&mut self) -> Result {
        if self.supports(Capability::BooleanType) {
            self.write("true")
        } else {
            self.write("1=1")
        }
    }

    fn render_false_predicate(&mut self) -> Result {
        if self.supports(Capability::BooleanType) {
            self.write("false")
        } else {
            self.write("1=0")
        }
    }

    fn visit_comparison(&mut self, comparison: &Comparison<'_>) -> Result {
        self.render_comparison(&comparison.lhs, comparison.operator, &comparison.rhs)
    }

    /// The dialect entry point for comparisons. Overrides handle types the
    /// database cannot compare with the operators.
    fn render_comparison(&mut self, lhs: &Expression<'_>, operator: ComparisonOperator, rhs: &Expression<'_>) -> Result {
        self.render_comparison_standard(lhs, operator, rhs)
    }

    fn render_comparison_standard(
        &mut self,
        lhs: &Expression<'_>,
        operator: ComparisonOperator,
        rhs: &Expression<'_>,
    ) -> Result {
        if let Expression::Tuple(elements) = lhs {
            let native = if operator.is_ordering() {
                self.supports(Capability::RowValueOrdering)
            } else if operator.is_distinctness() {
                self.supports(Capability::RowValueEquality) && self.supports(Capability::DistinctFrom)
            } else {
                self.supports(Capability::RowValueEquality)
            };

            if !native {
                return emulation::render_tuple_comparison(self, elements, operator, rhs);
            }
        }

        if operator.is_distinctness() {
            if self.supports(Capability::DistinctFrom) {
                self.visit_expression(lhs)?;
                self.write(operator.sql_text())?;
                return self.visit_expression(rhs);
            }

            if self.supports(Capability::NullSafeEquals) {
                if operator == ComparisonOperator::DistinctFrom {
                    self.write("not(")?;
                }

                self.visit_expression(lhs)?;
                self.write("<=>")?;
                self.visit_expression(rhs)?;

                if operator == ComparisonOperator::DistinctFrom {
                    self.write(")")?;
                }

                return Ok(());
            }

            return self.render_distinct_from_emulation(lhs, operator, rhs);
        }

        self.visit_expression(lhs)?;
        self.write(operator.sql_text())?;
        self.visit_expression(rhs)
    }

    /// `is [not] distinct from` for databases without native support.
    fn render_distinct_from_emulation(
        &mut self,
        lhs: &Expression<'_>,
        operator: ComparisonOperator,
        rhs: &Expression<'_>,
    ) -> Result {
        emulation::render_distinct_from_with_case(self, lhs, operator, rhs)
    }

    fn visit_like_predicate(&mut self, like: &LikePredicate<'_>) -> Result {
        self.render_like_operand(&like.expression, like.case_sensitive)?;
        self.write(if like.negated { " not like " } else { " like " })?;
        self.render_like_pattern(&like.pattern, like.case_sensitive)?;

        match &like.escape {
            Some(escape) => self.render_like_escape(escape),
            None => self.render_missing_like_escape(),
        }
    }

    fn render_like_operand(&mut self, expression: &Expression<'_>, case_sensitive: bool) -> Result {
        if case_sensitive {
            self.visit_expression(expression)
        } else {
            self.surround_with("lower(", ")", |v| v.visit_expression(expression))
        }
    }

    fn render_like_pattern(&mut self, pattern: &Expression<'_>, case_sensitive: bool) -> Result {
        self.render_like_operand(pattern, case_sensitive)
    }

    fn render_like_escape(&mut self, escape: &Expression<'_>) -> Result {
        if !self.supports(Capability::LikeEscape) {
            return Err(self.unsupported("like escape"));
        }

        self.write(" escape ")?;
        self.visit_expression(escape)
    }

    /// Appended to a `like` without an escape character.
    fn render_missing_like_escape(&mut self) -> Result {
        Ok(())
    }

    /// The maximum number of elements in one `in` list.
    fn in_list_limit(&self) -> Option<usize> {
        None
    }

    fn visit_in_list_predicate(&mut self, in_list: &InListPredicate<'_>) -> Result {
        if in_list.list.is_empty() {
            return if in_list.negated {
                self.render_true_predicate()
            } else {
                self.render_false_predicate()
            };
        }

        if let Expression::Tuple(elements) = &in_list.expression {
            if !self.supports(Capability::RowValueEquality) {
                return emulation::render_tuple_in_list(self, elements, &in_list.list, in_list.negated);
            }
        }

        let chunk_size = self.in_list_limit().unwrap_or(usize::MAX).max(1);
        let chunks: Vec<_> = in_list.list.chunks(chunk_size).collect();
        let wrap = chunks.len() > 1;

        if wrap {
            self.write("(")?;
        }

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                self.write(if in_list.negated { " and " } else { " or " })?;
            }

            self.visit_expression(&in_list.expression)?;
            self.write(if in_list.negated { " not in " } else { " in " })?;
            self.visit_tuple(chunk)?;
        }

        if wrap {
            self.write(")")?;
        }

        Ok(())
    }

    fn visit_in_array_predicate(&mut self, in_array: &InArrayPredicate<'_>) -> Result {
        self.visit_expression(&in_array.expression)?;
        self.write("=any(")?;
        self.visit_expression(&in_array.array)?;
        self.write(")")
    }

    fn visit_in_sub_query_predicate(&mut self, in_sub_query: &InSubQueryPredicate<'_>) -> Result {
        if let Expression::Tuple(elements) = &in_sub_query.expression {
            if !self.supports(Capability::RowValueEquality) {
                return emulation::render_tuple_in_sub_query_as_exists(
                    self,
                    elements,
                    &in_sub_query.query,
                    in_sub_query.negated,
                );
            }
        }

        self.visit_expression(&in_sub_query.expression)?;
        self.write(if in_sub_query.negated { " not in " } else { " in " })?;
        self.render_sub_query(&in_sub_query.query)
    }

    fn visit_exists_predicate(&mut self, exists: &ExistsPredicate<'_>) -> Result {
        self.write(if exists.negated { "not exists " } else { "exists " })?;
        self.render_sub_query(&exists.query)
    }

    fn visit_nullness_predicate(&mut self, null_check: &NullnessPredicate<'_>) -> Result {
        let suffix = if null_check.negated { " is not null" } else { " is null" };

        match &null_check.expression {
            Expression::Tuple(elements) => self.visit_separated(elements, " and ", |v, e| {
                v.visit_expression(e)?;
                v.write(suffix)
            }),
            expression => {
                self.visit_expression(expression)?;
                self.write(suffix)
            }
        }
    }

    fn visit_between_predicate(&mut self, between: &BetweenPredicate<'_>) -> Result {
        self.visit_expression(&between.expression)?;
        self.write(if between.negated { " not between " } else { " between " })?;
        self.visit_expression(&between.lower)?;
        self.write(" and ")?;
        self.visit_expression(&between.upper)
    }

    fn visit_junction(&mut self, junction: &Junction<'_>) -> Result {
        if junction.predicates.is_empty() {
            return match junction.nature {
                JunctionNature::And => self.render_true_predicate(),
                JunctionNature::Or => self.render_false_predicate(),
            };
        }

        let separator = match junction.nature {
            JunctionNature::And => " and ",
            JunctionNature::Or => " or ",
        };

        self.visit_separated(&junction.predicates, separator, |v, predicate| match predicate {
            Predicate::Junction(inner) if inner.nature != junction.nature && inner.predicates.len() > 1 => {
                v.surround_with("(", ")", |v| v.visit_junction(inner))
            }
            predicate => v.visit_predicate(predicate),
        })
    }

    fn visit_boolean_expression_predicate(&mut self, boolean: &BooleanExpressionPredicate<'_>) -> Result {
        if self.supports(Capability::BooleanType) {
            if boolean.negated {
                self.surround_with("not(", ")", |v| v.visit_expression(&boolean.expression))
            } else {
                self.visit_expression(&boolean.expression)
            }
        } else {
            self.visit_expression(&boolean.expression)?;
            self.write(if boolean.negated { "=0" } else { "=1" })
        }
    }
}
