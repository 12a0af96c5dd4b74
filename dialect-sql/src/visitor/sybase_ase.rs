use once_cell::sync::Lazy;
use regex::Regex;

use super::{locking, Clause, LockStrategy, Result, Visitor};
use crate::ast::*;

translator!(
    /// A translator for Sybase Adaptive Server Enterprise 15 and later.
    ///
    /// Rows are limited with `top`, so there is no offset. Row locks are
    /// table hints (`holdlock`) instead of a `for update` clause, and they
    /// are pushed into the selects of a union table.
    SybaseAse
);

const LOCK_HINT: &str = " holdlock";

impl SybaseAse {
    fn render_comparable_operand(&mut self, expression: &Expression<'_>) -> Result {
        match expression.sql_type() {
            Some(sql_type) if sql_type.is_character_lob() => {
                self.surround_with("convert(varchar(16384),", ")", |v| v.visit_expression(expression))
            }
            Some(SqlType::Blob) => self.surround_with("convert(varbinary(16384),", ")", |v| v.visit_expression(expression)),
            _ => self.visit_expression(expression),
        }
    }
}

/// Plain table lists after `from` or `join`, each table with an optional alias.
static TABLE_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:from|join)\s+(?P<list>[\w.$#]+(?:\s+(?:as\s+)?\w+)?(?:\s*,\s*[\w.$#]+(?:\s+(?:as\s+)?\w+)?)*)")
        .unwrap()
});

static TABLE_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?P<table>[\w.$#]+)(?:\s+(?:as\s+)?(?P<alias>\w+))?").unwrap());

/// Words that can follow a table name without being its alias.
const CLAUSE_KEYWORDS: &[&str] = &[
    "where", "group", "order", "having", "union", "intersect", "except", "join", "inner", "left", "right", "full",
    "cross", "natural", "outer", "on", "holdlock", "noholdlock", "shared", "readpast", "at", "plan", "for",
];

fn is_clause_keyword(word: &str) -> bool {
    CLAUSE_KEYWORDS.iter().any(|keyword| keyword.eq_ignore_ascii_case(word))
}

/// Adds `hint` after the alias of every plain table in the `from` and `join`
/// clauses of raw SQL text. Derived tables are left alone, their own selects
/// get the hint.
fn with_lock_hints(sql: &str, hint: &str) -> String {
    let mut hinted = String::with_capacity(sql.len());
    let mut copied = 0;
    let mut at = 0;

    while let Some(list) = TABLE_LIST.captures_at(sql, at) {
        let Some(tables) = list.name("list") else { break };
        at = tables.end();

        for item in TABLE_ITEM.captures_iter(tables.as_str()) {
            let (Some(table), Some(whole)) = (item.name("table"), item.get(0)) else {
                continue;
            };

            let insert_at = match item.name("alias") {
                // A keyword taken for an alias starts the next clause, which
                // may itself be a `join`.
                Some(alias) if is_clause_keyword(alias.as_str()) => {
                    at = tables.start() + alias.start();
                    tables.start() + table.end()
                }
                _ => tables.start() + whole.end(),
            };

            hinted.push_str(&sql[copied..insert_at]);
            hinted.push_str(hint);
            copied = insert_at;
        }
    }

    hinted.push_str(&sql[copied..]);
    hinted
}

impl Visitor for SybaseAse {
    translation_accessors!();

    fn supports_with_clause(&self) -> bool {
        false
    }

    /// `top ?` after `distinct`.
    fn render_select_modifiers(&mut self, spec: &QuerySpec<'_>) -> Result {
        if let Some(fetch) = &spec.fetch {
            self.write("top ")?;
            self.with_clause(Clause::Fetch, |v| v.visit_expression(fetch))?;
            self.write(" ")?;
        }

        Ok(())
    }

    fn should_emulate_fetch_clause(&self, part: &dyn Paginated<'_>) -> bool {
        if self.state().is_row_numbering_next_query_part() || !part.has_offset_or_fetch_clause() {
            return false;
        }

        // `top` only limits a single select.
        part.is_group()
            || part.offset_expression().is_some()
            || !self.supports_fetch_clause_type(part.fetch_clause_type())
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean => "bit".to_string(),
            SqlType::Double => "double precision".to_string(),
            SqlType::Varchar | SqlType::Unknown => "varchar(16384)".to_string(),
            SqlType::NVarchar => "univarchar(8192)".to_string(),
            SqlType::Clob => "text".to_string(),
            SqlType::NClob => "unitext".to_string(),
            SqlType::Blob => "image".to_string(),
            SqlType::Varbinary => "varbinary(16384)".to_string(),
            SqlType::Timestamp => "datetime".to_string(),
            other => other.cast_name().to_string(),
        }
    }

    fn visit_literal(&mut self, literal: &Literal<'_>) -> Result {
        match literal {
            Literal::Null(sql_type) => self.render_null(sql_type),
            Literal::Boolean(value) => self.render_boolean(*value),
            Literal::Integer(value) => self.write(value),
            Literal::Numeric(value) => self.write(value),
            Literal::Double(value) => self.write(format_args!("{value:?}")),
            Literal::Text(value) => self.render_text_literal(value),
            Literal::Date(date) => self.write(format_args!("cast('{}' as date)", date.format("%Y-%m-%d"))),
            Literal::Timestamp(ts) => {
                self.write(format_args!("cast('{}' as datetime)", ts.format("%Y-%m-%d %H:%M:%S%.3f")))
            }
        }
    }

    fn render_modulo(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        self.write("(")?;
        self.visit_expression(lhs)?;
        self.write("%")?;
        self.visit_expression(rhs)?;
        self.write(")")
    }

    fn render_comparison(&mut self, lhs: &Expression<'_>, operator: ComparisonOperator, rhs: &Expression<'_>) -> Result {
        let is_lob = |e: &Expression<'_>| e.sql_type().map(|t| t.is_lob()).unwrap_or(false);

        if matches!(operator, ComparisonOperator::Equal | ComparisonOperator::NotEqual) && (is_lob(lhs) || is_lob(rhs)) {
            self.render_comparable_operand(lhs)?;
            self.write(operator.sql_text())?;
            return self.render_comparable_operand(rhs);
        }

        self.render_comparison_standard(lhs, operator, rhs)
    }

    /// `[` opens a character class in a pattern.
    fn render_like_pattern(&mut self, pattern: &Expression<'_>, case_sensitive: bool) -> Result {
        match pattern {
            Expression::Literal(Literal::Text(text)) if text.contains('[') => {
                let escaped = Expression::from(text.replace('[', "[[]"));
                self.render_like_operand(&escaped, case_sensitive)
            }
            other => self.render_like_operand(other, case_sensitive),
        }
    }

    fn visit_in_array_predicate(&mut self, _in_array: &InArrayPredicate<'_>) -> Result {
        Err(self.unsupported("in array predicate"))
    }

    fn determine_locking_strategy(&self, spec: &QuerySpec<'_>, follow_on: FollowOnLocking) -> crate::Result<LockStrategy> {
        if follow_on == FollowOnLocking::Force {
            return Ok(LockStrategy::FollowOn);
        }

        match locking::structural_conflict(self, spec, true) {
            Some(reason) => locking::resolve(follow_on, reason),
            None => Ok(LockStrategy::Clause),
        }
    }

    fn render_table_lock_hint(&mut self) -> Result {
        match self.state().lock_options.map(|options| options.mode) {
            Some(LockMode::PessimisticRead | LockMode::PessimisticWrite) => self.write(LOCK_HINT),
            _ => Ok(()),
        }
    }

    fn render_for_update_clause(&mut self, _options: LockOptions) -> Result {
        Ok(())
    }

    fn visit_union_table_reference(&mut self, union: &UnionTableReference<'_>) -> Result {
        let locked = self.is_locked_table_position()
            && matches!(
                self.state().lock_options.map(|options| options.mode),
                Some(LockMode::PessimisticRead | LockMode::PessimisticWrite)
            );

        if locked {
            self.write(with_lock_hints(&union.sql, LOCK_HINT))?;
        } else {
            self.write(&union.sql)?;
        }

        self.write(" ")?;
        self.write(&union.alias)
    }

    /// `update a set ... from t a,<from> where ...`
    fn visit_update_statement_only(&mut self, update: &UpdateStatement<'_>) -> Result {
        if update.target.alias.is_none() && update.from_clause.is_empty() {
            return self.visit_update_statement_only_standard(update);
        }

        self.with_clause(Clause::Update, |v| {
            v.write("update ")?;
            v.write(update.target.qualifier())
        })?;

        self.render_set_clause(&update.assignments)?;

        self.write(" from ")?;
        self.with_clause(Clause::From, |v| {
            v.render_dml_target_table(&update.target)?;

            for root in update.from_clause.roots.iter() {
                v.write(",")?;
                v.visit_table_group(root)?;
            }

            Ok(())
        })?;

        self.visit_where_clause(update.restriction.as_ref())?;
        self.visit_returning_columns(&update.returning)
    }

    /// `delete a from t a,<from> where ...`
    fn visit_delete_statement_only(&mut self, delete: &DeleteStatement<'_>) -> Result {
        if delete.target.alias.is_none() && delete.from_clause.is_empty() {
            return self.visit_delete_statement_only_standard(delete);
        }

        self.with_clause(Clause::Delete, |v| {
            v.write("delete ")?;
            v.write(delete.target.qualifier())?;
            v.write(" from ")?;
            v.render_dml_target_table(&delete.target)?;

            for root in delete.from_clause.roots.iter() {
                v.write(",")?;
                v.visit_table_group(root)?;
            }

            Ok(())
        })?;

        self.visit_where_clause(delete.restriction.as_ref())?;
        self.visit_returning_columns(&delete.returning)
    }
}
