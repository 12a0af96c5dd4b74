use super::{emulation, locking, merge, Clause, LockStrategy, ParameterRenderingMode, Result, StatementKind, Visitor};
use crate::{ast::*, dialect::Capability, error::Error};

translator!(
    /// A translator for Oracle 11g and later.
    ///
    /// Before 12c there is no `offset`/`fetch`, so pagination goes through
    /// `row_number()` or `rownum`. A paginated root query taking row locks
    /// is rewritten into a locking wrapper, `select ... where id in (<paginated
    /// ids>) for update`, since Oracle rejects `for update` next to a
    /// pagination clause.
    Oracle
);

impl Oracle {
    fn needs_locking_wrapper(spec: &QuerySpec<'_>, follow_on: FollowOnLocking) -> bool {
        follow_on != FollowOnLocking::Force
            && (spec.has_offset_or_fetch_clause() || spec.fetch_type != FetchClauseType::RowsOnly)
    }

    /// A single entity table without joins, selected by the root query.
    fn can_apply_locking_wrapper(spec: &QuerySpec<'_>) -> bool {
        match spec.from_clause.roots.as_slice() {
            [root] => {
                spec.root
                    && root.joins.is_empty()
                    && matches!(root.primary, TableReference::Named(_))
                    && !root.identifier_columns().is_empty()
            }
            _ => false,
        }
    }

    /// `select <selections> from t a where a.id in (select a.id from t a where ... <pagination>) for update`
    fn render_locking_wrapper(&mut self, spec: &QuerySpec<'_>) -> Result {
        let root = &spec.from_clause.roots[0];
        let ids = root.identifier_columns();

        let key = match ids.len() {
            1 => ids[0].clone(),
            _ => Expression::Tuple(ids.clone()),
        };

        let mut paginated = QuerySpec::sub_query().from(root.clone());
        paginated.select_clause.selections = ids.into_iter().map(SqlSelection::new).collect();
        paginated.restriction = spec.restriction.clone();
        paginated.sort = spec.sort.clone();
        paginated.offset = spec.offset.clone();
        paginated.fetch = spec.fetch.clone();
        paginated.fetch_type = spec.fetch_type;

        let mut wrapper = QuerySpec::sub_query().from(root.clone());
        wrapper.select_clause = spec.select_clause.clone();
        wrapper.restriction = Some(key.in_selection(paginated));

        self.visit_query_spec_standard(&wrapper)?;
        self.visit_for_update_clause()
    }

    /// `update (select a.c c0_,<value> v0_ from t a,<from> where ...) set c0_=v0_`
    fn render_update_through_inline_view(&mut self, update: &UpdateStatement<'_>) -> Result {
        if update.restriction.is_none() {
            return Err(Error::known_broken(
                "update joining tables without a join predicate",
                self.dialect().family(),
                "the joined view is not key-preserved",
            ));
        }

        let qualifier = update.target.qualifier().to_string();

        let mut view = QuerySpec::sub_query().from(TableGroup::new(update.target.clone()));
        view.from_clause.roots.extend(update.from_clause.roots.iter().cloned());
        view.restriction = update.restriction.clone();

        for (i, assignment) in update.assignments.iter().enumerate() {
            let column = match assignment.columns.as_slice() {
                [column] if column.qualifier.is_some() => column.clone(),
                [column] => column.requalified(qualifier.clone()),
                _ => return Err(self.unsupported("row assignment in an update with joined tables")),
            };

            view.select_clause.selections.push(SqlSelection::new(column).alias(format!("c{i}_")));
            view.select_clause
                .selections
                .push(SqlSelection::new(assignment.value.clone()).alias(format!("v{i}_")));
        }

        self.with_clause(Clause::Update, |v| {
            v.write("update ")?;
            v.surround_with("(", ")", |v| v.visit_query_spec(&view))
        })?;

        self.write(" set ")?;
        self.with_clause(Clause::Set, |v| {
            for i in 0..update.assignments.len() {
                if i > 0 {
                    v.write(",")?;
                }

                v.write(format_args!("c{i}_=v{i}_"))?;
            }

            Ok(())
        })?;

        self.visit_returning_columns(&update.returning)
    }
}

impl Visitor for Oracle {
    translation_accessors!();

    fn needs_recursive_keyword_in_with_clause(&self) -> bool {
        false
    }

    fn render_select_hints(&mut self, _spec: &QuerySpec<'_>) -> Result {
        let state = self.state();

        match state.current_cte {
            Some((CteMaterialization::Materialized, depth)) if depth == state.query_part_depth() => {
                self.write("/*+ materialize */ ")
            }
            Some((CteMaterialization::NotMaterialized, depth)) if depth == state.query_part_depth() => {
                self.write("/*+ inline */ ")
            }
            _ => Ok(()),
        }
    }

    fn render_from_dual(&mut self) -> Result {
        self.write(" from dual")
    }

    fn merge_source_parameter_mode(&self) -> ParameterRenderingMode {
        ParameterRenderingMode::NoUntyped
    }

    fn render_cast_type(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean if !self.supports(Capability::BooleanType) => "number(1,0)".to_string(),
            SqlType::SmallInt => "number(5,0)".to_string(),
            SqlType::Integer => "number(10,0)".to_string(),
            SqlType::BigInt => "number(19,0)".to_string(),
            SqlType::Numeric => "number".to_string(),
            SqlType::Float => "binary_float".to_string(),
            SqlType::Double => "binary_double".to_string(),
            SqlType::Varchar | SqlType::Unknown => "varchar2(4000)".to_string(),
            SqlType::NVarchar => "nvarchar2(2000)".to_string(),
            SqlType::Varbinary => "raw(2000)".to_string(),
            SqlType::Time => "timestamp".to_string(),
            SqlType::Xml => "xmltype".to_string(),
            other => other.cast_name().to_string(),
        }
    }

    fn render_null(&mut self, sql_type: &SqlType) -> Result {
        if self.state().parameter_mode == ParameterRenderingMode::NoUntyped {
            match sql_type {
                SqlType::Blob => return self.write("to_blob(null)"),
                SqlType::Clob => return self.write("to_clob(null)"),
                SqlType::NClob => return self.write("to_nclob(null)"),
                _ => {}
            }
        }

        if self.state().parameter_mode == ParameterRenderingMode::NoUntyped && *sql_type != SqlType::Unknown {
            let cast_type = self.render_cast_type(sql_type);
            self.write(format_args!("cast(null as {cast_type})"))
        } else {
            self.write("null")
        }
    }

    fn visit_query_spec(&mut self, spec: &QuerySpec<'_>) -> Result {
        let wrapped = spec.root
            && self.state().lock_strategy == LockStrategy::Clause
            && self
                .state()
                .lock_options
                .is_some_and(|options| Self::needs_locking_wrapper(spec, options.follow_on))
            && Self::can_apply_locking_wrapper(spec);

        if wrapped {
            return self.render_locking_wrapper(spec);
        }

        if self.should_emulate_fetch_clause(spec) {
            return emulation::emulate_fetch_offset_with_window_functions(self, emulation::PartRef::Spec(spec));
        }

        self.visit_query_spec_standard(spec)
    }

    fn should_emulate_fetch_clause(&self, part: &dyn Paginated<'_>) -> bool {
        let state = self.state();

        if state.is_row_numbering_next_query_part() || !part.has_offset_or_fetch_clause() {
            return false;
        }

        if self.supports(Capability::OffsetFetch) {
            // A paginated query group selected by an insert crashes the server.
            return part.is_group()
                && state.statement_kind == Some(StatementKind::Insert)
                && state.query_part_depth() == 0;
        }

        true
    }

    fn visit_offset_fetch_clause(&mut self, part: &dyn Paginated<'_>) -> Result {
        let state = self.state();

        if state.is_row_numbering_current_query_part() {
            return Ok(());
        }

        let in_group = state.parent_query_part().map(|frame| frame.is_group).unwrap_or(false);

        if !part.has_offset_or_fetch_clause() {
            // An ordered member of a query group is only valid with a row limiting clause.
            if in_group && part.has_sort_specifications() && self.supports(Capability::OffsetFetch) {
                return self.write(" offset 0 rows");
            }

            return Ok(());
        }

        self.render_offset_fetch_clause(part)
    }

    fn render_row_number(&mut self, sort: &[SortSpecification<'_>]) -> Result {
        if sort.is_empty() {
            return self.write("rownum");
        }

        self.write("row_number() over(order by ")?;
        self.visit_sort_specifications(sort)?;
        self.write(")")
    }

    fn visit_over(&mut self, over: &Over<'_>) -> Result {
        let bare_row_number = matches!(&over.expression, Expression::Function(f) if f.name() == "row_number")
            && over.partitions.is_empty()
            && over.order.is_empty()
            && over.frame.map(|frame| frame.is_default()).unwrap_or(true);

        if bare_row_number {
            return self.write("row_number() over(order by 1)");
        }

        self.visit_over_standard(over)
    }

    fn render_set_operator(&mut self, operator: SetOperator) -> Result {
        let since_21 = self.dialect().version().is_same_or_after(21, 0, 0);

        match operator {
            SetOperator::Except => self.write("minus"),
            SetOperator::ExceptAll if since_21 => self.write("minus all"),
            SetOperator::IntersectAll if since_21 => self.write("intersect all"),
            SetOperator::ExceptAll | SetOperator::IntersectAll => Err(self.unsupported(operator.sql_text())),
            other => self.write(other.sql_text()),
        }
    }

    fn determine_locking_strategy(&self, spec: &QuerySpec<'_>, follow_on: FollowOnLocking) -> crate::Result<LockStrategy> {
        if follow_on == FollowOnLocking::Force {
            return Ok(LockStrategy::FollowOn);
        }

        if let Some(reason) = locking::structural_conflict(self, spec, false) {
            return locking::resolve(follow_on, reason);
        }

        if Self::needs_locking_wrapper(spec, follow_on) && !Self::can_apply_locking_wrapper(spec) {
            return locking::resolve(follow_on, "Locking with OFFSET/FETCH is not supported");
        }

        Ok(LockStrategy::Clause)
    }

    fn render_comparison(&mut self, lhs: &Expression<'_>, operator: ComparisonOperator, rhs: &Expression<'_>) -> Result {
        use ComparisonOperator::*;

        match lhs.sql_type() {
            Some(SqlType::Xml) => {
                // xmltype has no comparison operators.
                let prefix = match operator {
                    Equal | NotDistinctFrom => "0=",
                    NotEqual | DistinctFrom => "1=",
                    _ => return self.render_comparison_standard(lhs, operator, rhs),
                };

                self.write(prefix)?;
                self.write("existsnode(xmldiff(")?;
                self.visit_expression(lhs)?;
                self.write(",")?;
                self.visit_expression(rhs)?;
                self.write("),'/*[local-name()=''xdiff'']/*')")
            }
            Some(sql_type) if sql_type.is_lob() => {
                let prefix = match operator {
                    Equal => "0=",
                    NotEqual => "-1=",
                    _ => return self.render_comparison_standard(lhs, operator, rhs),
                };

                self.write(prefix)?;
                self.write("dbms_lob.compare(")?;
                self.visit_expression(lhs)?;
                self.write(",")?;
                self.visit_expression(rhs)?;
                self.write(")")
            }
            Some(SqlType::Array(name)) => {
                let function = if operator.is_distinctness() { "distinct" } else { "cmp" };

                self.write(format_args!("{name}_{function}("))?;
                self.visit_expression(lhs)?;
                self.write(",")?;
                self.visit_expression(rhs)?;
                self.write(")")?;

                self.write(match operator {
                    DistinctFrom | GreaterThan => "=1",
                    NotDistinctFrom | Equal => "=0",
                    NotEqual => "<>0",
                    LessThan => "=-1",
                    LessThanOrEqual => "<=0",
                    GreaterThanOrEqual => ">=0",
                })
            }
            _ => self.render_comparison_standard(lhs, operator, rhs),
        }
    }

    /// `decode(a,b,0,1)=1`
    fn render_distinct_from_emulation(
        &mut self,
        lhs: &Expression<'_>,
        operator: ComparisonOperator,
        rhs: &Expression<'_>,
    ) -> Result {
        self.write("decode(")?;
        self.visit_expression(lhs)?;
        self.write(",")?;
        self.visit_expression(rhs)?;
        self.write(",0,1)=")?;

        match operator {
            ComparisonOperator::DistinctFrom => self.write("1"),
            _ => self.write("0"),
        }
    }

    fn render_integer_division(&mut self, lhs: &Expression<'_>, rhs: &Expression<'_>) -> Result {
        self.write("floor(")?;
        self.visit_expression(lhs)?;
        self.write("/")?;
        self.visit_expression(rhs)?;
        self.write(")")
    }

    fn in_list_limit(&self) -> Option<usize> {
        Some(1000)
    }

    fn visit_in_array_predicate(&mut self, in_array: &InArrayPredicate<'_>) -> Result {
        self.visit_expression(&in_array.expression)?;
        self.write(" in (select column_value from table(")?;
        self.visit_expression(&in_array.array)?;
        self.write("))")
    }

    fn supports_derived_column_list(&self) -> bool {
        false
    }

    fn visit_function_table_reference(&mut self, function: &FunctionTableReference<'_>) -> Result {
        match &function.ordinality {
            Some(ordinality) => {
                self.write(format_args!("lateral (select t.*,rownum {ordinality} from table("))?;
                self.visit_function(&function.function)?;
                self.write(") t)")?;
            }
            None => self.surround_with("table(", ")", |v| v.visit_function(&function.function))?,
        }

        self.write(" ")?;
        self.write(&function.alias)
    }

    fn visit_insert_statement_only(&mut self, insert: &InsertStatement<'_>) -> Result {
        match &insert.conflict {
            Some(conflict) if conflict.is_do_update() => merge::render_insert_as_merge(self, insert, conflict),
            Some(conflict) => {
                let name = conflict.constraint_name().unwrap_or_default().to_string();
                self.state_mut().unique_constraint_name = Some(name);
                self.visit_insert_statement_only_standard(insert)
            }
            None => self.visit_insert_statement_only_standard(insert),
        }
    }

    /// ` when matched then update set ... where p`
    fn render_merge_when_matched_update(
        &mut self,
        assignments: &[Assignment<'_>],
        predicate: Option<&Predicate<'_>>,
    ) -> Result {
        self.write(" when matched then update")?;
        self.render_set_clause(assignments)?;
        self.visit_where_clause(predicate)
    }

    fn visit_update_statement_only(&mut self, update: &UpdateStatement<'_>) -> Result {
        if update.from_clause.is_empty() {
            self.visit_update_statement_only_standard(update)
        } else {
            self.render_update_through_inline_view(update)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::*, dialect::Dialect, error::ErrorKind, visitor::*};
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    fn employee() -> TableGroup<'static> {
        TableGroup::new(NamedTableReference::new("employee").alias("e"))
    }

    fn build(major: u16, statement: impl Into<Statement<'static>>) -> String {
        Oracle::build(Dialect::oracle(major), &statement.into()).unwrap().sql().to_string()
    }

    fn names_where(predicate: Predicate<'static>) -> QuerySpec<'static> {
        QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "id"))
            .so_that(predicate)
    }

    #[test]
    fn native_offset_fetch_since_12c() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::asc(Expression::column("e", "name")))
            .offset(param("offset", SqlType::Integer))
            .fetch(param("limit", SqlType::Integer));

        assert_eq!(
            "select e.name from employee e order by e.name offset ? rows fetch first ? rows only",
            build(19, query)
        );
    }

    #[test]
    fn unordered_fetch_uses_rownum_on_11g() {
        let query = QuerySpec::root()
            .from(employee())
            .column(Expression::column("e", "name"))
            .fetch(param("limit", SqlType::Integer));

        assert_eq!(
            "select r_0_.c0 from (select e.name c0,rownum rn from employee e) r_0_ where r_0_.rn<=?",
            build(11, query)
        );
    }

    #[test]
    fn ordered_query_group_member_gets_an_offset() {
        let left = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("customer").alias("c")))
            .column(Expression::column("c", "name"))
            .order_by(SortSpecification::asc(Expression::column("c", "name")));

        let right = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("supplier").alias("s")))
            .column(Expression::column("s", "name"));

        let group = QueryGroup::new(SetOperator::Union, vec![left.into(), right.into()]).as_root();

        assert_eq!(
            "(select c.name from customer c order by c.name offset 0 rows) union select s.name from supplier s",
            build(19, group)
        );
    }

    #[test]
    fn except_is_minus() {
        let left = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("customer").alias("c")))
            .column(Expression::column("c", "id"));

        let right = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("supplier").alias("s")))
            .column(Expression::column("s", "id"));

        let group = QueryGroup::new(SetOperator::Except, vec![left.clone().into(), right.clone().into()]).as_root();
        assert_eq!("select c.id from customer c minus select s.id from supplier s", build(19, group));

        let all = QueryGroup::new(SetOperator::ExceptAll, vec![left.into(), right.into()]).as_root();
        let err = Oracle::build(Dialect::oracle(19), &all.into()).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn row_value_ordering_against_a_subquery_before_23() {
        let query = || {
            let manager = QuerySpec::sub_query()
                .from(TableGroup::new(NamedTableReference::new("employee").alias("m")))
                .column(Expression::column("m", "salary"))
                .column(Expression::column("m", "department_id"))
                .so_that(Expression::column("m", "id").equals(Expression::column("e", "manager")));

            names_where(
                Expression::tuple([Expression::column("e", "salary"), Expression::column("e", "department_id")])
                    .less_than(Expression::sub_query(manager)),
            )
        };

        expect![[r#"select e.id from employee e where exists (select 1 from employee m where m.id=e.manager and (e.salary<m.salary or e.salary=m.salary and e.department_id<m.department_id))"#]]
            .assert_eq(&build(19, query()));

        assert_eq!(
            "select e.id from employee e where (e.salary,e.department_id)<(select m.salary,m.department_id from employee m where m.id=e.manager)",
            build(23, query())
        );
    }

    #[test]
    fn distinct_from_uses_decode() {
        let query = names_where(Expression::column("e", "manager").is_distinct_from(param("manager", SqlType::BigInt)));

        assert_eq!("select e.id from employee e where decode(e.manager,?,0,1)=1", build(19, query));
    }

    #[test]
    fn lobs_and_xml_are_compared_with_functions() {
        let notes = names_where(
            Expression::Column(ColumnReference::new("e", "notes").typed(SqlType::Clob))
                .not_equals(param("notes", SqlType::Clob)),
        );

        assert_eq!(
            "select e.id from employee e where -1=dbms_lob.compare(e.notes,?)",
            build(19, notes)
        );

        let profile = names_where(
            Expression::Column(ColumnReference::new("e", "profile").typed(SqlType::Xml))
                .equals(param("profile", SqlType::Xml)),
        );

        expect![[r#"select e.id from employee e where 0=existsnode(xmldiff(e.profile,?),'/*[local-name()=''xdiff'']/*')"#]]
            .assert_eq(&build(19, profile));
    }

    #[test]
    fn array_comparison_uses_the_type_functions() {
        let query = names_where(
            Expression::Column(ColumnReference::new("e", "tags").typed(SqlType::Array("StringArray".into())))
                .less_than(param("tags", SqlType::Array("StringArray".into()))),
        );

        assert_eq!("select e.id from employee e where StringArray_cmp(e.tags,?)=-1", build(19, query));
    }

    #[test]
    fn integer_division_is_floored() {
        let quotient = Expression::arithmetic(
            ColumnReference::new("e", "days").typed(SqlType::Integer),
            ArithmeticOperator::Divide,
            7,
            SqlType::Integer,
        );

        let query = QuerySpec::root().from(employee()).column(quotient);

        assert_eq!("select floor(e.days/7) from employee e", build(19, query));
    }

    #[test]
    fn in_array_reads_a_collection() {
        let query = names_where(Expression::column("e", "id").in_array(param("ids", SqlType::Array("IdArray".into()))));

        assert_eq!(
            "select e.id from employee e where e.id in (select column_value from table(?))",
            build(19, query)
        );
    }

    #[test]
    fn long_in_lists_are_split() {
        let query = names_where(Expression::column("e", "id").in_list(1..=1001));
        let sql = build(19, query);

        assert!(sql.starts_with("select e.id from employee e where (e.id in (1,2,"));
        assert!(sql.ends_with(",1000) or e.id in (1001))"));
    }

    #[test]
    fn paginated_lock_uses_a_wrapper() {
        let query = QuerySpec::root()
            .from(TableGroup::new(NamedTableReference::new("employee").alias("e").identified_by(["id"])))
            .column(Expression::column("e", "name"))
            .order_by(SortSpecification::asc(Expression::column("e", "name")))
            .fetch(param("limit", SqlType::Integer));

        let select = SelectStatement::new(query).lock(LockOptions::new(LockMode::PessimisticWrite));
        let operation = Oracle::build(Dialect::oracle(19), &select.into()).unwrap();

        expect![[r#"select e.name from employee e where e.id in (select e.id from employee e order by e.name fetch first ? rows only) for update"#]]
            .assert_eq(operation.sql());
        assert!(!operation.needs_follow_on_locking());
    }

    #[test]
    fn paginated_lock_with_joins_follows_on() {
        let query = QuerySpec::root()
            .from(
                TableGroup::new(NamedTableReference::new("employee").alias("e").identified_by(["id"])).inner_join(
                    TableGroup::new(NamedTableReference::new("department").alias("d")),
                    Expression::column("e", "department_id").equals(Expression::column("d", "id")),
                ),
            )
            .column(Expression::column("e", "name"))
            .fetch(param("limit", SqlType::Integer));

        let select = SelectStatement::new(query).lock(LockOptions::new(LockMode::PessimisticWrite));
        let operation = Oracle::build(Dialect::oracle(19), &select.into()).unwrap();

        assert!(operation.needs_follow_on_locking());
        assert!(!operation.sql().contains("for update"));
    }

    #[test]
    fn merge_source_selects_from_dual() {
        let upsert = OptionalTableUpdate::new(NamedTableReference::new("employee_details").alias("d"))
            .key(ColumnValueBinding::new("id", param("id", SqlType::BigInt)))
            .value(ColumnValueBinding::new("photo", Expression::null(SqlType::Blob)))
            .optimistic_lock(ColumnValueBinding::new("version", param("version", SqlType::Integer)));

        let operation = Oracle::build(Dialect::oracle(19), &upsert.into()).unwrap();

        expect![[r#"merge into employee_details d using (select cast(? as number(19,0)) id,to_blob(null) photo from dual) s on (d.id=s.id) when not matched then insert (id,photo) values (s.id,s.photo) when matched then update set photo=s.photo where d.version=?"#]]
            .assert_eq(operation.sql());

        let names: Vec<_> = operation.parameter_binders().iter().map(|b| b.name()).collect();
        assert_eq!(vec!["id", "version"], names);
    }

    #[test]
    fn update_with_joins_goes_through_an_inline_view() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e"))
            .from(TableGroup::new(NamedTableReference::new("department").alias("d")))
            .set(Assignment::new(ColumnReference::new("e", "active"), false))
            .so_that(Expression::column("e", "department_id").equals(Expression::column("d", "id")));

        assert_eq!(
            "update (select e.active c0_,0 v0_ from employee e,department d where e.department_id=d.id) set c0_=v0_",
            build(19, update)
        );
    }

    #[test]
    fn update_with_unrestricted_joins_is_known_broken() {
        let update = UpdateStatement::new(NamedTableReference::new("employee").alias("e"))
            .from(TableGroup::new(NamedTableReference::new("department").alias("d")))
            .set(Assignment::new(ColumnReference::new("e", "active"), false));

        let err = Oracle::build(Dialect::oracle(19), &update.into()).unwrap_err();

        assert!(matches!(err.kind(), ErrorKind::KnownBroken { .. }));
        assert_eq!(Some("Oracle"), err.dialect());
    }

    #[test]
    fn materialized_cte_becomes_a_hint() {
        let cte = CteStatement::new(
            "recent",
            QuerySpec::sub_query()
                .from(TableGroup::new(NamedTableReference::new("orders").alias("o")))
                .column(Expression::column("o", "id")),
        )
        .materialization(CteMaterialization::Materialized);

        let select = SelectStatement::new(
            QuerySpec::root()
                .from(TableGroup::new(NamedTableReference::new("recent")))
                .column(Expression::column("recent", "id")),
        )
        .with(cte);

        assert_eq!(
            "with recent as (select /*+ materialize */ o.id from orders o) select recent.id from recent",
            build(19, select)
        );
    }

    #[test]
    fn multi_row_insert_before_23ai() {
        let insert = InsertStatement::values(
            NamedTableReference::new("tag"),
            vec![ColumnReference::unqualified("name")],
            vec![Values::new(["a"]), Values::new(["b"])],
        );

        assert_eq!(
            "insert into tag (name) select 'a' from dual union all select 'b' from dual",
            build(19, insert.clone())
        );
        assert_eq!("insert into tag (name) values ('a'),('b')", build(23, insert));
    }

    #[test]
    fn insert_of_a_paginated_query_group_numbers_rows() {
        let left = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("customer").alias("c")))
            .column(Expression::column("c", "name"));

        let right = QuerySpec::sub_query()
            .from(TableGroup::new(NamedTableReference::new("supplier").alias("s")))
            .column(Expression::column("s", "name"));

        let group = QueryGroup::new(SetOperator::UnionAll, vec![left.into(), right.into()])
            .order_by(SortSpecification::asc(1))
            .fetch(param("limit", SqlType::Integer));

        let insert = InsertStatement::select(
            NamedTableReference::new("contact"),
            vec![ColumnReference::unqualified("name")],
            group,
        );

        let sql = build(19, insert);

        assert!(sql.starts_with("insert into contact (name) select r_0_.c0 from (select q_.*,"));
        assert!(sql.contains("row_number() over(order by q_.c0) rn"));
        assert!(!sql.contains("fetch first"));
    }

    #[test]
    fn insert_ignoring_duplicates_reports_the_constraint() {
        let insert = InsertStatement::values(
            NamedTableReference::new("tag"),
            vec![ColumnReference::unqualified("name")],
            vec![Values::new(["a"])],
        )
        .on_conflict(ConflictClause::on_columns(["name"]));

        let operation = Oracle::build(Dialect::oracle(19), &insert.into()).unwrap();

        assert_eq!("insert into tag (name) values ('a')", operation.sql());
        assert_eq!(Some(""), operation.unique_constraint_name_that_may_fail());
    }
}
