//! Deciding how the row locks of a select are acquired.
use super::{LockStrategy, Visitor};
use crate::{ast::*, error::Error};

/// Applies the caller's follow-on preference to a query that cannot carry
/// a lock clause.
pub(crate) fn resolve(follow_on: FollowOnLocking, reason: &'static str) -> crate::Result<LockStrategy> {
    match follow_on {
        FollowOnLocking::Disallow => Err(Error::illegal_operation(reason)),
        FollowOnLocking::Ignore => Ok(LockStrategy::None),
        FollowOnLocking::Allow | FollowOnLocking::Force => Ok(LockStrategy::FollowOn),
    }
}

/// The first construct in the query that rules out a lock clause.
pub(crate) fn structural_conflict<V: Visitor>(
    v: &V,
    spec: &QuerySpec<'_>,
    union_tables_lockable: bool,
) -> Option<&'static str> {
    if !spec.group_by.is_empty() || spec.having.is_some() {
        Some("Locking with GROUP BY or HAVING is not supported")
    } else if spec.select_clause.distinct {
        Some("Locking with DISTINCT is not supported")
    } else if spec.has_aggregate_functions() {
        Some("Locking with aggregate functions is not supported")
    } else if v.state().is_part_of_query_group() {
        Some("Locking with set operators is not supported")
    } else if !union_tables_lockable && has_union_table(&spec.from_clause.roots) {
        Some("Locking union tables is not supported")
    } else if v.needs_full_join_emulation(spec) {
        Some("Locking with an emulated full join is not supported")
    } else {
        None
    }
}

fn has_union_table(groups: &[TableGroup<'_>]) -> bool {
    groups.iter().any(|group| {
        matches!(group.primary, TableReference::Union(_))
            || group
                .joins
                .iter()
                .any(|join| has_union_table(std::slice::from_ref(&join.group)))
    })
}

pub(crate) fn determine_locking_strategy_standard<V: Visitor>(
    v: &V,
    spec: &QuerySpec<'_>,
    follow_on: FollowOnLocking,
) -> crate::Result<LockStrategy> {
    if follow_on == FollowOnLocking::Force {
        return Ok(LockStrategy::FollowOn);
    }

    if let Some(reason) = structural_conflict(v, spec, false) {
        return resolve(follow_on, reason);
    }

    if v.should_emulate_fetch_clause(spec) {
        return resolve(follow_on, "Locking with emulated OFFSET/FETCH is not supported");
    }

    Ok(LockStrategy::Clause)
}
