use crate::{
    compose::{
        ChainKind, ComposeError,
        policy::{ComposePolicies, OrderingPolicy, PaginationPolicy, ProjectionPolicy},
    },
    spec::{FilterExpr, OrderClause, Specification},
};

/// Merge `left` and `right` into a fresh destination specification for one
/// AND or OR relation. Inputs are borrowed immutably and never mutated.
pub(crate) fn compose_pair<T, R>(
    left: &Specification<T, R>,
    right: &Specification<T, R>,
    relation: ChainKind,
    policies: &ComposePolicies,
) -> Result<Specification<T, R>, ComposeError> {
    let (skip, take) = merge_pagination(left, right, policies.pagination)?;

    Ok(Specification {
        where_exprs: merge_criteria(left, right, relation),
        order_by: merge_ordering(left, right, policies.ordering),
        includes: [left.includes.as_slice(), right.includes.as_slice()].concat(),
        skip,
        take,
        tracking: left.tracking.or(right.tracking),
        post_process: left
            .post_process
            .clone()
            .or_else(|| right.post_process.clone()),
        selector: match policies.projection {
            ProjectionPolicy::Left => left.selector.clone(),
            ProjectionPolicy::Right => right.selector.clone(),
        },
    })
}

/// AND-fold one side's filter list into a single expression; an empty list
/// is the always-true specification.
fn fold_side<T>(exprs: &[FilterExpr<T>]) -> FilterExpr<T> {
    exprs
        .iter()
        .cloned()
        .fold(FilterExpr::True, |acc, expr| acc.and(expr))
}

fn merge_criteria<T, R>(
    left: &Specification<T, R>,
    right: &Specification<T, R>,
    relation: ChainKind,
) -> Vec<FilterExpr<T>> {
    let lhs = fold_side(&left.where_exprs);
    let rhs = fold_side(&right.where_exprs);

    let joined = match relation {
        ChainKind::And => lhs.and(rhs),
        ChainKind::Or => lhs.or(rhs),
    }
    .simplify();

    // A True criteria is the empty filter list, keeping "empty spec" and
    // "composed-to-true spec" indistinguishable downstream.
    if matches!(joined, FilterExpr::True) {
        Vec::new()
    } else {
        vec![joined]
    }
}

fn merge_ordering<T, R>(
    left: &Specification<T, R>,
    right: &Specification<T, R>,
    policy: OrderingPolicy,
) -> Vec<OrderClause<T>> {
    match policy {
        OrderingPolicy::None => Vec::new(),
        OrderingPolicy::Left => left.order_by.clone(),
        OrderingPolicy::Right => right.order_by.clone(),
        OrderingPolicy::BothLeftPriority => concat_ordering(&left.order_by, &right.order_by),
        OrderingPolicy::BothRightPriority => concat_ordering(&right.order_by, &left.order_by),
    }
}

/// Concatenate two ordering lists. The appended side's primary kinds are
/// demoted to their dependent forms so the priority side's keys stay primary.
fn concat_ordering<T>(priority: &[OrderClause<T>], appended: &[OrderClause<T>]) -> Vec<OrderClause<T>> {
    let mut merged = priority.to_vec();
    for clause in appended {
        if merged.is_empty() {
            merged.push(clause.clone());
        } else {
            merged.push(clause.demoted());
        }
    }
    merged
}

fn merge_pagination<T, R>(
    left: &Specification<T, R>,
    right: &Specification<T, R>,
    policy: PaginationPolicy,
) -> Result<(Option<usize>, Option<usize>), ComposeError> {
    match policy {
        PaginationPolicy::None => Ok((None, None)),
        PaginationPolicy::Left => Ok((left.skip, left.take)),
        PaginationPolicy::Right => Ok((right.skip, right.take)),
        PaginationPolicy::ThrowOnConflict => Ok((
            merge_bound("skip", left.skip, right.skip)?,
            merge_bound("take", left.take, right.take)?,
        )),
    }
}

/// A bound set on one side is kept; differing explicit values conflict.
fn merge_bound(
    bound: &'static str,
    left: Option<usize>,
    right: Option<usize>,
) -> Result<Option<usize>, ComposeError> {
    match (left, right) {
        (Some(l), Some(r)) if l != r => Err(ComposeError::PaginationConflict {
            bound,
            left: l,
            right: r,
        }),
        (Some(l), _) => Ok(Some(l)),
        (None, r) => Ok(r),
    }
}
