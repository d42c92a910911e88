use crate::spec::Specification;

/// Specification whose filter set is the member-wise negation of `spec`'s.
///
/// Each filter entry is negated individually and the negations are ANDed by
/// the list semantics. With a single entry this matches negating the whole
/// criteria; with several independently-added entries it does NOT equal
/// De Morgan's negation of their conjunction. The test below documents that
/// behavior.
pub(crate) fn negate<T, R>(spec: &Specification<T, R>) -> Specification<T, R> {
    let mut dest = spec.clone();
    dest.where_exprs = spec
        .where_exprs
        .iter()
        .map(|expr| expr.clone().not())
        .collect();
    dest
}

///
/// TESTS
///
