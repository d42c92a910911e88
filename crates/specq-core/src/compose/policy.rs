///
/// OrderingPolicy
///
/// How two specifications' ordering lists merge.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderingPolicy {
    /// Discard ordering entirely; the caller re-orders the composition.
    #[default]
    None,
    /// Take the left side's ordering verbatim.
    Left,
    /// Take the right side's ordering verbatim.
    Right,
    /// Left's keys stay primary; right's become dependent sub-orders.
    BothLeftPriority,
    /// Right's keys stay primary; left's become dependent sub-orders.
    BothRightPriority,
}

///
/// PaginationPolicy
///
/// How two specifications' skip/take bounds merge.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PaginationPolicy {
    /// Discard both sides' bounds.
    None,
    /// Take the left side's bounds unconditionally.
    Left,
    /// Take the right side's bounds unconditionally.
    Right,
    /// Keep a bound set on one side; differing explicit values are an error.
    #[default]
    ThrowOnConflict,
}

///
/// ProjectionPolicy
///
/// Which side's projection selector a composition keeps. Projections are
/// never merged, only chosen, so there is no `None` here.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ProjectionPolicy {
    #[default]
    Left,
    Right,
}

///
/// ComposePolicies
///
/// Policy bundle consulted by the composer for every pairwise merge.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ComposePolicies {
    pub ordering: OrderingPolicy,
    pub pagination: PaginationPolicy,
    pub projection: ProjectionPolicy,
}

impl ComposePolicies {
    #[must_use]
    pub const fn new(
        ordering: OrderingPolicy,
        pagination: PaginationPolicy,
        projection: ProjectionPolicy,
    ) -> Self {
        Self {
            ordering,
            pagination,
            projection,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let policies = ComposePolicies::default();
        assert_eq!(policies.ordering, OrderingPolicy::None);
        assert_eq!(policies.pagination, PaginationPolicy::ThrowOnConflict);
        assert_eq!(policies.projection, ProjectionPolicy::Left);
    }
}
