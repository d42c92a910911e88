pub mod filter;
pub mod grouping;
pub mod include;
pub mod order;

pub use filter::{FilterExpr, PredicateFn};
pub use grouping::{GroupKeyFn, GroupingSpecification};
pub use include::{IncludeClause, IncludeKind};
pub use order::{KeyCmpFn, OrderClause, OrderKind};

use crate::compose::{ChainKind, ComposeError, ComposePolicies, merge, negate};
use std::{fmt, sync::Arc};

/// Shared one-to-one projection closure.
pub type SelectFn<T, R> = Arc<dyn Fn(&T) -> R + Send + Sync>;

/// Shared one-to-many (flattening) projection closure.
pub type SelectManyFn<T, R> = Arc<dyn Fn(&T) -> Vec<R> + Send + Sync>;

/// Client-side transform applied to materialized results, never translated.
pub type PostProcessFn<R> = Arc<dyn Fn(Vec<R>) -> Vec<R> + Send + Sync>;

///
/// TrackingMode
///
/// Hint to the eventual store about whether returned entities are mutably
/// tracked. One optional mode per specification; setting one replaces the
/// other, so the two hints can never both be present.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrackingMode {
    Tracked,
    Untracked,
}

///
/// Selector
///
/// Projection from the entity type to the result type. Exactly one shape per
/// specification by construction; a projectable evaluation with no selector
/// at all is the defined `SelectorMissing` error.
///

pub enum Selector<T, R> {
    /// One-to-one projection.
    One(SelectFn<T, R>),
    /// One-to-many flattening projection.
    Many(SelectManyFn<T, R>),
}

impl<T, R> Clone for Selector<T, R> {
    fn clone(&self) -> Self {
        match self {
            Self::One(f) => Self::One(Arc::clone(f)),
            Self::Many(f) => Self::Many(Arc::clone(f)),
        }
    }
}

impl<T, R> fmt::Debug for Selector<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(_) => write!(f, "One(..)"),
            Self::Many(_) => write!(f, "Many(..)"),
        }
    }
}

///
/// Specification
///
/// Declarative description of filter, order, include, paging, tracking, and
/// projection rules for entities of type `T`, projected to `R` (`R = T` for
/// the plain, non-projecting case).
///
/// This value:
/// - Collects clauses through consuming build-phase appenders
/// - Is purely declarative (no validation against a source, no execution)
/// - Must be treated as read-only once handed to composition or evaluation;
///   nothing in the engine mutates an input specification
///

pub struct Specification<T, R = T> {
    pub(crate) where_exprs: Vec<FilterExpr<T>>,
    pub(crate) order_by: Vec<OrderClause<T>>,
    pub(crate) includes: Vec<IncludeClause>,
    pub(crate) skip: Option<usize>,
    pub(crate) take: Option<usize>,
    pub(crate) tracking: Option<TrackingMode>,
    pub(crate) post_process: Option<PostProcessFn<R>>,
    pub(crate) selector: Option<Selector<T, R>>,
}

impl<T, R> Specification<T, R> {
    /// Create an empty (always-true, unordered) specification.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            where_exprs: Vec::new(),
            order_by: Vec::new(),
            includes: Vec::new(),
            skip: None,
            take: None,
            tracking: None,
            post_process: None,
            selector: None,
        }
    }

    // --- Criteria ---

    /// Append a filter expression; entries are ANDed at evaluation time.
    #[must_use]
    pub fn filter(mut self, expr: FilterExpr<T>) -> Self {
        self.where_exprs.push(expr);
        self
    }

    /// Append a bare predicate closure as a filter leaf.
    #[must_use]
    pub fn filter_fn(self, f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter(FilterExpr::pred(f))
    }

    // --- Ordering ---

    /// Start a fresh ascending ordering, clearing any prior order clauses.
    #[must_use]
    pub fn order_by<K: Ord>(self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.push_order(OrderClause::new(OrderKind::OrderBy, key))
    }

    /// Start a fresh descending ordering, clearing any prior order clauses.
    #[must_use]
    pub fn order_by_desc<K: Ord>(self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.push_order(OrderClause::new(OrderKind::OrderByDescending, key))
    }

    /// Append an ascending dependent sub-order.
    #[must_use]
    pub fn then_by<K: Ord>(self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.push_order(OrderClause::new(OrderKind::ThenBy, key))
    }

    /// Append a descending dependent sub-order.
    #[must_use]
    pub fn then_by_desc<K: Ord>(self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.push_order(OrderClause::new(OrderKind::ThenByDescending, key))
    }

    /// Append one order clause, keeping the list invariant: a primary kind
    /// resets the list, and a dependent kind on an empty list is recorded as
    /// its primary form so the first entry is always primary.
    #[must_use]
    pub fn push_order(mut self, mut clause: OrderClause<T>) -> Self {
        if clause.kind.is_primary() {
            self.order_by.clear();
        } else if self.order_by.is_empty() {
            clause.kind = clause.kind.promoted();
        }
        self.order_by.push(clause);
        self
    }

    // --- Includes ---

    /// Append a root navigation include.
    #[must_use]
    pub fn include(mut self, path: impl Into<String>) -> Self {
        self.includes.push(IncludeClause::root(path));
        self
    }

    /// Append a chained include continuing after a single reference.
    #[must_use]
    pub fn then_include(mut self, path: impl Into<String>) -> Self {
        self.includes.push(IncludeClause::after_reference(path));
        self
    }

    /// Append a chained include continuing after a collection.
    #[must_use]
    pub fn then_include_many(mut self, path: impl Into<String>) -> Self {
        self.includes.push(IncludeClause::after_collection(path));
        self
    }

    // --- Pagination ---

    /// Set or replace the number of leading entities to skip.
    #[must_use]
    pub const fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// Set or replace the result limit. Absent means no limit.
    #[must_use]
    pub const fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    // --- Tracking ---

    /// Hint that returned entities should be mutably tracked.
    #[must_use]
    pub const fn tracked(mut self) -> Self {
        self.tracking = Some(TrackingMode::Tracked);
        self
    }

    /// Hint that returned entities should not be tracked.
    #[must_use]
    pub const fn untracked(mut self) -> Self {
        self.tracking = Some(TrackingMode::Untracked);
        self
    }

    // --- Projection / post-processing ---

    /// Set a one-to-one projection selector.
    #[must_use]
    pub fn select(mut self, f: impl Fn(&T) -> R + Send + Sync + 'static) -> Self {
        self.selector = Some(Selector::One(Arc::new(f)));
        self
    }

    /// Set a one-to-many flattening projection selector.
    #[must_use]
    pub fn select_many(mut self, f: impl Fn(&T) -> Vec<R> + Send + Sync + 'static) -> Self {
        self.selector = Some(Selector::Many(Arc::new(f)));
        self
    }

    /// Set a client-side transform applied after materialization.
    #[must_use]
    pub fn post_process(mut self, f: impl Fn(Vec<R>) -> Vec<R> + Send + Sync + 'static) -> Self {
        self.post_process = Some(Arc::new(f));
        self
    }

    // --- Read access ---

    #[must_use]
    pub fn where_exprs(&self) -> &[FilterExpr<T>] {
        &self.where_exprs
    }

    #[must_use]
    pub fn order_clauses(&self) -> &[OrderClause<T>] {
        &self.order_by
    }

    #[must_use]
    pub fn includes(&self) -> &[IncludeClause] {
        &self.includes
    }

    #[must_use]
    pub const fn skip_count(&self) -> Option<usize> {
        self.skip
    }

    #[must_use]
    pub const fn take_count(&self) -> Option<usize> {
        self.take
    }

    #[must_use]
    pub const fn tracking(&self) -> Option<TrackingMode> {
        self.tracking
    }

    #[must_use]
    pub const fn selector(&self) -> Option<&Selector<T, R>> {
        self.selector.as_ref()
    }

    /// Run the post-processing action, if any, over materialized results.
    #[must_use]
    pub fn apply_post_processing(&self, rows: Vec<R>) -> Vec<R> {
        match &self.post_process {
            Some(f) => (f.as_ref())(rows),
            None => rows,
        }
    }

    // --- Composition ---

    /// AND-compose with another specification into a fresh one.
    pub fn and(&self, other: &Self, policies: &ComposePolicies) -> Result<Self, ComposeError> {
        merge::compose_pair(self, other, ChainKind::And, policies)
    }

    /// OR-compose with another specification into a fresh one.
    pub fn or(&self, other: &Self, policies: &ComposePolicies) -> Result<Self, ComposeError> {
        merge::compose_pair(self, other, ChainKind::Or, policies)
    }

    /// Specification whose filters are the individual negations of this
    /// one's filters.
    #[must_use]
    pub fn negated(&self) -> Self {
        negate::negate(self)
    }
}

impl<T, R> Default for Specification<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Clone for Specification<T, R> {
    fn clone(&self) -> Self {
        Self {
            where_exprs: self.where_exprs.clone(),
            order_by: self.order_by.clone(),
            includes: self.includes.clone(),
            skip: self.skip,
            take: self.take,
            tracking: self.tracking,
            post_process: self.post_process.as_ref().map(Arc::clone),
            selector: self.selector.clone(),
        }
    }
}

impl<T, R> fmt::Debug for Specification<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("where_exprs", &self.where_exprs)
            .field("order_by", &self.order_by)
            .field("includes", &self.includes)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("tracking", &self.tracking)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Customer;

    #[test]
    fn filters_accumulate_in_insertion_order() {
        let spec = Specification::<Customer>::new()
            .filter_fn(|c| c.active)
            .filter_fn(|c| c.age > 30);

        assert_eq!(spec.where_exprs().len(), 2);
    }

    #[test]
    fn new_primary_ordering_resets_prior_clauses() {
        let spec = Specification::<Customer>::new()
            .order_by(|c| c.age)
            .then_by(|c| c.name.clone())
            .order_by_desc(|c| c.name.clone());

        let clauses = spec.order_clauses();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].kind(), OrderKind::OrderByDescending);
    }

    #[test]
    fn dependent_kind_on_empty_list_is_recorded_as_primary() {
        let spec = Specification::<Customer>::new().then_by_desc(|c| c.age);

        let clauses = spec.order_clauses();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].kind(), OrderKind::OrderByDescending);
    }

    #[test]
    fn first_clause_is_always_primary() {
        let spec = Specification::<Customer>::new()
            .order_by(|c| c.age)
            .then_by(|c| c.name.clone())
            .then_by_desc(|c| c.id);

        let clauses = spec.order_clauses();
        assert_eq!(clauses.len(), 3);
        assert!(clauses[0].kind().is_primary());
        assert_eq!(clauses[1].kind(), OrderKind::ThenBy);
        assert_eq!(clauses[2].kind(), OrderKind::ThenByDescending);
    }

    #[test]
    fn tracking_hints_are_mutually_exclusive() {
        let spec = Specification::<Customer>::new().tracked().untracked();
        assert_eq!(spec.tracking(), Some(TrackingMode::Untracked));

        let spec = Specification::<Customer>::new().untracked().tracked();
        assert_eq!(spec.tracking(), Some(TrackingMode::Tracked));
    }

    #[test]
    fn includes_preserve_declared_order_and_kind() {
        let spec = Specification::<Customer>::new()
            .include("orders")
            .then_include_many("lines")
            .then_include("product");

        let includes = spec.includes();
        assert_eq!(includes.len(), 3);
        assert_eq!(includes[0].kind(), IncludeKind::Root);
        assert_eq!(includes[1].kind(), IncludeKind::AfterCollection);
        assert_eq!(includes[2].kind(), IncludeKind::AfterReference);
        assert_eq!(includes[1].path(), "lines");
    }

    #[test]
    fn selector_replaces_prior_shape() {
        let spec = Specification::<Customer, String>::new()
            .select(|c| c.name.clone())
            .select_many(|c| vec![c.name.clone(), c.city.clone()]);

        assert!(matches!(spec.selector(), Some(Selector::Many(_))));
    }

    #[test]
    fn post_processing_runs_only_when_set() {
        let spec = Specification::<Customer>::new();
        let rows = vec![Customer::new(1, "John", true, 40, "Derry")];
        assert_eq!(spec.apply_post_processing(rows.clone()).len(), 1);

        let spec = Specification::<Customer>::new().post_process(|mut rows| {
            rows.truncate(0);
            rows
        });
        assert!(spec.apply_post_processing(rows).is_empty());
    }
}
