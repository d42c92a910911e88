use crate::{
    eval::EvalError,
    spec::{FilterExpr, IncludeClause, OrderClause, SelectFn, SelectManyFn, TrackingMode},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

///
/// QuerySource
///
/// Contract for a deferred query source. Implementors stay deferred: every
/// operation returns a reshaped source, never results. The element type can
/// change only through the projection operations, which re-shape into
/// `Self::Of<R>`.
///

pub trait QuerySource<T>: Sized {
    /// The same source shape over a different element type.
    type Of<U>: QuerySource<U>;

    /// Narrow the source to entities matching the predicate.
    #[must_use]
    fn filter(self, predicate: &FilterExpr<T>) -> Self;

    /// Apply one navigation include; dispatch is driven by the clause's
    /// recorded kind alone.
    #[must_use]
    fn include(self, clause: &IncludeClause) -> Self;

    /// Apply one ordering clause: primary kinds restart the ordering,
    /// dependent kinds refine it.
    #[must_use]
    fn order_by(self, clause: &OrderClause<T>) -> Self;

    /// Drop the first `n` entities.
    #[must_use]
    fn skip(self, n: usize) -> Self;

    /// Keep at most `n` entities.
    #[must_use]
    fn take(self, n: usize) -> Self;

    /// Record the tracking hint for the eventual store.
    #[must_use]
    fn mark_tracking(self, mode: TrackingMode) -> Self;

    /// Project every entity through a one-to-one selector.
    fn select<R>(self, selector: &SelectFn<T, R>) -> Self::Of<R>;

    /// Project and flatten every entity through a one-to-many selector.
    fn select_many<R>(self, selector: &SelectManyFn<T, R>) -> Self::Of<R>;
}

///
/// Materialize
///
/// The completion primitive a source supplies for the one boundary where the
/// engine must leave the deferred world: the grouping evaluator's forced
/// materialization. Cancellation is observed here, not inside the deferred
/// operations.
///

pub trait Materialize<T>: QuerySource<T> {
    fn materialize(self, cancel: &CancelToken) -> Result<Vec<T>, EvalError>;
}

///
/// CancelToken
///
/// Externally owned cancellation signal for materialization. Cloning shares
/// the underlying flag.
///

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; observed at the next materialization check.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

///
/// TESTS
///
