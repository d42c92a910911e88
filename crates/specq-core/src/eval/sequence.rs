use crate::{
    eval::{
        EvalError,
        source::{CancelToken, Materialize, QuerySource},
    },
    spec::{FilterExpr, IncludeClause, OrderClause, SelectFn, SelectManyFn, TrackingMode},
};
use std::cmp::Ordering;

///
/// SequenceSource
///
/// In-memory query source over a materialized vector. Filters and ordering
/// apply eagerly (ordering with a stable sort over the accumulated clause
/// chain, so dependent sub-orders refine rather than replace); navigation
/// data is already resident, so includes are recorded rather than loaded,
/// and the tracking hint is recorded for inspection.
///

#[derive(Clone, Debug)]
pub struct SequenceSource<T> {
    items: Vec<T>,
    order_chain: Vec<OrderClause<T>>,
    tracking: Option<TrackingMode>,
    includes: Vec<IncludeClause>,
}

impl<T> SequenceSource<T> {
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self {
            items,
            order_chain: Vec::new(),
            tracking: None,
            includes: Vec::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub const fn tracking(&self) -> Option<TrackingMode> {
        self.tracking
    }

    /// Include clauses recorded against this source, in applied order.
    #[must_use]
    pub fn included(&self) -> &[IncludeClause] {
        &self.includes
    }

    fn resort(&mut self) {
        let chain = &self.order_chain;
        self.items.sort_by(|a, b| {
            chain
                .iter()
                .fold(Ordering::Equal, |ord, clause| {
                    ord.then_with(|| clause.compare(a, b))
                })
        });
    }
}

impl<T> FromIterator<T> for SequenceSource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> QuerySource<T> for SequenceSource<T> {
    type Of<U> = SequenceSource<U>;

    fn filter(mut self, predicate: &FilterExpr<T>) -> Self {
        self.items.retain(|item| predicate.eval(item));
        self
    }

    fn include(mut self, clause: &IncludeClause) -> Self {
        self.includes.push(clause.clone());
        self
    }

    fn order_by(mut self, clause: &OrderClause<T>) -> Self {
        if clause.kind().is_primary() {
            self.order_chain.clear();
        }
        self.order_chain.push(clause.clone());
        self.resort();
        self
    }

    fn skip(mut self, n: usize) -> Self {
        let n = n.min(self.items.len());
        self.items.drain(..n);
        self
    }

    fn take(mut self, n: usize) -> Self {
        self.items.truncate(n);
        self
    }

    fn mark_tracking(mut self, mode: TrackingMode) -> Self {
        self.tracking = Some(mode);
        self
    }

    fn select<R>(self, selector: &SelectFn<T, R>) -> SequenceSource<R> {
        let f = selector.as_ref();
        SequenceSource {
            items: self.items.iter().map(|item| f(item)).collect(),
            order_chain: Vec::new(),
            tracking: self.tracking,
            includes: self.includes,
        }
    }

    fn select_many<R>(self, selector: &SelectManyFn<T, R>) -> SequenceSource<R> {
        let f = selector.as_ref();
        SequenceSource {
            items: self.items.iter().flat_map(|item| f(item)).collect(),
            order_chain: Vec::new(),
            tracking: self.tracking,
            includes: self.includes,
        }
    }
}

impl<T> Materialize<T> for SequenceSource<T> {
    fn materialize(self, cancel: &CancelToken) -> Result<Vec<T>, EvalError> {
        if cancel.is_cancelled() {
            return Err(EvalError::Cancelled);
        }
        Ok(self.items)
    }
}

///
/// TESTS
///
