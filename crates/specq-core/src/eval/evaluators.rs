use crate::{
    eval::{EvalError, source::QuerySource, trace::EvalPhase},
    spec::{Specification, TrackingMode},
};

///
/// Evaluate
///
/// One stateless evaluation strategy. Each strategy consumes a specification
/// and reshapes a query source; strategies hold no fields, so a chain of them
/// is thread-safe by construction.
///

pub trait Evaluate<T, R, S>: Send + Sync
where
    S: QuerySource<T>,
{
    /// True for strategies that shape criteria only. A criteria-only chain
    /// is the right tool for existence/count checks that must ignore
    /// ordering and paging.
    fn is_criteria(&self) -> bool {
        false
    }

    fn phase(&self) -> EvalPhase;

    fn evaluate(&self, source: S, spec: &Specification<T, R>) -> Result<S, EvalError>;
}

///
/// UntrackedEvaluator
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UntrackedEvaluator;

impl<T, R, S> Evaluate<T, R, S> for UntrackedEvaluator
where
    S: QuerySource<T>,
{
    fn phase(&self) -> EvalPhase {
        EvalPhase::Untracked
    }

    fn evaluate(&self, source: S, spec: &Specification<T, R>) -> Result<S, EvalError> {
        Ok(if spec.tracking() == Some(TrackingMode::Untracked) {
            source.mark_tracking(TrackingMode::Untracked)
        } else {
            source
        })
    }
}

///
/// TrackedEvaluator
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TrackedEvaluator;

impl<T, R, S> Evaluate<T, R, S> for TrackedEvaluator
where
    S: QuerySource<T>,
{
    fn phase(&self) -> EvalPhase {
        EvalPhase::Tracked
    }

    fn evaluate(&self, source: S, spec: &Specification<T, R>) -> Result<S, EvalError> {
        Ok(if spec.tracking() == Some(TrackingMode::Tracked) {
            source.mark_tracking(TrackingMode::Tracked)
        } else {
            source
        })
    }
}

///
/// IncludeEvaluator
///

#[derive(Clone, Copy, Debug, Default)]
pub struct IncludeEvaluator;

impl<T, R, S> Evaluate<T, R, S> for IncludeEvaluator
where
    S: QuerySource<T>,
{
    fn phase(&self) -> EvalPhase {
        EvalPhase::Include
    }

    fn evaluate(&self, mut source: S, spec: &Specification<T, R>) -> Result<S, EvalError> {
        for clause in spec.includes() {
            source = source.include(clause);
        }
        Ok(source)
    }
}

///
/// WhereEvaluator
///

#[derive(Clone, Copy, Debug, Default)]
pub struct WhereEvaluator;

impl<T, R, S> Evaluate<T, R, S> for WhereEvaluator
where
    S: QuerySource<T>,
{
    fn is_criteria(&self) -> bool {
        true
    }

    fn phase(&self) -> EvalPhase {
        EvalPhase::Filter
    }

    fn evaluate(&self, mut source: S, spec: &Specification<T, R>) -> Result<S, EvalError> {
        for expr in spec.where_exprs() {
            source = source.filter(expr);
        }
        Ok(source)
    }
}

///
/// OrderEvaluator
///

#[derive(Clone, Copy, Debug, Default)]
pub struct OrderEvaluator;

impl<T, R, S> Evaluate<T, R, S> for OrderEvaluator
where
    S: QuerySource<T>,
{
    fn phase(&self) -> EvalPhase {
        EvalPhase::Order
    }

    fn evaluate(&self, mut source: S, spec: &Specification<T, R>) -> Result<S, EvalError> {
        for clause in spec.order_clauses() {
            source = source.order_by(clause);
        }
        Ok(source)
    }
}

///
/// PageEvaluator
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PageEvaluator;

impl<T, R, S> Evaluate<T, R, S> for PageEvaluator
where
    S: QuerySource<T>,
{
    fn phase(&self) -> EvalPhase {
        EvalPhase::Page
    }

    fn evaluate(&self, mut source: S, spec: &Specification<T, R>) -> Result<S, EvalError> {
        if let Some(n) = spec.skip_count() {
            source = source.skip(n);
        }
        // An absent take means no limit; evaluation never forces a count.
        if let Some(n) = spec.take_count() {
            source = source.take(n);
        }
        Ok(source)
    }
}
