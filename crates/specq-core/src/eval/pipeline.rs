use crate::{
    eval::{
        EvalError,
        evaluators::{
            Evaluate, IncludeEvaluator, OrderEvaluator, PageEvaluator, TrackedEvaluator,
            UntrackedEvaluator, WhereEvaluator,
        },
        source::QuerySource,
        trace::{EvalPhase, EvalTraceEvent, EvalTraceSink},
    },
    spec::{Selector, Specification},
};

///
/// SpecificationEvaluator
///
/// Ordered chain of evaluation strategies applied left to right. The default
/// chain is tracking, includes, filters, ordering, pagination; alternative
/// constructors select sub-chains, and `from_evaluators` accepts an injected
/// chain outright.
///

pub struct SpecificationEvaluator<T, R, S>
where
    S: QuerySource<T>,
{
    evaluators: Vec<Box<dyn Evaluate<T, R, S>>>,
    trace: Option<&'static dyn EvalTraceSink>,
}

impl<T, R, S> SpecificationEvaluator<T, R, S>
where
    S: QuerySource<T>,
{
    /// The full default chain.
    #[must_use]
    pub fn new() -> Self {
        Self::from_evaluators(default_chain())
    }

    /// Build from an explicit, ordered evaluator chain.
    #[must_use]
    pub fn from_evaluators(evaluators: Vec<Box<dyn Evaluate<T, R, S>>>) -> Self {
        Self {
            evaluators,
            trace: None,
        }
    }

    /// Only the criteria strategies of the default chain; ordering and
    /// paging are ignored, which is what existence/count checks need.
    #[must_use]
    pub fn criteria_only() -> Self {
        Self::from_evaluators(
            default_chain()
                .into_iter()
                .filter(|e| e.is_criteria())
                .collect(),
        )
    }

    /// The default chain minus pagination; the grouping evaluator pages the
    /// materialized group sequence itself.
    #[must_use]
    pub fn without_pagination() -> Self {
        Self::from_evaluators(
            default_chain()
                .into_iter()
                .filter(|e| e.phase() != EvalPhase::Page)
                .collect(),
        )
    }

    /// Attach a trace sink observing evaluation phases.
    #[must_use]
    pub fn with_trace(mut self, sink: &'static dyn EvalTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Apply every strategy in chain order. Emits `Start` and per-strategy
    /// phase events, but not `Finish`; callers finish their own cycle.
    pub(crate) fn apply(
        &self,
        mut source: S,
        spec: &Specification<T, R>,
    ) -> Result<S, EvalError> {
        self.emit(EvalTraceEvent::Start {
            evaluators: self.evaluators.len(),
        });

        for evaluator in &self.evaluators {
            source = evaluator.evaluate(source, spec)?;
            self.emit(EvalTraceEvent::Phase {
                phase: evaluator.phase(),
            });
        }

        Ok(source)
    }

    /// Apply the chain and return the reshaped (still deferred) source.
    pub fn evaluate(&self, source: S, spec: &Specification<T, R>) -> Result<S, EvalError> {
        let shaped = self.apply(source, spec)?;
        self.emit(EvalTraceEvent::Finish);
        Ok(shaped)
    }

    /// Apply the chain, then the projection selector. Exactly one selector
    /// shape exists by construction; none at all is the defined error.
    pub fn project(
        &self,
        source: S,
        spec: &Specification<T, R>,
    ) -> Result<S::Of<R>, EvalError> {
        let shaped = self.apply(source, spec)?;

        let projected = match spec.selector() {
            Some(Selector::One(f)) => shaped.select(f),
            Some(Selector::Many(f)) => shaped.select_many(f),
            None => return Err(EvalError::SelectorMissing),
        };

        self.emit(EvalTraceEvent::Phase {
            phase: EvalPhase::Project,
        });
        self.emit(EvalTraceEvent::Finish);
        Ok(projected)
    }

    fn emit(&self, event: EvalTraceEvent) {
        if let Some(sink) = self.trace {
            sink.on_event(event);
        }
    }
}

impl<T, R, S> Default for SpecificationEvaluator<T, R, S>
where
    S: QuerySource<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

fn default_chain<T, R, S>() -> Vec<Box<dyn Evaluate<T, R, S>>>
where
    S: QuerySource<T>,
{
    vec![
        Box::new(UntrackedEvaluator),
        Box::new(TrackedEvaluator),
        Box::new(IncludeEvaluator),
        Box::new(WhereEvaluator),
        Box::new(OrderEvaluator),
        Box::new(PageEvaluator),
    ]
}
