use crate::{
    eval::{
        EvalError,
        pipeline::SpecificationEvaluator,
        source::{CancelToken, Materialize},
        trace::{EvalPhase, EvalTraceEvent, EvalTraceSink},
    },
    spec::GroupingSpecification,
};
use derive_more::{Deref, DerefMut};
use std::collections::HashMap;
use std::hash::Hash;

///
/// Grouped
///
/// One group: its key and the projected members, in source order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grouped<K, R> {
    pub key: K,
    pub items: Vec<R>,
}

///
/// GroupedResponse
///
/// Materialized grouping result: groups in first-occurrence key order.
///

#[derive(Clone, Debug, Deref, DerefMut, Eq, PartialEq)]
pub struct GroupedResponse<K, R>(pub Vec<Grouped<K, R>>);

impl<K, R> GroupedResponse<K, R> {
    #[must_use]
    pub fn into_inner(self) -> Vec<Grouped<K, R>> {
        self.0
    }
}

///
/// GroupingEvaluator
///
/// Grouping, per-element projection, and pagination together are not always
/// expressible in one translatable deferred query, so this evaluator
/// materializes: it applies the base pipeline without pagination, forces the
/// source through `Materialize` under the caller's cancel token, groups and
/// projects in memory, and pages the resulting group sequence.
///

#[derive(Clone, Copy, Default)]
pub struct GroupingEvaluator {
    trace: Option<&'static dyn EvalTraceSink>,
}

impl GroupingEvaluator {
    #[must_use]
    pub const fn new() -> Self {
        Self { trace: None }
    }

    /// Attach a trace sink observing evaluation phases.
    #[must_use]
    pub const fn with_trace(mut self, sink: &'static dyn EvalTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    pub fn evaluate<T, K, R, S>(
        &self,
        source: S,
        spec: &GroupingSpecification<T, K, R>,
        cancel: &CancelToken,
    ) -> Result<GroupedResponse<K, R>, EvalError>
    where
        K: Eq + Hash + Clone,
        S: Materialize<T>,
    {
        let mut pipeline = SpecificationEvaluator::<T, T, S>::without_pagination();
        if let Some(sink) = self.trace {
            pipeline = pipeline.with_trace(sink);
        }

        let shaped = pipeline.apply(source, spec.base())?;
        let rows = shaped.materialize(cancel)?;

        let result_fn = spec
            .result_selector()
            .ok_or(EvalError::GroupResultSelectorMissing)?;

        // Group in first-occurrence key order so repeated runs are identical.
        let mut groups: Vec<Grouped<K, R>> = Vec::new();
        let mut slots: HashMap<K, usize> = HashMap::new();
        for row in &rows {
            if cancel.is_cancelled() {
                return Err(EvalError::Cancelled);
            }

            let key = spec.key_of(row);
            let slot = match slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = groups.len();
                    groups.push(Grouped {
                        key: key.clone(),
                        items: Vec::new(),
                    });
                    slots.insert(key, slot);
                    slot
                }
            };
            groups[slot].items.push((result_fn.as_ref())(row));
        }
        self.emit(EvalTraceEvent::Phase {
            phase: EvalPhase::Group,
        });

        // Pagination applies to the materialized group sequence.
        if let Some(skip) = spec.base().skip_count() {
            groups.drain(..skip.min(groups.len()));
        }
        if let Some(take) = spec.base().take_count() {
            groups.truncate(take);
        }

        self.emit(EvalTraceEvent::Finish);
        Ok(GroupedResponse(groups))
    }

    fn emit(&self, event: EvalTraceEvent) {
        if let Some(sink) = self.trace {
            sink.on_event(event);
        }
    }
}
