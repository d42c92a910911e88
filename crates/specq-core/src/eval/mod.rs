//! Evaluation of specifications against deferred query sources: the source
//! contract, the ordered evaluator pipeline, and the grouping evaluator.

pub mod evaluators;
pub mod grouped;
pub mod pipeline;
pub mod sequence;
pub mod source;
pub mod trace;

#[cfg(test)]
mod tests;

pub use evaluators::{
    Evaluate, IncludeEvaluator, OrderEvaluator, PageEvaluator, TrackedEvaluator,
    UntrackedEvaluator, WhereEvaluator,
};
pub use grouped::{Grouped, GroupedResponse, GroupingEvaluator};
pub use pipeline::SpecificationEvaluator;
pub use sequence::SequenceSource;
pub use source::{CancelToken, Materialize, QuerySource};
pub use trace::{EvalPhase, EvalTraceEvent, EvalTraceSink};

use thiserror::Error as ThisError;

///
/// EvalError
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum EvalError {
    #[error("projection selector not set on a projectable specification")]
    SelectorMissing,

    #[error("group result selector not set on a grouping specification")]
    GroupResultSelectorMissing,

    #[error("evaluation cancelled")]
    Cancelled,
}
