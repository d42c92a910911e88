use crate::error::Error;
use specq_core::{
    eval::{
        CancelToken, GroupedResponse, GroupingEvaluator, Materialize, SequenceSource,
        SpecificationEvaluator,
    },
    spec::{GroupingSpecification, Specification},
};
use std::hash::Hash;

/// Evaluate a specification against an in-memory sequence: full pipeline,
/// materialization, then the post-processing action.
pub fn evaluate<T>(
    spec: &Specification<T>,
    items: impl IntoIterator<Item = T>,
) -> Result<Vec<T>, Error> {
    let source: SequenceSource<T> = items.into_iter().collect();
    let shaped = SpecificationEvaluator::new().evaluate(source, spec)?;
    let rows = shaped.materialize(&CancelToken::new())?;

    Ok(spec.apply_post_processing(rows))
}

/// Evaluate a projectable specification: full pipeline, projection,
/// materialization, then the post-processing action over projected results.
pub fn evaluate_projected<T, R>(
    spec: &Specification<T, R>,
    items: impl IntoIterator<Item = T>,
) -> Result<Vec<R>, Error> {
    let source: SequenceSource<T> = items.into_iter().collect();
    let projected = SpecificationEvaluator::new().project(source, spec)?;
    let rows = projected.materialize(&CancelToken::new())?;

    Ok(spec.apply_post_processing(rows))
}

/// Count entities matching a specification's criteria. Ordering and paging
/// are ignored: counts answer "how many match", not "how many fit the page".
pub fn count<T, R>(
    spec: &Specification<T, R>,
    items: impl IntoIterator<Item = T>,
) -> Result<usize, Error> {
    let source: SequenceSource<T> = items.into_iter().collect();
    let shaped = SpecificationEvaluator::criteria_only().evaluate(source, spec)?;

    Ok(shaped.materialize(&CancelToken::new())?.len())
}

/// True if any entity matches the specification's criteria.
pub fn exists<T, R>(
    spec: &Specification<T, R>,
    items: impl IntoIterator<Item = T>,
) -> Result<bool, Error> {
    Ok(count(spec, items)? > 0)
}

/// Evaluate a grouping specification against an in-memory sequence. The
/// cancel token is observed at materialization and per grouped row.
pub fn evaluate_grouped<T, K, R>(
    spec: &GroupingSpecification<T, K, R>,
    items: impl IntoIterator<Item = T>,
    cancel: &CancelToken,
) -> Result<GroupedResponse<K, R>, Error>
where
    K: Eq + Hash + Clone,
{
    let source: SequenceSource<T> = items.into_iter().collect();
    let groups = GroupingEvaluator::new().evaluate(source, spec, cancel)?;

    Ok(groups)
}
