use super::*;
use crate::{
    spec::{GroupingSpecification, Specification, TrackingMode},
    test_support::{Customer, customers},
};
use std::sync::Mutex;

fn names(items: &[Customer]) -> Vec<&str> {
    items.iter().map(|c| c.name.as_str()).collect()
}

fn run(spec: &Specification<Customer>) -> Vec<Customer> {
    SpecificationEvaluator::new()
        .evaluate(SequenceSource::new(customers()), spec)
        .unwrap()
        .materialize(&CancelToken::new())
        .unwrap()
}

// --- Full chain ---

#[test]
fn filter_order_and_page_apply_in_pipeline_order() {
    let spec = Specification::<Customer>::new()
        .filter_fn(|c| c.active)
        .order_by(|c| c.age)
        .skip(1)
        .take(1);

    // Active sorted by age: Jane(29), John(34), John(51); window keeps John(34).
    let rows = run(&spec);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 1);
}

#[test]
fn filters_and_fold_across_entries() {
    let spec = Specification::<Customer>::new()
        .filter_fn(|c| c.name == "John")
        .filter_fn(|c| c.active);

    assert_eq!(names(&run(&spec)), vec!["John", "John"]);
}

#[test]
fn primary_and_dependent_ordering() {
    let spec = Specification::<Customer>::new()
        .order_by(|c| c.city.clone())
        .then_by_desc(|c| c.age);

    let rows = run(&spec);
    let ids: Vec<u32> = rows.iter().map(|c| c.id).collect();
    // Derry by age desc: 4, 1; then Sligo by age desc: 3, 2.
    assert_eq!(ids, vec![4, 1, 3, 2]);
}

#[test]
fn absent_take_means_no_limit() {
    let spec = Specification::<Customer>::new().order_by(|c| c.id).skip(1);

    let rows = run(&spec);
    assert_eq!(rows.len(), 3);
}

#[test]
fn tracking_hint_reaches_the_source() {
    let spec = Specification::<Customer>::new().untracked();
    let shaped = SpecificationEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec)
        .unwrap();
    assert_eq!(shaped.tracking(), Some(TrackingMode::Untracked));

    let spec = Specification::<Customer>::new().tracked();
    let shaped = SpecificationEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec)
        .unwrap();
    assert_eq!(shaped.tracking(), Some(TrackingMode::Tracked));

    let spec = Specification::<Customer>::new();
    let shaped = SpecificationEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec)
        .unwrap();
    assert_eq!(shaped.tracking(), None);
}

#[test]
fn includes_apply_in_declared_order() {
    let spec = Specification::<Customer>::new()
        .include("orders")
        .then_include_many("lines");

    let shaped = SpecificationEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec)
        .unwrap();

    let paths: Vec<&str> = shaped.included().iter().map(|c| c.path()).collect();
    assert_eq!(paths, vec!["orders", "lines"]);
}

// --- Criteria-only chain ---

#[test]
fn criteria_only_ignores_ordering_and_paging() {
    let spec = Specification::<Customer>::new()
        .filter_fn(|c| c.active)
        .order_by(|c| c.age)
        .skip(10)
        .take(0);

    let rows = SpecificationEvaluator::criteria_only()
        .evaluate(SequenceSource::new(customers()), &spec)
        .unwrap()
        .materialize(&CancelToken::new())
        .unwrap();

    // Paging would have emptied the result; criteria alone keeps 3.
    assert_eq!(rows.len(), 3);
}

// --- Projection ---

#[test]
fn select_projects_one_to_one() {
    let spec = Specification::<Customer, String>::new()
        .filter_fn(|c| c.active)
        .select(|c| c.name.clone());

    let projected = SpecificationEvaluator::new()
        .project(SequenceSource::new(customers()), &spec)
        .unwrap()
        .materialize(&CancelToken::new())
        .unwrap();

    assert_eq!(projected, vec!["John", "Jane", "John"]);
}

#[test]
fn select_many_flattens() {
    let spec = Specification::<Customer, String>::new()
        .filter_fn(|c| c.city == "Derry")
        .select_many(|c| vec![c.name.clone(), c.city.clone()]);

    let projected = SpecificationEvaluator::new()
        .project(SequenceSource::new(customers()), &spec)
        .unwrap()
        .materialize(&CancelToken::new())
        .unwrap();

    assert_eq!(projected, vec!["John", "Derry", "Jo", "Derry"]);
}

#[test]
fn projection_without_selector_is_an_error() {
    let spec = Specification::<Customer, String>::new().filter_fn(|c| c.active);

    let err = SpecificationEvaluator::new()
        .project(SequenceSource::new(customers()), &spec)
        .unwrap_err();

    assert_eq!(err, EvalError::SelectorMissing);
}

// --- Grouping ---

#[test]
fn grouping_preserves_first_occurrence_key_order() {
    let spec = GroupingSpecification::identity(
        Specification::<Customer>::new().order_by(|c| c.id),
        |c| c.city.clone(),
    );

    let groups = GroupingEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec, &CancelToken::new())
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key, "Derry");
    assert_eq!(groups[0].items.len(), 2);
    assert_eq!(groups[1].key, "Sligo");
    assert_eq!(groups[1].items.len(), 2);
}

#[test]
fn grouping_pages_the_materialized_group_sequence() {
    // Keys in first-occurrence order: A, B; take(1) keeps exactly one group.
    let items = vec![('A', 1), ('B', 2), ('A', 3)];
    let spec =
        GroupingSpecification::identity(Specification::<(char, i32)>::new().take(1), |t| t.0);

    let groups = GroupingEvaluator::new()
        .evaluate(SequenceSource::new(items), &spec, &CancelToken::new())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, 'A');
    assert_eq!(groups[0].items, vec![('A', 1), ('A', 3)]);
}

#[test]
fn grouping_applies_base_filters_before_grouping() {
    let spec = GroupingSpecification::<Customer, String, String>::new(
        Specification::new().filter_fn(|c: &Customer| c.active),
        |c| c.city.clone(),
    )
    .with_result(|c| c.name.clone());

    let groups = GroupingEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec, &CancelToken::new())
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key, "Derry");
    assert_eq!(groups[0].items, vec!["John"]);
    assert_eq!(groups[1].key, "Sligo");
    assert_eq!(groups[1].items, vec!["Jane", "John"]);
}

#[test]
fn grouping_without_result_selector_is_an_error() {
    let spec = GroupingSpecification::<Customer, String, String>::new(Specification::new(), |c| {
        c.city.clone()
    });

    let err = GroupingEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec, &CancelToken::new())
        .unwrap_err();

    assert_eq!(err, EvalError::GroupResultSelectorMissing);
}

#[test]
fn grouping_observes_cancellation() {
    let cancel = CancelToken::new();
    cancel.cancel();

    let spec = GroupingSpecification::identity(Specification::<Customer>::new(), |c| {
        c.city.clone()
    });

    let err = GroupingEvaluator::new()
        .evaluate(SequenceSource::new(customers()), &spec, &cancel)
        .unwrap_err();

    assert_eq!(err, EvalError::Cancelled);
}

// --- Tracing ---

struct RecordingSink(Mutex<Vec<EvalTraceEvent>>);

impl EvalTraceSink for RecordingSink {
    fn on_event(&self, event: EvalTraceEvent) {
        self.0.lock().unwrap().push(event);
    }
}

static SINK: RecordingSink = RecordingSink(Mutex::new(Vec::new()));

#[test]
fn trace_emits_every_phase_in_chain_order() {
    let spec = Specification::<Customer>::new().filter_fn(|c| c.active);

    let _ = SpecificationEvaluator::new()
        .with_trace(&SINK)
        .evaluate(SequenceSource::new(customers()), &spec)
        .unwrap();

    let events = SINK.0.lock().unwrap();
    assert_eq!(events[0], EvalTraceEvent::Start { evaluators: 6 });
    let phases: Vec<EvalPhase> = events
        .iter()
        .filter_map(|e| match e {
            EvalTraceEvent::Phase { phase } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            EvalPhase::Untracked,
            EvalPhase::Tracked,
            EvalPhase::Include,
            EvalPhase::Filter,
            EvalPhase::Order,
            EvalPhase::Page,
        ]
    );
    assert_eq!(*events.last().unwrap(), EvalTraceEvent::Finish);
}

// --- Post-processing ---

#[test]
fn post_processing_runs_after_materialization() {
    let spec = Specification::<Customer>::new()
        .filter_fn(|c| c.active)
        .post_process(|mut rows| {
            rows.reverse();
            rows
        });

    let rows = run(&spec);
    let processed = spec.apply_post_processing(rows);
    let ids: Vec<u32> = processed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}
