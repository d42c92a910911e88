//! Evaluation tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect
//! evaluation semantics.

///
/// EvalTraceSink
///

pub trait EvalTraceSink: Send + Sync {
    fn on_event(&self, event: EvalTraceEvent);
}

///
/// EvalPhase
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EvalPhase {
    Untracked,
    Tracked,
    Include,
    Filter,
    Order,
    Page,
    Project,
    Group,
}

///
/// EvalTraceEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EvalTraceEvent {
    Start { evaluators: usize },
    Phase { phase: EvalPhase },
    Finish,
}
