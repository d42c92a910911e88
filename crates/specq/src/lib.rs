//! Composable query specifications.
//!
//! ## Crate layout
//! - `core`: the engine: specification model, predicate algebra, composition
//!   parser and policies, evaluator pipeline, grouping evaluator.
//! - `error`: public error type with a stable kind + origin taxonomy.
//! - convenience helpers (`evaluate`, `evaluate_projected`, `count`,
//!   `exists`, `evaluate_grouped`) that run the pipeline against the
//!   in-memory sequence source.
//!
//! The `prelude` module mirrors the surface callers use day to day.

pub use specq_core as core;

pub mod error;
mod run;

pub use error::{Error, ErrorKind, ErrorOrigin};
pub use run::{count, evaluate, evaluate_grouped, evaluate_projected, exists};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind, ErrorOrigin, count, evaluate, evaluate_grouped, evaluate_projected,
        exists,
    };
    pub use specq_core::prelude::*;
}
