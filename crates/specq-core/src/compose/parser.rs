use crate::{
    compose::{ChainKind, ComposeError, merge, policy::ComposePolicies},
    spec::Specification,
};
use derive_more::{Deref, DerefMut};
use std::fmt;

///
/// CompositionOp
///
/// One tagged operation in a composition sequence. Emitted in order by a
/// builder, consumed once by the parser.
///

pub enum CompositionOp<T, R = T> {
    /// AND the specification onto the running composition.
    And(Specification<T, R>),
    /// OR the specification onto the running composition.
    Or(Specification<T, R>),
    /// Open a nested group whose first operand is the specification; the
    /// chain kind records how the group as a whole attaches to what precedes
    /// it.
    GroupOpen(Specification<T, R>, ChainKind),
    /// Close the most recently opened group.
    GroupClose,
}

impl<T, R> fmt::Debug for CompositionOp<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(spec) => f.debug_tuple("And").field(spec).finish(),
            Self::Or(spec) => f.debug_tuple("Or").field(spec).finish(),
            Self::GroupOpen(spec, chain) => {
                f.debug_tuple("GroupOpen").field(spec).field(chain).finish()
            }
            Self::GroupClose => write!(f, "GroupClose"),
        }
    }
}

///
/// CompositionOps
///
/// Append-only operation sequence with builder-style emitters. Purely
/// declarative; group balance and order are checked by `compose`.
///

#[derive(Debug, Deref, DerefMut)]
pub struct CompositionOps<T, R = T>(Vec<CompositionOp<T, R>>);

impl<T, R> CompositionOps<T, R> {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an AND operand.
    #[must_use]
    pub fn and(mut self, spec: Specification<T, R>) -> Self {
        self.0.push(CompositionOp::And(spec));
        self
    }

    /// Append an OR operand.
    #[must_use]
    pub fn or(mut self, spec: Specification<T, R>) -> Self {
        self.0.push(CompositionOp::Or(spec));
        self
    }

    /// Open a group chained onto the preceding operations with `chain`.
    #[must_use]
    pub fn open_group(mut self, chain: ChainKind, spec: Specification<T, R>) -> Self {
        self.0.push(CompositionOp::GroupOpen(spec, chain));
        self
    }

    /// Open a group that ANDs onto what precedes it.
    #[must_use]
    pub fn and_group(self, spec: Specification<T, R>) -> Self {
        self.open_group(ChainKind::And, spec)
    }

    /// Open a group that ORs onto what precedes it.
    #[must_use]
    pub fn or_group(self, spec: Specification<T, R>) -> Self {
        self.open_group(ChainKind::Or, spec)
    }

    /// Close the most recently opened group.
    #[must_use]
    pub fn close_group(mut self) -> Self {
        self.0.push(CompositionOp::GroupClose);
        self
    }

    /// Reduce the sequence to a single specification.
    pub fn compose(self, policies: &ComposePolicies) -> Result<Specification<T, R>, ComposeError> {
        compose(self.0, policies)
    }

    /// Reduce the sequence to a single projectable specification, verifying
    /// that a selector survived composition.
    pub fn compose_projectable(
        self,
        policies: &ComposePolicies,
    ) -> Result<Specification<T, R>, ComposeError> {
        compose_projectable(self.0, policies)
    }
}

impl<T, R> Default for CompositionOps<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce an ordered operation sequence to one specification.
///
/// Groups collapse via stack reduction: on a close, operations back to the
/// matching open are folded into one sub-specification and re-pushed tagged
/// with the group's own chain kind, so it participates in the outer
/// composition exactly like any leaf operand. An empty sequence yields the
/// empty (always-true, unordered) specification; a single operand is
/// returned unchanged.
pub fn compose<T, R>(
    ops: Vec<CompositionOp<T, R>>,
    policies: &ComposePolicies,
) -> Result<Specification<T, R>, ComposeError> {
    validate_balance(&ops)?;

    let mut stack: Vec<CompositionOp<T, R>> = Vec::new();
    for op in ops {
        match op {
            CompositionOp::GroupClose => {
                let mut grouped: Vec<CompositionOp<T, R>> = Vec::new();
                let (seed, chain) = loop {
                    match stack.pop() {
                        Some(CompositionOp::GroupOpen(spec, chain)) => break (spec, chain),
                        Some(other) => grouped.push(other),
                        None => return Err(ComposeError::UnmatchedGroupClose),
                    }
                };
                grouped.reverse();

                let folded = fold(seed, grouped, policies)?;
                stack.push(match chain {
                    ChainKind::And => CompositionOp::And(folded),
                    ChainKind::Or => CompositionOp::Or(folded),
                });
            }
            other => stack.push(other),
        }
    }

    // The stack was only ever pushed in scan order, so it already reads
    // left to right.
    let mut remaining = stack.into_iter();
    let Some(first) = remaining.next() else {
        return Ok(Specification::new());
    };
    let seed = match first {
        CompositionOp::And(spec) | CompositionOp::Or(spec) => spec,
        CompositionOp::GroupOpen(spec, _) => spec,
        CompositionOp::GroupClose => return Err(ComposeError::UnmatchedGroupClose),
    };

    fold(seed, remaining.collect(), policies)
}

/// Compose, then verify the result carries a projection selector.
pub fn compose_projectable<T, R>(
    ops: Vec<CompositionOp<T, R>>,
    policies: &ComposePolicies,
) -> Result<Specification<T, R>, ComposeError> {
    let spec = compose(ops, policies)?;
    if spec.selector().is_none() {
        return Err(ComposeError::MissingSelector);
    }
    Ok(spec)
}

/// Left-to-right fold: combine the running result with each operand per its
/// tag. Balance is validated before folding, so group markers cannot appear
/// here except through caller misuse, which surfaces as an error rather than
/// a dropped clause.
fn fold<T, R>(
    seed: Specification<T, R>,
    ops: Vec<CompositionOp<T, R>>,
    policies: &ComposePolicies,
) -> Result<Specification<T, R>, ComposeError> {
    let mut acc = seed;
    for op in ops {
        acc = match op {
            CompositionOp::And(spec) | CompositionOp::GroupOpen(spec, ChainKind::And) => {
                merge::compose_pair(&acc, &spec, ChainKind::And, policies)?
            }
            CompositionOp::Or(spec) | CompositionOp::GroupOpen(spec, ChainKind::Or) => {
                merge::compose_pair(&acc, &spec, ChainKind::Or, policies)?
            }
            CompositionOp::GroupClose => return Err(ComposeError::UnmatchedGroupClose),
        };
    }
    Ok(acc)
}

fn validate_balance<T, R>(ops: &[CompositionOp<T, R>]) -> Result<(), ComposeError> {
    let open = ops
        .iter()
        .filter(|op| matches!(op, CompositionOp::GroupOpen(..)))
        .count();
    let close = ops
        .iter()
        .filter(|op| matches!(op, CompositionOp::GroupClose))
        .count();

    if open == close {
        Ok(())
    } else {
        Err(ComposeError::UnbalancedGroups { open, close })
    }
}
