use specq_core::{compose::ComposeError, eval::EvalError};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Unbalanced groups, conflicting pagination bounds, or a projectable
    /// composition that lost its selector.
    Composition,
    /// A required selector was absent at evaluation time.
    Selector,
    /// Materialization was cancelled through the caller's token.
    Cancelled,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Compose,
    Evaluate,
}

impl From<ComposeError> for Error {
    fn from(err: ComposeError) -> Self {
        Self::new(ErrorKind::Composition, ErrorOrigin::Compose, err.to_string())
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        let kind = match err {
            EvalError::SelectorMissing | EvalError::GroupResultSelectorMissing => {
                ErrorKind::Selector
            }
            EvalError::Cancelled => ErrorKind::Cancelled,
        };

        Self::new(kind, ErrorOrigin::Evaluate, err.to_string())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_errors_map_to_composition_kind() {
        let err = Error::from(ComposeError::MissingSelector);
        assert_eq!(err.kind, ErrorKind::Composition);
        assert_eq!(err.origin, ErrorOrigin::Compose);
    }

    #[test]
    fn eval_errors_map_by_variant() {
        assert_eq!(Error::from(EvalError::SelectorMissing).kind, ErrorKind::Selector);
        assert_eq!(
            Error::from(EvalError::GroupResultSelectorMissing).kind,
            ErrorKind::Selector
        );
        assert_eq!(Error::from(EvalError::Cancelled).kind, ErrorKind::Cancelled);
    }
}
