///
/// IncludeKind
///
/// How an include clause attaches to the navigation chain. Resolved once at
/// construction; evaluation dispatches on the tag alone, so no run-time type
/// inspection is ever needed.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IncludeKind {
    /// First step of a chain: navigate from the entity itself.
    Root,
    /// Continue after a single-reference navigation.
    AfterReference,
    /// Continue after a collection navigation.
    AfterCollection,
}

///
/// IncludeClause
///
/// One navigation-path descriptor. Declared order is preserved and applied
/// verbatim by the include evaluator; the query source decides what the path
/// means (a translating provider loads the navigation, an in-memory source
/// records it).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncludeClause {
    pub(crate) path: String,
    pub(crate) kind: IncludeKind,
}

impl IncludeClause {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: IncludeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Root include for a navigation property.
    #[must_use]
    pub fn root(path: impl Into<String>) -> Self {
        Self::new(path, IncludeKind::Root)
    }

    /// Chained include continuing after a single reference.
    #[must_use]
    pub fn after_reference(path: impl Into<String>) -> Self {
        Self::new(path, IncludeKind::AfterReference)
    }

    /// Chained include continuing after a collection.
    #[must_use]
    pub fn after_collection(path: impl Into<String>) -> Self {
        Self::new(path, IncludeKind::AfterCollection)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> IncludeKind {
        self.kind
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_record_kind() {
        assert_eq!(IncludeClause::root("author").kind(), IncludeKind::Root);
        assert_eq!(
            IncludeClause::after_reference("address").kind(),
            IncludeKind::AfterReference
        );
        assert_eq!(
            IncludeClause::after_collection("lines").kind(),
            IncludeKind::AfterCollection
        );
    }

    #[test]
    fn path_is_preserved() {
        let clause = IncludeClause::root("orders");
        assert_eq!(clause.path(), "orders");
    }
}
