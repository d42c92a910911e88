use crate::spec::{SelectFn, Specification};
use std::{fmt, sync::Arc};

/// Shared grouping-key closure.
pub type GroupKeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

///
/// GroupingSpecification
///
/// A base specification plus a grouping key and a per-element result
/// projection. The key selector is required at construction, so a missing
/// key can never reach evaluation; a missing result selector is the defined
/// `GroupResultSelectorMissing` evaluation error.
///
/// The `identity` constructor covers the common "group the entities
/// themselves" case; identity is a construction-time fact here, not something
/// detected by inspecting a selector body.
///

pub struct GroupingSpecification<T, K, R = T> {
    pub(crate) base: Specification<T>,
    pub(crate) key_selector: GroupKeyFn<T, K>,
    pub(crate) result_selector: Option<SelectFn<T, R>>,
}

impl<T, K> GroupingSpecification<T, K, T>
where
    T: Clone + 'static,
{
    /// Group with the entities themselves as group members.
    #[must_use]
    pub fn identity(base: Specification<T>, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        Self {
            base,
            key_selector: Arc::new(key),
            result_selector: Some(Arc::new(T::clone)),
        }
    }
}

impl<T, K, R> GroupingSpecification<T, K, R> {
    /// Group by `key`; the per-element result selector must be supplied via
    /// [`with_result`](Self::with_result) before evaluation.
    #[must_use]
    pub fn new(base: Specification<T>, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        Self {
            base,
            key_selector: Arc::new(key),
            result_selector: None,
        }
    }

    /// Set the per-element result projection.
    #[must_use]
    pub fn with_result(mut self, f: impl Fn(&T) -> R + Send + Sync + 'static) -> Self {
        self.result_selector = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub const fn base(&self) -> &Specification<T> {
        &self.base
    }

    /// Grouping key for one entity.
    #[must_use]
    pub fn key_of(&self, item: &T) -> K {
        (self.key_selector.as_ref())(item)
    }

    #[must_use]
    pub const fn result_selector(&self) -> Option<&SelectFn<T, R>> {
        self.result_selector.as_ref()
    }
}

impl<T, K, R> Clone for GroupingSpecification<T, K, R> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            key_selector: Arc::clone(&self.key_selector),
            result_selector: self.result_selector.as_ref().map(Arc::clone),
        }
    }
}

impl<T, K, R> fmt::Debug for GroupingSpecification<T, K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupingSpecification")
            .field("base", &self.base)
            .field("has_result_selector", &self.result_selector.is_some())
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Customer;

    #[test]
    fn identity_constructor_supplies_result_selector() {
        let spec =
            GroupingSpecification::identity(Specification::new(), |c: &Customer| c.city.clone());

        assert!(spec.result_selector().is_some());

        let customer = Customer::new(1, "John", true, 40, "Derry");
        assert_eq!(spec.key_of(&customer), "Derry");
    }

    #[test]
    fn explicit_result_selector_projects() {
        let spec = GroupingSpecification::<Customer, String, usize>::new(
            Specification::new(),
            |c| c.city.clone(),
        )
        .with_result(|c| c.name.len());

        let f = spec.result_selector().expect("selector set");
        let customer = Customer::new(1, "John", true, 40, "Derry");
        assert_eq!((f.as_ref())(&customer), 4);
    }

    #[test]
    fn result_selector_starts_unset() {
        let spec = GroupingSpecification::<Customer, u32, String>::new(
            Specification::new(),
            |c| c.age,
        );
        assert!(spec.result_selector().is_none());
    }
}
