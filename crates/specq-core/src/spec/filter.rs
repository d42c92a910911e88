use std::{
    fmt,
    ops::{BitAnd, BitOr, Not},
    sync::Arc,
};

/// Shared predicate closure bound to a single entity parameter.
pub type PredicateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

///
/// FilterExpr
///
/// Represents logical expressions for filtering entities of type `T`.
///
/// Expressions can be:
/// - `True` or `False` constants
/// - Single leaves wrapping a bound predicate closure
/// - Composite expressions: `And`, `Or`, and negation `Not`.
///

pub enum FilterExpr<T> {
    True,
    False,
    Leaf(PredicateFn<T>),
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
}

impl<T> FilterExpr<T> {
    /// Create a single leaf wrapping the given predicate.
    pub fn pred(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::Leaf(Arc::new(f))
    }

    /// Evaluate this expression against one entity.
    ///
    /// An empty `And` is vacuously true; an empty `Or` is vacuously false.
    pub fn eval(&self, item: &T) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Leaf(f) => (f.as_ref())(item),
            Self::And(children) => children.iter().all(|c| c.eval(item)),
            Self::Or(children) => children.iter().any(|c| c.eval(item)),
            Self::Not(inner) => !inner.eval(item),
        }
    }

    /// Combine two expressions into an `And` expression.
    ///
    /// This flattens nested `And`s to avoid deep nesting (e.g., `(a AND b) AND c` becomes `AND[a,b,c]`).
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut a), Self::And(mut b)) => {
                a.append(&mut b);
                Self::And(a)
            }
            (Self::And(mut a), b) => {
                a.push(b);
                Self::And(a)
            }
            (a, Self::And(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::And(list)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    #[must_use]
    pub fn and_option(self, other: Option<Self>) -> Self {
        match other {
            Some(f) => self.and(f),
            None => self,
        }
    }

    /// Negate this expression.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Combine two expressions into an `Or` expression,
    /// flattening nested `Or`s similarly to `and`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut a), Self::Or(mut b)) => {
                a.append(&mut b);
                Self::Or(a)
            }
            (Self::Or(mut a), b) => {
                a.push(b);
                Self::Or(a)
            }
            (a, Self::Or(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::Or(list)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    #[must_use]
    pub fn or_option(self, other: Option<Self>) -> Self {
        match other {
            Some(f) => self.or(f),
            None => self,
        }
    }

    /// Simplifies the logical expression recursively, applying rules like:
    /// - Eliminate double negation `NOT NOT x` -> `x`
    /// - Apply De Morgan's laws:
    ///   - `NOT (AND [a, b])` -> `OR [NOT a, NOT b]`
    ///   - `NOT (OR [a, b])` -> `AND [NOT a, NOT b]`
    /// - Flatten nested `And` and `Or` expressions
    /// - Remove neutral elements:
    ///   - `AND [True, x]` -> `x`
    ///   - `OR [False, x]` -> `x`
    /// - Short circuit on constants:
    ///   - `AND` with `False` -> `False`
    ///   - `OR` with `True` -> `True`
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Self::Not(inner) => match *inner {
                Self::True => Self::False,
                Self::False => Self::True,
                Self::Not(inner2) => (*inner2).simplify(),
                Self::And(children) => {
                    // De Morgan's: NOT(AND(...)) == OR(NOT(...))
                    Self::Or(children.into_iter().map(|c| c.not().simplify()).collect())
                }
                Self::Or(children) => {
                    // De Morgan's: NOT(OR(...)) == AND(NOT(...))
                    Self::And(children.into_iter().map(|c| c.not().simplify()).collect())
                }
                x @ Self::Leaf(_) => Self::Not(Box::new(x)),
            },

            Self::And(children) => {
                // Recursively simplify and flatten `And` children
                let flat = Self::simplify_children(children, |e| matches!(e, Self::And(_)));

                // If any child is `False`, whole AND is False (short circuit)
                if flat.iter().any(|e| matches!(e, Self::False)) {
                    Self::False
                } else {
                    // Remove neutral elements `True`
                    let mut filtered: Vec<_> = flat
                        .into_iter()
                        .filter(|e| !matches!(e, Self::True))
                        .collect();

                    // If empty after filtering, all were True -> return True
                    match filtered.len() {
                        0 => Self::True,
                        1 => filtered.remove(0),
                        _ => Self::And(filtered),
                    }
                }
            }

            Self::Or(children) => {
                // Recursively simplify and flatten `Or` children
                let flat = Self::simplify_children(children, |e| matches!(e, Self::Or(_)));

                // If any child is `True`, whole OR is True (short circuit)
                if flat.iter().any(|e| matches!(e, Self::True)) {
                    Self::True
                } else {
                    // Remove neutral elements `False`
                    let mut filtered: Vec<_> = flat
                        .into_iter()
                        .filter(|e| !matches!(e, Self::False))
                        .collect();

                    // If empty after filtering, all were False -> return False
                    match filtered.len() {
                        0 => Self::False,
                        1 => filtered.remove(0),
                        _ => Self::Or(filtered),
                    }
                }
            }

            // Leaves and constants are already simplest forms
            x => x,
        }
    }

    /// Helper to simplify and flatten nested `And` or `Or` children.
    ///
    /// - `children`: the children expressions to simplify and flatten
    /// - `flatten_if`: a predicate to decide if the child should be flattened
    fn simplify_children(children: Vec<Self>, flatten_if: fn(&Self) -> bool) -> Vec<Self> {
        let mut flat = Vec::with_capacity(children.len());

        for child in children {
            let simplified = child.simplify();
            if flatten_if(&simplified) {
                if let Self::And(nested) | Self::Or(nested) = simplified {
                    flat.extend(nested);
                }
            } else {
                flat.push(simplified);
            }
        }

        flat
    }
}

// Manual impl: the derive would constrain `T: Default`, which leaves never need.
impl<T> Default for FilterExpr<T> {
    fn default() -> Self {
        Self::True
    }
}

impl<T> Clone for FilterExpr<T> {
    fn clone(&self) -> Self {
        match self {
            Self::True => Self::True,
            Self::False => Self::False,
            Self::Leaf(f) => Self::Leaf(Arc::clone(f)),
            Self::And(children) => Self::And(children.clone()),
            Self::Or(children) => Self::Or(children.clone()),
            Self::Not(inner) => Self::Not(inner.clone()),
        }
    }
}

// Leaves are opaque closures, so Debug prints structure only.
impl<T> fmt::Debug for FilterExpr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Leaf(_) => write!(f, "Leaf(..)"),
            Self::And(children) => f.debug_tuple("And").field(children).finish(),
            Self::Or(children) => f.debug_tuple("Or").field(children).finish(),
            Self::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
        }
    }
}

///
/// Bit Operations
/// allow us to do | and & and ! on expressions
///

impl<T> BitAnd for FilterExpr<T> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<T> BitOr for FilterExpr<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<T> Not for FilterExpr<T> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn gt(threshold: i64) -> FilterExpr<i64> {
        FilterExpr::pred(move |n: &i64| *n > threshold)
    }

    fn even() -> FilterExpr<i64> {
        FilterExpr::pred(|n: &i64| n % 2 == 0)
    }

    #[test]
    fn leaf_evaluates_closure() {
        let expr = gt(10);
        assert!(expr.eval(&11));
        assert!(!expr.eval(&10));
    }

    #[test]
    fn constants_evaluate() {
        assert!(FilterExpr::<i64>::True.eval(&0));
        assert!(!FilterExpr::<i64>::False.eval(&0));
    }

    #[test]
    fn and_requires_both() {
        let expr = gt(10).and(even());
        assert!(expr.eval(&12));
        assert!(!expr.eval(&11));
        assert!(!expr.eval(&8));
    }

    #[test]
    fn or_requires_either() {
        let expr = gt(10).or(even());
        assert!(expr.eval(&11));
        assert!(expr.eval(&2));
        assert!(!expr.eval(&3));
    }

    #[test]
    fn not_inverts() {
        let expr = gt(10).not();
        assert!(expr.eval(&5));
        assert!(!expr.eval(&11));
    }

    #[test]
    fn and_flattening_via_ops() {
        let expr = (gt(1) & (gt(2) & gt(3))) & gt(4);
        match expr {
            FilterExpr::And(children) => assert_eq!(children.len(), 4),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn or_flattening_via_ops() {
        let expr = (gt(1) | (gt(2) | gt(3))) | gt(4);
        match expr {
            FilterExpr::Or(children) => assert_eq!(children.len(), 4),
            _ => panic!("expected Or"),
        }
    }

    #[test]
    fn ops_bitor_bitand_not() {
        let expr = (gt(1) & even()) | !gt(100);
        match expr {
            FilterExpr::Or(children) => {
                assert_eq!(children.len(), 2);
                match &children[0] {
                    FilterExpr::And(left) => assert_eq!(left.len(), 2),
                    _ => panic!("left should be And"),
                }
                assert!(matches!(&children[1], FilterExpr::Not(_)));
            }
            _ => panic!("expected Or at root"),
        }
    }

    #[test]
    fn and_option_includes_when_some() {
        let out = gt(1).and_option(Some(even()));
        match out {
            FilterExpr::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn and_option_skips_when_none() {
        let out = gt(1).and_option(None);
        assert!(matches!(out, FilterExpr::Leaf(_)));
    }

    #[test]
    fn or_option_includes_when_some() {
        let out = gt(1).or_option(Some(even()));
        match out {
            FilterExpr::Or(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected Or"),
        }
    }

    #[test]
    fn or_option_skips_when_none() {
        let out = gt(1).or_option(None);
        assert!(matches!(out, FilterExpr::Leaf(_)));
    }

    #[test]
    fn simplify_and_true() {
        let expr = FilterExpr::And(vec![FilterExpr::True, gt(1)]);
        assert!(matches!(expr.simplify(), FilterExpr::Leaf(_)));
    }

    #[test]
    fn simplify_and_false() {
        let expr = FilterExpr::And(vec![gt(1), FilterExpr::False]);
        assert!(matches!(expr.simplify(), FilterExpr::False));
    }

    #[test]
    fn simplify_or_true_short_circuits() {
        let expr = FilterExpr::Or(vec![gt(1), FilterExpr::True]);
        assert!(matches!(expr.simplify(), FilterExpr::True));
    }

    #[test]
    fn double_negation() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::Not(Box::new(gt(1)))));
        assert!(matches!(expr.simplify(), FilterExpr::Leaf(_)));
    }

    #[test]
    fn demorgan_not_and() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::And(vec![gt(1), gt(2)])));
        match expr.simplify() {
            FilterExpr::Or(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected Or"),
        }
    }

    #[test]
    fn demorgan_not_or() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::Or(vec![gt(1), gt(2)])));
        match expr.simplify() {
            FilterExpr::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn nested_and_flatten() {
        let expr = FilterExpr::And(vec![gt(1), FilterExpr::And(vec![gt(2), gt(3)])]);
        match expr.simplify() {
            FilterExpr::And(children) => assert_eq!(children.len(), 3),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn not_true_false_rules() {
        assert!(matches!(
            FilterExpr::<i64>::Not(Box::new(FilterExpr::True)).simplify(),
            FilterExpr::False
        ));
        assert!(matches!(
            FilterExpr::<i64>::Not(Box::new(FilterExpr::False)).simplify(),
            FilterExpr::True
        ));
    }

    #[test]
    fn simplify_preserves_meaning() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::And(vec![
            FilterExpr::Or(vec![gt(5), FilterExpr::False]),
            even(),
        ])));
        let simplified = expr.clone().simplify();

        for n in -20_i64..20 {
            assert_eq!(expr.eval(&n), simplified.eval(&n), "diverged at {n}");
        }
    }
}
