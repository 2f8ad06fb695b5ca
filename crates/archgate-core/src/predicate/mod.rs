//! Composable, described boolean tests over graph elements.
//!
//! A [`Predicate`] is anything that can test an element and describe itself.
//! [`DescribedPredicate`] is the shared, cheaply clonable carrier used by
//! every selector and rule. Combinators wrap their operands and forward to
//! them, composing descriptions with a connector word:
//!
//! ```
//! use archgate_core::selectors::{annotated_with, name};
//! use archgate_core::{CodeUnit, DescribedPredicate};
//!
//! let named = name::<CodeUnit>("com.example.Service").unwrap();
//! let marked = annotated_with::<CodeUnit>("com.example.Internal").unwrap();
//! let rule: DescribedPredicate<CodeUnit> = named.and(marked.not());
//! assert_eq!(
//!     rule.description(),
//!     "name 'com.example.Service' and not (annotated with @com.example.Internal)"
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use crate::graph::{Graph, Upcast};

mod projection;

pub use projection::Projection;

/// A described boolean test over elements of type `T`.
///
/// Implementations must be pure: the result may depend only on the element,
/// the graph it lives in, and constant configuration captured at construction.
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// Tests one element.
    fn test(&self, graph: &Graph, element: &T) -> bool;

    /// Human-readable description used in rule texts and violation reports.
    fn description(&self) -> &str;
}

type TestFn<T> = dyn Fn(&Graph, &T) -> bool + Send + Sync;

/// A predicate with a description, composable with `and`, `or`, and `not`.
pub struct DescribedPredicate<T: ?Sized> {
    description: String,
    test: Arc<TestFn<T>>,
}

impl<T: ?Sized> Clone for DescribedPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: ?Sized> fmt::Debug for DescribedPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DescribedPredicate")
            .field(&self.description)
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for DescribedPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

impl<T: ?Sized + 'static> DescribedPredicate<T> {
    /// Creates a predicate from a description and a test function.
    pub fn new<F>(description: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Graph, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    /// Wraps any [`Predicate`] implementation.
    pub fn from_predicate<P>(predicate: P) -> Self
    where
        P: Predicate<T> + 'static,
    {
        let description = predicate.description().to_string();
        Self::new(description, move |graph, element| {
            predicate.test(graph, element)
        })
    }

    /// Tests one element.
    #[must_use]
    pub fn test(&self, graph: &Graph, element: &T) -> bool {
        (self.test)(graph, element)
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// True iff both predicates are true. Described as `p and q`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let (left, right) = (self.test, other.test);
        Self::new(
            format!("{} and {}", self.description, other.description),
            move |graph, element| left(graph, element) && right(graph, element),
        )
    }

    /// True iff either predicate is true. Described as `p or q`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let (left, right) = (self.test, other.test);
        Self::new(
            format!("{} or {}", self.description, other.description),
            move |graph, element| left(graph, element) || right(graph, element),
        )
    }

    /// Negation. Described as `not (p)`.
    #[must_use]
    pub fn not(self) -> Self {
        let inner = self.test;
        Self::new(
            format!("not ({})", self.description),
            move |graph, element| !inner(graph, element),
        )
    }

    /// Replaces the description, keeping the test.
    #[must_use]
    pub fn described_as(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            test: self.test,
        }
    }

    /// Applies this predicate wherever a narrower element type is expected.
    ///
    /// The test is identical; only the accepted element type changes.
    #[must_use]
    pub fn for_subtype<U>(self) -> DescribedPredicate<U>
    where
        U: Upcast<T> + ?Sized + 'static,
    {
        let inner = self.test;
        DescribedPredicate::new(self.description, move |graph, element: &U| {
            inner(graph, element.upcast())
        })
    }

    /// Tests the result of a projection instead of the element itself.
    ///
    /// Described as `<projection> <predicate>`, e.g. `owner annotated with @X`.
    #[must_use]
    pub fn on_result_of<F>(self, projection: Projection<F, T>) -> DescribedPredicate<F>
    where
        F: ?Sized + 'static,
    {
        let inner = self.test;
        DescribedPredicate::new(
            format!("{} {}", projection.description(), self.description),
            move |graph, element: &F| inner(graph, projection.apply(graph, element)),
        )
    }
}

impl<T: ?Sized + 'static> Predicate<T> for DescribedPredicate<T> {
    fn test(&self, graph: &Graph, element: &T) -> bool {
        (self.test)(graph, element)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// `p and q`.
#[must_use]
pub fn and<T: ?Sized + 'static>(
    p: DescribedPredicate<T>,
    q: DescribedPredicate<T>,
) -> DescribedPredicate<T> {
    p.and(q)
}

/// `p or q`.
#[must_use]
pub fn or<T: ?Sized + 'static>(
    p: DescribedPredicate<T>,
    q: DescribedPredicate<T>,
) -> DescribedPredicate<T> {
    p.or(q)
}

/// `not (p)`.
#[must_use]
pub fn not<T: ?Sized + 'static>(p: DescribedPredicate<T>) -> DescribedPredicate<T> {
    p.not()
}

/// Accepts every element.
#[must_use]
pub fn always_true<T: ?Sized + 'static>() -> DescribedPredicate<T> {
    DescribedPredicate::new("always true", |_, _| true)
}

/// Rejects every element.
#[must_use]
pub fn always_false<T: ?Sized + 'static>() -> DescribedPredicate<T> {
    DescribedPredicate::new("always false", |_, _| false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CodeUnit, HasName, UnitDecl};

    fn graph() -> Graph {
        Graph::builder()
            .unit(UnitDecl::new("a.Alpha"))
            .unit(UnitDecl::new("a.Beta"))
            .unit(UnitDecl::new("b.Gamma"))
            .build()
            .unwrap()
    }

    fn in_package_a() -> DescribedPredicate<CodeUnit> {
        DescribedPredicate::new("in package a", |_, unit: &CodeUnit| unit.package() == "a")
    }

    fn ends_with_a() -> DescribedPredicate<CodeUnit> {
        DescribedPredicate::new("ending in a", |_, unit: &CodeUnit| unit.name().ends_with('a'))
    }

    #[test]
    fn combinators_compose_descriptions() {
        assert_eq!(
            in_package_a().and(ends_with_a()).description(),
            "in package a and ending in a"
        );
        assert_eq!(
            in_package_a().or(ends_with_a()).description(),
            "in package a or ending in a"
        );
        assert_eq!(in_package_a().not().description(), "not (in package a)");
    }

    #[test]
    fn combinators_evaluate() {
        let graph = graph();
        let alpha = graph.unit_named("a.Alpha").unwrap();
        let beta = graph.unit_named("a.Beta").unwrap();
        let gamma = graph.unit_named("b.Gamma").unwrap();

        let both = and(in_package_a(), ends_with_a());
        assert!(both.test(&graph, alpha));
        assert!(both.test(&graph, beta));
        assert!(!both.test(&graph, gamma));

        let either = or(in_package_a(), ends_with_a());
        assert!(either.test(&graph, gamma));

        assert!(!not(in_package_a()).test(&graph, alpha));
    }

    #[test]
    fn boolean_algebra_holds_for_every_unit() {
        let graph = graph();
        let p = in_package_a();
        let double_negation = p.clone().not().not();
        let and_true = p.clone().and(always_true());
        let or_false = p.clone().or(always_false());

        for unit in graph.units() {
            let expected = p.test(&graph, unit);
            assert_eq!(double_negation.test(&graph, unit), expected);
            assert_eq!(and_true.test(&graph, unit), expected);
            assert_eq!(or_false.test(&graph, unit), expected);
        }
    }

    #[test]
    fn described_as_keeps_test() {
        let graph = graph();
        let renamed = in_package_a().described_as("core types");
        assert_eq!(renamed.description(), "core types");
        assert!(renamed.test(&graph, graph.unit_named("a.Alpha").unwrap()));
    }

    #[test]
    fn for_subtype_applies_identical_test() {
        let graph = graph();
        let wide = DescribedPredicate::<dyn HasName>::new("long name", |graph, element| {
            element.name(graph).len() > 6
        });
        let narrow: DescribedPredicate<CodeUnit> = wide.clone().for_subtype();

        assert_eq!(narrow.description(), "long name");
        for unit in graph.units() {
            assert_eq!(narrow.test(&graph, unit), wide.test(&graph, unit));
        }
    }

    struct NameLength(usize);

    impl Predicate<CodeUnit> for NameLength {
        fn test(&self, _graph: &Graph, element: &CodeUnit) -> bool {
            element.name().len() == self.0
        }

        fn description(&self) -> &str {
            "name of fixed length"
        }
    }

    #[test]
    fn wraps_custom_predicates() {
        let graph = graph();
        let wrapped = DescribedPredicate::from_predicate(NameLength(7)).and(in_package_a());
        assert_eq!(wrapped.description(), "name of fixed length and in package a");
        assert!(wrapped.test(&graph, graph.unit_named("a.Alpha").unwrap()));
        assert!(!wrapped.test(&graph, graph.unit_named("b.Gamma").unwrap()));
    }
}
