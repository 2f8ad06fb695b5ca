//! Described functions from one element kind to a related one.

use std::fmt;
use std::sync::Arc;

use super::DescribedPredicate;
use crate::graph::Graph;

type GetFn<F, R> = dyn for<'g> Fn(&'g Graph, &'g F) -> &'g R + Send + Sync;

/// Projects an element of type `F` onto a related element of type `R`,
/// e.g. an access onto its origin member, or a member onto its owner.
///
/// Projections are total over a well-linked graph.
pub struct Projection<F: ?Sized, R: ?Sized> {
    description: String,
    get: Arc<GetFn<F, R>>,
}

impl<F: ?Sized, R: ?Sized> Clone for Projection<F, R> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            get: Arc::clone(&self.get),
        }
    }
}

impl<F: ?Sized, R: ?Sized> fmt::Debug for Projection<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Projection").field(&self.description).finish()
    }
}

impl<F: ?Sized + 'static, R: ?Sized + 'static> Projection<F, R> {
    /// Creates a projection from a description and an accessor.
    pub fn new<G>(description: impl Into<String>, get: G) -> Self
    where
        G: for<'g> Fn(&'g Graph, &'g F) -> &'g R + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            get: Arc::new(get),
        }
    }

    /// Applies the projection.
    #[must_use]
    pub fn apply<'g>(&self, graph: &'g Graph, element: &'g F) -> &'g R {
        (self.get)(graph, element)
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Predicate on `F` that holds when the projected element satisfies `predicate`.
    ///
    /// Described as `<projection> is <predicate>`.
    #[must_use]
    pub fn is(&self, predicate: DescribedPredicate<R>) -> DescribedPredicate<F> {
        let description = format!("is {}", predicate.description());
        predicate
            .described_as(description)
            .on_result_of(self.clone())
    }

    /// Chains a second projection after this one, e.g. the owner of the origin.
    #[must_use]
    pub fn then<S>(self, next: Projection<R, S>) -> Projection<F, S>
    where
        S: ?Sized + 'static,
    {
        let description = format!("{} of {}", next.description, self.description);
        let (first, second) = (self.get, next.get);
        Projection::new(description, move |graph, element| {
            second(graph, first(graph, element))
        })
    }
}
