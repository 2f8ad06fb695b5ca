//! Property traits shared by graph elements.
//!
//! Selectors are written once against these traits and work for every
//! element kind that has the property. All lookups take the graph, since
//! elements only hold ids of their neighbours.

use super::{AccessTarget, CodeUnit, Graph, Member};

/// Elements with a name.
pub trait HasName {
    /// The element's name: fully qualified for units, declared name for members.
    fn name<'g>(&'g self, graph: &'g Graph) -> &'g str;
}

/// Elements that can carry annotations.
pub trait CanBeAnnotated {
    /// Whether the element carries `annotation`.
    ///
    /// For code units this also consults the nearest enclosing unit, so an
    /// annotation on an outer declaration covers its nested declarations.
    fn is_annotated_with(&self, graph: &Graph, annotation: &str) -> bool;
}

/// Elements owned by a code unit.
pub trait HasOwner {
    /// The owning unit.
    fn owner<'g>(&'g self, graph: &'g Graph) -> &'g CodeUnit;
}

/// Widens a reference to a supertype view.
///
/// Implemented for every element with a property, towards the property's
/// trait object, so `DescribedPredicate<dyn HasName>` can be applied to a
/// [`Member`] via [`for_subtype`](crate::DescribedPredicate::for_subtype).
pub trait Upcast<T: ?Sized> {
    /// Returns `self` as the wider type.
    fn upcast(&self) -> &T;
}

impl<U: HasName + 'static> Upcast<dyn HasName> for U {
    fn upcast(&self) -> &(dyn HasName + 'static) {
        self
    }
}

impl<U: CanBeAnnotated + 'static> Upcast<dyn CanBeAnnotated> for U {
    fn upcast(&self) -> &(dyn CanBeAnnotated + 'static) {
        self
    }
}

impl<U: HasOwner + 'static> Upcast<dyn HasOwner> for U {
    fn upcast(&self) -> &(dyn HasOwner + 'static) {
        self
    }
}

impl HasName for CodeUnit {
    fn name<'g>(&'g self, _graph: &'g Graph) -> &'g str {
        &self.name
    }
}

impl HasName for Member {
    fn name<'g>(&'g self, _graph: &'g Graph) -> &'g str {
        &self.name
    }
}

impl HasName for AccessTarget {
    fn name<'g>(&'g self, graph: &'g Graph) -> &'g str {
        match self {
            Self::Member(id) => graph.member(*id).name(),
            Self::Unit(id) => graph.unit(*id).name(),
        }
    }
}

impl CanBeAnnotated for CodeUnit {
    fn is_annotated_with(&self, graph: &Graph, annotation: &str) -> bool {
        self.has_annotation(annotation)
            || graph
                .enclosing(self)
                .is_some_and(|outer| outer.has_annotation(annotation))
    }
}

impl CanBeAnnotated for Member {
    fn is_annotated_with(&self, _graph: &Graph, annotation: &str) -> bool {
        self.has_annotation(annotation)
    }
}

impl CanBeAnnotated for AccessTarget {
    fn is_annotated_with(&self, graph: &Graph, annotation: &str) -> bool {
        match self {
            Self::Member(id) => graph.member(*id).is_annotated_with(graph, annotation),
            Self::Unit(id) => graph.unit(*id).is_annotated_with(graph, annotation),
        }
    }
}

impl HasOwner for Member {
    fn owner<'g>(&'g self, graph: &'g Graph) -> &'g CodeUnit {
        graph.unit(self.owner)
    }
}

impl HasOwner for AccessTarget {
    fn owner<'g>(&'g self, graph: &'g Graph) -> &'g CodeUnit {
        match self {
            Self::Member(id) => graph.unit(graph.member(*id).owner),
            Self::Unit(id) => graph.unit(*id),
        }
    }
}
