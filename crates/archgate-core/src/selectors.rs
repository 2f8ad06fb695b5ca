//! Named predicate constructors and projections over graph elements.
//!
//! Selectors are generic over the property traits ([`HasName`], [`CanBeAnnotated`]), so
//! `name` works for units, members and access targets alike. Constructors
//! that take a required parameter validate it eagerly and return
//! [`ConfigError`] instead of deferring the failure to evaluation.

use crate::error::ConfigError;
use crate::graph::{Access, AccessKind, AccessTarget, CanBeAnnotated, CodeUnit, HasName, Member};
use crate::package::PackageIdentifier;
use crate::predicate::DescribedPredicate;

// ────────────────────────────────────────────────────────────────────────────
// Element selectors
// ────────────────────────────────────────────────────────────────────────────

/// Exact match on the element's declared name.
///
/// # Errors
///
/// Returns [`ConfigError::MissingParameter`] if `name` is empty.
pub fn name<T>(name: impl Into<String>) -> Result<DescribedPredicate<T>, ConfigError>
where
    T: HasName + ?Sized + 'static,
{
    let expected = required(name.into(), "name")?;
    Ok(DescribedPredicate::<T>::new(
        format!("name '{expected}'"),
        move |graph, element| element.name(graph) == expected,
    ))
}

/// Units denoting the same logical type as `reference`, a fully qualified name.
///
/// # Errors
///
/// Returns [`ConfigError::MissingParameter`] if `reference` is empty.
pub fn equivalent_to(reference: impl Into<String>) -> Result<DescribedPredicate<CodeUnit>, ConfigError> {
    let reference = required(reference.into(), "type")?;
    Ok(DescribedPredicate::<CodeUnit>::new(
        format!("equivalent to {reference}"),
        move |_, unit| unit.name() == reference,
    ))
}

/// Elements carrying `annotation`; code units also inherit it from their nearest enclosing unit.
///
/// # Errors
///
/// Returns [`ConfigError::MissingParameter`] if `annotation` is empty.
pub fn annotated_with<T>(annotation: impl Into<String>) -> Result<DescribedPredicate<T>, ConfigError>
where
    T: CanBeAnnotated + ?Sized + 'static,
{
    let annotation = required(annotation.into(), "annotation")?;
    Ok(DescribedPredicate::<T>::new(
        format!("annotated with @{annotation}"),
        move |graph, element| element.is_annotated_with(graph, &annotation),
    ))
}

/// Units whose package matches at least one of the identifiers.
///
/// # Errors
///
/// Returns [`ConfigError`] if the list is empty or an identifier is malformed.
pub fn resides_in_any_package<S: AsRef<str>>(
    identifiers: &[S],
) -> Result<DescribedPredicate<CodeUnit>, ConfigError> {
    let packages = parse_identifiers(identifiers)?;
    let description = format!("reside in any package [{}]", quoted(&packages));
    Ok(DescribedPredicate::<CodeUnit>::new(description, move |_, unit| {
        packages.iter().any(|p| p.matches(unit.package()))
    }))
}

/// Units whose package matches none of the identifiers.
///
/// # Errors
///
/// Returns [`ConfigError`] if the list is empty or an identifier is malformed.
pub fn resides_outside_of_packages<S: AsRef<str>>(
    identifiers: &[S],
) -> Result<DescribedPredicate<CodeUnit>, ConfigError> {
    let packages = parse_identifiers(identifiers)?;
    let description = format!("reside outside of packages [{}]", quoted(&packages));
    Ok(DescribedPredicate::<CodeUnit>::new(description, move |_, unit| {
        !packages.iter().any(|p| p.matches(unit.package()))
    }))
}

/// Accesses of one kind.
#[must_use]
pub fn kind(kind: AccessKind) -> DescribedPredicate<Access> {
    DescribedPredicate::<Access>::new(format!("origin {kind} target"), move |_, access| {
        access.kind() == kind
    })
}

/// Accesses whose target could be resolved against the snapshot.
#[must_use]
pub fn complete() -> DescribedPredicate<Access> {
    DescribedPredicate::<Access>::new("complete", |_, access| access.is_complete())
}

// ────────────────────────────────────────────────────────────────────────────
// Access projections
// ────────────────────────────────────────────────────────────────────────────

/// Applies a member predicate to the origin of an access.
#[must_use]
pub fn origin(predicate: DescribedPredicate<Member>) -> DescribedPredicate<Access> {
    predicate.on_result_of(get::origin())
}

/// Applies a target predicate to the target of an access.
#[must_use]
pub fn target(predicate: DescribedPredicate<AccessTarget>) -> DescribedPredicate<Access> {
    predicate.on_result_of(get::target())
}

/// Applies a unit predicate to the owner of an owned element, e.g. `owner is name 'X'`.
#[must_use]
pub fn with_owner<T>(predicate: DescribedPredicate<CodeUnit>) -> DescribedPredicate<T>
where
    T: crate::graph::HasOwner + ?Sized + 'static,
{
    get::owner::<T>().is(predicate)
}

/// Prefixes the description with `is`, e.g. `is annotated with @X`.
#[must_use]
pub fn is<T: ?Sized + 'static>(predicate: DescribedPredicate<T>) -> DescribedPredicate<T> {
    let description = format!("is {}", predicate.description());
    predicate.described_as(description)
}

/// Prefixes the description with `has`, e.g. `has name 'X'`.
#[must_use]
pub fn has<T: ?Sized + 'static>(predicate: DescribedPredicate<T>) -> DescribedPredicate<T> {
    let description = format!("has {}", predicate.description());
    predicate.described_as(description)
}

/// Projections between related graph elements.
pub mod get {
    use crate::graph::{Access, AccessTarget, CodeUnit, HasOwner, Member};
    use crate::predicate::Projection;

    /// The member performing an access.
    #[must_use]
    pub fn origin() -> Projection<Access, Member> {
        Projection::<Access, Member>::new("origin", |graph, access| graph.origin(access))
    }

    /// The member or unit an access points at.
    #[must_use]
    pub fn target() -> Projection<Access, AccessTarget> {
        Projection::<Access, AccessTarget>::new("target", |_, access| access.target())
    }

    /// The unit owning an element.
    #[must_use]
    pub fn owner<T: HasOwner + ?Sized + 'static>() -> Projection<T, CodeUnit> {
        Projection::<T, CodeUnit>::new("owner", |graph, element| element.owner(graph))
    }

    /// The unit owning the origin of an access.
    #[must_use]
    pub fn origin_owner() -> Projection<Access, CodeUnit> {
        Projection::<Access, CodeUnit>::new("origin owner", |graph, access| {
            graph.origin_unit(access)
        })
    }

    /// The unit an access points into.
    #[must_use]
    pub fn target_owner() -> Projection<Access, CodeUnit> {
        Projection::<Access, CodeUnit>::new("target owner", |graph, access| {
            graph.target_unit(access)
        })
    }
}

fn required(value: String, parameter: &'static str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingParameter { parameter });
    }
    Ok(value)
}

fn parse_identifiers<S: AsRef<str>>(identifiers: &[S]) -> Result<Vec<PackageIdentifier>, ConfigError> {
    if identifiers.is_empty() {
        return Err(ConfigError::MissingParameter {
            parameter: "package identifiers",
        });
    }
    identifiers
        .iter()
        .map(|id| PackageIdentifier::new(id.as_ref()))
        .collect()
}

fn quoted(packages: &[PackageIdentifier]) -> String {
    packages
        .iter()
        .map(|p| format!("'{p}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
