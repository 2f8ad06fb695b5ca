//! Validated building blocks of a layered architecture.
//!
//! All invariants are enforced at construction time; evaluation never
//! sees an empty name or an unparsable package identifier.

use std::fmt;

use archgate_core::{CodeUnit, ConfigError, DescribedPredicate, Graph, PackageIdentifier};

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated, non-empty layer name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerName(String);

impl LayerName {
    /// Creates a new layer name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or whitespace only.
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName { what: "layer" });
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ────────────────────────────────────────────
// Layers
// ────────────────────────────────────────────

/// A named partition of code units, defined by package identifiers.
#[derive(Debug, Clone)]
pub struct Layer {
    name: LayerName,
    packages: Vec<PackageIdentifier>,
    optional: bool,
}

impl Layer {
    /// Creates a layer from a name and at least one package identifier.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty, no identifier is given, or an identifier is malformed.
    pub fn new<S: AsRef<str>>(name: &str, packages: &[S], optional: bool) -> Result<Self, ConfigError> {
        let name = LayerName::new(name)?;
        if packages.is_empty() {
            return Err(ConfigError::NoPatterns {
                name: name.to_string(),
            });
        }
        let packages = packages
            .iter()
            .map(|p| PackageIdentifier::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            packages,
            optional,
        })
    }

    /// Layer name.
    #[must_use]
    pub fn name(&self) -> &LayerName {
        &self.name
    }

    /// Package identifiers defining the layer.
    #[must_use]
    pub fn packages(&self) -> &[PackageIdentifier] {
        &self.packages
    }

    /// Whether the layer may be empty.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether `unit` resides in one of the layer's packages.
    #[must_use]
    pub fn contains(&self, unit: &CodeUnit) -> bool {
        self.packages.iter().any(|p| p.matches(unit.package()))
    }

    /// One-line description, e.g. `layer 'Core' ('..core..')`.
    #[must_use]
    pub fn describe(&self) -> String {
        let packages = self
            .packages
            .iter()
            .map(|p| format!("'{p}'"))
            .collect::<Vec<_>>()
            .join(", ");
        let kind = if self.optional { "optional layer" } else { "layer" };
        format!("{kind} '{}' ({packages})", self.name)
    }
}

// ────────────────────────────────────────────
// Constraints
// ────────────────────────────────────────────

/// What a [`LayerRule`] restricts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerConstraint {
    /// Only units of the listed layers (and of the layer itself) may access the layer.
    MayOnlyBeAccessedBy(Vec<LayerName>),
    /// No unit of another layer may access the layer.
    MayNotBeAccessedByAnyLayer,
    /// Units of the layer may only access the listed layers (and their own).
    MayOnlyAccess(Vec<LayerName>),
    /// Units of the layer may not access any other layer.
    MayNotAccessAnyLayer,
}

impl LayerConstraint {
    /// Layers the constraint refers to.
    #[must_use]
    pub fn referenced_layers(&self) -> &[LayerName] {
        match self {
            Self::MayOnlyBeAccessedBy(layers) | Self::MayOnlyAccess(layers) => layers,
            Self::MayNotBeAccessedByAnyLayer | Self::MayNotAccessAnyLayer => &[],
        }
    }
}

/// A constraint attached to one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRule {
    layer: LayerName,
    constraint: LayerConstraint,
}

impl LayerRule {
    /// Creates a rule for `layer`.
    #[must_use]
    pub fn new(layer: LayerName, constraint: LayerConstraint) -> Self {
        Self { layer, constraint }
    }

    /// The constrained layer.
    #[must_use]
    pub fn layer(&self) -> &LayerName {
        &self.layer
    }

    /// The constraint.
    #[must_use]
    pub fn constraint(&self) -> &LayerConstraint {
        &self.constraint
    }

    /// Whether an access from a unit in `origin` layers to a unit in `target` layers breaks this rule.
    ///
    /// Both sets are non-empty. Accesses within the constrained layer are always allowed.
    #[must_use]
    pub fn is_violated_by(&self, origin: &[&LayerName], target: &[&LayerName]) -> bool {
        let own = &self.layer;
        match &self.constraint {
            LayerConstraint::MayOnlyBeAccessedBy(permitted) => {
                target.contains(&own) && any_outside(origin, own, permitted)
            }
            LayerConstraint::MayNotBeAccessedByAnyLayer => {
                target.contains(&own) && any_outside(origin, own, &[])
            }
            LayerConstraint::MayOnlyAccess(permitted) => {
                origin.contains(&own) && any_outside(target, own, permitted)
            }
            LayerConstraint::MayNotAccessAnyLayer => {
                origin.contains(&own) && any_outside(target, own, &[])
            }
        }
    }
}

/// Renders layer names as `'A', 'B'`.
pub(crate) fn quoted(layers: &[LayerName]) -> String {
    layers
        .iter()
        .map(|l| format!("'{l}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether `layers` holds a layer that is neither `own` nor permitted.
fn any_outside(layers: &[&LayerName], own: &LayerName, permitted: &[LayerName]) -> bool {
    layers
        .iter()
        .any(|l| *l != own && !permitted.contains(*l))
}

impl fmt::Display for LayerRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            LayerConstraint::MayOnlyBeAccessedBy(layers) => write!(
                f,
                "layer '{}' may only be accessed by layers [{}]",
                self.layer,
                quoted(layers)
            ),
            LayerConstraint::MayNotBeAccessedByAnyLayer => {
                write!(f, "layer '{}' may not be accessed by any layer", self.layer)
            }
            LayerConstraint::MayOnlyAccess(layers) => write!(
                f,
                "layer '{}' may only access layers [{}]",
                self.layer,
                quoted(layers)
            ),
            LayerConstraint::MayNotAccessAnyLayer => {
                write!(f, "layer '{}' may not access any layer", self.layer)
            }
        }
    }
}

// ────────────────────────────────────────────
// Ignore rules
// ────────────────────────────────────────────

/// Exempts accesses between matching origin and target units from every layer rule.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    origin: DescribedPredicate<CodeUnit>,
    target: DescribedPredicate<CodeUnit>,
}

impl IgnoreRule {
    /// Creates an ignore rule from unit predicates.
    #[must_use]
    pub fn new(origin: DescribedPredicate<CodeUnit>, target: DescribedPredicate<CodeUnit>) -> Self {
        Self { origin, target }
    }

    /// Whether an access from `origin` to `target` is exempt.
    #[must_use]
    pub fn matches(&self, graph: &Graph, origin: &CodeUnit, target: &CodeUnit) -> bool {
        self.origin.test(graph, origin) && self.target.test(graph, target)
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ignoring dependencies from {} to {}", self.origin, self.target)
    }
}
