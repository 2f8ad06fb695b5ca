//! Layered architecture rule.
//!
//! Code units are partitioned into named layers by package identifiers, and
//! accesses between layers are restricted by per-layer constraints:
//!
//! ```
//! use archgate_rules::layered::layered_architecture;
//!
//! let architecture = layered_architecture()
//!     .layer("Core", &["app.core.."])
//!     .layer("Lang", &["app.lang.."])
//!     .layer("Library", &["app.library.."])
//!     .where_layer("Core")
//!     .may_only_be_accessed_by_layers(&["Lang", "Library"])
//!     .build()
//!     .unwrap();
//! assert_eq!(architecture.layers().len(), 3);
//! ```
//!
//! Units outside every layer are untracked: they may access anything and
//! be accessed by anything. Accesses the importer could not resolve are
//! skipped. Ignore rules exempt an origin/target pair from every constraint.

use std::collections::HashSet;

use archgate_core::selectors::equivalent_to;
use archgate_core::{
    CodeUnit, ConfigError, DescribedPredicate, EdgeRef, Graph, Rule, RuleError, Subject, Violation,
};
use tracing::debug;

mod model;

pub use model::{IgnoreRule, Layer, LayerConstraint, LayerName, LayerRule};

const DEFAULT_NAME: &str = "layered-architecture";
const CODE: &str = "AG001";

/// Starts the definition of a layered architecture.
#[must_use]
pub fn layered_architecture() -> LayeredArchitectureBuilder {
    LayeredArchitectureBuilder::default()
}

/// A constraint as written, before layer names are resolved.
#[derive(Debug, Clone)]
enum PendingConstraint {
    MayOnlyBeAccessedBy(Vec<String>),
    MayNotBeAccessedByAnyLayer,
    MayOnlyAccess(Vec<String>),
    MayNotAccessAnyLayer,
}

/// Builder for a [`LayeredArchitecture`].
///
/// Definition errors are collected and reported by [`build`](Self::build);
/// the first one wins.
#[derive(Debug, Default)]
pub struct LayeredArchitectureBuilder {
    layers: Vec<Layer>,
    constraints: Vec<(String, PendingConstraint)>,
    ignores: Vec<IgnoreRule>,
    optional_layers: bool,
    name: Option<String>,
    description: Option<String>,
    because: Option<String>,
    error: Option<ConfigError>,
}

impl LayeredArchitectureBuilder {
    /// Defines a layer by package identifiers, e.g. `com.example.core..`.
    #[must_use]
    pub fn layer<S: AsRef<str>>(self, name: &str, packages: &[S]) -> Self {
        self.push_layer(Layer::new(name, packages, false))
    }

    /// Defines a layer that may match no code unit.
    #[must_use]
    pub fn optional_layer<S: AsRef<str>>(self, name: &str, packages: &[S]) -> Self {
        self.push_layer(Layer::new(name, packages, true))
    }

    /// Starts a constraint on a layer.
    #[must_use]
    pub fn where_layer(self, name: &str) -> WhereLayer {
        WhereLayer {
            builder: self,
            layer: name.to_string(),
        }
    }

    /// Exempts every access from `origin` to `target`, given as fully qualified type names.
    #[must_use]
    pub fn ignore_dependency(self, origin: &str, target: &str) -> Self {
        match (equivalent_to(origin), equivalent_to(target)) {
            (Ok(origin), Ok(target)) => self.ignore_dependency_matching(origin, target),
            (Err(e), _) | (_, Err(e)) => self.fail(e),
        }
    }

    /// Exempts every access from a unit matching `origin` to a unit matching `target`.
    #[must_use]
    pub fn ignore_dependency_matching(
        mut self,
        origin: DescribedPredicate<CodeUnit>,
        target: DescribedPredicate<CodeUnit>,
    ) -> Self {
        self.ignores.push(IgnoreRule::new(origin, target));
        self
    }

    /// Allows every layer to be empty.
    #[must_use]
    pub fn with_optional_layers(mut self, optional: bool) -> Self {
        self.optional_layers = optional;
        self
    }

    /// Renames the rule (default: `layered-architecture`).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the generated rule text.
    #[must_use]
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a rationale to the rule text.
    #[must_use]
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = Some(reason.into());
        self
    }

    /// Validates the definition.
    ///
    /// # Errors
    ///
    /// Returns the first definition error: a malformed layer, a duplicate
    /// layer name, a constraint on an undeclared layer, or no layers at all.
    pub fn build(self) -> Result<LayeredArchitecture, ConfigError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.name().as_str()) {
                return Err(ConfigError::DuplicateLayer {
                    name: layer.name().to_string(),
                });
            }
        }

        let rules = self
            .constraints
            .into_iter()
            .map(|(layer, constraint)| resolve_constraint(&self.layers, &layer, constraint))
            .collect::<Result<Vec<_>, _>>()?;

        let mut description = match self.description {
            Some(description) => description,
            None => describe(&self.layers, &rules),
        };
        if let Some(reason) = self.because {
            description = format!("{description}, because {reason}");
        }

        Ok(LayeredArchitecture {
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            description,
            layers: self.layers,
            rules,
            ignores: self.ignores,
            optional_layers: self.optional_layers,
        })
    }

    fn push_layer(mut self, layer: Result<Layer, ConfigError>) -> Self {
        match layer {
            Ok(layer) => {
                self.layers.push(layer);
                self
            }
            Err(e) => self.fail(e),
        }
    }

    fn push_constraint(mut self, layer: String, constraint: PendingConstraint) -> Self {
        self.constraints.push((layer, constraint));
        self
    }

    fn fail(mut self, error: ConfigError) -> Self {
        self.error.get_or_insert(error);
        self
    }
}

/// Constraint builder returned by [`LayeredArchitectureBuilder::where_layer`].
#[derive(Debug)]
pub struct WhereLayer {
    builder: LayeredArchitectureBuilder,
    layer: String,
}

impl WhereLayer {
    /// Only the listed layers (and the layer itself) may access this layer.
    #[must_use]
    pub fn may_only_be_accessed_by_layers<S: AsRef<str>>(self, layers: &[S]) -> LayeredArchitectureBuilder {
        let layers = owned(layers);
        self.builder
            .push_constraint(self.layer, PendingConstraint::MayOnlyBeAccessedBy(layers))
    }

    /// No other layer may access this layer.
    #[must_use]
    pub fn may_not_be_accessed_by_any_layer(self) -> LayeredArchitectureBuilder {
        self.builder
            .push_constraint(self.layer, PendingConstraint::MayNotBeAccessedByAnyLayer)
    }

    /// This layer may only access the listed layers (and itself).
    #[must_use]
    pub fn may_only_access_layers<S: AsRef<str>>(self, layers: &[S]) -> LayeredArchitectureBuilder {
        let layers = owned(layers);
        self.builder
            .push_constraint(self.layer, PendingConstraint::MayOnlyAccess(layers))
    }

    /// This layer may not access any other layer.
    #[must_use]
    pub fn may_not_access_any_layer(self) -> LayeredArchitectureBuilder {
        self.builder
            .push_constraint(self.layer, PendingConstraint::MayNotAccessAnyLayer)
    }
}

fn owned<S: AsRef<str>>(layers: &[S]) -> Vec<String> {
    layers.iter().map(|l| l.as_ref().to_string()).collect()
}

fn resolve_constraint(
    layers: &[Layer],
    layer: &str,
    constraint: PendingConstraint,
) -> Result<LayerRule, ConfigError> {
    let lookup = |context: &str, name: &str| -> Result<LayerName, ConfigError> {
        let name = LayerName::new(name)?;
        if layers.iter().any(|l| *l.name() == name) {
            Ok(name)
        } else {
            Err(ConfigError::UnknownLayer {
                context: context.to_string(),
                name: name.to_string(),
            })
        }
    };
    let resolve_all = |context: &str, names: Vec<String>| -> Result<Vec<LayerName>, ConfigError> {
        names.iter().map(|n| lookup(context, n)).collect()
    };

    let own = lookup("where layer", layer)?;
    let context = format!("where layer '{own}'");
    let constraint = match constraint {
        PendingConstraint::MayOnlyBeAccessedBy(names) => {
            LayerConstraint::MayOnlyBeAccessedBy(resolve_all(&context, names)?)
        }
        PendingConstraint::MayNotBeAccessedByAnyLayer => LayerConstraint::MayNotBeAccessedByAnyLayer,
        PendingConstraint::MayOnlyAccess(names) => {
            LayerConstraint::MayOnlyAccess(resolve_all(&context, names)?)
        }
        PendingConstraint::MayNotAccessAnyLayer => LayerConstraint::MayNotAccessAnyLayer,
    };
    Ok(LayerRule::new(own, constraint))
}

fn describe(layers: &[Layer], rules: &[LayerRule]) -> String {
    let mut lines = vec!["Layered architecture consisting of".to_string()];
    lines.extend(layers.iter().map(Layer::describe));
    lines.extend(rules.iter().map(|rule| format!("where {rule}")));
    lines.join("\n")
}

/// A validated layered architecture, evaluated as one rule.
#[derive(Debug, Clone)]
pub struct LayeredArchitecture {
    name: String,
    description: String,
    layers: Vec<Layer>,
    rules: Vec<LayerRule>,
    ignores: Vec<IgnoreRule>,
    optional_layers: bool,
}

impl LayeredArchitecture {
    /// Layers in declaration order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Constraints in declaration order.
    #[must_use]
    pub fn layer_rules(&self) -> &[LayerRule] {
        &self.rules
    }

    /// Ignore rules, applied to every constraint.
    #[must_use]
    pub fn ignores(&self) -> &[IgnoreRule] {
        &self.ignores
    }

    /// Names of all layers containing `unit`, in declaration order.
    #[must_use]
    pub fn layers_of(&self, unit: &CodeUnit) -> Vec<&LayerName> {
        self.layers
            .iter()
            .filter(|layer| layer.contains(unit))
            .map(Layer::name)
            .collect()
    }

    fn is_ignored(&self, graph: &Graph, origin: &CodeUnit, target: &CodeUnit) -> bool {
        self.ignores
            .iter()
            .any(|ignore| ignore.matches(graph, origin, target))
    }
}

impl Rule for LayeredArchitecture {
    fn name(&self) -> &str {
        &self.name
    }

    fn code(&self) -> &str {
        CODE
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn evaluate(&self, graph: &Graph) -> Result<Vec<Violation>, RuleError> {
        let membership: Vec<Vec<&LayerName>> =
            graph.units().iter().map(|unit| self.layers_of(unit)).collect();
        let mut violations = Vec::new();

        for access in graph.accesses() {
            if !access.is_complete() {
                debug!("Skipping incomplete access #{}", access.index());
                continue;
            }
            let origin_unit = graph.origin_unit(access);
            let target_unit = graph.target_unit(access);
            let origin = &membership[origin_unit.id().index()];
            let target = &membership[target_unit.id().index()];
            if origin.is_empty() || target.is_empty() {
                continue;
            }

            let broken: Vec<String> = self
                .rules
                .iter()
                .filter(|rule| rule.is_violated_by(origin, target))
                .map(ToString::to_string)
                .collect();
            if broken.is_empty() {
                continue;
            }
            if self.is_ignored(graph, origin_unit, target_unit) {
                debug!(
                    "Ignoring access #{} from {} to {}",
                    access.index(),
                    origin_unit.name(),
                    target_unit.name()
                );
                continue;
            }

            let edge = EdgeRef::from_access(graph, access);
            let message = format!("{edge} ({})", broken.join("; "));
            violations.push(
                Violation::new(CODE, &self.name, Subject::Access(edge), message)
                    .with_layers(names(origin), names(target)),
            );
        }

        if !self.optional_layers {
            for layer in self.layers.iter().filter(|layer| !layer.is_optional()) {
                let populated = graph.units().iter().any(|unit| {
                    unit.is_complete() && membership[unit.id().index()].contains(&layer.name())
                });
                if !populated {
                    violations.push(Violation::new(
                        CODE,
                        &self.name,
                        Subject::Layer {
                            name: layer.name().to_string(),
                        },
                        format!("Layer '{}' is empty", layer.name()),
                    ));
                }
            }
        }

        debug!(rule = %self.name, violations = violations.len(), "Layered architecture evaluated");
        Ok(violations)
    }
}

fn names(layers: &[&LayerName]) -> Vec<String> {
    layers.iter().map(ToString::to_string).collect()
}
