//! DTO → rule conversion with validation.
//!
//! Every field is validated here with its position in the file, so a
//! malformed rule set is reported as e.g. `layers[2].packages[0]: ...`
//! rather than by the builder that would otherwise reject it.

use archgate_core::selectors::equivalent_to;
use archgate_core::{AccessRule, ConfigError, PackageIdentifier};

use super::config_dto::{IgnoreDto, LayerDto, LayerRuleDto, RuleSetDto};
use crate::layered::{layered_architecture, LayerName, LayeredArchitecture, LayeredArchitectureBuilder};
use crate::reflection::no_illegal_reflection;

/// Errors during DTO → rule conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "layers[0].packages[1]").
        context: String,
        /// The underlying configuration error.
        source: ConfigError,
    },

    /// A layer reference naming no `[[layers]]` entry; carries its own field path.
    #[error(transparent)]
    Reference(ConfigError),

    /// A `[[layer-rules]]` entry sets no constraint or more than one.
    #[error("layer-rules[{index}]: exactly one constraint must be set for layer `{layer}`, found {found}")]
    ConstraintCount {
        /// Position of the entry.
        index: usize,
        /// The constrained layer.
        layer: String,
        /// Number of constraint keys set.
        found: usize,
    },
}

fn validation(context: impl Into<String>, source: ConfigError) -> LoadError {
    LoadError::Validation {
        context: context.into(),
        source,
    }
}

/// Validated rules of one rule set file.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    architecture: Option<LayeredArchitecture>,
    reflection: Option<AccessRule>,
}

impl RuleSet {
    /// The layered architecture, if any layer-related section was present.
    #[must_use]
    pub fn architecture(&self) -> Option<&LayeredArchitecture> {
        self.architecture.as_ref()
    }

    /// The reflection rule, if `[reflection]` was present.
    #[must_use]
    pub fn reflection(&self) -> Option<&AccessRule> {
        self.reflection.as_ref()
    }

    /// Whether the file defined no rule at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.architecture.is_none() && self.reflection.is_none()
    }

    pub(super) fn into_parts(self) -> (Option<LayeredArchitecture>, Option<AccessRule>) {
        (self.architecture, self.reflection)
    }
}

/// Converts a `RuleSetDto` to validated rules.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: RuleSetDto) -> Result<RuleSet, LoadError> {
    let architecture = load_architecture(&dto)?;
    let reflection = dto
        .reflection
        .as_ref()
        .map(|policy| no_illegal_reflection(policy).map_err(|e| validation("reflection", e)))
        .transpose()?;

    Ok(RuleSet {
        architecture,
        reflection,
    })
}

fn load_architecture(dto: &RuleSetDto) -> Result<Option<LayeredArchitecture>, LoadError> {
    if dto.layers.is_empty() && dto.layer_rules.is_empty() && dto.ignore.is_empty() {
        return Ok(None);
    }
    if dto.layers.is_empty() {
        return Err(validation("layers", ConfigError::NoLayers));
    }

    let mut declared = Vec::new();
    let mut builder = layered_architecture();
    for (i, layer) in dto.layers.iter().enumerate() {
        let name = convert_layer(layer, i, &declared)?;
        builder = if layer.optional {
            builder.optional_layer(name.as_str(), &layer.packages)
        } else {
            builder.layer(name.as_str(), &layer.packages)
        };
        declared.push(name);
    }

    for (i, rule) in dto.layer_rules.iter().enumerate() {
        builder = convert_layer_rule(builder, rule, i, &declared)?;
    }

    for (i, ignore) in dto.ignore.iter().enumerate() {
        builder = convert_ignore(builder, ignore, i)?;
    }

    let settings = &dto.architecture;
    if let Some(name) = &settings.name {
        builder = builder.named(name.as_str());
    }
    if let Some(reason) = &settings.because {
        builder = builder.because(reason.as_str());
    }
    builder
        .with_optional_layers(settings.optional_layers)
        .build()
        .map(Some)
        .map_err(|e| validation("architecture", e))
}

fn convert_layer(dto: &LayerDto, index: usize, declared: &[LayerName]) -> Result<LayerName, LoadError> {
    let ctx = format!("layers[{index}]");
    let name = LayerName::new(&dto.name).map_err(|e| validation(format!("{ctx}.name"), e))?;
    if declared.contains(&name) {
        return Err(validation(
            format!("{ctx}.name"),
            ConfigError::DuplicateLayer {
                name: name.to_string(),
            },
        ));
    }
    if dto.packages.is_empty() {
        return Err(validation(
            format!("{ctx}.packages"),
            ConfigError::NoPatterns {
                name: name.to_string(),
            },
        ));
    }
    for (j, package) in dto.packages.iter().enumerate() {
        PackageIdentifier::new(package)
            .map_err(|e| validation(format!("{ctx}.packages[{j}]"), e))?;
    }
    Ok(name)
}

fn resolve_layer(declared: &[LayerName], name: &str, context: String) -> Result<LayerName, LoadError> {
    let name = LayerName::new(name).map_err(|e| validation(context.clone(), e))?;
    if declared.contains(&name) {
        Ok(name)
    } else {
        Err(LoadError::Reference(ConfigError::UnknownLayer {
            context,
            name: name.to_string(),
        }))
    }
}

fn resolve_layers(
    declared: &[LayerName],
    names: &[String],
    context: &str,
) -> Result<Vec<String>, LoadError> {
    names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            resolve_layer(declared, name, format!("{context}[{j}]")).map(|n| n.to_string())
        })
        .collect()
}

fn convert_layer_rule(
    builder: LayeredArchitectureBuilder,
    dto: &LayerRuleDto,
    index: usize,
    declared: &[LayerName],
) -> Result<LayeredArchitectureBuilder, LoadError> {
    let ctx = format!("layer-rules[{index}]");
    let layer = resolve_layer(declared, &dto.layer, format!("{ctx}.layer"))?;

    let found = usize::from(dto.may_only_be_accessed_by.is_some())
        + usize::from(dto.may_not_be_accessed_by_any_layer)
        + usize::from(dto.may_only_access.is_some())
        + usize::from(dto.may_not_access_any_layer);
    if found != 1 {
        return Err(LoadError::ConstraintCount {
            index,
            layer: layer.to_string(),
            found,
        });
    }

    if let Some(names) = &dto.may_only_be_accessed_by {
        let names = resolve_layers(declared, names, &format!("{ctx}.may-only-be-accessed-by"))?;
        Ok(builder
            .where_layer(layer.as_str())
            .may_only_be_accessed_by_layers(&names))
    } else if let Some(names) = &dto.may_only_access {
        let names = resolve_layers(declared, names, &format!("{ctx}.may-only-access"))?;
        Ok(builder.where_layer(layer.as_str()).may_only_access_layers(&names))
    } else if dto.may_not_be_accessed_by_any_layer {
        Ok(builder
            .where_layer(layer.as_str())
            .may_not_be_accessed_by_any_layer())
    } else {
        Ok(builder.where_layer(layer.as_str()).may_not_access_any_layer())
    }
}

fn convert_ignore(
    builder: LayeredArchitectureBuilder,
    dto: &IgnoreDto,
    index: usize,
) -> Result<LayeredArchitectureBuilder, LoadError> {
    let ctx = format!("ignore[{index}]");
    let origin =
        equivalent_to(dto.origin.as_str()).map_err(|e| validation(format!("{ctx}.origin"), e))?;
    let target =
        equivalent_to(dto.target.as_str()).map_err(|e| validation(format!("{ctx}.target"), e))?;
    Ok(builder.ignore_dependency_matching(origin, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgate_core::Rule;

    fn parse_and_load(toml_str: &str) -> Result<RuleSet, LoadError> {
        let dto: RuleSetDto = toml::from_str(toml_str).unwrap();
        load(dto)
    }

    fn context_of(result: Result<RuleSet, LoadError>) -> String {
        match result {
            Err(LoadError::Validation { context, .. }) => context,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    // -- Happy path --

    #[test]
    fn load_empty_rule_set() {
        let rules = parse_and_load("").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn load_full_rule_set() {
        let rules = parse_and_load(
            r#"
[architecture]
name = "module-layers"

[[layers]]
name = "Core"
packages = ["app.core.."]

[[layers]]
name = "Lang"
packages = ["app.lang.."]

[[layers]]
name = "Spare"
packages = ["app.spare.."]
optional = true

[[layer-rules]]
layer = "Core"
may-only-be-accessed-by = ["Lang"]

[[layer-rules]]
layer = "Lang"
may-not-be-accessed-by-any-layer = true

[[ignore]]
origin = "app.lang.Boot"
target = "app.core.Registry"

[reflection]
"#,
        )
        .unwrap();

        let architecture = rules.architecture().unwrap();
        assert_eq!(architecture.name(), "module-layers");
        assert_eq!(architecture.layers().len(), 3);
        assert!(architecture.layers()[2].is_optional());
        assert_eq!(architecture.layer_rules().len(), 2);
        assert_eq!(architecture.ignores().len(), 1);
        assert_eq!(rules.reflection().unwrap().name(), "no-illegal-reflection");
    }

    #[test]
    fn reflection_alone_needs_no_layers() {
        let rules = parse_and_load("[reflection]\nexempt-packages = []\n").unwrap();
        assert!(rules.architecture().is_none());
        assert!(rules.reflection().is_some());
    }

    // -- Error cases --

    #[test]
    fn load_rejects_malformed_package() {
        let result = parse_and_load(
            r#"
[[layers]]
name = "Core"
packages = ["app.core..", "app...x"]
"#,
        );
        assert_eq!(context_of(result), "layers[0].packages[1]");
    }

    #[test]
    fn load_rejects_duplicate_layer() {
        let result = parse_and_load(
            r#"
[[layers]]
name = "Core"
packages = ["a.."]

[[layers]]
name = "Core"
packages = ["b.."]
"#,
        );
        assert_eq!(context_of(result), "layers[1].name");
    }

    #[test]
    fn load_rejects_layer_without_packages() {
        let result = parse_and_load("[[layers]]\nname = \"Core\"\npackages = []\n");
        assert_eq!(context_of(result), "layers[0].packages");
    }

    #[test]
    fn load_rejects_unknown_layer_reference() {
        let result = parse_and_load(
            r#"
[[layers]]
name = "Core"
packages = ["a.."]

[[layer-rules]]
layer = "Core"
may-only-be-accessed-by = ["Core", "Nope"]
"#,
        );
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "layer-rules[0].may-only-be-accessed-by[1]: unknown layer `Nope`"
        );

        let err = parse_and_load(
            r#"
[[layers]]
name = "Core"
packages = ["a.."]

[[layer-rules]]
layer = "Ghost"
may-not-access-any-layer = true
"#,
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            LoadError::Reference(ConfigError::UnknownLayer { context, name })
                if context == "layer-rules[0].layer" && name == "Ghost"
        ));
        assert_eq!(err.to_string(), "layer-rules[0].layer: unknown layer `Ghost`");
    }

    #[test]
    fn load_rejects_ambiguous_constraint() {
        let result = parse_and_load(
            r#"
[[layers]]
name = "Core"
packages = ["a.."]

[[layer-rules]]
layer = "Core"
may-not-access-any-layer = true
may-not-be-accessed-by-any-layer = true
"#,
        );
        assert!(matches!(
            result,
            Err(LoadError::ConstraintCount { found: 2, .. })
        ));

        let result = parse_and_load(
            r#"
[[layers]]
name = "Core"
packages = ["a.."]

[[layer-rules]]
layer = "Core"
"#,
        );
        assert!(matches!(
            result,
            Err(LoadError::ConstraintCount { found: 0, .. })
        ));
    }

    #[test]
    fn load_rejects_rules_without_layers() {
        let result = parse_and_load(
            r#"
[[ignore]]
origin = "a.B"
target = "a.C"
"#,
        );
        assert_eq!(context_of(result), "layers");
    }

    #[test]
    fn load_rejects_empty_ignore_type() {
        let result = parse_and_load(
            r#"
[[layers]]
name = "Core"
packages = ["a.."]

[[ignore]]
origin = "a.B"
target = ""
"#,
        );
        assert_eq!(context_of(result), "ignore[0].target");
    }

    #[test]
    fn load_rejects_broken_reflection_policy() {
        let result = parse_and_load("[reflection]\nresolver-methods = []\n");
        assert_eq!(context_of(result), "reflection");
    }
}
