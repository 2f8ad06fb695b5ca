//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to rules via the loader.

use serde::Deserialize;

use crate::reflection::ReflectionPolicy;

/// Raw TOML representation of a rule set.
///
/// Shares the file with the runner `Config`; tables it does not know
/// (`[runner]`, `[rules.*]`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSetDto {
    /// Settings for the layered architecture as a whole.
    #[serde(default)]
    pub architecture: ArchitectureDto,

    /// Layer definitions.
    #[serde(default)]
    pub layers: Vec<LayerDto>,

    /// Per-layer access constraints.
    #[serde(rename = "layer-rules", default)]
    pub layer_rules: Vec<LayerRuleDto>,

    /// Origin/target pairs exempt from every layer constraint.
    #[serde(default)]
    pub ignore: Vec<IgnoreDto>,

    /// Dynamic type resolution policy; the rule is only created when present.
    #[serde(default)]
    pub reflection: Option<ReflectionPolicy>,
}

/// TOML representation of `[architecture]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchitectureDto {
    /// Rule name override.
    #[serde(default)]
    pub name: Option<String>,
    /// Rationale appended to the rule text.
    #[serde(default)]
    pub because: Option<String>,
    /// Whether every layer may be empty.
    #[serde(default)]
    pub optional_layers: bool,
}

/// TOML representation of a layer.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDto {
    /// Layer name (e.g., "Core").
    pub name: String,
    /// Package identifiers (e.g., "com.example.core..").
    pub packages: Vec<String>,
    /// Whether the layer may be empty.
    #[serde(default)]
    pub optional: bool,
}

/// TOML representation of a layer constraint. Exactly one constraint key must be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayerRuleDto {
    /// The constrained layer.
    pub layer: String,
    /// Layers permitted to access `layer`.
    #[serde(default)]
    pub may_only_be_accessed_by: Option<Vec<String>>,
    /// Whether no other layer may access `layer`.
    #[serde(default)]
    pub may_not_be_accessed_by_any_layer: bool,
    /// Layers `layer` may access.
    #[serde(default)]
    pub may_only_access: Option<Vec<String>>,
    /// Whether `layer` may not access any other layer.
    #[serde(default)]
    pub may_not_access_any_layer: bool,
}

/// TOML representation of an ignore pair.
#[derive(Debug, Clone, Deserialize)]
pub struct IgnoreDto {
    /// Fully qualified origin type.
    pub origin: String,
    /// Fully qualified target type.
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty() {
        let dto: RuleSetDto = toml::from_str("").unwrap();
        assert!(dto.layers.is_empty());
        assert!(dto.layer_rules.is_empty());
        assert!(dto.ignore.is_empty());
        assert!(dto.reflection.is_none());
        assert!(!dto.architecture.optional_layers);
    }

    #[test]
    fn deserialize_full_rule_set() {
        let toml_str = r#"
[runner]
parallel = false

[architecture]
because = "modules stay decoupled"
optional-layers = true

[[layers]]
name = "Core"
packages = ["com.example.core.."]

[[layers]]
name = "Lang"
packages = ["com.example.lang.."]
optional = true

[[layer-rules]]
layer = "Core"
may-only-be-accessed-by = ["Lang"]

[[layer-rules]]
layer = "Lang"
may-not-access-any-layer = true

[[ignore]]
origin = "com.example.lang.Boot"
target = "com.example.core.Registry"

[reflection]
exempt-packages = ["..vendor.."]
"#;
        let dto: RuleSetDto = toml::from_str(toml_str).unwrap();
        assert_eq!(dto.layers.len(), 2);
        assert!(dto.layers[1].optional);
        assert_eq!(
            dto.layer_rules[0].may_only_be_accessed_by,
            Some(vec!["Lang".to_string()])
        );
        assert!(dto.layer_rules[1].may_not_access_any_layer);
        assert_eq!(dto.ignore[0].target, "com.example.core.Registry");
        assert!(dto.architecture.optional_layers);

        let reflection = dto.reflection.unwrap();
        assert_eq!(reflection.exempt_packages, vec!["..vendor.."]);
        assert_eq!(reflection.resolver_type, "java.lang.Class");
    }

    #[test]
    fn reflection_table_rejects_unknown_keys() {
        let result: Result<RuleSetDto, _> = toml::from_str("[reflection]\nresolver = \"x\"\n");
        assert!(result.is_err());
    }
}
