//! Rule sets declared in TOML.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! RuleSet (LayeredArchitecture, reflection AccessRule)
//!   ↓ create_rules()
//! Vec<RuleBox>
//! ```
//!
//! ```
//! use archgate_rules::declarative::load_rules_from_toml;
//!
//! let rules = load_rules_from_toml(
//!     r#"
//! [[layers]]
//! name = "Core"
//! packages = ["app.core.."]
//!
//! [[layers]]
//! name = "Lang"
//! packages = ["app.lang.."]
//!
//! [[layer-rules]]
//! layer = "Core"
//! may-only-be-accessed-by = ["Lang"]
//!
//! [reflection]
//! "#,
//! )
//! .unwrap();
//! let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
//! assert_eq!(names, vec!["layered-architecture", "no-illegal-reflection"]);
//! ```

use archgate_core::RuleBox;

pub mod config_dto;
pub mod loader;

pub use loader::{LoadError, RuleSet};

/// Errors from parsing TOML and loading a rule set.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Rule set validation failed.
    #[error("{0}")]
    Load(#[from] LoadError),
}

/// Parses TOML content and creates all rules it declares.
///
/// Returns `Ok(vec![])` if no rule section is present.
///
/// # Errors
///
/// Returns an error if TOML parsing or validation fails.
pub fn load_rules_from_toml(content: &str) -> Result<Vec<RuleBox>, LoadRulesError> {
    let dto: config_dto::RuleSetDto = toml::from_str(content)?;
    let rules = loader::load(dto)?;
    Ok(create_rules(rules))
}

/// Boxes the rules of a validated [`RuleSet`]: the layered architecture first, then the reflection rule.
#[must_use]
pub fn create_rules(rules: RuleSet) -> Vec<RuleBox> {
    let (architecture, reflection) = rules.into_parts();
    let mut result: Vec<RuleBox> = Vec::new();
    if let Some(architecture) = architecture {
        result.push(Box::new(architecture));
    }
    if let Some(reflection) = reflection {
        result.push(Box::new(reflection));
    }
    result
}
