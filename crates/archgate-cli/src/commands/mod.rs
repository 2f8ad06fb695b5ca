//! Subcommand implementations.

pub mod check;
pub mod list_rules;
pub mod output;

use anyhow::{Context, Result};
use archgate_core::{Config, RuleBox};
use archgate_rules::load_rules_from_toml;

use crate::config_resolver::ConfigSource;

/// Reads the runner configuration and the rules from the resolved rule set file.
fn load_rule_set(source: &ConfigSource) -> Result<(Config, Vec<RuleBox>)> {
    let Some(path) = source.path() else {
        anyhow::bail!("{source}: pass --config or create archgate.toml");
    };
    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using {source}");
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule set: {}", path.display()))?;
    let config = Config::parse(&content)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let rules = load_rules_from_toml(&content)
        .with_context(|| format!("Invalid rule set: {}", path.display()))?;
    Ok((config, rules))
}
