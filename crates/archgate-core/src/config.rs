//! Runner configuration, read from the `[runner]` and `[rules.*]` tables of `archgate.toml`.
//!
//! The same file also carries the declarative rule set; tables this module
//! does not know about are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for archgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Runner configuration.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigFileError> {
        toml::from_str(content).map_err(|e| ConfigFileError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Rules are enabled unless switched off explicitly.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }
}

/// How the runner evaluates rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Evaluate rules on the rayon thread pool.
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Treat rules that could not run as failures (default: true).
    #[serde(default = "default_true")]
    pub fail_on_error: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            fail_on_error: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Errors reading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
