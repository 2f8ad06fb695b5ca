//! Locating the rule set file.
//!
//! An explicit `--config` path is used as given. Otherwise the candidates
//! are checked in order and the first existing file wins:
//!
//! 1. `archgate.toml` in the working directory
//! 2. `.archgate.toml` in the working directory
//! 3. `config.toml` in `$ARCHGATE_CONFIG_DIR`, or `~/.archgate/`
//!
//! There are no built-in rules, so finding nothing is reported together
//! with every path that was checked.

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the rule set was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`; not checked for existence.
    Explicit(PathBuf),
    /// Found in the working directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found at any of the checked paths.
    Missing {
        /// Checked paths, in search order.
        searched: Vec<PathBuf>,
    },
}

impl ConfigSource {
    /// Returns the rule set path, if one was found.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Missing { .. } => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "rule set {}", p.display()),
            Self::Project(p) => write!(f, "project rule set {}", p.display()),
            Self::Global(p) => write!(f, "global rule set {}", p.display()),
            Self::Missing { searched } => {
                write!(f, "no rule set (searched ")?;
                for (i, path) in searched.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                write!(f, ")")
            }
        }
    }
}

const PROJECT_FILES: [&str; 2] = ["archgate.toml", ".archgate.toml"];
const GLOBAL_FILE: &str = "config.toml";
const GLOBAL_DIR_VAR: &str = "ARCHGATE_CONFIG_DIR";

/// Resolves the rule set for a run started in `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    match explicit {
        Some(path) => ConfigSource::Explicit(path.to_path_buf()),
        None => first_existing(candidates(project_dir, global_dir().as_deref())),
    }
}

/// Candidate sources in priority order.
fn candidates(project_dir: &Path, global_dir: Option<&Path>) -> Vec<ConfigSource> {
    let project = PROJECT_FILES
        .iter()
        .map(|name| ConfigSource::Project(project_dir.join(name)));
    let global = global_dir.map(|dir| ConfigSource::Global(dir.join(GLOBAL_FILE)));
    project.chain(global).collect()
}

/// Returns the first candidate whose file exists.
fn first_existing(candidates: Vec<ConfigSource>) -> ConfigSource {
    let mut searched = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Some(path) = candidate.path() else {
            continue;
        };
        if path.is_file() {
            tracing::debug!("Using {candidate}");
            return candidate;
        }
        searched.push(path.to_path_buf());
    }
    ConfigSource::Missing { searched }
}

/// `$ARCHGATE_CONFIG_DIR`, falling back to `~/.archgate`.
fn global_dir() -> Option<PathBuf> {
    std::env::var_os(GLOBAL_DIR_VAR)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".archgate")))
}
