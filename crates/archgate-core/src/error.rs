//! Error taxonomy for graph construction, rule construction, and rule evaluation.
//!
//! Violations are not errors: they are the regular output of a rule that ran
//! to completion. The types here cover everything that prevents a rule from
//! producing a trustworthy verdict.

use miette::Diagnostic;
use thiserror::Error;

/// Malformed rule or predicate configuration.
///
/// Always raised while a rule is being built, never while it is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    /// A name (layer, rule, type) is empty or whitespace only.
    #[error("{what} name must not be empty")]
    #[diagnostic(code(archgate::config::empty_name))]
    EmptyName {
        /// What kind of name was expected.
        what: &'static str,
    },

    /// A package identifier is empty.
    #[error("package identifier must not be empty")]
    #[diagnostic(
        code(archgate::config::empty_pattern),
        help("use `com.example..` to match a package and all of its subpackages")
    )]
    EmptyPattern,

    /// A package identifier could not be parsed.
    #[error("invalid package identifier `{pattern}`: {reason}")]
    #[diagnostic(code(archgate::config::invalid_pattern))]
    InvalidPattern {
        /// The offending identifier.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two layers share the same name.
    #[error("layer `{name}` is defined more than once")]
    #[diagnostic(code(archgate::config::duplicate_layer))]
    DuplicateLayer {
        /// The duplicated name.
        name: String,
    },

    /// A layer was declared without any package identifiers.
    #[error("layer `{name}` has no package identifiers")]
    #[diagnostic(code(archgate::config::no_patterns))]
    NoPatterns {
        /// The layer name.
        name: String,
    },

    /// A constraint refers to a layer that was never declared.
    #[error("{context}: unknown layer `{name}`")]
    #[diagnostic(
        code(archgate::config::unknown_layer),
        help("declare the layer with `layer(..)` before referring to it")
    )]
    UnknownLayer {
        /// Where the reference was found.
        context: String,
        /// The undeclared layer name.
        name: String,
    },

    /// A required predicate parameter is absent.
    #[error("missing required parameter `{parameter}`")]
    #[diagnostic(code(archgate::config::missing_parameter))]
    MissingParameter {
        /// The parameter name.
        parameter: &'static str,
    },

    /// A layered architecture was built without a single layer.
    #[error("layered architecture defines no layers")]
    #[diagnostic(code(archgate::config::no_layers))]
    NoLayers,
}

/// A graph snapshot that violates the model's structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A code unit or member was declared without a name.
    #[error("{what} name must not be empty")]
    EmptyName {
        /// What kind of element was unnamed.
        what: &'static str,
    },

    /// Two code units share one fully qualified name.
    #[error("code unit `{name}` is declared more than once")]
    DuplicateUnit {
        /// The duplicated name.
        name: String,
    },

    /// A member is declared twice with the same name and signature.
    #[error("member `{owner}.{member}` is declared more than once")]
    DuplicateMember {
        /// Owning code unit.
        owner: String,
        /// Member name including signature.
        member: String,
    },

    /// An access names an origin member that is not part of the snapshot.
    #[error("access origin `{owner}.{member}` is not declared in the snapshot")]
    UnknownOrigin {
        /// Owning code unit of the origin.
        owner: String,
        /// Origin member name.
        member: String,
    },
}

/// Why a rule could not produce a verdict.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// The rule's own configuration is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// An unexpected fault while evaluating the rule.
    #[error("rule `{rule}` failed: {cause}")]
    Evaluation {
        /// Name of the failing rule.
        rule: String,
        /// What went wrong.
        cause: String,
    },
}
