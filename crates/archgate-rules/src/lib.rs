//! # archgate-rules
//!
//! Built-in architecture rules for archgate.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | AG001 | `layered-architecture` | Restricts accesses between package-defined layers |
//! | AG002 | `no-illegal-reflection` | Restricts dynamic type resolution to permitted units |
//!
//! Both can be declared in code or loaded from a TOML rule set via
//! [`declarative::load_rules_from_toml`].
//!
//! ## Usage
//!
//! ```
//! use archgate_core::{AccessDecl, Graph, MemberDecl, MemberPath, RuleRunner, TargetDecl, UnitDecl};
//! use archgate_rules::layered::layered_architecture;
//! use archgate_rules::reflection::{no_illegal_reflection, ReflectionPolicy};
//!
//! let graph = Graph::builder()
//!     .unit(UnitDecl::new("app.ui.View").member(MemberDecl::new("render")))
//!     .unit(UnitDecl::new("app.core.Engine").member(MemberDecl::new("start")))
//!     .access(AccessDecl::call(
//!         MemberPath::new("app.ui.View", "render"),
//!         TargetDecl::member("app.core.Engine", "start"),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let layers = layered_architecture()
//!     .layer("UI", &["app.ui.."])
//!     .layer("Core", &["app.core.."])
//!     .where_layer("UI")
//!     .may_not_be_accessed_by_any_layer()
//!     .build()
//!     .unwrap();
//! let reflection = no_illegal_reflection(&ReflectionPolicy::default()).unwrap();
//!
//! let report = RuleRunner::builder().rule(layers).rule(reflection).build().run(&graph);
//! assert!(!report.has_failures());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod declarative;
pub mod layered;
pub mod reflection;

pub use declarative::{load_rules_from_toml, LoadRulesError};
pub use layered::{layered_architecture, LayeredArchitecture};
pub use reflection::{no_illegal_reflection, ReflectionPolicy};

/// Re-export core types for convenience.
pub use archgate_core::{Rule, RuleBox, Violation};
