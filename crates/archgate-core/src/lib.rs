//! # archgate-core
//!
//! Core framework for architecture conformance checks over an imported code graph.
//!
//! This crate provides the foundational types for building architecture
//! rules. It includes:
//!
//! - [`Graph`] and [`GraphBuilder`], the immutable snapshot of code units and accesses
//! - [`DescribedPredicate`] and [`Projection`] for composable, described element tests
//! - [`selectors`], named predicate constructors such as `name` and `annotated_with`
//! - [`Rule`] trait and the [`RuleRunner`] that evaluates rules into a [`Report`]
//!
//! ## Example
//!
//! ```
//! use archgate_core::rule::no_units;
//! use archgate_core::selectors::{name, target};
//! use archgate_core::{AccessDecl, Graph, MemberDecl, MemberPath, RuleRunner, TargetDecl, UnitDecl};
//!
//! let graph = Graph::builder()
//!     .unit(UnitDecl::new("app.Service").member(MemberDecl::new("run")))
//!     .access(AccessDecl::call(
//!         MemberPath::new("app.Service", "run"),
//!         TargetDecl::member("java.lang.System", "exit"),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let no_exit = no_units()
//!     .should_call_where(target(name("exit").unwrap()))
//!     .named("no-system-exit");
//!
//! let report = RuleRunner::builder().rule(no_exit).build().run(&graph);
//! assert!(report.has_failures());
//! report.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod graph;
mod package;
mod runner;
mod types;

pub mod predicate;
pub mod rule;
pub mod selectors;

pub use config::{Config, ConfigFileError, RuleConfig, RunnerConfig};
pub use error::{ConfigError, GraphError, RuleError};
pub use graph::{
    Access, AccessDecl, AccessKind, AccessTarget, CanBeAnnotated, CodeUnit, Graph, GraphBuilder,
    HasName, HasOwner, Member, MemberDecl, MemberId, MemberPath, SnapshotDto, TargetDecl,
    UnitDecl, UnitId, Upcast,
};
pub use package::PackageIdentifier;
pub use predicate::{DescribedPredicate, Predicate, Projection};
pub use rule::{AccessRule, Rule, RuleBox};
pub use runner::{RuleRunner, RuleRunnerBuilder};
pub use types::{Counts, EdgeRef, Report, RuleOutcome, RuleStatus, Subject, Violation};
