//! Rule trait and the generic access rule built from predicates.

use tracing::debug;

use crate::error::RuleError;
use crate::graph::{Access, AccessKind, CodeUnit, Graph};
use crate::predicate::{always_true, DescribedPredicate};
use crate::types::Violation;

/// An architecture rule evaluated against one graph snapshot.
///
/// Rules are read-only over the graph and must not depend on each other's
/// state; the runner may evaluate them in parallel.
///
/// # Example
///
/// ```
/// use archgate_core::{Graph, Rule, RuleError, Subject, Violation};
///
/// struct NoStubs;
///
/// impl Rule for NoStubs {
///     fn name(&self) -> &str { "no-stubs" }
///     fn code(&self) -> &str { "AG900" }
///     fn description(&self) -> &str { "every referenced unit should be imported" }
///
///     fn evaluate(&self, graph: &Graph) -> Result<Vec<Violation>, RuleError> {
///         Ok(graph
///             .units()
///             .iter()
///             .filter(|unit| !unit.is_complete())
///             .map(|unit| {
///                 Violation::new(
///                     self.code(),
///                     self.name(),
///                     Subject::Unit { name: unit.name().to_string() },
///                     format!("{} was not imported", unit.name()),
///                 )
///             })
///             .collect())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "layered-architecture").
    fn name(&self) -> &str;

    /// Returns the rule code (e.g., "AG001").
    fn code(&self) -> &str;

    /// Returns the human-readable rule text used in reports.
    fn description(&self) -> &str;

    /// Evaluates the rule and returns every violation found, in graph order.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the rule cannot produce a verdict.
    fn evaluate(&self, graph: &Graph) -> Result<Vec<Violation>, RuleError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Starts a rule that forbids certain accesses from (a subset of) all units.
///
/// ```
/// use archgate_core::rule::no_units;
/// use archgate_core::selectors::{equivalent_to, get, name, target};
/// use archgate_core::AccessTarget;
///
/// let is_class = equivalent_to("java.lang.Class").unwrap();
/// let rule = no_units().should_call_where(target(
///     name::<AccessTarget>("forName")
///         .unwrap()
///         .and(is_class.on_result_of(get::owner::<AccessTarget>())),
/// ));
/// assert_eq!(
///     rule.description(),
///     "no classes should call method where target name 'forName' and owner equivalent to java.lang.Class"
/// );
/// ```
#[must_use]
pub fn no_units() -> NoUnits {
    NoUnits { scope: None }
}

/// Builder returned by [`no_units`].
#[derive(Debug, Clone)]
pub struct NoUnits {
    scope: Option<DescribedPredicate<CodeUnit>>,
}

impl NoUnits {
    /// Restricts the rule to origin units matching `scope`.
    #[must_use]
    pub fn that(mut self, scope: DescribedPredicate<CodeUnit>) -> Self {
        self.scope = Some(match self.scope {
            Some(existing) => existing.and(scope),
            None => scope,
        });
        self
    }

    /// Forbids calls matching `condition`.
    #[must_use]
    pub fn should_call_where(self, condition: DescribedPredicate<Access>) -> AccessRule {
        self.finish("call method where", Some(AccessKind::Call), condition)
    }

    /// Forbids accesses of any kind matching `condition`.
    #[must_use]
    pub fn should_access_where(self, condition: DescribedPredicate<Access>) -> AccessRule {
        self.finish("access target where", None, condition)
    }

    fn finish(
        self,
        verb: &str,
        kind: Option<AccessKind>,
        condition: DescribedPredicate<Access>,
    ) -> AccessRule {
        let description = match &self.scope {
            Some(scope) => format!("no classes that {scope} should {verb} {condition}"),
            None => format!("no classes should {verb} {condition}"),
        };
        AccessRule {
            name: slug(&description),
            named: false,
            code: "AG100".to_string(),
            description,
            scope: self.scope.unwrap_or_else(always_true),
            kind,
            condition,
        }
    }
}

/// Kebab-case rule name derived from rule text.
fn slug(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// A rule that reports every access from an in-scope unit matching a condition.
///
/// Until [`AccessRule::named`] is called, the name is derived from the rule
/// text, so two unnamed rules only share a name when they say the same thing.
#[derive(Debug, Clone)]
pub struct AccessRule {
    name: String,
    named: bool,
    code: String,
    description: String,
    scope: DescribedPredicate<CodeUnit>,
    kind: Option<AccessKind>,
    condition: DescribedPredicate<Access>,
}

impl AccessRule {
    /// Renames the rule.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.named = true;
        self
    }

    /// Overrides the rule code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the generated rule text.
    #[must_use]
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        if !self.named {
            self.name = slug(&self.description);
        }
        self
    }

    /// Appends a rationale to the rule text.
    #[must_use]
    pub fn because(mut self, reason: &str) -> Self {
        self.description = format!("{}, because {reason}", self.description);
        self
    }

    /// Returns the rule text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    fn in_scope(&self, graph: &Graph, access: &Access) -> bool {
        self.kind.map_or(true, |kind| access.kind() == kind)
            && self.scope.test(graph, graph.origin_unit(access))
    }
}

impl Rule for AccessRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn evaluate(&self, graph: &Graph) -> Result<Vec<Violation>, RuleError> {
        let violations: Vec<Violation> = graph
            .accesses()
            .iter()
            .filter(|access| self.in_scope(graph, access))
            .filter(|access| self.condition.test(graph, access))
            .map(|access| Violation::for_access(&self.code, &self.name, graph, access))
            .collect();
        debug!(rule = %self.name, violations = violations.len(), "Access rule evaluated");
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AccessDecl, AccessTarget, MemberDecl, MemberPath, TargetDecl, UnitDecl};
    use crate::selectors::{get, name, resides_outside_of_packages, target};

    fn graph() -> Graph {
        Graph::builder()
            .unit(UnitDecl::new("app.Service").member(MemberDecl::new("run")))
            .unit(UnitDecl::new("app.vendor.Lib").member(MemberDecl::new("init")))
            .unit(
                UnitDecl::new("app.Db")
                    .member(MemberDecl::new("exec"))
                    .member(MemberDecl::new("conn")),
            )
            .access(AccessDecl::call(
                MemberPath::new("app.Service", "run"),
                TargetDecl::member("app.Db", "exec"),
            ))
            .access(AccessDecl::field_access(
                MemberPath::new("app.Service", "run"),
                TargetDecl::member("app.Db", "conn"),
            ))
            .access(AccessDecl::call(
                MemberPath::new("app.vendor.Lib", "init"),
                TargetDecl::member("app.Db", "exec"),
            ))
            .build()
            .unwrap()
    }

    fn targets_db() -> DescribedPredicate<Access> {
        target(name::<CodeUnit>("app.Db").unwrap().on_result_of(get::owner::<AccessTarget>()))
    }

    #[test]
    fn call_rule_ignores_field_accesses() {
        let graph = graph();
        let rule = no_units().should_call_where(targets_db());
        let violations = rule.evaluate(&graph).unwrap();

        let origins: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            origins,
            vec![
                "<app.Service.run> calls <app.Db.exec>",
                "<app.vendor.Lib.init> calls <app.Db.exec>",
            ]
        );
    }

    #[test]
    fn scope_restricts_origins() {
        let graph = graph();
        let rule = no_units()
            .that(resides_outside_of_packages(&["..vendor.."]).unwrap())
            .should_access_where(targets_db())
            .named("no-db-access")
            .because("the database is private");

        assert_eq!(rule.name(), "no-db-access");
        insta::assert_snapshot!(rule.description(), @"no classes that reside outside of packages ['..vendor..'] should access target where target owner name 'app.Db', because the database is private");

        let violations = rule.evaluate(&graph).unwrap();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.rule == "no-db-access"));
        assert!(violations.iter().all(|v| v.code == "AG100"));
    }

    #[test]
    fn unnamed_rules_take_their_name_from_the_text() {
        let calls = no_units().should_call_where(targets_db());
        let accesses = no_units().should_access_where(targets_db());

        assert_eq!(
            calls.name(),
            "no-classes-should-call-method-where-target-owner-name-app-db"
        );
        assert_ne!(calls.name(), accesses.name());

        let described = no_units()
            .should_call_where(targets_db())
            .described_as("Database stays private");
        assert_eq!(described.name(), "database-stays-private");

        let named = no_units()
            .should_call_where(targets_db())
            .named("no-db")
            .described_as("Database stays private");
        assert_eq!(named.name(), "no-db");
    }
}
