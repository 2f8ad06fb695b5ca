//! Violations, per-rule verdicts, and the aggregated report of one run.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::graph::{Access, AccessKind, Graph};

/// The access a violation points at, resolved to qualified names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRef {
    /// Position of the access in the snapshot.
    pub index: usize,
    /// Kind of dependency.
    pub kind: AccessKind,
    /// Origin member, e.g. `com.example.Service.run()`.
    pub origin: String,
    /// Unit owning the origin member.
    pub origin_unit: String,
    /// Target member or unit.
    pub target: String,
    /// Unit the target belongs to.
    pub target_unit: String,
}

impl EdgeRef {
    /// Resolves an access against its graph.
    #[must_use]
    pub fn from_access(graph: &Graph, access: &Access) -> Self {
        Self {
            index: access.index(),
            kind: access.kind(),
            origin: graph.describe_member(graph.origin(access)),
            origin_unit: graph.origin_unit(access).name().to_string(),
            target: graph.describe_target(access.target()),
            target_unit: graph.target_unit(access).name().to_string(),
        }
    }
}

impl std::fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> {} <{}>", self.origin, self.kind, self.target)
    }
}

/// What a violation is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Subject {
    /// An offending access edge.
    Access(EdgeRef),
    /// An offending code unit.
    Unit {
        /// Fully qualified unit name.
        name: String,
    },
    /// A layer, e.g. one that matched nothing.
    Layer {
        /// Layer name.
        name: String,
    },
}

/// A single broken constraint found during a rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "AG001").
    pub code: String,
    /// Rule name (e.g., "layered-architecture").
    pub rule: String,
    /// The offending element.
    pub subject: Subject,
    /// Natural-language description of what is wrong.
    pub message: String,
    /// Layers of the origin unit, for layer violations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origin_layers: Vec<String>,
    /// Layers of the target unit, for layer violations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_layers: Vec<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        subject: Subject,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            subject,
            message: message.into(),
            origin_layers: Vec::new(),
            target_layers: Vec::new(),
        }
    }

    /// Creates a violation for an access edge; the message is the rendered edge.
    #[must_use]
    pub fn for_access(
        code: impl Into<String>,
        rule: impl Into<String>,
        graph: &Graph,
        access: &Access,
    ) -> Self {
        let edge = EdgeRef::from_access(graph, access);
        let message = edge.to_string();
        Self::new(code, rule, Subject::Access(edge), message)
    }

    /// Records the layers involved in the violating access.
    #[must_use]
    pub fn with_layers(mut self, origin: Vec<String>, target: Vec<String>) -> Self {
        self.origin_layers = origin;
        self.target_layers = target;
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = format!("{} {}\n", self.code, self.rule);
        let _ = writeln!(output, "  {}", self.message);
        if !self.origin_layers.is_empty() || !self.target_layers.is_empty() {
            let _ = writeln!(
                output,
                "  = layers: [{}] -> [{}]",
                self.origin_layers.join(", "),
                self.target_layers.join(", ")
            );
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Verdict of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum RuleStatus {
    /// The rule ran and found nothing.
    Passed,
    /// The rule ran and found violations.
    Failed {
        /// All violations, in evaluation order.
        violations: Vec<Violation>,
    },
    /// The rule could not run to completion.
    Error {
        /// Cause, including the rule's identity.
        message: String,
    },
}

impl RuleStatus {
    /// Passed for no violations, failed otherwise.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Self::Passed
        } else {
            Self::Failed { violations }
        }
    }

    /// Short uppercase label used in text reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed { .. } => "FAIL",
            Self::Error { .. } => "ERROR",
        }
    }

    /// Violations found, empty unless failed.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Failed { violations } => violations,
            Self::Passed | Self::Error { .. } => &[],
        }
    }
}

/// Name, description, and verdict of one evaluated rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Rule name.
    pub name: String,
    /// Rule code.
    pub code: String,
    /// Human-readable rule text.
    pub description: String,
    /// The verdict.
    #[serde(flatten)]
    pub status: RuleStatus,
}

/// Tallies over a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Rules that passed.
    pub passed: usize,
    /// Rules that found violations.
    pub failed: usize,
    /// Rules that could not run.
    pub errored: usize,
    /// Total violations over all rules.
    pub violations: usize,
}

/// Outcome of one runner invocation, one entry per evaluated rule in declaration order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Report {
    /// Per-rule outcomes.
    pub outcomes: Vec<RuleOutcome>,
    /// Number of code units in the snapshot.
    pub units_checked: usize,
    /// Number of accesses in the snapshot.
    pub accesses_checked: usize,
}

impl Report {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any rule failed or could not run.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| !matches!(o.status, RuleStatus::Passed))
    }

    /// True if any rule could not run.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, RuleStatus::Error { .. }))
    }

    /// True if any rule found violations.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, RuleStatus::Failed { .. }))
    }

    /// Counts outcomes by verdict.
    #[must_use]
    pub fn counts(&self) -> Counts {
        self.outcomes
            .iter()
            .fold(Counts::default(), |mut counts, outcome| {
                match &outcome.status {
                    RuleStatus::Passed => counts.passed += 1,
                    RuleStatus::Failed { violations } => {
                        counts.failed += 1;
                        counts.violations += violations.len();
                    }
                    RuleStatus::Error { .. } => counts.errored += 1,
                }
                counts
            })
    }

    /// Looks up the outcome of a rule by name.
    #[must_use]
    pub fn outcome(&self, rule: &str) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.name == rule)
    }

    /// Formats the report as multi-line text, one block per rule.
    #[must_use]
    pub fn format_report(&self) -> String {
        let counts = self.counts();
        let mut report = String::new();
        let _ = writeln!(
            report,
            "=== archgate: {} rule(s), {} failed, {} error(s) ===",
            self.outcomes.len(),
            counts.failed,
            counts.errored
        );

        for outcome in &self.outcomes {
            let _ = writeln!(report);
            let _ = writeln!(
                report,
                "[{}] {} {}",
                outcome.status.label(),
                outcome.code,
                outcome.name
            );
            for line in outcome.description.lines() {
                let _ = writeln!(report, "  {line}");
            }
            match &outcome.status {
                RuleStatus::Passed => {}
                RuleStatus::Failed { violations } => {
                    for v in violations {
                        let _ = writeln!(report, "  - {}", v.message);
                        if !v.origin_layers.is_empty() || !v.target_layers.is_empty() {
                            let _ = writeln!(
                                report,
                                "    layers: [{}] -> [{}]",
                                v.origin_layers.join(", "),
                                v.target_layers.join(", ")
                            );
                        }
                    }
                }
                RuleStatus::Error { message } => {
                    let _ = writeln!(report, "  error: {message}");
                }
            }
        }

        let _ = writeln!(report);
        let _ = write!(
            report,
            "Total: {} passed, {} failed, {} error(s), {} violation(s) in {} unit(s), {} access(es)",
            counts.passed,
            counts.failed,
            counts.errored,
            counts.violations,
            self.units_checked,
            self.accesses_checked
        );
        report
    }

    /// Prints the text report to stdout.
    pub fn print_report(&self) {
        println!("{}", self.format_report());
    }
}
