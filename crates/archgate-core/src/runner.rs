//! Rule runner: evaluates a rule list against one graph snapshot.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RuleError;
use crate::graph::Graph;
use crate::rule::{Rule, RuleBox};
use crate::types::{Report, RuleOutcome, RuleStatus};

/// Builder for configuring a [`RuleRunner`].
#[derive(Default)]
pub struct RuleRunnerBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
}

impl RuleRunnerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the runner.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the runner.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules, keeping their order.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the runner.
    #[must_use]
    pub fn build(self) -> RuleRunner {
        RuleRunner {
            rules: self.rules,
            config: self.config.unwrap_or_default(),
        }
    }
}

/// Evaluates independent rules against one immutable graph.
///
/// Use [`RuleRunner::builder()`] to construct an instance.
pub struct RuleRunner {
    rules: Vec<RuleBox>,
    config: Config,
}

impl RuleRunner {
    /// Creates a new builder for configuring a runner.
    #[must_use]
    pub fn builder() -> RuleRunnerBuilder {
        RuleRunnerBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the registered rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluates every enabled rule and returns one outcome per rule, in declaration order.
    ///
    /// A rule that errors or panics is reported with [`RuleStatus::Error`];
    /// its siblings still run.
    #[must_use]
    pub fn run(&self, graph: &Graph) -> Report {
        let enabled: Vec<&dyn Rule> = self
            .rules
            .iter()
            .map(|rule| &**rule)
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();

        info!(
            "Evaluating {} rule(s) against {} unit(s) and {} access(es)",
            enabled.len(),
            graph.units().len(),
            graph.accesses().len()
        );

        let outcomes: Vec<RuleOutcome> = if self.config.runner.parallel {
            enabled
                .par_iter()
                .map(|rule| evaluate_rule(*rule, graph))
                .collect()
        } else {
            enabled
                .iter()
                .map(|rule| evaluate_rule(*rule, graph))
                .collect()
        };

        let report = Report {
            outcomes,
            units_checked: graph.units().len(),
            accesses_checked: graph.accesses().len(),
        };
        let counts = report.counts();
        info!(
            "Evaluation complete: {} passed, {} failed, {} error(s), {} violation(s)",
            counts.passed, counts.failed, counts.errored, counts.violations
        );
        report
    }
}

fn evaluate_rule(rule: &dyn Rule, graph: &Graph) -> RuleOutcome {
    debug!("Evaluating rule: {}", rule.name());

    let result = match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(graph))) {
        Ok(result) => result,
        Err(payload) => Err(RuleError::Evaluation {
            rule: rule.name().to_string(),
            cause: panic_message(payload.as_ref()),
        }),
    };

    let status = match result {
        Ok(violations) => RuleStatus::from_violations(violations),
        Err(err) => {
            warn!("Rule {} could not be evaluated: {}", rule.name(), err);
            RuleStatus::Error {
                message: err.to_string(),
            }
        }
    };

    RuleOutcome {
        name: rule.name().to_string(),
        code: rule.code().to_string(),
        description: rule.description().to_string(),
        status,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::graph::UnitDecl;
    use crate::types::{Subject, Violation};

    struct CountUnits {
        name: &'static str,
    }

    impl Rule for CountUnits {
        fn name(&self) -> &str {
            self.name
        }

        fn code(&self) -> &str {
            "T001"
        }

        fn description(&self) -> &str {
            "every unit is reported"
        }

        fn evaluate(&self, graph: &Graph) -> Result<Vec<Violation>, RuleError> {
            Ok(graph
                .units()
                .iter()
                .map(|unit| {
                    Violation::new(
                        self.code(),
                        self.name,
                        Subject::Unit {
                            name: unit.name().to_string(),
                        },
                        unit.name(),
                    )
                })
                .collect())
        }
    }

    struct Misconfigured;

    impl Rule for Misconfigured {
        fn name(&self) -> &str {
            "misconfigured"
        }

        fn code(&self) -> &str {
            "T002"
        }

        fn description(&self) -> &str {
            "cannot run"
        }

        fn evaluate(&self, _graph: &Graph) -> Result<Vec<Violation>, RuleError> {
            Err(ConfigError::MissingParameter {
                parameter: "annotation",
            }
            .into())
        }
    }

    struct Panicking;

    impl Rule for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn code(&self) -> &str {
            "T003"
        }

        fn description(&self) -> &str {
            "panics"
        }

        fn evaluate(&self, _graph: &Graph) -> Result<Vec<Violation>, RuleError> {
            panic!("index out of range")
        }
    }

    struct Silent;

    impl Rule for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn code(&self) -> &str {
            "T004"
        }

        fn description(&self) -> &str {
            "never complains"
        }

        fn evaluate(&self, _graph: &Graph) -> Result<Vec<Violation>, RuleError> {
            Ok(Vec::new())
        }
    }

    fn graph() -> Graph {
        Graph::builder()
            .unit(UnitDecl::new("a.One"))
            .unit(UnitDecl::new("a.Two"))
            .build()
            .unwrap()
    }

    fn runner(config: Config) -> RuleRunner {
        RuleRunner::builder()
            .rule(CountUnits { name: "count" })
            .rule(Misconfigured)
            .rule(Panicking)
            .rule(Silent)
            .config(config)
            .build()
    }

    #[test]
    fn failures_are_isolated_per_rule() {
        let report = runner(Config::default()).run(&graph());
        let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["count", "misconfigured", "panicking", "silent"]);

        assert_eq!(report.outcomes[0].status.violations().len(), 2);
        assert_eq!(
            report.outcomes[1].status,
            RuleStatus::Error {
                message: "missing required parameter `annotation`".to_string()
            }
        );
        assert_eq!(
            report.outcomes[2].status,
            RuleStatus::Error {
                message: "rule `panicking` failed: index out of range".to_string()
            }
        );
        assert_eq!(report.outcomes[3].status, RuleStatus::Passed);
        assert_eq!(report.units_checked, 2);
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let mut sequential = Config::default();
        sequential.runner.parallel = false;

        let graph = graph();
        let a = runner(sequential).run(&graph);
        let b = runner(Config::default()).run(&graph);

        let statuses = |r: &Report| r.outcomes.iter().map(|o| o.status.clone()).collect::<Vec<_>>();
        assert_eq!(statuses(&a), statuses(&b));
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let config = Config::parse("[rules.panicking]\nenabled = false\n").unwrap();
        let report = runner(config).run(&graph());
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcome("panicking").is_none());
    }
}
