//! Check command implementation.

use anyhow::{Context, Result};
use archgate_core::{Graph, GraphBuilder, Report, RuleBox, RuleRunner, SnapshotDto};
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    graph_path: &Path,
    format: OutputFormat,
    rules_filter: Option<&str>,
    source: &ConfigSource,
) -> Result<()> {
    let (config, rules) = super::load_rule_set(source)?;
    let rules = match rules_filter {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            filter_rules(rules, &names)
        }
        None => rules,
    };

    let graph = load_graph(graph_path)?;

    let fail_on_error = config.runner.fail_on_error;
    let runner = RuleRunner::builder().rules(rules).config(config).build();
    tracing::info!(
        "Checking {} with {} rule(s)",
        graph_path.display(),
        runner.rule_count()
    );

    let report = runner.run(&graph);
    super::output::print(&report, format)?;

    if should_fail(&report, fail_on_error) {
        std::process::exit(1);
    }

    Ok(())
}

/// Reads a JSON snapshot and links it into a graph.
fn load_graph(path: &Path) -> Result<Graph> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph snapshot: {}", path.display()))?;
    let snapshot: SnapshotDto = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse graph snapshot: {}", path.display()))?;
    GraphBuilder::from_snapshot(snapshot)
        .build()
        .with_context(|| format!("Malformed graph snapshot: {}", path.display()))
}

/// Keeps the rules selected by name or code, in rule set order.
fn filter_rules(rules: Vec<RuleBox>, names: &[&str]) -> Vec<RuleBox> {
    for name in names {
        if !rules.iter().any(|r| r.name() == *name || r.code() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }
    rules
        .into_iter()
        .filter(|r| names.contains(&r.name()) || names.contains(&r.code()))
        .collect()
}

fn should_fail(report: &Report, fail_on_error: bool) -> bool {
    report.has_violations() || (fail_on_error && report.has_errors())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgate_core::{RuleOutcome, RuleStatus};
    use archgate_rules::load_rules_from_toml;
    use std::fs;
    use tempfile::TempDir;

    const RULE_SET: &str = r#"
[[layers]]
name = "Core"
packages = ["app.core.."]

[reflection]
"#;

    fn outcome(status: RuleStatus) -> Report {
        Report {
            outcomes: vec![RuleOutcome {
                name: "r".to_string(),
                code: "AG900".to_string(),
                description: "d".to_string(),
                status,
            }],
            units_checked: 0,
            accesses_checked: 0,
        }
    }

    #[test]
    fn filter_by_name_or_code() {
        let rules = load_rules_from_toml(RULE_SET).unwrap();
        let kept = filter_rules(rules, &["AG002"]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name(), "no-illegal-reflection");

        let rules = load_rules_from_toml(RULE_SET).unwrap();
        let kept = filter_rules(rules, &["layered-architecture", "unknown"]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].code(), "AG001");
    }

    #[test]
    fn exit_policy() {
        let error = outcome(RuleStatus::Error {
            message: "boom".to_string(),
        });
        assert!(should_fail(&error, true));
        assert!(!should_fail(&error, false));

        let failed = outcome(RuleStatus::Failed {
            violations: Vec::new(),
        });
        assert!(should_fail(&failed, false));
        assert!(!should_fail(&outcome(RuleStatus::Passed), true));
    }

    #[test]
    fn load_graph_from_snapshot_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("graph.json");
        fs::write(
            &path,
            r#"{
  "units": [{ "name": "app.core.Engine", "members": [{ "name": "start" }] }],
  "accesses": [{
    "kind": "call",
    "origin": { "owner": "app.core.Engine", "name": "start" },
    "target": { "owner": "java.lang.System", "member": "exit" }
  }]
}"#,
        )
        .unwrap();

        let graph = load_graph(&path).unwrap();
        assert_eq!(graph.units().len(), 2);
        assert!(!graph.accesses()[0].is_complete());
    }

    #[test]
    fn load_graph_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ \"units\": [").unwrap();

        let err = load_graph(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse graph snapshot"));
        assert!(load_graph(&tmp.path().join("missing.json")).is_err());
    }
}
