//! Integration test: TOML rule set + JSON snapshot → RuleRunner → Report.
//!
//! Uses the fixtures under `tests/fixtures/archunit/` to verify that layer
//! constraints, ignore rules and the reflection rule work end-to-end.

use archgate_core::{Config, Graph, GraphBuilder, Report, RuleRunner, RuleStatus, SnapshotDto, Subject};
use archgate_rules::declarative;
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/archunit")
        .join(name);
    std::fs::read_to_string(path).expect("fixture should exist")
}

fn fixture_graph() -> Graph {
    let snapshot: SnapshotDto =
        serde_json::from_str(&fixture("graph.json")).expect("fixture snapshot should parse");
    GraphBuilder::from_snapshot(snapshot)
        .build()
        .expect("fixture snapshot should link")
}

fn run(toml_content: &str) -> Report {
    let config = Config::parse(toml_content).expect("fixture config should parse");
    let rules =
        declarative::load_rules_from_toml(toml_content).expect("fixture rules should load");
    RuleRunner::builder()
        .rules(rules)
        .config(config)
        .build()
        .run(&fixture_graph())
}

fn flagged_edges(report: &Report, rule: &str) -> Vec<usize> {
    report
        .outcome(rule)
        .expect("rule should have run")
        .status
        .violations()
        .iter()
        .filter_map(|v| match &v.subject {
            Subject::Access(edge) => Some(edge.index),
            _ => None,
        })
        .collect()
}

// ── Layered architecture ──

#[test]
fn layer_constraints_flag_only_forbidden_edges() {
    let report = run(&fixture("archgate.toml"));

    // 0: Library -> Core, allowed
    // 1: untracked -> Core, exempt
    // 2: UI -> Core, forbidden
    // 3: Root -> Core, ignored pair
    // 4: Root -> Core, same origin but another target
    // 5..=8: unresolved target, skipped
    // 9: Lang -> Core, allowed
    // 10: Core -> UI, forbidden
    assert_eq!(flagged_edges(&report, "layered-architecture"), vec![2, 4, 10]);
}

#[test]
fn layer_violations_name_the_broken_constraint() {
    let report = run(&fixture("archgate.toml"));
    let outcome = report.outcome("layered-architecture").unwrap();
    let violations = outcome.status.violations();

    assert_eq!(
        violations[0].message,
        "<com.tngtech.archunit.ui.Viewer.show()> calls \
         <com.tngtech.archunit.core.domain.JavaClasses.of(java.util.Collection)> \
         (layer 'Core' may only be accessed by layers ['Lang', 'Library'])"
    );
    assert_eq!(violations[0].origin_layers, vec!["UI"]);
    assert_eq!(violations[0].target_layers, vec!["Core"]);
    assert_eq!(
        violations[2].message,
        "<com.tngtech.archunit.core.domain.Loader.load(java.lang.String)> calls \
         <com.tngtech.archunit.ui.Viewer.show()> (layer 'UI' may not be accessed by any layer)"
    );
    assert!(outcome
        .description
        .ends_with("because layers must stay independently usable"));
}

#[test]
fn ignore_rule_suppresses_exactly_its_pair() {
    let without_ignore = fixture("archgate.toml").replace(
        "[[ignore]]\norigin = \"com.tngtech.archunit.ArchConfiguration\"\n\
         target = \"com.tngtech.archunit.core.importer.resolvers.ClassResolver\"\n",
        "",
    );
    let report = run(&without_ignore);
    assert_eq!(flagged_edges(&report, "layered-architecture"), vec![2, 3, 4, 10]);
}

#[test]
fn missing_mandatory_layer_is_reported_last() {
    let with_empty_layer = format!(
        "{}\n[[layers]]\nname = \"Base\"\npackages = [\"com.tngtech.archunit.base..\"]\n",
        fixture("archgate.toml")
    );
    let report = run(&with_empty_layer);
    let violations = report
        .outcome("layered-architecture")
        .unwrap()
        .status
        .violations();

    let last = violations.last().unwrap();
    assert_eq!(last.message, "Layer 'Base' is empty");
    assert_eq!(
        last.subject,
        Subject::Layer {
            name: "Base".to_string()
        }
    );
}

// ── Reflection ──

#[test]
fn reflection_rule_flags_unpermitted_resolution() {
    let report = run(&fixture("archgate.toml"));

    // 5: plain Core unit, flagged
    // 6: annotated unit, 7: nested in annotated unit, 8: third-party, all allowed
    assert_eq!(flagged_edges(&report, "no-illegal-reflection"), vec![5]);
    let violation = &report
        .outcome("no-illegal-reflection")
        .unwrap()
        .status
        .violations()[0];
    assert_eq!(violation.code, "AG002");
    assert_eq!(
        violation.message,
        "<com.tngtech.archunit.core.domain.Loader.load(java.lang.String)> calls \
         <java.lang.Class.forName(java.lang.String)>"
    );
}

// ── Runner integration ──

#[test]
fn report_lists_rules_in_declaration_order() {
    let report = run(&fixture("archgate.toml"));
    let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["layered-architecture", "no-illegal-reflection"]);

    let counts = report.counts();
    assert_eq!((counts.failed, counts.violations), (2, 4));
    assert_eq!(report.units_checked, 12);
    assert_eq!(report.accesses_checked, 11);
}

#[test]
fn disabled_rule_is_not_evaluated() {
    let toml_content = format!(
        "{}\n[rules.no-illegal-reflection]\nenabled = false\n",
        fixture("archgate.toml")
    );
    let report = run(&toml_content);
    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(
        report.outcomes[0].status,
        RuleStatus::Failed { .. }
    ));
}
