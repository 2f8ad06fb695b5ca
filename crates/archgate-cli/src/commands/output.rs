//! Shared output formatting for reports.

use anyhow::Result;
use archgate_core::{Report, RuleStatus};

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => {
            for line in compact_lines(report) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn print_text(report: &Report) {
    let summary_color = if report.has_violations() {
        "\x1b[31m"
    } else if report.has_errors() {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!("{summary_color}{}\x1b[0m", report.format_report());
}

fn print_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

/// One line per violation or rule error.
fn compact_lines(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();
    for outcome in &report.outcomes {
        match &outcome.status {
            RuleStatus::Passed => {}
            RuleStatus::Failed { violations } => {
                lines.extend(
                    violations
                        .iter()
                        .map(|v| format!("{}: [{}] {}", v.rule, v.code, v.message)),
                );
            }
            RuleStatus::Error { message } => {
                lines.push(format!(
                    "{}: [{}] error: {message}",
                    outcome.name, outcome.code
                ));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgate_core::{RuleOutcome, Subject, Violation};

    #[test]
    fn compact_lists_violations_and_errors() {
        let violation = Violation::new(
            "AG001",
            "layered-architecture",
            Subject::Layer {
                name: "Core".to_string(),
            },
            "Layer 'Core' is empty",
        );
        let report = Report {
            outcomes: vec![
                RuleOutcome {
                    name: "layered-architecture".to_string(),
                    code: "AG001".to_string(),
                    description: "layers".to_string(),
                    status: RuleStatus::from_violations(vec![violation]),
                },
                RuleOutcome {
                    name: "quiet".to_string(),
                    code: "AG900".to_string(),
                    description: "quiet".to_string(),
                    status: RuleStatus::Passed,
                },
                RuleOutcome {
                    name: "broken".to_string(),
                    code: "AG901".to_string(),
                    description: "broken".to_string(),
                    status: RuleStatus::Error {
                        message: "rule `broken` failed: boom".to_string(),
                    },
                },
            ],
            units_checked: 1,
            accesses_checked: 0,
        };

        assert_eq!(
            compact_lines(&report),
            vec![
                "layered-architecture: [AG001] Layer 'Core' is empty",
                "broken: [AG901] error: rule `broken` failed: boom",
            ]
        );
    }
}
