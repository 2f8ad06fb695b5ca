//! List rules command implementation.

use anyhow::Result;

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let (config, rules) = super::load_rule_set(source)?;

    if rules.is_empty() {
        println!("The rule set defines no rules.");
        return Ok(());
    }

    println!("{:<8} {:<25} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in &rules {
        let mut lines = rule.description().lines();
        let status = if config.is_rule_enabled(rule.name()) {
            ""
        } else {
            " (disabled)"
        };
        println!(
            "{:<8} {:<25} {}{status}",
            rule.code(),
            rule.name(),
            lines.next().unwrap_or_default()
        );
        for line in lines {
            println!("{:<34} {line}", "");
        }
    }

    println!("\nUse --rules to run a subset, e.g.:");
    println!("  archgate check graph.json --rules layered-architecture");
    Ok(())
}
