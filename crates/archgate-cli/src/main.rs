//! archgate CLI tool.
//!
//! Usage:
//! ```bash
//! archgate check [OPTIONS] <GRAPH>
//! archgate list-rules
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Architecture conformance checks over an imported code graph
#[derive(Parser)]
#[command(name = "archgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the rule set file (default: archgate.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the rule set against a graph snapshot
    Check {
        /// Graph snapshot (JSON) produced by an importer
        graph: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,
    },

    /// List the rules of the rule set
    ListRules,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;
    let source = config_resolver::resolve(&cwd, cli.config.as_deref());

    match cli.command {
        Commands::Check {
            graph,
            format,
            rules,
        } => commands::check::run(&graph, format, rules.as_deref(), &source),
        Commands::ListRules => commands::list_rules::run(&source),
    }
}
