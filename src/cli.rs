//! CLI interface for dx-scan.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub mod practices;
pub mod vcs;

/// dx-scan: practice evaluation and VCS data for a repository.
#[derive(Parser)]
#[command(name = "dx-scan")]
#[command(about = "Evaluates engineering practices and queries VCS providers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluates the built-in practices against a local repository.
    Practices(practices::PracticesCommand),
    /// Fetches normalized pull requests, commits and issues from a provider.
    Vcs(vcs::VcsCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Practices(practices_cmd) => practices_cmd.execute().await,
            Commands::Vcs(vcs_cmd) => vcs_cmd.execute().await,
        }
    }
}

/// Machine-readable output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// YAML document.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Serializes `value` to stdout.
pub(crate) fn print_output<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    let text = render(value, format)?;
    println!("{}", text.trim_end());
    Ok(())
}

fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).context("Failed to serialize output to YAML")
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")
        }
    }
}
