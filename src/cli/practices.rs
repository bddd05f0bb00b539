//! Practices command: evaluates the built-in practices against a directory.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::debug;

use super::{print_output, OutputFormat};
use crate::config::ScannerConfig;
use crate::detectors::detect_project_component;
use crate::inspectors::{CachedFileInspector, LocalFileSystem};
use crate::model::{PracticeEvaluationResult, ProgrammingLanguage, ProjectComponent};
use crate::practices::{PracticeContext, PracticeReport, PracticeRunner};

/// Practices command options.
#[derive(Parser)]
pub struct PracticesCommand {
    /// Repository root to analyze.
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Primary language, skipping detection (e.g. java, kotlin, swift).
    #[arg(long)]
    pub language: Option<ProgrammingLanguage>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Suppresses the coloured summary on stderr.
    #[arg(long)]
    pub quiet: bool,
}

impl PracticesCommand {
    /// Executes the practices command.
    pub async fn execute(self) -> Result<()> {
        let root = self
            .path
            .canonicalize()
            .with_context(|| {
                format!(
                    "Failed to resolve repository path: {}",
                    self.path.display()
                )
            })?;
        anyhow::ensure!(root.is_dir(), "Not a directory: {}", root.display());

        let inspector = Arc::new(CachedFileInspector::new(Arc::new(LocalFileSystem::new(
            root.clone(),
        ))));
        let component = match self.language {
            Some(language) => ProjectComponent::new(language, root.clone()),
            None => detect_project_component(inspector.as_ref(), root.clone()),
        };
        debug!(language = %component.language, root = %root.display(), "Analyzing project");

        let config = ScannerConfig::discover(&root);
        let runner = PracticeRunner::with_builtin_practices().with_overrides(config.practices);
        let ctx = PracticeContext::new(inspector, component);
        let report = runner.run(&ctx).await;

        if !self.quiet {
            print_summary(&report).context("Failed to write summary")?;
        }
        print_output(&report, self.format)
    }
}

fn verdict_color(result: PracticeEvaluationResult) -> Color {
    match result {
        PracticeEvaluationResult::Practicing => Color::Green,
        PracticeEvaluationResult::NotPracticing => Color::Red,
        PracticeEvaluationResult::Unknown => Color::Yellow,
    }
}

/// Writes one coloured line per verdict to stderr.
fn print_summary(report: &PracticeReport) -> std::io::Result<()> {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);

    for (key, result) in &report.results {
        let label = result.to_string();
        stderr.set_color(
            ColorSpec::new()
                .set_fg(Some(verdict_color(*result)))
                .set_bold(true),
        )?;
        write!(stderr, "{label:<14}")?;
        stderr.reset()?;
        match report.impacts.get(key) {
            Some(impact) => writeln!(stderr, "{key} ({impact})")?,
            None => writeln!(stderr, "{key}")?,
        }
    }

    for diagnostic in &report.diagnostics {
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(stderr, "warning: ")?;
        stderr.reset()?;
        writeln!(stderr, "{}: {}", diagnostic.practice, diagnostic.message)?;
    }

    writeln!(
        stderr,
        "{} practicing, {} not practicing, {} unknown",
        report.count(PracticeEvaluationResult::Practicing),
        report.count(PracticeEvaluationResult::NotPracticing),
        report.count(PracticeEvaluationResult::Unknown)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn evaluates_a_directory_on_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        fs::create_dir_all(dir.path().join("src/main/resources")).unwrap();
        fs::write(
            dir.path().join("src/main/resources/log4j2.xml"),
            "<Configuration status=\"WARN\"><Appenders/></Configuration>",
        )
        .unwrap();

        let cmd = PracticesCommand {
            path: dir.path().to_path_buf(),
            language: None,
            format: OutputFormat::Json,
            quiet: true,
        };
        cmd.execute().await.unwrap();
    }

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let cmd = PracticesCommand {
            path: PathBuf::from("/definitely/not/here/dx-scan"),
            language: Some(ProgrammingLanguage::Java),
            format: OutputFormat::Yaml,
            quiet: true,
        };
        let err = cmd.execute().await.unwrap_err();
        assert!(err.to_string().contains("Failed to resolve repository path"));
    }
}
