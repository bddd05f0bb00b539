//! VCS commands: fetch normalized provider records.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use super::{print_output, OutputFormat};
use crate::config::{RepositoryUri, Settings};
use crate::model::{ListPullRequestsOptions, PullRequestState};
use crate::services::{create_vcs_service, ProviderKind, VcsService};

/// VCS operations.
#[derive(Parser)]
pub struct VcsCommand {
    /// VCS subcommand to execute.
    #[command(subcommand)]
    pub command: VcsSubcommands,
}

/// VCS subcommands.
#[derive(Subcommand)]
pub enum VcsSubcommands {
    /// Lists pull (merge) requests.
    PullRequests {
        /// Target repository.
        #[command(flatten)]
        repo: RepositoryArgs,
        /// State filter: open, closed or all.
        #[arg(long, default_value = "open")]
        state: PullRequestState,
    },
    /// Shows one pull (merge) request.
    PullRequest {
        /// Target repository.
        #[command(flatten)]
        repo: RepositoryArgs,
        /// Pull request number (GitLab iid).
        number: u64,
    },
    /// Lists the commits of a pull (merge) request.
    PullCommits {
        /// Target repository.
        #[command(flatten)]
        repo: RepositoryArgs,
        /// Pull request number (GitLab iid).
        number: u64,
    },
    /// Shows one commit.
    Commit {
        /// Target repository.
        #[command(flatten)]
        repo: RepositoryArgs,
        /// Commit SHA.
        sha: String,
    },
    /// Lists the repository's commits.
    Commits {
        /// Target repository.
        #[command(flatten)]
        repo: RepositoryArgs,
    },
    /// Shows one issue.
    Issue {
        /// Target repository.
        #[command(flatten)]
        repo: RepositoryArgs,
        /// Issue number (GitLab iid).
        number: u64,
    },
    /// Lists issues.
    Issues {
        /// Target repository.
        #[command(flatten)]
        repo: RepositoryArgs,
    },
}

/// Repository selection shared by every VCS subcommand.
#[derive(Args, Debug, Clone)]
pub struct RepositoryArgs {
    /// Repository URL (https or `git@host:owner/repo.git`).
    #[arg(long, value_name = "URI")]
    pub uri: String,

    /// Provider, when it cannot be inferred from the host.
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// API base override for self-hosted instances.
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl RepositoryArgs {
    /// Resolves the repository and builds its provider facade.
    fn connect(&self) -> Result<(Arc<dyn VcsService>, RepositoryUri)> {
        let uri = RepositoryUri::parse(&self.uri, self.provider)
            .with_context(|| format!("Failed to parse repository URI: {}", self.uri))?;
        let settings = Settings::load()?;
        let token = settings.provider_token(uri.provider);
        if token.is_none() {
            debug!(
                provider = %uri.provider,
                env = uri.provider.token_env_var(),
                "No access token configured, sending anonymous requests"
            );
        }

        let mut config = uri.provider_config(token);
        if let Some(api_base) = &self.api_base {
            config.api_base.clone_from(api_base);
        }
        let service = create_vcs_service(config)
            .with_context(|| format!("Failed to create {} service", uri.provider))?;
        Ok((service, uri))
    }
}

impl VcsCommand {
    /// Executes the VCS command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            VcsSubcommands::PullRequests { repo, state } => {
                let (service, uri) = repo.connect()?;
                let options = ListPullRequestsOptions::with_state(state);
                let pull_requests = service
                    .list_pull_requests(&uri.owner, &uri.repo, &options)
                    .await
                    .with_context(|| format!("Failed to list pull requests of {uri}"))?;
                print_output(&pull_requests, repo.format)
            }
            VcsSubcommands::PullRequest { repo, number } => {
                let (service, uri) = repo.connect()?;
                let pull_request = service
                    .get_pull_request(&uri.owner, &uri.repo, number)
                    .await
                    .with_context(|| format!("Failed to fetch pull request {number} of {uri}"))?;
                print_output(&pull_request, repo.format)
            }
            VcsSubcommands::PullCommits { repo, number } => {
                let (service, uri) = repo.connect()?;
                let commits = service
                    .list_pull_commits(&uri.owner, &uri.repo, number)
                    .await
                    .with_context(|| {
                        format!("Failed to list commits of pull request {number} of {uri}")
                    })?;
                print_output(&commits, repo.format)
            }
            VcsSubcommands::Commit { repo, sha } => {
                let (service, uri) = repo.connect()?;
                let commit = service
                    .get_commit(&uri.owner, &uri.repo, &sha)
                    .await
                    .with_context(|| format!("Failed to fetch commit {sha} of {uri}"))?;
                print_output(&commit, repo.format)
            }
            VcsSubcommands::Commits { repo } => {
                let (service, uri) = repo.connect()?;
                let commits = service
                    .list_repo_commits(&uri.owner, &uri.repo)
                    .await
                    .with_context(|| format!("Failed to list commits of {uri}"))?;
                print_output(&commits, repo.format)
            }
            VcsSubcommands::Issue { repo, number } => {
                let (service, uri) = repo.connect()?;
                let issue = service
                    .get_issue(&uri.owner, &uri.repo, number)
                    .await
                    .with_context(|| format!("Failed to fetch issue {number} of {uri}"))?;
                print_output(&issue, repo.format)
            }
            VcsSubcommands::Issues { repo } => {
                let (service, uri) = repo.connect()?;
                let issues = service
                    .list_issues(&uri.owner, &uri.repo)
                    .await
                    .with_context(|| format!("Failed to list issues of {uri}"))?;
                print_output(&issues, repo.format)
            }
        }
    }
}
