//! [`VcsService`] over the GitHub REST API.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::types::{is_pull_request, GitHubPullRequestState};
use super::GitHubNormalizer;
use crate::model::{
    Commit, Issue, ListPullRequestsOptions, PullRequest, RepositoryInfo, UserInfo,
};
use crate::services::{
    flatten_pages, ResponseNormalizer, Transport, VcsError, VcsFuture, VcsService,
};

const PROVIDER: &str = "github";
const PER_PAGE: &str = "100";

/// GitHub facade.
pub struct GitHubService {
    transport: Arc<dyn Transport>,
    normalizer: GitHubNormalizer,
}

impl GitHubService {
    /// Creates a service over `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            normalizer: GitHubNormalizer,
        }
    }

    fn repo_path(owner: &str, repo: &str) -> String {
        format!(
            "/repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        )
    }

    /// Fallback context for payloads without `base.repo`.
    fn repository(owner: &str, repo: &str) -> RepositoryInfo {
        RepositoryInfo {
            id: String::new(),
            name: repo.to_string(),
            url: String::new(),
            owner: UserInfo {
                id: String::new(),
                login: owner.to_string(),
                url: String::new(),
            },
        }
    }

    async fn list(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, VcsError> {
        flatten_pages(PROVIDER, self.transport.get_paginated(path, params).await?)
    }

    async fn list_commits(&self, path: &str) -> Result<Vec<Commit>, VcsError> {
        self.list(path, &[("per_page", PER_PAGE.to_string())])
            .await?
            .iter()
            .map(|raw| self.normalizer.to_commit(raw))
            .collect()
    }
}

impl VcsService for GitHubService {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn list_pull_requests<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        options: &'a ListPullRequestsOptions,
    ) -> VcsFuture<'a, Vec<PullRequest>> {
        Box::pin(async move {
            let path = format!("{}/pulls", Self::repo_path(owner, repo));
            let state = GitHubPullRequestState::from(options.state);
            let params = [
                ("state", state.as_str().to_string()),
                ("per_page", PER_PAGE.to_string()),
            ];
            let repository = Self::repository(owner, repo);
            self.list(&path, &params)
                .await?
                .iter()
                .map(|raw| self.normalizer.to_pull_request(raw, &repository))
                .collect()
        })
    }

    fn get_pull_request<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> VcsFuture<'a, PullRequest> {
        Box::pin(async move {
            let path = format!("{}/pulls/{number}", Self::repo_path(owner, repo));
            let raw = self.transport.get(&path, &[]).await?;
            self.normalizer
                .to_pull_request(&raw, &Self::repository(owner, repo))
        })
    }

    fn list_pull_commits<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> VcsFuture<'a, Vec<Commit>> {
        Box::pin(async move {
            let path = format!("{}/pulls/{number}/commits", Self::repo_path(owner, repo));
            self.list_commits(&path).await
        })
    }

    fn get_commit<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        sha: &'a str,
    ) -> VcsFuture<'a, Commit> {
        Box::pin(async move {
            let path = format!(
                "{}/commits/{}",
                Self::repo_path(owner, repo),
                urlencoding::encode(sha)
            );
            let raw = self.transport.get(&path, &[]).await?;
            self.normalizer.to_commit(&raw)
        })
    }

    fn list_repo_commits<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
    ) -> VcsFuture<'a, Vec<Commit>> {
        Box::pin(async move {
            let path = format!("{}/commits", Self::repo_path(owner, repo));
            self.list_commits(&path).await
        })
    }

    fn get_issue<'a>(&'a self, owner: &'a str, repo: &'a str, number: u64) -> VcsFuture<'a, Issue> {
        Box::pin(async move {
            let path = format!("{}/issues/{number}", Self::repo_path(owner, repo));
            let raw = self.transport.get(&path, &[]).await?;
            self.normalizer.to_issue(&raw)
        })
    }

    fn list_issues<'a>(&'a self, owner: &'a str, repo: &'a str) -> VcsFuture<'a, Vec<Issue>> {
        Box::pin(async move {
            let path = format!("{}/issues", Self::repo_path(owner, repo));
            let params = [
                ("state", "all".to_string()),
                ("per_page", PER_PAGE.to_string()),
            ];
            let items = self.list(&path, &params).await?;
            let total = items.len();
            let issues = items
                .iter()
                .filter(|raw| !is_pull_request(raw))
                .map(|raw| self.normalizer.to_issue(raw))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(
                owner,
                repo,
                total,
                issues = issues.len(),
                "Dropped pull requests from issue listing"
            );
            Ok(issues)
        })
    }
}
