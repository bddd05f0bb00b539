//! [`VcsService`] over the GitLab REST v4 API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::{stream, StreamExt, TryStreamExt};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use super::types::{GitLabGroup, GitLabProject, GitLabPullRequestState, GitLabUser};
use super::GitLabNormalizer;
use crate::model::{
    Commit, Issue, ListPullRequestsOptions, PullRequest, RepositoryInfo, UserInfo,
};
use crate::services::normalizer::decode;
use crate::services::{
    flatten_pages, ResponseNormalizer, Transport, VcsError, VcsFuture, VcsService,
};

const PROVIDER: &str = "gitlab";
const PER_PAGE: &str = "100";

/// Commit detail requests in flight at once while expanding a merge request.
const COMMIT_DETAIL_CONCURRENCY: usize = 8;

/// GitLab facade.
///
/// The project and its owning group (or user namespace) are resolved once per
/// `owner/repo` and cached for the lifetime of the service.
pub struct GitLabService {
    transport: Arc<dyn Transport>,
    normalizer: GitLabNormalizer,
    repositories: Mutex<HashMap<String, Arc<OnceCell<RepositoryInfo>>>>,
}

impl GitLabService {
    /// Creates a service over `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            normalizer: GitLabNormalizer,
            repositories: Mutex::new(HashMap::new()),
        }
    }

    fn project_path(owner: &str, repo: &str) -> String {
        format!(
            "/projects/{}",
            urlencoding::encode(&format!("{owner}/{repo}"))
        )
    }

    /// Returns the cached repository context, resolving it on first use.
    pub async fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo, VcsError> {
        let cell = {
            let mut cache = self
                .repositories
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(format!("{owner}/{repo}")).or_default())
        };
        cell.get_or_try_init(|| self.resolve_repository(owner, repo))
            .await
            .cloned()
    }

    async fn resolve_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryInfo, VcsError> {
        debug!(owner, repo, "Resolving GitLab project and namespace");
        let project_path = Self::project_path(owner, repo);
        let (project, namespace) = tokio::try_join!(
            self.transport.get(&project_path, &[]),
            self.resolve_namespace(owner),
        )?;
        let project: GitLabProject = decode(PROVIDER, "project", &project)?;

        Ok(RepositoryInfo {
            id: project.id.to_string(),
            name: project.name,
            url: project.web_url,
            owner: namespace,
        })
    }

    async fn resolve_namespace(&self, owner: &str) -> Result<UserInfo, VcsError> {
        let group_path = format!("/groups/{}", urlencoding::encode(owner));
        match self.transport.get(&group_path, &[]).await {
            Ok(raw) => {
                let group: GitLabGroup = decode(PROVIDER, "group", &raw)?;
                Ok(UserInfo {
                    id: group.id.to_string(),
                    login: group.full_path,
                    url: group.web_url,
                })
            }
            Err(VcsError::NotFound(_)) => {
                debug!(owner, "No GitLab group, falling back to user namespace");
                let raw = self
                    .transport
                    .get("/users", &[("username", owner.to_string())])
                    .await?;
                let users: Vec<GitLabUser> = decode(PROVIDER, "user list", &raw)?;
                users
                    .into_iter()
                    .next()
                    .map(UserInfo::from)
                    .ok_or_else(|| VcsError::NotFound(format!("GitLab namespace '{owner}'")))
            }
            Err(e) => Err(e),
        }
    }

    async fn list(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, VcsError> {
        flatten_pages(PROVIDER, self.transport.get_paginated(path, params).await?)
    }

    async fn commit_detail(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit, VcsError> {
        let path = format!(
            "{}/repository/commits/{}",
            Self::project_path(owner, repo),
            urlencoding::encode(sha)
        );
        let raw = self.transport.get(&path, &[]).await?;
        self.normalizer.to_commit(&raw)
    }
}

impl VcsService for GitLabService {
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
            let path = format!("{}/merge_requests", Self::project_path(owner, repo));
            let state = GitLabPullRequestState::from(options.state);
            let params = [
                ("state", state.as_str().to_string()),
                ("per_page", PER_PAGE.to_string()),
            ];
            let (repository, items) =
                tokio::try_join!(self.repository(owner, repo), self.list(&path, &params))?;
            items
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
            let path = format!(
                "{}/merge_requests/{number}",
                Self::project_path(owner, repo)
            );
            let (repository, raw) = tokio::try_join!(
                self.repository(owner, repo),
                self.transport.get(&path, &[])
            )?;
            self.normalizer.to_pull_request(&raw, &repository)
        })
    }

    fn list_pull_commits<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> VcsFuture<'a, Vec<Commit>> {
        Box::pin(async move {
            let path = format!(
                "{}/merge_requests/{number}/commits",
                Self::project_path(owner, repo)
            );
            let items = self
                .list(&path, &[("per_page", PER_PAGE.to_string())])
                .await?;
            let shas = items
                .iter()
                .map(|item| {
                    item.get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| {
                            VcsError::malformed(PROVIDER, "merge request commit without id")
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            debug!(
                owner,
                repo,
                number,
                commits = shas.len(),
                "Fetching merge request commit details"
            );
            let details: Vec<_> = shas
                .iter()
                .map(|sha| self.commit_detail(owner, repo, sha))
                .collect();
            stream::iter(details)
                .buffered(COMMIT_DETAIL_CONCURRENCY)
                .try_collect()
                .await
        })
    }

    fn get_commit<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        sha: &'a str,
    ) -> VcsFuture<'a, Commit> {
        Box::pin(self.commit_detail(owner, repo, sha))
    }

    fn list_repo_commits<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
    ) -> VcsFuture<'a, Vec<Commit>> {
        Box::pin(async move {
            let path = format!("{}/repository/commits", Self::project_path(owner, repo));
            self.list(&path, &[("per_page", PER_PAGE.to_string())])
                .await?
                .iter()
                .map(|raw| self.normalizer.to_commit(raw))
                .collect()
        })
    }

    fn get_issue<'a>(&'a self, owner: &'a str, repo: &'a str, number: u64) -> VcsFuture<'a, Issue> {
        Box::pin(async move {
            let path = format!("{}/issues/{number}", Self::project_path(owner, repo));
            let raw = self.transport.get(&path, &[]).await?;
            self.normalizer.to_issue(&raw)
        })
    }

    fn list_issues<'a>(&'a self, owner: &'a str, repo: &'a str) -> VcsFuture<'a, Vec<Issue>> {
        Box::pin(async move {
            let path = format!("{}/issues", Self::project_path(owner, repo));
            self.list(&path, &[("per_page", PER_PAGE.to_string())])
                .await?
                .iter()
                .map(|raw| self.normalizer.to_issue(raw))
                .collect()
        })
    }
}
