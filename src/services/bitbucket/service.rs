//! [`VcsService`] over the Bitbucket Cloud REST API.

use std::sync::Arc;

use serde_json::Value;

use super::types::BitbucketPullRequestState;
use super::BitbucketNormalizer;
use crate::model::{Commit, Issue, ListPullRequestsOptions, PullRequest, RepositoryInfo, UserInfo};
use crate::services::{json_kind, ResponseNormalizer, Transport, VcsError, VcsFuture, VcsService};

const PROVIDER: &str = "bitbucket";
const PAGE_LEN: &str = "50";

/// Bitbucket facade. `owner` is the workspace.
pub struct BitbucketService {
    transport: Arc<dyn Transport>,
    normalizer: BitbucketNormalizer,
}

impl BitbucketService {
    /// Creates a service over `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            normalizer: BitbucketNormalizer,
        }
    }

    fn repo_path(workspace: &str, repo: &str) -> String {
        format!(
            "/repositories/{}/{}",
            urlencoding::encode(workspace),
            urlencoding::encode(repo)
        )
    }

    fn repository(workspace: &str, repo: &str) -> RepositoryInfo {
        RepositoryInfo {
            id: String::new(),
            name: repo.to_string(),
            url: String::new(),
            owner: UserInfo {
                id: String::new(),
                login: workspace.to_string(),
                url: String::new(),
            },
        }
    }

    /// Fetches every page and concatenates their `values`.
    async fn list(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, VcsError> {
        let pages = self.transport.get_paginated(path, params).await?;
        let mut items = Vec::new();
        for page in pages {
            match page {
                Value::Object(mut body) => match body.remove("values") {
                    Some(Value::Array(values)) => items.extend(values),
                    _ => return Err(VcsError::malformed(PROVIDER, "page without a values array")),
                },
                other => {
                    return Err(VcsError::malformed(
                        PROVIDER,
                        format!("expected a paged object, got {}", json_kind(&other)),
                    ))
                }
            }
        }
        Ok(items)
    }

    async fn list_commits(&self, path: &str) -> Result<Vec<Commit>, VcsError> {
        self.list(path, &[("pagelen", PAGE_LEN.to_string())])
            .await?
            .iter()
            .map(|raw| self.normalizer.to_commit(raw))
            .collect()
    }
}

impl VcsService for BitbucketService {
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
            let path = format!("{}/pullrequests", Self::repo_path(owner, repo));
            let states = BitbucketPullRequestState::filter_for(options.state);
            let mut params: Vec<(&str, String)> = states
                .iter()
                .map(|s| ("state", s.as_str().to_string()))
                .collect();
            params.push(("pagelen", PAGE_LEN.to_string()));

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
            let path = format!("{}/pullrequests/{number}", Self::repo_path(owner, repo));
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
            let path = format!(
                "{}/pullrequests/{number}/commits",
                Self::repo_path(owner, repo)
            );
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
                "{}/commit/{}",
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
            self.list(&path, &[("pagelen", PAGE_LEN.to_string())])
                .await?
                .iter()
                .map(|raw| self.normalizer.to_issue(raw))
                .collect()
        })
    }
}
