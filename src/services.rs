//! Hosted VCS providers behind one facade.
//!
//! Each provider has a pure [`ResponseNormalizer`] that maps raw payloads to
//! the unified [`model`](crate::model) records and a service implementing
//! [`VcsService`] on top of an injected [`Transport`].

pub mod bitbucket;
pub mod error;
pub mod github;
pub mod gitlab;
pub mod normalizer;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bitbucket::BitbucketService;
pub use error::VcsError;
pub use github::GitHubService;
pub use gitlab::GitLabService;
pub use normalizer::ResponseNormalizer;
pub use transport::{HttpTransport, Transport, VcsFuture};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::model::{Commit, Issue, ListPullRequestsOptions, PullRequest};

/// Provider-agnostic operations over pull requests, commits and issues.
///
/// `owner` is the user, organisation, group (GitLab: possibly nested,
/// `a/b`) or workspace; `repo` is the repository name.
pub trait VcsService: Send + Sync {
    /// Short provider name (`gitlab`, `github`, `bitbucket`).
    fn provider_name(&self) -> &'static str;

    /// Lists pull requests matching `options`, following pagination.
    fn list_pull_requests<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        options: &'a ListPullRequestsOptions,
    ) -> VcsFuture<'a, Vec<PullRequest>>;

    /// Fetches one pull request by number.
    fn get_pull_request<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> VcsFuture<'a, PullRequest>;

    /// Lists the commits of a pull request.
    fn list_pull_commits<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> VcsFuture<'a, Vec<Commit>>;

    /// Fetches one commit by SHA.
    fn get_commit<'a>(&'a self, owner: &'a str, repo: &'a str, sha: &'a str)
        -> VcsFuture<'a, Commit>;

    /// Lists commits of the default branch.
    fn list_repo_commits<'a>(&'a self, owner: &'a str, repo: &'a str)
        -> VcsFuture<'a, Vec<Commit>>;

    /// Fetches one issue by number.
    fn get_issue<'a>(&'a self, owner: &'a str, repo: &'a str, number: u64)
        -> VcsFuture<'a, Issue>;

    /// Lists issues (never pull requests).
    fn list_issues<'a>(&'a self, owner: &'a str, repo: &'a str) -> VcsFuture<'a, Vec<Issue>>;
}

/// Supported hosting providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// GitLab (REST v4).
    GitLab,
    /// GitHub (REST v3).
    GitHub,
    /// Bitbucket Cloud (REST 2.0).
    Bitbucket,
}

impl ProviderKind {
    /// Lowercase provider name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::GitLab => "gitlab",
            Self::GitHub => "github",
            Self::Bitbucket => "bitbucket",
        }
    }

    /// API base of the public SaaS instance.
    pub const fn default_api_base(self) -> &'static str {
        match self {
            Self::GitLab => "https://gitlab.com/api/v4",
            Self::GitHub => "https://api.github.com",
            Self::Bitbucket => "https://api.bitbucket.org/2.0",
        }
    }

    /// Environment variable holding the access token.
    pub const fn token_env_var(self) -> &'static str {
        match self {
            Self::GitLab => "GITLAB_TOKEN",
            Self::GitHub => "GITHUB_TOKEN",
            Self::Bitbucket => "BITBUCKET_TOKEN",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = VcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gitlab" => Ok(Self::GitLab),
            "github" => Ok(Self::GitHub),
            "bitbucket" => Ok(Self::Bitbucket),
            other => Err(VcsError::InvalidRepositoryUri(format!(
                "unsupported provider: {other}"
            ))),
        }
    }
}

/// Runtime configuration for a provider facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Which provider to talk to.
    pub kind: ProviderKind,
    /// API base, e.g. `https://gitlab.com/api/v4`.
    pub api_base: String,
    /// Access token, if any.
    pub token: Option<String>,
}

impl ProviderConfig {
    /// Configuration for the public instance of `kind`.
    pub fn new(kind: ProviderKind, token: Option<String>) -> Self {
        Self {
            kind,
            api_base: kind.default_api_base().to_string(),
            token,
        }
    }
}

/// Builds the facade for `config` over an HTTP transport.
pub fn create_vcs_service(config: ProviderConfig) -> Result<Arc<dyn VcsService>, VcsError> {
    debug!(provider = %config.kind, api_base = %config.api_base, "Creating VCS service");
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        config.kind,
        config.api_base,
        config.token,
    )?);
    Ok(match config.kind {
        ProviderKind::GitLab => Arc::new(GitLabService::new(transport)),
        ProviderKind::GitHub => Arc::new(GitHubService::new(transport)),
        ProviderKind::Bitbucket => Arc::new(BitbucketService::new(transport)),
    })
}

/// Concatenates the array pages of a listing.
pub(crate) fn flatten_pages(
    provider: &'static str,
    pages: Vec<Value>,
) -> Result<Vec<Value>, VcsError> {
    let mut items = Vec::new();
    for page in pages {
        match page {
            Value::Array(values) => items.extend(values),
            other => {
                return Err(VcsError::malformed(
                    provider,
                    format!("expected a JSON array page, got {}", json_kind(&other)),
                ))
            }
        }
    }
    Ok(items)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn provider_kind_round_trip() {
        for kind in [ProviderKind::GitLab, ProviderKind::GitHub, ProviderKind::Bitbucket] {
            assert_eq!(kind.name().parse::<ProviderKind>().unwrap(), kind);
        }
        assert!("gitea".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn flatten_preserves_order() {
        let items = flatten_pages("github", vec![json!([1, 2]), json!([]), json!([3])]).unwrap();
        assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn flatten_rejects_object_pages() {
        assert!(matches!(
            flatten_pages("gitlab", vec![json!({"message": "nope"})]),
            Err(VcsError::MalformedResponse { provider: "gitlab", .. })
        ));
    }

    #[test]
    fn factory_builds_requested_provider() {
        for kind in [ProviderKind::GitLab, ProviderKind::GitHub, ProviderKind::Bitbucket] {
            let service = create_vcs_service(ProviderConfig::new(kind, None)).unwrap();
            assert_eq!(service.provider_name(), kind.name());
        }
    }
}
