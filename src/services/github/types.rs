//! GitHub payload shapes and filter vocabulary.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::model::PullRequestState;

/// Pull request `state` filter accepted by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubPullRequestState {
    /// `open`
    Open,
    /// `closed` (merged pull requests included)
    Closed,
    /// `all`
    All,
}

impl GitHubPullRequestState {
    /// Query parameter value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl From<PullRequestState> for GitHubPullRequestState {
    fn from(state: PullRequestState) -> Self {
        match state {
            PullRequestState::Open => Self::Open,
            PullRequestState::Closed => Self::Closed,
            PullRequestState::All => Self::All,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubRepository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub html_url: String,
    pub owner: GitHubUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubBranch {
    pub repo: Option<GitHubRepository>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubPullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub state: String,
    pub user: GitHubUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub base: Option<GitHubBranch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubSignature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubCommitDetail {
    pub message: String,
    pub author: Option<GitHubSignature>,
    pub committer: Option<GitHubSignature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubParent {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubCommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: GitHubCommitDetail,
    #[serde(default)]
    pub parents: Vec<GitHubParent>,
    pub stats: Option<GitHubCommitStats>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub state: String,
    pub user: GitHubUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: u64,
}

/// Whether an issue listing entry is really a pull request.
pub(crate) fn is_pull_request(raw: &Value) -> bool {
    raw.get("pull_request").is_some_and(|v| !v.is_null())
}
