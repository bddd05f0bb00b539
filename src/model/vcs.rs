//! Unified, provider-agnostic VCS records.
//!
//! Every record keeps the untouched provider payload in `raw`; it is never
//! serialized and never mutated after normalization.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized lifecycle state of a pull request or issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    /// Open (includes reopened and transiently locked items).
    Open,
    /// Closed without being merged.
    Closed,
    /// Merged (pull requests only).
    Merged,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Provider-agnostic pull request list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Only open pull requests.
    #[default]
    Open,
    /// Only closed pull requests.
    Closed,
    /// Every pull request.
    All,
}

impl FromStr for PullRequestState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(format!("Unknown pull request state: {other}")),
        }
    }
}

/// Options for listing pull requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPullRequestsOptions {
    /// State filter.
    pub state: PullRequestState,
}

impl ListPullRequestsOptions {
    /// Options filtering on the given state.
    pub fn with_state(state: PullRequestState) -> Self {
        Self { state }
    }
}

/// A user or group account on the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserInfo {
    /// Provider id of the account.
    pub id: String,
    /// Login / username / group path.
    pub login: String,
    /// Web URL of the account.
    pub url: String,
}

/// Repository a pull request targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepositoryInfo {
    /// Provider id of the repository.
    pub id: String,
    /// Repository name.
    pub name: String,
    /// Web URL of the repository.
    pub url: String,
    /// Owning user or group.
    pub owner: UserInfo,
}

/// Unified pull request (GitLab merge request, GitHub/Bitbucket pull request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Provider-global id.
    pub id: String,
    /// Repository-scoped number (GitLab `iid`).
    pub number: u64,
    /// Title.
    pub title: String,
    /// Description body.
    #[serde(default)]
    pub body: String,
    /// Web URL.
    pub url: String,
    /// Normalized state.
    pub state: ItemState,
    /// Author.
    pub user: UserInfo,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Close timestamp.
    pub closed_at: Option<DateTime<Utc>>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
    /// Target repository.
    pub base: RepositoryInfo,
    /// Raw provider payload.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

/// Author or committer identity of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Display name.
    pub name: String,
    /// E-mail address (may be empty when the provider hides it).
    pub email: String,
    /// Authored/committed timestamp.
    pub date: DateTime<Utc>,
}

/// Line statistics of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    /// Added lines.
    pub additions: u64,
    /// Deleted lines.
    pub deletions: u64,
    /// Total changed lines.
    pub total: u64,
}

/// Unified commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit SHA.
    pub sha: String,
    /// Web URL.
    pub url: String,
    /// Full commit message.
    pub message: String,
    /// Author identity.
    pub author: CommitAuthor,
    /// Committer identity.
    pub committer: CommitAuthor,
    /// Parent SHAs, in provider order.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Line statistics when the provider returns them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CommitStats>,
    /// Raw provider payload.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

/// Unified issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Provider-global id.
    pub id: String,
    /// Repository-scoped number (GitLab `iid`).
    pub number: u64,
    /// Title.
    pub title: String,
    /// Description body.
    #[serde(default)]
    pub body: String,
    /// Web URL.
    pub url: String,
    /// Normalized state (never `merged`).
    pub state: ItemState,
    /// Author.
    pub user: UserInfo,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Close timestamp.
    pub closed_at: Option<DateTime<Utc>>,
    /// Number of comments/notes.
    pub comments: u64,
    /// Raw provider payload.
    #[serde(skip)]
    pub raw: serde_json::Value,
}
