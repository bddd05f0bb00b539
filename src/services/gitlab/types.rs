//! GitLab payload shapes and filter vocabulary.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::PullRequestState;

/// Merge request `state` filter accepted by GitLab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitLabPullRequestState {
    /// `opened`
    Opened,
    /// `closed`
    Closed,
    /// `all`
    All,
}

impl GitLabPullRequestState {
    /// Query parameter value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl From<PullRequestState> for GitLabPullRequestState {
    fn from(state: PullRequestState) -> Self {
        match state {
            PullRequestState::Open => Self::Opened,
            PullRequestState::Closed => Self::Closed,
            PullRequestState::All => Self::All,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitLabUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitLabProject {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitLabGroup {
    pub id: u64,
    pub full_path: String,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitLabMergeRequest {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub description: Option<String>,
    pub web_url: String,
    pub state: String,
    pub author: GitLabUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitLabCommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitLabCommit {
    pub id: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub authored_date: Option<DateTime<Utc>>,
    pub committer_name: Option<String>,
    pub committer_email: Option<String>,
    pub committed_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    pub stats: Option<GitLabCommitStats>,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitLabIssue {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub description: Option<String>,
    pub web_url: String,
    pub state: String,
    pub author: GitLabUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_notes_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_filter_translation() {
        assert_eq!(
            GitLabPullRequestState::from(PullRequestState::Open).as_str(),
            "opened"
        );
        assert_eq!(
            GitLabPullRequestState::from(PullRequestState::Closed).as_str(),
            "closed"
        );
        assert_eq!(
            GitLabPullRequestState::from(PullRequestState::All).as_str(),
            "all"
        );
    }
}
