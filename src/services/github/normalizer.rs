//! GitHub payloads to unified records.

use serde_json::Value;

use super::types::{
    GitHubCommit, GitHubIssue, GitHubPullRequest, GitHubRepository, GitHubSignature, GitHubUser,
};
use crate::model::{
    Commit, CommitAuthor, CommitStats, Issue, ItemState, PullRequest, RepositoryInfo, UserInfo,
};
use crate::services::normalizer::{decode, map_state};
use crate::services::{ResponseNormalizer, VcsError};

const PROVIDER: &str = "github";

const ISSUE_STATES: &[(&str, ItemState)] =
    &[("open", ItemState::Open), ("closed", ItemState::Closed)];

/// Adapter for GitHub pull requests, commits and issues.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubNormalizer;

impl From<GitHubUser> for UserInfo {
    fn from(user: GitHubUser) -> Self {
        Self {
            id: user.id.to_string(),
            login: user.login,
            url: user.html_url,
        }
    }
}

impl From<GitHubRepository> for RepositoryInfo {
    fn from(repo: GitHubRepository) -> Self {
        Self {
            id: repo.id.to_string(),
            name: repo.name,
            url: repo.html_url,
            owner: repo.owner.into(),
        }
    }
}

impl From<GitHubSignature> for CommitAuthor {
    fn from(signature: GitHubSignature) -> Self {
        Self {
            name: signature.name,
            email: signature.email,
            date: signature.date,
        }
    }
}

/// `closed` splits on `merged_at`; everything else goes through the table.
fn pull_request_state(pr: &GitHubPullRequest) -> Result<ItemState, VcsError> {
    match pr.state.as_str() {
        "open" => Ok(ItemState::Open),
        "closed" if pr.merged_at.is_some() => Ok(ItemState::Merged),
        "closed" => Ok(ItemState::Closed),
        other => Err(VcsError::malformed(PROVIDER, format!("unknown state '{other}'"))),
    }
}

impl ResponseNormalizer for GitHubNormalizer {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    /// The payload's own `base.repo` wins over `repo` when present.
    fn to_pull_request(&self, raw: &Value, repo: &RepositoryInfo) -> Result<PullRequest, VcsError> {
        let pr: GitHubPullRequest = decode(PROVIDER, "pull request", raw)?;
        let state = pull_request_state(&pr)?;
        let base = pr
            .base
            .and_then(|b| b.repo)
            .map_or_else(|| repo.clone(), RepositoryInfo::from);

        Ok(PullRequest {
            id: pr.id.to_string(),
            number: pr.number,
            title: pr.title,
            body: pr.body.unwrap_or_default(),
            url: pr.html_url,
            state,
            user: pr.user.into(),
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            closed_at: pr.closed_at,
            merged_at: pr.merged_at,
            base,
            raw: raw.clone(),
        })
    }

    fn to_commit(&self, raw: &Value) -> Result<Commit, VcsError> {
        let commit: GitHubCommit = decode(PROVIDER, "commit", raw)?;
        let author: CommitAuthor = commit
            .commit
            .author
            .ok_or_else(|| {
                VcsError::malformed(PROVIDER, format!("commit {} has no author", commit.sha))
            })?
            .into();
        let committer = commit
            .commit
            .committer
            .map_or_else(|| author.clone(), CommitAuthor::from);

        Ok(Commit {
            sha: commit.sha,
            url: commit.html_url,
            message: commit.commit.message,
            author,
            committer,
            parents: commit.parents.into_iter().map(|p| p.sha).collect(),
            stats: commit.stats.map(|s| CommitStats {
                additions: s.additions,
                deletions: s.deletions,
                total: s.total,
            }),
            raw: raw.clone(),
        })
    }

    fn to_issue(&self, raw: &Value) -> Result<Issue, VcsError> {
        let issue: GitHubIssue = decode(PROVIDER, "issue", raw)?;
        Ok(Issue {
            id: issue.id.to_string(),
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            url: issue.html_url,
            state: map_state(PROVIDER, ISSUE_STATES, &issue.state)?,
            user: issue.user.into(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            closed_at: issue.closed_at,
            comments: issue.comments,
            raw: raw.clone(),
        })
    }
}
