//! Bitbucket payloads to unified records.
//!
//! Bitbucket reports no close or merge timestamps; those fields stay empty.

use serde_json::Value;

use super::types::{
    split_author, BitbucketCommit, BitbucketIssue, BitbucketPullRequest, BitbucketRepository,
    BitbucketUser,
};
use crate::model::{Commit, CommitAuthor, Issue, ItemState, PullRequest, RepositoryInfo, UserInfo};
use crate::services::normalizer::{decode, map_state};
use crate::services::{ResponseNormalizer, VcsError};

const PROVIDER: &str = "bitbucket";

const PULL_REQUEST_STATES: &[(&str, ItemState)] = &[
    ("OPEN", ItemState::Open),
    ("MERGED", ItemState::Merged),
    ("DECLINED", ItemState::Closed),
    ("SUPERSEDED", ItemState::Closed),
];

const ISSUE_STATES: &[(&str, ItemState)] = &[
    ("new", ItemState::Open),
    ("open", ItemState::Open),
    ("on hold", ItemState::Open),
    ("resolved", ItemState::Closed),
    ("closed", ItemState::Closed),
    ("invalid", ItemState::Closed),
    ("duplicate", ItemState::Closed),
    ("wontfix", ItemState::Closed),
];

/// Adapter for Bitbucket pull requests, commits and issues.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitbucketNormalizer;

impl From<BitbucketUser> for UserInfo {
    fn from(user: BitbucketUser) -> Self {
        Self {
            id: user.uuid,
            login: user.nickname.or(user.display_name).unwrap_or_default(),
            url: user.links.html_url(),
        }
    }
}

impl From<BitbucketRepository> for RepositoryInfo {
    fn from(repo: BitbucketRepository) -> Self {
        Self {
            id: repo.uuid,
            name: repo.name,
            url: repo.links.html_url(),
            owner: repo.owner.map(UserInfo::from).unwrap_or_default(),
        }
    }
}

impl ResponseNormalizer for BitbucketNormalizer {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn to_pull_request(&self, raw: &Value, repo: &RepositoryInfo) -> Result<PullRequest, VcsError> {
        let pr: BitbucketPullRequest = decode(PROVIDER, "pull request", raw)?;
        let base = pr
            .destination
            .and_then(|d| d.repository)
            .map_or_else(|| repo.clone(), RepositoryInfo::from);

        Ok(PullRequest {
            id: pr.id.to_string(),
            number: pr.id,
            title: pr.title,
            body: pr.description.unwrap_or_default(),
            url: pr.links.html_url(),
            state: map_state(PROVIDER, PULL_REQUEST_STATES, &pr.state)?,
            user: pr.author.into(),
            created_at: pr.created_on,
            updated_at: pr.updated_on,
            closed_at: None,
            merged_at: None,
            base,
            raw: raw.clone(),
        })
    }

    fn to_commit(&self, raw: &Value) -> Result<Commit, VcsError> {
        let commit: BitbucketCommit = decode(PROVIDER, "commit", raw)?;
        let (name, email) = split_author(&commit.author.raw);
        let author = CommitAuthor {
            name,
            email,
            date: commit.date,
        };

        Ok(Commit {
            sha: commit.hash,
            url: commit.links.html_url(),
            message: commit.message,
            committer: author.clone(),
            author,
            parents: commit.parents.into_iter().map(|p| p.hash).collect(),
            stats: None,
            raw: raw.clone(),
        })
    }

    fn to_issue(&self, raw: &Value) -> Result<Issue, VcsError> {
        let issue: BitbucketIssue = decode(PROVIDER, "issue", raw)?;
        Ok(Issue {
            id: issue.id.to_string(),
            number: issue.id,
            title: issue.title,
            body: issue.content.map(|c| c.raw).unwrap_or_default(),
            url: issue.links.html_url(),
            state: map_state(PROVIDER, ISSUE_STATES, &issue.state)?,
            user: issue.reporter.map(UserInfo::from).unwrap_or_default(),
            created_at: issue.created_on,
            updated_at: issue.updated_on,
            closed_at: None,
            comments: 0,
            raw: raw.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    const REPO_URL: &str = "https://bitbucket.org/atlassian/python-bitbucket";

    fn user() -> Value {
        json!({
            "uuid": "{d301aafa-d676-4ee0-88be-962be7417567}",
            "display_name": "Erik van Zijst",
            "nickname": "evzijst",
            "links": {
                "html": {
                    "href": "https://bitbucket.org/%7Bd301aafa-d676-4ee0-88be-962be7417567%7D/"
                }
            }
        })
    }

    pub(crate) fn pull_request(id: u64, state: &str) -> Value {
        json!({
            "id": id,
            "title": "Add README",
            "description": "",
            "state": state,
            "author": user(),
            "created_on": "2019-05-03T09:14:17.614544+00:00",
            "updated_on": "2019-05-03T09:15:02.208377+00:00",
            "links": {
                "html": {"href": format!("{REPO_URL}/pull-requests/{id}")}
            },
            "destination": {
                "branch": {"name": "master"},
                "repository": {
                    "uuid": "{3f630668-2d1b-4b3a-9b4d-5b4c6c8b3d7a}",
                    "name": "python-bitbucket",
                    "full_name": "atlassian/python-bitbucket",
                    "links": {"html": {"href": "https://bitbucket.org/atlassian/python-bitbucket"}}
                }
            }
        })
    }

    pub(crate) fn commit(hash: &str) -> Value {
        json!({
            "hash": hash,
            "message": "Initial commit\n",
            "date": "2019-05-02T17:54:24+00:00",
            "author": {"raw": "Erik van Zijst <erik.van.zijst@gmail.com>", "user": user()},
            "parents": [],
            "links": {"html": {"href": format!("{REPO_URL}/commits/{hash}")}}
        })
    }

    pub(crate) fn issue(id: u64, state: &str) -> Value {
        json!({
            "id": id,
            "title": "Crash on start",
            "content": {"raw": "Steps to reproduce", "markup": "markdown"},
            "state": state,
            "reporter": user(),
            "created_on": "2019-05-01T10:00:00.000000+00:00",
            "updated_on": null,
            "links": {"html": {"href": format!("{REPO_URL}/issues/{id}")}}
        })
    }

    #[test]
    fn pull_request_states() {
        let repo = RepositoryInfo::default();
        for (raw, unified) in PULL_REQUEST_STATES {
            let pr = BitbucketNormalizer
                .to_pull_request(&pull_request(1, raw), &repo)
                .unwrap();
            assert_eq!(pr.state, *unified);
            assert!(pr.merged_at.is_none());
        }
        assert!(BitbucketNormalizer
            .to_pull_request(&pull_request(1, "open"), &repo)
            .is_err());
    }

    #[test]
    fn issue_states() {
        for (raw, unified) in ISSUE_STATES {
            let mapped = BitbucketNormalizer.to_issue(&issue(5, raw)).unwrap();
            assert_eq!(mapped.state, *unified);
        }
        assert!(BitbucketNormalizer.to_issue(&issue(5, "triaged")).is_err());
    }

    #[test]
    fn pull_request_fields() {
        let pr = BitbucketNormalizer
            .to_pull_request(&pull_request(7, "OPEN"), &RepositoryInfo::default())
            .unwrap();
        assert_eq!(pr.number, 7);
        assert_eq!(pr.user.login, "evzijst");
        assert_eq!(pr.base.name, "python-bitbucket");
        assert!(pr.url.ends_with("/pull-requests/7"));
    }

    #[test]
    fn commit_author_is_split() {
        let c = BitbucketNormalizer.to_commit(&commit("e7d8f2a")).unwrap();
        assert_eq!(c.author.name, "Erik van Zijst");
        assert_eq!(c.author.email, "erik.van.zijst@gmail.com");
        assert_eq!(c.committer, c.author);
        assert!(c.stats.is_none());
    }
}
