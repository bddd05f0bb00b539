//! GitLab payloads to unified records.

use serde_json::Value;

use super::types::{GitLabCommit, GitLabIssue, GitLabMergeRequest, GitLabUser};
use crate::model::{
    Commit, CommitAuthor, CommitStats, Issue, ItemState, PullRequest, RepositoryInfo, UserInfo,
};
use crate::services::normalizer::{decode, map_state};
use crate::services::{ResponseNormalizer, VcsError};

const PROVIDER: &str = "gitlab";

const MERGE_REQUEST_STATES: &[(&str, ItemState)] = &[
    ("opened", ItemState::Open),
    ("reopened", ItemState::Open),
    ("locked", ItemState::Open),
    ("closed", ItemState::Closed),
    ("merged", ItemState::Merged),
];

const ISSUE_STATES: &[(&str, ItemState)] = &[
    ("opened", ItemState::Open),
    ("reopened", ItemState::Open),
    ("closed", ItemState::Closed),
];

/// Adapter for GitLab merge requests, commits and issues.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLabNormalizer;

impl From<GitLabUser> for UserInfo {
    fn from(user: GitLabUser) -> Self {
        Self {
            id: user.id.to_string(),
            login: user.username,
            url: user.web_url,
        }
    }
}

impl ResponseNormalizer for GitLabNormalizer {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn to_pull_request(&self, raw: &Value, repo: &RepositoryInfo) -> Result<PullRequest, VcsError> {
        let mr: GitLabMergeRequest = decode(PROVIDER, "merge request", raw)?;
        Ok(PullRequest {
            id: mr.id.to_string(),
            number: mr.iid,
            title: mr.title,
            body: mr.description.unwrap_or_default(),
            url: mr.web_url,
            state: map_state(PROVIDER, MERGE_REQUEST_STATES, &mr.state)?,
            user: mr.author.into(),
            created_at: mr.created_at,
            updated_at: mr.updated_at,
            closed_at: mr.closed_at,
            merged_at: mr.merged_at,
            base: repo.clone(),
            raw: raw.clone(),
        })
    }

    fn to_commit(&self, raw: &Value) -> Result<Commit, VcsError> {
        let commit: GitLabCommit = decode(PROVIDER, "commit", raw)?;
        let authored = commit
            .authored_date
            .or(commit.created_at)
            .ok_or_else(|| {
                VcsError::malformed(PROVIDER, format!("commit {} has no date", commit.id))
            })?;

        let author = CommitAuthor {
            name: commit.author_name,
            email: commit.author_email,
            date: authored,
        };
        let committer = CommitAuthor {
            name: commit.committer_name.unwrap_or_else(|| author.name.clone()),
            email: commit
                .committer_email
                .unwrap_or_else(|| author.email.clone()),
            date: commit.committed_date.unwrap_or(authored),
        };

        Ok(Commit {
            sha: commit.id,
            url: commit.web_url,
            message: commit.message,
            author,
            committer,
            parents: commit.parent_ids,
            stats: commit.stats.map(|s| CommitStats {
                additions: s.additions,
                deletions: s.deletions,
                total: s.total,
            }),
            raw: raw.clone(),
        })
    }

    fn to_issue(&self, raw: &Value) -> Result<Issue, VcsError> {
        let issue: GitLabIssue = decode(PROVIDER, "issue", raw)?;
        Ok(Issue {
            id: issue.id.to_string(),
            number: issue.iid,
            title: issue.title,
            body: issue.description.unwrap_or_default(),
            url: issue.web_url,
            state: map_state(PROVIDER, ISSUE_STATES, &issue.state)?,
            user: issue.author.into(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            closed_at: issue.closed_at,
            comments: issue.user_notes_count,
            raw: raw.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    pub(crate) fn merge_request(iid: u64, state: &str) -> Value {
        json!({
            "id": 39_000_000 + iid,
            "iid": iid,
            "project_id": 278_964,
            "title": "Resolve \"Pipeline graph\"",
            "description": "Closes #207825",
            "state": state,
            "created_at": "2019-10-22T12:21:43.539Z",
            "updated_at": "2019-10-22T13:24:19.000Z",
            "merged_at": null,
            "closed_at": null,
            "author": {
                "id": 3_585,
                "username": "dimitrieh",
                "web_url": "https://gitlab.com/dimitrieh"
            },
            "web_url": format!("https://gitlab.com/gitlab-org/gitlab/merge_requests/{iid}")
        })
    }

    pub(crate) fn commit(sha: &str) -> Value {
        json!({
            "id": sha,
            "short_id": &sha[..8.min(sha.len())],
            "title": "Update pipeline graph",
            "message": "Update pipeline graph\n",
            "author_name": "Dimitrie Hoekstra",
            "author_email": "dimitrie@gitlab.com",
            "authored_date": "2019-10-22T12:20:01.000+02:00",
            "committer_name": "GitLab",
            "committer_email": "noreply@gitlab.com",
            "committed_date": "2019-10-22T12:20:01.000+02:00",
            "created_at": "2019-10-22T12:20:01.000+02:00",
            "parent_ids": ["a91957a858320c0e17f3a0eca7cfacbff50ea29a"],
            "stats": {"additions": 15, "deletions": 10, "total": 25},
            "web_url": format!("https://gitlab.com/gitlab-org/gitlab/-/commit/{sha}")
        })
    }

    pub(crate) fn issue(iid: u64, state: &str) -> Value {
        json!({
            "id": 27_000_000 + iid,
            "iid": iid,
            "title": "Pipeline graph is cut off",
            "description": null,
            "state": state,
            "created_at": "2019-10-01T08:00:00.000Z",
            "updated_at": "2019-10-02T08:00:00.000Z",
            "closed_at": null,
            "author": {"id": 1, "username": "root", "web_url": "https://gitlab.com/root"},
            "user_notes_count": 4,
            "web_url": format!("https://gitlab.com/gitlab-org/gitlab/issues/{iid}")
        })
    }

    #[test]
    fn merge_request_states() {
        let repo = RepositoryInfo::default();
        for (raw, unified) in MERGE_REQUEST_STATES {
            let pr = GitLabNormalizer
                .to_pull_request(&merge_request(1, raw), &repo)
                .unwrap();
            assert_eq!(pr.state, *unified);
        }
        assert!(GitLabNormalizer
            .to_pull_request(&merge_request(1, "draft"), &repo)
            .is_err());
    }

    #[test]
    fn merge_request_fields() {
        let repo = RepositoryInfo {
            id: "278964".to_string(),
            name: "GitLab".to_string(),
            url: "https://gitlab.com/gitlab-org/gitlab".to_string(),
            owner: UserInfo::default(),
        };
        let pr = GitLabNormalizer
            .to_pull_request(&merge_request(25_985, "opened"), &repo)
            .unwrap();
        assert_eq!(pr.number, 25_985);
        assert_eq!(pr.id, "39025985");
        assert_eq!(pr.user.login, "dimitrieh");
        assert_eq!(pr.body, "Closes #207825");
        assert_eq!(pr.base, repo);
        assert_eq!(pr.raw["iid"], 25_985);
    }

    #[test]
    fn commit_fields() {
        let c = GitLabNormalizer
            .to_commit(&commit("df760e1c0000000000000000000000000000000"))
            .unwrap();
        assert_eq!(c.author.name, "Dimitrie Hoekstra");
        assert_eq!(c.committer.name, "GitLab");
        assert_eq!(c.parents.len(), 1);
        assert_eq!(c.stats.unwrap().total, 25);
        assert_eq!(c.author.date.to_rfc3339(), "2019-10-22T10:20:01+00:00");
    }

    #[test]
    fn commit_without_any_date_is_malformed() {
        let mut raw = commit("abc");
        let obj = raw.as_object_mut().unwrap();
        obj.remove("authored_date");
        obj.remove("created_at");
        assert!(matches!(
            GitLabNormalizer.to_commit(&raw),
            Err(VcsError::MalformedResponse { provider: "gitlab", .. })
        ));
    }

    #[test]
    fn issue_fields() {
        let issue = GitLabNormalizer
            .to_issue(&issue(207_825, "opened"))
            .unwrap();
        assert_eq!(issue.state, ItemState::Open);
        assert_eq!(issue.number, 207_825);
        assert_eq!(issue.body, "");
        assert_eq!(issue.comments, 4);
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn normalization_is_deterministic(iid in 1u64..1_000_000, state_idx in 0usize..5) {
                let (state, _) = MERGE_REQUEST_STATES[state_idx];
                let raw = merge_request(iid, state);
                let repo = RepositoryInfo::default();
                let first = GitLabNormalizer.to_pull_request(&raw, &repo).unwrap();
                let second = GitLabNormalizer.to_pull_request(&raw, &repo).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
