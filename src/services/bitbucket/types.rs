//! Bitbucket payload shapes and filter vocabulary.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::PullRequestState;

/// Pull request `state` values accepted by Bitbucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitbucketPullRequestState {
    /// `OPEN`
    Open,
    /// `MERGED`
    Merged,
    /// `DECLINED`
    Declined,
    /// `SUPERSEDED`
    Superseded,
}

impl BitbucketPullRequestState {
    /// Query parameter value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
            Self::Declined => "DECLINED",
            Self::Superseded => "SUPERSEDED",
        }
    }

    /// Bitbucket states covered by a unified filter.
    pub const fn filter_for(state: PullRequestState) -> &'static [Self] {
        match state {
            PullRequestState::Open => &[Self::Open],
            PullRequestState::Closed => &[Self::Merged, Self::Declined, Self::Superseded],
            PullRequestState::All => &[Self::Open, Self::Merged, Self::Declined, Self::Superseded],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketHref {
    pub href: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BitbucketLinks {
    pub html: Option<BitbucketHref>,
}

impl BitbucketLinks {
    pub fn html_url(self) -> String {
        self.html.map(|h| h.href).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketUser {
    #[serde(default)]
    pub uuid: String,
    pub display_name: Option<String>,
    pub nickname: Option<String>,
    #[serde(default)]
    pub links: BitbucketLinks,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketRepository {
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub links: BitbucketLinks,
    pub owner: Option<BitbucketUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketEndpoint {
    pub repository: Option<BitbucketRepository>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketPullRequest {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub author: BitbucketUser,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: BitbucketLinks,
    pub destination: Option<BitbucketEndpoint>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketCommitAuthor {
    pub raw: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketParent {
    pub hash: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketCommit {
    pub hash: String,
    #[serde(default)]
    pub message: String,
    pub date: DateTime<Utc>,
    pub author: BitbucketCommitAuthor,
    #[serde(default)]
    pub parents: Vec<BitbucketParent>,
    #[serde(default)]
    pub links: BitbucketLinks,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BitbucketContent {
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketIssue {
    pub id: u64,
    pub title: String,
    pub content: Option<BitbucketContent>,
    pub state: String,
    pub reporter: Option<BitbucketUser>,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: BitbucketLinks,
}

/// Splits a `Name <email>` author string.
pub(crate) fn split_author(raw: &str) -> (String, String) {
    match raw.rsplit_once('<') {
        Some((name, rest)) => (
            name.trim().to_string(),
            rest.trim_end().trim_end_matches('>').trim().to_string(),
        ),
        None => (raw.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_table() {
        assert_eq!(
            BitbucketPullRequestState::filter_for(PullRequestState::Open),
            &[BitbucketPullRequestState::Open]
        );
        assert_eq!(
            BitbucketPullRequestState::filter_for(PullRequestState::Closed)
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
            vec!["MERGED", "DECLINED", "SUPERSEDED"]
        );
        assert_eq!(
            BitbucketPullRequestState::filter_for(PullRequestState::All).len(),
            4
        );
    }

    #[test]
    fn author_strings() {
        assert_eq!(
            split_author("Erik van Zijst <erik.van.zijst@gmail.com>"),
            (
                "Erik van Zijst".to_string(),
                "erik.van.zijst@gmail.com".to_string()
            )
        );
        assert_eq!(
            split_author("buildbot"),
            ("buildbot".to_string(), String::new())
        );
    }
}
