//! Repository URLs to provider coordinates.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::services::{ProviderConfig, ProviderKind, VcsError};

/// A hosted repository: provider, API base and `owner/repo` coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUri {
    /// Hosting provider.
    pub provider: ProviderKind,
    /// REST API base for the host.
    pub api_base: String,
    /// Owner: user, organisation, workspace or (nested) GitLab group.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepositoryUri {
    /// Parses `uri`, inferring the provider from the host name unless given.
    ///
    /// Accepts `https://host/owner/repo[.git]`, GitLab `.../-/...` deep links
    /// and scp-style `git@host:owner/repo.git`.
    pub fn parse(uri: &str, provider: Option<ProviderKind>) -> Result<Self, VcsError> {
        let invalid = |reason: &str| VcsError::InvalidRepositoryUri(format!("{uri}: {reason}"));

        let url = Url::parse(&normalize_scp(uri.trim())).map_err(|e| invalid(&e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host"))?
            .to_lowercase();
        let provider = match provider {
            Some(provider) => provider,
            None => provider_for_host(&host)
                .ok_or_else(|| invalid("cannot infer provider from host"))?,
        };

        let path = url.path().trim_matches('/');
        let path = path.split("/-/").next().unwrap_or(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(invalid("expected owner/repo path"));
        }

        let (owner, repo) = match provider {
            ProviderKind::GitLab => {
                let (repo, groups) = segments
                    .split_last()
                    .ok_or_else(|| invalid("empty path"))?;
                (groups.join("/"), *repo)
            }
            ProviderKind::GitHub | ProviderKind::Bitbucket => {
                (segments[0].to_string(), segments[1])
            }
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if repo.is_empty() {
            return Err(invalid("empty repository name"));
        }

        Ok(Self {
            provider,
            api_base: api_base_for(provider, &url, &host),
            owner,
            repo: repo.to_string(),
        })
    }

    /// Provider configuration for this repository.
    pub fn provider_config(&self, token: Option<String>) -> ProviderConfig {
        ProviderConfig {
            kind: self.provider,
            api_base: self.api_base.clone(),
            token,
        }
    }
}

impl FromStr for RepositoryUri {
    type Err = VcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, None)
    }
}

impl fmt::Display for RepositoryUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.provider, self.owner, self.repo)
    }
}

/// Rewrites `git@host:owner/repo.git` as `ssh://git@host/owner/repo.git`.
fn normalize_scp(uri: &str) -> String {
    if uri.contains("://") {
        return uri.to_string();
    }
    match uri.split_once(':') {
        Some((user_host, path)) if user_host.contains('@') => {
            format!("ssh://{user_host}/{}", path.trim_start_matches('/'))
        }
        _ => uri.to_string(),
    }
}

fn provider_for_host(host: &str) -> Option<ProviderKind> {
    if host.contains("github") {
        Some(ProviderKind::GitHub)
    } else if host.contains("gitlab") {
        Some(ProviderKind::GitLab)
    } else if host.contains("bitbucket") {
        Some(ProviderKind::Bitbucket)
    } else {
        None
    }
}

fn api_base_for(provider: ProviderKind, url: &Url, host: &str) -> String {
    match (provider, host) {
        (ProviderKind::GitHub, "github.com" | "www.github.com")
        | (ProviderKind::GitLab, "gitlab.com" | "www.gitlab.com")
        | (ProviderKind::Bitbucket, "bitbucket.org" | "www.bitbucket.org") => {
            provider.default_api_base().to_string()
        }
        _ => {
            let scheme = if url.scheme() == "http" { "http" } else { "https" };
            let authority = match url.port().filter(|_| url.scheme().starts_with("http")) {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            match provider {
                ProviderKind::GitHub => format!("{scheme}://{authority}/api/v3"),
                ProviderKind::GitLab => format!("{scheme}://{authority}/api/v4"),
                ProviderKind::Bitbucket => format!("{scheme}://{authority}/rest/api/2.0"),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn github_https() {
        let uri: RepositoryUri = "https://github.com/octocat/Hello-World.git"
            .parse()
            .unwrap();
        assert_eq!(uri.provider, ProviderKind::GitHub);
        assert_eq!(uri.api_base, "https://api.github.com");
        assert_eq!(uri.owner, "octocat");
        assert_eq!(uri.repo, "Hello-World");
    }

    #[test]
    fn gitlab_nested_groups_and_deep_links() {
        let uri: RepositoryUri = "https://gitlab.com/gitlab-org/security/gitlab/-/merge_requests/1"
            .parse()
            .unwrap();
        assert_eq!(uri.provider, ProviderKind::GitLab);
        assert_eq!(uri.owner, "gitlab-org/security");
        assert_eq!(uri.repo, "gitlab");
        assert_eq!(uri.api_base, "https://gitlab.com/api/v4");
    }

    #[test]
    fn scp_style_ssh() {
        let uri: RepositoryUri = "git@bitbucket.org:atlassian/python-bitbucket.git"
            .parse()
            .unwrap();
        assert_eq!(uri.provider, ProviderKind::Bitbucket);
        assert_eq!(uri.api_base, "https://api.bitbucket.org/2.0");
        assert_eq!(uri.owner, "atlassian");
        assert_eq!(uri.repo, "python-bitbucket");
    }

    #[test]
    fn self_hosted_with_explicit_provider() {
        let uri = RepositoryUri::parse(
            "https://git.example.com:8443/team/app",
            Some(ProviderKind::GitLab),
        )
        .unwrap();
        assert_eq!(uri.api_base, "https://git.example.com:8443/api/v4");
        assert!(RepositoryUri::parse("https://git.example.com/team/app", None).is_err());
    }

    #[test]
    fn rejects_incomplete_paths() {
        assert!(matches!(
            "https://github.com/octocat".parse::<RepositoryUri>(),
            Err(VcsError::InvalidRepositoryUri(_))
        ));
        assert!("not a url".parse::<RepositoryUri>().is_err());
    }

    #[test]
    fn provider_config_carries_token() {
        let uri: RepositoryUri = "https://github.com/o/r".parse().unwrap();
        let config = uri.provider_config(Some("t".to_string()));
        assert_eq!(config.kind, ProviderKind::GitHub);
        assert_eq!(config.token.as_deref(), Some("t"));
        assert_eq!(uri.to_string(), "github:o/r");
    }
}
