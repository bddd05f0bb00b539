//! GitHub REST v3 provider.
//!
//! Endpoints used:
//! - GET /repos/:owner/:repo/pulls[/:number[/commits]]
//! - GET /repos/:owner/:repo/commits[/:sha]
//! - GET /repos/:owner/:repo/issues[/:number]

pub mod normalizer;
pub mod service;
pub mod types;

pub use normalizer::GitHubNormalizer;
pub use service::GitHubService;
pub use types::GitHubPullRequestState;
