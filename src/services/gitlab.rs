//! GitLab REST v4 provider.
//!
//! Endpoints used:
//! - GET /projects/:path, /groups/:path, /users?username=
//! - GET /projects/:path/merge_requests[/:iid[/commits]]
//! - GET /projects/:path/repository/commits[/:sha]
//! - GET /projects/:path/issues[/:iid]

pub mod normalizer;
pub mod service;
pub mod types;

pub use normalizer::GitLabNormalizer;
pub use service::GitLabService;
pub use types::GitLabPullRequestState;
