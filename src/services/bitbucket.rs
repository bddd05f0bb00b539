//! Bitbucket Cloud REST 2.0 provider.
//!
//! Endpoints used:
//! - GET /repositories/:workspace/:repo/pullrequests[/:id[/commits]]
//! - GET /repositories/:workspace/:repo/commit/:sha, /commits
//! - GET /repositories/:workspace/:repo/issues[/:id]
//!
//! Listings are wrapped in `{ "values": [...], "next": "..." }` pages.

pub mod normalizer;
pub mod service;
pub mod types;

pub use normalizer::BitbucketNormalizer;
pub use service::BitbucketService;
pub use types::BitbucketPullRequestState;
