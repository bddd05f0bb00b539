//! Shared contract of the per-provider payload adapters.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::VcsError;
use crate::model::{Commit, Issue, PullRequest, RepositoryInfo};

/// Pure mapping from raw provider payloads to unified records.
///
/// Implementations never perform I/O; the same input always yields the same
/// output. Unknown states and missing required fields are reported as
/// [`VcsError::MalformedResponse`].
pub trait ResponseNormalizer: Send + Sync {
    /// Provider name used in error messages.
    fn provider(&self) -> &'static str;

    /// Maps a pull/merge request payload. `repo` describes the base repository.
    fn to_pull_request(&self, raw: &Value, repo: &RepositoryInfo) -> Result<PullRequest, VcsError>;

    /// Maps a commit payload.
    fn to_commit(&self, raw: &Value) -> Result<Commit, VcsError>;

    /// Maps an issue payload.
    fn to_issue(&self, raw: &Value) -> Result<Issue, VcsError>;
}

/// Deserializes `raw` into a provider payload struct.
pub fn decode<T: DeserializeOwned>(
    provider: &'static str,
    what: &str,
    raw: &Value,
) -> Result<T, VcsError> {
    T::deserialize(raw).map_err(|e| VcsError::malformed(provider, format!("invalid {what}: {e}")))
}

/// Looks `state` up in a fixed `(raw, unified)` table.
pub fn map_state<S: Copy>(
    provider: &'static str,
    table: &[(&str, S)],
    state: &str,
) -> Result<S, VcsError> {
    table
        .iter()
        .find(|(raw, _)| *raw == state)
        .map(|(_, unified)| *unified)
        .ok_or_else(|| VcsError::malformed(provider, format!("unknown state '{state}'")))
}
