//! Error type for VCS provider access.

use thiserror::Error;

/// Errors raised by transports, normalizers and service facades.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VcsError {
    /// The provider answered 404, or a lookup found nothing.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The provider rejected the credentials (HTTP 401/403).
    #[error("Authorization failed (HTTP {status}): {message}")]
    Authorization {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// Network failure, timeout or unexpected HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The payload could not be decoded into the provider's shape.
    #[error("Malformed {provider} response: {message}")]
    MalformedResponse {
        /// Provider that produced the payload.
        provider: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// A paginated listing did not terminate: a page link repeated or the
    /// page limit was reached before the links ran out.
    #[error("Pagination of {resource} aborted: {reason}")]
    Pagination {
        /// Path of the listing.
        resource: String,
        /// Why following links stopped.
        reason: String,
    },

    /// A repository URL or provider configuration could not be understood.
    #[error("Invalid repository URI: {0}")]
    InvalidRepositoryUri(String),
}

impl VcsError {
    /// Shorthand for [`VcsError::MalformedResponse`].
    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status to an error.
    pub fn from_status(status: u16, resource: &str, body: &str) -> Self {
        match status {
            401 | 403 => Self::Authorization {
                status,
                message: summarize(body),
            },
            404 => Self::NotFound(resource.to_string()),
            _ => Self::Transport(format!("HTTP {status} for {resource}: {}", summarize(body))),
        }
    }
}

fn summarize(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
