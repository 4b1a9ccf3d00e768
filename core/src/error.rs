//! Error types for the expense API client.
//!
//! # Design
//! Three families of failure reach the caller: client-side validation
//! (never touches the network), missing credentials (blocked before any
//! request is built), and network/server failures. `NotFound` and
//! `Unauthorized` get dedicated variants because callers act on them
//! differently: the first means the record is gone, the second means the
//! session is no longer valid. Server messages are carried verbatim.

use crate::transport::TransportError;
use crate::validation::ValidationError;

/// Shown when the server gave no usable message or could not be reached.
pub const GENERIC_FAILURE_MESSAGE: &str = "Network error: unable to reach the server";

/// Errors returned by the session manager, synchronizer and codec.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A form rule failed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A protected operation was attempted without a session token.
    #[error("You must sign in first")]
    Unauthenticated,

    /// Sign-in returned 2xx but the body carried no token.
    #[error("Sign-in succeeded but no token was returned")]
    MissingToken,

    /// The server rejected the bearer token (401).
    #[error("{message}")]
    Unauthorized { message: String },

    /// The server returned 404.
    #[error("{message}")]
    NotFound { message: String },

    /// Any other non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: unable to reach the server")]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Fetching the expense collection failed. Always retryable; the message
    /// is the underlying failure's.
    #[error("{source}")]
    FetchFailed { source: Box<ApiError> },
}

impl ApiError {
    /// Whether repeating the same call unchanged might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_)
            | ApiError::Deserialization(_)
            | ApiError::FetchFailed { .. } => true,
            ApiError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// HTTP status, when the failure came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::FetchFailed { source } => source.status(),
            _ => None,
        }
    }

    /// Tag a failed collection fetch. Session failures pass through unchanged
    /// so callers still see that they must sign in again.
    pub(crate) fn into_fetch_failure(self) -> Self {
        match self {
            ApiError::Unauthenticated
            | ApiError::Unauthorized { .. }
            | ApiError::FetchFailed { .. } => self,
            other => ApiError::FetchFailed {
                source: Box::new(other),
            },
        }
    }
}
