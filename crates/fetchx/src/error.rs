//! Error types and abort reasons

use std::fmt;

use thiserror::Error;

/// Result type used across the crate
pub type FetchResult<T, E = Error> = Result<T, E>;

/// Why an in-flight request was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// The configured timeout elapsed before the request settled
    Timeout,
    /// The owning component was torn down
    Unmount,
    /// A newer request with the same key superseded this one
    Duplicate,
    /// Explicit abort requested by the caller
    User,
}

impl AbortReason {
    /// Condition attached to the error synthesized for this reason
    pub fn message(&self) -> &'static str {
        match self {
            AbortReason::Timeout => "Request Timeout",
            AbortReason::Unmount => "Request Unmounted",
            AbortReason::Duplicate => "Request Duplicate",
            AbortReason::User => "Request Aborted",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbortReason::Timeout => "Timeout",
            AbortReason::Unmount => "Unmount",
            AbortReason::Duplicate => "Duplicate",
            AbortReason::User => "User",
        };
        write!(f, "{}", name)
    }
}

/// Errors that can occur while issuing a request
#[derive(Debug, Error)]
pub enum Error {
    /// Request was aborted before it settled
    #[error("{}", .0.message())]
    Aborted(AbortReason),
    /// Transport-level failure, propagated unchanged from the backend
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Payload could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Request URL could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Abort reason when this error is a cancellation, `None` otherwise
    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            Error::Aborted(reason) => Some(*reason),
            _ => None,
        }
    }
}
