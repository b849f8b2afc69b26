//! Transform client error types.

use thiserror::Error;

/// Errors that can occur when calling the transform service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Requested prompt id is not in the registry snapshot
    #[error("unknown prompt: {0}")]
    PromptNotFound(String),

    /// HTTP request failed before a usable response arrived
    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Credentials were rejected (401/403)
    #[error("authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    /// Service returned an error response
    #[error("api error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("malformed api response: {0}")]
    MalformedResponse(String),
}

/// Classify a non-success HTTP status, splitting credential rejections from
/// other service failures.
pub(crate) fn status_error(status: u16, message: String) -> ClientError {
    if status == 401 || status == 403 {
        ClientError::Auth { status, message }
    } else {
        ClientError::Provider { status, message }
    }
}
