//! Error types for pin-content.

use thiserror::Error;

/// Errors that can occur while submitting content to a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Store answered with a non-success HTTP status.
    #[error("store returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// Request never got an answer (connect, reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Store answered 2xx but the body was not understood.
    #[error("invalid store response: {0}")]
    InvalidResponse(String),

    /// Store answered `ok: false`.
    #[error("store rejected submission: {0}")]
    Rejected(String),

    /// Submission could not be encoded.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
}

impl ContentError {
    /// Whether retrying the same submission may succeed.
    ///
    /// Rate limiting (429), server errors (5xx) and transport failures are
    /// transient; everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ContentError::Http { status, .. } => *status == 429 || *status >= 500,
            ContentError::Transport(_) => true,
            ContentError::InvalidResponse(_)
            | ContentError::Rejected(_)
            | ContentError::InvalidSubmission(_) => false,
        }
    }
}

impl From<reqwest::Error> for ContentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            ContentError::Transport(e.to_string())
        } else if e.is_decode() {
            ContentError::InvalidResponse(e.to_string())
        } else if e.is_builder() {
            ContentError::InvalidSubmission(e.to_string())
        } else {
            ContentError::Transport(e.to_string())
        }
    }
}
