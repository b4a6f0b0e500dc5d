//! Error taxonomy for talking to the session service.

use thiserror::Error;

/// Why a session operation could not do its job.
///
/// These never escape `SessionClient` as a `Result::Err`; they ride along in an
/// [`Outcome`](crate::Outcome) next to the neutral value.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Network unreachable, timeout, connection reset.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("session service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded or lacks a required field.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// 2xx, but the body says `"success": false`.
    #[error("session service rejected the request")]
    Rejected,

    /// Bad base URL or HTTP client setup.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The local state file could not be read or written.
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl SessionError {
    /// `true` for a 404 from the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SessionError::Malformed(e.to_string())
        } else if e.is_builder() {
            SessionError::Config(e.to_string())
        } else {
            SessionError::Transport(e.to_string())
        }
    }
}
