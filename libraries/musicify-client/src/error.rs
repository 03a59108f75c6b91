//! Error types for the Musicify client.

use thiserror::Error;

/// Errors that can occur when talking to a Musicify server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never completed (connection refused, reset, timed out)
    #[error("Request failed: {0}")]
    Transport(String),

    /// Server answered with a failure
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// True when no response was received at all
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
