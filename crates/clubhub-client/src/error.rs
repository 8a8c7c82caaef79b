//! Error types for the ClubHub client.
//!
//! Network-related failures propagate to the immediate caller unchanged.
//! Malformed local state never shows up here: the session store treats it
//! as absence.

use thiserror::Error;

/// Errors surfaced by the request pipeline, the auth service and the
/// session context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The call could not complete (connectivity, TLS, aborted body).
    #[error("{0}")]
    Network(String),

    /// HTTP status outside the success range.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// HTTP success, but the payload reports a failure.
    #[error("{0}")]
    Logical(String),

    /// Response body does not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Durable store could not be written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status carried by a server rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            ClientError::Network(msg) | ClientError::Logical(msg) => msg.clone(),
            ClientError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<envy::Error> for ClientError {
    fn from(err: envy::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}
