//! NLU client error types

use thiserror::Error;

/// NLU client error with classification
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct NluError {
    pub kind: NluErrorKind,
    pub message: String,
}

impl NluError {
    pub fn new(kind: NluErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NluErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(NluErrorKind::Auth, message)
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(NluErrorKind::Status, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(NluErrorKind::Decode, message)
    }

    pub fn client_setup(message: impl Into<String>) -> Self {
        Self::new(NluErrorKind::ClientSetup, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NluErrorKind {
    /// Connection failures and timeouts
    Network,
    /// Token rejected (401, 403)
    Auth,
    /// Any other non-success status
    Status,
    /// Body is not the expected JSON shape
    Decode,
    /// HTTP client could not be constructed
    ClientSetup,
}

impl std::fmt::Display for NluErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Network => "network error",
            Self::Auth => "authentication error",
            Self::Status => "unexpected status",
            Self::Decode => "malformed response",
            Self::ClientSetup => "client setup error",
        };
        f.write_str(label)
    }
}

impl From<reqwest::Error> for NluError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::decode(error.to_string())
        } else {
            Self::network(error.to_string())
        }
    }
}
