//! Error types for the notesum client.

use thiserror::Error;

/// Result type alias using notesum's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Status used for every failure where no HTTP response was received.
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

/// Normalized failure of a call to the remote service.
///
/// Transport failures (no response at all) carry status 500 and the
/// underlying failure message. Error responses carry the server status and
/// either the body's `detail` field or the raw status line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct ServiceError {
    pub status: u16,
    pub detail: String,
}

impl ServiceError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// A failure where the request never produced a response.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(TRANSPORT_FAILURE_STATUS, detail)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Core error type for notesum operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or service failure (wraps ServiceError)
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A successful response was missing fields the caller depends on
    #[error("{0}")]
    Protocol(String),

    /// The remote job reported failure
    #[error("{0}")]
    JobFailed(String),

    /// Polling exhausted its attempt bound without a terminal status
    #[error("Summary generation timed out")]
    TimedOut,

    /// Identity could not be resolved or created
    #[error("Failed to initialize identity: {0}")]
    IdentityInit(String),

    /// Local persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Numeric status for service-backed errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service(e) => Some(e.status),
            _ => None,
        }
    }

    /// True when polling gave up; callers may suggest trying again later.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::TimedOut)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Service(e) if e.is_not_found())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Service(ServiceError::transport(e.to_string()))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
