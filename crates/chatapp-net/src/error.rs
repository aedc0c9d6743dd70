use std::time::Duration;

use chatapp_types::FileError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Every failure a request or a domain lookup can end in.
///
/// The variants stay distinguishable so callers can tell "no such user"
/// apart from "server sent garbage" apart from "network is down".
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-2xx status.
    #[error("The response is invalid. (HTTP {status})")]
    InvalidResponse { status: u16 },

    #[error("The response is empty.")]
    EmptyResponse,

    /// The payload decoded but held no matching record.
    #[error("The response is data not found.")]
    DataNotFound,

    /// Raised by fixture services switched into failure mode.
    #[error("Testing failed")]
    Testing,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Parsing error: {0}")]
    Parsing(#[from] serde_json::Error),

    #[error("Private DNS resolution failed: {0}")]
    Resolution(String),

    /// No response data within the request's read timeout.
    #[error("The request timed out after {0:?}")]
    Timeout(Duration),

    #[error("No cached response for {0}")]
    CacheMiss(String),

    #[error("Request task failed: {0}")]
    Task(String),

    #[error(transparent)]
    File(#[from] FileError),
}

impl NetworkError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NetworkError::DataNotFound)
    }

    pub fn is_parsing(&self) -> bool {
        matches!(self, NetworkError::Parsing(_))
    }
}
