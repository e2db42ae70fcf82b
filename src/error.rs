use thiserror::Error;

/// Failures produced while building, running, or normalizing a search
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Caller supplied unusable input (empty identifier, zero limit)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network, timeout, non-2xx status or undecodable payload
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// A single raw record could not be turned into a listing
    #[error("Record skipped: {0}")]
    RecordSkipped(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {}", error)
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else if error.is_decode() {
            format!("malformed payload: {}", error)
        } else {
            error.to_string()
        };
        SearchError::TransportFailure(message)
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::TransportFailure(format!("malformed payload: {}", error))
    }
}
