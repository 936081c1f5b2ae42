use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The request did not complete within {0:?}")]
    Timeout(Duration),

    #[error("The API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}

impl ApiError {
    /// Whether repeating the same request could plausibly succeed.
    ///
    /// Network failures, timeouts, throttling, and server errors are
    /// retryable. Bad input and malformed payloads are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(e) => !(e.is_builder() || e.is_decode() || e.is_status()),
            ApiError::Timeout(_) => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::UnknownSymbol(_)
            | ApiError::Deserialization(_)
            | ApiError::InvalidData(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ApiError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(ApiError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!ApiError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!ApiError::UnknownSymbol("ZZZZ".into()).is_retryable());
        assert!(!ApiError::Deserialization("eof".into()).is_retryable());
    }
}
