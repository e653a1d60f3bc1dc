//! Error types for chanwatch.
//!
//! Uses `thiserror` for structured error types. Variants follow the failure
//! taxonomy of the checker:
//! - **Config**: config file parsing, validation, or missing values
//! - **Network**: connection, timeout, or non-success HTTP responses
//! - **Database**: store access and transaction failures
//! - **Notification**: SMTP/webhook delivery failures after retries
//!
//! Probe-level failures (a single model not responding) are not errors; they
//! are recorded as failed [`crate::core::models::ProbeOutcome`]s and never
//! propagate.

use thiserror::Error;

/// Main error type for chanwatch operations.
#[derive(Error, Debug)]
pub enum ChanwatchError {
    /// Configuration file not found at expected path.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Error parsing the configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network-level failure (connect, DNS, TLS, or transport error).
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out after the specified duration.
    #[error("request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// Remote endpoint returned a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Failed to parse a response body.
    #[error("response parse error: {0}")]
    ParseResponse(String),

    /// Store access or transaction failure.
    #[error("database error: {0}")]
    Database(String),

    /// Channel row missing from the store.
    #[error("channel {0} not found")]
    ChannelNotFound(i64),

    /// Notification delivery failed after retries were exhausted.
    #[error("notification delivery failed via {transport}: {message}")]
    Notification { transport: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ChanwatchError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl ChanwatchError {
    /// Classify a reqwest error into the network taxonomy.
    pub fn from_reqwest(e: &reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                seconds: timeout_secs,
            }
        } else {
            Self::Network(e.to_string())
        }
    }

    /// Whether this error is transient enough that a retrying caller may try
    /// again (network and timeout failures).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, ChanwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(
            ChanwatchError::Network("connection refused".to_string()).is_transient()
        );
        assert!(ChanwatchError::Timeout { seconds: 10 }.is_transient());
        assert!(
            ChanwatchError::HttpStatus {
                status: 503,
                url: "https://x".to_string()
            }
            .is_transient()
        );
        assert!(!ChanwatchError::Config("bad".to_string()).is_transient());
    }

    #[test]
    fn display_messages() {
        let e = ChanwatchError::HttpStatus {
            status: 500,
            url: "https://api.example.com/v1/models".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "HTTP 500 from https://api.example.com/v1/models"
        );

        let e = ChanwatchError::ChannelNotFound(7);
        assert_eq!(e.to_string(), "channel 7 not found");
    }
}
