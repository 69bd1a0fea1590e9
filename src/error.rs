//! Error types for the routine ranker
//!
//! Ranking itself never fails: bad inputs are normalized, bad catalog records
//! fall back to defaults and suggestion failures degrade to "no suggestion".
//! These errors only surface from setup code (configuration, HTTP client
//! construction, logging).

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, RankerError>;

/// Errors raised outside the ranking path
#[derive(Debug, Error)]
pub enum RankerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for RankerError {
    fn from(err: config::ConfigError) -> Self {
        RankerError::Configuration(err.to_string())
    }
}
