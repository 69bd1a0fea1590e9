//! Configuration for the suggestion service client

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Suggestion client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Service base URL; unset or blank means rules-only ranking
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for the service
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Timeout for the first attempt in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause before the single retry in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Response cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Maximum cached responses
    #[serde(default = "default_cache_size")]
    pub cache_max_entries: usize,
}

fn default_timeout_ms() -> u64 { 1200 }
fn default_retry_backoff_ms() -> u64 { 120 }
fn default_cache_ttl() -> u64 { 300 }
fn default_cache_size() -> usize { 512 }

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_size(),
        }
    }
}

impl SuggestionConfig {
    /// Configuration pointing at `endpoint`
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Endpoint with surrounding whitespace and trailing slashes removed,
    /// `None` when blank
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(|e| e.trim().trim_end_matches('/'))
            .filter(|e| !e.is_empty())
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get retry backoff as Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Get cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
