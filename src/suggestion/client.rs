//! Suggestion service client with timeout, single retry and response caching

use super::cache::{CacheStats, SuggestionCache};
use super::config::SuggestionConfig;
use super::models::{PredictRequest, PredictResponse, SuggestionSignal};
use super::SuggestionProvider;
use crate::error::{RankerError, Result};
use crate::metrics::METRICS;
use crate::ranking::RankingInput;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Suggestion request failures. Never returned to callers of
/// [`SuggestionClient::fetch`]; they are logged and degrade to `None`.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Client for the optional `/predict` suggestion service
pub struct SuggestionClient {
    http: Client,
    config: SuggestionConfig,
    cache: Arc<SuggestionCache>,
}

impl SuggestionClient {
    /// Create a client with its own cache
    pub fn new(config: SuggestionConfig) -> Result<Self> {
        let cache = Arc::new(SuggestionCache::new(
            config.cache_ttl(),
            config.cache_max_entries,
        ));
        Self::with_cache(config, cache)
    }

    /// Create a client sharing an existing cache
    pub fn with_cache(config: SuggestionConfig, cache: Arc<SuggestionCache>) -> Result<Self> {
        // No client-wide timeout: only the first attempt is time-bounded
        let http = Client::builder()
            .build()
            .map_err(|e| RankerError::HttpClient(e.to_string()))?;

        match config.endpoint() {
            Some(endpoint) => info!("Suggestion service enabled at {}", endpoint),
            None => info!("No suggestion endpoint configured, ranking with rules only"),
        }

        Ok(Self {
            http,
            config,
            cache,
        })
    }

    /// Whether an endpoint is configured
    pub fn is_enabled(&self) -> bool {
        self.config.endpoint().is_some()
    }

    /// Fetch the advisory signal for `input`.
    ///
    /// Returns `None` when no endpoint is configured or when both the first
    /// attempt and the retry fail.
    pub async fn fetch(&self, input: &RankingInput) -> Option<SuggestionSignal> {
        let endpoint = match self.config.endpoint() {
            Some(endpoint) => endpoint,
            None => {
                METRICS.suggestion_requests.with_label_values(&["disabled"]).inc();
                return None;
            }
        };

        let request = PredictRequest::from(input);
        let key = match serde_json::to_string(&request) {
            Ok(key) => key,
            Err(e) => {
                warn!("Could not serialize suggestion request: {}", e);
                return None;
            }
        };

        if let Some(signal) = self.cache.get(&key) {
            METRICS.suggestion_cache_hits.inc();
            METRICS.suggestion_requests.with_label_values(&["cached"]).inc();
            debug!("Suggestion cache hit for {}", key);
            return Some(signal);
        }
        METRICS.suggestion_cache_misses.inc();

        let start = Instant::now();
        let url = format!("{}/predict", endpoint);

        let result = match self
            .call_predict(&url, &request, Some(self.config.timeout()))
            .await
        {
            Ok(signal) => Ok(signal),
            Err(e) => {
                let backoff = self.config.retry_backoff();
                warn!("Suggestion attempt 1 failed: {}, retrying in {:?}", e, backoff);
                tokio::time::sleep(backoff).await;
                self.call_predict(&url, &request, None).await
            }
        };

        METRICS
            .suggestion_request_duration
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(signal) => {
                METRICS.suggestion_requests.with_label_values(&["success"]).inc();
                self.cache.store(&key, signal.clone());
                Some(signal)
            }
            Err(e) => {
                METRICS.suggestion_requests.with_label_values(&["error"]).inc();
                warn!("Suggestion retry failed: {}, ranking without suggestion", e);
                None
            }
        }
    }

    /// Call the `/predict` endpoint once
    async fn call_predict(
        &self,
        url: &str,
        request: &PredictRequest,
        timeout: Option<Duration>,
    ) -> std::result::Result<SuggestionSignal, SuggestionError> {
        let mut req = self.http.post(url).json(request);

        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        if let Some(api_key) = &self.config.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                SuggestionError::Timeout(e.to_string())
            } else {
                SuggestionError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SuggestionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let predict: PredictResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SuggestionError::Timeout(e.to_string())
            } else {
                SuggestionError::InvalidResponse(e.to_string())
            }
        })?;

        predict.into_signal().ok_or_else(|| {
            SuggestionError::InvalidResponse(
                "response has neither focus nor scheme label".to_string(),
            )
        })
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &Arc<SuggestionCache> {
        &self.cache
    }
}

#[async_trait]
impl SuggestionProvider for SuggestionClient {
    async fn suggest(&self, input: &RankingInput) -> Option<SuggestionSignal> {
        self.fetch(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RankingInput {
        RankingInput {
            objective: 1,
            difficulty: 2,
            limitation: 0,
            time_bucket: 2,
            frequency: 3,
        }
    }

    #[tokio::test]
    async fn test_disabled_client_returns_none() {
        let client = SuggestionClient::new(SuggestionConfig::default()).unwrap();
        assert!(!client.is_enabled());
        assert!(client.fetch(&input()).await.is_none());
    }

    #[tokio::test]
    async fn test_cached_signal_skips_network() {
        // Unroutable endpoint: any network call would fail
        let mut config = SuggestionConfig::with_endpoint("http://127.0.0.1:9");
        config.retry_backoff_ms = 1;
        let client = SuggestionClient::new(config).unwrap();

        let key = serde_json::to_string(&PredictRequest::from(&input())).unwrap();
        client
            .cache()
            .store(&key, SuggestionSignal::new(Some("HIIT"), Some("fatloss")));

        let signal = client.fetch(&input()).await.unwrap();
        assert_eq!(signal.focus_label.as_deref(), Some("HIIT"));
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades_to_none() {
        let mut config = SuggestionConfig::with_endpoint("http://127.0.0.1:9");
        config.retry_backoff_ms = 1;
        config.timeout_ms = 200;
        let client = SuggestionClient::new(config).unwrap();

        assert!(client.fetch(&input()).await.is_none());
        assert_eq!(client.cache_stats().total_entries, 0);
    }
}
