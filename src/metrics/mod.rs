//! Metrics collection for observability

use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry, Counter, CounterVec, Encoder, Histogram, Opts, Registry,
    TextEncoder,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Suggestion service metrics
    pub suggestion_requests: CounterVec,
    pub suggestion_request_duration: Histogram,
    pub suggestion_cache_hits: Counter,
    pub suggestion_cache_misses: Counter,

    // Ranking metrics
    pub rankings: Counter,
    pub ranking_duration: Histogram,
    pub penalized_items: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let suggestion_requests = register_counter_vec_with_registry!(
            Opts::new("suggestion_requests_total", "Suggestion lookups by outcome"),
            &["outcome"],
            registry
        )?;

        let suggestion_request_duration = register_histogram_with_registry!(
            "suggestion_request_duration_seconds",
            "Suggestion service call duration in seconds, retries included",
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 1.5, 2.5, 5.0],
            registry
        )?;

        let suggestion_cache_hits = register_counter_with_registry!(
            Opts::new("suggestion_cache_hits_total", "Suggestion cache hits"),
            registry
        )?;

        let suggestion_cache_misses = register_counter_with_registry!(
            Opts::new("suggestion_cache_misses_total", "Suggestion cache misses"),
            registry
        )?;

        let rankings = register_counter_with_registry!(
            Opts::new("rankings_total", "Completed ranking calls"),
            registry
        )?;

        let ranking_duration = register_histogram_with_registry!(
            "ranking_duration_seconds",
            "Ranking call duration in seconds",
            registry
        )?;

        let penalized_items = register_counter_with_registry!(
            Opts::new("penalized_items_total", "Catalog items penalized for recent use"),
            registry
        )?;

        Ok(Self {
            registry,
            suggestion_requests,
            suggestion_request_duration,
            suggestion_cache_hits,
            suggestion_cache_misses,
            rankings,
            ranking_duration,
            penalized_items,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather_text(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
