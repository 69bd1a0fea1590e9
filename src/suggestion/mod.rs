//! Optional external suggestion signal
//!
//! The suggestion service is advisory: ranking works without it, and every
//! failure to reach it degrades to "no suggestion".

pub mod cache;
pub mod client;
pub mod config;
pub mod models;

pub use cache::{CacheStats, SuggestionCache};
pub use client::{SuggestionClient, SuggestionError};
pub use config::SuggestionConfig;
pub use models::{PredictRequest, PredictResponse, SuggestionSignal};

use crate::ranking::RankingInput;
use async_trait::async_trait;

/// Source of the advisory signal used by the ranker
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Signal for `input`, or `None` when unavailable
    async fn suggest(&self, input: &RankingInput) -> Option<SuggestionSignal>;
}

/// Provider returning the same signal for every input
#[derive(Debug, Clone, Default)]
pub struct FixedSuggestion(pub Option<SuggestionSignal>);

impl FixedSuggestion {
    /// Provider that never suggests anything
    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl SuggestionProvider for FixedSuggestion {
    async fn suggest(&self, _input: &RankingInput) -> Option<SuggestionSignal> {
        self.0.clone()
    }
}
