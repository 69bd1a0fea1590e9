//! Ranking orchestration: normalize, penalize, fetch the suggestion once,
//! score every item, stable-sort and truncate.

use super::catalog::CatalogAdapter;
use super::models::{
    PenaltyMap, RankedResult, RankingInput, RawRankingInput, ScorableItem, SessionRecord,
};
use super::normalizer::normalize;
use super::penalty::PenaltyPolicy;
use super::scorer::{Scorer, ScoringContext};
use crate::config::{RankerConfig, RankingConfig};
use crate::error::Result;
use crate::metrics::METRICS;
use crate::suggestion::{FixedSuggestion, SuggestionClient, SuggestionProvider, SuggestionSignal};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Per-call ranking options
#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Recent routine uses, for the repetition penalty
    pub session_history: Vec<SessionRecord>,
    /// Focus of the previous session, for the diversity bonus
    pub last_focus: Option<String>,
    /// Result count; the configured default when unset
    pub top_k: Option<usize>,
    /// Precomputed penalties, used instead of `session_history`
    pub penalty_override: Option<PenaltyMap>,
    /// Reference time for the penalty window, epoch ms; now when unset
    pub now_millis: Option<i64>,
}

/// Routine ranker
pub struct Ranker {
    scorer: Scorer,
    penalty: PenaltyPolicy,
    adapter: CatalogAdapter,
    default_top_k: usize,
    suggestions: Arc<dyn SuggestionProvider>,
}

impl Ranker {
    /// Create a ranker with a custom suggestion provider
    pub fn new(config: &RankingConfig, suggestions: Arc<dyn SuggestionProvider>) -> Self {
        Self {
            scorer: Scorer::new(config.weights, config.focus_boost, config.scheme_boost),
            penalty: PenaltyPolicy::new(config.penalty_window_hours, config.repeat_penalty),
            adapter: CatalogAdapter::with_default_focus(&config.default_focus),
            default_top_k: config.top_k,
            suggestions,
        }
    }

    /// Ranker that never consults a suggestion service
    pub fn rules_only(config: &RankingConfig) -> Self {
        Self::new(config, Arc::new(FixedSuggestion::none()))
    }

    /// Ranker backed by the HTTP suggestion client described in `config`
    pub fn from_config(config: &RankerConfig) -> Result<Self> {
        let client = SuggestionClient::new(config.suggestion.clone())?;
        Ok(Self::new(&config.ranking, Arc::new(client)))
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn adapter(&self) -> &CatalogAdapter {
        &self.adapter
    }

    /// Rank a raw catalog against raw preferences. Never fails.
    pub async fn rank(
        &self,
        raw: &RawRankingInput,
        catalog: &[Value],
        options: &RankOptions,
    ) -> Vec<RankedResult> {
        let start = Instant::now();

        let input = normalize(raw);
        let items = self.adapter.adapt_all(catalog);

        let penalties = match &options.penalty_override {
            Some(map) => Cow::Borrowed(map),
            None => Cow::Owned(self.penalty.build(&options.session_history, options.now_millis)),
        };

        // Fetched once, before any scoring
        let suggestion = self.suggestions.suggest(&input).await;

        let results = self.rank_items(
            &input,
            items,
            &penalties,
            suggestion.as_ref(),
            options.last_focus.as_deref(),
            options.top_k.unwrap_or(self.default_top_k),
        );

        METRICS.rankings.inc();
        METRICS.penalized_items.inc_by(penalties.len() as f64);
        METRICS.ranking_duration.observe(start.elapsed().as_secs_f64());

        debug!(
            "Ranked {} catalog items, returned {}, {} penalized, suggestion {}",
            catalog.len(),
            results.len(),
            penalties.len(),
            if suggestion.is_some() { "applied" } else { "absent" }
        );

        results
    }

    /// Score canonical items and return the best `top_k`.
    ///
    /// Ties keep catalog order.
    pub fn rank_items(
        &self,
        input: &RankingInput,
        items: Vec<ScorableItem>,
        penalties: &PenaltyMap,
        suggestion: Option<&SuggestionSignal>,
        last_focus: Option<&str>,
        top_k: usize,
    ) -> Vec<RankedResult> {
        let ctx = ScoringContext {
            input,
            last_focus,
            penalties,
            suggestion,
        };

        let mut results: Vec<RankedResult> = items
            .into_iter()
            .map(|item| self.scorer.rank_item(item, &ctx))
            .collect();

        // sort_by is stable
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        results
    }
}
