//! Data models for routine ranking

use crate::suggestion::SuggestionSignal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Canonical ranking preferences, every field inside its domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingInput {
    /// Training objective (0-4)
    pub objective: u8,
    /// Requested difficulty (0-3)
    pub difficulty: u8,
    /// Physical limitation code (0-5)
    pub limitation: u8,
    /// Session length bucket (1-4)
    pub time_bucket: u8,
    /// Sessions per week (1-7)
    pub frequency: u8,
}

impl RankingInput {
    /// Minute range `[lo, hi]` covered by the time bucket
    pub fn minute_range(&self) -> (f64, f64) {
        match self.time_bucket {
            1 => (10.0, 20.0),
            3 => (30.0, 45.0),
            4 => (45.0, 60.0),
            _ => (20.0, 30.0),
        }
    }
}

/// Raw, untrusted preferences as received from a caller
///
/// Numeric fields accept anything; values that are not numbers deserialize as
/// `None` instead of failing the whole request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRankingInput {
    #[serde(default, alias = "objetivo", deserialize_with = "lenient_number")]
    pub objective: Option<f64>,
    #[serde(default, alias = "dificultad", deserialize_with = "lenient_number")]
    pub difficulty: Option<f64>,
    #[serde(default, alias = "limitacion", deserialize_with = "lenient_number")]
    pub limitation: Option<f64>,
    #[serde(default, alias = "tiempo", deserialize_with = "lenient_number")]
    pub time_bucket: Option<f64>,
    #[serde(default, alias = "frecuencia", deserialize_with = "lenient_number")]
    pub frequency: Option<f64>,

    /// Free-text goal ("ganar_musculo", "hiit", ...), used when `objective` is absent
    #[serde(default, deserialize_with = "lenient_string")]
    pub goal: Option<String>,
    /// Experience label ("novato", "intermedio", "avanzado"), used when `difficulty` is absent
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: Option<String>,
    /// Desired session minutes, used when `time_bucket` is absent
    #[serde(default, deserialize_with = "lenient_number")]
    pub minutes: Option<f64>,
}

impl RawRankingInput {
    /// Raw input carrying only the five coded fields
    pub fn coded(
        objective: f64,
        difficulty: f64,
        limitation: f64,
        time_bucket: f64,
        frequency: f64,
    ) -> Self {
        Self {
            objective: Some(objective),
            difficulty: Some(difficulty),
            limitation: Some(limitation),
            time_bucket: Some(time_bucket),
            frequency: Some(frequency),
            ..Default::default()
        }
    }
}

impl From<RankingInput> for RawRankingInput {
    fn from(input: RankingInput) -> Self {
        Self::coded(
            f64::from(input.objective),
            f64::from(input.difficulty),
            f64::from(input.limitation),
            f64::from(input.time_bucket),
            f64::from(input.frequency),
        )
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}

/// Canonical routine record consumed by the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorableItem {
    pub id: String,
    pub name: String,
    pub objective_id: Option<i64>,
    pub level: Option<i64>,
    /// Focus tag; empty when the routine declares none
    pub focus: String,
    pub minutes: Option<f64>,
    /// Catalog bias in [0, 1]
    pub base_score: f64,
    pub scheme: Option<String>,
}

/// One historical use of a routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub item_id: String,
    pub timestamp_millis: i64,
}

impl SessionRecord {
    pub fn new(item_id: impl Into<String>, timestamp_millis: i64) -> Self {
        Self {
            item_id: item_id.into(),
            timestamp_millis,
        }
    }
}

/// Per-item repetition penalty
///
/// An id is present only when a session for it fell inside the penalty
/// window. Repeated use stores the maximum, never a sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyMap(HashMap<String, f64>);

impl PenaltyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a penalty, keeping the larger of the existing and new value
    pub fn raise(&mut self, item_id: &str, penalty: f64) {
        let entry = self.0.entry(item_id.to_string()).or_insert(penalty);
        if penalty > *entry {
            *entry = penalty;
        }
    }

    /// Penalty for an item, 0 when absent
    pub fn penalty_for(&self, item_id: &str) -> f64 {
        self.0.get(item_id).copied().unwrap_or(0.0)
    }

    pub fn get(&self, item_id: &str) -> Option<f64> {
        self.0.get(item_id).copied()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.0.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for PenaltyMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut map = PenaltyMap::new();
        for (id, penalty) in iter {
            map.raise(&id, penalty);
        }
        map
    }
}

/// Weights applied to the base scoring factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    #[serde(default = "default_objective_weight")]
    pub objective: f64,
    #[serde(default = "default_level_weight")]
    pub level: f64,
    #[serde(default = "default_minutes_weight")]
    pub minutes: f64,
    #[serde(default = "default_focus_weight")]
    pub focus: f64,
    #[serde(default = "default_diversity_weight")]
    pub diversity: f64,
    // config lowercases keys, so accept the flattened spellings too
    #[serde(
        default = "default_catalog_bias_weight",
        alias = "catalog_bias",
        alias = "catalogbias"
    )]
    pub catalog_bias: f64,
}

fn default_objective_weight() -> f64 { 0.35 }
fn default_level_weight() -> f64 { 0.20 }
fn default_minutes_weight() -> f64 { 0.15 }
fn default_focus_weight() -> f64 { 0.15 }
fn default_diversity_weight() -> f64 { 0.05 }
fn default_catalog_bias_weight() -> f64 { 0.10 }

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            objective: default_objective_weight(),
            level: default_level_weight(),
            minutes: default_minutes_weight(),
            focus: default_focus_weight(),
            diversity: default_diversity_weight(),
            catalog_bias: default_catalog_bias_weight(),
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.objective + self.level + self.minutes + self.focus + self.diversity + self.catalog_bias
    }

    /// Weighted sum of the factor scores
    pub fn apply(&self, factors: &FactorScores) -> f64 {
        let c = self.contributions(factors);
        c.objective + c.level + c.minutes + c.focus + c.diversity + c.catalog_bias
    }

    /// Each factor multiplied by its weight
    pub fn contributions(&self, factors: &FactorScores) -> FactorScores {
        FactorScores {
            objective: self.objective * factors.objective,
            level: self.level * factors.level,
            minutes: self.minutes * factors.minutes,
            focus: self.focus * factors.focus,
            diversity: self.diversity * factors.diversity,
            catalog_bias: self.catalog_bias * factors.catalog_bias,
        }
    }
}

/// Unweighted factor scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub objective: f64,
    pub level: f64,
    pub minutes: f64,
    pub focus: f64,
    pub diversity: f64,
    pub catalog_bias: f64,
}

/// Auditable breakdown of one item's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreExplanation {
    /// Raw factor scores
    pub factors: FactorScores,
    /// Factor scores multiplied by their weights
    pub weighted: FactorScores,
    /// Weight table used
    pub weights: ScoreWeights,
    /// Sum of the weighted factors
    pub base: f64,
    pub suggestion_focus_boost: f64,
    pub suggestion_scheme_boost: f64,
    pub penalty: f64,
    /// Suggestion signal that was in effect, if any
    pub suggestion: Option<SuggestionSignal>,
}

/// A scored catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    #[serde(flatten)]
    pub item: ScorableItem,
    pub score: f64,
    pub explanation: ScoreExplanation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_ranges() {
        let mut input = RankingInput {
            objective: 1,
            difficulty: 1,
            limitation: 0,
            time_bucket: 1,
            frequency: 3,
        };
        assert_eq!(input.minute_range(), (10.0, 20.0));
        input.time_bucket = 2;
        assert_eq!(input.minute_range(), (20.0, 30.0));
        input.time_bucket = 3;
        assert_eq!(input.minute_range(), (30.0, 45.0));
        input.time_bucket = 4;
        assert_eq!(input.minute_range(), (45.0, 60.0));
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = ScoreWeights::default();
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_map_keeps_maximum() {
        let mut map = PenaltyMap::new();
        map.raise("a", 0.1);
        map.raise("a", 0.3);
        map.raise("a", 0.2);
        assert_eq!(map.get("a"), Some(0.3));
        assert_eq!(map.penalty_for("missing"), 0.0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_raw_input_is_lenient() {
        let raw: RawRankingInput = serde_json::from_value(serde_json::json!({
            "objetivo": 2,
            "difficulty": "hard",
            "timeBucket": 3.0,
            "frequency": null,
            "goal": 7
        }))
        .unwrap();

        assert_eq!(raw.objective, Some(2.0));
        assert_eq!(raw.difficulty, None);
        assert_eq!(raw.time_bucket, Some(3.0));
        assert_eq!(raw.frequency, None);
        assert_eq!(raw.goal, None);
    }

    #[test]
    fn test_ranked_result_flattens_item() {
        let item = ScorableItem {
            id: "A".to_string(),
            name: "HIIT 20".to_string(),
            objective_id: Some(1),
            level: Some(2),
            focus: "HIIT".to_string(),
            minutes: Some(20.0),
            base_score: 0.0,
            scheme: Some("fatloss".to_string()),
        };
        let result = RankedResult {
            item,
            score: 0.5,
            explanation: ScoreExplanation {
                factors: FactorScores::default(),
                weighted: FactorScores::default(),
                weights: ScoreWeights::default(),
                base: 0.5,
                suggestion_focus_boost: 0.0,
                suggestion_scheme_boost: 0.0,
                penalty: 0.0,
                suggestion: None,
            },
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["id"], "A");
        assert_eq!(json["focus"], "HIIT");
        assert_eq!(json["score"], 0.5);
        assert!(json["explanation"]["weights"]["objective"].is_number());
    }
}
