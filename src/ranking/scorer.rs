//! Explainable multi-factor routine scorer.
//!
//! Factors: objective match, level match, minutes fit, focus, diversity,
//! catalog bias. The weighted sum forms the base score; suggestion boosts are
//! added and the repetition penalty subtracted outside the weighted base.

use super::models::{
    FactorScores, PenaltyMap, RankedResult, RankingInput, ScorableItem, ScoreExplanation,
    ScoreWeights,
};
use crate::suggestion::SuggestionSignal;

/// Objective factor when the objective does not match
pub const OBJECTIVE_MISMATCH: f64 = 0.2;
/// Level factor for a one-step gap
pub const LEVEL_ADJACENT: f64 = 0.6;
/// Level factor for larger or unknown gaps
pub const LEVEL_FAR: f64 = 0.1;
/// Minutes factor when the routine length is unknown
pub const MINUTES_UNKNOWN: f64 = 0.5;
/// Minutes below the range over which the fit decays to zero
pub const MINUTES_SHORT_MARGIN: f64 = 20.0;
/// Minutes above the range over which the fit decays to zero
pub const MINUTES_LONG_MARGIN: f64 = 30.0;
/// Focus factor for routines that declare a focus tag
pub const FOCUS_DECLARED: f64 = 0.6;

/// Per-call scoring inputs shared by every item
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub input: &'a RankingInput,
    /// Focus tag of the previous session, if known
    pub last_focus: Option<&'a str>,
    pub penalties: &'a PenaltyMap,
    pub suggestion: Option<&'a SuggestionSignal>,
}

/// Weighted scorer
#[derive(Debug, Clone, PartialEq)]
pub struct Scorer {
    pub weights: ScoreWeights,
    pub focus_boost: f64,
    pub scheme_boost: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            focus_boost: 0.12,
            scheme_boost: 0.08,
        }
    }
}

impl Scorer {
    pub fn new(weights: ScoreWeights, focus_boost: f64, scheme_boost: f64) -> Self {
        Self {
            weights,
            focus_boost,
            scheme_boost,
        }
    }

    /// Unweighted factor scores for one item
    pub fn factors(&self, item: &ScorableItem, ctx: &ScoringContext<'_>) -> FactorScores {
        FactorScores {
            objective: objective_match(item.objective_id, ctx.input.objective),
            level: level_match(item.level, ctx.input.difficulty),
            minutes: minutes_fit(item.minutes, ctx.input.minute_range()),
            focus: if item.focus.trim().is_empty() {
                0.0
            } else {
                FOCUS_DECLARED
            },
            diversity: diversity_bonus(&item.focus, ctx.last_focus),
            catalog_bias: if item.base_score.is_finite() {
                item.base_score.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    /// Score one item; the result is never negative
    pub fn score(&self, item: &ScorableItem, ctx: &ScoringContext<'_>) -> (f64, ScoreExplanation) {
        let factors = self.factors(item, ctx);
        let weighted = self.weights.contributions(&factors);
        let base = self.weights.apply(&factors);

        let (focus_boost, scheme_boost) = match ctx.suggestion {
            Some(signal) => (
                if signal.matches_focus(&item.focus) {
                    self.focus_boost
                } else {
                    0.0
                },
                if signal.matches_scheme(item.scheme.as_deref()) {
                    self.scheme_boost
                } else {
                    0.0
                },
            ),
            None => (0.0, 0.0),
        };

        let penalty = ctx.penalties.penalty_for(&item.id);
        let score = (base + focus_boost + scheme_boost - penalty).max(0.0);

        let explanation = ScoreExplanation {
            factors,
            weighted,
            weights: self.weights,
            base,
            suggestion_focus_boost: focus_boost,
            suggestion_scheme_boost: scheme_boost,
            penalty,
            suggestion: ctx.suggestion.cloned(),
        };

        (score, explanation)
    }

    /// Score an item and attach the result
    pub fn rank_item(&self, item: ScorableItem, ctx: &ScoringContext<'_>) -> RankedResult {
        let (score, explanation) = self.score(&item, ctx);
        RankedResult {
            item,
            score,
            explanation,
        }
    }
}

fn objective_match(objective_id: Option<i64>, objective: u8) -> f64 {
    match objective_id {
        Some(id) if id == i64::from(objective) => 1.0,
        _ => OBJECTIVE_MISMATCH,
    }
}

fn level_match(level: Option<i64>, difficulty: u8) -> f64 {
    match level.map(|l| l.abs_diff(i64::from(difficulty))) {
        Some(0) => 1.0,
        Some(1) => LEVEL_ADJACENT,
        _ => LEVEL_FAR,
    }
}

/// Fit of a routine length against `[lo, hi]`, linear decay outside
pub fn minutes_fit(minutes: Option<f64>, (lo, hi): (f64, f64)) -> f64 {
    let minutes = match minutes {
        Some(m) if m.is_finite() => m,
        _ => return MINUTES_UNKNOWN,
    };

    let fit = if minutes < lo {
        1.0 - (lo - minutes) / MINUTES_SHORT_MARGIN
    } else if minutes > hi {
        1.0 - (minutes - hi) / MINUTES_LONG_MARGIN
    } else {
        1.0
    };
    fit.clamp(0.0, 1.0)
}

fn diversity_bonus(focus: &str, last_focus: Option<&str>) -> f64 {
    match last_focus.map(str::trim).filter(|f| !f.is_empty()) {
        Some(last) if !last.eq_ignore_ascii_case(focus.trim()) => 1.0,
        _ => 0.0,
    }
}
