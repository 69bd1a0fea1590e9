//! Routine ranking engine
//!
//! Normalizes preferences, adapts catalog records, builds the repetition
//! penalty, and produces an explained, ordered top-K.

pub mod catalog;
pub mod models;
pub mod normalizer;
pub mod penalty;
pub mod ranker;
pub mod scorer;

pub use catalog::{CatalogAdapter, FocusRule, MinutesRule};
pub use models::{
    FactorScores, PenaltyMap, RankedResult, RankingInput, RawRankingInput, ScorableItem,
    ScoreExplanation, ScoreWeights, SessionRecord,
};
pub use normalizer::normalize;
pub use penalty::{sessions_from_raw, PenaltyPolicy, RawSessionRecord};
pub use ranker::{RankOptions, Ranker};
pub use scorer::{Scorer, ScoringContext};
