//! Workout routine ranking
//!
//! Ranks a catalog of routines against user preferences with a deterministic,
//! explainable rule score, optionally boosted by an external suggestion
//! service that is consulted with a bounded timeout, one retry and a TTL
//! cache, and ignored whenever it is unavailable.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod ranking;
pub mod suggestion;

pub use config::RankerConfig;
pub use error::{RankerError, Result};
pub use ranking::{RankOptions, RankedResult, Ranker, RawRankingInput};
pub use suggestion::{SuggestionClient, SuggestionProvider, SuggestionSignal};
