//! Layered configuration: defaults, optional TOML file, `RANKER__*` env vars

use crate::error::{RankerError, Result};
use crate::ranking::ScoreWeights;
use crate::suggestion::SuggestionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `RANKER__SUGGESTION__ENDPOINT`
pub const ENV_PREFIX: &str = "RANKER";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankerConfig {
    #[serde(default)]
    pub suggestion: SuggestionConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ranking and scoring parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Results returned when the caller does not ask for a count
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Lookback for the repetition penalty
    #[serde(default = "default_penalty_window_hours")]
    pub penalty_window_hours: i64,

    /// Penalty for a routine used inside the window
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f64,

    #[serde(default)]
    pub weights: ScoreWeights,

    /// Added when the suggested focus matches the routine focus
    #[serde(default = "default_focus_boost")]
    pub focus_boost: f64,

    /// Added when the suggested scheme matches the routine scheme
    #[serde(default = "default_scheme_boost")]
    pub scheme_boost: f64,

    /// Focus tag for routines that declare none
    #[serde(default = "default_focus")]
    pub default_focus: String,
}

fn default_top_k() -> usize { 5 }
fn default_penalty_window_hours() -> i64 { 48 }
fn default_repeat_penalty() -> f64 { 0.30 }
fn default_focus_boost() -> f64 { 0.12 }
fn default_scheme_boost() -> f64 { 0.08 }
fn default_focus() -> String { "full-body".to_string() }

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            penalty_window_hours: default_penalty_window_hours(),
            repeat_penalty: default_repeat_penalty(),
            weights: ScoreWeights::default(),
            focus_boost: default_focus_boost(),
            scheme_boost: default_scheme_boost(),
            default_focus: default_focus(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl RankerConfig {
    /// Load configuration from `.env`, an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the ranker cannot work with
    pub fn validate(&self) -> Result<()> {
        let ranking = &self.ranking;
        if ranking.top_k == 0 {
            return Err(RankerError::Configuration("ranking.top_k must be at least 1".to_string()));
        }
        if ranking.penalty_window_hours <= 0 {
            return Err(RankerError::Configuration(
                "ranking.penalty_window_hours must be positive".to_string(),
            ));
        }

        let w = &ranking.weights;
        let values = [
            ("ranking.repeat_penalty", ranking.repeat_penalty),
            ("ranking.focus_boost", ranking.focus_boost),
            ("ranking.scheme_boost", ranking.scheme_boost),
            ("ranking.weights.objective", w.objective),
            ("ranking.weights.level", w.level),
            ("ranking.weights.minutes", w.minutes),
            ("ranking.weights.focus", w.focus),
            ("ranking.weights.diversity", w.diversity),
            ("ranking.weights.catalogBias", w.catalog_bias),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(RankerError::Configuration(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }

        if self.suggestion.cache_ttl_secs == 0 {
            return Err(RankerError::Configuration(
                "suggestion.cache_ttl_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RankerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ranking.top_k, 5);
        assert_eq!(config.ranking.penalty_window_hours, 48);
        assert_eq!(config.ranking.repeat_penalty, 0.30);
        assert_eq!(config.ranking.default_focus, "full-body");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_from_toml_str() {
        let config = RankerConfig::from_toml_str(
            r#"
            [suggestion]
            endpoint = "http://127.0.0.1:8000"
            timeout_ms = 800

            [ranking]
            top_k = 3
            repeat_penalty = 0.25

            [ranking.weights]
            objective = 0.5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.suggestion.endpoint(), Some("http://127.0.0.1:8000"));
        assert_eq!(config.suggestion.timeout_ms, 800);
        assert_eq!(config.suggestion.retry_backoff_ms, 120);
        assert_eq!(config.ranking.top_k, 3);
        assert_eq!(config.ranking.repeat_penalty, 0.25);
        assert_eq!(config.ranking.weights.objective, 0.5);
        assert_eq!(config.ranking.weights.level, 0.20);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = RankerConfig::default();
        config.ranking.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = RankerConfig::default();
        config.ranking.weights.minutes = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ranking.weights.minutes"));

        let mut config = RankerConfig::default();
        config.suggestion.cache_ttl_secs = 0;
        assert!(config.validate().is_err());
    }
}
