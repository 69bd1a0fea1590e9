//! Input normalization
//!
//! Every preference field is validated against its domain; anything that is
//! missing, non-finite, fractional or out of range takes the field default.
//! When a coded field is absent entirely, it can be derived from the UI
//! vocabulary (`goal`, `experience`, `minutes`) before validation.

use super::models::{RankingInput, RawRankingInput};

/// Inclusive domain and default for one coded field
#[derive(Debug, Clone, Copy)]
pub struct FieldDomain {
    pub min: u8,
    pub max: u8,
    pub default: u8,
}

impl FieldDomain {
    const fn new(min: u8, max: u8, default: u8) -> Self {
        Self { min, max, default }
    }

    /// Validate a raw value, returning the default when it does not fit
    pub fn resolve(&self, value: Option<f64>) -> u8 {
        match value {
            Some(v) if v.is_finite() && v.fract() == 0.0 => {
                if v >= f64::from(self.min) && v <= f64::from(self.max) {
                    v as u8
                } else {
                    self.default
                }
            }
            _ => self.default,
        }
    }
}

pub const OBJECTIVE: FieldDomain = FieldDomain::new(0, 4, 1);
pub const DIFFICULTY: FieldDomain = FieldDomain::new(0, 3, 1);
pub const LIMITATION: FieldDomain = FieldDomain::new(0, 5, 0);
pub const TIME_BUCKET: FieldDomain = FieldDomain::new(1, 4, 2);
pub const FREQUENCY: FieldDomain = FieldDomain::new(1, 7, 3);

/// Normalize raw preferences into a canonical [`RankingInput`]. Never fails.
pub fn normalize(raw: &RawRankingInput) -> RankingInput {
    let objective = raw
        .objective
        .or_else(|| raw.goal.as_deref().map(objective_from_goal));
    let difficulty = raw
        .difficulty
        .or_else(|| raw.experience.as_deref().map(difficulty_from_experience));
    let time_bucket = raw.time_bucket.or_else(|| raw.minutes.and_then(bucket_from_minutes));

    RankingInput {
        objective: OBJECTIVE.resolve(objective),
        difficulty: DIFFICULTY.resolve(difficulty),
        limitation: LIMITATION.resolve(raw.limitation),
        time_bucket: TIME_BUCKET.resolve(time_bucket),
        frequency: FREQUENCY.resolve(raw.frequency),
    }
}

fn objective_from_goal(goal: &str) -> f64 {
    let goal = goal.to_lowercase();
    if goal.contains("mus") {
        2.0
    } else if goal.contains("hiit") || goal.contains("cardio") {
        3.0
    } else if goal.contains("recomp") {
        4.0
    } else {
        1.0
    }
}

fn difficulty_from_experience(experience: &str) -> f64 {
    let experience = experience.to_lowercase();
    if experience.contains("avan") {
        3.0
    } else if experience.contains("inter") {
        2.0
    } else {
        1.0
    }
}

fn bucket_from_minutes(minutes: f64) -> Option<f64> {
    if !minutes.is_finite() {
        return None;
    }
    let bucket = if minutes < 20.0 {
        1.0
    } else if minutes < 30.0 {
        2.0
    } else if minutes < 45.0 {
        3.0
    } else {
        4.0
    };
    Some(bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RankingInput {
        RankingInput {
            objective: 1,
            difficulty: 1,
            limitation: 0,
            time_bucket: 2,
            frequency: 3,
        }
    }

    #[test]
    fn test_empty_input_takes_defaults() {
        assert_eq!(normalize(&RawRankingInput::default()), defaults());
    }

    #[test]
    fn test_valid_input_is_kept() {
        let raw = RawRankingInput::coded(4.0, 3.0, 5.0, 4.0, 7.0);
        let input = normalize(&raw);
        assert_eq!(input.objective, 4);
        assert_eq!(input.difficulty, 3);
        assert_eq!(input.limitation, 5);
        assert_eq!(input.time_bucket, 4);
        assert_eq!(input.frequency, 7);
    }

    #[test]
    fn test_out_of_range_replaced_by_default() {
        let raw = RawRankingInput::coded(9.0, -1.0, 6.0, 0.0, 8.0);
        assert_eq!(normalize(&raw), defaults());
    }

    #[test]
    fn test_non_finite_and_fractional_replaced() {
        let raw = RawRankingInput::coded(f64::NAN, f64::INFINITY, 2.5, f64::NEG_INFINITY, 3.3);
        assert_eq!(normalize(&raw), defaults());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize(&RawRankingInput::coded(2.0, 3.0, 1.0, 4.0, 5.0));
        let twice = normalize(&RawRankingInput::from(once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ui_vocabulary_derives_missing_fields() {
        let raw = RawRankingInput {
            goal: Some("ganar_musculo".to_string()),
            experience: Some("Avanzado".to_string()),
            minutes: Some(35.0),
            ..Default::default()
        };
        let input = normalize(&raw);
        assert_eq!(input.objective, 2);
        assert_eq!(input.difficulty, 3);
        assert_eq!(input.time_bucket, 3);
    }

    #[test]
    fn test_coded_fields_win_over_ui_vocabulary() {
        let raw = RawRankingInput {
            objective: Some(0.0),
            goal: Some("hiit".to_string()),
            time_bucket: Some(1.0),
            minutes: Some(50.0),
            ..Default::default()
        };
        let input = normalize(&raw);
        assert_eq!(input.objective, 0);
        assert_eq!(input.time_bucket, 1);
    }

    #[test]
    fn test_minutes_buckets() {
        assert_eq!(bucket_from_minutes(10.0), Some(1.0));
        assert_eq!(bucket_from_minutes(20.0), Some(2.0));
        assert_eq!(bucket_from_minutes(44.9), Some(3.0));
        assert_eq!(bucket_from_minutes(90.0), Some(4.0));
        assert_eq!(bucket_from_minutes(f64::NAN), None);
    }
}
