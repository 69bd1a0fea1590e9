//! Repetition penalty over a fixed lookback window
//!
//! A routine used within the window gets a flat penalty. Sessions older than
//! the window contribute nothing (hard cutoff, no decay) and repeated use
//! inside the window does not compound.

use super::models::{PenaltyMap, SessionRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Window and penalty constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyPolicy {
    pub window: Duration,
    pub penalty: f64,
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self {
            window: Duration::hours(48),
            penalty: 0.30,
        }
    }
}

impl PenaltyPolicy {
    pub fn new(window_hours: i64, penalty: f64) -> Self {
        Self {
            window: Duration::hours(window_hours),
            penalty,
        }
    }

    /// Build the penalty map for a session history.
    ///
    /// `now_millis` defaults to the current time. The result does not depend
    /// on the order of `sessions`.
    pub fn build(&self, sessions: &[SessionRecord], now_millis: Option<i64>) -> PenaltyMap {
        let now = now_millis.unwrap_or_else(|| Utc::now().timestamp_millis());
        let window_ms = self.window.num_milliseconds();

        let mut map = PenaltyMap::new();
        let mut inside = 0;
        for session in sessions {
            // Saturates for absurd timestamps, which then fall outside the window
            if now.saturating_sub(session.timestamp_millis) <= window_ms {
                map.raise(&session.item_id, self.penalty);
                inside += 1;
            }
        }

        debug!(
            "Penalty map: {} of {} sessions inside {}h window, {} items penalized",
            inside,
            sessions.len(),
            self.window.num_hours(),
            map.len()
        );

        map
    }
}

/// Session history entry as stored externally: `{id, at}`
///
/// `at` may be epoch milliseconds, an RFC 3339 string, or a
/// `{seconds, nanoseconds}` timestamp object. Any JSON value deserializes;
/// records without a usable id or time are skipped later by [`sessions_from_raw`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawSessionRecord {
    pub id: Value,
    pub at: Value,
}

const ID_FIELDS: &[&str] = &["id", "routineId", "itemId"];
const TIME_FIELDS: &[&str] = &["at", "createdAt", "timestamp"];

impl From<Value> for RawSessionRecord {
    fn from(value: Value) -> Self {
        let first = |fields: &[&str]| {
            fields
                .iter()
                .find_map(|f| value.get(*f).filter(|v| !v.is_null()))
                .cloned()
                .unwrap_or(Value::Null)
        };
        Self {
            id: first(ID_FIELDS),
            at: first(TIME_FIELDS),
        }
    }
}

impl RawSessionRecord {
    /// Convert to a [`SessionRecord`], or `None` when id or time is unusable
    pub fn to_record(&self) -> Option<SessionRecord> {
        let id = match &self.id {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let millis = timestamp_millis(&self.at)?;
        Some(SessionRecord::new(id, millis))
    }
}

/// Convert raw session records, skipping the ones that cannot be read
pub fn sessions_from_raw(raw: &[RawSessionRecord]) -> Vec<SessionRecord> {
    raw.iter()
        .filter_map(|r| {
            let record = r.to_record();
            if record.is_none() {
                warn!("Skipping session record with unusable id or time: {:?}", r);
            }
            record
        })
        .collect()
}

/// Interpret a platform time value as epoch milliseconds
pub fn timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
            .ok()
            .or_else(|| s.trim().parse::<i64>().ok()),
        Value::Object(obj) => {
            let seconds = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            seconds
                .checked_mul(1000)?
                .checked_add(nanos / 1_000_000)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HOUR_MS: i64 = 3_600_000;
    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_recent_session_is_penalized() {
        let policy = PenaltyPolicy::default();
        let map = policy.build(&[SessionRecord::new("A", NOW - HOUR_MS)], Some(NOW));
        assert_eq!(map.get("A"), Some(0.30));
    }

    #[test]
    fn test_window_boundary() {
        let policy = PenaltyPolicy::default();
        let inside = policy.build(&[SessionRecord::new("A", NOW - 48 * HOUR_MS)], Some(NOW));
        assert!(inside.contains("A"));

        let outside = policy.build(&[SessionRecord::new("A", NOW - 49 * HOUR_MS)], Some(NOW));
        assert!(!outside.contains("A"));
        assert_eq!(outside.penalty_for("A"), 0.0);
    }

    #[test]
    fn test_repeated_use_does_not_compound() {
        let policy = PenaltyPolicy::default();
        let sessions = vec![
            SessionRecord::new("A", NOW - HOUR_MS),
            SessionRecord::new("A", NOW - 2 * HOUR_MS),
            SessionRecord::new("A", NOW - 3 * HOUR_MS),
        ];
        assert_eq!(policy.build(&sessions, Some(NOW)).get("A"), Some(0.30));
    }

    #[test]
    fn test_order_independent() {
        let policy = PenaltyPolicy::default();
        let mut sessions = vec![
            SessionRecord::new("A", NOW - HOUR_MS),
            SessionRecord::new("B", NOW - 60 * HOUR_MS),
            SessionRecord::new("C", NOW - 10 * HOUR_MS),
        ];
        let forward = policy.build(&sessions, Some(NOW));
        sessions.reverse();
        let backward = policy.build(&sessions, Some(NOW));
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn test_defaults_to_current_time() {
        let policy = PenaltyPolicy::default();
        let now = Utc::now().timestamp_millis();
        let map = policy.build(&[SessionRecord::new("A", now - HOUR_MS)], None);
        assert!(map.contains("A"));
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(timestamp_millis(&json!(1_700_000_000_000_i64)), Some(NOW));
        assert_eq!(timestamp_millis(&json!(1_700_000_000_000.4)), Some(NOW));
        assert_eq!(
            timestamp_millis(&json!("2023-11-14T22:13:20Z")),
            Some(NOW)
        );
        assert_eq!(
            timestamp_millis(&json!({"seconds": 1_700_000_000_i64, "nanoseconds": 5_000_000})),
            Some(NOW + 5)
        );
        assert_eq!(timestamp_millis(&json!(null)), None);
        assert_eq!(timestamp_millis(&json!({"seconds": i64::MAX})), None);
        assert_eq!(timestamp_millis(&json!("yesterday")), None);
    }

    #[test]
    fn test_sessions_from_raw_skips_bad_records() {
        let raw: Vec<RawSessionRecord> = serde_json::from_value(json!([
            {"id": "A", "at": NOW},
            {"routineId": "B", "createdAt": {"_seconds": 1_700_000_000_i64}},
            {"id": "C"},
            {"at": NOW}
        ]))
        .unwrap();

        let sessions = sessions_from_raw(&raw);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0], SessionRecord::new("A", NOW));
        assert_eq!(sessions[1], SessionRecord::new("B", NOW));
    }

    #[test]
    fn test_absurd_timestamps_do_not_overflow() {
        let policy = PenaltyPolicy::default();
        let sessions = vec![
            SessionRecord::new("past", i64::MIN),
            SessionRecord::new("recent", NOW - HOUR_MS),
        ];
        let map = policy.build(&sessions, Some(NOW));
        assert!(!map.contains("past"));
        assert!(map.contains("recent"));

        let far_past = timestamp_millis(&json!(-1e300)).unwrap();
        assert_eq!(far_past, i64::MIN);
        assert!(policy.build(&[SessionRecord::new("A", far_past)], Some(NOW)).is_empty());
    }

    #[test]
    fn test_duplicate_aliases_and_non_objects_are_tolerated() {
        let raw: Vec<RawSessionRecord> = serde_json::from_value(json!([
            {"id": "A", "routineId": "ignored", "at": NOW, "createdAt": 0},
            "not a record",
            42,
            {"id": null, "itemId": "B", "timestamp": NOW}
        ]))
        .unwrap();

        let sessions = sessions_from_raw(&raw);
        assert_eq!(
            sessions,
            vec![SessionRecord::new("A", NOW), SessionRecord::new("B", NOW)]
        );
    }
}
