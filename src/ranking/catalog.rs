//! Catalog adapter
//!
//! Stored routine documents come in several shapes (English and Spanish field
//! names, a nested `_meta` object, item lists with per-exercise durations).
//! Each canonical field is resolved by walking an ordered list of rules; the
//! first rule that yields a value wins. Malformed documents never fail: every
//! field has a documented fallback.

use super::models::ScorableItem;
use serde_json::Value;
use tracing::warn;

/// Fallback rule for routine minutes, tried in order
#[derive(Debug, Clone, PartialEq)]
pub enum MinutesRule {
    /// Explicit numeric field at a JSON pointer
    Field(&'static str),
    /// Sum of per-item duration hints inside a list at a JSON pointer
    SumItemDurations {
        list: &'static str,
        hints: &'static [&'static str],
    },
}

/// Fallback rule for the focus tag, tried in order
#[derive(Debug, Clone, PartialEq)]
pub enum FocusRule {
    /// Explicit tag at a JSON pointer; a list value yields its first tag
    Field(&'static str),
    /// First entry of a tag list at a JSON pointer
    FirstTag(&'static str),
    /// Constant fallback
    Default(String),
}

const ITEM_DURATION_HINTS: &[&str] = &["mins", "minutes", "minutos"];

/// Default minutes resolution order
pub fn default_minutes_rules() -> Vec<MinutesRule> {
    vec![
        MinutesRule::Field("/minutes"),
        MinutesRule::Field("/minutos"),
        MinutesRule::Field("/mins"),
        MinutesRule::Field("/_meta/minutos"),
        MinutesRule::Field("/_meta/minutes"),
        MinutesRule::SumItemDurations {
            list: "/items",
            hints: ITEM_DURATION_HINTS,
        },
        MinutesRule::SumItemDurations {
            list: "/ejercicios",
            hints: ITEM_DURATION_HINTS,
        },
    ]
}

/// Default focus resolution order
pub fn default_focus_rules(fallback: &str) -> Vec<FocusRule> {
    vec![
        FocusRule::Field("/focus"),
        FocusRule::Field("/foco"),
        FocusRule::Field("/_meta/foco"),
        FocusRule::Field("/_meta/focus"),
        FocusRule::FirstTag("/tags"),
        FocusRule::FirstTag("/_meta/tags"),
        FocusRule::Default(fallback.to_string()),
    ]
}

const OBJECTIVE_FIELDS: &[&str] = &["/objectiveId", "/objetivoId", "/_meta/objetivoId"];
const LEVEL_FIELDS: &[&str] = &["/level", "/nivel", "/_meta/nivel"];
const BASE_SCORE_FIELDS: &[&str] = &["/baseScore", "/_meta/baseScore"];
const SCHEME_FIELDS: &[&str] = &["/scheme", "/_meta/scheme"];
const NAME_FIELDS: &[&str] = &["/name", "/nombre"];

const DEFAULT_OBJECTIVE: i64 = 1;
const DEFAULT_LEVEL: i64 = 1;
const DEFAULT_NAME: &str = "Routine";

/// Converts raw routine documents into [`ScorableItem`]s
#[derive(Debug, Clone)]
pub struct CatalogAdapter {
    minutes_rules: Vec<MinutesRule>,
    focus_rules: Vec<FocusRule>,
}

impl Default for CatalogAdapter {
    fn default() -> Self {
        Self::new(default_minutes_rules(), default_focus_rules("full-body"))
    }
}

impl CatalogAdapter {
    pub fn new(minutes_rules: Vec<MinutesRule>, focus_rules: Vec<FocusRule>) -> Self {
        Self {
            minutes_rules,
            focus_rules,
        }
    }

    /// Adapter whose last focus rule falls back to `default_focus`
    pub fn with_default_focus(default_focus: &str) -> Self {
        Self::new(default_minutes_rules(), default_focus_rules(default_focus))
    }

    pub fn minutes_rules(&self) -> &[MinutesRule] {
        &self.minutes_rules
    }

    pub fn focus_rules(&self) -> &[FocusRule] {
        &self.focus_rules
    }

    /// Adapt a whole catalog, keeping its order
    pub fn adapt_all(&self, docs: &[Value]) -> Vec<ScorableItem> {
        docs.iter()
            .enumerate()
            .map(|(index, doc)| self.adapt(doc, index))
            .collect()
    }

    /// Adapt one document; `index` provides the id when the document has none
    pub fn adapt(&self, doc: &Value, index: usize) -> ScorableItem {
        if !doc.is_object() {
            warn!("Catalog record {} is not an object, using defaults", index);
        }

        let id = match doc.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("item-{}", index),
        };

        let name = NAME_FIELDS
            .iter()
            .find_map(|p| non_empty_str(doc.pointer(p)))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        ScorableItem {
            id,
            name,
            objective_id: Some(first_int(doc, OBJECTIVE_FIELDS).unwrap_or(DEFAULT_OBJECTIVE)),
            level: Some(first_int(doc, LEVEL_FIELDS).unwrap_or(DEFAULT_LEVEL)),
            focus: self.resolve_focus(doc),
            minutes: self.resolve_minutes(doc),
            base_score: BASE_SCORE_FIELDS
                .iter()
                .find_map(|p| finite_number(doc.pointer(p)))
                .unwrap_or(0.0)
                .clamp(0.0, 1.0),
            scheme: SCHEME_FIELDS
                .iter()
                .find_map(|p| non_empty_str(doc.pointer(p))),
        }
    }

    /// Minutes from the first rule that yields a value, `None` if none does
    pub fn resolve_minutes(&self, doc: &Value) -> Option<f64> {
        self.minutes_rules.iter().find_map(|rule| match rule {
            MinutesRule::Field(pointer) => finite_number(doc.pointer(pointer)),
            MinutesRule::SumItemDurations { list, hints } => {
                let items = doc.pointer(list)?.as_array()?;
                let durations: Vec<f64> = items
                    .iter()
                    .filter_map(|item| hints.iter().find_map(|h| finite_number(item.get(*h))))
                    .collect();
                if durations.is_empty() {
                    None
                } else {
                    Some(durations.iter().sum())
                }
            }
        })
    }

    /// Focus tag from the first rule that yields a value
    pub fn resolve_focus(&self, doc: &Value) -> String {
        self.focus_rules
            .iter()
            .find_map(|rule| match rule {
                FocusRule::Field(pointer) => match doc.pointer(pointer) {
                    Some(Value::Array(tags)) => first_tag(tags),
                    other => non_empty_str(other),
                },
                FocusRule::FirstTag(pointer) => doc
                    .pointer(pointer)
                    .and_then(Value::as_array)
                    .and_then(|tags| first_tag(tags)),
                FocusRule::Default(tag) => Some(tag.clone()),
            })
            .unwrap_or_default()
    }
}

fn first_tag(tags: &[Value]) -> Option<String> {
    tags.iter().find_map(|t| non_empty_str(Some(t)))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn first_int(doc: &Value, pointers: &[&str]) -> Option<i64> {
    pointers
        .iter()
        .find_map(|p| finite_number(doc.pointer(p)))
        .map(|f| f.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_document() {
        let adapter = CatalogAdapter::default();
        let item = adapter.adapt(
            &json!({
                "id": "A", "name": "HIIT 20", "focus": "HIIT", "minutes": 20,
                "level": 2, "scheme": "fatloss", "objectiveId": 3, "baseScore": 0.7
            }),
            0,
        );

        assert_eq!(item.id, "A");
        assert_eq!(item.name, "HIIT 20");
        assert_eq!(item.focus, "HIIT");
        assert_eq!(item.minutes, Some(20.0));
        assert_eq!(item.level, Some(2));
        assert_eq!(item.objective_id, Some(3));
        assert_eq!(item.scheme.as_deref(), Some("fatloss"));
        assert_eq!(item.base_score, 0.7);
    }

    #[test]
    fn test_spanish_document() {
        let adapter = CatalogAdapter::default();
        let item = adapter.adapt(
            &json!({
                "id": "fuerza45", "name": "Fuerza 45", "foco": "Fuerza", "minutos": 45,
                "nivel": 2, "scheme": "muscle", "objetivoId": 2, "baseScore": 0.6
            }),
            0,
        );

        assert_eq!(item.focus, "Fuerza");
        assert_eq!(item.minutes, Some(45.0));
        assert_eq!(item.level, Some(2));
        assert_eq!(item.objective_id, Some(2));
    }

    #[test]
    fn test_meta_document_with_item_durations() {
        let adapter = CatalogAdapter::default();
        let item = adapter.adapt(
            &json!({
                "id": "u1",
                "name": "Mi rutina",
                "items": [
                    {"name": "Sentadilla", "mins": 10},
                    {"name": "Plancha", "minutes": 5},
                    {"name": "Remo"}
                ],
                "_meta": {"tags": ["core", "legs"], "nivel": 3, "baseScore": 4.0}
            }),
            0,
        );

        assert_eq!(item.minutes, Some(15.0));
        assert_eq!(item.focus, "core");
        assert_eq!(item.level, Some(3));
        assert_eq!(item.base_score, 1.0);
    }

    #[test]
    fn test_explicit_minutes_win_over_item_hints() {
        let adapter = CatalogAdapter::default();
        let doc = json!({"minutos": 30, "items": [{"mins": 10}]});
        assert_eq!(adapter.resolve_minutes(&doc), Some(30.0));
    }

    #[test]
    fn test_focus_list_takes_first_tag() {
        let adapter = CatalogAdapter::default();
        assert_eq!(adapter.resolve_focus(&json!({"focus": ["cardio", "upper"]})), "cardio");
        assert_eq!(adapter.resolve_focus(&json!({"focus": [], "tags": ["glutes"]})), "glutes");
    }

    #[test]
    fn test_malformed_record_uses_defaults() {
        let adapter = CatalogAdapter::default();
        let item = adapter.adapt(&json!({"minutes": "soon", "level": [], "focus": 12}), 4);

        assert_eq!(item.id, "item-4");
        assert_eq!(item.name, "Routine");
        assert_eq!(item.focus, "full-body");
        assert_eq!(item.minutes, None);
        assert_eq!(item.level, Some(1));
        assert_eq!(item.objective_id, Some(1));
        assert_eq!(item.base_score, 0.0);
        assert_eq!(item.scheme, None);

        let item = adapter.adapt(&json!("not a routine"), 0);
        assert_eq!(item.id, "item-0");
    }

    #[test]
    fn test_custom_default_focus() {
        let adapter = CatalogAdapter::with_default_focus("mobility");
        assert_eq!(adapter.resolve_focus(&json!({})), "mobility");
        assert_eq!(
            adapter.focus_rules().last(),
            Some(&FocusRule::Default("mobility".to_string()))
        );
    }

    #[test]
    fn test_adapt_all_keeps_order() {
        let adapter = CatalogAdapter::default();
        let items = adapter.adapt_all(&[json!({"id": "b"}), json!({"id": 7}), json!({})]);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "7", "item-2"]);
    }
}
