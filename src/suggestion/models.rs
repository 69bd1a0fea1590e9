//! Wire models for the suggestion service

use crate::ranking::RankingInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Advisory signal returned by the suggestion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionSignal {
    pub focus_label: Option<String>,
    pub scheme_label: Option<String>,
    pub confidence: Option<f64>,
    /// Opaque service metadata, kept for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl SuggestionSignal {
    pub fn new(focus_label: Option<&str>, scheme_label: Option<&str>) -> Self {
        Self {
            focus_label: focus_label.map(str::to_string),
            scheme_label: scheme_label.map(str::to_string),
            confidence: None,
            metadata: None,
        }
    }

    /// True when the focus label equals `focus`, ignoring case
    pub fn matches_focus(&self, focus: &str) -> bool {
        labels_match(self.focus_label.as_deref(), Some(focus))
    }

    /// True when the scheme label equals `scheme`, ignoring case
    pub fn matches_scheme(&self, scheme: Option<&str>) -> bool {
        labels_match(self.scheme_label.as_deref(), scheme)
    }
}

fn labels_match(label: Option<&str>, tag: Option<&str>) -> bool {
    match (label.map(str::trim), tag.map(str::trim)) {
        (Some(l), Some(t)) if !l.is_empty() && !t.is_empty() => {
            l.to_lowercase() == t.to_lowercase()
        }
        _ => false,
    }
}

/// `POST /predict` request body, using the service's field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub objetivo: u8,
    pub dificultad: u8,
    pub limitacion: u8,
    pub tiempo: u8,
    pub frecuencia: u8,
}

impl From<&RankingInput> for PredictRequest {
    fn from(input: &RankingInput) -> Self {
        Self {
            objetivo: input.objective,
            dificultad: input.difficulty,
            limitacion: input.limitation,
            tiempo: input.time_bucket,
            frecuencia: input.frequency,
        }
    }
}

/// `POST /predict` response
///
/// The service has shipped several shapes: labels may sit in
/// `focus_plan_label`/`scheme_label` or directly in `focus_plan`/`scheme`
/// (which are structured values in newer versions).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub focus_plan_label: Option<Value>,
    #[serde(default)]
    pub scheme_label: Option<Value>,
    #[serde(default)]
    pub focus_plan: Option<Value>,
    #[serde(default)]
    pub scheme: Option<Value>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl PredictResponse {
    /// Extract a signal; `None` when neither label is present
    pub fn into_signal(self) -> Option<SuggestionSignal> {
        let focus_label = label(&self.focus_plan_label).or_else(|| label(&self.focus_plan));
        let scheme_label = label(&self.scheme_label).or_else(|| label(&self.scheme));

        if focus_label.is_none() && scheme_label.is_none() {
            return None;
        }

        let confidence = self
            .metadata
            .as_ref()
            .and_then(|m| m.get("confidence"))
            .or(self.confidence.as_ref())
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite());

        Some(SuggestionSignal {
            focus_label,
            scheme_label,
            confidence,
            metadata: self.metadata,
        })
    }
}

fn label(value: &Option<Value>) -> Option<String> {
    value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
