//! Tolerant decoding of the model's reply.
//!
//! The model is only asked to follow the schema, so every field is taken
//! when present and well-typed and replaced by a fixed default otherwise.
//! The result is always a structurally valid [`AnalysisResponse`].

use crate::models::{AnalysisResponse, FacialMetric, MetricCategory};
use crate::tier::Tier;
use crate::{Error, Result};
use serde_json::{Map, Value};

pub const DEFAULT_CURRENT_SCORE: f64 = 5.5;
pub const DEFAULT_POTENTIAL_SCORE: f64 = 8.0;
pub const DEFAULT_SUMMARY: &str = "Analysis complete.";

/// Strip a surrounding triple-backtick fence, optionally tagged `json`.
pub fn strip_code_fence(content: &str) -> &str {
    let mut cleaned = content.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Parse model output into a JSON object, logging the raw text on failure.
pub fn parse_analysis(content: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(strip_code_fence(content)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            tracing::error!("Model reply is JSON but not an object: {}", other);
            Err(Error::Parse("expected a JSON object".to_string()))
        }
        Err(e) => {
            tracing::error!("Failed to parse model reply: {}\nContent: {}", e, content);
            Err(Error::Parse(e.to_string()))
        }
    }
}

pub fn normalize(analysis: &Map<String, Value>) -> AnalysisResponse {
    let current_score = score_field(analysis, "currentScore").unwrap_or_else(|| {
        tracing::warn!("currentScore missing, using {}", DEFAULT_CURRENT_SCORE);
        DEFAULT_CURRENT_SCORE
    });
    let potential_score = score_field(analysis, "potentialScore").unwrap_or_else(|| {
        tracing::warn!("potentialScore missing, using {}", DEFAULT_POTENTIAL_SCORE);
        DEFAULT_POTENTIAL_SCORE
    });

    if potential_score < current_score {
        tracing::debug!(
            "potentialScore {} below currentScore {}, passing through",
            potential_score,
            current_score
        );
    }

    let metrics = match analysis.get("metrics") {
        Some(Value::Array(items)) => items.iter().filter_map(normalize_metric).collect(),
        _ => {
            tracing::warn!("metrics missing or not a list");
            Vec::new()
        }
    };

    let summary = analysis
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUMMARY)
        .to_string();

    AnalysisResponse {
        success: true,
        current_score,
        potential_score,
        current_tier: tier_field(analysis, "currentTier", current_score),
        potential_tier: tier_field(analysis, "potentialTier", potential_score),
        metrics,
        summary,
        priority_actions: string_list(analysis.get("priorityActions")),
        error: None,
    }
}

fn normalize_metric(value: &Value) -> Option<FacialMetric> {
    let metric = value.as_object()?;

    let id = metric
        .get("id")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();
    let label = metric
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| MetricCategory::from_id(&id).map(|c| c.label().to_string()))
        .unwrap_or_else(|| id.clone());

    if id.is_empty() && label.is_empty() {
        tracing::warn!("Dropping metric without id or label");
        return None;
    }

    Some(FacialMetric {
        score: score_field(metric, "score").unwrap_or(DEFAULT_CURRENT_SCORE),
        potential: score_field(metric, "potential").unwrap_or(DEFAULT_POTENTIAL_SCORE),
        insights: metric
            .get("insights")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        improvements: string_list(metric.get("improvements")),
        id,
        label,
    })
}

/// Any finite, non-zero number; numeric strings are accepted.
/// Out-of-range values pass through for the tier classifier to bucket.
fn score_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    let score = match object.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (score.is_finite() && score != 0.0).then_some(score)
}

/// A tier label from the vocabulary, else the tier for `score`.
fn tier_field(object: &Map<String, Value>, key: &str, score: f64) -> Tier {
    match object.get(key).and_then(Value::as_str) {
        Some(label) => label.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown {} '{}', deriving from score", key, label);
            Tier::from_score(score)
        }),
        None => Tier::from_score(score),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
