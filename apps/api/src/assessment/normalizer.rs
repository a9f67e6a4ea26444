//! AI Response Normalizer: turns untrusted completion text into a well-formed result.
//!
//! The model's output is treated as external input: every field is coerced
//! with a default, bad resource entries are dropped one by one, and any
//! failure after the last attempt yields a deterministic fallback.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assessment::prompts::{display_career, StagePrompt};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, CompletionProvider, LlmError};
use crate::models::assessment::{Resource, ResourceKind};

/// One call plus one retry with the identical prompt.
pub const MAX_ATTEMPTS: u32 = 2;

/// Stage label used in the fallback when the caller has none.
const DEFAULT_FALLBACK_STAGE: &str = "intro";

/// Model output after coercion. Always well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub stage: String,
    pub message: String,
    pub next_question: Option<String>,
    pub resources: Vec<Resource>,
    pub final_step: bool,
    /// True when every attempt failed and this is canned content.
    pub is_fallback: bool,
}

#[derive(Debug, Error)]
enum NormalizeError {
    #[error("completion call failed: {0}")]
    Transport(#[from] LlmError),

    #[error("model returned empty output")]
    Empty,

    #[error("model output is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("model output is not a JSON object")]
    NotObject,

    #[error("model output has none of the expected keys: {0}")]
    MissingKeys(String),
}

/// Calls the completion provider and normalizes its output, retrying once on
/// any failure. Never returns an error.
pub async fn call_and_normalize(
    provider: &dyn CompletionProvider,
    prompt: &StagePrompt,
    career: &str,
    fallback_stage: Option<&str>,
) -> NormalizedResult {
    let fallback_stage = fallback_stage.unwrap_or(DEFAULT_FALLBACK_STAGE);

    for attempt in 1..=MAX_ATTEMPTS {
        debug!(
            "AI call attempt {}/{}: prompt_chars={}",
            attempt,
            MAX_ATTEMPTS,
            prompt.text.len()
        );

        let outcome = match provider
            .complete(JSON_ONLY_SYSTEM, &prompt.text, prompt.max_tokens)
            .await
        {
            Ok(raw) => {
                debug!("Raw AI output: {raw:?}");
                normalize_output(&raw, prompt.expected_keys, fallback_stage)
            }
            Err(e) => Err(NormalizeError::Transport(e)),
        };

        match outcome {
            Ok(result) => return result,
            Err(e) => warn!("AI attempt {}/{} failed: {}", attempt, MAX_ATTEMPTS, e),
        }
    }

    info!("All AI attempts failed; returning fallback for stage {fallback_stage}");
    fallback_result(career, fallback_stage, &prompt.fallback_question)
}

/// The deterministic result used when the model never produced usable output.
pub fn fallback_result(career: &str, fallback_stage: &str, fallback_question: &str) -> NormalizedResult {
    NormalizedResult {
        stage: fallback_stage.to_string(),
        message: format!(
            "As an aspiring {}, here's a starting question to continue.",
            display_career(career)
        ),
        next_question: Some(fallback_question.to_string()),
        resources: Vec::new(),
        final_step: false,
        is_fallback: true,
    }
}

fn normalize_output(
    raw: &str,
    expected_keys: &[&str],
    fallback_stage: &str,
) -> Result<NormalizedResult, NormalizeError> {
    let text = strip_json_fences(raw);
    if text.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(NormalizeError::NotObject)?;

    if !expected_keys.iter().any(|k| object.contains_key(*k)) {
        return Err(NormalizeError::MissingKeys(expected_keys.join(", ")));
    }

    Ok(NormalizedResult {
        stage: coerce_text(object.get("stage")).unwrap_or_else(|| fallback_stage.to_string()),
        message: coerce_text(object.get("message")).unwrap_or_default(),
        next_question: coerce_text(object.get("next_question")).filter(|q| !q.trim().is_empty()),
        resources: object
            .get("resources")
            .map(coerce_resources)
            .unwrap_or_default(),
        final_step: coerce_bool(object.get("final_step")),
        is_fallback: false,
    })
}

/// Strings pass through; other scalars are stringified; null and missing are `None`.
fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

/// Non-array values yield no resources; bad elements are dropped individually.
fn coerce_resources(value: &Value) -> Vec<Resource> {
    let Some(items) = value.as_array() else {
        debug!("Ignoring non-array resources value");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => coerce_resource(map),
            Value::String(title) if !title.trim().is_empty() => {
                Some(Resource::new(ResourceKind::Generic, title.trim(), None))
            }
            other => {
                debug!("Dropping unusable resource entry: {other}");
                None
            }
        })
        .collect()
}

fn coerce_resource(map: &Map<String, Value>) -> Option<Resource> {
    let title = ["title", "name"]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(title) = title else {
        debug!("Dropping resource without a title: {map:?}");
        return None;
    };

    let kind = map
        .get("type")
        .and_then(Value::as_str)
        .map(ResourceKind::from_tag)
        .unwrap_or_default();

    let link = ["link", "url"]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::to_string);

    Some(Resource::new(kind, title, link))
}
