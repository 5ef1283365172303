//! Structured extraction on top of the free-text generation collaborator.
//!
//! Callers never see an error from this layer. They get an [`Extraction`]
//! tagged either `Parsed` or `Fallback`, and branch on the tag.

use crate::providers::{CompletionOptions, Provider};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FallbackReason {
    /// Nothing to extract from yet.
    InsufficientContext,
    PromptRender,
    Timeout,
    ProviderError,
    EmptyResponse,
    NoJsonObject,
    InvalidFields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Parsed(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Extraction<T> {
    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self::Fallback { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Parsed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Parsed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Self::Parsed(_) => None,
            Self::Fallback { reason, .. } => Some(*reason),
        }
    }
}

/// Pull a JSON object out of a completion.
///
/// Accepts a bare object, an object inside a fenced code block, or an object
/// surrounded by prose (first `{` to last `}`).
pub fn extract_json_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    let trimmed = text.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// One structured extraction call: send `prompt` as the system message,
/// bound it by `timeout`, and hand the parsed object to `parse`.
///
/// `parse` returns `None` when any field is missing or malformed; the whole
/// result then falls back to `fallback()`.
pub async fn run_extraction<T>(
    stage: &'static str,
    provider: &dyn Provider,
    prompt: &str,
    options: &CompletionOptions,
    timeout: Duration,
    parse: impl FnOnce(&serde_json::Map<String, Value>) -> Option<T>,
    fallback: impl FnOnce() -> T,
) -> Extraction<T> {
    let raw = match tokio::time::timeout(timeout, provider.chat_with_system(prompt, None, options))
        .await
    {
        Err(_) => {
            tracing::warn!(
                stage,
                timeout_ms = timeout.as_millis() as u64,
                "extraction timed out; using defaults"
            );
            return Extraction::fallback(fallback(), FallbackReason::Timeout);
        }
        Ok(Err(error)) => {
            tracing::warn!(stage, error = %error, "extraction call failed; using defaults");
            return Extraction::fallback(fallback(), FallbackReason::ProviderError);
        }
        Ok(Ok(raw)) => raw,
    };

    if raw.trim().is_empty() {
        tracing::warn!(stage, "extraction returned nothing; using defaults");
        return Extraction::fallback(fallback(), FallbackReason::EmptyResponse);
    }

    let Some(object) = extract_json_object(&raw) else {
        tracing::warn!(
            stage,
            response_chars = raw.chars().count(),
            "extraction returned no JSON object; using defaults"
        );
        return Extraction::fallback(fallback(), FallbackReason::NoJsonObject);
    };

    match parse(&object) {
        Some(value) => Extraction::Parsed(value),
        None => {
            tracing::warn!(stage, "extraction fields were malformed; using defaults");
            Extraction::fallback(fallback(), FallbackReason::InvalidFields)
        }
    }
}

/// Lowercased, trimmed string field.
pub(crate) fn string_field(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)?
        .as_str()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}
