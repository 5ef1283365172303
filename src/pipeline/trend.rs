use super::extraction::{Extraction, FallbackReason, run_extraction, string_field};
use super::insight::InsightResult;
use crate::prompt::{PromptEngine, trend_prompt};
use crate::providers::{CompletionOptions, Provider};
use crate::session::Turn;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendLabel {
    #[default]
    Unknown,
    Stable,
    Improving,
    Worsening,
}

impl TrendLabel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unknown" => Some(Self::Unknown),
            "stable" => Some(Self::Stable),
            "improving" => Some(Self::Improving),
            "worsening" => Some(Self::Worsening),
            _ => None,
        }
    }
}

/// Advisory only. Never gates safety or support decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendAssessment {
    pub label: TrendLabel,
    pub rationale: String,
}

impl TrendAssessment {
    pub fn unknown() -> Self {
        Self {
            label: TrendLabel::Unknown,
            rationale: "Insufficient data".to_string(),
        }
    }

    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let label = TrendLabel::parse(&string_field(object, "trend")?)?;
        let rationale = object
            .get("rationale")
            .and_then(|v| v.as_str())
            .map(first_sentence)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "No rationale given".to_string());
        Some(Self { label, rationale })
    }
}

fn first_sentence(text: &str) -> String {
    let text = text.trim();
    match text.find(['.', '!', '?']) {
        Some(index) => text[..=index].to_string(),
        None => text.to_string(),
    }
}

pub struct TrendEstimator<'a> {
    provider: &'a dyn Provider,
    prompts: &'a PromptEngine,
    options: CompletionOptions,
    timeout: Duration,
}

impl<'a> TrendEstimator<'a> {
    pub fn new(
        provider: &'a dyn Provider,
        prompts: &'a PromptEngine,
        options: CompletionOptions,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            prompts,
            options,
            timeout,
        }
    }

    pub async fn estimate(
        &self,
        insight: &InsightResult,
        recent: &[Turn],
    ) -> Extraction<TrendAssessment> {
        if recent.is_empty() {
            return Extraction::fallback(
                TrendAssessment::unknown(),
                FallbackReason::InsufficientContext,
            );
        }
        let prompt = match trend_prompt(self.prompts, insight, recent) {
            Ok(prompt) => prompt,
            Err(error) => {
                tracing::warn!(error = %error, "trend prompt failed to render");
                return Extraction::fallback(
                    TrendAssessment::unknown(),
                    FallbackReason::PromptRender,
                );
            }
        };
        run_extraction(
            "trend",
            self.provider,
            &prompt,
            &self.options,
            self.timeout,
            TrendAssessment::from_json,
            TrendAssessment::unknown,
        )
        .await
    }
}
