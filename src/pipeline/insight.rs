use super::extraction::{Extraction, FallbackReason, run_extraction, string_field};
use super::language::Language;
use crate::prompt::{PromptEngine, insight_prompt};
use crate::providers::{CompletionOptions, Provider};
use crate::session::Turn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Worry,
    Stress,
    Anger,
    #[default]
    Neutral,
}

impl Emotion {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "joy" => Some(Self::Joy),
            "sadness" => Some(Self::Sadness),
            "worry" => Some(Self::Worry),
            "stress" => Some(Self::Stress),
            "anger" => Some(Self::Anger),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Emotions for which no coping suggestion is offered.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Joy | Self::Neutral)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn is_elevated(self) -> bool {
        self >= Self::Medium
    }
}

/// Per-turn structured read of the student's message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsightResult {
    pub emotion: Emotion,
    pub risk_level: RiskLevel,
    pub positive_event: bool,
    pub topics: Vec<String>,
    pub language: Language,
}

pub const MAX_TOPICS: usize = 4;

impl InsightResult {
    /// `{neutral, low, false, [], other}`
    pub fn fallback() -> Self {
        Self {
            emotion: Emotion::Neutral,
            risk_level: RiskLevel::Low,
            positive_event: false,
            topics: Vec::new(),
            language: Language::Other,
        }
    }

    /// Strict field validation. Any missing or out-of-range field rejects the
    /// whole object. Unknown language codes map to `other`.
    pub fn from_json(object: &serde_json::Map<String, Value>) -> Option<Self> {
        let emotion = Emotion::parse(&string_field(object, "emotion")?)?;
        let risk_level = RiskLevel::parse(&string_field(object, "risk_level")?)?;
        let positive_event = object.get("positive_event")?.as_bool()?;

        let topics = match object.get("topics") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(|s| s.trim().to_string()))
                .collect::<Option<Vec<_>>>()?
                .into_iter()
                .filter(|topic| !topic.is_empty())
                .take(MAX_TOPICS)
                .collect(),
            Some(_) => return None,
        };

        let language = string_field(object, "language")
            .and_then(|code| Language::from_code(&code))
            .unwrap_or(Language::Other);

        Some(Self {
            emotion,
            risk_level,
            positive_event,
            topics,
            language,
        })
    }

    /// Compact JSON used in prompts and the journal.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

pub struct InsightExtractor<'a> {
    provider: &'a dyn Provider,
    prompts: &'a PromptEngine,
    options: CompletionOptions,
    timeout: Duration,
}

impl<'a> InsightExtractor<'a> {
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

    /// Always yields a well-formed result. `context` is the last few turns,
    /// oldest first.
    pub async fn extract(&self, message: &str, context: &[Turn]) -> Extraction<InsightResult> {
        let prompt = match insight_prompt(self.prompts, message, context) {
            Ok(prompt) => prompt,
            Err(error) => {
                tracing::warn!(error = %error, "insight prompt failed to render");
                return Extraction::fallback(
                    InsightResult::fallback(),
                    FallbackReason::PromptRender,
                );
            }
        };
        run_extraction(
            "insight",
            self.provider,
            &prompt,
            &self.options,
            self.timeout,
            InsightResult::from_json,
            InsightResult::fallback,
        )
        .await
    }
}
