use super::insight::{InsightResult, RiskLevel};
use super::language::Language;
use crate::prompt::{PromptEngine, intervention_prompt};
use crate::providers::{CompletionOptions, Provider};
use std::time::Duration;

const MAX_SENTENCES: usize = 2;

/// Support services are the composer's job; a suggestion naming one is dropped.
const SERVICE_MARKERS: &[&str] = &[
    "counsel",
    "therapist",
    "psycholog",
    "hotline",
    "helpline",
    "crisis line",
    "lifeline",
    "beyond blue",
    "000",
    "1300",
    "http",
    "www.",
    "tư vấn",
    "đường dây",
    "心理咨询",
    "热线",
    "상담",
    "相談窓口",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum InterventionGate {
    Allowed,
    JoyMode,
    PositiveEvent,
    SettledEmotion,
}

/// Whether a coping suggestion may be offered at all this turn.
pub fn gate(joy_mode: bool, insight: &InsightResult) -> InterventionGate {
    if joy_mode {
        InterventionGate::JoyMode
    } else if insight.positive_event && insight.risk_level == RiskLevel::Low {
        InterventionGate::PositiveEvent
    } else if insight.emotion.is_settled() {
        InterventionGate::SettledEmotion
    } else {
        InterventionGate::Allowed
    }
}

/// Trim a raw suggestion to at most two sentences. Returns empty when the
/// collaborator declined or named a support service.
pub fn sanitize_suggestion(raw: &str) -> String {
    let text = raw.trim().trim_matches(['"', '\'', '`']).trim();
    if text.is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    if SERVICE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        tracing::debug!("intervention mentioned a support service; dropped");
        return String::new();
    }

    let mut out = String::new();
    let mut sentences = 0;
    for c in text.chars() {
        out.push(c);
        if matches!(c, '.' | '!' | '?' | '。' | '！' | '？') {
            sentences += 1;
            if sentences == MAX_SENTENCES {
                break;
            }
        }
    }
    out.trim().to_string()
}

pub struct InterventionSuggester<'a> {
    provider: &'a dyn Provider,
    prompts: &'a PromptEngine,
    options: CompletionOptions,
    timeout: Duration,
}

impl<'a> InterventionSuggester<'a> {
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

    /// At most a 1-2 sentence micro-action, or an empty string.
    pub async fn suggest(
        &self,
        joy_mode: bool,
        insight: &InsightResult,
        message: &str,
        language: Language,
    ) -> String {
        let gate = gate(joy_mode, insight);
        if gate != InterventionGate::Allowed {
            tracing::debug!(%gate, "intervention suppressed");
            return String::new();
        }

        let prompt = match intervention_prompt(self.prompts, insight, language) {
            Ok(prompt) => prompt,
            Err(error) => {
                tracing::warn!(error = %error, "intervention prompt failed to render");
                return String::new();
            }
        };
        let call = self
            .provider
            .chat_with_system(&prompt, Some(message), &self.options);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => sanitize_suggestion(&raw),
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "intervention call failed; skipping");
                String::new()
            }
            Err(_) => {
                tracing::warn!("intervention call timed out; skipping");
                String::new()
            }
        }
    }
}
