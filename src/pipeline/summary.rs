//! Rolling internal memory note per session. Never shown to the student.

use super::insight::InsightResult;
use super::trend::TrendAssessment;
use crate::prompt::{PromptEngine, summary_prompt};
use crate::providers::{CompletionOptions, Provider};
use std::sync::Arc;
use std::time::Duration;

const MAX_SUMMARY_CHARS: usize = 600;

#[derive(Clone)]
pub struct SummaryWriter {
    provider: Arc<dyn Provider>,
    prompts: Arc<PromptEngine>,
    options: CompletionOptions,
    timeout: Duration,
}

impl SummaryWriter {
    pub fn new(
        provider: Arc<dyn Provider>,
        prompts: Arc<PromptEngine>,
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

    /// A fresh 2-3 sentence note, or `None` when the call fails. Callers keep
    /// the previous note on `None`.
    pub async fn summarize(
        &self,
        previous: Option<&str>,
        insight: &InsightResult,
        trend: &TrendAssessment,
    ) -> Option<String> {
        let prompt = match summary_prompt(&self.prompts, previous, insight, trend) {
            Ok(prompt) => prompt,
            Err(error) => {
                tracing::warn!(error = %error, "summary prompt failed to render");
                return None;
            }
        };
        let call = self.provider.chat_with_system(&prompt, None, &self.options);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => clean_summary(&raw),
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "summary call failed; keeping previous note");
                None
            }
            Err(_) => {
                tracing::warn!("summary call timed out; keeping previous note");
                None
            }
        }
    }
}

fn clean_summary(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    let mut cleaned: String = text.chars().take(MAX_SUMMARY_CHARS).collect();
    if cleaned.len() < text.len() {
        cleaned.push_str("...");
    }
    Some(cleaned)
}
