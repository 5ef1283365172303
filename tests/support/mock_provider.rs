#![allow(dead_code)]

use solace::config::{PipelineConfig, ProviderConfig};
use solace::pipeline::Composer;
use solace::providers::{CompletionOptions, Provider, ProviderMessage};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Which pipeline call a request belongs to, recognised from its system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Insight,
    Trend,
    Intervention,
    Summary,
    Reply,
}

impl Stage {
    fn of(messages: &[ProviderMessage]) -> Self {
        let system = messages.first().map_or("", |m| m.content.as_str());
        if system.contains("TURN DIRECTIVES") {
            Self::Reply
        } else if system.contains("insight extraction step") {
            Self::Insight
        } else if system.contains("trend step") {
            Self::Trend
        } else if system.contains("tiny wellbeing action") {
            Self::Intervention
        } else if system.contains("internal memory note") {
            Self::Summary
        } else {
            panic!("unrecognised prompt: {system}")
        }
    }
}

#[derive(Debug, Clone)]
enum Script {
    Text(String),
    Fail,
    Slow(Duration, String),
}

/// Provider that answers each pipeline stage from a script and records
/// every request it sees.
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<Stage, Script>>,
    calls: Mutex<Vec<(Stage, Vec<ProviderMessage>)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        let scripts = HashMap::from([
            (
                Stage::Insight,
                Script::Text(insight_json("neutral", "low", false, &[], "en")),
            ),
            (
                Stage::Trend,
                Script::Text(r#"{"trend": "stable", "rationale": "Mood looks steady."}"#.into()),
            ),
            (Stage::Intervention, Script::Text(String::new())),
            (
                Stage::Summary,
                Script::Text("The student seems settled and chatty.".into()),
            ),
            (Stage::Reply, Script::Text("Got you, I'm here.".into())),
        ]);
        Self {
            scripts: Mutex::new(scripts),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, stage: Stage, text: impl Into<String>) -> Self {
        self.set(stage, text);
        self
    }

    pub fn fail(self, stage: Stage) -> Self {
        self.scripts.lock().unwrap().insert(stage, Script::Fail);
        self
    }

    pub fn slow(self, stage: Stage, delay: Duration, text: impl Into<String>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(stage, Script::Slow(delay, text.into()));
        self
    }

    pub fn set(&self, stage: Stage, text: impl Into<String>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(stage, Script::Text(text.into()));
    }

    pub fn calls(&self, stage: Stage) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == stage)
            .count()
    }

    /// Messages of the most recent call for `stage`.
    pub fn last_request(&self, stage: Stage) -> Option<Vec<ProviderMessage>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(s, _)| *s == stage)
            .map(|(_, messages)| messages.clone())
    }

    /// System prompt of the most recent reply call.
    pub fn last_reply_instructions(&self) -> String {
        self.last_request(Stage::Reply)
            .and_then(|messages| messages.first().map(|m| m.content.clone()))
            .unwrap_or_default()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chat<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        _options: &'a CompletionOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        let stage = Stage::of(messages);
        self.calls.lock().unwrap().push((stage, messages.to_vec()));
        let script = self.scripts.lock().unwrap().get(&stage).cloned();
        Box::pin(async move {
            match script {
                Some(Script::Text(text)) => Ok(text),
                Some(Script::Slow(delay, text)) => {
                    tokio::time::sleep(delay).await;
                    Ok(text)
                }
                Some(Script::Fail) | None => anyhow::bail!("scripted failure for {stage:?}"),
            }
        })
    }
}

pub fn insight_json(
    emotion: &str,
    risk: &str,
    positive_event: bool,
    topics: &[&str],
    language: &str,
) -> String {
    serde_json::json!({
        "emotion": emotion,
        "risk_level": risk,
        "positive_event": positive_event,
        "topics": topics,
        "language": language,
    })
    .to_string()
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        summary_enabled: false,
        extraction_timeout_ms: 500,
        generation_timeout_ms: 1_000,
        ..PipelineConfig::default()
    }
}

pub fn composer_with(provider: &Arc<ScriptedProvider>, config: PipelineConfig) -> Composer {
    let provider: Arc<dyn Provider> = provider.clone();
    Composer::new(provider, &ProviderConfig::default(), config).unwrap()
}

pub fn composer(provider: &Arc<ScriptedProvider>) -> Composer {
    composer_with(provider, pipeline_config())
}
