use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Label used in logs and error messages
    #[serde(default = "default_provider_name")]
    pub name: String,
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Reply generation
    #[serde(default = "default_reply_temperature")]
    pub reply_temperature: f64,
    #[serde(default = "default_reply_max_tokens")]
    pub reply_max_tokens: u32,
    /// Insight and trend extraction
    #[serde(default)]
    pub extraction_temperature: f64,
    #[serde(default = "default_intervention_temperature")]
    pub intervention_temperature: f64,
    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f64,
}

fn default_provider_name() -> String {
    "groq".into()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_reply_temperature() -> f64 {
    0.65
}

fn default_reply_max_tokens() -> u32 {
    800
}

fn default_intervention_temperature() -> f64 {
    0.3
}

fn default_summary_temperature() -> f64 {
    0.2
}

impl ProviderConfig {
    pub(crate) fn temperatures(&self) -> [(&'static str, f64); 4] {
        [
            ("reply_temperature", self.reply_temperature),
            ("extraction_temperature", self.extraction_temperature),
            ("intervention_temperature", self.intervention_temperature),
            ("summary_temperature", self.summary_temperature),
        ]
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            http_timeout_secs: default_http_timeout_secs(),
            reply_temperature: default_reply_temperature(),
            reply_max_tokens: default_reply_max_tokens(),
            extraction_temperature: 0.0,
            intervention_temperature: default_intervention_temperature(),
            summary_temperature: default_summary_temperature(),
        }
    }
}
