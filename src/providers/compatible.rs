//! OpenAI-compatible chat completions client.
//!
//! Groq, OpenAI and OpenRouter all accept the same `/chat/completions` shape,
//! so one implementation covers every hosted collaborator we talk to.

use super::http_client::build_provider_client_with_timeout;
use super::response::{CompletionOptions, ProviderMessage};
use super::scrub::sanitize_api_error;
use super::traits::Provider;
use crate::error::ProviderError;
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub struct OpenAiCompatibleProvider {
    name: String,
    base_url: String,
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    timeout_secs: u64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ProviderMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cached_auth_header: api_key
                .filter(|key| !key.trim().is_empty())
                .map(|key| format!("Bearer {key}")),
            timeout_secs,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send(
        &self,
        messages: &[ProviderMessage],
        options: &CompletionOptions,
    ) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &options.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let mut builder = self.client.post(self.completions_url()).json(&request);
        if let Some(auth) = &self.cached_auth_header {
            builder = builder.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = builder.send().await.map_err(|error| {
            if error.is_timeout() {
                ProviderError::Timeout {
                    timeout_ms: self.timeout_secs.saturating_mul(1000),
                }
            } else {
                ProviderError::Request {
                    provider: self.name.clone(),
                    message: sanitize_api_error(&error.to_string()),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
            return Err(ProviderError::Status {
                provider: self.name.clone(),
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            }
            .into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .with_context(|| format!("{} returned an unreadable completion body", self.name))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::EmptyCompletion {
                provider: self.name.clone(),
            }
            .into());
        }

        Ok(text)
    }
}

impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn chat<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        options: &'a CompletionOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(self.send(messages, options))
    }

    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            // Any response, even 401/404, means the TLS session is established.
            let _ = self.client.get(&self.base_url).send().await;
            Ok(())
        })
    }
}
