use super::response::{CompletionOptions, MessageRole, ProviderMessage};
use std::future::Future;
use std::pin::Pin;

/// Flatten role-tagged messages into a single transcript string.
///
/// Used when a prompt needs a readable view of recent turns rather than a
/// structured message list.
pub fn messages_to_text(messages: &[ProviderMessage]) -> String {
    messages
        .iter()
        .filter(|msg| !msg.content.trim().is_empty())
        .map(|msg| {
            let role_label = match msg.role {
                MessageRole::User => "user:",
                MessageRole::Assistant => "assistant:",
                MessageRole::System => "system:",
            };
            format!("{role_label} {}", msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The generation collaborator.
///
/// Implementations return the raw completion text. Callers must not assume it
/// is well-formed: it may be empty, wrapped in prose, or truncated.
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "groq", "openai").
    fn name(&self) -> &str;

    fn chat<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        options: &'a CompletionOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: &'a str,
        message: Option<&'a str>,
        options: &'a CompletionOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let mut messages = vec![ProviderMessage::system(system_prompt)];
            if let Some(message) = message {
                messages.push(ProviderMessage::user(message));
            }
            self.chat(&messages, options).await
        })
    }

    /// Warm up the HTTP connection pool.
    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}
