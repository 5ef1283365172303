pub mod compatible;
pub mod http_client;
pub mod response;
pub mod scrub;
pub mod traits;

pub use compatible::OpenAiCompatibleProvider;
pub use response::{CompletionOptions, MessageRole, ProviderMessage};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::{Provider, messages_to_text};

use crate::config::ProviderConfig;
use std::sync::Arc;

/// Build the configured generation collaborator.
pub fn create_provider(config: &ProviderConfig) -> Arc<dyn Provider> {
    Arc::new(OpenAiCompatibleProvider::new(
        config.name.clone(),
        &config.base_url,
        config.api_key.as_deref(),
        config.http_timeout_secs,
    ))
}
