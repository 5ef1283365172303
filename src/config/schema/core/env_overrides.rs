use super::Config;
use crate::pipeline::Language;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("SOLACE_API_KEY").or_else(|_| std::env::var("GROQ_API_KEY"))
            && !key.is_empty()
        {
            self.provider.api_key = Some(key);
        }

        if let Ok(model) =
            std::env::var("SOLACE_MODEL").or_else(|_| std::env::var("GROQ_MODEL_ID"))
            && !model.is_empty()
        {
            self.provider.model = model;
        }

        if let Ok(base_url) = std::env::var("SOLACE_BASE_URL")
            && !base_url.is_empty()
        {
            self.provider.base_url = base_url;
        }

        if let Ok(port_str) =
            std::env::var("SOLACE_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) =
            std::env::var("SOLACE_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(code) = std::env::var("SOLACE_DEFAULT_LANGUAGE")
            && let Some(language) = Language::from_code(&code)
        {
            self.pipeline.default_language = language;
        }
    }
}
