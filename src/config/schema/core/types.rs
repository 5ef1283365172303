use super::super::{
    GatewayConfig, JournalConfig, ObservabilityConfig, PipelineConfig, ProviderConfig,
};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub journal: JournalConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Resolved path of the turn journal database.
    pub fn journal_db_path(&self) -> PathBuf {
        self.journal.db_path.clone().unwrap_or_else(|| {
            self.workspace_dir
                .join("journal")
                .join("wellbeing_logs.db")
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.provider.temperatures() {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "provider.{field} must be within 0.0..=2.0, got {value}"
                )));
            }
        }

        for (field, value) in self.pipeline.window_sizes() {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "pipeline.{field} must be greater than zero"
                )));
            }
        }

        if self.pipeline.extraction_timeout_ms == 0
            || self.pipeline.generation_timeout_ms == 0
            || self.pipeline.turn_deadline_ms == 0
        {
            return Err(ConfigError::Validation(
                "pipeline timeouts must be greater than zero".into(),
            ));
        }

        if self.pipeline.max_sessions == 0 {
            return Err(ConfigError::Validation(
                "pipeline.max_sessions must be greater than zero".into(),
            ));
        }

        // The HTTP timeout must never fire before the pipeline's own fallback.
        let request_ms = self.gateway.request_timeout_secs.saturating_mul(1_000);
        let pipeline_ms = self
            .pipeline
            .worst_case_call_ms()
            .max(self.pipeline.turn_deadline_ms);
        if request_ms <= pipeline_ms {
            return Err(ConfigError::Validation(format!(
                "gateway.request_timeout_secs ({request_ms} ms) must exceed the pipeline budget \
                 ({pipeline_ms} ms: 2 x extraction_timeout_ms + generation_timeout_ms, or turn_deadline_ms)"
            )));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider.base_url must not be empty".into(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let solace_dir = home.join(".solace");

        Self {
            workspace_dir: solace_dir.join("workspace"),
            config_path: solace_dir.join("config.toml"),
            provider: ProviderConfig::default(),
            pipeline: PipelineConfig::default(),
            gateway: GatewayConfig::default(),
            journal: JournalConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
