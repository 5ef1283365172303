pub mod schema;

pub use schema::{
    Config, GatewayConfig, JournalConfig, ObservabilityConfig, PipelineConfig, ProviderConfig,
};
