mod core;
mod gateway;
mod journal;
mod observability;
mod pipeline;
mod provider;

pub use core::Config;
pub use gateway::GatewayConfig;
pub use journal::JournalConfig;
pub use observability::ObservabilityConfig;
pub use pipeline::PipelineConfig;
pub use provider::ProviderConfig;
