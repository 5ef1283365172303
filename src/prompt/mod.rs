mod builder;
mod engine;
mod identity;

pub use builder::{
    insight_prompt, intervention_prompt, reply_prompt, summary_prompt, trend_prompt,
};
pub use engine::PromptEngine;
pub use identity::IDENTITY_PROMPT;
