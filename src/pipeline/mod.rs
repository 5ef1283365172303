//! The per-turn decision pipeline.
//!
//! Data flows one way: message and history feed language and insight, those
//! feed safety and joy, those gate trend, intervention and style, and the
//! [`Composer`] merges everything into one [`DirectiveBundle`] for a single
//! generation call.

pub mod composer;
pub mod directives;
pub mod extraction;
pub mod insight;
pub mod intervention;
pub mod joy;
pub mod keywords;
pub mod language;
pub mod profile;
pub mod register;
pub mod safety;
pub mod style;
pub mod summary;
pub mod support;
pub mod trend;

pub use composer::{
    ChatRequest, Composer, GenerationOutcome, TurnOutcome, fallback_reply,
};
pub use directives::{DirectiveBundle, PrecedenceRule, Tone, TurnDecision, resolve_precedence};
pub use extraction::{Extraction, FallbackReason};
pub use insight::{Emotion, InsightExtractor, InsightResult, RiskLevel};
pub use intervention::InterventionSuggester;
pub use joy::{JoyDecision, JoyDetector, JoyReason, JoyState};
pub use keywords::{KEYWORD_TABLE_VERSION, KeywordCategory, KeywordTable, default_table};
pub use language::{Language, LanguageDetector, LanguageResolution, LanguageSource};
pub use profile::{Region, StudentProfile, StudentType};
pub use safety::{SafetyCategory, SafetyClassifier, SafetyResult};
pub use style::{StyleAdvisor, StyleNote};
pub use summary::SummaryWriter;
pub use support::{SUPPORT_BLOCK, append_support_block};
pub use trend::{TrendAssessment, TrendEstimator, TrendLabel};
