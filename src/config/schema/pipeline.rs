use crate::pipeline::Language;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Knobs for the per-turn decision pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Turns kept in each session's rolling window
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,
    /// Turns shown to the insight extractor
    #[serde(default = "default_insight_context_turns")]
    pub insight_context_turns: usize,
    /// Turns scanned for sticky celebration
    #[serde(default = "default_joy_window_turns")]
    pub joy_window_turns: usize,
    /// Turns shown to the trend estimator
    #[serde(default = "default_trend_window_turns")]
    pub trend_window_turns: usize,
    /// User messages the style advisor reads
    #[serde(default = "default_style_recent_user_turns")]
    pub style_recent_user_turns: usize,
    #[serde(default = "default_extraction_timeout_ms")]
    pub extraction_timeout_ms: u64,
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,
    /// Wall-clock budget for a whole turn, session lock wait included
    #[serde(default = "default_turn_deadline_ms")]
    pub turn_deadline_ms: u64,
    /// Session contexts kept in memory before idle ones are evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Idle time after which a session context may be evicted
    #[serde(default = "default_session_idle_ttl_secs")]
    pub session_idle_ttl_secs: u64,
    /// Reply language when detection is inconclusive and no hint is given
    #[serde(default = "default_language")]
    pub default_language: Language,
    /// Keep an internal rolling summary per session
    #[serde(default = "default_true")]
    pub summary_enabled: bool,
}

fn default_window_turns() -> usize {
    12
}

fn default_insight_context_turns() -> usize {
    4
}

fn default_joy_window_turns() -> usize {
    6
}

fn default_trend_window_turns() -> usize {
    6
}

fn default_style_recent_user_turns() -> usize {
    5
}

fn default_extraction_timeout_ms() -> u64 {
    8_000
}

fn default_generation_timeout_ms() -> u64 {
    25_000
}

fn default_turn_deadline_ms() -> u64 {
    45_000
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_session_idle_ttl_secs() -> u64 {
    3_600
}

fn default_language() -> Language {
    Language::En
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_millis(self.extraction_timeout_ms)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    pub fn turn_deadline(&self) -> Duration {
        Duration::from_millis(self.turn_deadline_ms)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_ttl_secs)
    }

    /// Longest a turn can spend in provider calls: insight, then trend and
    /// intervention in parallel, then generation.
    pub fn worst_case_call_ms(&self) -> u64 {
        self.extraction_timeout_ms
            .saturating_mul(2)
            .saturating_add(self.generation_timeout_ms)
    }

    pub(crate) fn window_sizes(&self) -> [(&'static str, usize); 5] {
        [
            ("window_turns", self.window_turns),
            ("insight_context_turns", self.insight_context_turns),
            ("joy_window_turns", self.joy_window_turns),
            ("trend_window_turns", self.trend_window_turns),
            ("style_recent_user_turns", self.style_recent_user_turns),
        ]
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_turns: default_window_turns(),
            insight_context_turns: default_insight_context_turns(),
            joy_window_turns: default_joy_window_turns(),
            trend_window_turns: default_trend_window_turns(),
            style_recent_user_turns: default_style_recent_user_turns(),
            extraction_timeout_ms: default_extraction_timeout_ms(),
            generation_timeout_ms: default_generation_timeout_ms(),
            turn_deadline_ms: default_turn_deadline_ms(),
            max_sessions: default_max_sessions(),
            session_idle_ttl_secs: default_session_idle_ttl_secs(),
            default_language: default_language(),
            summary_enabled: true,
        }
    }
}
