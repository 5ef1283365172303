//! Celebration ("joy") detection.
//!
//! Recomputed from scratch every turn over a bounded window of recent turns;
//! nothing about it is persisted between turns.

use super::insight::{InsightResult, RiskLevel};
use super::keywords::{KeywordCategory, KeywordTable};
use super::safety::SafetyResult;
use crate::session::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum JoyState {
    Neutral,
    Celebrating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum JoyReason {
    /// A break keyword in the current message.
    BreakKeyword,
    SafetyEscalation,
    /// Effective risk is medium or high.
    ElevatedRisk,
    CelebrationKeyword,
    PositiveEvent,
    /// A recent user turn celebrated and nothing since broke the mood.
    RecentCelebration,
    NoSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoyDecision {
    pub state: JoyState,
    pub reason: JoyReason,
}

impl JoyDecision {
    fn neutral(reason: JoyReason) -> Self {
        Self {
            state: JoyState::Neutral,
            reason,
        }
    }

    fn celebrating(reason: JoyReason) -> Self {
        Self {
            state: JoyState::Celebrating,
            reason,
        }
    }

    pub fn joy_mode(&self) -> bool {
        self.state == JoyState::Celebrating
    }
}

pub struct JoyDetector<'a> {
    keywords: &'a KeywordTable,
    window_turns: usize,
}

impl<'a> JoyDetector<'a> {
    pub fn new(keywords: &'a KeywordTable, window_turns: usize) -> Self {
        Self {
            keywords,
            window_turns,
        }
    }

    /// `history` excludes the current message and is ordered oldest first.
    pub fn evaluate(
        &self,
        message: &str,
        history: &[Turn],
        insight: &InsightResult,
        safety: &SafetyResult,
    ) -> JoyDecision {
        if self
            .keywords
            .find_any(&KeywordCategory::BREAKS_CELEBRATION, message)
            .is_some()
        {
            return JoyDecision::neutral(JoyReason::BreakKeyword);
        }
        if safety.escalate {
            return JoyDecision::neutral(JoyReason::SafetyEscalation);
        }
        if safety.effective_risk(insight.risk_level).is_elevated() {
            return JoyDecision::neutral(JoyReason::ElevatedRisk);
        }

        if self.keywords.matches(KeywordCategory::Celebration, message) {
            return JoyDecision::celebrating(JoyReason::CelebrationKeyword);
        }
        if insight.positive_event && insight.risk_level == RiskLevel::Low {
            return JoyDecision::celebrating(JoyReason::PositiveEvent);
        }
        if self.window_still_celebrating(history) {
            return JoyDecision::celebrating(JoyReason::RecentCelebration);
        }
        JoyDecision::neutral(JoyReason::NoSignal)
    }

    fn window_still_celebrating(&self, history: &[Turn]) -> bool {
        let start = history.len().saturating_sub(self.window_turns);
        let recent_user: Vec<&str> = history[start..]
            .iter()
            .filter(|turn| turn.is_user())
            .map(Turn::content)
            .collect();

        let celebrated = recent_user
            .iter()
            .any(|text| self.keywords.matches(KeywordCategory::Celebration, text));
        if !celebrated {
            return false;
        }

        let aggregated = recent_user.join("\n");
        self.keywords
            .find_any(&KeywordCategory::BREAKS_CELEBRATION, &aggregated)
            .is_none()
    }
}
