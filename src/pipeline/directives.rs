//! The directive bundle and the single precedence table that decides support
//! inclusion, joy suppression and intervention suppression.

use super::insight::{InsightResult, RiskLevel};
use super::joy::JoyDecision;
use super::language::{Language, LanguageSource};
use super::register::RegisterNotes;
use super::safety::{SafetyCategory, SafetyResult};
use super::style::StyleNote;
use super::trend::{TrendAssessment, TrendLabel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tone {
    /// Gentle and validating; high risk.
    Gentle,
    /// Peer-like celebration; joy mode.
    Celebratory,
    Supportive,
}

/// Which row of the precedence table decided this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PrecedenceRule {
    Escalation,
    JoyMode,
    ElevatedRisk,
    DistressKeyword,
    Calm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub rule: PrecedenceRule,
    pub include_support: bool,
    pub joy_mode: bool,
    pub suppress_intervention: bool,
    pub tone: Tone,
    /// Joy was on while safety escalated and had to be forced off.
    pub repaired: bool,
}

/// Resolve support inclusion and suppression for one turn.
///
/// 1. Escalation: support on, joy off. Intervention off for self-harm and
///    violence; a generic high-risk turn may keep one.
/// 2. Joy mode: support off, intervention off.
/// 3. Otherwise support on iff effective risk is medium/high or the message
///    matched a distress keyword.
pub fn resolve_precedence(
    safety: &SafetyResult,
    joy: &JoyDecision,
    effective_risk: RiskLevel,
    distress_keyword: bool,
) -> Precedence {
    let mut joy_mode = joy.joy_mode();
    let mut repaired = false;
    if joy_mode && safety.escalate {
        tracing::error!(
            category = %safety.category,
            joy_reason = %joy.reason,
            "joy mode was on during a safety escalation; forcing it off"
        );
        joy_mode = false;
        repaired = true;
    }

    let tone = if effective_risk == RiskLevel::High || safety.escalate {
        Tone::Gentle
    } else if joy_mode {
        Tone::Celebratory
    } else {
        Tone::Supportive
    };

    let (rule, include_support, suppress_intervention) = if safety.escalate {
        (PrecedenceRule::Escalation, true, safety.is_keyword_driven())
    } else if joy_mode {
        (PrecedenceRule::JoyMode, false, true)
    } else if effective_risk.is_elevated() {
        (PrecedenceRule::ElevatedRisk, true, false)
    } else if distress_keyword {
        (PrecedenceRule::DistressKeyword, true, false)
    } else {
        (PrecedenceRule::Calm, false, false)
    };

    Precedence {
        rule,
        include_support,
        joy_mode,
        suppress_intervention,
        tone,
        repaired,
    }
}

/// Everything the generation step is told for one turn.
#[derive(Debug, Clone)]
pub struct DirectiveBundle {
    pub language: Language,
    pub language_source: LanguageSource,
    pub register: RegisterNotes,
    pub insight: InsightResult,
    pub insight_fallback: bool,
    pub safety: SafetyResult,
    pub effective_risk: RiskLevel,
    pub joy_mode: bool,
    pub tone: Tone,
    pub trend: TrendAssessment,
    pub intervention: String,
    pub style: StyleNote,
    pub memory: Option<String>,
    pub include_support: bool,
    pub rule: PrecedenceRule,
}

impl DirectiveBundle {
    pub fn decision(&self) -> TurnDecision {
        TurnDecision {
            language: self.language,
            escalate: self.safety.escalate,
            category: self.safety.category,
            override_risk_level: self.safety.override_risk_level,
            effective_risk: self.effective_risk,
            joy_mode: self.joy_mode,
            include_support: self.include_support,
            intervention_empty: self.intervention.is_empty(),
            trend: self.trend.label,
            rule: self.rule,
        }
    }
}

/// The decision fields of a turn, independent of generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnDecision {
    pub language: Language,
    pub escalate: bool,
    pub category: SafetyCategory,
    pub override_risk_level: Option<RiskLevel>,
    pub effective_risk: RiskLevel,
    pub joy_mode: bool,
    pub include_support: bool,
    pub intervention_empty: bool,
    pub trend: TrendLabel,
    pub rule: PrecedenceRule,
}
