//! Rule-based safety override. Purely local: no collaborator call, so an
//! upstream outage can never weaken it.

use super::insight::RiskLevel;
use super::keywords::{KeywordCategory, KeywordTable};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SafetyCategory {
    SelfHarm,
    Violence,
    Generic,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyResult {
    pub escalate: bool,
    pub override_risk_level: Option<RiskLevel>,
    pub category: SafetyCategory,
    pub reason: String,
}

impl SafetyResult {
    fn escalated(category: SafetyCategory, reason: impl Into<String>) -> Self {
        Self {
            escalate: true,
            override_risk_level: Some(RiskLevel::High),
            category,
            reason: reason.into(),
        }
    }

    pub fn clear() -> Self {
        Self {
            escalate: false,
            override_risk_level: None,
            category: SafetyCategory::None,
            reason: "low risk".to_string(),
        }
    }

    /// Safety override if present, else the insight risk.
    pub fn effective_risk(&self, insight_risk: RiskLevel) -> RiskLevel {
        self.override_risk_level.unwrap_or(insight_risk)
    }

    /// Self-harm and violence are matched on the student's own words.
    pub fn is_keyword_driven(&self) -> bool {
        matches!(
            self.category,
            SafetyCategory::SelfHarm | SafetyCategory::Violence
        )
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

pub struct SafetyClassifier<'a> {
    keywords: &'a KeywordTable,
}

impl<'a> SafetyClassifier<'a> {
    pub fn new(keywords: &'a KeywordTable) -> Self {
        Self { keywords }
    }

    /// Self-harm beats violence beats a high insight risk.
    pub fn classify(&self, message: &str, insight_risk: RiskLevel) -> SafetyResult {
        if let Some(entry) = self.keywords.find(KeywordCategory::SelfHarm, message) {
            tracing::debug!(phrase_language = %entry.language, "self-harm phrase matched");
            return SafetyResult::escalated(SafetyCategory::SelfHarm, "Self-harm keywords detected");
        }
        if let Some(entry) = self.keywords.find(KeywordCategory::Violence, message) {
            tracing::debug!(phrase_language = %entry.language, "violence phrase matched");
            return SafetyResult::escalated(SafetyCategory::Violence, "Violence keywords detected");
        }
        if insight_risk == RiskLevel::High {
            return SafetyResult::escalated(SafetyCategory::Generic, "Insight agent flagged high risk");
        }
        SafetyResult::clear()
    }
}
