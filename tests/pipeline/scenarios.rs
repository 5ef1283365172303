use crate::mock_provider::{ScriptedProvider, Stage, composer, insight_json};
use solace::pipeline::{
    ChatRequest, Language, PrecedenceRule, RiskLevel, SUPPORT_BLOCK, SafetyCategory,
};
use std::sync::Arc;

#[tokio::test]
async fn scenario_a_vietnamese_self_harm_escalates() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("student-a", "em muốn tự tử"))
        .await
        .unwrap();
    let decision = outcome.decision;

    assert!(decision.escalate);
    assert_eq!(decision.override_risk_level, Some(RiskLevel::High));
    assert_eq!(decision.category, SafetyCategory::SelfHarm);
    assert!(!decision.joy_mode);
    assert!(decision.include_support);
    assert_eq!(decision.language, Language::Vi);
    assert_eq!(decision.rule, PrecedenceRule::Escalation);

    assert!(outcome.reply.starts_with("Got you, I'm here."));
    assert!(outcome.reply.ends_with(SUPPORT_BLOCK));
    assert_eq!(provider.calls(Stage::Intervention), 0);
    assert!(provider.last_reply_instructions().contains("HIGH RISK (self_harm)"));
}

#[tokio::test]
async fn scenario_b_scholarship_news_enters_joy_mode() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond(
                Stage::Insight,
                insight_json("joy", "low", true, &["scholarship"], "vi"),
            )
            .respond(Stage::Reply, "Trời ơi giỏi quá! Kể mình nghe đi!"),
    );
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("student-b", "em trúng học bổng rồi!"))
        .await
        .unwrap();
    let decision = outcome.decision;

    assert!(decision.joy_mode);
    assert!(decision.intervention_empty);
    assert!(outcome.bundle.intervention.is_empty());
    assert!(!decision.include_support);
    assert!(!decision.escalate);
    assert_eq!(decision.rule, PrecedenceRule::JoyMode);

    assert_eq!(outcome.reply, "Trời ơi giỏi quá! Kể mình nghe đi!");
    assert!(!outcome.reply.contains(SUPPORT_BLOCK));
    assert_eq!(provider.calls(Stage::Intervention), 0);

    let instructions = provider.last_reply_instructions();
    assert!(instructions.contains("JOY MODE"));
    assert!(!instructions.contains("SUPPORT INFORMATION"));
}

#[tokio::test]
async fn scenario_c_violence_breaks_celebratory_thread() {
    let provider = Arc::new(ScriptedProvider::new().respond(
        Stage::Insight,
        insight_json("joy", "low", true, &["scholarship"], "vi"),
    ));
    let composer = composer(&provider);

    let first = composer
        .handle_turn(ChatRequest::new("student-c", "em trúng học bổng rồi!"))
        .await
        .unwrap();
    assert!(first.decision.joy_mode);

    provider.set(Stage::Insight, insight_json("neutral", "low", false, &[], "vi"));
    let second = composer
        .handle_turn(ChatRequest::new("student-c", "hôm nay em đi học"))
        .await
        .unwrap();
    assert!(second.decision.joy_mode, "celebration should stay sticky");

    let third = composer
        .handle_turn(ChatRequest::new("student-c", "anh đánh em"))
        .await
        .unwrap();
    let decision = third.decision;

    assert!(!decision.joy_mode);
    assert!(decision.escalate);
    assert_eq!(decision.category, SafetyCategory::Violence);
    assert!(decision.include_support);
    assert!(third.reply.contains(SUPPORT_BLOCK));
    assert_eq!(third.turn_index, 3);
}

#[tokio::test]
async fn scenario_d_medium_risk_includes_support() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond(
                Stage::Insight,
                insight_json("worry", "medium", false, &["assignments"], "en"),
            )
            .respond(
                Stage::Intervention,
                "Try writing down the one task that feels heaviest.",
            ),
    );
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new(
            "student-d",
            "I have so many assignments due this week and I'm not sure I will finish them",
        ))
        .await
        .unwrap();
    let decision = outcome.decision;

    assert!(!decision.escalate);
    assert_eq!(decision.category, SafetyCategory::None);
    assert_eq!(decision.effective_risk, RiskLevel::Medium);
    assert!(decision.include_support);
    assert!(!decision.joy_mode);
    assert_eq!(decision.rule, PrecedenceRule::ElevatedRisk);
    assert_eq!(decision.language, Language::En);

    assert!(outcome.reply.contains(SUPPORT_BLOCK));
    assert_eq!(
        outcome.bundle.intervention,
        "Try writing down the one task that feels heaviest."
    );
    assert!(
        provider
            .last_reply_instructions()
            .contains("- Try writing down the one task that feels heaviest.")
    );
}
