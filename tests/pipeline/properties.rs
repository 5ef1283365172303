use crate::mock_provider::{ScriptedProvider, Stage, composer, insight_json};
use solace::pipeline::{
    ChatRequest, Emotion, InsightResult, KeywordCategory, RiskLevel, SUPPORT_BLOCK,
    SafetyCategory, SafetyClassifier, default_table,
};
use solace::session::Turn;
use std::sync::Arc;

#[test]
fn every_self_harm_keyword_escalates_regardless_of_insight() {
    let classifier = SafetyClassifier::new(default_table());
    for entry in default_table().entries(KeywordCategory::SelfHarm) {
        for insight_risk in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            let message = format!("honestly {} tonight", entry.phrase);
            let result = classifier.classify(&message, insight_risk);
            assert!(result.escalate, "{}", entry.phrase);
            assert_eq!(result.override_risk_level, Some(RiskLevel::High));
            assert_eq!(result.category, SafetyCategory::SelfHarm, "{}", entry.phrase);
        }
    }
}

#[test]
fn self_harm_wins_over_violence_in_the_same_message() {
    let result = SafetyClassifier::new(default_table())
        .classify("anh đánh em, em muốn tự tử", RiskLevel::Low);
    assert_eq!(result.category, SafetyCategory::SelfHarm);
}

#[tokio::test]
async fn break_keywords_end_joy_despite_celebratory_history() {
    let provider = Arc::new(ScriptedProvider::new().respond(
        Stage::Insight,
        insight_json("joy", "low", true, &[], "en"),
    ));
    let composer = composer(&provider);
    let history = vec![
        Turn::user("I got the job!! scholarship too"),
        Turn::assistant("No way, congrats!!"),
    ];

    let breaking = KeywordCategory::BREAKS_CELEBRATION
        .iter()
        .flat_map(|category| default_table().entries(*category));
    for (index, entry) in breaking.enumerate() {
        let outcome = composer
            .handle_turn(
                ChatRequest::new(format!("break-{index}"), entry.phrase)
                    .with_history(history.clone()),
            )
            .await
            .unwrap();
        assert!(!outcome.decision.joy_mode, "{}", entry.phrase);
    }
}

#[tokio::test]
async fn support_block_is_verbatim_whenever_included() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer(&provider);
    let messages = [
        ("en", "I want to kill myself", "neutral", "low"),
        ("vi", "em căng thẳng quá", "stress", "low"),
        ("zh", "我最近压力很大", "stress", "medium"),
        ("ko", "오늘 친구랑 밥 먹었어", "neutral", "low"),
        ("ja", "もう死にたい", "sadness", "high"),
        ("en", "had a quiet day at the library", "neutral", "low"),
    ];

    let mut included = 0;
    for (index, (language, message, emotion, risk)) in messages.into_iter().enumerate() {
        provider.set(Stage::Insight, insight_json(emotion, risk, false, &[], language));
        let outcome = composer
            .handle_turn(ChatRequest::new(format!("support-{index}"), message))
            .await
            .unwrap();
        if outcome.decision.include_support {
            included += 1;
            assert!(outcome.reply.contains(SUPPORT_BLOCK), "{message}");
            assert_eq!(outcome.reply.matches(SUPPORT_BLOCK).count(), 1);
        } else {
            assert!(!outcome.reply.contains(SUPPORT_BLOCK), "{message}");
        }
    }
    assert_eq!(included, 4);
}

#[tokio::test]
async fn unparseable_insight_falls_back_to_documented_default() {
    let provider = Arc::new(
        ScriptedProvider::new().respond(Stage::Insight, "I think they're having a rough week."),
    );
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("fallback", "long day today"))
        .await
        .unwrap();

    assert!(outcome.bundle.insight_fallback);
    assert_eq!(outcome.bundle.insight, InsightResult::fallback());
    assert_eq!(outcome.bundle.insight.emotion, Emotion::Neutral);
    assert_eq!(outcome.bundle.insight.risk_level, RiskLevel::Low);
    assert!(!outcome.bundle.insight.positive_event);
    assert!(outcome.bundle.insight.topics.is_empty());
    assert_eq!(outcome.bundle.insight.language.to_string(), "other");
    assert_eq!(outcome.reply, "Got you, I'm here.");
}

#[tokio::test]
async fn malformed_insight_fields_also_fall_back() {
    let provider = Arc::new(ScriptedProvider::new().respond(
        Stage::Insight,
        r#"Sure! {"emotion": "ecstatic", "risk_level": "extreme"}"#,
    ));
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("malformed", "long day today"))
        .await
        .unwrap();
    assert_eq!(outcome.bundle.insight, InsightResult::fallback());
}

#[tokio::test]
async fn decisions_are_reproducible_for_identical_inputs() {
    let history = vec![
        Turn::user("em đậu rồi!"),
        Turn::assistant("Giỏi quá!"),
        Turn::user("mà giờ em hơi lo lắng"),
        Turn::assistant("Lo chuyện gì vậy?"),
    ];
    let message = "em sợ không theo kịp bài";

    let mut decisions = Vec::new();
    for run in 0..3 {
        let provider = Arc::new(ScriptedProvider::new().respond(
            Stage::Insight,
            insight_json("worry", "medium", false, &["study"], "vi"),
        ));
        let composer = composer(&provider);
        let outcome = composer
            .handle_turn(
                ChatRequest::new(format!("repeat-{run}"), message).with_history(history.clone()),
            )
            .await
            .unwrap();
        decisions.push(outcome.decision);
    }

    assert!(decisions.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(decisions[0].include_support);
    assert!(!decisions[0].joy_mode);
}
