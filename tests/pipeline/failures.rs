use crate::mock_provider::{ScriptedProvider, Stage, composer, insight_json};
use solace::pipeline::{
    ChatRequest, Emotion, GenerationOutcome, InsightResult, PrecedenceRule, SUPPORT_BLOCK,
    TrendLabel, fallback_reply, Language,
};
use solace::session::Turn;
use std::sync::Arc;
use std::time::Duration;

fn history() -> Vec<Turn> {
    vec![
        Turn::user("exams start next week"),
        Turn::assistant("How are you feeling about them?"),
    ]
}

#[tokio::test]
async fn slow_insight_times_out_to_fallback() {
    let provider = Arc::new(ScriptedProvider::new().slow(
        Stage::Insight,
        Duration::from_secs(5),
        insight_json("joy", "low", true, &[], "en"),
    ));
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("slow-insight", "pretty normal day"))
        .await
        .unwrap();

    assert!(outcome.bundle.insight_fallback);
    assert_eq!(outcome.bundle.insight, InsightResult::fallback());
    assert_eq!(outcome.generation, GenerationOutcome::Generated);
    assert_eq!(outcome.reply, "Got you, I'm here.");
}

#[tokio::test]
async fn failing_insight_does_not_weaken_keyword_escalation() {
    let provider = Arc::new(ScriptedProvider::new().fail(Stage::Insight));
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("outage", "I want to end my life"))
        .await
        .unwrap();

    assert!(outcome.bundle.insight_fallback);
    assert!(outcome.decision.escalate);
    assert_eq!(outcome.decision.rule, PrecedenceRule::Escalation);
    assert!(outcome.reply.ends_with(SUPPORT_BLOCK));
}

#[tokio::test]
async fn failing_reply_uses_localized_fallback() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond(Stage::Insight, insight_json("neutral", "low", false, &[], "vi"))
            .fail(Stage::Reply),
    );
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("reply-down", "hôm nay em ăn phở"))
        .await
        .unwrap();

    assert_eq!(outcome.generation, GenerationOutcome::ProviderError);
    assert_eq!(outcome.decision.language, Language::Vi);
    assert_eq!(outcome.reply, fallback_reply(Language::Vi));
    assert!(!outcome.decision.include_support);
}

#[tokio::test]
async fn slow_reply_times_out_and_keeps_support_block() {
    let provider = Arc::new(ScriptedProvider::new().slow(
        Stage::Reply,
        Duration::from_secs(10),
        "too late",
    ));
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("reply-slow", "I want to kill myself"))
        .await
        .unwrap();

    assert_eq!(outcome.generation, GenerationOutcome::Timeout);
    assert!(outcome.reply.starts_with(&fallback_reply(Language::En)));
    assert!(outcome.reply.ends_with(SUPPORT_BLOCK));
    assert!(!outcome.reply.contains("too late"));
}

#[tokio::test]
async fn blank_reply_counts_as_empty_response() {
    let provider = Arc::new(ScriptedProvider::new().respond(Stage::Reply, "   \n"));
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("blank", "just checking in"))
        .await
        .unwrap();

    assert_eq!(outcome.generation, GenerationOutcome::EmptyResponse);
    assert_eq!(outcome.reply, fallback_reply(Language::En));
}

#[tokio::test]
async fn fallback_turns_are_still_committed_to_history() {
    let provider = Arc::new(ScriptedProvider::new().fail(Stage::Reply));
    let composer = composer(&provider);

    composer
        .handle_turn(ChatRequest::new("committed", "first message"))
        .await
        .unwrap();

    let session = composer.sessions().acquire("committed").await;
    assert_eq!(session.turn_count, 1);
    let turns = session.window.snapshot();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content(), "first message");
    assert_eq!(turns[1].content(), fallback_reply(Language::En));
}

#[tokio::test]
async fn garbage_trend_becomes_unknown() {
    let provider = Arc::new(
        ScriptedProvider::new().respond(Stage::Trend, "things look up, I guess?"),
    );
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("trend", "feeling ok").with_history(history()))
        .await
        .unwrap();

    assert_eq!(provider.calls(Stage::Trend), 1);
    assert_eq!(outcome.decision.trend, TrendLabel::Unknown);
}

#[tokio::test]
async fn trend_is_skipped_without_history() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("fresh", "first time here"))
        .await
        .unwrap();

    assert_eq!(provider.calls(Stage::Trend), 0);
    assert_eq!(outcome.decision.trend, TrendLabel::Unknown);
}

#[tokio::test]
async fn failing_intervention_leaves_suggestion_empty() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond(Stage::Insight, insight_json("worry", "medium", false, &["exam"], "en"))
            .fail(Stage::Intervention),
    );
    let composer = composer(&provider);

    let outcome = composer
        .handle_turn(ChatRequest::new("no-tip", "I'm worried about my results"))
        .await
        .unwrap();

    assert_eq!(provider.calls(Stage::Intervention), 1);
    assert!(outcome.decision.intervention_empty);
    assert_eq!(outcome.bundle.insight.emotion, Emotion::Worry);
    assert!(outcome.decision.include_support);
    assert!(!provider.last_reply_instructions().contains("SMALL SUGGESTION"));
}
