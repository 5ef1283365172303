use crate::mock_provider::{ScriptedProvider, Stage, composer, composer_with, pipeline_config};
use solace::config::PipelineConfig;
use solace::error::PipelineError;
use solace::pipeline::{ChatRequest, GenerationOutcome, Language, SUPPORT_BLOCK, fallback_reply};
use solace::session::Role;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_session_turns_are_serialized() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = Arc::new(composer(&provider));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let composer = Arc::clone(&composer);
            tokio::spawn(async move {
                composer
                    .handle_turn(ChatRequest::new("shared", format!("message {i}")))
                    .await
            })
        })
        .collect();

    let mut indices = BTreeSet::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        indices.insert(outcome.turn_index);
    }
    assert_eq!(indices, (1..=10).collect::<BTreeSet<u64>>());

    let session = composer.sessions().acquire("shared").await;
    assert_eq!(session.turn_count, 10);
    let turns = session.window.snapshot();
    assert_eq!(turns.len(), 12);
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Assistant);
    }
}

#[tokio::test]
async fn different_sessions_do_not_share_history() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer(&provider);

    composer
        .handle_turn(ChatRequest::new("alpha", "alpha speaking"))
        .await
        .unwrap();
    composer
        .handle_turn(ChatRequest::new("beta", "beta speaking"))
        .await
        .unwrap();

    let alpha = composer.sessions().acquire("alpha").await.window.snapshot();
    assert_eq!(alpha.len(), 2);
    assert!(alpha.iter().all(|turn| !turn.content().contains("beta")));
    assert_eq!(composer.sessions().session_count(), 2);
}

#[tokio::test]
async fn cancelling_mid_turn_commits_nothing() {
    let provider = Arc::new(ScriptedProvider::new().slow(
        Stage::Insight,
        Duration::from_secs(2),
        crate::mock_provider::insight_json("neutral", "low", false, &[], "en"),
    ));
    let composer = Arc::new(composer(&provider));
    let cancel = CancellationToken::new();

    let turn = {
        let composer = Arc::clone(&composer);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            composer
                .handle_turn_with_cancel(ChatRequest::new("gone", "are you there?"), &cancel)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let result = turn.await.unwrap();
    assert!(matches!(result, Err(PipelineError::Cancelled { .. })));
    assert_eq!(provider.calls(Stage::Reply), 0);

    let session = composer.sessions().acquire("gone").await;
    assert_eq!(session.turn_count, 0);
    assert!(session.window.is_empty());
}

#[tokio::test]
async fn session_stays_usable_after_cancellation() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer(&provider);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let cancelled = composer
        .handle_turn_with_cancel(ChatRequest::new("retry", "first try"), &cancel)
        .await;
    assert!(cancelled.is_err());

    let outcome = composer
        .handle_turn(ChatRequest::new("retry", "second try"))
        .await
        .unwrap();
    assert_eq!(outcome.turn_index, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queued_turn_keeps_support_within_turn_deadline() {
    let provider = Arc::new(ScriptedProvider::new().slow(
        Stage::Reply,
        Duration::from_secs(3),
        "too late",
    ));
    let config = PipelineConfig {
        turn_deadline_ms: 1_300,
        ..pipeline_config()
    };
    let composer = Arc::new(composer_with(&provider, config));

    let first = {
        let composer = Arc::clone(&composer);
        tokio::spawn(async move {
            composer
                .handle_turn(ChatRequest::new("queue", "ugh, group project again"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = tokio::time::Instant::now();
    let second = composer
        .handle_turn(ChatRequest::new("queue", "I want to kill myself"))
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_millis(2_000));
    assert!(matches!(
        second.generation,
        GenerationOutcome::Timeout | GenerationOutcome::SessionBusy
    ));
    assert!(second.decision.escalate);
    assert!(second.reply.starts_with(&fallback_reply(Language::En)));
    assert!(second.reply.ends_with(SUPPORT_BLOCK));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.generation, GenerationOutcome::Timeout);
}

#[tokio::test]
async fn turn_deadline_caps_generation() {
    let provider = Arc::new(ScriptedProvider::new().slow(
        Stage::Reply,
        Duration::from_secs(5),
        "too late",
    ));
    let config = PipelineConfig {
        turn_deadline_ms: 200,
        ..pipeline_config()
    };
    let composer = composer_with(&provider, config);

    let started = tokio::time::Instant::now();
    let outcome = composer
        .handle_turn(ChatRequest::new("capped", "how was your weekend?"))
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_millis(800));
    assert_eq!(outcome.generation, GenerationOutcome::Timeout);
    assert_eq!(outcome.turn_index, 1);
}

#[tokio::test]
async fn busy_session_turn_commits_nothing() {
    let provider = Arc::new(ScriptedProvider::new());
    let config = PipelineConfig {
        turn_deadline_ms: 100,
        ..pipeline_config()
    };
    let composer = composer_with(&provider, config);
    let held = composer.sessions().acquire("busy").await;

    let outcome = composer
        .handle_turn(ChatRequest::new("busy", "I want to kill myself"))
        .await
        .unwrap();
    assert_eq!(outcome.generation, GenerationOutcome::SessionBusy);
    assert!(outcome.reply.ends_with(SUPPORT_BLOCK));
    assert_eq!(provider.calls(Stage::Insight), 0);
    assert_eq!(provider.calls(Stage::Reply), 0);
    drop(held);

    let session = composer.sessions().acquire("busy").await;
    assert_eq!(session.turn_count, 0);
    assert!(session.window.is_empty());
}

#[tokio::test]
async fn idle_sessions_are_evicted_at_the_cap() {
    let provider = Arc::new(ScriptedProvider::new());
    let config = PipelineConfig {
        max_sessions: 5,
        ..pipeline_config()
    };
    let composer = composer_with(&provider, config);

    for i in 0..20 {
        composer
            .handle_turn(ChatRequest::new(format!("visitor-{i}"), "hi"))
            .await
            .unwrap();
    }
    assert!(composer.sessions().session_count() <= 5);
}
