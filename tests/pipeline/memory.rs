use crate::mock_provider::{ScriptedProvider, Stage, composer, composer_with, pipeline_config};
use solace::config::PipelineConfig;
use solace::pipeline::{ChatRequest, Composer};
use std::sync::Arc;
use std::time::Duration;

async fn wait_for_summary(composer: &Composer, session_id: &str) -> Option<String> {
    for _ in 0..100 {
        if let Some(summary) = composer.sessions().peek_summary(session_id) {
            return Some(summary);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}

fn with_summary() -> PipelineConfig {
    PipelineConfig {
        summary_enabled: true,
        ..pipeline_config()
    }
}

#[tokio::test]
async fn summary_is_written_after_the_reply_and_fed_back() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer_with(&provider, with_summary());

    composer
        .handle_turn(ChatRequest::new("memo", "my roommate keeps me up at night"))
        .await
        .unwrap();
    let summary = wait_for_summary(&composer, "memo").await;
    assert_eq!(summary.as_deref(), Some("The student seems settled and chatty."));

    let outcome = composer
        .handle_turn(ChatRequest::new("memo", "still tired today"))
        .await
        .unwrap();
    assert_eq!(
        outcome.bundle.memory.as_deref(),
        Some("The student seems settled and chatty.")
    );
    let instructions = provider.last_reply_instructions();
    assert!(instructions.contains("MEMORY FROM EARLIER"));
    assert!(instructions.contains("The student seems settled and chatty."));
}

#[tokio::test]
async fn summary_never_reaches_the_student() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer_with(&provider, with_summary());

    for message in ["hi there", "long day"] {
        let outcome = composer
            .handle_turn(ChatRequest::new("private", message))
            .await
            .unwrap();
        assert!(!outcome.reply.contains("settled and chatty"));
        wait_for_summary(&composer, "private").await;
    }

    let session = composer.sessions().acquire("private").await;
    assert!(
        session
            .window
            .iter()
            .all(|turn| !turn.content().contains("settled and chatty"))
    );
}

#[tokio::test]
async fn failed_summary_keeps_previous_note() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer_with(&provider, with_summary());

    composer
        .handle_turn(ChatRequest::new("keep", "first"))
        .await
        .unwrap();
    assert!(wait_for_summary(&composer, "keep").await.is_some());

    let calls_before = provider.calls(Stage::Summary);
    // An empty note counts as a failed summary.
    provider.set(Stage::Summary, "");
    composer
        .handle_turn(ChatRequest::new("keep", "second"))
        .await
        .unwrap();
    for _ in 0..100 {
        if provider.calls(Stage::Summary) > calls_before {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        composer.sessions().peek_summary("keep").as_deref(),
        Some("The student seems settled and chatty.")
    );
}

#[tokio::test]
async fn summary_disabled_makes_no_summary_calls() {
    let provider = Arc::new(ScriptedProvider::new());
    let composer = composer(&provider);

    composer
        .handle_turn(ChatRequest::new("off", "hello"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(provider.calls(Stage::Summary), 0);
    assert!(composer.sessions().peek_summary("off").is_none());
}
