use super::AppState;
use crate::error::PipelineError;
use crate::journal::to_csv_string;
use crate::pipeline::{ChatRequest, Language, Region, StudentProfile, StudentType};
use crate::session::Turn;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// POST /chat request body. Also accepts the older `student_id`,
/// `profile_type` and `profile_region` field names.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default, alias = "student_id")]
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
    #[serde(default, alias = "profile_type")]
    pub student_type: StudentType,
    #[serde(default, alias = "profile_region")]
    pub region: Region,
    /// Caller language hint, e.g. `"vi"`.
    #[serde(default)]
    pub language: Option<String>,
}

impl ChatBody {
    fn into_request(self) -> ChatRequest {
        let hint = self.language.as_deref().and_then(Language::from_code);
        ChatRequest::new(self.session_id, self.message)
            .with_history(self.history)
            .with_profile(StudentProfile::new(self.student_type, self.region))
            .with_language_hint(hint)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// POST /chat: run one turn
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {}", e.body_text()),
            );
        }
    };
    let request = body.into_request();

    // The turn runs on its own task. If the client disconnects, this handler
    // is dropped, the guard fires and the turn stops before writing history.
    let cancel = CancellationToken::new();
    let _disconnect_guard = cancel.clone().drop_guard();
    let composer = Arc::clone(&state.composer);
    let turn = tokio::spawn(async move {
        composer.handle_turn_with_cancel(request, &cancel).await
    });

    match turn.await {
        Ok(Ok(outcome)) => Json(ChatResponse {
            reply: outcome.reply,
        })
        .into_response(),
        Ok(Err(PipelineError::InvalidRequest(e))) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(e @ PipelineError::Cancelled { .. })) => {
            tracing::debug!(error = %e, "chat turn abandoned");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Request was cancelled")
        }
        Err(join_error) => {
            tracing::error!(error = %join_error, "chat turn task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.",
            )
        }
    }
}

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.model,
    }))
}

/// GET /export/full_conversations.csv: every journaled turn
pub(super) async fn handle_export(State(state): State<AppState>) -> Response {
    let Some(journal) = state.journal.as_ref() else {
        return error_response(StatusCode::NOT_FOUND, "Journal is disabled");
    };
    match journal.fetch_all().await {
        Ok(records) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"full_conversations.csv\"",
                ),
            ],
            to_csv_string(&records),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(error = %error, "journal export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Export failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, ProviderConfig};
    use crate::journal::SqliteJournal;
    use crate::pipeline::{Composer, SUPPORT_BLOCK};
    use crate::providers::{CompletionOptions, Provider, ProviderMessage};
    use axum::body::to_bytes;
    use std::future::Future;
    use std::pin::Pin;

    struct Canned;

    impl Provider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn chat<'a>(
            &'a self,
            _messages: &'a [ProviderMessage],
            _options: &'a CompletionOptions,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
            Box::pin(async { Ok("I'm here with you.".to_string()) })
        }
    }

    async fn state(with_journal: bool) -> AppState {
        let config = PipelineConfig {
            summary_enabled: false,
            ..PipelineConfig::default()
        };
        let mut composer = Composer::new(Arc::new(Canned), &ProviderConfig::default(), config)
            .unwrap();
        let journal = if with_journal {
            let journal = Arc::new(SqliteJournal::in_memory().await.unwrap());
            composer = composer.with_sink(journal.clone());
            Some(journal)
        } else {
            None
        };
        AppState {
            composer: Arc::new(composer),
            journal,
            model: "test-model".into(),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn body(json: serde_json::Value) -> Result<Json<ChatBody>, JsonRejection> {
        Ok(Json(serde_json::from_value(json).unwrap()))
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let parsed: ChatBody = serde_json::from_value(serde_json::json!({
            "student_id": "s-42",
            "message": "hi",
            "profile_type": "international",
            "profile_region": "sea",
        }))
        .unwrap();
        assert_eq!(parsed.session_id, "s-42");
        assert_eq!(parsed.student_type, StudentType::International);
        assert_eq!(parsed.region, Region::SoutheastAsia);
    }

    #[test]
    fn language_hint_is_parsed() {
        let parsed: ChatBody = serde_json::from_value(serde_json::json!({
            "session_id": "s",
            "message": "ok",
            "language": "ko",
        }))
        .unwrap();
        assert_eq!(parsed.into_request().language_hint, Some(Language::Ko));
    }

    #[tokio::test]
    async fn chat_returns_reply_with_support_when_required() {
        let state = state(false).await;
        let response = handle_chat(
            State(state),
            body(serde_json::json!({"session_id": "s", "message": "em muốn tự tử"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let parsed: ChatResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(parsed.reply.starts_with("I'm here with you."));
        assert!(parsed.reply.contains(SUPPORT_BLOCK));
    }

    #[tokio::test]
    async fn chat_rejects_blank_message() {
        let state = state(false).await;
        let response = handle_chat(
            State(state),
            body(serde_json::json!({"session_id": "s", "message": "   "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("message must not be empty"));
    }

    #[tokio::test]
    async fn health_reports_model() {
        let response = handle_health(State(state(false).await)).await.into_response();
        let text = body_text(response).await;
        assert!(text.contains("\"status\":\"ok\""));
        assert!(text.contains("test-model"));
    }

    #[tokio::test]
    async fn export_without_journal_is_not_found() {
        let response = handle_export(State(state(false).await)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn export_lists_journaled_turns() {
        let state = state(true).await;
        handle_chat(
            State(state.clone()),
            body(serde_json::json!({"session_id": "s", "message": "hello there"})),
        )
        .await;

        let response = handle_export(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let csv = body_text(response).await;
        assert!(csv.starts_with("session_id,turn_index,"));
        assert!(csv.contains("s,1,"));
        assert!(csv.contains("hello there"));
    }
}
