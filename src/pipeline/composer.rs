//! Per-turn orchestration: runs every component, applies the precedence
//! table, calls the generation collaborator and commits the exchange.

use super::directives::{DirectiveBundle, Precedence, TurnDecision, resolve_precedence};
use super::insight::{InsightExtractor, InsightResult, RiskLevel};
use super::intervention::InterventionSuggester;
use super::joy::JoyDetector;
use super::keywords::{KeywordCategory, KeywordTable, default_table};
use super::language::{Language, LanguageDetector};
use super::profile::StudentProfile;
use super::register::register_notes;
use super::safety::{SafetyClassifier, SafetyResult};
use super::style::StyleAdvisor;
use super::summary::SummaryWriter;
use super::support::append_support_block;
use super::trend::{TrendAssessment, TrendEstimator};
use crate::config::{PipelineConfig, ProviderConfig};
use crate::error::{PipelineError, SessionError};
use crate::journal::{NullSink, TurnRecord, TurnSink};
use crate::prompt::{PromptEngine, reply_prompt};
use crate::providers::{CompletionOptions, Provider, ProviderMessage, sanitize_api_error};
use crate::session::{SessionGuard, SessionStore, Turn};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One inbound message plus the caller's view of the conversation.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    /// Only used to seed a session that has no history of its own yet.
    pub history: Vec<Turn>,
    pub profile: StudentProfile,
    pub language_hint: Option<Language>,
}

impl ChatRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_profile(mut self, profile: StudentProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_language_hint(mut self, language: Option<Language>) -> Self {
        self.language_hint = language;
        self
    }

    fn validate(&self) -> Result<(), SessionError> {
        if self.session_id.trim().is_empty() {
            return Err(SessionError::EmptyId);
        }
        if self.message.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        Ok(())
    }
}

/// How the reply text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GenerationOutcome {
    Generated,
    PromptRender,
    Timeout,
    ProviderError,
    EmptyResponse,
    /// The session stayed locked by another turn until the deadline passed.
    SessionBusy,
}

impl GenerationOutcome {
    pub fn is_fallback(self) -> bool {
        self != Self::Generated
    }
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final text for the student, support block included when required.
    pub reply: String,
    pub decision: TurnDecision,
    pub bundle: DirectiveBundle,
    pub generation: GenerationOutcome,
    /// 1-based index of this turn within its session; 0 when the turn was
    /// answered without entering the session.
    pub turn_index: u64,
}

#[derive(Debug, Clone)]
struct CallOptions {
    reply: CompletionOptions,
    extraction: CompletionOptions,
    intervention: CompletionOptions,
}

impl CallOptions {
    fn from_config(config: &ProviderConfig) -> Self {
        Self {
            reply: CompletionOptions::new(&config.model, config.reply_temperature)
                .with_max_tokens(config.reply_max_tokens),
            extraction: CompletionOptions::new(&config.model, config.extraction_temperature),
            intervention: CompletionOptions::new(&config.model, config.intervention_temperature),
        }
    }
}

pub struct Composer {
    provider: Arc<dyn Provider>,
    prompts: Arc<PromptEngine>,
    sessions: Arc<SessionStore>,
    sink: Arc<dyn TurnSink>,
    keywords: &'static KeywordTable,
    config: PipelineConfig,
    options: CallOptions,
    summary: Option<SummaryWriter>,
}

impl Composer {
    pub fn new(
        provider: Arc<dyn Provider>,
        provider_config: &ProviderConfig,
        config: PipelineConfig,
    ) -> anyhow::Result<Self> {
        let prompts = Arc::new(PromptEngine::new()?);
        let summary = config.summary_enabled.then(|| {
            SummaryWriter::new(
                Arc::clone(&provider),
                Arc::clone(&prompts),
                CompletionOptions::new(&provider_config.model, provider_config.summary_temperature),
                config.extraction_timeout(),
            )
        });
        Ok(Self {
            provider,
            prompts,
            sessions: Arc::new(
                SessionStore::new(config.window_turns)
                    .with_limits(config.max_sessions, config.session_idle_ttl()),
            ),
            sink: Arc::new(NullSink),
            keywords: default_table(),
            options: CallOptions::from_config(provider_config),
            config,
            summary,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn TurnSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn keyword_table_version(&self) -> &'static str {
        self.keywords.version()
    }

    pub async fn handle_turn(&self, request: ChatRequest) -> Result<TurnOutcome, PipelineError> {
        self.handle_turn_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run one turn. Cancelling `cancel` abandons the turn at any point before
    /// history is written; nothing is committed in that case.
    ///
    /// The whole turn, waiting for the session included, is bounded by the
    /// configured turn deadline. Every provider call gets at most what is left
    /// of it, and a turn that cannot get its session in time is answered from
    /// the local classifiers alone.
    pub async fn handle_turn_with_cancel(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, PipelineError> {
        request.validate()?;
        let message = request.message.trim();
        let deadline = Instant::now() + self.config.turn_deadline();

        let acquire = self.sessions.acquire(&request.session_id);
        let acquired = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PipelineError::Cancelled { stage: "session" }),
            guard = tokio::time::timeout_at(deadline, acquire) => guard,
        };
        let Ok(mut session) = acquired else {
            tracing::warn!(
                session_id = %request.session_id,
                "session busy past the turn deadline; answering locally"
            );
            return Ok(self.session_busy_outcome(&request, message));
        };
        self.restore_turn_count(&request.session_id, &mut session).await;
        if session.seed_if_empty(&request.history) {
            tracing::debug!(
                session_id = %request.session_id,
                turns = session.window.len(),
                "seeded session from caller history"
            );
        }
        let history = session.window.snapshot();
        let memory = session.summary.clone();

        let recent_users = recent_user_messages(&history, self.config.style_recent_user_turns);
        let resolution = LanguageDetector::new(self.config.default_language).resolve(
            message,
            request.language_hint,
            &recent_users,
        );
        let language = resolution.language;

        let extractor = InsightExtractor::new(
            self.provider.as_ref(),
            &self.prompts,
            self.options.extraction.clone(),
            within(deadline, self.config.extraction_timeout()),
        );
        let insight_extraction = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PipelineError::Cancelled { stage: "insight" }),
            extraction = extractor.extract(message, tail(&history, self.config.insight_context_turns)) => extraction,
        };
        let insight_fallback = insight_extraction.is_fallback();
        let insight = insight_extraction.into_value();

        let (safety, effective_risk, precedence) = self.classify_locally(message, &history, &insight);

        let call_budget = within(deadline, self.config.extraction_timeout());
        let estimator = TrendEstimator::new(
            self.provider.as_ref(),
            &self.prompts,
            self.options.extraction.clone(),
            call_budget,
        );
        let suggester = InterventionSuggester::new(
            self.provider.as_ref(),
            &self.prompts,
            self.options.intervention.clone(),
            call_budget,
        );
        let intervention_call = async {
            if precedence.suppress_intervention {
                String::new()
            } else {
                suggester
                    .suggest(precedence.joy_mode, &insight, message, language)
                    .await
            }
        };
        let (trend, intervention) = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PipelineError::Cancelled { stage: "trend" }),
            pair = async {
                tokio::join!(
                    estimator.estimate(&insight, tail(&history, self.config.trend_window_turns)),
                    intervention_call,
                )
            } => pair,
        };

        let mut style_messages = recent_users.clone();
        style_messages.push(message);
        let style = StyleAdvisor.advise(&style_messages, &insight, &request.profile);

        let bundle = DirectiveBundle {
            language,
            language_source: resolution.source,
            register: register_notes(language),
            insight,
            insight_fallback,
            safety,
            effective_risk,
            joy_mode: precedence.joy_mode,
            tone: precedence.tone,
            trend: trend.into_value(),
            intervention,
            style,
            memory,
            include_support: precedence.include_support,
            rule: precedence.rule,
        };
        let decision = bundle.decision();

        tracing::info!(
            session_id = %request.session_id,
            language = %decision.language,
            language_source = %bundle.language_source,
            category = %decision.category,
            escalate = decision.escalate,
            effective_risk = %decision.effective_risk,
            joy_mode = decision.joy_mode,
            include_support = decision.include_support,
            trend = %decision.trend,
            rule = %decision.rule,
            insight_fallback,
            "turn decided"
        );

        let (text, generation) = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PipelineError::Cancelled { stage: "generation" }),
            generated = self.generate(
                &bundle,
                &history,
                message,
                within(deadline, self.config.generation_timeout()),
            ) => generated,
        };
        if generation.is_fallback() {
            tracing::warn!(
                session_id = %request.session_id,
                outcome = %generation,
                "generation failed; using fallback reply"
            );
        }
        let reply = if bundle.include_support {
            append_support_block(&text)
        } else {
            text
        };

        session
            .window
            .push_exchange(Turn::user(message), Turn::assistant(reply.clone()));
        session.turn_count += 1;
        let turn_index = session.turn_count;
        let previous_summary = session.summary.clone();
        drop(session);

        let record = journal_record(&request.session_id, turn_index, message, &reply, &bundle);
        if let Err(error) = self.sink.record(&record).await {
            tracing::warn!(
                session_id = %request.session_id,
                error = %error,
                "failed to journal turn"
            );
        }

        self.spawn_summary(&request.session_id, previous_summary, &bundle);

        Ok(TurnOutcome {
            reply,
            decision,
            bundle,
            generation,
            turn_index,
        })
    }

    /// Keyword safety, joy and the precedence table. No provider calls.
    fn classify_locally(
        &self,
        message: &str,
        history: &[Turn],
        insight: &InsightResult,
    ) -> (SafetyResult, RiskLevel, Precedence) {
        let safety = SafetyClassifier::new(self.keywords).classify(message, insight.risk_level);
        let effective_risk = safety.effective_risk(insight.risk_level);
        let joy = JoyDetector::new(self.keywords, self.config.joy_window_turns)
            .evaluate(message, history, insight, &safety);
        let distress = self
            .keywords
            .find_any(&KeywordCategory::EMOTIONAL_DISTRESS, message)
            .is_some();
        let precedence = resolve_precedence(&safety, &joy, effective_risk, distress);
        (safety, effective_risk, precedence)
    }

    /// Answer for a turn that never got its session: the calm fallback, plus
    /// the support block whenever the keyword classifiers call for it. Nothing
    /// is committed or journaled.
    fn session_busy_outcome(&self, request: &ChatRequest, message: &str) -> TurnOutcome {
        let resolution = LanguageDetector::new(self.config.default_language).resolve(
            message,
            request.language_hint,
            &[],
        );
        let insight = InsightResult::fallback();
        let (safety, effective_risk, precedence) = self.classify_locally(message, &[], &insight);
        let style = StyleAdvisor.advise(&[message], &insight, &request.profile);

        let bundle = DirectiveBundle {
            language: resolution.language,
            language_source: resolution.source,
            register: register_notes(resolution.language),
            insight,
            insight_fallback: true,
            safety,
            effective_risk,
            joy_mode: precedence.joy_mode,
            tone: precedence.tone,
            trend: TrendAssessment::unknown(),
            intervention: String::new(),
            style,
            memory: None,
            include_support: precedence.include_support,
            rule: precedence.rule,
        };
        let decision = bundle.decision();
        let text = fallback_reply(bundle.language);
        let reply = if bundle.include_support {
            append_support_block(&text)
        } else {
            text
        };

        TurnOutcome {
            reply,
            decision,
            bundle,
            generation: GenerationOutcome::SessionBusy,
            turn_index: 0,
        }
    }

    /// First use of a session context: continue numbering after whatever the
    /// journal already holds for this id.
    async fn restore_turn_count(&self, session_id: &str, session: &mut SessionGuard) {
        if session.turn_count_restored {
            return;
        }
        match self.sink.last_turn_index(session_id).await {
            Ok(last) => {
                let last = last.unwrap_or_default();
                if last > session.turn_count {
                    tracing::debug!(session_id, last, "resuming turn numbering from journal");
                    session.turn_count = last;
                }
            }
            Err(error) => {
                tracing::warn!(
                    session_id,
                    error = %format!("{error:#}"),
                    "failed to read last turn index from journal"
                );
            }
        }
        session.turn_count_restored = true;
    }

    async fn generate(
        &self,
        bundle: &DirectiveBundle,
        history: &[Turn],
        message: &str,
        budget: Duration,
    ) -> (String, GenerationOutcome) {
        let fallback = || fallback_reply(bundle.language);

        let system = match reply_prompt(&self.prompts, bundle) {
            Ok(system) => system,
            Err(error) => {
                tracing::warn!(error = %error, "reply prompt failed to render");
                return (fallback(), GenerationOutcome::PromptRender);
            }
        };
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ProviderMessage::system(system));
        messages.extend(history.iter().map(Turn::to_provider_message));
        messages.push(ProviderMessage::user(message));

        let call = self.provider.chat(&messages, &self.options.reply);
        match tokio::time::timeout(budget, call).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                (text.trim().to_string(), GenerationOutcome::Generated)
            }
            Ok(Ok(_)) => (fallback(), GenerationOutcome::EmptyResponse),
            Ok(Err(error)) => {
                tracing::warn!(
                    error = %sanitize_api_error(&error.to_string()),
                    "generation call failed"
                );
                (fallback(), GenerationOutcome::ProviderError)
            }
            Err(_) => (fallback(), GenerationOutcome::Timeout),
        }
    }

    fn spawn_summary(&self, session_id: &str, previous: Option<String>, bundle: &DirectiveBundle) {
        let Some(writer) = self.summary.clone() else {
            return;
        };
        let sessions = Arc::clone(&self.sessions);
        let session_id = session_id.to_string();
        let insight = bundle.insight.clone();
        let trend = bundle.trend.clone();
        tokio::spawn(async move {
            if let Some(summary) = writer.summarize(previous.as_deref(), &insight, &trend).await {
                sessions.set_summary(&session_id, summary).await;
            }
        });
    }
}

/// Calm acknowledgement in the turn's language, used whenever generation fails.
pub fn fallback_reply(language: Language) -> String {
    t!("fallback.reply", locale = language.locale()).to_string()
}

/// `cap`, shortened to whatever is left before `deadline`.
fn within(deadline: Instant, cap: Duration) -> Duration {
    cap.min(deadline.saturating_duration_since(Instant::now()))
}

fn tail(turns: &[Turn], n: usize) -> &[Turn] {
    &turns[turns.len().saturating_sub(n)..]
}

fn recent_user_messages(history: &[Turn], n: usize) -> Vec<&str> {
    let mut messages: Vec<&str> = history
        .iter()
        .rev()
        .filter(|turn| turn.is_user())
        .take(n)
        .map(Turn::content)
        .collect();
    messages.reverse();
    messages
}

fn journal_record(
    session_id: &str,
    turn_index: u64,
    message: &str,
    reply: &str,
    bundle: &DirectiveBundle,
) -> TurnRecord {
    TurnRecord {
        session_id: session_id.to_string(),
        turn_index,
        timestamp: Utc::now(),
        language: bundle.language.code().to_string(),
        user_text: message.to_string(),
        agent_text: reply.to_string(),
        emotion: bundle.insight.emotion.to_string(),
        risk_level: bundle.effective_risk.to_string(),
        risk_flag: bundle.safety.escalate,
        safety_category: bundle.safety.category.to_string(),
        joy_mode: bundle.joy_mode,
        include_support: bundle.include_support,
        trend: bundle.trend.label.to_string(),
        insight_json: bundle.insight.to_json_string(),
        safety_json: bundle.safety.to_json_string(),
    }
}
