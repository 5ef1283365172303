//! Append-only turn journal.
//!
//! The composer hands every finished turn to a [`TurnSink`]. Sinks are pure
//! observers: a failed write is logged by the caller and never changes the
//! reply.

pub mod export;
pub mod sqlite;

pub use export::{CSV_HEADER, csv_escape, to_csv_string, write_csv};
pub use sqlite::SqliteJournal;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// One row of the journal: the exchange plus the decision fields that shaped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub session_id: String,
    pub turn_index: u64,
    pub timestamp: DateTime<Utc>,
    pub language: String,
    pub user_text: String,
    pub agent_text: String,
    pub emotion: String,
    pub risk_level: String,
    /// Set whenever safety escalated.
    pub risk_flag: bool,
    pub safety_category: String,
    pub joy_mode: bool,
    pub include_support: bool,
    pub trend: String,
    pub insight_json: String,
    pub safety_json: String,
}

/// Persistence contract for finished turns.
pub trait TurnSink: Send + Sync {
    fn record<'a>(
        &'a self,
        record: &'a TurnRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Highest turn index already stored for `session_id`. Lets a session
    /// that was evicted or lost to a restart keep counting where it left off.
    fn last_turn_index<'a>(
        &'a self,
        _session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<u64>>> + Send + 'a>> {
        Box::pin(async { Ok(None) })
    }
}

/// Sink that drops every record. Used when the journal is disabled.
pub struct NullSink;

impl TurnSink for NullSink {
    fn record<'a>(
        &'a self,
        _record: &'a TurnRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
pub(crate) fn sample_record(session_id: &str, turn_index: u64) -> TurnRecord {
    TurnRecord {
        session_id: session_id.to_string(),
        turn_index,
        timestamp: Utc::now(),
        language: "en".into(),
        user_text: "hello".into(),
        agent_text: "hey, good to hear from you".into(),
        emotion: "neutral".into(),
        risk_level: "low".into(),
        risk_flag: false,
        safety_category: "none".into(),
        joy_mode: false,
        include_support: false,
        trend: "unknown".into(),
        insight_json: "{}".into(),
        safety_json: "{}".into(),
    }
}
