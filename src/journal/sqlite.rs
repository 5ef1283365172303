use super::{TurnRecord, TurnSink};
use crate::error::JournalError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

const JOURNAL_SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS journal_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const JOURNAL_SCHEMA_VERSION_KEY: &str = "journal_schema_version";
const JOURNAL_SCHEMA_VERSION: u32 = 1;

const TURN_COLUMNS: &str = "session_id, turn_index, timestamp, language, user_text, agent_text,
     emotion, risk_level, risk_flag, safety_category, joy_mode, include_support,
     trend, insight_json, safety_json";

async fn ensure_journal_schema_version(pool: &SqlitePool) -> Result<()> {
    sqlx::query(JOURNAL_SCHEMA_META_TABLE)
        .execute(pool)
        .await
        .context("create journal_schema_meta table")?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM journal_schema_meta WHERE key = $1")
            .bind(JOURNAL_SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await
            .context("load journal schema version")?;

    if let Some((value,)) = stored_version {
        let parsed = value
            .parse::<u32>()
            .with_context(|| format!("invalid journal schema version value: {value}"))?;
        if parsed != JOURNAL_SCHEMA_VERSION {
            return Err(JournalError::Migration(format!(
                "incompatible journal schema version: stored={parsed}, expected={JOURNAL_SCHEMA_VERSION}. \
move the journal DB aside and restart."
            ))
            .into());
        }
        return Ok(());
    }

    let legacy_table_count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
         FROM sqlite_master
         WHERE type = 'table'
           AND name = 'conversation_turns'",
    )
    .fetch_one(pool)
    .await
    .context("detect legacy journal table")?;

    if legacy_table_count.0 > 0 {
        return Err(JournalError::Migration(
            "conversation_turns exists without schema version metadata. \
move the journal DB aside and restart."
                .to_string(),
        )
        .into());
    }

    sqlx::query("INSERT INTO journal_schema_meta (key, value) VALUES ($1, $2)")
        .bind(JOURNAL_SCHEMA_VERSION_KEY)
        .bind(JOURNAL_SCHEMA_VERSION.to_string())
        .execute(pool)
        .await
        .context("persist journal schema version")?;

    Ok(())
}

/// SQLite-backed turn journal.
pub struct SqliteJournal {
    pool: SqlitePool,
}

impl SqliteJournal {
    /// Wrap an existing pool and run migrations.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        ensure_journal_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS conversation_turns (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 session_id TEXT NOT NULL,
                 turn_index INTEGER NOT NULL,
                 timestamp TEXT NOT NULL,
                 language TEXT NOT NULL,
                 user_text TEXT NOT NULL,
                 agent_text TEXT NOT NULL,
                 emotion TEXT NOT NULL,
                 risk_level TEXT NOT NULL,
                 risk_flag INTEGER NOT NULL,
                 safety_category TEXT NOT NULL,
                 joy_mode INTEGER NOT NULL,
                 include_support INTEGER NOT NULL,
                 trend TEXT NOT NULL,
                 insight_json TEXT NOT NULL,
                 safety_json TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .context("create conversation_turns table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversation_turns_session
                 ON conversation_turns(session_id, turn_index)",
        )
        .execute(&pool)
        .await
        .context("create conversation_turns index")?;

        Ok(Self { pool })
    }

    /// Open (or create) the journal file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create journal directory {}", parent.display()))?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .with_context(|| format!("open journal database {}", path.display()))?;
        Self::new(pool).await
    }

    /// Private in-memory journal; a single connection keeps one database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("open in-memory journal")?;
        Self::new(pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert(&self, record: &TurnRecord) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO conversation_turns ({TURN_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(&record.session_id)
        .bind(i64::try_from(record.turn_index).context("turn index out of range")?)
        .bind(record.timestamp.to_rfc3339())
        .bind(&record.language)
        .bind(&record.user_text)
        .bind(&record.agent_text)
        .bind(&record.emotion)
        .bind(&record.risk_level)
        .bind(record.risk_flag)
        .bind(&record.safety_category)
        .bind(record.joy_mode)
        .bind(record.include_support)
        .bind(&record.trend)
        .bind(&record.insight_json)
        .bind(&record.safety_json)
        .execute(&self.pool)
        .await
        .context("insert conversation turn")?;
        Ok(())
    }

    /// Every recorded turn, ordered by session and then turn index.
    pub async fn fetch_all(&self) -> Result<Vec<TurnRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {TURN_COLUMNS}
             FROM conversation_turns
             ORDER BY session_id ASC, turn_index ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("query conversation turns")?;

        rows.iter().map(map_turn_row).collect()
    }

    /// Highest recorded turn index for one session.
    pub async fn max_turn_index(&self, session_id: &str) -> Result<Option<u64>> {
        let (max,): (Option<i64>,) =
            sqlx::query_as("SELECT MAX(turn_index) FROM conversation_turns WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(&self.pool)
                .await
                .context("query last turn index")?;
        max.map(|value| u64::try_from(value).context("negative turn index"))
            .transpose()
    }

    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversation_turns")
            .fetch_one(&self.pool)
            .await
            .context("count conversation turns")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn map_turn_row(row: &SqliteRow) -> Result<TurnRecord> {
    let turn_index: i64 = row.try_get("turn_index")?;
    let timestamp_raw: String = row.try_get("timestamp")?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_raw)
        .with_context(|| format!("invalid journal timestamp: {timestamp_raw}"))?
        .with_timezone(&Utc);

    Ok(TurnRecord {
        session_id: row.try_get("session_id")?,
        turn_index: u64::try_from(turn_index).context("negative turn index")?,
        timestamp,
        language: row.try_get("language")?,
        user_text: row.try_get("user_text")?,
        agent_text: row.try_get("agent_text")?,
        emotion: row.try_get("emotion")?,
        risk_level: row.try_get("risk_level")?,
        risk_flag: row.try_get("risk_flag")?,
        safety_category: row.try_get("safety_category")?,
        joy_mode: row.try_get("joy_mode")?,
        include_support: row.try_get("include_support")?,
        trend: row.try_get("trend")?,
        insight_json: row.try_get("insight_json")?,
        safety_json: row.try_get("safety_json")?,
    })
}

impl TurnSink for SqliteJournal {
    fn record<'a>(
        &'a self,
        record: &'a TurnRecord,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.insert(record))
    }

    fn last_turn_index<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<u64>>> + Send + 'a>> {
        Box::pin(self.max_turn_index(session_id))
    }
}
