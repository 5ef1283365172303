use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Solace`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal plumbing continues to use
/// `anyhow::Result` for ad-hoc context chains.
///
/// None of these are ever shown to a student. The pipeline turns collaborator
/// failures into fallback replies before they reach this layer.
#[derive(Debug, Error)]
pub enum SolaceError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generation collaborator ─────────────────────────────────────────
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    // ── Session ─────────────────────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── Turn journal ────────────────────────────────────────────────────
    #[error("journal: {0}")]
    Journal(#[from] JournalError),

    // ── Per-turn pipeline ───────────────────────────────────────────────
    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Provider errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} returned status {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} returned an empty completion")]
    EmptyCompletion { provider: String },

    #[error("provider call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

// ─── Session errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session id must not be empty")]
    EmptyId,

    #[error("message must not be empty")]
    EmptyMessage,
}

// ─── Journal errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("export failed: {0}")]
    Export(String),
}

// ─── Pipeline errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller went away before the turn was committed to history.
    #[error("turn cancelled before {stage}")]
    Cancelled { stage: &'static str },

    #[error(transparent)]
    InvalidRequest(#[from] SessionError),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, SolaceError>;
