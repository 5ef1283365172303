use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Record every turn to the SQLite journal (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Override for the journal database path; defaults to
    /// `<workspace>/journal/wellbeing_logs.db`
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: None,
        }
    }
}
