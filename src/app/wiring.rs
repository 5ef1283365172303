//! Builds the shared runtime pieces from config: provider, journal, composer.

use crate::config::Config;
use crate::journal::SqliteJournal;
use crate::pipeline::Composer;
use crate::providers::create_provider;
use anyhow::Result;
use std::sync::Arc;

/// Open the journal when enabled. A journal that fails to open is logged and
/// skipped; turns still run without it.
pub async fn open_journal(config: &Config) -> Option<Arc<SqliteJournal>> {
    if !config.journal.enabled {
        return None;
    }
    let path = config.journal_db_path();
    match SqliteJournal::open(&path).await {
        Ok(journal) => {
            tracing::info!(path = %path.display(), "journal opened");
            Some(Arc::new(journal))
        }
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %format!("{error:#}"),
                "journal unavailable; turns will not be recorded"
            );
            None
        }
    }
}

pub fn build_composer(config: &Config, journal: Option<Arc<SqliteJournal>>) -> Result<Composer> {
    if config.provider.api_key.as_deref().is_none_or(str::is_empty) {
        tracing::warn!(
            provider = %config.provider.name,
            "no API key configured; replies will use the fallback text"
        );
    }
    let provider = create_provider(&config.provider);
    let composer = Composer::new(provider, &config.provider, config.pipeline.clone())?;
    Ok(match journal {
        Some(journal) => composer.with_sink(journal),
        None => composer,
    })
}
