use crate::config::Config;
use crate::pipeline::KEYWORD_TABLE_VERSION;

pub fn render_status(config: &Config) -> String {
    let on_off = |value: bool| if value { "on" } else { "off" };
    let api_key = if config.provider.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
        format!("✓ {}", t!("common.configured"))
    } else {
        format!("✗ {}", t!("common.not_configured"))
    };

    let lines = [
        format!("◆ {}", t!("status.title")),
        String::new(),
        format!("{}     {}", t!("status.version"), env!("CARGO_PKG_VERSION")),
        format!("{}      {}", t!("status.config"), config.config_path.display()),
        String::new(),
        format!("  {}    {}", t!("status.provider"), config.provider.name),
        format!("   {}      {}", t!("status.base_url"), config.provider.base_url),
        format!("   {}         {}", t!("status.model"), config.provider.model),
        format!("   {}       {api_key}", t!("status.api_key")),
        String::new(),
        format!("  {}", t!("status.pipeline")),
        format!(
            "   {}        {} turns (joy {}, trend {}, insight {})",
            t!("status.window"),
            config.pipeline.window_turns,
            config.pipeline.joy_window_turns,
            config.pipeline.trend_window_turns,
            config.pipeline.insight_context_turns
        ),
        format!(
            "   {}      extraction {}ms, generation {}ms, turn {}ms, http {}s",
            t!("status.timeouts"),
            config.pipeline.extraction_timeout_ms,
            config.pipeline.generation_timeout_ms,
            config.pipeline.turn_deadline_ms,
            config.gateway.request_timeout_secs
        ),
        format!(
            "   {}      {}",
            t!("status.language"),
            config.pipeline.default_language
        ),
        format!(
            "   {}       {}",
            t!("status.summary"),
            on_off(config.pipeline.summary_enabled)
        ),
        format!("   {}      {KEYWORD_TABLE_VERSION}", t!("status.keywords")),
        String::new(),
        format!(
            "  {}       {}:{}",
            t!("status.gateway"),
            config.gateway.host,
            config.gateway.port
        ),
        format!(
            "  {}       {} ({})",
            t!("status.journal"),
            on_off(config.journal.enabled),
            config.journal_db_path().display()
        ),
        format!(
            "  {}     {}",
            t!("status.log_level"),
            config.observability.log_level
        ),
    ];

    lines.join("\n")
}
