use crate::app::chat::{ChatSession, run_chat_loop, send_once};
use crate::app::status::render_status;
use crate::app::wiring::{build_composer, open_journal};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::JournalError;
use crate::journal::{SqliteJournal, write_csv};
use crate::pipeline::{Language, Region, StudentProfile, StudentType};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use uuid::Uuid;

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            crate::gateway::run_gateway(config).await
        }
        Commands::Chat {
            session,
            message,
            student_type,
            region,
            language,
        } => {
            let session = ChatSession {
                session_id: session.unwrap_or_else(|| format!("cli-{}", Uuid::new_v4())),
                profile: StudentProfile::new(
                    student_type.as_deref().map(StudentType::parse).unwrap_or_default(),
                    region.as_deref().map(Region::parse).unwrap_or_default(),
                ),
                language_hint: language.as_deref().and_then(Language::from_code),
            };
            let journal = open_journal(&config).await;
            let composer = build_composer(&config, journal)?;
            let mut stdout = std::io::stdout();
            match message {
                Some(message) => send_once(&composer, &session, &message, &mut stdout).await,
                None => {
                    let stdin = BufReader::new(tokio::io::stdin());
                    run_chat_loop(&composer, &session, stdin, &mut stdout).await
                }
            }
        }
        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
        Commands::Export { out } => export_journal(&config.journal_db_path(), out).await,
    }
}

async fn export_journal(db_path: &Path, out: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(
        db_path.exists(),
        "no journal found at {}; run some turns first",
        db_path.display()
    );
    let journal = SqliteJournal::open(db_path).await?;
    let records = journal.fetch_all().await?;

    match out {
        Some(path) => {
            let mut file = std::fs::File::create(&path)
                .with_context(|| format!("create {}", path.display()))?;
            write_csv(&records, &mut file)
                .map_err(|error| JournalError::Export(error.to_string()))?;
            println!(
                "{}",
                t!("export.written", count = records.len(), path = path.display())
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write_csv(&records, &mut stdout)
                .map_err(|error| JournalError::Export(error.to_string()))?;
            stdout.flush().context("flush stdout")?;
        }
    }
    Ok(())
}
