//! Terminal chat against a single session.

use crate::error::PipelineError;
use crate::pipeline::{ChatRequest, Composer, Language, StudentProfile};
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Per-session settings for a terminal conversation.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub session_id: String,
    pub profile: StudentProfile,
    pub language_hint: Option<Language>,
}

impl ChatSession {
    fn request(&self, message: &str) -> ChatRequest {
        ChatRequest::new(&self.session_id, message)
            .with_profile(self.profile)
            .with_language_hint(self.language_hint)
    }
}

/// Run one turn and print the reply.
pub async fn send_once<W: Write>(
    composer: &Composer,
    session: &ChatSession,
    message: &str,
    out: &mut W,
) -> Result<()> {
    match composer.handle_turn(session.request(message)).await {
        Ok(outcome) => writeln!(out, "{}", outcome.reply).context("write reply")?,
        Err(PipelineError::InvalidRequest(e)) => writeln!(out, "! {e}").context("write error")?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Read lines until EOF or `/quit`, answering each one.
pub async fn run_chat_loop<R, W>(
    composer: &Composer,
    session: &ChatSession,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let locale = session.language_hint.unwrap_or_default().locale();
    writeln!(out, "{}", t!("chat.welcome", locale = locale)).context("write welcome")?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        send_once(composer, session, line, out).await?;
        writeln!(out).context("write separator")?;
        out.flush().context("flush stdout")?;
    }

    writeln!(out, "{}", t!("chat.goodbye", locale = locale)).context("write goodbye")?;
    Ok(())
}
