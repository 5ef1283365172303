use super::types::Turn;
use super::window::ConversationWindow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

const DEFAULT_MAX_SESSIONS: usize = 10_000;
const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3_600);

/// Cross-turn state owned by one session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub window: ConversationWindow,
    /// Internal memory note. Last write wins.
    pub summary: Option<String>,
    pub turn_count: u64,
    /// Set once `turn_count` has been reconciled with the journal.
    pub turn_count_restored: bool,
}

impl SessionContext {
    pub fn new(window_turns: usize) -> Self {
        Self {
            window: ConversationWindow::new(window_turns),
            summary: None,
            turn_count: 0,
            turn_count_restored: false,
        }
    }

    /// Seed the window from caller history when the session has none of its
    /// own yet. Returns whether anything was seeded.
    pub fn seed_if_empty(&mut self, history: &[Turn]) -> bool {
        if !self.window.is_empty() || history.is_empty() {
            return false;
        }
        let capacity = self.window.capacity();
        self.window = ConversationWindow::from_history(capacity, history.iter().cloned());
        true
    }
}

/// Exclusive handle to one session's context. Held for a whole pipeline run,
/// so concurrent requests for the same session queue behind each other.
pub type SessionGuard = OwnedMutexGuard<SessionContext>;

struct SessionSlot {
    context: Arc<AsyncMutex<SessionContext>>,
    last_used: Instant,
}

impl SessionSlot {
    /// Nobody holds or waits on the context; the map owns the only handle.
    fn is_unclaimed(&self) -> bool {
        Arc::strong_count(&self.context) == 1
    }

    fn is_expired(&self, now: Instant, idle_ttl: Duration) -> bool {
        self.is_unclaimed() && now.duration_since(self.last_used) >= idle_ttl
    }
}

/// Owns every session context, keyed by session id.
///
/// Contexts nobody is using are evicted once idle for longer than the TTL,
/// and the least recently used ones go first when the store hits its cap.
/// A context that is locked or awaited is never evicted.
pub struct SessionStore {
    window_turns: usize,
    max_sessions: usize,
    idle_ttl: Duration,
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl SessionStore {
    pub fn new(window_turns: usize) -> Self {
        Self {
            window_turns,
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_ttl: DEFAULT_IDLE_TTL,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_limits(mut self, max_sessions: usize, idle_ttl: Duration) -> Self {
        self.max_sessions = max_sessions.max(1);
        self.idle_ttl = idle_ttl;
        self
    }

    fn handle(&self, session_id: &str) -> Arc<AsyncMutex<SessionContext>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if !sessions.contains_key(session_id) && sessions.len() >= self.max_sessions {
            let evicted = self.make_room(&mut sessions, now);
            tracing::debug!(evicted, remaining = sessions.len(), "session store at capacity");
        }
        let slot = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionSlot {
                context: Arc::new(AsyncMutex::new(SessionContext::new(self.window_turns))),
                last_used: now,
            });
        slot.last_used = now;
        Arc::clone(&slot.context)
    }

    /// Drop expired contexts, then the least recently used unclaimed ones
    /// until the store sits at nine tenths of its cap.
    fn make_room(&self, sessions: &mut HashMap<String, SessionSlot>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, slot| !slot.is_expired(now, self.idle_ttl));

        let target = self.max_sessions - self.max_sessions / 10 - 1;
        if sessions.len() > target {
            let mut unclaimed: Vec<(Instant, String)> = sessions
                .iter()
                .filter(|(_, slot)| slot.is_unclaimed())
                .map(|(id, slot)| (slot.last_used, id.clone()))
                .collect();
            unclaimed.sort_unstable();
            let excess = sessions.len() - target;
            for (_, id) in unclaimed.into_iter().take(excess) {
                sessions.remove(&id);
            }
        }
        before - sessions.len()
    }

    /// Wait for exclusive access to a session, creating it on first use.
    pub async fn acquire(&self, session_id: &str) -> SessionGuard {
        self.handle(session_id).lock_owned().await
    }

    /// Summary of a session without queueing behind an in-flight turn.
    pub fn peek_summary(&self, session_id: &str) -> Option<String> {
        let handle = self.existing(session_id)?;
        let guard = handle.try_lock().ok()?;
        guard.summary.clone()
    }

    /// Store a new summary. Last write wins; an evicted session stays gone.
    pub async fn set_summary(&self, session_id: &str, summary: String) {
        if let Some(handle) = self.existing(session_id) {
            handle.lock().await.summary = Some(summary);
        }
    }

    fn existing(&self, session_id: &str) -> Option<Arc<AsyncMutex<SessionContext>>> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get(session_id).map(|slot| Arc::clone(&slot.context))
    }

    /// Remove every unclaimed context idle for longer than the TTL.
    pub fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, slot| !slot.is_expired(now, self.idle_ttl));
        before - sessions.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
