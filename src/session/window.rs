use super::types::Turn;
use std::collections::VecDeque;

/// Rolling window of the most recent turns. Oldest turns drop first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Seed from caller-supplied history, keeping only the newest turns.
    pub fn from_history(capacity: usize, history: impl IntoIterator<Item = Turn>) -> Self {
        let mut window = Self::new(capacity);
        for turn in history {
            window.push(turn);
        }
        window
    }

    pub fn push(&mut self, turn: Turn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Append the user turn and the reply that answered it.
    pub fn push_exchange(&mut self, user: Turn, assistant: Turn) {
        self.push(user);
        self.push(assistant);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Owned snapshot, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// The last `n` turns, oldest first.
    pub fn last(&self, n: usize) -> Vec<Turn> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).cloned().collect()
    }

    /// Contents of the last `n` user-authored turns, oldest first.
    pub fn recent_user_messages(&self, n: usize) -> Vec<&str> {
        let mut messages: Vec<&str> = self
            .turns
            .iter()
            .rev()
            .filter(|turn| turn.is_user())
            .take(n)
            .map(Turn::content)
            .collect();
        messages.reverse();
        messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_turn_drops_first() {
        let mut window = ConversationWindow::new(3);
        for i in 0..5 {
            window.push(Turn::user(format!("m{i}")));
        }
        let contents: Vec<String> = window.iter().map(|t| t.content().to_string()).collect();
        assert_eq!(contents, ["m2", "m3", "m4"]);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut window = ConversationWindow::new(0);
        window.push(Turn::user("a"));
        window.push(Turn::user("b"));
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.snapshot(), vec![Turn::user("b")]);
    }

    #[test]
    fn from_history_keeps_newest() {
        let history = (0..10).map(|i| Turn::user(i.to_string()));
        let window = ConversationWindow::from_history(4, history);
        assert_eq!(window.snapshot().first().map(Turn::content), Some("6"));
    }

    #[test]
    fn push_exchange_appends_in_order() {
        let mut window = ConversationWindow::new(4);
        window.push_exchange(Turn::user("q"), Turn::assistant("a"));
        assert_eq!(window.snapshot(), vec![Turn::user("q"), Turn::assistant("a")]);
    }

    #[test]
    fn last_and_recent_user_messages() {
        let window = ConversationWindow::from_history(
            10,
            [
                Turn::user("u1"),
                Turn::assistant("a1"),
                Turn::user("u2"),
                Turn::assistant("a2"),
                Turn::user("u3"),
            ],
        );
        assert_eq!(window.last(2), vec![Turn::assistant("a2"), Turn::user("u3")]);
        assert_eq!(window.last(99).len(), 5);
        assert_eq!(window.recent_user_messages(2), vec!["u2", "u3"]);
    }
}
