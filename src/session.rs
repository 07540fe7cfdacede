//! Bounded conversation history per session.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone)]
struct Turn {
    role: &'static str,
    content: String,
}

#[derive(Debug, Default)]
struct Sessions {
    counter: u64,
    turns: HashMap<String, Vec<Turn>>,
}

/// In-memory store of recent exchanges, keyed by session id.
#[derive(Debug)]
pub struct SessionManager {
    max_history: usize,
    inner: Mutex<Sessions>,
}

impl SessionManager {
    /// Keep at most `max_history` exchanges per session.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            inner: Mutex::new(Sessions::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new, empty session.
    pub fn create_session(&self) -> String {
        let mut inner = self.lock();
        inner.counter += 1;
        let id = format!("session_{}", inner.counter);
        inner.turns.insert(id.clone(), Vec::new());
        debug!(session = %id, "Created session");
        id
    }

    /// Record a question and its answer, creating the session if needed.
    pub fn add_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let limit = self.max_history * 2;
        let mut inner = self.lock();
        let turns = inner.turns.entry(session_id.to_string()).or_default();

        turns.push(Turn {
            role: "User",
            content: question.to_string(),
        });
        turns.push(Turn {
            role: "Assistant",
            content: answer.to_string(),
        });

        if turns.len() > limit {
            let excess = turns.len() - limit;
            turns.drain(..excess);
        }
    }

    /// Render the session's history, or `None` if it is unknown or empty.
    pub fn history(&self, session_id: &str) -> Option<String> {
        let inner = self.lock();
        let turns = inner.turns.get(session_id)?;
        if turns.is_empty() {
            return None;
        }

        Some(
            turns
                .iter()
                .map(|t| format!("{}: {}", t.role, t.content))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    pub fn clear(&self, session_id: &str) {
        if let Some(turns) = self.lock().turns.get_mut(session_id) {
            turns.clear();
        }
    }
}
