//! In-memory SessionStore, for tests and embedding without a filesystem.

use std::sync::Mutex;

use scholar_core::error::{Result, ScholarError};
use scholar_core::session::{Session, SessionStore, StoreLoad};

/// Keeps the last saved collection in memory.
///
/// `fail_saves` and `fail_loads` make every subsequent save or load return
/// an IO error, which lets callers exercise their persistence-failure paths.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<Option<Vec<Session>>>,
    fail_saves: Mutex<bool>,
    fail_loads: Mutex<bool>,
    save_count: Mutex<usize>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `sessions`.
    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Mutex::new(Some(sessions)),
            ..Self::default()
        }
    }

    /// The last saved collection, if any save happened (or was seeded).
    pub fn snapshot(&self) -> Option<Vec<Session>> {
        self.sessions.lock().ok().and_then(|s| s.clone())
    }

    pub fn save_count(&self) -> usize {
        self.save_count.lock().map(|c| *c).unwrap_or(0)
    }

    pub fn fail_saves(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_saves.lock() {
            *flag = fail;
        }
    }

    pub fn fail_loads(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_loads.lock() {
            *flag = fail;
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<StoreLoad> {
        if self.fail_loads.lock().map(|f| *f).unwrap_or(false) {
            return Err(ScholarError::io("simulated read failure"));
        }

        let sessions = self
            .sessions
            .lock()
            .map_err(|e| ScholarError::internal(format!("session store lock poisoned: {e}")))?;
        Ok(match sessions.as_ref() {
            Some(list) if !list.is_empty() => StoreLoad::Loaded(list.clone()),
            _ => StoreLoad::Empty,
        })
    }

    fn save(&self, sessions: &[Session]) -> Result<()> {
        let failing = self.fail_saves.lock().map(|f| *f).unwrap_or(false);
        if failing {
            return Err(ScholarError::io("simulated write failure"));
        }

        let mut stored = self
            .sessions
            .lock()
            .map_err(|e| ScholarError::internal(format!("session store lock poisoned: {e}")))?;
        *stored = Some(sessions.to_vec());
        drop(stored);

        if let Ok(mut count) = self.save_count.lock() {
            *count += 1;
        }
        Ok(())
    }
}
