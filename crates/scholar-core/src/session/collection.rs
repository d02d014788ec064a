//! The ordered set of sessions plus the active-session pointer.

use super::model::Session;

/// Ordered list of sessions, newest-created first, with a weak pointer to
/// the active one.
///
/// The active pointer is either `None` or the id of a session in the list;
/// `remove` repairs it so it never dangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCollection {
    sessions: Vec<Session>,
    active_session_id: Option<String>,
}

impl SessionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from a stored list, activating its head.
    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        let active_session_id = sessions.first().map(|s| s.id.clone());
        Self {
            sessions,
            active_session_id,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Inserts a session at the head of the list and makes it active.
    pub fn insert_front(&mut self, session: Session) {
        self.active_session_id = Some(session.id.clone());
        self.sessions.insert(0, session);
    }

    /// Removes a session by id, returning it if present.
    ///
    /// When the removed session was active, the new head becomes active
    /// (or nothing, if the list is now empty).
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        let removed = self.sessions.remove(index);

        if self.active_session_id.as_deref() == Some(id) {
            self.active_session_id = self.sessions.first().map(|s| s.id.clone());
        }

        Some(removed)
    }

    /// Points the active pointer at `id`. Returns false for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active_session_id = Some(id.to_string());
        true
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active_session_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Session> {
        let id = self.active_session_id.clone()?;
        self.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.iter().map(|s| s.id.as_str())
    }
}
