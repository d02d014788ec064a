use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use scholar_core::error::ScholarError;
use scholar_core::session::{
    IdGenerator, Message, Sender, Session, SessionCollection, SessionStore, StoreLoad,
};
use scholar_core::transport::{AssistantReply, ChatTransport, ChatTurn, TransportFailure};

/// Text appended in place of a reply when the assistant cannot be reached.
pub const FALLBACK_REPLY: &str = "Sorry, there was an error connecting to the assistant.";

/// A send that has been applied locally and is waiting for the assistant.
///
/// Holds the target session by id, never by reference, so the reply lands
/// in the session the user was typing into even if the active session
/// changes (or the session is deleted) before it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub session_id: String,
    /// Outgoing context, oldest first, without the welcome message.
    pub history: Vec<ChatTurn>,
}

/// The assistant's answer (or failure) for one [`PendingReply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub session_id: String,
    pub outcome: Result<AssistantReply, TransportFailure>,
}

/// What [`SessionController::apply`] did with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// An assistant message was appended to the captured session.
    Appended { session_id: String, message_id: u64 },
    /// The captured session no longer exists; nothing changed.
    Discarded,
}

/// Owns the session collection and every operation that mutates it.
///
/// `SessionController` is responsible for:
/// - Loading the collection on startup and seeding a default session
/// - Creating, selecting, renaming and deleting sessions
/// - The send-message protocol (optimistic append, dispatch, reconcile)
/// - Persisting the full collection after every mutation
///
/// Persistence failures are logged and remembered in
/// [`last_persist_error`](Self::last_persist_error); they never fail an
/// operation, because the in-memory collection stays authoritative for the
/// running process.
///
/// If the store could not be read at startup, saving is suspended for the
/// rest of the process so the unread data is never overwritten.
pub struct SessionController {
    collection: SessionCollection,
    store: Arc<dyn SessionStore>,
    ids: Arc<dyn IdGenerator>,
    transport: Arc<dyn ChatTransport>,
    last_persist_error: Option<ScholarError>,
    saves_suspended: bool,
}

impl SessionController {
    /// Loads the persisted collection and prepares it for use.
    ///
    /// An empty or corrupt store yields a collection holding one freshly
    /// seeded session, which is persisted immediately. An unreadable store
    /// also yields a seeded session, but nothing is written back to it; the
    /// read error is reported through `last_persist_error`. The head of the
    /// list becomes the active session.
    ///
    /// # Arguments
    ///
    /// * `store` - Backend the full collection is loaded from and saved to
    /// * `ids` - Source of new session ids
    /// * `transport` - Client used to reach the assistant
    pub fn bootstrap(
        store: Arc<dyn SessionStore>,
        ids: Arc<dyn IdGenerator>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        let mut load_error = None;
        let sessions = match store.load() {
            Ok(StoreLoad::Loaded(sessions)) => {
                tracing::info!("Loaded {} sessions", sessions.len());
                sessions
            }
            Ok(StoreLoad::Empty) => {
                tracing::debug!("No stored sessions; starting fresh");
                Vec::new()
            }
            Ok(StoreLoad::Corrupt { reason }) => {
                tracing::warn!("Stored sessions were discarded: {}", reason);
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to read stored sessions, saving is suspended: {}",
                    err
                );
                load_error = Some(err);
                Vec::new()
            }
        };

        let mut controller = Self {
            collection: SessionCollection::from_sessions(sessions),
            store,
            ids,
            transport,
            saves_suspended: load_error.is_some(),
            last_persist_error: load_error,
        };

        if controller.collection.is_empty() {
            controller.create_session();
        }

        controller
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// All sessions, newest-created first.
    pub fn sessions(&self) -> &[Session] {
        self.collection.sessions()
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.collection.get(id)
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.collection.active_session_id()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.collection.active()
    }

    /// Messages of the active session, or an empty slice when none is active.
    pub fn active_messages(&self) -> &[Message] {
        self.collection
            .active()
            .map(Session::messages)
            .unwrap_or_default()
    }

    /// The error from the most recent save, cleared by the next successful
    /// one. After a failed startup load this is the read error, and it stays.
    pub fn last_persist_error(&self) -> Option<&ScholarError> {
        self.last_persist_error.as_ref()
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    /// Creates a new session at the head of the list and activates it.
    ///
    /// # Returns
    ///
    /// The id of the new session.
    pub fn create_session(&mut self) -> String {
        let id = self.fresh_session_id();
        self.collection.insert_front(Session::new(id.clone()));
        tracing::info!("Created session {}", id);
        self.persist();
        id
    }

    /// Makes `id` the active session. Unknown ids are ignored.
    ///
    /// The active pointer is not part of the persisted schema, so nothing is
    /// saved.
    pub fn select_session(&mut self, id: &str) -> bool {
        let selected = self.collection.select(id);
        if selected {
            tracing::debug!("Selected session {}", id);
        } else {
            tracing::debug!("Ignoring select of unknown session {}", id);
        }
        selected
    }

    /// Replaces the title of `id`. Unknown ids are ignored; empty titles
    /// are accepted as given.
    pub fn rename_session(&mut self, id: &str, title: impl Into<String>) -> bool {
        let Some(session) = self.collection.get_mut(id) else {
            tracing::debug!("Ignoring rename of unknown session {}", id);
            return false;
        };
        session.title = title.into();
        tracing::debug!("Renamed session {} to {:?}", id, session.title);
        self.persist();
        true
    }

    /// Removes `id` from the collection.
    ///
    /// If it was active, the new head of the list becomes active (or no
    /// session, when none remain). Replies still in flight for it will be
    /// discarded on arrival.
    pub fn delete_session(&mut self, id: &str) -> bool {
        if self.collection.remove(id).is_none() {
            tracing::debug!("Ignoring delete of unknown session {}", id);
            return false;
        }
        tracing::info!("Deleted session {}", id);
        self.persist();
        true
    }

    // ------------------------------------------------------------------
    // Send-message protocol
    // ------------------------------------------------------------------

    /// Appends the user's message to the active session, persists, and
    /// captures the outgoing context.
    ///
    /// Returns `None` without touching anything when the text is blank or
    /// no session is active.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() {
            return None;
        }
        let Some(session) = self.collection.active_mut() else {
            tracing::debug!("Ignoring send with no active session");
            return None;
        };

        session.append(Sender::User, text, Vec::new());
        let pending = PendingReply {
            session_id: session.id.clone(),
            history: outgoing_history(session),
        };

        self.persist();
        Some(pending)
    }

    /// Sends the captured context to the assistant.
    ///
    /// The returned future owns everything it needs and does not borrow the
    /// controller, so other operations can run while it is pending.
    pub fn dispatch(&self, pending: PendingReply) -> BoxFuture<'static, Completion> {
        let transport = Arc::clone(&self.transport);
        async move {
            let PendingReply {
                session_id,
                history,
            } = pending;
            let outcome = transport.send(history).await;
            Completion {
                session_id,
                outcome,
            }
        }
        .boxed()
    }

    /// Reconciles a completion with the current collection.
    ///
    /// The reply (or [`FALLBACK_REPLY`] on failure) is appended to the
    /// session the send was issued against, whether or not it is still
    /// active. Completions for deleted sessions are dropped.
    pub fn apply(&mut self, completion: Completion) -> ApplyOutcome {
        let Completion {
            session_id,
            outcome,
        } = completion;

        let Some(session) = self.collection.get_mut(&session_id) else {
            tracing::debug!("Discarding reply for deleted session {}", session_id);
            return ApplyOutcome::Discarded;
        };

        let message_id = match outcome {
            Ok(reply) => {
                session
                    .append(Sender::Assistant, reply.content, reply.visualizations)
                    .id
            }
            Err(err) => {
                tracing::debug!("Replying with fallback in session {}: {}", session_id, err);
                session.append(Sender::Assistant, FALLBACK_REPLY, Vec::new()).id
            }
        };

        self.persist();
        ApplyOutcome::Appended {
            session_id,
            message_id,
        }
    }

    /// Runs the whole protocol for callers that do not interleave other
    /// operations with the request.
    pub async fn send_message(&mut self, text: &str) -> Option<ApplyOutcome> {
        let pending = self.begin_send(text)?;
        let completion = self.dispatch(pending).await;
        Some(self.apply(completion))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn fresh_session_id(&self) -> String {
        let candidate = self.ids.next_id();
        if !self.collection.contains(&candidate) {
            return candidate;
        }

        tracing::warn!("Id generator repeated session id {}", candidate);
        let mut suffix = 1u64;
        loop {
            let id = format!("{candidate}-{suffix}");
            if !self.collection.contains(&id) {
                return id;
            }
            suffix += 1;
        }
    }

    fn persist(&mut self) {
        if self.saves_suspended {
            tracing::debug!("Not saving: stored sessions were never read");
            return;
        }
        match self.store.save(self.collection.sessions()) {
            Ok(()) => self.last_persist_error = None,
            Err(err) => {
                tracing::warn!("Failed to persist sessions: {}", err);
                self.last_persist_error = Some(err);
            }
        }
    }
}

/// Every message after the welcome message, in order.
fn outgoing_history(session: &Session) -> Vec<ChatTurn> {
    session
        .messages()
        .iter()
        .skip(1)
        .map(|message| ChatTurn::new(message.sender.into(), message.text.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scholar_core::session::{UuidIdGenerator, WELCOME_MESSAGE};
    use scholar_core::transport::ChatRole;
    use scholar_infrastructure::InMemorySessionStore;

    struct EchoTransport;

    #[async_trait]
    impl ChatTransport for EchoTransport {
        async fn send(&self, history: Vec<ChatTurn>) -> Result<AssistantReply, TransportFailure> {
            let last = history.last().map(|t| t.content.clone()).unwrap_or_default();
            Ok(AssistantReply {
                content: format!("echo: {last}"),
                visualizations: Vec::new(),
            })
        }
    }

    fn controller(store: Arc<InMemorySessionStore>) -> SessionController {
        SessionController::bootstrap(store, Arc::new(UuidIdGenerator), Arc::new(EchoTransport))
    }

    #[test]
    fn test_history_skips_only_the_welcome_message() {
        let mut session = Session::new("s");
        session.append(Sender::User, "one", Vec::new());
        session.append(Sender::Assistant, "two", Vec::new());

        let history = outgoing_history(&session);

        assert_eq!(
            history,
            vec![
                ChatTurn::new(ChatRole::User, "one"),
                ChatTurn::new(ChatRole::Assistant, "two"),
            ]
        );
        assert!(history.iter().all(|t| t.content != WELCOME_MESSAGE));
    }

    #[test]
    fn test_begin_send_keeps_text_verbatim() {
        let mut controller = controller(Arc::new(InMemorySessionStore::new()));

        let pending = controller.begin_send("  spaced  ").unwrap();

        assert_eq!(pending.history.last().unwrap().content, "  spaced  ");
        assert_eq!(controller.active_messages()[1].text, "  spaced  ");
    }

    #[test]
    fn test_whitespace_input_is_ignored() {
        let store = Arc::new(InMemorySessionStore::new());
        let mut controller = controller(store.clone());
        let saves = store.save_count();

        assert!(controller.begin_send(" \t\n").is_none());
        assert_eq!(controller.active_messages().len(), 1);
        assert_eq!(store.save_count(), saves);
    }

    #[test]
    fn test_select_does_not_persist() {
        let store = Arc::new(InMemorySessionStore::new());
        let mut controller = controller(store.clone());
        let first = controller.active_session_id().unwrap().to_string();
        controller.create_session();
        let saves = store.save_count();

        assert!(controller.select_session(&first));
        assert_eq!(store.save_count(), saves);
    }

    #[test]
    fn test_empty_title_is_accepted() {
        let mut controller = controller(Arc::new(InMemorySessionStore::new()));
        let id = controller.active_session_id().unwrap().to_string();

        assert!(controller.rename_session(&id, ""));
        assert_eq!(controller.session(&id).unwrap().title, "");
    }

    #[test]
    fn test_active_messages_empty_without_active_session() {
        let mut controller = controller(Arc::new(InMemorySessionStore::new()));
        let id = controller.active_session_id().unwrap().to_string();
        controller.delete_session(&id);

        assert!(controller.active_session().is_none());
        assert!(controller.active_messages().is_empty());
        assert!(controller.begin_send("hello").is_none());
    }

    #[tokio::test]
    async fn test_send_message_round_trip() {
        let store = Arc::new(InMemorySessionStore::new());
        let mut controller = controller(store.clone());

        let outcome = controller.send_message("ping").await.unwrap();

        let id = controller.active_session_id().unwrap().to_string();
        assert_eq!(
            outcome,
            ApplyOutcome::Appended {
                session_id: id,
                message_id: 3
            }
        );
        assert_eq!(controller.active_messages()[2].text, "echo: ping");
        assert_eq!(store.snapshot().unwrap()[0].messages().len(), 3);
    }
}
