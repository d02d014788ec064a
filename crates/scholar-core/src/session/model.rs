//! Session domain model.
//!
//! This module contains the core Session entity that represents one
//! persisted conversation thread.

use chrono::{DateTime, Utc};

use super::message::{Message, Sender, Visualization};

/// Title given to every freshly created session.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Synthetic assistant greeting seeded into every new session.
pub const WELCOME_MESSAGE: &str = "Hi there! I'm your study assistant. How can I help you today?";

/// Id of the seeded welcome message.
pub const WELCOME_MESSAGE_ID: u64 = 1;

/// Largest message id a stored session may hold: the largest integer a
/// JSON number carries exactly.
pub const MAX_MESSAGE_ID: u64 = (1 << 53) - 1;

/// Current time truncated to whole milliseconds, the precision the
/// persisted format keeps.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Represents one conversation thread in the application's domain layer.
///
/// A session contains:
/// - An immutable identifier and creation timestamp
/// - A mutable display title
/// - An append-only message history that always starts with the welcome message
///
/// Message ids come from a per-session counter rather than from the current
/// history length, so replies that complete concurrently never share an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Human-readable session title
    pub title: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    messages: Vec<Message>,
    next_message_id: u64,
}

impl Session {
    /// Creates a session seeded with the welcome message.
    pub fn new(id: impl Into<String>) -> Self {
        let created_at = now_millis();
        let welcome = Message {
            id: WELCOME_MESSAGE_ID,
            sender: Sender::Assistant,
            text: WELCOME_MESSAGE.to_string(),
            timestamp: created_at,
            visualizations: Vec::new(),
        };

        Self {
            id: id.into(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            created_at,
            messages: vec![welcome],
            next_message_id: WELCOME_MESSAGE_ID + 1,
        }
    }

    /// Rebuilds a session from persisted parts.
    ///
    /// The id counter resumes after the highest stored id. Returns `None`
    /// when `messages` is empty, since every session owns at least its
    /// welcome message, or when an id exceeds [`MAX_MESSAGE_ID`].
    pub fn restore(
        id: String,
        title: String,
        created_at: DateTime<Utc>,
        messages: Vec<Message>,
    ) -> Option<Self> {
        let highest = messages.iter().map(|m| m.id).max()?;
        if highest > MAX_MESSAGE_ID {
            return None;
        }
        Some(Self {
            id,
            title,
            created_at,
            messages,
            next_message_id: highest + 1,
        })
    }

    /// The ordered message history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Id the next appended message will receive.
    pub fn next_message_id(&self) -> u64 {
        self.next_message_id
    }

    /// Appends a message stamped with the next id and the current time.
    pub fn append(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        visualizations: Vec<Visualization>,
    ) -> &Message {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(Message {
            id,
            sender,
            text: text.into(),
            timestamp: now_millis(),
            visualizations,
        });
        &self.messages[self.messages.len() - 1]
    }
}
