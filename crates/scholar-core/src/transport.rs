//! Remote assistant interface.
//!
//! The controller talks to the assistant only through [`ChatTransport`];
//! concrete clients live in `scholar-interaction`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{Sender, Visualization};

/// Role of a turn in the outgoing conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl From<Sender> for ChatRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Self::User,
            Sender::Assistant => Self::Assistant,
        }
    }
}

/// One entry of the history sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// What the assistant answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantReply {
    pub content: String,
    pub visualizations: Vec<Visualization>,
}

/// Any failure at the network/protocol boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request never produced an HTTP response (connect error, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("assistant endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed assistant response: {0}")]
    MalformedResponse(String),
}

/// Sends a conversation history to a chat-completion backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `history` (oldest first) and returns the assistant's answer.
    async fn send(&self, history: Vec<ChatTurn>) -> Result<AssistantReply, TransportFailure>;
}
