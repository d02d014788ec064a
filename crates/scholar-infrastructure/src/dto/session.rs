//! Session DTOs (anti-corruption layer for the persisted blob).
//!
//! Wire shape, one JSON array for the whole collection:
//!
//! ```json
//! [{ "id": "…", "title": "New Chat", "createdAt": 1718000000000,
//!    "messages": [{ "id": 1, "sender": "bot", "text": "…",
//!                   "timestamp": "2024-06-10T06:13:20.000Z",
//!                   "visualizations": [{ "title": "…", "description": "…",
//!                                        "image_base64": "…" }] }] }]
//! ```

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use scholar_core::error::{Result, ScholarError};
use scholar_core::session::{ImagePayload, MAX_MESSAGE_ID, Message, Sender, Session, Visualization};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderDto {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot", alias = "assistant")]
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizationDto {
    pub title: String,
    pub description: String,
    pub image_base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: u64,
    pub sender: SenderDto,
    pub text: String,
    /// ISO 8601 timestamp.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<Vec<VisualizationDto>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: String,
    pub title: String,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    pub messages: Vec<MessageDto>,
}

// ============================================================================
// Domain -> DTO
// ============================================================================

impl From<Sender> for SenderDto {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Self::User,
            Sender::Assistant => Self::Bot,
        }
    }
}

impl From<&Visualization> for VisualizationDto {
    fn from(viz: &Visualization) -> Self {
        Self {
            title: viz.title.clone(),
            description: viz.description.clone(),
            image_base64: viz.image.as_base64().to_string(),
        }
    }
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        let visualizations: Option<Vec<VisualizationDto>> = (!message.visualizations.is_empty())
            .then(|| message.visualizations.iter().map(VisualizationDto::from).collect());

        Self {
            id: message.id,
            sender: message.sender.into(),
            text: message.text.clone(),
            timestamp: message.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            visualizations,
        }
    }
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            created_at: session.created_at.timestamp_millis(),
            messages: session.messages().iter().map(MessageDto::from).collect(),
        }
    }
}

// ============================================================================
// DTO -> Domain
// ============================================================================

impl From<SenderDto> for Sender {
    fn from(sender: SenderDto) -> Self {
        match sender {
            SenderDto::User => Self::User,
            SenderDto::Bot => Self::Assistant,
        }
    }
}

impl From<VisualizationDto> for Visualization {
    fn from(dto: VisualizationDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            image: ImagePayload::from_base64(dto.image_base64),
        }
    }
}

fn invalid(message: impl Into<String>) -> ScholarError {
    ScholarError::serialization("sessions", message)
}

impl TryFrom<MessageDto> for Message {
    type Error = ScholarError;

    fn try_from(dto: MessageDto) -> Result<Self> {
        let timestamp = DateTime::parse_from_rfc3339(&dto.timestamp)
            .map_err(|e| {
                invalid(format!(
                    "message {} has bad timestamp '{}': {e}",
                    dto.id, dto.timestamp
                ))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: dto.id,
            sender: dto.sender.into(),
            text: dto.text,
            timestamp,
            visualizations: dto
                .visualizations
                .unwrap_or_default()
                .into_iter()
                .map(Visualization::from)
                .collect(),
        })
    }
}

impl TryFrom<SessionDto> for Session {
    type Error = ScholarError;

    fn try_from(dto: SessionDto) -> Result<Self> {
        let created_at = DateTime::from_timestamp_millis(dto.created_at).ok_or_else(|| {
            invalid(format!(
                "session {} has bad createdAt {}",
                dto.id, dto.created_at
            ))
        })?;

        let mut seen = HashSet::new();
        let mut messages = Vec::with_capacity(dto.messages.len());
        for message in dto.messages {
            if !seen.insert(message.id) {
                return Err(invalid(format!(
                    "session {} repeats message id {}",
                    dto.id, message.id
                )));
            }
            messages.push(Message::try_from(message)?);
        }

        let id = dto.id;
        Session::restore(id.clone(), dto.title, created_at, messages).ok_or_else(|| {
            invalid(format!(
                "session {id} has no messages or a message id above {MAX_MESSAGE_ID}"
            ))
        })
    }
}

/// Converts a whole persisted collection, rejecting duplicate session ids.
pub fn sessions_from_dtos(dtos: Vec<SessionDto>) -> Result<Vec<Session>> {
    let mut seen = HashSet::new();
    dtos.into_iter()
        .map(|dto| {
            if !seen.insert(dto.id.clone()) {
                return Err(invalid(format!("duplicate session id {}", dto.id)));
            }
            Session::try_from(dto)
        })
        .collect()
}
