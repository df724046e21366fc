use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::color::Color;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: String,
    pub sender: Option<String>,
    pub content: String,
    pub color: Option<Color>,
    pub background: Option<Color>,
    pub timestamp: DateTime<Utc>,
    pub message_type: ChatMessageType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatMessageType {
    Public,  // room chat from a player
    Faction, // private faction channel
    Dead,    // graveyard chat
    Private, // direct notice to one player (night results etc.)
    System,  // announcements
}

impl ChatMessage {
    pub fn new(
        sender: Option<String>,
        content: impl Into<String>,
        message_type: ChatMessageType,
    ) -> Self {
        ChatMessage {
            message_id: uuid::Uuid::new_v4().to_string(),
            sender,
            content: content.into(),
            color: None,
            background: None,
            timestamp: Utc::now(),
            message_type,
        }
    }

    pub fn from_player(username: &str, content: impl Into<String>, color: Color) -> Self {
        ChatMessage::new(Some(username.to_string()), content, ChatMessageType::Public)
            .with_color(color)
    }

    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::new(None, content, ChatMessageType::System)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_type(mut self, message_type: ChatMessageType) -> Self {
        self.message_type = message_type;
        self
    }
}
