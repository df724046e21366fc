use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::chat::{ChatMessage, ChatMessageType};
use super::color::Color;

/// Everything a session can push to a connected client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum ServerMessage {
    Chat(ChatMessage),
    Header { content: String, color: Option<Color> },
    LeftPanel { entries: Vec<PanelEntry> },
    RightPanel { entries: Vec<PanelEntry> },
    SetTime { remaining_ms: u64, warn_ms: u64 },
    Sound { kind: Sound },
    Event(GameEvent),
    Kicked { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Role {
        name: String,
        alignment: String,
        description: String,
    },
    Hang { username: String },
    ResetGallows,
    FinalVerdict { guilty: usize, innocent: usize },
    EndVerdict,
    MarkAsDead { username: String },
    LineThroughPlayer { username: String },
    CancelVoteEffect,
    SelectUser { username: String },
    CanVote,
    CannotVote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    Join,
    Leave,
    Start,
    Night,
    Day,
    Death,
    Vote,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelEntry {
    pub text: String,
    pub color: Option<Color>,
    pub struck: bool,
}

impl PanelEntry {
    pub fn new(text: impl Into<String>, color: Option<Color>) -> Self {
        Self {
            text: text.into(),
            color,
            struck: false,
        }
    }

    pub fn struck(mut self, struck: bool) -> Self {
        self.struck = struck;
        self
    }
}

/// Handle to a connected client. Cloning is cheap; every clone writes to the
/// same outbound queue, so sessions, rooms and players can all hold one.
#[derive(Debug, Clone)]
pub struct User {
    id: Uuid,
    username: String,
    admin: bool,
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        admin: bool,
        outbox: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            admin,
            outbox,
        }
    }

    /// Creates a user together with the receiving end of its queue.
    pub fn channel(
        username: impl Into<String>,
        admin: bool,
    ) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(username, admin, tx), rx)
    }

    /// Same identity with nowhere to deliver to. Stands in for a player whose
    /// connection is gone so nothing reaches their next connection by accident.
    pub fn detached(&self) -> Self {
        let (outbox, _) = mpsc::unbounded_channel();
        Self {
            id: self.id,
            username: self.username.clone(),
            admin: self.admin,
            outbox,
        }
    }

    /// Same connection under another spelling of the name.
    pub fn renamed(&self, username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..self.clone()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn push(&self, message: ServerMessage) {
        if self.outbox.send(message).is_err() {
            log::trace!("dropping message for closed connection of {}", self.username);
        }
    }

    pub fn send(&self, text: impl Into<String>) {
        self.push(ServerMessage::Chat(ChatMessage::system(text)));
    }

    pub fn send_colored(&self, text: impl Into<String>, color: Color, background: Option<Color>) {
        let mut message = ChatMessage::system(text).with_color(color);
        message.background = background;
        self.push(ServerMessage::Chat(message));
    }

    /// A private notice addressed to this user alone.
    pub fn notify(&self, text: impl Into<String>) {
        let message = ChatMessage::new(None, text, ChatMessageType::Private).with_color(Color::Info);
        self.push(ServerMessage::Chat(message));
    }

    pub fn send_chat(&self, message: ChatMessage) {
        self.push(ServerMessage::Chat(message));
    }

    pub fn header_send(&self, content: impl Into<String>, color: Option<Color>) {
        self.push(ServerMessage::Header {
            content: content.into(),
            color,
        });
    }

    pub fn left_send(&self, entries: Vec<PanelEntry>) {
        self.push(ServerMessage::LeftPanel { entries });
    }

    pub fn right_send(&self, entries: Vec<PanelEntry>) {
        self.push(ServerMessage::RightPanel { entries });
    }

    pub fn set_time(&self, remaining: Duration, warn: Duration) {
        self.push(ServerMessage::SetTime {
            remaining_ms: remaining.as_millis() as u64,
            warn_ms: warn.as_millis() as u64,
        });
    }

    pub fn sound(&self, kind: Sound) {
        self.push(ServerMessage::Sound { kind });
    }

    pub fn emit(&self, event: GameEvent) {
        self.push(ServerMessage::Event(event));
    }

    pub fn kicked(&self, reason: impl Into<String>) {
        self.push(ServerMessage::Kicked {
            reason: reason.into(),
        });
    }
}
