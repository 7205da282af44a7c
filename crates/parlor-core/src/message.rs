//! The chat frame exchanged with clients.
//!
//! Every WebSocket frame in either direction is one JSON object:
//!
//! ```json
//! { "type": "chat", "content": "hi", "username": "alice" }
//! ```
//!
//! Inbound frames are lenient: `content` and `username` may be omitted, and
//! the bundled web client's `"message"` type is read as [`MessageKind::Chat`].
//! Whatever `username` a client supplies is replaced by the server with the
//! name the connection registered under.

use serde::{Deserialize, Serialize};

use crate::errors::{RelayError, Result};

/// Username stamped on join/leave notices.
pub const SYSTEM_USERNAME: &str = "System";

/// Message type discriminator (`type` on the wire).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A message typed by a user.
    #[serde(alias = "message")]
    Chat,
    /// A connection entered the room.
    Join,
    /// A connection left the room.
    Leave,
}

/// One chat frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message type.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Message body.
    #[serde(default)]
    pub content: String,
    /// Display name of the sender, or [`SYSTEM_USERNAME`] for notices.
    #[serde(default)]
    pub username: String,
}

impl ChatMessage {
    /// A chat message from `username`.
    pub fn chat(content: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Chat,
            content: content.into(),
            username: username.into(),
        }
    }

    /// System notice announcing that `username` connected.
    pub fn joined(username: &str) -> Self {
        Self {
            kind: MessageKind::Join,
            content: format!("{username} joined the chat"),
            username: SYSTEM_USERNAME.to_owned(),
        }
    }

    /// System notice announcing that `username` disconnected.
    pub fn left(username: &str) -> Self {
        Self {
            kind: MessageKind::Leave,
            content: format!("{username} left the chat"),
            username: SYSTEM_USERNAME.to_owned(),
        }
    }

    /// Replace the client-supplied username with the registered one.
    #[must_use]
    pub fn stamped(mut self, username: &str) -> Self {
        username.clone_into(&mut self.username);
        self
    }

    /// Whether this is a server-generated notice.
    pub fn is_system(&self) -> bool {
        matches!(self.kind, MessageKind::Join | MessageKind::Leave)
            && self.username == SYSTEM_USERNAME
    }

    /// Decode an inbound frame.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(RelayError::Decode)
    }

    /// Decode an inbound binary frame holding UTF-8 JSON.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(RelayError::Decode)
    }

    /// Encode for the wire.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(RelayError::Encode)
    }
}
