use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deserialize_timestamp;

/// Id carried by the in-progress assistant message while chunks are streaming.
pub const SENTINEL_MESSAGE_ID: i64 = -1;

/// Content of the assistant message substituted for a failed send.
pub const APOLOGY_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Author of a message.
///
/// The backend spells the assistant as `"ai"`; `"assistant"` is accepted too.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

/// A single chat message, either server-confirmed or locally generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Server id (positive), sentinel (`-1`), or a local id (below `-1`)
    pub id: i64,
    pub content: String,
    pub sender: Sender,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Owning conversation as reported by the server; `None` for local messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<i64>,
}

impl Message {
    /// Create a message with an explicit id.
    pub fn new(id: i64, sender: Sender, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            sender,
            timestamp,
            conversation: None,
        }
    }

    /// Create the in-progress assistant placeholder.
    pub fn sentinel(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(SENTINEL_MESSAGE_ID, Sender::Assistant, content, timestamp)
    }

    /// Whether this is the in-progress assistant placeholder.
    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_MESSAGE_ID
    }

    /// Whether the id was generated client-side (never confirmed by the server).
    pub fn is_local(&self) -> bool {
        self.id < SENTINEL_MESSAGE_ID
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Allocator for client-side message ids.
///
/// Ids start at `-2` and decrease, so they never collide with server ids
/// (positive) or with [`SENTINEL_MESSAGE_ID`].
#[derive(Debug, Clone)]
pub struct LocalIds {
    next: i64,
}

impl LocalIds {
    pub fn new() -> Self {
        Self {
            next: SENTINEL_MESSAGE_ID - 1,
        }
    }

    /// Take the next unused local id.
    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next = self.next.saturating_sub(1);
        id
    }
}

impl Default for LocalIds {
    fn default() -> Self {
        Self::new()
    }
}
