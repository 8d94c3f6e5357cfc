//! Stream event types
//!
//! One [`StreamEvent`] is produced per payload-bearing frame of the chat
//! stream. The set of variants is closed; anything the client does not know
//! about arrives as [`StreamEvent::Unrecognized`].

use thiserror::Error;

use crate::models::{Conversation, Message};

/// Typed events from the chat streaming endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `user_message` - the server persisted the user's message
    UserMessageConfirmed(Message),
    /// `ai_chunk` - a fragment of the assistant's reply
    AssistantChunk(String),
    /// `ai_message` - the assistant's reply was persisted
    AssistantMessageConfirmed(Message),
    /// `conversation` - authoritative conversation metadata
    ConversationUpdated(Conversation),
    /// `complete` - the server finished the exchange
    StreamComplete,
    /// `error` - the server failed the request
    StreamError(String),
    /// Any other `type` value
    Unrecognized {
        event_type: String,
        raw: String,
    },
}

impl StreamEvent {
    /// Returns the wire `type` name for logging.
    pub fn event_type_name(&self) -> &str {
        match self {
            StreamEvent::UserMessageConfirmed(_) => "user_message",
            StreamEvent::AssistantChunk(_) => "ai_chunk",
            StreamEvent::AssistantMessageConfirmed(_) => "ai_message",
            StreamEvent::ConversationUpdated(_) => "conversation",
            StreamEvent::StreamComplete => "complete",
            StreamEvent::StreamError(_) => "error",
            StreamEvent::Unrecognized { event_type, .. } => event_type,
        }
    }

    /// Whether this event ends the exchange.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::StreamComplete | StreamEvent::StreamError(_))
    }
}

/// Errors that can occur while parsing a single frame.
///
/// These never abort a stream; the offending frame is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SseParseError {
    /// The text after `data: ` is not a JSON object
    #[error("Invalid JSON in frame: {reason}")]
    InvalidJson { reason: String },

    /// The payload has a known type but its `data` has the wrong shape
    #[error("Invalid data for event '{event_type}': {reason}")]
    InvalidData { event_type: String, reason: String },

    /// The payload has no `type` discriminant
    #[error("Frame payload has no type field")]
    MissingType,
}
