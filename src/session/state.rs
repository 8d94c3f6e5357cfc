//! Session state types

use chrono::{DateTime, Utc};

use crate::models::{Conversation, Message};

/// Where the session is in the send lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Optimistic user message shown, waiting for the first event or reply
    Sending,
    /// At least one stream event has been folded
    Streaming,
    /// A failure was raised; rollback follows immediately
    Error,
}

impl Phase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    /// Whether a send is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Sending | Phase::Streaming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Sending => "sending",
            Phase::Streaming => "streaming",
            Phase::Error => "error",
        }
    }
}

/// Compensating record for the send in flight.
///
/// Captured when the send begins and consumed by the failure path to undo the
/// optimistic update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSend {
    /// Id of the user message to remove on failure. Follows the message when
    /// the server confirms it.
    pub user_message_id: i64,
    pub started_at: DateTime<Utc>,
}

/// Everything a collaborator needs to render the current conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub conversation: Option<Conversation>,
    pub messages: Vec<Message>,
    /// Assistant text streamed since the last confirmed assistant message
    pub accumulated_text: String,
    pub phase: Phase,
    pub last_error: Option<String>,
    pub(crate) pending: Option<PendingSend>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation.as_ref().and_then(|c| c.id)
    }

    /// The in-progress assistant message, if any.
    pub fn sentinel(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_sentinel())
    }

    pub fn sentinel_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_sentinel()).count()
    }

    pub fn pending(&self) -> Option<&PendingSend> {
        self.pending.as_ref()
    }

    pub(crate) fn position_of(&self, id: i64) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;

    #[test]
    fn test_default_is_empty_idle() {
        let state = SessionState::new();
        assert!(state.phase.is_idle());
        assert!(state.messages.is_empty());
        assert!(state.conversation_id().is_none());
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_busy_phases() {
        assert!(Phase::Sending.is_busy());
        assert!(Phase::Streaming.is_busy());
        assert!(!Phase::Idle.is_busy());
        assert!(!Phase::Error.is_busy());
    }

    #[test]
    fn test_sentinel_lookup() {
        let now = Utc::now();
        let state = SessionState {
            messages: vec![
                Message::new(-2, Sender::User, "hi", now),
                Message::sentinel("Hel", now),
            ],
            ..Default::default()
        };
        assert_eq!(state.sentinel().map(|m| m.content.as_str()), Some("Hel"));
        assert_eq!(state.sentinel_count(), 1);
        assert_eq!(state.position_of(-2), Some(0));
        assert_eq!(state.position_of(99), None);
    }
}
