//! Pure session transitions
//!
//! Every function here takes the current state by reference and returns the
//! next one together with the effects the controller must carry out. Nothing
//! here performs I/O or reads the clock; the [`TransitionContext`] supplies
//! time and fresh local ids.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use super::state::{PendingSend, Phase, SessionState};
use crate::models::{ChatResponse, Conversation, Message, Sender, APOLOGY_TEXT};
use crate::sse::StreamEvent;

/// Inputs a transition may need that are not part of the state.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext {
    pub now: DateTime<Utc>,
    /// An unused local message id, for any message the transition creates
    pub local_id: i64,
}

/// Outward actions requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The list of all conversations is stale
    NotifyConversationListChanged,
    /// The send failed; roll back with [`fail`]
    Fail { reason: String },
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons a send is not started. Callers treat these as no-ops.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("A send is already in progress (phase: {})", .0.as_str())]
    Busy(Phase),
    #[error("Message is blank")]
    BlankMessage,
}

/// Start a send: append the optimistic user message and record how to undo it.
pub fn begin_send(
    state: &SessionState,
    text: &str,
    ctx: &TransitionContext,
) -> Result<TransitionResult, TransitionError> {
    if !state.phase.is_idle() {
        return Err(TransitionError::Busy(state.phase));
    }
    if text.trim().is_empty() {
        return Err(TransitionError::BlankMessage);
    }

    let mut next = state.clone();
    next.messages
        .push(Message::new(ctx.local_id, Sender::User, text, ctx.now));
    next.pending = Some(PendingSend {
        user_message_id: ctx.local_id,
        started_at: ctx.now,
    });
    next.accumulated_text.clear();
    next.last_error = None;
    next.phase = Phase::Sending;
    Ok(TransitionResult::new(next))
}

/// Fold one stream event.
///
/// Events arriving while no send is in flight are ignored.
pub fn transition(
    state: &SessionState,
    event: StreamEvent,
    ctx: &TransitionContext,
) -> TransitionResult {
    if !state.phase.is_busy() {
        debug!(
            event = event.event_type_name(),
            phase = state.phase.as_str(),
            "Ignoring stream event outside a send"
        );
        return TransitionResult::new(state.clone());
    }

    let mut next = state.clone();
    next.phase = Phase::Streaming;

    match event {
        StreamEvent::UserMessageConfirmed(message) => {
            adopt_conversation(&mut next, &message);
            let optimistic_id = next.pending.map(|p| p.user_message_id);
            match optimistic_id.and_then(|id| next.position_of(id)) {
                Some(index) => {
                    if let Some(pending) = next.pending.as_mut() {
                        pending.user_message_id = message.id;
                    }
                    next.messages[index] = message;
                }
                None => debug!(id = message.id, "No optimistic message to confirm"),
            }
            TransitionResult::new(next)
        }

        StreamEvent::AssistantChunk(text) => {
            next.accumulated_text.push_str(&text);
            let content = next.accumulated_text.clone();
            match next.messages.iter().position(|m| m.is_sentinel()) {
                Some(index) => next.messages[index].content = content,
                None => next.messages.push(Message::sentinel(content, ctx.now)),
            }
            TransitionResult::new(next)
        }

        StreamEvent::AssistantMessageConfirmed(message) => {
            adopt_conversation(&mut next, &message);
            let slot = next
                .messages
                .iter()
                .position(|m| m.is_sentinel())
                .or_else(|| next.position_of(message.id));
            match slot {
                Some(index) => next.messages[index] = message,
                None => next.messages.push(message),
            }
            next.accumulated_text.clear();
            TransitionResult::new(next)
        }

        StreamEvent::ConversationUpdated(conversation) => {
            match (state.conversation_id(), conversation.id) {
                (Some(current), incoming) if incoming != Some(current) => {
                    warn!(
                        current,
                        ?incoming,
                        "Ignoring update for a different conversation"
                    );
                }
                _ => next.conversation = Some(conversation),
            }
            TransitionResult::new(next)
        }

        StreamEvent::StreamComplete => {
            finish_stream(&next, ctx).with_effect(Effect::NotifyConversationListChanged)
        }

        StreamEvent::StreamError(reason) => raise(&next, reason),

        StreamEvent::Unrecognized { event_type, .. } => {
            debug!(%event_type, "Ignoring unrecognized stream event");
            TransitionResult::new(next)
        }
    }
}

/// Learn the conversation id from a confirmed message.
///
/// Some backends never send a `conversation` event; the id on the persisted
/// message is then the only place a new conversation's id shows up.
fn adopt_conversation(state: &mut SessionState, message: &Message) {
    let Some(reported) = message.conversation else {
        return;
    };
    match state.conversation_id() {
        None => {
            debug!(conversation_id = reported, "Conversation id taken from confirmed message");
            state.conversation = Some(Conversation::started(reported, message.timestamp));
        }
        Some(current) if current != reported => {
            warn!(current, reported, "Confirmed message belongs to a different conversation");
        }
        Some(_) => {}
    }
}

/// End of the exchange: commit any streamed text and return to idle.
pub fn finish_stream(state: &SessionState, ctx: &TransitionContext) -> TransitionResult {
    if !state.phase.is_busy() {
        return TransitionResult::new(state.clone());
    }

    let mut next = state.clone();
    let sentinel = next.messages.iter().position(|m| m.is_sentinel());
    let text = std::mem::take(&mut next.accumulated_text);

    match (sentinel, text.is_empty()) {
        (Some(index), false) => {
            let started = next.messages[index].timestamp;
            next.messages[index] = Message::new(ctx.local_id, Sender::Assistant, text, started);
        }
        (Some(index), true) => {
            next.messages.remove(index);
        }
        (None, false) => {
            next.messages
                .push(Message::new(ctx.local_id, Sender::Assistant, text, ctx.now));
        }
        (None, true) => {}
    }

    next.pending = None;
    next.phase = Phase::Idle;
    TransitionResult::new(next)
}

/// Enter the error phase. The returned [`Effect::Fail`] asks the controller to
/// roll back.
pub fn raise(state: &SessionState, reason: impl Into<String>) -> TransitionResult {
    let reason = reason.into();
    let mut next = state.clone();
    next.phase = Phase::Error;
    next.last_error = Some(reason.clone());
    TransitionResult::new(next).with_effect(Effect::Fail { reason })
}

/// Undo the optimistic update of the failed send, substitute the apology and
/// leave the session usable.
pub fn fail(state: &SessionState, reason: &str, ctx: &TransitionContext) -> TransitionResult {
    let mut next = state.clone();
    let optimistic_id = next.pending.take().map(|p| p.user_message_id);
    let timestamp = ctx.now;

    next.messages
        .retain(|m| !m.is_sentinel() && Some(m.id) != optimistic_id);
    next.messages
        .push(Message::new(ctx.local_id, Sender::Assistant, APOLOGY_TEXT, timestamp));
    next.accumulated_text.clear();
    next.last_error = Some(reason.to_string());
    next.phase = Phase::Idle;
    TransitionResult::new(next)
}

/// Take the result of a non-streaming send.
///
/// The returned conversation replaces the local one wholesale. If it carries no
/// messages, the two confirmed messages stand in for the optimistic one.
pub fn apply_chat_response(state: &SessionState, response: ChatResponse) -> TransitionResult {
    let mut next = state.clone();
    let ChatResponse {
        conversation,
        user_message,
        ai_message,
    } = response;

    if conversation.messages.is_empty() {
        let optimistic_id = next.pending.map(|p| p.user_message_id);
        next.messages
            .retain(|m| Some(m.id) != optimistic_id && !m.is_sentinel());
        next.messages.push(user_message);
        next.messages.push(ai_message);
    } else {
        next.messages = conversation.messages.clone();
    }

    next.conversation = Some(conversation);
    next.accumulated_text.clear();
    next.pending = None;
    next.phase = Phase::Idle;
    TransitionResult::new(next).with_effect(Effect::NotifyConversationListChanged)
}

/// The server closed the conversation.
pub fn conversation_ended(state: &SessionState) -> TransitionResult {
    let mut next = state.clone();
    next.conversation = None;
    next.messages.clear();
    TransitionResult::new(next).with_effect(Effect::NotifyConversationListChanged)
}

/// Remember a failure that needs no rollback.
pub fn record_error(state: &SessionState, reason: impl Into<String>) -> TransitionResult {
    let mut next = state.clone();
    next.last_error = Some(reason.into());
    TransitionResult::new(next)
}

/// Empty, idle, error-free state.
pub fn reset() -> TransitionResult {
    TransitionResult::new(SessionState::default())
}

/// Show a previously stored conversation.
pub fn load(conversation: Conversation) -> TransitionResult {
    TransitionResult::new(SessionState {
        messages: conversation.messages.clone(),
        conversation: Some(conversation),
        ..SessionState::default()
    })
}
