//! Outward notification seam for the conversation list.
//!
//! The list of all conversations lives outside the session. The session only
//! signals that it is stale: after a completed stream, a non-streaming send,
//! or a successful end.

/// Receiver of "the conversation list should be refreshed" signals.
pub trait ConversationListObserver: Send + Sync {
    fn conversation_list_changed(&self);
}

impl<F> ConversationListObserver for F
where
    F: Fn() + Send + Sync,
{
    fn conversation_list_changed(&self) {
        self()
    }
}

/// Observer that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ConversationListObserver for NoopObserver {
    fn conversation_list_changed(&self) {}
}
