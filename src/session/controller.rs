//! Session controller
//!
//! Owns the [`SessionState`], runs sends against a [`ChatClient`] and folds
//! every event through the pure transitions. Each fold is published on a
//! `watch` channel so collaborators can render without touching the state.

use std::sync::Arc;

use chrono::Utc;
use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::state::SessionState;
use super::transition::{self, Effect, TransitionContext, TransitionResult};
use crate::adapters::ReqwestHttpClient;
use crate::client::ChatClient;
use crate::error::ClientError;
use crate::models::{Conversation, LocalIds};
use crate::traits::{ConversationListObserver, HttpClient, NoopObserver};

pub struct SessionController<H: HttpClient = ReqwestHttpClient> {
    client: ChatClient<H>,
    state: SessionState,
    tx: watch::Sender<SessionState>,
    observer: Arc<dyn ConversationListObserver>,
    local_ids: LocalIds,
}

impl<H: HttpClient> SessionController<H> {
    pub fn new(client: ChatClient<H>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self {
            client,
            state: SessionState::default(),
            tx,
            observer: Arc::new(NoopObserver),
            local_ids: LocalIds::new(),
        }
    }

    /// Set who hears about conversation list changes.
    pub fn with_observer(mut self, observer: impl ConversationListObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Receiver that sees a snapshot after every fold.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    pub fn client(&self) -> &ChatClient<H> {
        &self.client
    }

    fn context(&mut self) -> TransitionContext {
        TransitionContext {
            now: Utc::now(),
            local_id: self.local_ids.next_id(),
        }
    }

    fn apply(&mut self, result: TransitionResult) {
        self.state = result.new_state;
        self.tx.send_replace(self.state.clone());

        for effect in result.effects {
            match effect {
                Effect::NotifyConversationListChanged => {
                    debug!("Conversation list changed");
                    self.observer.conversation_list_changed();
                }
                Effect::Fail { reason } => {
                    error!(%reason, phase = "error", "Send failed, rolling back");
                    let ctx = self.context();
                    let rollback = transition::fail(&self.state, &reason, &ctx);
                    self.apply(rollback);
                }
            }
        }
    }

    fn raise(&mut self, err: ClientError) {
        warn!(
            error = %err,
            code = err.error_code(),
            category = %err.category(),
            "Request failed"
        );
        let result = transition::raise(&self.state, err.user_message());
        self.apply(result);
    }

    /// Send `text`, streaming the reply when `use_streaming` is set.
    ///
    /// Ignored while another send is in flight or when `text` is blank.
    /// Failures are absorbed into the state: see [`SessionState::last_error`].
    pub async fn send_message(&mut self, text: &str, use_streaming: bool) {
        let ctx = self.context();
        let started = match transition::begin_send(&self.state, text, &ctx) {
            Ok(result) => result,
            Err(reason) => {
                debug!(%reason, "Send ignored");
                return;
            }
        };
        self.apply(started);

        let conversation_id = self.state.conversation_id();
        if use_streaming {
            self.stream_reply(text, conversation_id).await;
        } else {
            self.fetch_reply(text, conversation_id).await;
        }
    }

    async fn stream_reply(&mut self, text: &str, conversation_id: Option<i64>) {
        let mut events = match self.client.stream_message(text, conversation_id).await {
            Ok(events) => events,
            Err(err) => return self.raise(err),
        };

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    debug!(event = event.event_type_name(), "Folding stream event");
                    let terminal = event.is_terminal();
                    let ctx = self.context();
                    let result = transition::transition(&self.state, event, &ctx);
                    self.apply(result);
                    if terminal {
                        return;
                    }
                }
                Err(err) => return self.raise(err),
            }
        }

        debug!("Stream ended without complete event");
        let ctx = self.context();
        let result = transition::finish_stream(&self.state, &ctx);
        self.apply(result);
    }

    async fn fetch_reply(&mut self, text: &str, conversation_id: Option<i64>) {
        match self.client.send_message(text, conversation_id).await {
            Ok(response) => {
                let result = transition::apply_chat_response(&self.state, response);
                self.apply(result);
            }
            Err(err) => self.raise(err),
        }
    }

    /// Ask the server to close the current conversation.
    ///
    /// State is only cleared once the server confirms.
    pub async fn end_conversation(&mut self) {
        let Some(id) = self.state.conversation_id() else {
            debug!("No conversation to end");
            return;
        };

        match self.client.end_conversation(id).await {
            Ok(ended) => {
                info!(conversation_id = id, summary = ?ended.summary, "Conversation ended");
                let result = transition::conversation_ended(&self.state);
                self.apply(result);
            }
            Err(err) => {
                warn!(conversation_id = id, error = %err, "Failed to end conversation");
                let result = transition::record_error(&self.state, err.user_message());
                self.apply(result);
            }
        }
    }

    /// Forget the current conversation. Never contacts the server.
    pub fn start_new_conversation(&mut self) {
        self.apply(transition::reset());
    }

    pub fn load_conversation(&mut self, conversation: Conversation) {
        self.apply(transition::load(conversation));
    }

    /// Fetch a conversation by id and load it.
    pub async fn open_conversation(&mut self, id: i64) {
        match self.client.get_conversation(id).await {
            Ok(conversation) => self.load_conversation(conversation),
            Err(err) => {
                warn!(conversation_id = id, error = %err, "Failed to open conversation");
                let result = transition::record_error(&self.state, err.user_message());
                self.apply(result);
            }
        }
    }

    /// Re-fetch the current conversation from the server.
    pub async fn refresh_conversation(&mut self) {
        match self.state.conversation_id() {
            Some(id) => self.open_conversation(id).await,
            None => debug!("No conversation to refresh"),
        }
    }
}
