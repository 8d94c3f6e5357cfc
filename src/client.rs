//! HTTP client for the conversation backend.
//!
//! Wraps an [`HttpClient`] with the backend's endpoints, the configured
//! credentials and JSON decoding. The streaming send returns a lazy
//! [`EventStream`]: frames are read from the network only as the caller polls.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{classify_http_error, ClientResult, NetworkError, StreamError};
use crate::models::{
    ChatResponse, Conversation, ConversationSummary, QueryRequest, QueryResponse,
    SendMessageRequest,
};
use crate::sse::{decode_events, StreamEvent};
use crate::traits::{Headers, HttpClient, Response};

/// Events from one streaming send, in wire order.
pub type EventStream = Pin<Box<dyn Stream<Item = ClientResult<StreamEvent>> + Send>>;

pub const SEND_MESSAGE_PATH: &str = "conversations/send_message/";
pub const SEND_MESSAGE_STREAM_PATH: &str = "conversations/send_message_stream/";
pub const CONVERSATIONS_PATH: &str = "conversations/";
pub const QUERY_CONVERSATIONS_PATH: &str = "conversations/query_conversations/";

/// Client for the chat backend.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Debug)]
pub struct ChatClient<H: HttpClient = ReqwestHttpClient> {
    http: Arc<H>,
    config: ClientConfig,
}

impl<H: HttpClient> Clone for ChatClient<H> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            config: self.config.clone(),
        }
    }
}

impl ChatClient<ReqwestHttpClient> {
    /// Production client over reqwest, honoring `request_timeout`.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let http = match config.request_timeout {
            Some(timeout) => ReqwestHttpClient::with_timeout(timeout),
            None => ReqwestHttpClient::new(),
        }
        .map_err(|e| classify_http_error(e, &config.base_url))?;
        Ok(Self::with_http(http, config))
    }
}

impl<H: HttpClient> ChatClient<H> {
    pub fn with_http(http: H, config: ClientConfig) -> Self {
        Self {
            http: Arc::new(http),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn conversation_path(id: i64) -> String {
        format!("{}{}/", CONVERSATIONS_PATH, id)
    }

    /// Configured headers plus a fresh request id.
    fn request_headers(&self) -> (Headers, String) {
        let request_id = Uuid::new_v4().to_string();
        let mut headers = self.config.headers();
        headers.insert("X-Request-Id".to_string(), request_id.clone());
        (headers, request_id)
    }

    fn decode<T: DeserializeOwned>(response: Response, context: &str) -> ClientResult<T> {
        if !response.is_success() {
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: response.text(),
            }
            .into());
        }
        response.json().map_err(|e| {
            StreamError::InvalidJson {
                context: context.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, context: &str) -> ClientResult<T> {
        let url = self.config.endpoint(path);
        let (headers, request_id) = self.request_headers();
        let span = info_span!("request", op = context, %request_id);

        async {
            debug!(%url, "GET");
            let response = self
                .http
                .get(&url, &headers)
                .await
                .map_err(|e| classify_http_error(e, &url))?;
            debug!(status = response.status, "Response received");
            Self::decode(response, context)
        }
        .instrument(span)
        .await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &str,
        context: &str,
    ) -> ClientResult<T> {
        let url = self.config.endpoint(path);
        let (headers, request_id) = self.request_headers();
        let span = info_span!("request", op = context, %request_id);

        async {
            debug!(%url, "POST");
            let response = self
                .http
                .post(&url, body, &headers)
                .await
                .map_err(|e| classify_http_error(e, &url))?;
            debug!(status = response.status, "Response received");
            Self::decode(response, context)
        }
        .instrument(span)
        .await
    }

    fn send_body(content: &str, conversation_id: Option<i64>) -> String {
        let request = match conversation_id {
            Some(id) => SendMessageRequest::with_conversation(content, id),
            None => SendMessageRequest::new(content),
        };
        // Two plain fields; serialization cannot fail
        serde_json::to_string(&request).unwrap_or_default()
    }

    /// Send a message and wait for the whole reply.
    pub async fn send_message(
        &self,
        content: &str,
        conversation_id: Option<i64>,
    ) -> ClientResult<ChatResponse> {
        info!(?conversation_id, "Sending message");
        let body = Self::send_body(content, conversation_id);
        self.post_json(SEND_MESSAGE_PATH, &body, "send_message").await
    }

    /// Send a message and receive the reply as a stream of events.
    ///
    /// Fails before yielding anything if the server rejects the request.
    /// Read errors mid-stream surface as a single
    /// [`StreamError::ConnectionLost`] item, after which the stream ends.
    pub async fn stream_message(
        &self,
        content: &str,
        conversation_id: Option<i64>,
    ) -> ClientResult<EventStream> {
        let url = self.config.endpoint(SEND_MESSAGE_STREAM_PATH);
        let (headers, request_id) = self.request_headers();
        let body = Self::send_body(content, conversation_id);
        let span = info_span!("request", op = "stream_message", %request_id);

        let bytes = async {
            info!(?conversation_id, "Opening message stream");
            self.http
                .post_stream(&url, &body, &headers)
                .await
                .map_err(|e| classify_http_error(e, &url))
        }
        .instrument(span)
        .await?;

        let events = decode_events(bytes).map(|item| {
            item.map_err(|e| {
                StreamError::ConnectionLost {
                    message: e.to_string(),
                }
                .into()
            })
        });
        Ok(Box::pin(events))
    }

    /// Mark a conversation as ended. The server summarizes it and returns
    /// the updated record.
    pub async fn end_conversation(&self, conversation_id: i64) -> ClientResult<Conversation> {
        info!(conversation_id, "Ending conversation");
        let path = format!("{}end_conversation/", Self::conversation_path(conversation_id));
        self.post_json(&path, "{}", "end_conversation").await
    }

    pub async fn list_conversations(&self) -> ClientResult<Vec<ConversationSummary>> {
        self.get_json(CONVERSATIONS_PATH, "list_conversations").await
    }

    pub async fn get_conversation(&self, conversation_id: i64) -> ClientResult<Conversation> {
        self.get_json(&Self::conversation_path(conversation_id), "get_conversation")
            .await
    }

    /// Ask a question across past conversations.
    pub async fn query_conversations(&self, query: &QueryRequest) -> ClientResult<QueryResponse> {
        let body = serde_json::to_string(query).map_err(|e| StreamError::InvalidJson {
            context: "query_conversations".to_string(),
            message: e.to_string(),
        })?;
        self.post_json(QUERY_CONVERSATIONS_PATH, &body, "query_conversations")
            .await
    }
}
