//! Mock HTTP client for testing.
//!
//! Scripted responses per URL, including chunked streaming bodies, with every
//! request recorded for later assertions.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    pub url: String,
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Buffered response, any status
    Success(Response),
    /// Fail before any response arrives
    Error(HttpError),
    /// Streaming body delivered as exactly these chunks
    Stream(Vec<Bytes>),
    /// Streaming body that fails after delivering these chunks
    StreamThenError(Vec<Bytes>, HttpError),
}

impl MockResponse {
    /// JSON body with the given status.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        MockResponse::Success(Response::new(status, value.to_string()))
    }

    /// Streaming body split into the given text chunks.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(
            chunks
                .into_iter()
                .map(|c| Bytes::from(c.into()))
                .collect(),
        )
    }
}

/// Mock HTTP client for testing.
///
/// Responses are queued per URL. Each request takes the next queued response;
/// the last one is reused once the queue is down to a single entry.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every queued response for `url` with `response`.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), VecDeque::from([response]));
    }

    /// Queue an additional response for `url`.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses)
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// All recorded requests, oldest first.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        lock(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn next_response(&self, url: &str) -> Result<MockResponse, HttpError> {
        let mut responses = lock(&self.responses);
        let queue = responses
            .get_mut(url)
            .ok_or_else(|| HttpError::Other(format!("No mock response for URL: {}", url)))?;
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.ok_or_else(|| HttpError::Other(format!("No mock response for URL: {}", url)))
    }

    fn buffered(&self, url: &str) -> Result<Response, HttpError> {
        match self.next_response(url)? {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
            MockResponse::Stream(_) | MockResponse::StreamThenError(..) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.buffered(url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.buffered(url)
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));

        match self.next_response(url)? {
            MockResponse::Stream(chunks) => {
                Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
            }
            MockResponse::StreamThenError(chunks, err) => {
                let items = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(err)));
                Ok(Box::pin(futures::stream::iter(items)))
            }
            // Mirrors the production client, which rejects non-2xx before streaming
            MockResponse::Success(response) if !response.is_success() => {
                Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text(),
                })
            }
            MockResponse::Success(response) => {
                Ok(Box::pin(futures::stream::iter(vec![Ok(response.body)])))
            }
            MockResponse::Error(err) => Err(err),
        }
    }
}
