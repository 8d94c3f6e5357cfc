use serde::{Deserialize, Serialize};

use super::conversation::Conversation;
use super::message::Message;

/// Request body shared by the streaming and non-streaming send endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendMessageRequest {
    /// The user's message text
    pub content: String,
    /// Conversation to continue - None asks the server to start a new one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
}

impl SendMessageRequest {
    /// Create a request that starts a new conversation
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            conversation_id: None,
        }
    }

    /// Create a request continuing an existing conversation
    pub fn with_conversation(content: impl Into<String>, conversation_id: i64) -> Self {
        Self {
            content: content.into(),
            conversation_id: Some(conversation_id),
        }
    }
}

/// Response from the non-streaming send endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub conversation: Conversation,
    pub user_message: Message,
    pub ai_message: Message,
}

/// Optional date window for conversation queries (`YYYY-MM-DD`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Request body for searching across past conversations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub topics: Vec<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            date_range: None,
            topics: Vec::new(),
        }
    }

    pub fn with_date_range(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.date_range = Some(DateRange { start, end });
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }
}

/// A message excerpt cited by a query answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupportingExcerpt {
    pub conversation: String,
    pub content: String,
    pub sender: String,
    #[serde(default)]
    pub similarity: f64,
    pub timestamp: String,
}

/// Answer to a [`QueryRequest`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub relevant_conversations: Vec<String>,
    #[serde(default)]
    pub supporting_excerpts: Vec<SupportingExcerpt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_omits_id() {
        let request = SendMessageRequest::new("Hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"content": "Hello"}));
    }

    #[test]
    fn test_existing_conversation_includes_id() {
        let request = SendMessageRequest::with_conversation("More", 12);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"content": "More", "conversation_id": 12})
        );
    }

    #[test]
    fn test_query_request_builder() {
        let request = QueryRequest::new("what did we decide?")
            .with_date_range(Some("2024-01-01".to_string()), None)
            .with_topics(vec!["travel".to_string()]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["date_range"], serde_json::json!({"start": "2024-01-01"}));
        assert_eq!(json["topics"], serde_json::json!(["travel"]));
    }

    #[test]
    fn test_query_request_minimal_body() {
        let json = serde_json::to_value(QueryRequest::new("x")).unwrap();
        assert_eq!(json, serde_json::json!({"query": "x"}));
    }
}
