use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;
use super::{deserialize_optional_timestamp, deserialize_timestamp};

/// Lifecycle status of a conversation on the server.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Active,
    Ended,
}

/// Full conversation record as returned by the detail endpoints and the
/// `conversation` stream event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    /// Assigned by the server on the first message; immutable afterwards
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: ConversationStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    /// Generated by the server when the conversation is ended
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// An active conversation known only by its id.
    ///
    /// Stands in until the server sends the full record.
    pub fn started(id: i64, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Some(id),
            title: String::new(),
            status: ConversationStatus::Active,
            start_time,
            end_time: None,
            summary: None,
            sentiment: None,
            key_topics: Vec::new(),
            action_items: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn is_ended(&self) -> bool {
        self.status == ConversationStatus::Ended
    }

    /// Title for display, falling back to a placeholder for untitled conversations.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "New conversation"
        } else {
            &self.title
        }
    }
}

/// Row shape returned by the conversation list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: ConversationStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub last_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;

    #[test]
    fn test_deserialize_detail() {
        let json = r#"{
            "id": 3,
            "title": "Trip planning",
            "user": 1,
            "status": "active",
            "start_time": "2024-03-01T10:00:00Z",
            "end_time": null,
            "summary": null,
            "sentiment": null,
            "key_topics": [],
            "action_items": [],
            "messages": [
                {"id": 10, "content": "Hi", "sender": "user", "timestamp": "2024-03-01T10:00:01Z", "conversation": 3},
                {"id": 11, "content": "Hello!", "sender": "ai", "timestamp": "2024-03-01T10:00:02Z", "conversation": 3}
            ],
            "analysis": null
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.id, Some(3));
        assert_eq!(conv.status, ConversationStatus::Active);
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[1].sender, Sender::Assistant);
        assert!(!conv.is_ended());
    }

    #[test]
    fn test_deserialize_minimal() {
        // Stream events may omit messages and list fields entirely
        let json = r#"{"id": 5, "title": "", "status": "ended", "start_time": "2024-03-01T10:00:00Z"}"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert!(conv.messages.is_empty());
        assert!(conv.key_topics.is_empty());
        assert!(conv.is_ended());
        assert_eq!(conv.display_title(), "New conversation");
    }

    #[test]
    fn test_deserialize_timestamps_without_offset() {
        let json = r#"{
            "id": 4,
            "title": "Naive",
            "status": "ended",
            "start_time": "2024-03-01T10:00:00",
            "end_time": "2024-03-01T11:30:00.250000"
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.start_time.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(
            conv.end_time.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-03-01T11:30:00.250+00:00")
        );
    }

    #[test]
    fn test_started_placeholder() {
        let now = Utc::now();
        let conv = Conversation::started(12, now);
        assert_eq!(conv.id, Some(12));
        assert_eq!(conv.start_time, now);
        assert!(!conv.is_ended());
        assert_eq!(conv.display_title(), "New conversation");
    }

    #[test]
    fn test_deserialize_summary_row() {
        let json = r#"{
            "id": 9,
            "title": "Recipes",
            "status": "ended",
            "start_time": "2024-03-01T10:00:00Z",
            "end_time": "2024-03-01T11:00:00Z",
            "summary": "Talked about soup",
            "message_count": 6,
            "last_message": "Enjoy!"
        }"#;
        let row: ConversationSummary = serde_json::from_str(json).unwrap();
        assert_eq!(row.id, 9);
        assert_eq!(row.message_count, 6);
        assert_eq!(row.last_message.as_deref(), Some("Enjoy!"));
    }
}
