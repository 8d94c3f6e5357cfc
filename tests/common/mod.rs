//! Shared fixtures for integration tests.
//!
//! Builders for backend JSON payloads and `data: ` framed stream bodies.

#![allow(dead_code)]

use serde_json::{json, Value};

/// Backend message record in conversation 7.
pub fn message_json(id: i64, sender: &str, content: &str) -> Value {
    message_in(7, id, sender, content)
}

/// Backend message record in the given conversation.
pub fn message_in(conversation_id: i64, id: i64, sender: &str, content: &str) -> Value {
    json!({
        "id": id,
        "conversation": conversation_id,
        "content": content,
        "sender": sender,
        "timestamp": "2024-05-01T10:00:00Z"
    })
}

/// Backend conversation record without messages.
pub fn conversation_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "status": "active",
        "start_time": "2024-05-01T10:00:00Z",
        "end_time": null,
        "summary": null,
        "sentiment": null,
        "key_topics": [],
        "action_items": [],
        "messages": []
    })
}

/// One stream frame, terminated by the blank separator line.
pub fn frame(event_type: &str, data: Value) -> String {
    format!(
        "data: {}\n\n",
        json!({ "type": event_type, "data": data })
    )
}

/// A complete happy-path stream body for a reply of `chunks`.
pub fn reply_stream(conversation_id: i64, user_text: &str, chunks: &[&str]) -> String {
    let mut body = String::new();
    body.push_str(&frame(
        "user_message",
        message_in(conversation_id, 100, "user", user_text),
    ));
    for chunk in chunks {
        body.push_str(&frame("ai_chunk", json!(chunk)));
    }
    body.push_str(&frame(
        "ai_message",
        message_in(conversation_id, 101, "ai", &chunks.concat()),
    ));
    body.push_str(&frame(
        "conversation",
        conversation_json(conversation_id, "Integration"),
    ));
    body.push_str(&frame("complete", Value::Null));
    body
}
