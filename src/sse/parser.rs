//! Frame to event parsing
//!
//! Only frames starting with the literal `data: ` prefix carry payloads. All
//! other frames (blank separators, `: keep-alive` comments, `event:` lines)
//! are transport framing and yield no event.

use serde::de::DeserializeOwned;

use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::FramePayload;

/// Prefix marking a payload-bearing frame.
pub const DATA_PREFIX: &str = "data: ";

/// Reason used when the server sends an `error` event without a message.
const UNSPECIFIED_STREAM_ERROR: &str = "The server reported an error";

/// Parse one frame into a stream event.
///
/// Returns:
/// - `Ok(Some(event))` - a payload-bearing frame was parsed
/// - `Ok(None)` - the frame is not a `data: ` record and carries nothing
/// - `Err(error)` - the payload is malformed; callers drop the frame and continue
pub fn parse_frame(frame: &str) -> Result<Option<StreamEvent>, SseParseError> {
    let Some(body) = frame.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };

    let payload: FramePayload =
        serde_json::from_str(body).map_err(|e| SseParseError::InvalidJson {
            reason: e.to_string(),
        })?;

    let event_type = match payload.event_type {
        Some(event_type) => event_type,
        // Untyped `{"error": "..."}` is how the server reports lookup failures
        None => {
            return match payload.error {
                Some(reason) => Ok(Some(StreamEvent::StreamError(reason))),
                None => Err(SseParseError::MissingType),
            };
        }
    };

    let event = match event_type.as_str() {
        "user_message" => StreamEvent::UserMessageConfirmed(decode_data(&event_type, payload.data)?),
        "ai_chunk" => StreamEvent::AssistantChunk(decode_data(&event_type, payload.data)?),
        "ai_message" => {
            StreamEvent::AssistantMessageConfirmed(decode_data(&event_type, payload.data)?)
        }
        "conversation" => StreamEvent::ConversationUpdated(decode_data(&event_type, payload.data)?),
        "complete" => StreamEvent::StreamComplete,
        "error" => StreamEvent::StreamError(error_reason(payload.data)),
        _ => StreamEvent::Unrecognized {
            event_type,
            raw: body.to_string(),
        },
    };

    Ok(Some(event))
}

fn decode_data<T: DeserializeOwned>(
    event_type: &str,
    data: serde_json::Value,
) -> Result<T, SseParseError> {
    serde_json::from_value(data).map_err(|e| SseParseError::InvalidData {
        event_type: event_type.to_string(),
        reason: e.to_string(),
    })
}

// An error event must never be lost to a shape mismatch, so any data is accepted.
fn error_reason(data: serde_json::Value) -> String {
    match data {
        serde_json::Value::String(reason) => reason,
        serde_json::Value::Null => UNSPECIFIED_STREAM_ERROR.to_string(),
        other => other.to_string(),
    }
}
