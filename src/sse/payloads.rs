//! Internal payload deserialization structs

use serde::Deserialize;

/// Envelope of every `data: ` frame: `{"type": ..., "data": ...}`.
///
/// Some server failure paths send `{"error": "..."}` without a type, so both
/// fields are optional here and resolved by the parser.
#[derive(Debug, Deserialize)]
pub(super) struct FramePayload {
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}
