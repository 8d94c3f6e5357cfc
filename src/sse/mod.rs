//! Chat stream decoding
//!
//! The streaming endpoint answers with newline-delimited frames:
//! - `data: {"type": "...", "data": ...}` - payload-bearing record
//! - Empty line - record separator
//! - Lines starting with `:` - keep-alive comments (ignored)
//!
//! # Module structure
//! - `decoder` - byte chunks to frames (FrameDecoder, frames, decode_events)
//! - `events` - event type definitions (StreamEvent, SseParseError)
//! - `parser` - frame to event parsing (parse_frame)
//! - `payloads` - internal payload deserialization structs

mod decoder;
mod events;
mod parser;
mod payloads;

#[cfg(test)]
mod proptests;

pub use decoder::{decode_events, frames, FrameDecoder};
pub use events::{SseParseError, StreamEvent};
pub use parser::{parse_frame, DATA_PREFIX};
