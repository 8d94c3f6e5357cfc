//! Byte stream to frame decoding
//!
//! The response body arrives in chunks that do not line up with frame
//! boundaries. [`FrameDecoder`] keeps the unfinished tail between chunks and
//! emits every complete newline-terminated line in arrival order.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, Stream};
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::sse::events::StreamEvent;
use crate::sse::parser::{parse_frame, DATA_PREFIX};

/// Longest frame excerpt included in log lines.
const LOG_PREVIEW_CHARS: usize = 120;

/// Incremental newline-delimited frame decoder.
///
/// The pending fragment is kept as raw bytes so a multi-byte UTF-8 sequence
/// split across two reads is reassembled before decoding.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes received after the last newline. Never contains `\n`.
    pending: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut frames = Vec::new();
        let mut search_from = self.pending.len();
        let mut start = 0;
        self.pending.extend_from_slice(chunk);

        while let Some(offset) = self.pending[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + offset;
            frames.push(decode_line(&self.pending[start..end]));
            start = end + 1;
            search_from = start;
        }

        self.pending.drain(..start);
        frames
    }

    /// Flush the decoder at end of stream.
    ///
    /// The leftover fragment is only a frame if it carries the `data: ` prefix;
    /// anything else is an incomplete framing line and is discarded.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = decode_line(&std::mem::take(&mut self.pending));
        if line.starts_with(DATA_PREFIX) {
            Some(line)
        } else {
            debug!(fragment = %preview(&line), "Discarding unterminated non-data fragment");
            None
        }
    }

    /// Number of buffered bytes not yet part of a complete frame.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn preview(text: &str) -> String {
    if text.chars().count() <= LOG_PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

struct FrameState<S> {
    bytes: S,
    decoder: FrameDecoder,
    ready: VecDeque<String>,
    done: bool,
}

/// Turn a chunked byte stream into a lazy stream of frames.
///
/// A read error is yielded once and ends the stream.
pub fn frames<S, E>(bytes: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    let state = FrameState {
        bytes,
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(frame) = state.ready.pop_front() {
                return Some((Ok(frame), state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let completed = state.decoder.push(&chunk);
                    state.ready.extend(completed);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    if let Some(frame) = state.decoder.finish() {
                        state.ready.push_back(frame);
                    }
                }
            }
        }
    })
}

/// Decode a chunked byte stream all the way to typed events.
///
/// Malformed frames are logged and dropped; later frames are still decoded.
pub fn decode_events<S, E>(bytes: S) -> impl Stream<Item = Result<StreamEvent, E>>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    frames(bytes).filter_map(|frame| async move {
        match frame {
            Err(e) => Some(Err(e)),
            Ok(frame) => match parse_frame(&frame) {
                Ok(Some(event)) => Some(Ok(event)),
                Ok(None) => None,
                Err(err) => {
                    warn!(error = %err, frame = %preview(&frame), "Dropping malformed stream frame");
                    None
                }
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&str]) -> Vec<Result<Bytes, std::io::Error>> {
        parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect()
    }

    #[test]
    fn test_push_complete_lines() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"data: a\n\ndata: b\n");
        assert_eq!(frames, vec!["data: a", "", "data: b"]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_push_retains_partial_line() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: hel").is_empty());
        assert_eq!(decoder.pending_len(), 9);
        assert_eq!(decoder.push(b"lo\n"), vec!["data: hello"]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_push_strips_carriage_return() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: x\r").is_empty());
        assert_eq!(decoder.push(b"\n"), vec!["data: x"]);
    }

    #[test]
    fn test_split_multibyte_character() {
        let text = "data: caf\u{e9} \u{1f600}\n";
        let bytes = text.as_bytes();
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        // Feed one byte at a time so every multi-byte sequence is split
        for byte in bytes {
            frames.extend(decoder.push(std::slice::from_ref(byte)));
        }
        assert_eq!(frames, vec!["data: caf\u{e9} \u{1f600}"]);
    }

    #[test]
    fn test_finish_emits_trailing_data_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push(br#"data: {"type":"complete"}"#);
        assert_eq!(
            decoder.finish(),
            Some(r#"data: {"type":"complete"}"#.to_string())
        );
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_finish_discards_non_data_fragment() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b": keep-al");
        assert_eq!(decoder.finish(), None);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(500);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), LOG_PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn test_frames_across_chunks() {
        let input = futures::stream::iter(chunks(&["data: one\nda", "ta: two\n", "data: three"]));
        let frames: Vec<String> = frames(input)
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(frames, vec!["data: one", "data: two", "data: three"]);
    }

    #[tokio::test]
    async fn test_frames_yields_read_error_and_stops() {
        let input = futures::stream::iter(vec![
            Ok(Bytes::from("data: one\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from("data: never\n")),
        ]);
        let items: Vec<Result<String, std::io::Error>> = frames(input).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "data: one");
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_decode_events_skips_framing_and_malformed() {
        let input = futures::stream::iter(chunks(&[
            ": connected\n\n",
            "data: {\"type\":\"ai_chunk\",\"data\":\"Hel\"}\n\n",
            "data: {broken\n\n",
            "data: {\"type\":\"ai_chunk\",\"data\":\"lo\"}\n\n",
            "data: {\"type\":\"complete\"}\n\n",
        ]));
        let events: Vec<StreamEvent> = decode_events(input)
            .map(|e| e.unwrap())
            .collect()
            .await;
        assert_eq!(
            events,
            vec![
                StreamEvent::AssistantChunk("Hel".to_string()),
                StreamEvent::AssistantChunk("lo".to_string()),
                StreamEvent::StreamComplete,
            ]
        );
    }
}
