//! Property-based tests for frame decoding
//!
//! The decoder must produce the same frames no matter where the transport
//! splits the byte stream.

use super::decoder::FrameDecoder;
use super::parser::parse_frame;
use proptest::prelude::*;

/// A single line of a realistic chat stream, without its newline
fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(": keep-alive".to_string()),
        "[a-zA-Z0-9 \u{e9}\u{4e16}\u{1f600}]{0,20}"
            .prop_map(|text| format!(r#"data: {{"type":"ai_chunk","data":"{}"}}"#, text)),
        Just(r#"data: {"type":"complete"}"#.to_string()),
        Just("data: {broken".to_string()),
    ]
}

/// Lines joined with `\n` or `\r\n`, optionally without a final terminator
fn arb_stream() -> impl Strategy<Value = Vec<u8>> {
    (
        prop::collection::vec(arb_line(), 0..12),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(lines, crlf, terminated)| {
            let sep = if crlf { "\r\n" } else { "\n" };
            let mut text = lines.join(sep);
            if terminated && !lines.is_empty() {
                text.push_str(sep);
            }
            text.into_bytes()
        })
}

/// Split `bytes` at the given (unsorted, possibly duplicate) cut points
fn split_at(bytes: &[u8], mut cuts: Vec<usize>) -> Vec<Vec<u8>> {
    cuts.iter_mut().for_each(|c| *c %= bytes.len() + 1);
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(bytes[start..cut].to_vec());
        start = cut;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}

fn decode_all(chunks: &[Vec<u8>]) -> Vec<String> {
    let mut decoder = FrameDecoder::new();
    let mut frames: Vec<String> = chunks.iter().flat_map(|c| decoder.push(c)).collect();
    frames.extend(decoder.finish());
    frames
}

proptest! {
    #[test]
    fn prop_chunking_invariance(
        bytes in arb_stream(),
        cuts in prop::collection::vec(any::<usize>(), 0..16),
    ) {
        let whole = decode_all(&[bytes.clone()]);
        let split = decode_all(&split_at(&bytes, cuts));
        prop_assert_eq!(whole, split);
    }

    #[test]
    fn prop_byte_at_a_time_matches_whole(bytes in arb_stream()) {
        let whole = decode_all(&[bytes.clone()]);
        let singles: Vec<Vec<u8>> = bytes.iter().map(|b| vec![*b]).collect();
        prop_assert_eq!(whole, decode_all(&singles));
    }

    #[test]
    fn prop_no_bytes_lost(bytes in arb_stream()) {
        // Every complete line comes back verbatim, in order
        let text = String::from_utf8(bytes.clone()).unwrap();
        let mut expected: Vec<String> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        let tail = expected.pop().unwrap_or_default();
        if tail.starts_with("data: ") {
            expected.push(tail);
        }
        prop_assert_eq!(decode_all(&[bytes]), expected);
    }

    #[test]
    fn prop_parser_never_panics(frame in ".{0,80}") {
        let _ = parse_frame(&frame);
        let data_frame = format!("data: {}", frame);
        let _ = parse_frame(&data_frame);
    }
}
