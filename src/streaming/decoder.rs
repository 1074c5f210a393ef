//! Frame decoder
//!
//! Reassembles newline-delimited `data:` frames from the raw byte chunks
//! of an upstream connection. Chunk boundaries carry no meaning: a frame
//! may arrive split anywhere, including inside the `data:` marker or a
//! multi-byte UTF-8 code point, so the leftover tail is buffered as bytes
//! across calls.

use bytes::BytesMut;
use serde::de::IgnoredAny;

const FRAME_PREFIX: &str = "data:";

/// Stateful decoder turning byte chunks into completed frame payloads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the payloads of every frame completed by
    /// it, in stream order.
    ///
    /// Fully newline-terminated lines that don't match the frame pattern
    /// (blank separators, `id:`/`event:` lines, comments) are dropped
    /// silently. The unterminated tail is retained for the next chunk,
    /// unless it already forms a complete frame with a well-formed JSON
    /// payload, in which case it is emitted right away; the upstream does
    /// not always terminate the final frame before idling.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        // The retained tail contains no newline, so only the appended
        // bytes need scanning.
        let mut search_from = self.buffer.len();
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(offset) = self.buffer[search_from..].iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(search_from + offset + 1);
            search_from = 0;
            let line = trim_line(&line[..line.len() - 1]);
            match std::str::from_utf8(line) {
                Ok(text) => {
                    if let Some(payload) = frame_payload(text) {
                        payloads.push(payload.to_string());
                    }
                }
                Err(err) => {
                    tracing::warn!("dropping non-UTF-8 line in event stream: {}", err);
                }
            }
        }

        if !self.buffer.is_empty() {
            // A boundary inside a code point makes the tail temporarily
            // non-UTF-8; it stays buffered either way.
            if let Ok(text) = std::str::from_utf8(&self.buffer) {
                if let Some(payload) = frame_payload(text.trim_end_matches('\r')) {
                    if serde_json::from_str::<IgnoredAny>(payload).is_ok() {
                        payloads.push(payload.to_string());
                        self.buffer.clear();
                    } else {
                        tracing::debug!(
                            "frame split mid-payload, buffering {} bytes",
                            self.buffer.len()
                        );
                    }
                }
            }
        }

        payloads
    }

    /// Bytes still buffered waiting for a newline. Non-empty at end of
    /// stream means the final frame never completed and is discarded.
    pub fn remainder(&self) -> &[u8] {
        &self.buffer
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    match line {
        [rest @ .., b'\r'] => rest,
        _ => line,
    }
}

fn frame_payload(line: &str) -> Option<&str> {
    let payload = line.strip_prefix(FRAME_PREFIX)?;
    if payload.is_empty() { None } else { Some(payload) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(kind: &str, extra: &str) -> String {
        format!(r#"data:{{"type":"{kind}"{extra}}}"#)
    }

    #[test]
    fn decodes_multiple_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let input = format!(
            "{}\n{}\n",
            frame("RUN_STARTED", r#","thread_id":"t-1""#),
            frame("RUN_FINISHED", r#","thread_id":"t-1""#),
        );
        let payloads = decoder.feed(input.as_bytes());
        assert_eq!(payloads.len(), 2);
        assert!(payloads[0].contains("RUN_STARTED"));
        assert!(payloads[1].contains("RUN_FINISHED"));
        assert!(decoder.remainder().is_empty());
    }

    #[test]
    fn drops_separators_and_foreign_lines() {
        let mut decoder = FrameDecoder::new();
        let input = format!(
            "id:t-1\n\n{}\n: keep-alive\nevent:message\n",
            frame("RUN_STARTED", r#","thread_id":"t-1""#),
        );
        let payloads = decoder.feed(input.as_bytes());
        assert_eq!(payloads.len(), 1);
    }

    #[test]
    fn reassembles_frame_split_inside_marker() {
        let mut decoder = FrameDecoder::new();
        let first = format!("{}\nda", frame("RUN_STARTED", r#","thread_id":"t-1""#));
        let payloads = decoder.feed(first.as_bytes());
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].contains("RUN_STARTED"));

        let second = r#"ta:{"type":"RUN_FINISHED","thread_id":"t-1"}"#.to_string() + "\n";
        let payloads = decoder.feed(second.as_bytes());
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].contains("RUN_FINISHED"));
        assert!(decoder.remainder().is_empty());
    }

    #[test]
    fn emits_complete_unterminated_tail_without_duplication() {
        let mut decoder = FrameDecoder::new();
        let payloads = decoder.feed(frame("RUN_FINISHED", r#","thread_id":"t-1""#).as_bytes());
        assert_eq!(payloads.len(), 1);
        assert!(decoder.remainder().is_empty());

        // The newline arriving later is just a separator by then.
        assert!(decoder.feed(b"\n").is_empty());
    }

    #[test]
    fn buffers_tail_split_mid_payload() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(br#"data:{"type":"TEXT_MESSAGE_END","#).is_empty());
        assert!(!decoder.remainder().is_empty());

        let payloads = decoder.feed(b"\"message_id\":\"m-1\"}\n");
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].contains("TEXT_MESSAGE_END"));
    }

    #[test]
    fn buffers_tail_split_inside_utf8_code_point() {
        let mut decoder = FrameDecoder::new();
        let text = format!(
            "{}\n",
            frame("TEXT_MESSAGE_CONTENT", r#","message_id":"m-1","delta":"héllo 世界""#),
        );
        let bytes = text.as_bytes();
        // Split inside the 'é' (two-byte sequence starting at the delta).
        let split = text.find('é').unwrap() + 1;
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let payloads = decoder.feed(&bytes[split..]);
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].contains("héllo 世界"));
    }

    #[test]
    fn strips_carriage_returns() {
        let mut decoder = FrameDecoder::new();
        let input = format!("{}\r\n\r\n", frame("RUN_STARTED", r#","thread_id":"t-1""#));
        let payloads = decoder.feed(input.as_bytes());
        assert_eq!(payloads.len(), 1);
        assert!(!payloads[0].ends_with('\r'));
    }

    #[test]
    fn incomplete_tail_is_left_behind_at_end_of_stream() {
        // Documented loss: a frame the upstream never finished is dropped,
        // not emitted as a partial event.
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(br#"data:{"type":"RUN_FIN"#).is_empty());
        assert!(!decoder.remainder().is_empty());
    }

    #[test]
    fn bare_data_prefix_is_not_a_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data:\n").is_empty());
        assert!(decoder.remainder().is_empty());
    }

    proptest! {
        /// Chunk boundaries are invisible: any split of the stream decodes
        /// to the same payload sequence as feeding it whole.
        #[test]
        fn chunking_is_transparent(
            deltas in proptest::collection::vec("[a-zA-Z0-9 é世]{0,12}", 1..6),
            cuts in proptest::collection::vec(0usize..400, 0..8),
        ) {
            let mut stream = String::new();
            stream.push_str(&frame("RUN_STARTED", r#","thread_id":"t-1""#));
            stream.push('\n');
            stream.push_str(&frame(
                "TEXT_MESSAGE_START",
                r#","message_id":"m-1","role":"assistant""#,
            ));
            stream.push('\n');
            for delta in &deltas {
                let escaped = delta.replace('"', "\\\"");
                stream.push_str(&frame(
                    "TEXT_MESSAGE_CONTENT",
                    &format!(r#","message_id":"m-1","delta":"{escaped}""#),
                ));
                stream.push('\n');
            }
            stream.push_str(&frame("TEXT_MESSAGE_END", r#","message_id":"m-1""#));
            stream.push('\n');

            let bytes = stream.as_bytes();
            let mut whole = FrameDecoder::new();
            let expected = whole.feed(bytes);

            let mut boundaries: Vec<usize> =
                cuts.iter().map(|c| c % (bytes.len() + 1)).collect();
            boundaries.sort_unstable();
            boundaries.push(bytes.len());

            let mut decoder = FrameDecoder::new();
            let mut actual = Vec::new();
            let mut from = 0;
            for to in boundaries {
                actual.extend(decoder.feed(&bytes[from..to]));
                from = to;
            }

            prop_assert_eq!(actual, expected);
            prop_assert!(decoder.remainder().is_empty());
        }
    }
}
