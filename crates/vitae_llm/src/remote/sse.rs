//! Incremental assembly of server-sent event frames.
//!
//! Network chunks can split an event anywhere, including mid-line. The parser
//! buffers raw bytes until a full blank-line-terminated block is available,
//! and only then extracts its `data:` payload.

/// Assembles complete SSE frames from an arbitrary chunking of the byte
/// stream.
///
/// Bytes stay raw until a frame completes: a chunk boundary can split a
/// multibyte character, so decoding happens per frame, never per chunk.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
}

impl FrameParser {
    /// Feed one network chunk, returning the `data` payloads of every frame
    /// completed by it.
    ///
    /// Frames without a `data` field (comments, `event:`/`id:` lines only)
    /// yield nothing.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        // Normalize CRLF so the blank-line boundary is always "\n\n". A CR
        // whose LF sits in the next chunk is normalized on that later push.
        normalize_crlf(&mut self.buffer);

        let mut payloads = vec![];
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            payloads.extend(data_payload(&String::from_utf8_lossy(&frame)));
        }

        payloads
    }

    /// Flush a trailing, unterminated frame at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        let frame = std::mem::take(&mut self.buffer);
        data_payload(&String::from_utf8_lossy(&frame))
    }
}

/// Rewrite every `\r\n` pair to `\n`, in place.
///
/// CR and LF are ASCII and never occur inside a multibyte sequence, so this
/// is safe on raw, possibly mid-character bytes.
fn normalize_crlf(buffer: &mut Vec<u8>) {
    if !buffer.windows(2).any(|w| w == b"\r\n") {
        return;
    }

    let mut normalized = Vec::with_capacity(buffer.len());
    let mut bytes = buffer.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        if byte == b'\r' && bytes.peek() == Some(&b'\n') {
            continue;
        }

        normalized.push(byte);
    }

    *buffer = normalized;
}

/// Extract the `data` payload of a single frame.
///
/// Multiple `data:` lines concatenate with a newline, per the SSE
/// specification. Comment lines (leading `:`) and non-`data` fields are
/// ignored.
fn data_payload(frame: &str) -> Option<String> {
    let mut payload: Option<String> = None;

    for line in frame.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };

        let data = data.strip_prefix(' ').unwrap_or(data);
        match &mut payload {
            Some(payload) => {
                payload.push('\n');
                payload.push_str(data);
            }
            None => payload = Some(data.to_owned()),
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_single_frame() {
        let mut parser = FrameParser::default();
        let payloads = parser.push(b"data: {\"content\":\"Hi\"}\n\n");
        assert_eq!(payloads, vec!["{\"content\":\"Hi\"}".to_owned()]);
    }

    #[test]
    fn test_frame_split_mid_line() {
        let mut parser = FrameParser::default();
        assert!(parser.push(b"da").is_empty());
        assert!(parser.push(b"ta: {\"content\":\"He").is_empty());
        assert!(parser.push(b"llo\"}\n").is_empty());

        let payloads = parser.push(b"\ndata: [DONE]\n\n");
        assert_eq!(payloads, vec![
            "{\"content\":\"Hello\"}".to_owned(),
            "[DONE]".to_owned(),
        ]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let event = "data: {\"content\":\"café\"}\n\n".as_bytes();
        // Splits between the two bytes of the 'é'.
        let (head, tail) = event.split_at(22);

        let mut parser = FrameParser::default();
        assert!(parser.push(head).is_empty());
        assert_eq!(parser.push(tail), vec![
            "{\"content\":\"café\"}".to_owned()
        ]);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut parser = FrameParser::default();
        let payloads = parser.push(b"data: a\n\ndata: b\n\ndata: c\n\n");
        assert_eq!(payloads, vec![
            "a".to_owned(),
            "b".to_owned(),
            "c".to_owned()
        ]);
    }

    #[test]
    fn test_multiple_data_lines_concatenate() {
        let mut parser = FrameParser::default();
        let payloads = parser.push(b"data: first\ndata: second\n\n");
        assert_eq!(payloads, vec!["first\nsecond".to_owned()]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = FrameParser::default();
        assert!(parser.push(b"data: hi\r\n\r").is_empty());
        let payloads = parser.push(b"\ndata: ho\r\n\r\n");
        assert_eq!(payloads, vec!["hi".to_owned(), "ho".to_owned()]);
    }

    #[test]
    fn test_ignores_comments_and_other_fields() {
        let mut parser = FrameParser::default();
        let payloads = parser.push(b": keep-alive\n\nevent: message\nid: 3\ndata: x\n\n");
        assert_eq!(payloads, vec!["x".to_owned()]);
    }

    #[test]
    fn test_realistic_event_stream() {
        let chunk = indoc::indoc! {r#"
            event: message
            data: {"content":"Hello"}

            data: {"content":" world"}

            data: [DONE]

        "#};

        let mut parser = FrameParser::default();
        assert_eq!(parser.push(chunk.as_bytes()), vec![
            r#"{"content":"Hello"}"#.to_owned(),
            r#"{"content":" world"}"#.to_owned(),
            "[DONE]".to_owned(),
        ]);
    }

    #[test]
    fn test_finish_flushes_trailing_frame() {
        let mut parser = FrameParser::default();
        assert!(parser.push(b"data: tail").is_empty());
        assert_eq!(parser.finish(), Some("tail".to_owned()));
        assert_eq!(parser.finish(), None);
    }
}
