use serde::Deserialize;

/// SSE line prefix carrying a payload
const DATA_PREFIX: &str = "data:";

/// End-of-stream sentinel, compared case-insensitively after trimming
const DONE_SENTINEL: &str = "[done]";

/// Token usage object as providers put it on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// One logical frame parsed out of the upstream byte stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Incremental assistant content carried by this frame
    pub content: Option<String>,
    /// Usage object carried by this frame
    pub usage: Option<WireUsage>,
    /// Frame was the `[DONE]` sentinel
    pub done: bool,
}

#[derive(Debug, Deserialize)]
struct ChunkBody {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental SSE line framer
///
/// Chunks are appended to a byte buffer and split on newlines; the last,
/// possibly incomplete line stays buffered for the next chunk. A line
/// that fails to parse is logged and discarded — forwarding has already
/// happened by the time parsing runs, so a bad frame must never become a
/// stream error.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one upstream chunk and return the frames completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(frame) = parse_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }
}

/// Parse one complete line into a frame
///
/// Blank lines, comment lines (leading `:`), and lines without the data
/// prefix yield nothing.
fn parse_line(line: &[u8]) -> Option<SseFrame> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();

    if text.is_empty() || text.starts_with(':') {
        return None;
    }

    let data = text.strip_prefix(DATA_PREFIX)?.trim();

    if data.eq_ignore_ascii_case(DONE_SENTINEL) {
        return Some(SseFrame {
            done: true,
            ..SseFrame::default()
        });
    }

    match serde_json::from_str::<ChunkBody>(data) {
        Ok(body) => Some(SseFrame {
            content: body.choices.into_iter().next().and_then(|c| c.delta.content),
            usage: body.usage,
            done: false,
        }),
        Err(e) => {
            tracing::debug!(error = %e, line = %data, "discarding unparseable frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(text: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{text}\"}}}}]}}\n")
    }

    #[test]
    fn complete_line_yields_one_frame() {
        let mut parser = FrameParser::new();
        let frames = parser.push(delta_line("hi").as_bytes());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].content.as_deref(), Some("hi"));
    }

    #[test]
    fn partial_line_is_retained_across_chunks() {
        let mut parser = FrameParser::new();
        let line = delta_line("split across chunks");
        let (a, b) = line.split_at(17);

        assert!(parser.push(a.as_bytes()).is_empty());
        let frames = parser.push(b.as_bytes());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].content.as_deref(), Some("split across chunks"));
    }

    #[test]
    fn chunk_split_inside_utf8_character_still_parses() {
        let mut parser = FrameParser::new();
        let line = delta_line("héllo");
        let bytes = line.as_bytes();
        // split in the middle of the two-byte é
        let split = line.find('é').unwrap() + 1;

        assert!(parser.push(&bytes[..split]).is_empty());
        let frames = parser.push(&bytes[split..]);
        assert_eq!(frames[0].content.as_deref(), Some("héllo"));
    }

    #[test]
    fn done_sentinel_is_case_and_whitespace_insensitive() {
        for raw in ["data: [DONE]\n", "data:[done]\n", "data:   [Done]  \n"] {
            let mut parser = FrameParser::new();
            let frames = parser.push(raw.as_bytes());
            assert_eq!(frames.len(), 1, "{raw:?}");
            assert!(frames[0].done, "{raw:?}");
        }
    }

    #[test]
    fn malformed_json_is_discarded_not_an_error() {
        let mut parser = FrameParser::new();
        let frames = parser.push(b"data: {not json\n");
        assert!(frames.is_empty());

        // parser keeps working afterwards
        let frames = parser.push(delta_line("still alive").as_bytes());
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut parser = FrameParser::new();
        let frames = parser.push(b": keep-alive\n\n\r\n");
        assert!(frames.is_empty());
    }

    #[test]
    fn usage_frame_is_captured() {
        let mut parser = FrameParser::new();
        let frames = parser
            .push(b"data: {\"choices\":[],\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":7,\"total_tokens\":12}}\n");
        let usage = frames[0].usage.unwrap();
        assert_eq!(usage.prompt_tokens, 5);
        assert_eq!(usage.completion_tokens, 7);
        assert_eq!(usage.total_tokens, 12);
    }

    #[test]
    fn many_frames_in_one_chunk() {
        let mut parser = FrameParser::new();
        let chunk = format!("{}{}data: [DONE]\n", delta_line("a"), delta_line("b"));
        let frames = parser.push(chunk.as_bytes());
        assert_eq!(frames.len(), 3);
        assert!(frames[2].done);
    }
}
