use std::collections::VecDeque;
use std::sync::LazyLock;

use bytes::Bytes;
use regex::Regex;

use crate::frame::{SseFrame, WireUsage};
use crate::relay::RelayState;

/// How many raw chunks the tail buffer retains for the fallback scan
const TAIL_CHUNKS: usize = 3;

/// Characters per token assumed when deriving completion tokens from
/// accumulated assistant text
const CHARS_PER_TOKEN: usize = 4;

static USAGE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""usage"\s*:\s*\{"#).expect("usage pattern is valid"));

/// Final token counts attributed to one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Whether anything is billable
    pub const fn is_zero(&self) -> bool {
        self.total_tokens == 0
    }
}

/// Bounded ring of the last raw upstream chunks
///
/// Exists solely for the fallback usage scan at stream end; capping it
/// keeps memory constant regardless of response length.
#[derive(Debug, Default)]
pub struct TailBuffer {
    chunks: VecDeque<Bytes>,
}

impl TailBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: Bytes) {
        if self.chunks.len() == TAIL_CHUNKS {
            self.chunks.pop_front();
        }
        self.chunks.push_back(chunk);
    }

    fn concatenated(&self) -> String {
        let mut joined = Vec::new();
        for chunk in &self.chunks {
            joined.extend_from_slice(chunk);
        }
        String::from_utf8_lossy(&joined).into_owned()
    }
}

/// Accumulates usage evidence during a stream and settles it at the end
///
/// Primary source: usage objects parsed from frames. First fallback: a
/// scan of the tail buffer for a `"usage": {...}` object that arrived in
/// a frame the parser could not handle. Second fallback: the local
/// prompt estimate plus a character-derived completion estimate.
#[derive(Debug)]
pub struct UsageMeter {
    prompt_estimate: u32,
    reported: TokenUsage,
    completion_chars: usize,
}

impl UsageMeter {
    pub fn new(prompt_estimate: usize) -> Self {
        Self {
            prompt_estimate: u32::try_from(prompt_estimate).unwrap_or(u32::MAX),
            reported: TokenUsage::default(),
            completion_chars: 0,
        }
    }

    /// Fold one parsed frame into the running state
    pub fn observe(&mut self, frame: &SseFrame) {
        if let Some(content) = &frame.content {
            self.completion_chars += content.chars().count();
        }
        if let Some(usage) = frame.usage {
            self.merge(usage);
        }
    }

    fn merge(&mut self, usage: WireUsage) {
        if usage.prompt_tokens > 0 {
            self.reported.prompt_tokens = usage.prompt_tokens;
        }
        if usage.completion_tokens > 0 {
            self.reported.completion_tokens = usage.completion_tokens;
        }
        if usage.total_tokens > 0 {
            self.reported.total_tokens = usage.total_tokens;
        }
    }

    /// Settle the final counts once the stream has reached a terminal state
    pub fn finalize(&self, tail: &TailBuffer, state: RelayState) -> TokenUsage {
        let mut usage = self.reported;

        if usage.total_tokens == 0 {
            usage.total_tokens = usage.prompt_tokens + usage.completion_tokens;
        }

        if usage.total_tokens == 0
            && let Some(scanned) = scan_for_usage(&tail.concatenated())
        {
            usage.prompt_tokens = scanned.prompt_tokens;
            usage.completion_tokens = scanned.completion_tokens;
            usage.total_tokens = if scanned.total_tokens > 0 {
                scanned.total_tokens
            } else {
                scanned.prompt_tokens + scanned.completion_tokens
            };
        }

        // Local estimate, but only when the request produced anything: a
        // stream cancelled before the first attributable token is not
        // billed at all.
        if usage.total_tokens == 0 && (self.completion_chars > 0 || state == RelayState::Completed) {
            usage.prompt_tokens = self.prompt_estimate;
            usage.completion_tokens = completion_tokens_from_chars(self.completion_chars);
            usage.total_tokens = usage.prompt_tokens + usage.completion_tokens;
        }

        // An upstream that reports only a total gets the whole total
        // attributed to the prompt side. Reporting simplification, not a
        // billing decision: the total cost is what it is.
        if usage.prompt_tokens == 0 && usage.completion_tokens == 0 && usage.total_tokens > 0 {
            usage.prompt_tokens = usage.total_tokens;
        }

        usage
    }
}

fn completion_tokens_from_chars(chars: usize) -> u32 {
    u32::try_from(chars / CHARS_PER_TOKEN).unwrap_or(u32::MAX)
}

/// Find a `"usage": {...}` object in raw text and parse it
///
/// The object may be nested (`prompt_tokens_details` and friends), so
/// the end is found by brace counting rather than a regex.
fn scan_for_usage(raw: &str) -> Option<WireUsage> {
    let found = USAGE_KEY.find(raw)?;
    let open = raw[found.start()..].find('{')? + found.start();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in raw[open..].char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let body = &raw[open..=open + i];
                    return serde_json::from_str(body).ok();
                }
            }
            _ => {}
        }
    }
    None
}
