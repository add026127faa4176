use bytes::Bytes;
use serde_json::json;

/// Build the short-circuit SSE body sent instead of contacting upstream
///
/// Shaped as a regular chat-completion chunk followed by the done
/// sentinel, so clients consume it through the exact same code path as a
/// real stream.
pub fn insufficient_funds_body(model: &str, message: &str) -> Bytes {
    let chunk = json!({
        "id": "chatcmpl-denied",
        "object": "chat.completion.chunk",
        "model": model,
        "choices": [{
            "index": 0,
            "delta": { "role": "assistant", "content": message },
            "finish_reason": "stop",
        }],
    });

    Bytes::from(format!("data: {chunk}\n\ndata: [DONE]\n\n"))
}
