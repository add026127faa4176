use std::sync::LazyLock;

use tiktoken_rs::{CoreBPE, o200k_base};

use crate::{ChatTurn, Role};

static BPE: LazyLock<CoreBPE> = LazyLock::new(|| o200k_base().expect("embedded tokenizer loads"));

/// Fixed per-message framing overhead in the chat wire format
const TOKENS_PER_MESSAGE: usize = 4;

/// Tokens consumed by the assistant reply priming
const REPLY_PRIMING_TOKENS: usize = 3;

/// Count tokens in a plain string
pub fn estimate_text(text: &str) -> usize {
    BPE.encode_with_special_tokens(text).len()
}

/// Estimate the token count of an assembled chat prompt
///
/// Treats `history` as an ordered sequence of turns and synthesizes the
/// standard `system` and trailing `user` turns around it. Pure and
/// deterministic for a given tokenizer.
pub fn estimate_chat(system: &str, history: &[ChatTurn], prompt: &str) -> usize {
    let mut total = message_tokens(Role::System, system);
    for turn in history {
        total += message_tokens(turn.role, &turn.content);
    }
    total += message_tokens(Role::User, prompt);
    total + REPLY_PRIMING_TOKENS
}

fn message_tokens(role: Role, content: &str) -> usize {
    TOKENS_PER_MESSAGE + estimate_text(role.as_str()) + estimate_text(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chat_still_has_framing_overhead() {
        let estimate = estimate_chat("", &[], "");
        assert!(estimate >= 2 * TOKENS_PER_MESSAGE + REPLY_PRIMING_TOKENS);
    }

    #[test]
    fn deterministic_for_same_input() {
        let history = vec![
            ChatTurn::new(Role::User, "hi"),
            ChatTurn::new(Role::Assistant, "hello, how can I help?"),
        ];
        let a = estimate_chat("You are a helpful assistant.", &history, "tell me a joke");
        let b = estimate_chat("You are a helpful assistant.", &history, "tell me a joke");
        assert_eq!(a, b);
    }

    #[test]
    fn longer_content_estimates_higher() {
        let short = estimate_chat("sys", &[], "hello");
        let long = estimate_chat("sys", &[], &"hello world ".repeat(200));
        assert!(long > short);
    }

    #[test]
    fn history_turns_add_tokens() {
        let without = estimate_chat("sys", &[], "prompt");
        let with = estimate_chat(
            "sys",
            &[ChatTurn::new(Role::User, "an earlier question")],
            "prompt",
        );
        assert!(with > without);
    }
}
