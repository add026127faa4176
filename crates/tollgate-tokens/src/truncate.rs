use crate::{ChatTurn, estimate_chat};

/// Character floor below which the system prompt is never trimmed
pub const SYSTEM_FLOOR_CHARS: usize = 256;

/// Character floor below which the user prompt is never trimmed
pub const PROMPT_FLOOR_CHARS: usize = 64;

/// Characters removed per trimming step
const TRIM_STEP_CHARS: usize = 250;

/// Result of shrinking a prompt to a token budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedPrompt {
    pub system: String,
    pub history: Vec<ChatTurn>,
    pub prompt: String,
    /// Estimated token count of the returned content
    pub estimate: usize,
}

/// Shrink (system, history, prompt) until the estimate fits `budget_tokens`
///
/// Reduction follows a strict priority order, re-estimating after every
/// single step so no cut overshoots: drop the oldest history entry while
/// more than one remains, then trim trailing characters off the system
/// prompt down to its floor, then trim the user prompt down to its floor.
/// When all three floors are reached the best-effort content is returned
/// rather than an error.
pub fn shrink_to_budget(
    system: &str,
    history: &[ChatTurn],
    prompt: &str,
    budget_tokens: usize,
) -> TruncatedPrompt {
    let mut system = system.to_owned();
    let mut history = history.to_vec();
    let mut prompt = prompt.to_owned();

    let mut estimate = estimate_chat(&system, &history, &prompt);

    while estimate > budget_tokens {
        if history.len() > 1 {
            history.remove(0);
        } else if system.len() > SYSTEM_FLOOR_CHARS {
            trim_tail(&mut system, SYSTEM_FLOOR_CHARS);
        } else if prompt.len() > PROMPT_FLOOR_CHARS {
            trim_tail(&mut prompt, PROMPT_FLOOR_CHARS);
        } else {
            // every floor reached; return what is left
            break;
        }
        estimate = estimate_chat(&system, &history, &prompt);
    }

    TruncatedPrompt {
        system,
        history,
        prompt,
        estimate,
    }
}

/// Remove up to one trim step from the end of `s`, never splitting a
/// UTF-8 character
///
/// The boundary search runs downward so every call strictly shrinks the
/// string; the caller's loop relies on that for termination. A multi-byte
/// character sitting on the target may push the cut up to 3 bytes below
/// `floor`.
fn trim_tail(s: &mut String, floor: usize) {
    let mut target = s.len().saturating_sub(TRIM_STEP_CHARS).max(floor);
    while target > 0 && !s.is_char_boundary(target) {
        target -= 1;
    }
    s.truncate(target);
}
