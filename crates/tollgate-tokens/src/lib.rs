#![allow(clippy::must_use_candidate)]

//! Local token estimation and prompt truncation
//!
//! No model calls happen here. The estimate is used both as a pre-flight
//! budget check and as the billing fallback when a provider never reports
//! usage, so its approximation error becomes billing error — an accepted
//! tradeoff.

mod estimate;
mod truncate;

pub use estimate::{estimate_chat, estimate_text};
pub use truncate::{PROMPT_FLOOR_CHARS, SYSTEM_FLOOR_CHARS, TruncatedPrompt, shrink_to_budget};

use serde::{Deserialize, Serialize};

/// Author of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One ordered turn of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
