use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A conversation between one user and the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: i64,
    pub id_user: i64,
    /// Client-facing opaque identifier
    pub uid: String,
    pub name: Option<String>,
    /// System-prompt override for this session
    pub system: Option<String>,
    /// Selected logical model name; filled lazily on first read
    pub model: Option<String>,
    /// Free-form metadata (web-search toggle lives here)
    pub metas: serde_json::Value,
    pub created: Timestamp,
}

/// Author kind of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Assistant,
}

/// One turn persisted in a chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub id_chat: i64,
    pub id_user: i64,
    pub kind: MessageKind,
    pub content: String,
    /// Client-supplied idempotency token
    pub uid: String,
    /// Message this one responds to, if any
    pub response_to: Option<i64>,
    pub created: Timestamp,
}

/// Input for appending a message
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id_chat: i64,
    pub id_user: i64,
    pub kind: MessageKind,
    pub content: String,
    pub uid: String,
    pub response_to: Option<i64>,
}

/// One immutable billing event (append-only ledger)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRow {
    pub id: i64,
    pub id_user: i64,
    /// Logical model name billed against
    pub model: String,
    pub id_chat: i64,
    pub id_message: Option<i64>,
    pub tokens_used: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub prompt_cost: f64,
    pub completion_cost: f64,
    pub cost: f64,
    /// Balance snapshot taken in the same critical section as the debit
    pub balance_before: f64,
    pub created: Timestamp,
}

/// Prepaid balance, one row per user; may go negative by design
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserBalance {
    pub id_user: i64,
    pub balance: f64,
}

/// Input for one billing event
#[derive(Debug, Clone)]
pub struct Charge {
    pub id_user: i64,
    pub model: String,
    pub id_chat: i64,
    pub id_message: Option<i64>,
    pub tokens_used: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub prompt_cost: f64,
    pub completion_cost: f64,
    pub cost: f64,
}
