use serde::{Deserialize, Serialize};

/// Body of `POST /ai/message`
///
/// Field names follow the client wire convention; sampling fields fall
/// back to the gateway defaults when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub id_chat: i64,
    /// Idempotency token for the stored user message
    pub uid_message: String,
    /// Idempotency token for the stored assistant message
    pub assistant_uid_message: String,
    /// Handle for cancellation; must be unique per live request
    pub id_request: String,
    pub prompt: String,
    /// Logical model override; the session's model applies when absent
    pub model: Option<String>,
    /// System-prompt override; the session's system applies when absent
    pub system: Option<String>,
    /// Accepted for wire compatibility; responses always stream
    #[serde(default = "default_stream")]
    pub stream: bool,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub stop: Option<Vec<String>>,
    /// `"json"` requests a JSON-object response where supported
    pub mode: Option<String>,
}

const fn default_stream() -> bool {
    true
}

/// Body of `POST /ai/message/cancel`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub id_request: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    /// False when the request was unknown or already finished
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteChatResponse {
    pub deleted: bool,
}
