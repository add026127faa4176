use serde::Deserialize;

/// Prompt budget and stream guard limits
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Estimated-token budget for the assembled prompt; content above this
    /// is truncated before the upstream call
    #[serde(default = "default_prompt_budget_tokens")]
    pub prompt_budget_tokens: usize,
    /// Seconds without upstream bytes before a stream is treated as failed
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// How many stored messages of history feed the prompt assembly
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            prompt_budget_tokens: default_prompt_budget_tokens(),
            idle_timeout_secs: default_idle_timeout_secs(),
            history_window: default_history_window(),
        }
    }
}

const fn default_prompt_budget_tokens() -> usize {
    2500
}

const fn default_idle_timeout_secs() -> u64 {
    120
}

const fn default_history_window() -> usize {
    20
}
