use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Configuration for a single upstream provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider protocol variant
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Bearer credential for the provider
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (vendor default when absent)
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// Supported upstream vendors
///
/// All four speak the OpenAI chat-completions wire shape; they differ in
/// base URL and in which request flags they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Openai,
    Perplexity,
    Groq,
    Openrouter,
}

impl ProviderKind {
    /// Vendor chat-completions base URL
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Openai => "https://api.openai.com/v1",
            Self::Perplexity => "https://api.perplexity.ai",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Openrouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Whether the vendor accepts `response_format: {"type": "json_object"}`
    pub const fn supports_response_format(self) -> bool {
        matches!(self, Self::Openai)
    }

    /// Whether the vendor accepts a `stop` sequence list
    pub const fn supports_stop(self) -> bool {
        matches!(self, Self::Openai)
    }

    /// Name used in logs and ledger rows
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Perplexity => "perplexity",
            Self::Groq => "groq",
            Self::Openrouter => "openrouter",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
