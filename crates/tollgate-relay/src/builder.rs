use serde::Serialize;
use tollgate_catalog::ResolvedModel;
use tollgate_tokens::{ChatTurn, Role, TruncatedPrompt};

const DEFAULT_SYSTEM: &str = "You are a helpful assistant.";
const DEFAULT_PROMPT: &str = "Hello";

const DEFAULT_TEMPERATURE: f64 = 0.5;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TOP_P: f64 = 1.0;
const DEFAULT_FREQUENCY_PENALTY: f64 = 0.0001;
const DEFAULT_PRESENCE_PENALTY: f64 = 0.0;

/// Caller-tunable sampling knobs, filled in with house defaults
#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub stop: Option<Vec<String>>,
    pub json_mode: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            frequency_penalty: DEFAULT_FREQUENCY_PENALTY,
            presence_penalty: DEFAULT_PRESENCE_PENALTY,
            stop: None,
            json_mode: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// The chat-completions request body sent upstream
#[derive(Debug, Serialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Assemble the upstream body from a truncated prompt and sampling knobs
///
/// The output ceiling is the smallest of: the caller's request, the
/// model's own output limit, and whatever room the context window has
/// left after the prompt. It never drops below 1.
pub fn build_payload(
    model: &ResolvedModel,
    prompt: &TruncatedPrompt,
    sampling: &SamplingParams,
) -> UpstreamRequest {
    let mut messages = Vec::with_capacity(prompt.history.len() + 2);

    let system = if prompt.system.is_empty() {
        DEFAULT_SYSTEM.to_owned()
    } else {
        prompt.system.clone()
    };
    messages.push(WireMessage {
        role: Role::System.as_str(),
        content: system,
    });

    for ChatTurn { role, content } in &prompt.history {
        messages.push(WireMessage {
            role: role.as_str(),
            content: content.clone(),
        });
    }

    let user_prompt = if prompt.prompt.is_empty() {
        DEFAULT_PROMPT.to_owned()
    } else {
        prompt.prompt.clone()
    };
    messages.push(WireMessage {
        role: Role::User.as_str(),
        content: user_prompt,
    });

    let prompt_tokens = u32::try_from(prompt.estimate).unwrap_or(u32::MAX);
    let room = model.context_window.saturating_sub(prompt_tokens);
    let max_tokens = model.clamp_output(sampling.max_tokens).min(room).max(1);

    let response_format = (sampling.json_mode && model.provider.supports_response_format())
        .then_some(ResponseFormat { kind: "json_object" });
    let stop = sampling
        .stop
        .clone()
        .filter(|_| model.provider.supports_stop());

    UpstreamRequest {
        model: model.upstream_id.clone(),
        messages,
        stream: true,
        temperature: sampling.temperature,
        max_tokens,
        top_p: sampling.top_p,
        frequency_penalty: sampling.frequency_penalty,
        presence_penalty: sampling.presence_penalty,
        stop,
        response_format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use tollgate_config::providers::ProviderKind;

    fn model(kind: ProviderKind, context_window: u32, max_output: u32) -> ResolvedModel {
        ResolvedModel {
            name: "test/model".to_owned(),
            upstream_id: "test/model-upstream".to_owned(),
            provider: kind,
            provider_name: "test".to_owned(),
            base_url: "https://example.invalid/v1".parse().unwrap(),
            api_key: SecretString::from("sk-test"),
            input_cost: 0.000001,
            output_cost: 0.000002,
            context_window,
            max_output,
        }
    }

    fn prompt(system: &str, history: Vec<ChatTurn>, user: &str, estimate: usize) -> TruncatedPrompt {
        TruncatedPrompt {
            system: system.to_owned(),
            history,
            prompt: user.to_owned(),
            estimate,
        }
    }

    #[test]
    fn defaults_fill_empty_system_and_prompt() {
        let m = model(ProviderKind::Openrouter, 8192, 4096);
        let body = build_payload(&m, &prompt("", vec![], "", 10), &SamplingParams::default());

        assert_eq!(body.messages.first().unwrap().content, DEFAULT_SYSTEM);
        assert_eq!(body.messages.last().unwrap().content, DEFAULT_PROMPT);
        assert!(body.stream);
        assert_eq!(body.model, "test/model-upstream");
    }

    #[test]
    fn history_lands_between_system_and_prompt() {
        let m = model(ProviderKind::Openrouter, 8192, 4096);
        let history = vec![
            ChatTurn {
                role: Role::User,
                content: "earlier question".to_owned(),
            },
            ChatTurn {
                role: Role::Assistant,
                content: "earlier answer".to_owned(),
            },
        ];
        let body = build_payload(
            &m,
            &prompt("sys", history, "now", 30),
            &SamplingParams::default(),
        );

        let roles: Vec<&str> = body.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
    }

    #[test]
    fn max_tokens_is_clamped_by_remaining_context() {
        let m = model(ProviderKind::Openrouter, 3000, 4096);
        let body = build_payload(
            &m,
            &prompt("sys", vec![], "hi", 2800),
            &SamplingParams::default(),
        );
        assert_eq!(body.max_tokens, 200);
    }

    #[test]
    fn max_tokens_never_drops_below_one() {
        let m = model(ProviderKind::Openrouter, 1000, 4096);
        let body = build_payload(
            &m,
            &prompt("sys", vec![], "hi", 5000),
            &SamplingParams::default(),
        );
        assert_eq!(body.max_tokens, 1);
    }

    #[test]
    fn json_mode_only_for_providers_that_support_it() {
        let sampling = SamplingParams {
            json_mode: true,
            ..SamplingParams::default()
        };

        let openai = model(ProviderKind::Openai, 8192, 4096);
        let body = build_payload(&openai, &prompt("s", vec![], "p", 10), &sampling);
        assert!(body.response_format.is_some());

        let openrouter = model(ProviderKind::Openrouter, 8192, 4096);
        let body = build_payload(&openrouter, &prompt("s", vec![], "p", 10), &sampling);
        assert!(body.response_format.is_none());
    }

    #[test]
    fn stop_sequences_are_dropped_for_unsupported_providers() {
        let sampling = SamplingParams {
            stop: Some(vec!["END".to_owned()]),
            ..SamplingParams::default()
        };

        let groq = model(ProviderKind::Groq, 8192, 4096);
        let body = build_payload(&groq, &prompt("s", vec![], "p", 10), &sampling);
        assert!(body.stop.is_none());

        let openai = model(ProviderKind::Openai, 8192, 4096);
        let body = build_payload(&openai, &prompt("s", vec![], "p", 10), &sampling);
        assert_eq!(body.stop.as_deref(), Some(&["END".to_owned()][..]));
    }

    #[test]
    fn serialized_body_omits_absent_optionals() {
        let m = model(ProviderKind::Openrouter, 8192, 4096);
        let body = build_payload(&m, &prompt("s", vec![], "p", 10), &SamplingParams::default());
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("stop").is_none());
        assert!(json.get("response_format").is_none());
        assert_eq!(json["frequency_penalty"], 0.0001);
    }
}
