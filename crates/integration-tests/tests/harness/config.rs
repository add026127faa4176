//! Test configuration pointing the gateway at a mock provider

use tollgate_config::Config;

/// Builds a gateway config whose whole catalog is served by one mock
pub struct ConfigBuilder {
    base_url: String,
    starter_credit: f64,
    idle_timeout_secs: u64,
}

impl ConfigBuilder {
    pub fn new(mock_base_url: &str) -> Self {
        Self {
            base_url: mock_base_url.to_owned(),
            starter_credit: 0.5,
            idle_timeout_secs: 120,
        }
    }

    pub fn starter_credit(mut self, credit: f64) -> Self {
        self.starter_credit = credit;
        self
    }

    pub fn idle_timeout_secs(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn build(self) -> Config {
        // Includes the default-aliased targets and the default chat
        // model so every resolution path is coverable.
        let raw = format!(
            r#"
[billing]
starter_credit = {starter_credit}

[limits]
idle_timeout_secs = {idle_timeout}

[providers.mock]
type = "openrouter"
api_key = "sk-mock"
base_url = "{base_url}"

[[model]]
name = "cognitivecomputations/dolphin-mixtral-8x7b"
provider = "mock"
input_cost = 0.000001
output_cost = 0.000002
context_window = 32768

[[model]]
name = "gpt-3.5-turbo-16k"
provider = "mock"
input_cost = 0.000003
output_cost = 0.000004
context_window = 16384

[[model]]
name = "neversleep/llama-3-lumimaid-70b"
provider = "mock"
input_cost = 0.000002
output_cost = 0.000002
context_window = 8192
"#,
            starter_credit = self.starter_credit,
            idle_timeout = self.idle_timeout_secs,
            base_url = self.base_url,
        );

        Config::from_toml(&raw).expect("test config is valid")
    }
}
